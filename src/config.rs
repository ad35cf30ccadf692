//! Construction parameters shared by both stores.

use crate::error::SeqError;

/// Capacity of a sequence created without an explicit hint.
pub const DEFAULT_CAPACITY: usize = 10;

/// Maximum number of elements held by one block of a block tree.
pub const DEFAULT_BLOCK_SIZE: usize = 1000;

/// Smallest accepted block size. Below this, half-full blocks degenerate.
pub const MIN_BLOCK_SIZE: usize = 4;

/// Construction parameters for a sequence.
///
/// `capacity` is a hint only; it never changes observable content.
/// `block_size` is ignored by the gap array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub capacity: usize,
    pub block_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        return Config {
            capacity: DEFAULT_CAPACITY,
            block_size: DEFAULT_BLOCK_SIZE,
        };
    }
}

impl Config {
    pub fn with_capacity(mut self, capacity: usize) -> Config {
        self.capacity = capacity;
        return self;
    }

    pub fn with_block_size(mut self, block_size: usize) -> Config {
        self.block_size = block_size;
        return self;
    }

    /// Rejects parameters no store can honor.
    pub fn validate(&self) -> Result<(), SeqError> {
        if self.block_size < MIN_BLOCK_SIZE {
            return Err(SeqError::InvalidArgument(format!(
                "block size {} is below the minimum of {}",
                self.block_size, MIN_BLOCK_SIZE
            )));
        }
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.capacity, 10);
        assert_eq!(config.block_size, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder() {
        let config = Config::default().with_capacity(64).with_block_size(16);
        assert_eq!(config, Config { capacity: 64, block_size: 16 });
    }

    #[test]
    fn tiny_block_rejected() {
        let config = Config::default().with_block_size(3);
        assert!(matches!(config.validate(), Err(SeqError::InvalidArgument(_))));
    }
}

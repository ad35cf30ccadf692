//! Errors surfaced by sequence operations.
//!
//! Structural defects inside a store are not errors: they panic through
//! [`illegal_state`], since no caller can recover from a corrupted tree.

use thiserror::Error;

/// Error returned by checked sequence operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeqError {
    /// An index or a window `[index, index + len)` lies outside the sequence.
    #[error("invalid range: index {index}, length {len} (size: {size})")]
    IndexOutOfRange {
        /// First index of the offending window.
        index: usize,
        /// Length of the window (1 for single-element access).
        len: usize,
        /// Size of the sequence when the check failed.
        size: usize,
    },

    /// A comparator, search key, or element of the wrong kind was supplied.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A mutator was invoked through a read-only view.
    #[error("unsupported operation: {0} on an immutable view")]
    UnsupportedOperation(&'static str),

    /// A head/tail accessor was called on an empty sequence.
    #[error("no such element")]
    NoSuchElement,

    /// A view was read while its backing sequence was mutably borrowed.
    #[error("backing sequence is mutably borrowed")]
    Borrowed,
}

/// Checks that `index` addresses an existing element of a sequence of `size`.
#[inline]
pub fn check_index(index: usize, size: usize) -> Result<(), SeqError> {
    if index >= size {
        return Err(SeqError::IndexOutOfRange { index, len: 1, size });
    }
    return Ok(());
}

/// Checks that `index` is a valid insertion point, i.e. `index <= size`.
#[inline]
pub fn check_position(index: usize, size: usize) -> Result<(), SeqError> {
    if index > size {
        return Err(SeqError::IndexOutOfRange { index, len: 0, size });
    }
    return Ok(());
}

/// Checks that the window `[index, index + len)` lies within `[0, size)`.
#[inline]
pub fn check_range(index: usize, len: usize, size: usize) -> Result<(), SeqError> {
    match index.checked_add(len) {
        Some(end) if end <= size => return Ok(()),
        _ => return Err(SeqError::IndexOutOfRange { index, len, size }),
    }
}

/// Aborts on a violated store invariant.
#[cold]
#[track_caller]
pub fn illegal_state(what: &str) -> ! {
    panic!("illegal state: {what}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_checks() {
        assert!(check_range(0, 0, 0).is_ok());
        assert!(check_range(2, 3, 5).is_ok());
        assert_eq!(
            check_range(3, 3, 5),
            Err(SeqError::IndexOutOfRange { index: 3, len: 3, size: 5 })
        );
        assert!(check_range(usize::MAX, 2, 5).is_err());
    }

    #[test]
    fn index_and_position() {
        assert!(check_index(4, 5).is_ok());
        assert!(check_index(5, 5).is_err());
        assert!(check_position(5, 5).is_ok());
        assert!(check_position(6, 5).is_err());
    }

    #[test]
    fn messages() {
        let err = SeqError::IndexOutOfRange { index: 7, len: 1, size: 3 };
        assert_eq!(err.to_string(), "invalid range: index 7, length 1 (size: 3)");
        assert_eq!(
            SeqError::UnsupportedOperation("add").to_string(),
            "unsupported operation: add on an immutable view"
        );
    }

    #[test]
    #[should_panic(expected = "illegal state")]
    fn illegal_state_panics() {
        illegal_state("count mismatch");
    }
}

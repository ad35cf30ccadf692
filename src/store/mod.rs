//! Storage engines behind a sequence.
//!
//! Both engines implement [`Store`], the region capability the facade is
//! written against. Store methods trust their caller: indices are validated
//! by [`crate::seq::Sequence`], and a store panics on an out-of-range index
//! the way a slice does.
//!
//! - [`GapArrayStore`]: one contiguous buffer with slack at both ends.
//! - [`BlockTreeStore`]: bounded blocks indexed by a count-augmented,
//!   height-balanced binary tree.

mod block_tree;
mod gap_array;

pub use block_tree::BlockTreeStore;
pub use gap_array::GapArrayStore;

use crate::config::Config;
use crate::kind::Kind;

/// Region-level access to an ordered run of elements.
pub trait Store: Clone {
    type Elem: Kind;

    /// Creates an empty store. `config` has already been validated.
    fn create(config: &Config) -> Self;

    /// Creates a store holding a copy of `values`.
    fn from_slice(config: &Config, values: &[Self::Elem]) -> Self;

    /// Creates an empty store of the same kind and parameters.
    fn create_like(&self, capacity: usize) -> Self;

    fn len(&self) -> usize;

    fn capacity(&self) -> usize;

    fn get(&self, index: usize) -> Self::Elem;

    /// Replaces one element, returning the previous one.
    fn set(&mut self, index: usize, value: Self::Elem) -> Self::Elem;

    /// Returns the longest contiguous run starting at `index < len`.
    fn chunk_at(&self, index: usize) -> &[Self::Elem];

    /// Returns the longest contiguous run ending just before `end`, for
    /// `0 < end <= len`.
    fn chunk_before(&self, end: usize) -> &[Self::Elem];

    /// Copies `[index, index + out.len())` into `out`.
    fn read_region(&self, index: usize, out: &mut [Self::Elem]) {
        let mut done = 0;
        while done < out.len() {
            let chunk = self.chunk_at(index + done);
            let take = chunk.len().min(out.len() - done);
            out[done..done + take].copy_from_slice(&chunk[..take]);
            done += take;
        }
    }

    /// Overwrites `[index, index + values.len())`.
    fn write_region(&mut self, index: usize, values: &[Self::Elem]);

    /// Inserts `values` so that the first lands at `index`.
    fn insert_region(&mut self, index: usize, values: &[Self::Elem]);

    /// Removes `[index, index + len)`.
    fn remove_region(&mut self, index: usize, len: usize);

    /// Overwrites `[index, index + len)` with `value`.
    fn fill_region(&mut self, index: usize, len: usize, value: Self::Elem);

    fn reserve(&mut self, min_capacity: usize);

    /// Drops slack capacity.
    fn trim(&mut self);

    fn clear(&mut self) {
        let len = self.len();
        self.remove_region(0, len);
    }
}

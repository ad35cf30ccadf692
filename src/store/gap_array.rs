//! Gap Array Store
//!
//! A single buffer holding the elements at `[front, front + len)`, with
//! slack on both sides. Every slot of the buffer is initialized; slack slots
//! hold the kind's default value.
//!
//! Edits at offset `k` move whichever side is shorter:
//! - `k <= len - k`: the prefix `[0, k)` slides into the front slack
//! - otherwise: the suffix `[k, len)` slides into the back slack
//!
//! When the needed side has no room the buffer is laid out again with the
//! hole already open at `k`, growing to at least `max(needed, 2 * capacity)`
//! when the total slack is too small to amortize the copy. Pure head or tail
//! traffic is O(1) amortized, a middle edit O(min(k, len - k)).

use tracing::debug;

use crate::config::{Config, DEFAULT_CAPACITY};
use crate::kind::Kind;
use crate::store::Store;

/// Contiguous buffer with a sliding front offset.
#[derive(Clone, Debug)]
pub struct GapArrayStore<K: Kind> {
    /// All slots, `buf.len()` is the capacity.
    buf: Vec<K>,
    /// Physical index of logical element 0.
    front: usize,
    /// Number of live elements.
    len: usize,
}

/// Where the slack goes when the buffer is laid out again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slack {
    Front,
    Back,
    Even,
}

impl<K: Kind> GapArrayStore<K> {
    pub fn new() -> GapArrayStore<K> {
        return GapArrayStore::with_capacity(DEFAULT_CAPACITY);
    }

    pub fn with_capacity(capacity: usize) -> GapArrayStore<K> {
        return GapArrayStore {
            buf: vec![K::DEFAULT; capacity],
            front: 0,
            len: 0,
        };
    }

    pub fn from_values(values: &[K]) -> GapArrayStore<K> {
        return GapArrayStore {
            buf: values.to_vec(),
            front: 0,
            len: values.len(),
        };
    }

    /// The live elements as one slice.
    #[inline(always)]
    pub fn as_slice(&self) -> &[K] {
        return &self.buf[self.front..self.front + self.len];
    }

    /// The live elements as one mutable slice.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [K] {
        return &mut self.buf[self.front..self.front + self.len];
    }

    #[inline(always)]
    fn back_slack(&self) -> usize {
        return self.buf.len() - self.front - self.len;
    }

    /// Opens a hole of `count` slots at logical `index` by copying into a
    /// fresh buffer. Grows when the remaining slack would be under half the
    /// live length, so the copy is paid for by the edits that follow.
    fn relayout(&mut self, index: usize, count: usize) {
        let old_len = self.len;
        let new_len = old_len + count;
        let old_capacity = self.buf.len();

        let mut capacity = old_capacity;
        if new_len > capacity || capacity - new_len < new_len / 2 {
            capacity = new_len.max(old_capacity * 2).max(DEFAULT_CAPACITY);
            debug!(old_capacity, new_capacity = capacity, len = new_len, "gap array grows");
        }

        let slack = if index == old_len {
            Slack::Back
        } else if index == 0 {
            Slack::Front
        } else {
            Slack::Even
        };
        let free = capacity - new_len;
        let front = match slack {
            Slack::Back => 0,
            Slack::Front => free,
            Slack::Even => free / 2,
        };

        let mut next = vec![K::DEFAULT; capacity];
        let src = self.front;
        next[front..front + index].copy_from_slice(&self.buf[src..src + index]);
        next[front + index + count..front + new_len].copy_from_slice(&self.buf[src + index..src + old_len]);

        self.buf = next;
        self.front = front;
    }
}

impl<K: Kind> Default for GapArrayStore<K> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<K: Kind> Store for GapArrayStore<K> {
    type Elem = K;

    fn create(config: &Config) -> Self {
        return GapArrayStore::with_capacity(config.capacity);
    }

    fn from_slice(_config: &Config, values: &[K]) -> Self {
        return GapArrayStore::from_values(values);
    }

    fn create_like(&self, capacity: usize) -> Self {
        return GapArrayStore::with_capacity(capacity);
    }

    #[inline(always)]
    fn len(&self) -> usize {
        return self.len;
    }

    #[inline(always)]
    fn capacity(&self) -> usize {
        return self.buf.len();
    }

    #[inline]
    fn get(&self, index: usize) -> K {
        return self.as_slice()[index];
    }

    #[inline]
    fn set(&mut self, index: usize, value: K) -> K {
        let slot = &mut self.as_mut_slice()[index];
        return std::mem::replace(slot, value);
    }

    #[inline]
    fn chunk_at(&self, index: usize) -> &[K] {
        return &self.as_slice()[index..];
    }

    fn chunk_before(&self, end: usize) -> &[K] {
        return &self.as_slice()[..end];
    }

    fn read_region(&self, index: usize, out: &mut [K]) {
        out.copy_from_slice(&self.as_slice()[index..index + out.len()]);
    }

    fn write_region(&mut self, index: usize, values: &[K]) {
        self.as_mut_slice()[index..index + values.len()].copy_from_slice(values);
    }

    fn insert_region(&mut self, index: usize, values: &[K]) {
        let count = values.len();
        if count == 0 {
            return;
        }
        assert!(index <= self.len, "insert index {index} beyond length {}", self.len);

        let len = self.len;
        if index <= len - index {
            if self.front >= count {
                let f = self.front;
                self.buf.copy_within(f..f + index, f - count);
                self.front -= count;
            } else {
                self.relayout(index, count);
            }
        } else if self.back_slack() >= count {
            let start = self.front + index;
            self.buf.copy_within(start..self.front + len, start + count);
        } else {
            self.relayout(index, count);
        }

        let at = self.front + index;
        self.buf[at..at + count].copy_from_slice(values);
        self.len += count;
    }

    fn remove_region(&mut self, index: usize, len: usize) {
        if len == 0 {
            return;
        }
        assert!(index + len <= self.len, "remove range {index}+{len} beyond length {}", self.len);

        let f = self.front;
        let n = self.len;
        let tail = n - index - len;
        if index < tail {
            self.buf.copy_within(f..f + index, f + len);
            self.buf[f..f + len].fill(K::DEFAULT);
            self.front += len;
        } else {
            self.buf.copy_within(f + index + len..f + n, f + index);
            self.buf[f + n - len..f + n].fill(K::DEFAULT);
        }
        self.len -= len;
        if self.len == 0 {
            self.front = 0;
        }
    }

    fn fill_region(&mut self, index: usize, len: usize, value: K) {
        self.as_mut_slice()[index..index + len].fill(value);
    }

    fn reserve(&mut self, min_capacity: usize) {
        let capacity = self.buf.len();
        if min_capacity <= capacity {
            return;
        }
        let new_capacity = min_capacity.max(capacity * 2);
        debug!(old_capacity = capacity, new_capacity, "gap array reserves");
        let mut next = vec![K::DEFAULT; new_capacity];
        next[..self.len].copy_from_slice(self.as_slice());
        self.buf = next;
        self.front = 0;
    }

    fn trim(&mut self) {
        if self.buf.len() == self.len {
            return;
        }
        debug!(old_capacity = self.buf.len(), new_capacity = self.len, "gap array trims");
        self.buf = self.as_slice().to_vec();
        self.front = 0;
    }

    fn clear(&mut self) {
        self.buf.fill(K::DEFAULT);
        self.front = 0;
        self.len = 0;
    }
}

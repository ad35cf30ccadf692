use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::ControlFlow;

use rustc_hash::FxHashSet;

use crate::config::Config;
use crate::error::{check_index, check_position, check_range, SeqError};
use crate::kind::Kind;
use crate::seq::list::List;
use crate::seq::region::{Region, Visit};
use crate::store::{BlockTreeStore, GapArrayStore, Store};

/// An ordered sequence owning exactly one store.
///
/// All index validation happens here; the store below trusts its caller.
/// Cloning deep-copies the store.
#[derive(Clone)]
pub struct Sequence<S: Store> {
    store: S,
}

/// Sequence over a contiguous gap buffer.
pub type GapSeq<K> = Sequence<GapArrayStore<K>>;

/// Sequence over a block tree, for very large sizes.
pub type TreeSeq<K> = Sequence<BlockTreeStore<K>>;

impl<S: Store> Sequence<S> {
    pub fn new() -> Self {
        return Sequence::from_store(S::create(&Config::default()));
    }

    pub fn with_capacity(capacity: usize) -> Self {
        return Sequence::from_store(S::create(&Config::default().with_capacity(capacity)));
    }

    pub fn with_config(config: Config) -> Result<Self, SeqError> {
        config.validate()?;
        return Ok(Sequence::from_store(S::create(&config)));
    }

    /// Bulk-copies `values` once.
    pub fn from_slice(values: &[S::Elem]) -> Self {
        return Sequence::from_store(S::from_slice(&Config::default(), values));
    }

    pub fn from_store(store: S) -> Self {
        return Sequence { store };
    }

    pub fn store(&self) -> &S {
        return &self.store;
    }

    pub fn into_store(self) -> S {
        return self.store;
    }

    /// Elements in order, walked one contiguous chunk at a time. Reverse it
    /// for the descending order.
    pub fn iter(&self) -> Iter<'_, S> {
        return Iter {
            store: &self.store,
            next: 0,
            end: self.store.len(),
            front: <&[S::Elem]>::default().iter(),
            back: <&[S::Elem]>::default().iter(),
        };
    }

    /// Elements from last to first.
    pub fn descending_iter(&self) -> std::iter::Rev<Iter<'_, S>> {
        return self.iter().rev();
    }

    /// A new sequence of the same store kind holding a copy of the window.
    pub fn get_all(&self, index: usize, len: usize) -> Result<Self, SeqError> {
        check_range(index, len, self.store.len())?;
        let mut window = vec![S::Elem::DEFAULT; len];
        self.store.read_region(index, &mut window);
        return Ok(self.like(&window));
    }

    /// Removes the window and returns it as a new sequence of the same
    /// store kind.
    pub fn extract(&mut self, index: usize, len: usize) -> Result<Self, SeqError> {
        let window = self.get_all(index, len)?;
        self.store.remove_region(index, len);
        return Ok(window);
    }

    /// A new sequence holding the elements matching `matches`, in order.
    pub fn get_where(&self, matches: impl Fn(&S::Elem) -> bool) -> Self {
        let values: Vec<S::Elem> = self.iter().filter(|v| matches(v)).collect();
        return self.like(&values);
    }

    /// Removes the elements matching `matches` and returns them, in order.
    pub fn extract_where(&mut self, matches: impl Fn(&S::Elem) -> bool) -> Self {
        let (taken, kept): (Vec<S::Elem>, Vec<S::Elem>) = self.iter().partition(|v| matches(v));
        if !taken.is_empty() {
            self.store.clear();
            self.store.insert_region(0, &kept);
        }
        return self.like(&taken);
    }

    /// Each distinct element once, in order of first occurrence.
    pub fn distinct(&self) -> Self {
        let mut seen = FxHashSet::default();
        let values: Vec<S::Elem> = self.iter().filter(|v| seen.insert(v.hash_bits())).collect();
        return self.like(&values);
    }

    fn like(&self, values: &[S::Elem]) -> Self {
        let mut store = self.store.create_like(values.len());
        store.insert_region(0, values);
        return Sequence { store };
    }

    /// Replaces this sequence's content with a copy of `other`'s.
    pub fn assign_from<T: Store<Elem = S::Elem>>(&mut self, other: &Sequence<T>) {
        let values = other.to_vec();
        self.store.clear();
        self.store.insert_region(0, &values);
    }

    pub fn ensure_capacity(&mut self, min_capacity: usize) {
        self.store.reserve(min_capacity);
    }

    pub fn trim(&mut self) {
        self.store.trim();
    }
}

impl<K: Kind> Sequence<BlockTreeStore<K>> {
    pub fn with_block_size(block_size: usize) -> Result<Self, SeqError> {
        return Sequence::with_config(Config::default().with_block_size(block_size));
    }

    pub fn check_invariants(&self) {
        self.store.check_invariants();
    }
}

impl<S: Store> Region for Sequence<S> {
    type Elem = S::Elem;

    #[inline]
    fn len(&self) -> usize {
        return self.store.len();
    }

    fn capacity(&self) -> usize {
        return self.store.capacity();
    }

    #[inline]
    fn get(&self, index: usize) -> Result<S::Elem, SeqError> {
        check_index(index, self.store.len())?;
        return Ok(self.store.get(index));
    }

    fn read_region(&self, index: usize, out: &mut [S::Elem]) -> Result<(), SeqError> {
        check_range(index, out.len(), self.store.len())?;
        self.store.read_region(index, out);
        return Ok(());
    }

    fn visit_region(&self, index: usize, len: usize, visit: &mut Visit<'_, S::Elem>) -> Result<ControlFlow<()>, SeqError> {
        check_range(index, len, self.store.len())?;
        let mut done = 0;
        while done < len {
            let chunk = self.store.chunk_at(index + done);
            let take = chunk.len().min(len - done);
            if visit(index + done, &chunk[..take]).is_break() {
                return Ok(ControlFlow::Break(()));
            }
            done += take;
        }
        return Ok(ControlFlow::Continue(()));
    }

    #[inline]
    fn set(&mut self, index: usize, value: S::Elem) -> Result<S::Elem, SeqError> {
        check_index(index, self.store.len())?;
        return Ok(self.store.set(index, value));
    }

    fn write_region(&mut self, index: usize, values: &[S::Elem]) -> Result<(), SeqError> {
        check_range(index, values.len(), self.store.len())?;
        self.store.write_region(index, values);
        return Ok(());
    }

    fn insert_region(&mut self, index: usize, values: &[S::Elem]) -> Result<(), SeqError> {
        check_position(index, self.store.len())?;
        self.store.insert_region(index, values);
        return Ok(());
    }

    fn remove_region(&mut self, index: usize, len: usize) -> Result<(), SeqError> {
        check_range(index, len, self.store.len())?;
        self.store.remove_region(index, len);
        return Ok(());
    }

    fn fill_region(&mut self, index: usize, len: usize, value: S::Elem) -> Result<(), SeqError> {
        check_range(index, len, self.store.len())?;
        self.store.fill_region(index, len, value);
        return Ok(());
    }

    fn reserve(&mut self, min_capacity: usize) -> Result<(), SeqError> {
        self.store.reserve(min_capacity);
        return Ok(());
    }

    fn trim_to_size(&mut self) -> Result<(), SeqError> {
        self.store.trim();
        return Ok(());
    }
}

/// Iterator over a sequence's elements by value, from either end.
pub struct Iter<'a, S: Store> {
    store: &'a S,
    /// Elements in `[next, end)` are not loaded into either chunk yet.
    next: usize,
    end: usize,
    front: std::slice::Iter<'a, S::Elem>,
    back: std::slice::Iter<'a, S::Elem>,
}

impl<S: Store> Iterator for Iter<'_, S> {
    type Item = S::Elem;

    fn next(&mut self) -> Option<S::Elem> {
        loop {
            if let Some(value) = self.front.next() {
                return Some(*value);
            }
            if self.next == self.end {
                return self.back.next().copied();
            }
            let chunk = self.store.chunk_at(self.next);
            let take = chunk.len().min(self.end - self.next);
            self.front = chunk[..take].iter();
            self.next += take;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.front.len() + (self.end - self.next) + self.back.len();
        return (remaining, Some(remaining));
    }
}

impl<S: Store> DoubleEndedIterator for Iter<'_, S> {
    fn next_back(&mut self) -> Option<S::Elem> {
        loop {
            if let Some(value) = self.back.next_back() {
                return Some(*value);
            }
            if self.next == self.end {
                return self.front.next_back().copied();
            }
            let chunk = self.store.chunk_before(self.end);
            let take = chunk.len().min(self.end - self.next);
            self.back = chunk[chunk.len() - take..].iter();
            self.end -= take;
        }
    }
}

impl<S: Store> ExactSizeIterator for Iter<'_, S> {}

impl<'a, S: Store> IntoIterator for &'a Sequence<S> {
    type Item = S::Elem;
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Iter<'a, S> {
        return self.iter();
    }
}

impl<S: Store> Default for Sequence<S> {
    fn default() -> Self {
        return Sequence::new();
    }
}

impl<S: Store> FromIterator<S::Elem> for Sequence<S> {
    fn from_iter<I: IntoIterator<Item = S::Elem>>(iter: I) -> Self {
        let values: Vec<S::Elem> = iter.into_iter().collect();
        return Sequence::from_slice(&values);
    }
}

impl<S: Store> Extend<S::Elem> for Sequence<S> {
    fn extend<I: IntoIterator<Item = S::Elem>>(&mut self, iter: I) {
        let values: Vec<S::Elem> = iter.into_iter().collect();
        let len = self.store.len();
        self.store.insert_region(len, &values);
    }
}

impl<S: Store> From<Vec<S::Elem>> for Sequence<S> {
    fn from(values: Vec<S::Elem>) -> Self {
        return Sequence::from_slice(&values);
    }
}

impl<S: Store> From<&[S::Elem]> for Sequence<S> {
    fn from(values: &[S::Elem]) -> Self {
        return Sequence::from_slice(values);
    }
}

impl<S: Store, T: Store<Elem = S::Elem>> PartialEq<Sequence<T>> for Sequence<S> {
    fn eq(&self, other: &Sequence<T>) -> bool {
        return self.equals(other);
    }
}

impl<S: Store> Eq for Sequence<S> {}

impl<S: Store> Hash for Sequence<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.store.len());
        for value in self.iter() {
            state.write_u64(value.hash_bits());
        }
    }
}

impl<S: Store> fmt::Display for Sequence<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        return f.write_str("]");
    }
}

impl<S: Store> fmt::Debug for Sequence<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_list().entries(self.iter()).finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        let empty: GapSeq<i32> = Sequence::new();
        assert!(empty.is_empty());
        let hinted: GapSeq<i32> = Sequence::with_capacity(100);
        assert!(hinted.capacity() >= 100);
        assert_eq!(hinted, empty);

        let seq: TreeSeq<i64> = [1, 2, 3].into_iter().collect();
        assert_eq!(seq.to_vec(), vec![1, 2, 3]);
        let seq = GapSeq::from(vec!['a', 'b']);
        assert_eq!(seq.to_string(), "[a, b]");
    }

    #[test]
    fn bad_block_size_rejected() {
        assert!(matches!(TreeSeq::<i32>::with_block_size(2), Err(SeqError::InvalidArgument(_))));
    }

    #[test]
    fn checked_access() {
        let mut seq = GapSeq::from_slice(&[1, 2, 3]);
        assert_eq!(seq.get(2), Ok(3));
        assert_eq!(seq.get(3), Err(SeqError::IndexOutOfRange { index: 3, len: 1, size: 3 }));
        assert!(seq.insert(4, 9).is_err());
        assert!(seq.remove_range(2, 2).is_err());
        assert_eq!(seq.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn iteration_crosses_blocks() {
        let values: Vec<i32> = (0..100).collect();
        let mut seq = TreeSeq::with_block_size(8).expect("valid block size");
        seq.add_all(&values).expect("append");
        assert_eq!(seq.iter().len(), 100);
        assert_eq!(seq.iter().collect::<Vec<_>>(), values);
        assert_eq!((&seq).into_iter().sum::<i32>(), 4950);
    }

    #[test]
    fn equality_across_stores() {
        let gap = GapSeq::from_slice(&[1.5f64, f64::NAN]);
        let tree = TreeSeq::from_slice(&[1.5f64, f64::NAN]);
        assert_eq!(gap, tree);
        assert_eq!(gap.content_hash(), tree.content_hash());
        assert_ne!(gap, TreeSeq::from_slice(&[1.5f64, -f64::NAN]));
    }

    #[test]
    fn get_all_keeps_store_kind() {
        let seq = TreeSeq::<i32>::with_block_size(8)
            .map(|mut seq| {
                seq.extend(0..40);
                seq
            })
            .expect("valid block size");
        let window = seq.get_all(10, 20).expect("in range");
        assert_eq!(window.store().block_size(), 8);
        assert_eq!(window.to_vec(), (10..30).collect::<Vec<_>>());
        assert!(seq.get_all(30, 20).is_err());
    }

    #[test]
    fn assign_from_is_a_copy() {
        let mut target = GapSeq::from_slice(&[9, 9]);
        let mut source = TreeSeq::from_slice(&[1, 2, 3]);
        target.assign_from(&source);
        source.set(0, 100).expect("in range");
        assert_eq!(target.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn clone_is_independent() {
        let mut seq = GapSeq::from_slice(&[1, 2, 3]);
        let copy = seq.clone();
        seq.add(4).expect("append");
        assert_eq!(copy.len(), 3);
        assert_ne!(seq, copy);
    }

    #[test]
    fn debug_and_display() {
        let seq = GapSeq::from_slice(&[true, false]);
        assert_eq!(format!("{seq}"), "[true, false]");
        assert_eq!(format!("{seq:?}"), "[true, false]");
        assert_eq!(GapSeq::<i8>::new().to_string(), "[]");
    }

    #[test]
    fn reverse_iteration_crosses_blocks() {
        let values: Vec<i32> = (0..100).collect();
        let mut seq = TreeSeq::with_block_size(8).expect("valid block size");
        seq.add_all(&values).expect("append");
        let backwards: Vec<i32> = seq.descending_iter().collect();
        assert_eq!(backwards, values.iter().rev().copied().collect::<Vec<_>>());

        let mut iter = seq.iter();
        assert_eq!(iter.next(), Some(0));
        assert_eq!(iter.next_back(), Some(99));
        assert_eq!(iter.len(), 98);
        let middle: Vec<i32> = iter.collect();
        assert_eq!(middle, (1..99).collect::<Vec<_>>());
    }

    #[test]
    fn iterator_ends_meet_inside_one_chunk() {
        let seq = GapSeq::from_slice(&[1, 2, 3]);
        let mut iter = seq.iter();
        assert_eq!(iter.next_back(), Some(3));
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next_back(), Some(2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn extract_removes_the_window() {
        let mut seq = TreeSeq::<i32>::with_block_size(4).expect("valid block size");
        seq.extend(0..20);
        let window = seq.extract(5, 10).expect("in range");
        assert_eq!(window.to_vec(), (5..15).collect::<Vec<_>>());
        assert_eq!(window.store().block_size(), 4);
        assert_eq!(seq.to_vec(), [0, 1, 2, 3, 4, 15, 16, 17, 18, 19]);
        seq.check_invariants();
        assert!(seq.extract(8, 3).is_err());
        assert_eq!(seq.len(), 10);
    }

    #[test]
    fn predicate_queries() {
        let mut seq = GapSeq::from_slice(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(seq.get_where(|v| v % 2 == 0).to_vec(), vec![2, 4, 6]);
        assert_eq!(seq.len(), 6);

        let taken = seq.extract_where(|v| *v > 4);
        assert_eq!(taken.to_vec(), vec![5, 6]);
        assert_eq!(seq.to_vec(), vec![1, 2, 3, 4]);
        assert!(seq.extract_where(|v| *v > 10).is_empty());
    }

    #[test]
    fn distinct_keeps_first_occurrences() {
        let seq = GapSeq::from_slice(&[3, 1, 3, 2, 1]);
        assert_eq!(seq.distinct().to_vec(), vec![3, 1, 2]);
        let floats = TreeSeq::from_slice(&[0.0f32, -0.0, f32::NAN, f32::NAN]);
        assert_eq!(floats.distinct().len(), 3);
    }
}

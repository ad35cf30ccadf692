//! Boxed-element API over a primitive sequence.
//!
//! [`ObjSequence`] accepts and returns [`Value`]s so generic call sites can
//! hand it anything. Conversion happens once per call at the boundary (one
//! allocation for bulk transfers); the wrapped region only ever sees its own
//! element kind.
//!
//! Membership queries treat `Null` or a value of another kind as absent.
//! Sorting and searching accept only the natural order, because a primitive
//! store cannot honor a comparator over boxed values.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::SeqError;
use crate::kind::{box_all, unbox_all, unbox_compatible, Kind, Value};
use crate::seq::{GapSeq, List, Region, Sequence, TreeSeq};
use crate::store::Store;

/// Ordering requested by a boxed sort or search.
#[derive(Clone, Copy)]
pub enum Comparator<'c> {
    Natural,
    Custom(&'c dyn Fn(&Value, &Value) -> Ordering),
}

impl fmt::Debug for Comparator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Comparator::Natural => f.write_str("Natural"),
            Comparator::Custom(_) => f.write_str("Custom(..)"),
        };
    }
}

/// A region seen through boxed values.
#[derive(Clone, Debug, Default)]
pub struct ObjSequence<R> {
    inner: R,
}

pub type ObjGapSeq<K> = ObjSequence<GapSeq<K>>;
pub type ObjTreeSeq<K> = ObjSequence<TreeSeq<K>>;

fn wrong_kind<K: Kind>(value: &Value) -> SeqError {
    return SeqError::InvalidArgument(format!("expected {}, found {}", K::NAME, value.kind_name()));
}

fn unbox<K: Kind>(value: &Value) -> Result<K, SeqError> {
    return K::from_value(value).ok_or_else(|| wrong_kind::<K>(value));
}

fn unbox_slice<K: Kind>(values: &[Value]) -> Result<Vec<K>, SeqError> {
    match unbox_all(values) {
        Some(unboxed) => return Ok(unboxed),
        None => {
            let bad = values.iter().find(|v| K::from_value(v).is_none());
            return Err(match bad {
                Some(value) => wrong_kind::<K>(value),
                None => SeqError::InvalidArgument(format!("expected {}", K::NAME)),
            });
        }
    }
}

fn natural_only(comparator: Comparator<'_>) -> Result<(), SeqError> {
    match comparator {
        Comparator::Natural => return Ok(()),
        Comparator::Custom(_) => {
            return Err(SeqError::InvalidArgument(
                "only the natural order is supported on primitive sequences".to_string(),
            ))
        }
    }
}

impl<S: Store> ObjSequence<Sequence<S>> {
    pub fn new() -> Self {
        return ObjSequence::wrap(Sequence::new());
    }

    pub fn with_capacity(capacity: usize) -> Self {
        return ObjSequence::wrap(Sequence::with_capacity(capacity));
    }

    /// Builds from boxed values, all of which must be of the element kind.
    pub fn from_values(values: &[Value]) -> Result<Self, SeqError> {
        let unboxed = unbox_slice::<S::Elem>(values)?;
        return Ok(ObjSequence::wrap(Sequence::from_slice(&unboxed)));
    }
}

impl<R: Region> ObjSequence<R> {
    pub fn wrap(inner: R) -> Self {
        return ObjSequence { inner };
    }

    pub fn inner(&self) -> &R {
        return &self.inner;
    }

    pub fn inner_mut(&mut self) -> &mut R {
        return &mut self.inner;
    }

    pub fn into_inner(self) -> R {
        return self.inner;
    }

    pub fn len(&self) -> usize {
        return self.inner.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.inner.is_empty();
    }

    pub fn get(&self, index: usize) -> Result<Value, SeqError> {
        return Ok(self.inner.get(index)?.into_value());
    }

    pub fn set(&mut self, index: usize, value: &Value) -> Result<Value, SeqError> {
        let value = unbox::<R::Elem>(value)?;
        return Ok(self.inner.set(index, value)?.into_value());
    }

    pub fn add(&mut self, value: &Value) -> Result<bool, SeqError> {
        let value = unbox::<R::Elem>(value)?;
        self.inner.add(value)?;
        return Ok(true);
    }

    pub fn insert(&mut self, index: usize, value: &Value) -> Result<(), SeqError> {
        let value = unbox::<R::Elem>(value)?;
        return self.inner.insert(index, value);
    }

    pub fn add_all(&mut self, values: &[Value]) -> Result<bool, SeqError> {
        let values = unbox_slice::<R::Elem>(values)?;
        return self.inner.add_all(&values);
    }

    pub fn insert_all(&mut self, index: usize, values: &[Value]) -> Result<bool, SeqError> {
        let values = unbox_slice::<R::Elem>(values)?;
        return self.inner.insert_all(index, &values);
    }

    pub fn remove(&mut self, index: usize) -> Result<Value, SeqError> {
        return Ok(self.inner.remove(index)?.into_value());
    }

    pub fn set_all(&mut self, index: usize, values: &[Value]) -> Result<(), SeqError> {
        let values = unbox_slice::<R::Elem>(values)?;
        return self.inner.set_all(index, &values);
    }

    pub fn remove_range(&mut self, index: usize, len: usize) -> Result<(), SeqError> {
        return self.inner.remove_range(index, len);
    }

    pub fn clear(&mut self) -> Result<(), SeqError> {
        return self.inner.clear();
    }

    pub fn add_if_absent(&mut self, value: &Value) -> Result<bool, SeqError> {
        let value = unbox::<R::Elem>(value)?;
        return self.inner.add_if_absent(value);
    }

    // =========================================================================
    // Type-exact membership
    // =========================================================================

    pub fn contains(&self, value: &Value) -> bool {
        return R::Elem::from_value(value).is_some_and(|v| self.inner.contains(v));
    }

    pub fn index_of(&self, value: &Value) -> Option<usize> {
        return R::Elem::from_value(value).and_then(|v| self.inner.index_of(v));
    }

    pub fn last_index_of(&self, value: &Value) -> Option<usize> {
        return R::Elem::from_value(value).and_then(|v| self.inner.last_index_of(v));
    }

    /// Removes the first occurrence; `Ok(false)` for absent or foreign values.
    pub fn remove_value(&mut self, value: &Value) -> Result<bool, SeqError> {
        self.inner.ensure_writable("remove")?;
        match R::Elem::from_value(value) {
            Some(v) => return self.inner.remove_first_occurrence(v),
            None => return Ok(false),
        }
    }

    pub fn contains_any(&self, values: &[Value]) -> bool {
        return self.inner.contains_any(&unbox_compatible::<R::Elem>(values));
    }

    /// A foreign value can never be contained, so it makes the answer false.
    pub fn contains_all(&self, values: &[Value]) -> bool {
        match unbox_all::<R::Elem>(values) {
            Some(unboxed) => return self.inner.contains_all(&unboxed),
            None => return false,
        }
    }

    pub fn remove_all(&mut self, values: &[Value]) -> Result<bool, SeqError> {
        return self.inner.remove_all(&unbox_compatible::<R::Elem>(values));
    }

    pub fn retain_all(&mut self, values: &[Value]) -> Result<bool, SeqError> {
        return self.inner.retain_all(&unbox_compatible::<R::Elem>(values));
    }

    // =========================================================================
    // Deque and queue
    // =========================================================================

    pub fn add_first(&mut self, value: &Value) -> Result<(), SeqError> {
        return self.inner.add_first(unbox::<R::Elem>(value)?);
    }

    pub fn add_last(&mut self, value: &Value) -> Result<(), SeqError> {
        return self.inner.add_last(unbox::<R::Elem>(value)?);
    }

    pub fn offer(&mut self, value: &Value) -> Result<bool, SeqError> {
        return self.inner.offer(unbox::<R::Elem>(value)?);
    }

    pub fn peek(&self) -> Option<Value> {
        return self.inner.peek().map(Kind::into_value);
    }

    pub fn peek_first(&self) -> Option<Value> {
        return self.inner.peek_first().map(Kind::into_value);
    }

    pub fn peek_last(&self) -> Option<Value> {
        return self.inner.peek_last().map(Kind::into_value);
    }

    pub fn element(&self) -> Result<Value, SeqError> {
        return Ok(self.inner.element()?.into_value());
    }

    /// Queue retrieval from the head; `Ok(None)` when empty.
    pub fn poll(&mut self) -> Result<Option<Value>, SeqError> {
        return Ok(self.inner.poll()?.map(Kind::into_value));
    }

    /// Queue removal from the head; fails when empty.
    pub fn remove_head(&mut self) -> Result<Value, SeqError> {
        return Ok(self.inner.remove_head()?.into_value());
    }

    pub fn remove_first(&mut self) -> Result<Value, SeqError> {
        return Ok(self.inner.remove_first()?.into_value());
    }

    pub fn remove_last(&mut self) -> Result<Value, SeqError> {
        return Ok(self.inner.remove_last()?.into_value());
    }

    pub fn poll_first(&mut self) -> Result<Option<Value>, SeqError> {
        return Ok(self.inner.poll_first()?.map(Kind::into_value));
    }

    pub fn poll_last(&mut self) -> Result<Option<Value>, SeqError> {
        return Ok(self.inner.poll_last()?.map(Kind::into_value));
    }

    pub fn push(&mut self, value: &Value) -> Result<(), SeqError> {
        return self.inner.push(unbox::<R::Elem>(value)?);
    }

    pub fn pop(&mut self) -> Result<Value, SeqError> {
        return Ok(self.inner.pop()?.into_value());
    }

    // =========================================================================
    // Region algebra
    // =========================================================================

    pub fn move_region(&mut self, src: usize, dst: usize, len: usize) -> Result<(), SeqError> {
        return self.inner.move_region(src, dst, len);
    }

    pub fn copy_region(&mut self, src: usize, dst: usize, len: usize) -> Result<(), SeqError> {
        return self.inner.copy_region(src, dst, len);
    }

    pub fn swap_region(&mut self, a: usize, b: usize, len: usize) -> Result<(), SeqError> {
        return self.inner.swap_region(a, b, len);
    }

    pub fn drag(&mut self, src: usize, dst: usize, len: usize) -> Result<(), SeqError> {
        return self.inner.drag(src, dst, len);
    }

    pub fn reverse(&mut self) -> Result<(), SeqError> {
        return self.inner.reverse();
    }

    pub fn reverse_range(&mut self, index: usize, len: usize) -> Result<(), SeqError> {
        return self.inner.reverse_range(index, len);
    }

    pub fn rotate(&mut self, distance: isize) -> Result<(), SeqError> {
        return self.inner.rotate(distance);
    }

    pub fn rotate_range(&mut self, index: usize, len: usize, distance: isize) -> Result<(), SeqError> {
        return self.inner.rotate_range(index, len, distance);
    }

    pub fn fill(&mut self, value: &Value) -> Result<(), SeqError> {
        let value = unbox::<R::Elem>(value)?;
        return self.inner.fill(value);
    }

    pub fn fill_range(&mut self, index: usize, len: usize, value: &Value) -> Result<(), SeqError> {
        let value = unbox::<R::Elem>(value)?;
        return self.inner.fill_range(index, len, value);
    }

    /// Truncates to `len`, or pads with copies of `value`.
    pub fn resize(&mut self, len: usize, value: &Value) -> Result<(), SeqError> {
        let value = unbox::<R::Elem>(value)?;
        return self.inner.resize(len, value);
    }

    pub fn init(&mut self, len: usize, value: &Value) -> Result<(), SeqError> {
        let value = unbox::<R::Elem>(value)?;
        return self.inner.init(len, value);
    }

    // =========================================================================
    // Bulk transfer
    // =========================================================================

    pub fn to_array(&self) -> Vec<Value> {
        return box_all(&self.inner.to_vec());
    }

    pub fn to_array_range(&self, index: usize, len: usize) -> Result<Vec<Value>, SeqError> {
        return Ok(box_all(&self.inner.to_vec_range(index, len)?));
    }

    /// Copies into `dest`, growing it when too short. When `dest` is longer,
    /// the slot right after the last element is set to `Null`.
    pub fn to_array_into(&self, dest: &mut Vec<Value>) {
        let values = self.inner.to_vec();
        let n = values.len();
        if dest.len() < n {
            dest.resize(n, Value::Null);
        }
        for (slot, value) in dest.iter_mut().zip(values) {
            *slot = value.into_value();
        }
        if dest.len() > n {
            dest[n] = Value::Null;
        }
    }

    /// The window as a primitive array.
    pub fn get_array(&self, index: usize, len: usize) -> Result<Vec<R::Elem>, SeqError> {
        return self.inner.to_vec_range(index, len);
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    pub fn sort(&mut self, comparator: Comparator<'_>) -> Result<(), SeqError> {
        let len = self.inner.len();
        return self.sort_range(0, len, comparator);
    }

    pub fn sort_range(&mut self, index: usize, len: usize, comparator: Comparator<'_>) -> Result<(), SeqError> {
        natural_only(comparator)?;
        return self.inner.sort_range(index, len);
    }

    pub fn binary_search(&self, key: &Value, comparator: Comparator<'_>) -> Result<Result<usize, usize>, SeqError> {
        let len = self.inner.len();
        return self.binary_search_range(0, len, key, comparator);
    }

    /// Fails on a custom comparator and on a `Null` or foreign key.
    pub fn binary_search_range(
        &self,
        index: usize,
        len: usize,
        key: &Value,
        comparator: Comparator<'_>,
    ) -> Result<Result<usize, usize>, SeqError> {
        natural_only(comparator)?;
        if matches!(key, Value::Null) {
            return Err(SeqError::InvalidArgument("binary search key is null".to_string()));
        }
        let key = unbox::<R::Elem>(key)?;
        return self.inner.binary_search_range(index, len, key);
    }
}

impl<R: Region> fmt::Display for ObjSequence<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.inner.to_vec().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        return f.write_str("]");
    }
}

impl<R: Region, O: Region<Elem = R::Elem>> PartialEq<ObjSequence<O>> for ObjSequence<R> {
    fn eq(&self, other: &ObjSequence<O>) -> bool {
        return self.inner.equals(&other.inner);
    }
}

impl<R: Region> Eq for ObjSequence<R> {}

impl<R: Region> Hash for ObjSequence<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.inner.content_hash());
    }
}

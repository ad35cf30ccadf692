//! Derived sequence operations.
//!
//! Everything here is written once against [`Region`] and is available on
//! any implementor through the blanket [`List`] impl: the owned
//! [`Sequence`](crate::seq::Sequence) as well as the read-only
//! [`ImmutableView`](crate::view::ImmutableView). Mutators check
//! [`Region::ensure_writable`] before their first read so a rejected call
//! leaves the backing content untouched.
//!
//! Window arguments are `(index, len)` pairs. Bulk operations read the
//! window once, permute in a scratch buffer, and write it back once, so a
//! block tree pays one descent per affected block rather than per element.

use std::cmp::Ordering;
use std::hash::Hasher;
use std::ops::ControlFlow;

use rustc_hash::{FxHashSet, FxHasher};

use crate::error::{check_range, illegal_state, SeqError};
use crate::kind::Kind;
use crate::seq::region::Region;

fn bit_set<K: Kind>(values: &[K]) -> FxHashSet<u64> {
    return values.iter().map(|v| v.hash_bits()).collect();
}

pub trait List: Region {
    fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The first element, or [`SeqError::NoSuchElement`] when empty.
    fn first(&self) -> Result<Self::Elem, SeqError> {
        if self.is_empty() {
            return Err(SeqError::NoSuchElement);
        }
        return self.get(0);
    }

    fn last(&self) -> Result<Self::Elem, SeqError> {
        if self.is_empty() {
            return Err(SeqError::NoSuchElement);
        }
        return self.get(self.len() - 1);
    }

    /// Queue head; same as [`List::first`].
    fn element(&self) -> Result<Self::Elem, SeqError> {
        return self.first();
    }

    fn peek(&self) -> Option<Self::Elem> {
        return self.peek_first();
    }

    fn peek_first(&self) -> Option<Self::Elem> {
        return self.first().ok();
    }

    fn peek_last(&self) -> Option<Self::Elem> {
        return self.last().ok();
    }

    fn to_vec(&self) -> Vec<Self::Elem> {
        let mut out = Vec::with_capacity(self.len());
        let _ = self.visit_all(&mut |_, chunk| {
            out.extend_from_slice(chunk);
            return ControlFlow::Continue(());
        });
        return out;
    }

    fn to_vec_range(&self, index: usize, len: usize) -> Result<Vec<Self::Elem>, SeqError> {
        check_range(index, len, self.try_len()?)?;
        let mut out = vec![Self::Elem::DEFAULT; len];
        self.read_region(index, &mut out)?;
        return Ok(out);
    }

    fn index_of(&self, value: Self::Elem) -> Option<usize> {
        let mut found = None;
        let _ = self.visit_all(&mut |start, chunk| {
            match chunk.iter().position(|v| v.same(value)) {
                Some(offset) => {
                    found = Some(start + offset);
                    return ControlFlow::Break(());
                }
                None => return ControlFlow::Continue(()),
            }
        });
        return found;
    }

    fn last_index_of(&self, value: Self::Elem) -> Option<usize> {
        let mut found = None;
        let _ = self.visit_all(&mut |start, chunk| {
            if let Some(offset) = chunk.iter().rposition(|v| v.same(value)) {
                found = Some(start + offset);
            }
            return ControlFlow::Continue(());
        });
        return found;
    }

    fn contains(&self, value: Self::Elem) -> bool {
        return self.index_of(value).is_some();
    }

    /// True when at least one of `values` is present.
    fn contains_any(&self, values: &[Self::Elem]) -> bool {
        if values.is_empty() {
            return false;
        }
        let wanted = bit_set(values);
        let flow = self.visit_all(&mut |_, chunk| {
            if chunk.iter().any(|v| wanted.contains(&v.hash_bits())) {
                return ControlFlow::Break(());
            }
            return ControlFlow::Continue(());
        });
        return flow.is_break();
    }

    /// True when every one of `values` is present; vacuously true when empty.
    fn contains_all(&self, values: &[Self::Elem]) -> bool {
        let mut missing = bit_set(values);
        if missing.is_empty() {
            return true;
        }
        let _ = self.visit_all(&mut |_, chunk| {
            for v in chunk {
                missing.remove(&v.hash_bits());
            }
            if missing.is_empty() {
                return ControlFlow::Break(());
            }
            return ControlFlow::Continue(());
        });
        return missing.is_empty();
    }

    /// Natural-order binary search over the whole sequence, which must be
    /// sorted. `Ok(index)` of some match, or `Err(insertion_point)`.
    fn binary_search(&self, key: Self::Elem) -> Result<usize, usize> {
        match self.binary_search_range(0, self.len(), key) {
            Ok(found) => return found,
            Err(err) => illegal_state(&format!("full-range search rejected: {err}")),
        }
    }

    fn binary_search_range(&self, index: usize, len: usize, key: Self::Elem) -> Result<Result<usize, usize>, SeqError> {
        check_range(index, len, self.len())?;
        let mut lo = index;
        let mut hi = index + len;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.get(mid)?.natural_cmp(&key) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(Ok(mid)),
            }
        }
        return Ok(Err(lo));
    }

    /// Elementwise equality with any other region of the same kind,
    /// regardless of store or capacity.
    fn equals<O: Region<Elem = Self::Elem> + ?Sized>(&self, other: &O) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let flow = self.visit_all(&mut |start, ours| {
            let mut offset = 0;
            let inner = other.visit_region(start, ours.len(), &mut |_, theirs| {
                let matched = ours[offset..offset + theirs.len()]
                    .iter()
                    .zip(theirs)
                    .all(|(a, b)| a.same(*b));
                offset += theirs.len();
                if matched {
                    return ControlFlow::Continue(());
                }
                return ControlFlow::Break(());
            });
            match inner {
                Ok(ControlFlow::Continue(())) => return ControlFlow::Continue(()),
                _ => return ControlFlow::Break(()),
            }
        });
        return flow.is_continue();
    }

    /// Content hash, consistent with [`List::equals`].
    fn content_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write_usize(self.len());
        let _ = self.visit_all(&mut |_, chunk| {
            for v in chunk {
                hasher.write_u64(v.hash_bits());
            }
            return ControlFlow::Continue(());
        });
        return hasher.finish();
    }

    // =========================================================================
    // List mutators
    // =========================================================================

    fn add(&mut self, value: Self::Elem) -> Result<(), SeqError> {
        let len = self.len();
        return self.insert_region(len, &[value]);
    }

    fn insert(&mut self, index: usize, value: Self::Elem) -> Result<(), SeqError> {
        return self.insert_region(index, &[value]);
    }

    /// Appends `value` unless an equal element is already present.
    fn add_if_absent(&mut self, value: Self::Elem) -> Result<bool, SeqError> {
        self.ensure_writable("add_if_absent")?;
        if self.contains(value) {
            return Ok(false);
        }
        self.add(value)?;
        return Ok(true);
    }

    /// Appends `values`; true when anything was added.
    fn add_all(&mut self, values: &[Self::Elem]) -> Result<bool, SeqError> {
        let len = self.len();
        return self.insert_all(len, values);
    }

    fn insert_all(&mut self, index: usize, values: &[Self::Elem]) -> Result<bool, SeqError> {
        self.ensure_writable("insert_all")?;
        self.insert_region(index, values)?;
        return Ok(!values.is_empty());
    }

    fn set_all(&mut self, index: usize, values: &[Self::Elem]) -> Result<(), SeqError> {
        return self.write_region(index, values);
    }

    /// Removes and returns the element at `index`.
    fn remove(&mut self, index: usize) -> Result<Self::Elem, SeqError> {
        self.ensure_writable("remove")?;
        let value = self.get(index)?;
        self.remove_region(index, 1)?;
        return Ok(value);
    }

    fn remove_range(&mut self, index: usize, len: usize) -> Result<(), SeqError> {
        return self.remove_region(index, len);
    }

    /// Removes the first occurrence of `value`.
    fn remove_elem(&mut self, value: Self::Elem) -> Result<bool, SeqError> {
        return self.remove_first_occurrence(value);
    }

    fn remove_first_occurrence(&mut self, value: Self::Elem) -> Result<bool, SeqError> {
        self.ensure_writable("remove_first_occurrence")?;
        match self.index_of(value) {
            Some(index) => {
                self.remove_region(index, 1)?;
                return Ok(true);
            }
            None => return Ok(false),
        }
    }

    fn remove_last_occurrence(&mut self, value: Self::Elem) -> Result<bool, SeqError> {
        self.ensure_writable("remove_last_occurrence")?;
        match self.last_index_of(value) {
            Some(index) => {
                self.remove_region(index, 1)?;
                return Ok(true);
            }
            None => return Ok(false),
        }
    }

    /// Removes every element equal to one of `values`.
    fn remove_all(&mut self, values: &[Self::Elem]) -> Result<bool, SeqError> {
        self.ensure_writable("remove_all")?;
        let doomed = bit_set(values);
        return self.keep_where(&|v| !doomed.contains(&v.hash_bits()));
    }

    /// Keeps only the elements equal to one of `values`.
    fn retain_all(&mut self, values: &[Self::Elem]) -> Result<bool, SeqError> {
        self.ensure_writable("retain_all")?;
        let kept = bit_set(values);
        return self.keep_where(&|v| kept.contains(&v.hash_bits()));
    }

    /// Removes every element matching `doomed`.
    fn remove_where(&mut self, doomed: &dyn Fn(&Self::Elem) -> bool) -> Result<bool, SeqError> {
        return self.keep_where(&|v| !doomed(v));
    }

    /// Compacts the sequence to the elements matching `keep`, in one read
    /// and one write. True when anything was removed.
    fn keep_where(&mut self, keep: &dyn Fn(&Self::Elem) -> bool) -> Result<bool, SeqError> {
        self.ensure_writable("keep_where")?;
        let len = self.len();
        let mut kept = self.to_vec();
        kept.retain(|v| keep(v));
        if kept.len() == len {
            return Ok(false);
        }
        self.write_region(0, &kept)?;
        self.remove_region(kept.len(), len - kept.len())?;
        return Ok(true);
    }

    fn clear(&mut self) -> Result<(), SeqError> {
        let len = self.len();
        return self.remove_region(0, len);
    }

    // =========================================================================
    // Deque, stack, and queue
    // =========================================================================

    fn add_first(&mut self, value: Self::Elem) -> Result<(), SeqError> {
        return self.insert(0, value);
    }

    fn add_last(&mut self, value: Self::Elem) -> Result<(), SeqError> {
        return self.add(value);
    }

    fn offer(&mut self, value: Self::Elem) -> Result<bool, SeqError> {
        return self.offer_last(value);
    }

    fn offer_first(&mut self, value: Self::Elem) -> Result<bool, SeqError> {
        self.add_first(value)?;
        return Ok(true);
    }

    fn offer_last(&mut self, value: Self::Elem) -> Result<bool, SeqError> {
        self.add_last(value)?;
        return Ok(true);
    }

    fn remove_first(&mut self) -> Result<Self::Elem, SeqError> {
        self.ensure_writable("remove_first")?;
        if self.is_empty() {
            return Err(SeqError::NoSuchElement);
        }
        return self.remove(0);
    }

    fn remove_last(&mut self) -> Result<Self::Elem, SeqError> {
        self.ensure_writable("remove_last")?;
        if self.is_empty() {
            return Err(SeqError::NoSuchElement);
        }
        let last = self.len() - 1;
        return self.remove(last);
    }

    /// Queue removal of the head.
    fn remove_head(&mut self) -> Result<Self::Elem, SeqError> {
        return self.remove_first();
    }

    fn poll(&mut self) -> Result<Option<Self::Elem>, SeqError> {
        return self.poll_first();
    }

    /// Removes the head, or returns `None` when empty.
    fn poll_first(&mut self) -> Result<Option<Self::Elem>, SeqError> {
        self.ensure_writable("poll_first")?;
        if self.is_empty() {
            return Ok(None);
        }
        return self.remove(0).map(Some);
    }

    fn poll_last(&mut self) -> Result<Option<Self::Elem>, SeqError> {
        self.ensure_writable("poll_last")?;
        if self.is_empty() {
            return Ok(None);
        }
        let last = self.len() - 1;
        return self.remove(last).map(Some);
    }

    /// Stack push onto the head.
    fn push(&mut self, value: Self::Elem) -> Result<(), SeqError> {
        return self.add_first(value);
    }

    fn pop(&mut self) -> Result<Self::Elem, SeqError> {
        return self.remove_first();
    }

    // =========================================================================
    // Region algebra
    // =========================================================================

    /// Copies the window at `src` over the window at `dst`, then resets the
    /// source slots the destination did not cover to the kind's default.
    /// Elements outside both windows stay where they are.
    fn move_region(&mut self, src: usize, dst: usize, len: usize) -> Result<(), SeqError> {
        self.ensure_writable("move_region")?;
        let size = self.len();
        check_range(src, len, size)?;
        check_range(dst, len, size)?;
        if len == 0 || src == dst {
            return Ok(());
        }
        let window = self.to_vec_range(src, len)?;
        self.write_region(dst, &window)?;

        let (start, end) = if dst > src {
            (src, (src + len).min(dst))
        } else {
            ((dst + len).max(src), src + len)
        };
        return self.fill_region(start, end - start, Self::Elem::DEFAULT);
    }

    /// Moves the window at `src` so that it starts at `dst`, shifting the
    /// elements in between into the space it left. Size and content are
    /// preserved; only the order changes.
    fn drag(&mut self, src: usize, dst: usize, len: usize) -> Result<(), SeqError> {
        self.ensure_writable("drag")?;
        let size = self.len();
        check_range(src, len, size)?;
        check_range(dst, len, size)?;
        if src < dst {
            return self.rotate_range(src, len + (dst - src), (dst - src) as isize);
        }
        if src > dst {
            return self.rotate_range(dst, len + (src - dst), -((src - dst) as isize));
        }
        return Ok(());
    }

    /// Overwrites the window at `dst` with a copy of the window at `src`.
    /// Overlapping windows behave as if copied through a temporary.
    fn copy_region(&mut self, src: usize, dst: usize, len: usize) -> Result<(), SeqError> {
        self.ensure_writable("copy_region")?;
        check_range(dst, len, self.len())?;
        let window = self.to_vec_range(src, len)?;
        return self.write_region(dst, &window);
    }

    /// Exchanges two equal-length windows, which must not overlap.
    fn swap_region(&mut self, a: usize, b: usize, len: usize) -> Result<(), SeqError> {
        self.ensure_writable("swap_region")?;
        let size = self.len();
        check_range(a, len, size)?;
        check_range(b, len, size)?;
        if len == 0 || a == b {
            return Ok(());
        }
        if a < b + len && b < a + len {
            return Err(SeqError::InvalidArgument(format!(
                "swap windows overlap: {a} and {b}, length {len}"
            )));
        }
        let first = self.to_vec_range(a, len)?;
        let second = self.to_vec_range(b, len)?;
        self.write_region(a, &second)?;
        return self.write_region(b, &first);
    }

    fn reverse(&mut self) -> Result<(), SeqError> {
        let len = self.len();
        return self.reverse_range(0, len);
    }

    fn reverse_range(&mut self, index: usize, len: usize) -> Result<(), SeqError> {
        self.ensure_writable("reverse")?;
        let mut window = self.to_vec_range(index, len)?;
        window.reverse();
        return self.write_region(index, &window);
    }

    /// Moves the element at `i` to `(i + distance) mod len`.
    fn rotate(&mut self, distance: isize) -> Result<(), SeqError> {
        let len = self.len();
        return self.rotate_range(0, len, distance);
    }

    fn rotate_range(&mut self, index: usize, len: usize, distance: isize) -> Result<(), SeqError> {
        self.ensure_writable("rotate")?;
        check_range(index, len, self.len())?;
        if len == 0 {
            return Ok(());
        }
        let shift = distance.rem_euclid(len as isize) as usize;
        if shift == 0 {
            return Ok(());
        }
        let mut window = self.to_vec_range(index, len)?;
        window.rotate_right(shift);
        return self.write_region(index, &window);
    }

    fn fill(&mut self, value: Self::Elem) -> Result<(), SeqError> {
        let len = self.len();
        return self.fill_region(0, len, value);
    }

    fn fill_range(&mut self, index: usize, len: usize, value: Self::Elem) -> Result<(), SeqError> {
        return self.fill_region(index, len, value);
    }

    /// Truncates to `len`, or appends copies of `value` up to `len`.
    fn resize(&mut self, len: usize, value: Self::Elem) -> Result<(), SeqError> {
        self.ensure_writable("resize")?;
        let size = self.len();
        if len > size {
            return self.insert_region(size, &vec![value; len - size]);
        }
        return self.remove_region(len, size - len);
    }

    /// Replaces the content with `len` copies of `value`.
    fn init(&mut self, len: usize, value: Self::Elem) -> Result<(), SeqError> {
        self.ensure_writable("init")?;
        self.clear()?;
        return self.resize(len, value);
    }

    fn sort(&mut self) -> Result<(), SeqError> {
        let len = self.len();
        return self.sort_range(0, len);
    }

    /// Sorts a window in natural order.
    fn sort_range(&mut self, index: usize, len: usize) -> Result<(), SeqError> {
        self.ensure_writable("sort")?;
        let mut window = self.to_vec_range(index, len)?;
        window.sort_unstable_by(|a, b| a.natural_cmp(b));
        return self.write_region(index, &window);
    }
}

impl<R: Region + ?Sized> List for R {}

// =============================================================================
// Transfers between two sequences
// =============================================================================

/// Overwrites `dst[dst_index..dst_index + len]` with a copy of
/// `src[src_index..src_index + len]`.
pub fn copy_between<A, B>(src: &A, src_index: usize, dst: &mut B, dst_index: usize, len: usize) -> Result<(), SeqError>
where
    A: Region + ?Sized,
    B: Region<Elem = A::Elem> + ?Sized,
{
    dst.ensure_writable("copy_between")?;
    check_range(dst_index, len, dst.len())?;
    let window = src.to_vec_range(src_index, len)?;
    return dst.write_region(dst_index, &window);
}

/// Like [`copy_between`], then resets the source window to the default.
pub fn move_between<A, B>(src: &mut A, src_index: usize, dst: &mut B, dst_index: usize, len: usize) -> Result<(), SeqError>
where
    A: Region + ?Sized,
    B: Region<Elem = A::Elem> + ?Sized,
{
    src.ensure_writable("move_between")?;
    copy_between(&*src, src_index, dst, dst_index, len)?;
    return src.fill_region(src_index, len, A::Elem::DEFAULT);
}

/// Exchanges a window of `a` with an equal-length window of `b`.
pub fn swap_between<A, B>(a: &mut A, a_index: usize, b: &mut B, b_index: usize, len: usize) -> Result<(), SeqError>
where
    A: Region + ?Sized,
    B: Region<Elem = A::Elem> + ?Sized,
{
    a.ensure_writable("swap_between")?;
    b.ensure_writable("swap_between")?;
    let first = a.to_vec_range(a_index, len)?;
    let second = b.to_vec_range(b_index, len)?;
    a.write_region(a_index, &second)?;
    return b.write_region(b_index, &first);
}

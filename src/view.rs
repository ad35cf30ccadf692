//! Read-only view over a live sequence.
//!
//! The view borrows the sequence's `RefCell` rather than owning it: every
//! read goes to the current backing content, every mutator (including the
//! [`List`](crate::seq::List) composites, through
//! [`Region::ensure_writable`]) fails with
//! [`SeqError::UnsupportedOperation`] before anything is touched.
//!
//! A view shares its backing cell with whoever owns it. While that cell is
//! mutably borrowed, the `Result` reads fail with [`SeqError::Borrowed`];
//! `len`, `capacity` and the `Debug` output have no error channel and panic
//! like `RefCell::borrow`.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::ops::ControlFlow;

use crate::error::SeqError;
use crate::seq::{Region, Visit};

pub struct ImmutableView<'a, R: Region> {
    backing: &'a RefCell<R>,
}

impl<'a, R: Region> ImmutableView<'a, R> {
    pub fn new(backing: &'a RefCell<R>) -> Self {
        return ImmutableView { backing };
    }

    fn read(&self) -> Result<Ref<'a, R>, SeqError> {
        return self.backing.try_borrow().map_err(|_| SeqError::Borrowed);
    }
}

/// Read-only views over a sequence held in a `RefCell`.
pub trait Unmodifiable {
    type Backing: Region;

    fn unmodifiable_list(&self) -> ImmutableView<'_, Self::Backing>;
}

impl<R: Region> Unmodifiable for RefCell<R> {
    type Backing = R;

    fn unmodifiable_list(&self) -> ImmutableView<'_, R> {
        return ImmutableView::new(self);
    }
}

impl<R: Region> Clone for ImmutableView<'_, R> {
    fn clone(&self) -> Self {
        return *self;
    }
}

impl<R: Region> Copy for ImmutableView<'_, R> {}

impl<R: Region> Region for ImmutableView<'_, R> {
    type Elem = R::Elem;

    fn len(&self) -> usize {
        return self.backing.borrow().len();
    }

    fn try_len(&self) -> Result<usize, SeqError> {
        return Ok(self.read()?.len());
    }

    fn capacity(&self) -> usize {
        return self.backing.borrow().capacity();
    }

    fn get(&self, index: usize) -> Result<R::Elem, SeqError> {
        return self.read()?.get(index);
    }

    fn read_region(&self, index: usize, out: &mut [R::Elem]) -> Result<(), SeqError> {
        return self.read()?.read_region(index, out);
    }

    fn visit_region(&self, index: usize, len: usize, visit: &mut Visit<'_, R::Elem>) -> Result<ControlFlow<()>, SeqError> {
        return self.read()?.visit_region(index, len, visit);
    }

    fn ensure_writable(&self, op: &'static str) -> Result<(), SeqError> {
        return Err(SeqError::UnsupportedOperation(op));
    }

    fn set(&mut self, _index: usize, _value: R::Elem) -> Result<R::Elem, SeqError> {
        return Err(SeqError::UnsupportedOperation("set"));
    }

    fn write_region(&mut self, _index: usize, _values: &[R::Elem]) -> Result<(), SeqError> {
        return Err(SeqError::UnsupportedOperation("write_region"));
    }

    fn insert_region(&mut self, _index: usize, _values: &[R::Elem]) -> Result<(), SeqError> {
        return Err(SeqError::UnsupportedOperation("insert_region"));
    }

    fn remove_region(&mut self, _index: usize, _len: usize) -> Result<(), SeqError> {
        return Err(SeqError::UnsupportedOperation("remove_region"));
    }

    fn fill_region(&mut self, _index: usize, _len: usize, _value: R::Elem) -> Result<(), SeqError> {
        return Err(SeqError::UnsupportedOperation("fill_region"));
    }

    fn reserve(&mut self, _min_capacity: usize) -> Result<(), SeqError> {
        return Err(SeqError::UnsupportedOperation("reserve"));
    }

    fn trim_to_size(&mut self) -> Result<(), SeqError> {
        return Err(SeqError::UnsupportedOperation("trim_to_size"));
    }
}

impl<R: Region> fmt::Debug for ImmutableView<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let _ = self.visit_all(&mut |_, chunk| {
            list.entries(chunk);
            return ControlFlow::Continue(());
        });
        return list.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq::{copy_between, GapSeq, List, TreeSeq};

    #[test]
    fn reads_follow_backing() {
        let cell = RefCell::new(GapSeq::from_slice(&[1, 2, 3]));
        let view = ImmutableView::new(&cell);
        assert_eq!(view.len(), 3);
        cell.borrow_mut().add(4).expect("append");
        assert_eq!(view.len(), 4);
        assert_eq!(view.last(), Ok(4));
        assert_eq!(format!("{view:?}"), "[1, 2, 3, 4]");
    }

    #[test]
    fn every_mutator_is_rejected() {
        let cell = RefCell::new(TreeSeq::from_slice(&[3, 1, 2]));
        let mut view = ImmutableView::new(&cell);
        let unsupported = |r: Result<(), SeqError>| matches!(r, Err(SeqError::UnsupportedOperation(_)));

        assert!(unsupported(view.add(9)));
        assert!(unsupported(view.set(0, 9).map(|_| ())));
        assert!(unsupported(view.sort()));
        assert!(unsupported(view.reverse()));
        assert!(unsupported(view.move_region(0, 1, 1)));
        assert!(unsupported(view.remove_all(&[1]).map(|_| ())));
        assert!(unsupported(view.retain_all(&[1]).map(|_| ())));
        assert!(unsupported(view.remove_first().map(|_| ())));
        assert!(unsupported(view.poll_last().map(|_| ())));
        assert!(unsupported(view.clear()));
        assert!(unsupported(view.reserve(100)));
        assert_eq!(cell.borrow().to_vec(), vec![3, 1, 2]);
    }

    #[test]
    fn empty_view_reports_unsupported_not_missing() {
        let cell = RefCell::new(GapSeq::<i32>::new());
        let mut view = ImmutableView::new(&cell);
        assert_eq!(view.remove_first(), Err(SeqError::UnsupportedOperation("remove_first")));
        assert_eq!(view.poll(), Err(SeqError::UnsupportedOperation("poll_first")));
        assert_eq!(view.first(), Err(SeqError::NoSuchElement));
        assert_eq!(view.peek(), None);
    }

    #[test]
    fn reads_fail_while_backing_is_borrowed() {
        let cell = RefCell::new(GapSeq::from_slice(&[1, 2, 3, 4]));
        let view = cell.unmodifiable_list();
        {
            let mut target = cell.borrow_mut();
            assert_eq!(copy_between(&view, 0, &mut *target, 2, 2), Err(SeqError::Borrowed));
            assert_eq!(view.get(0), Err(SeqError::Borrowed));
            assert_eq!(view.to_vec_range(0, 1), Err(SeqError::Borrowed));
            assert_eq!(target.to_vec(), vec![1, 2, 3, 4]);
        }
        assert_eq!(view.to_vec_range(0, 2), Ok(vec![1, 2]));
    }

    #[test]
    fn unmodifiable_list_tracks_the_cell() {
        let cell = RefCell::new(TreeSeq::from_slice(&[5, 6]));
        let view = cell.unmodifiable_list();
        cell.borrow_mut().add(7).expect("append");
        assert_eq!(view.to_vec(), vec![5, 6, 7]);
    }
}

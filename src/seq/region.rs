use std::ops::ControlFlow;

use crate::error::{illegal_state, SeqError};
use crate::kind::Kind;

/// Chunk visitor: receives the absolute index of the chunk's first element.
pub type Visit<'v, E> = dyn FnMut(usize, &[E]) -> ControlFlow<()> + 'v;

/// The checked region capability every derived operation is written against.
///
/// Implementors validate indices and report violations as
/// [`SeqError::IndexOutOfRange`]. A read-only implementor reports
/// [`SeqError::UnsupportedOperation`] from every mutator and from
/// [`Region::ensure_writable`], which composite operations call before
/// touching anything.
pub trait Region {
    type Elem: Kind;

    fn len(&self) -> usize;

    /// Like [`Region::len`], for implementors whose reads can be refused.
    fn try_len(&self) -> Result<usize, SeqError> {
        return Ok(self.len());
    }

    fn capacity(&self) -> usize;

    fn get(&self, index: usize) -> Result<Self::Elem, SeqError>;

    /// Copies `[index, index + out.len())` into `out`.
    fn read_region(&self, index: usize, out: &mut [Self::Elem]) -> Result<(), SeqError>;

    /// Feeds `[index, index + len)` to `visit` as contiguous chunks, stopping
    /// early when the visitor breaks.
    fn visit_region(&self, index: usize, len: usize, visit: &mut Visit<'_, Self::Elem>) -> Result<ControlFlow<()>, SeqError>;

    /// Fails when mutation is not allowed; `op` names the rejected operation.
    fn ensure_writable(&self, _op: &'static str) -> Result<(), SeqError> {
        return Ok(());
    }

    /// Replaces one element, returning the previous one.
    fn set(&mut self, index: usize, value: Self::Elem) -> Result<Self::Elem, SeqError>;

    fn write_region(&mut self, index: usize, values: &[Self::Elem]) -> Result<(), SeqError>;

    /// Inserts `values` at `index <= len`.
    fn insert_region(&mut self, index: usize, values: &[Self::Elem]) -> Result<(), SeqError>;

    fn remove_region(&mut self, index: usize, len: usize) -> Result<(), SeqError>;

    fn fill_region(&mut self, index: usize, len: usize, value: Self::Elem) -> Result<(), SeqError>;

    /// Capacity hint; never changes content.
    fn reserve(&mut self, min_capacity: usize) -> Result<(), SeqError>;

    fn trim_to_size(&mut self) -> Result<(), SeqError>;

    /// Visits the whole sequence.
    fn visit_all(&self, visit: &mut Visit<'_, Self::Elem>) -> ControlFlow<()> {
        match self.visit_region(0, self.len(), visit) {
            Ok(flow) => return flow,
            Err(err) => illegal_state(&format!("full-range visit rejected: {err}")),
        }
    }
}

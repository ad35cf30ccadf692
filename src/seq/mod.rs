//! The sequence facade.
//!
//! [`Region`] is the checked capability a sequence exposes; [`List`] layers
//! the whole list, deque, queue, and stack contract plus the derived region
//! algebra on top of it, once, for every implementor.

mod list;
mod region;
mod sequence;

pub use list::{copy_between, move_between, swap_between, List};
pub use region::{Region, Visit};
pub use sequence::{GapSeq, Iter, Sequence, TreeSeq};

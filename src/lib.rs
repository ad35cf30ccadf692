//! Seqlist - Ordered sequences over primitive element kinds.
//!
//! Two interchangeable stores sit behind one list/deque/queue contract:
//! a gap array for everyday sizes and a block tree for very large ones.
//! Elements are stored unboxed; [`ObjSequence`] offers the same contract
//! over boxed [`Value`]s, and [`ImmutableView`] a read-only window onto a
//! live sequence.
//!
//! # Quick Start
//!
//! ```
//! use seqlist::{GapSeq, List, Region, TreeSeq};
//!
//! let mut seq = GapSeq::from_slice(&[5, 3, 1, 4, 2]);
//! seq.sort().unwrap();
//! assert_eq!(seq.binary_search(4), Ok(3));
//!
//! let mut big: TreeSeq<i64> = TreeSeq::with_block_size(64).unwrap();
//! big.add_all(&(0..10_000).collect::<Vec<_>>()).unwrap();
//! big.insert(5_000, -1).unwrap();
//! assert_eq!(big.get(5_000), Ok(-1));
//! assert_eq!(big.len(), 10_001);
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod kind;
pub mod seq;
pub mod store;
pub mod view;

pub use adapter::{Comparator, ObjGapSeq, ObjSequence, ObjTreeSeq};
pub use config::Config;
pub use error::SeqError;
pub use kind::{Kind, Value};
pub use seq::{copy_between, move_between, swap_between, GapSeq, List, Region, Sequence, TreeSeq};
pub use store::{BlockTreeStore, GapArrayStore, Store};
pub use view::{ImmutableView, Unmodifiable};

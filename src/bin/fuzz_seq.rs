//! AFL fuzz harness for the sequence stores
//!
//! Replays byte-encoded edits on a gap array, a small-block tree, and a
//! `Vec` model, checking after every edit that:
//! 1. Content: both stores hold exactly the model's elements
//! 2. Structure: the block tree's counts, heights, and fill hold
//! 3. Errors: out-of-range edits are rejected without side effects

use afl::fuzz;
use seqlist::{GapSeq, List, Region, TreeSeq};

/// Operation types the fuzzer can generate
#[derive(Debug, Clone, Copy)]
enum FuzzOp {
    /// Insert a run of `len` elements at a fraction of the length
    Insert { pos_frac: u8, len: u8 },
    /// Remove up to `len` elements starting at a fraction of the length
    Remove { pos_frac: u8, len: u8 },
    /// Push at the head or pop from the tail
    Deque { front: bool },
    /// Move a window within the sequence
    Move { src_frac: u8, dst_frac: u8, len: u8 },
    /// Edit at an index past the end; must fail
    OutOfRange { over: u8 },
}

impl FuzzOp {
    fn from_bytes(bytes: &[u8]) -> Option<(FuzzOp, &[u8])> {
        if bytes.is_empty() {
            return None;
        }

        let op_type = bytes[0] % 5;
        let rest = &bytes[1..];

        match op_type {
            0 if rest.len() >= 2 => {
                let op = FuzzOp::Insert {
                    pos_frac: rest[0],
                    len: (rest[1] % 64).saturating_add(1),
                };
                return Some((op, &rest[2..]));
            }
            1 if rest.len() >= 2 => {
                let op = FuzzOp::Remove {
                    pos_frac: rest[0],
                    len: (rest[1] % 48).saturating_add(1),
                };
                return Some((op, &rest[2..]));
            }
            2 if !rest.is_empty() => return Some((FuzzOp::Deque { front: rest[0] % 2 == 0 }, &rest[1..])),
            3 if rest.len() >= 3 => {
                let op = FuzzOp::Move {
                    src_frac: rest[0],
                    dst_frac: rest[1],
                    len: rest[2] % 16,
                };
                return Some((op, &rest[3..]));
            }
            4 if !rest.is_empty() => return Some((FuzzOp::OutOfRange { over: rest[0] }, &rest[1..])),
            _ => return None,
        }
    }
}

fn at_frac(frac: u8, len: usize) -> usize {
    return (frac as usize * len / 256).min(len);
}

fn main() {
    fuzz!(|data: &[u8]| {
        let mut gap = GapSeq::<i32>::with_capacity(0);
        let mut tree = match TreeSeq::<i32>::with_block_size(4) {
            Ok(tree) => tree,
            Err(err) => panic!("block size rejected: {err}"),
        };
        let mut model: Vec<i32> = Vec::new();
        let mut next = 0i32;
        let mut remaining = data;

        while let Some((op, rest)) = FuzzOp::from_bytes(remaining) {
            remaining = rest;
            let len = model.len();

            match op {
                FuzzOp::Insert { pos_frac, len: count } => {
                    let at = at_frac(pos_frac, len);
                    let run: Vec<i32> = (next..next + count as i32).collect();
                    next += count as i32;
                    model.splice(at..at, run.iter().copied());
                    gap.insert_all(at, &run).unwrap();
                    tree.insert_all(at, &run).unwrap();
                }

                FuzzOp::Remove { pos_frac, len: count } => {
                    if len > 0 {
                        let at = at_frac(pos_frac, len - 1);
                        let count = (count as usize).min(len - at);
                        model.drain(at..at + count);
                        gap.remove_range(at, count).unwrap();
                        tree.remove_range(at, count).unwrap();
                    }
                }

                FuzzOp::Deque { front } => {
                    if front {
                        model.insert(0, next);
                        gap.push(next).unwrap();
                        tree.push(next).unwrap();
                        next += 1;
                    } else {
                        let expected = model.pop();
                        assert_eq!(gap.poll_last().unwrap(), expected);
                        assert_eq!(tree.poll_last().unwrap(), expected);
                    }
                }

                FuzzOp::Move { src_frac, dst_frac, len: count } => {
                    let count = (count as usize).min(len);
                    let src = at_frac(src_frac, len - count);
                    let dst = at_frac(dst_frac, len - count);
                    if count > 0 && src != dst {
                        let window: Vec<i32> = model[src..src + count].to_vec();
                        model[dst..dst + count].copy_from_slice(&window);
                        for i in src..src + count {
                            if i < dst || i >= dst + count {
                                model[i] = 0;
                            }
                        }
                    }
                    gap.move_region(src, dst, count).unwrap();
                    tree.move_region(src, dst, count).unwrap();
                }

                FuzzOp::OutOfRange { over } => {
                    let at = len + 1 + over as usize;
                    assert!(gap.insert(at, -1).is_err());
                    assert!(tree.insert(at, -1).is_err());
                    assert!(tree.remove_range(len, 1).is_err());
                    assert!(gap.set(len, -1).is_err());
                }
            }

            tree.check_invariants();
            assert_eq!(gap.len(), model.len(), "Gap length mismatch");
            assert_eq!(tree.len(), model.len(), "Tree length mismatch");
        }

        assert_eq!(gap.to_vec(), model, "Gap content mismatch");
        assert_eq!(tree.to_vec(), model, "Tree content mismatch");
        assert!(gap == tree);
    });
}

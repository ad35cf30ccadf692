//! Block Tree Store
//!
//! A sequence partitioned into blocks of at most `block_size` elements. The
//! blocks are the leaves of a height-balanced binary tree; every node caches
//! the number of elements below it, so a position is found by one descent.
//!
//! Structure:
//! - Leaves own a `Vec` block; branches own exactly two children
//! - All nodes live in one arena `Vec` addressed by `u32` (no raw pointers),
//!   with parent links and a free list for recycled slots
//! - Balance is structural only (AVL heights), unrelated to element order
//!
//! Invariants:
//! - `count` of a node equals the number of elements in its subtree
//! - sibling heights differ by at most one
//! - a non-root leaf is never empty; a leaf that is neither the first nor
//!   the last holds at least `block_size / 2` elements
//!
//! Operations:
//! - locate: O(log n) descent by cumulative counts, cached for sequential reads
//! - insert: local when the block has room; otherwise the block and the new
//!   run are re-cut into evenly filled blocks (a split). Inserts at either
//!   end of the sequence start fresh blocks instead
//! - remove: per-block drains with one count update per block; blocks left
//!   under half full are merged with, or refilled from, their right neighbor

use std::cell::Cell;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::illegal_state;
use crate::kind::Kind;
use crate::store::Store;

/// Index into the node arena.
type NodeIdx = u32;
/// Sentinel value for no parent.
const NONE: u32 = u32::MAX;

#[derive(Clone, Debug)]
enum Body<K> {
    Leaf(Vec<K>),
    Branch { left: NodeIdx, right: NodeIdx },
    Free,
}

#[derive(Clone, Debug)]
struct Node<K> {
    parent: NodeIdx,
    /// Elements in this subtree.
    count: usize,
    /// 0 for leaves.
    height: u32,
    body: Body<K>,
}

impl<K> Node<K> {
    fn leaf(items: Vec<K>) -> Node<K> {
        return Node {
            parent: NONE,
            count: items.len(),
            height: 0,
            body: Body::Leaf(items),
        };
    }
}

/// Last located leaf and the index of its first element.
#[derive(Clone, Copy, Debug)]
struct Cursor {
    leaf: NodeIdx,
    start: usize,
}

/// Sequence storage for very large sizes.
#[derive(Clone, Debug)]
pub struct BlockTreeStore<K: Kind> {
    nodes: Vec<Node<K>>,
    root: NodeIdx,
    block_size: usize,
    free_nodes: Vec<NodeIdx>,
    /// Read cursor; reset by every structural change.
    cursor: Cell<Option<Cursor>>,
}

impl<K: Kind> BlockTreeStore<K> {
    pub fn new(block_size: usize) -> BlockTreeStore<K> {
        return BlockTreeStore::with_capacity(block_size, 0);
    }

    fn with_capacity(block_size: usize, capacity: usize) -> BlockTreeStore<K> {
        let items = Vec::with_capacity(capacity.min(block_size));
        return BlockTreeStore {
            nodes: vec![Node::leaf(items)],
            root: 0,
            block_size,
            free_nodes: Vec::new(),
            cursor: Cell::new(None),
        };
    }

    /// Builds a perfectly balanced tree over evenly filled blocks.
    pub fn from_values(block_size: usize, values: &[K]) -> BlockTreeStore<K> {
        let mut store = BlockTreeStore::new(block_size);
        if values.is_empty() {
            return store;
        }
        store.nodes.clear();

        let mut leaves = Vec::new();
        let mut done = 0;
        for size in even_cuts(values.len(), block_size) {
            let mut items = Vec::with_capacity(block_size);
            items.extend_from_slice(&values[done..done + size]);
            done += size;
            leaves.push(store.alloc(Node::leaf(items)));
        }
        store.root = store.build(&leaves);
        store.nodes[store.root as usize].parent = NONE;
        return store;
    }

    #[inline(always)]
    pub fn block_size(&self) -> usize {
        return self.block_size;
    }

    /// Height of the tree; 0 while a single block holds everything.
    pub fn height(&self) -> u32 {
        return self.nodes[self.root as usize].height;
    }

    pub fn block_count(&self) -> usize {
        return self
            .nodes
            .iter()
            .filter(|node| matches!(node.body, Body::Leaf(_)))
            .count();
    }

    fn build(&mut self, leaves: &[NodeIdx]) -> NodeIdx {
        if leaves.len() == 1 {
            return leaves[0];
        }
        let mid = leaves.len() / 2;
        let left = self.build(&leaves[..mid]);
        let right = self.build(&leaves[mid..]);
        let branch = self.alloc(Node {
            parent: NONE,
            count: 0,
            height: 0,
            body: Body::Branch { left, right },
        });
        self.nodes[left as usize].parent = branch;
        self.nodes[right as usize].parent = branch;
        self.refresh(branch);
        return branch;
    }

    /// Allocate a node, reusing from the free list if available.
    fn alloc(&mut self, node: Node<K>) -> NodeIdx {
        if let Some(idx) = self.free_nodes.pop() {
            self.nodes[idx as usize] = node;
            return idx;
        }
        let idx = self.nodes.len() as NodeIdx;
        self.nodes.push(node);
        return idx;
    }

    fn release(&mut self, idx: NodeIdx) {
        let node = &mut self.nodes[idx as usize];
        node.body = Body::Free;
        node.parent = NONE;
        node.count = 0;
        self.free_nodes.push(idx);
    }

    #[inline]
    fn block(&self, leaf: NodeIdx) -> &Vec<K> {
        match &self.nodes[leaf as usize].body {
            Body::Leaf(items) => return items,
            _ => illegal_state("expected a leaf block"),
        }
    }

    #[inline]
    fn block_mut(&mut self, leaf: NodeIdx) -> &mut Vec<K> {
        match &mut self.nodes[leaf as usize].body {
            Body::Leaf(items) => return items,
            _ => illegal_state("expected a leaf block"),
        }
    }

    #[inline]
    fn children(&self, node: NodeIdx) -> (NodeIdx, NodeIdx) {
        match self.nodes[node as usize].body {
            Body::Branch { left, right } => return (left, right),
            _ => illegal_state("expected a branch"),
        }
    }

    #[inline(always)]
    fn height_of(&self, node: NodeIdx) -> u32 {
        return self.nodes[node as usize].height;
    }

    #[inline(always)]
    fn is_leaf(&self, node: NodeIdx) -> bool {
        return matches!(self.nodes[node as usize].body, Body::Leaf(_));
    }

    /// Recompute a node's count and height from its children.
    fn refresh(&mut self, node: NodeIdx) {
        match self.nodes[node as usize].body {
            Body::Leaf(ref items) => {
                let count = items.len();
                let node = &mut self.nodes[node as usize];
                node.count = count;
                node.height = 0;
            }
            Body::Branch { left, right } => {
                let count = self.nodes[left as usize].count + self.nodes[right as usize].count;
                let height = 1 + self.height_of(left).max(self.height_of(right));
                let node = &mut self.nodes[node as usize];
                node.count = count;
                node.height = height;
            }
            Body::Free => illegal_state("refreshing a freed node"),
        }
    }

    /// Apply a count change to a leaf and all of its ancestors.
    fn adjust_counts(&mut self, leaf: NodeIdx, delta: isize) {
        let mut node = leaf;
        while node != NONE {
            let entry = &mut self.nodes[node as usize];
            entry.count = match entry.count.checked_add_signed(delta) {
                Some(count) => count,
                None => illegal_state("subtree count underflow"),
            };
            node = entry.parent;
        }
    }

    /// Find the leaf holding `index` and the offset within it. `index == len`
    /// resolves to the end of the last leaf.
    fn locate(&self, index: usize) -> (NodeIdx, usize) {
        let mut node = self.root;
        let mut offset = index;
        loop {
            match &self.nodes[node as usize].body {
                Body::Leaf(items) => {
                    if offset > items.len() {
                        illegal_state("subtree count does not match block contents");
                    }
                    return (node, offset);
                }
                Body::Branch { left, right } => {
                    let left_count = self.nodes[*left as usize].count;
                    if offset < left_count {
                        node = *left;
                    } else {
                        offset -= left_count;
                        node = *right;
                    }
                }
                Body::Free => illegal_state("descended into a freed node"),
            }
        }
    }

    /// Like `locate` for `index < len`, served from the cursor when possible.
    /// The indices just past either end of the cursor's block step to the
    /// neighboring leaf, so a sweep in either direction descends only once.
    fn locate_cached(&self, index: usize) -> (NodeIdx, usize) {
        if let Some(cursor) = self.cursor.get() {
            if index >= cursor.start {
                let offset = index - cursor.start;
                let block_len = self.block(cursor.leaf).len();
                if offset < block_len {
                    return (cursor.leaf, offset);
                }
                if offset == block_len {
                    if let Some(next) = self.next_leaf(cursor.leaf) {
                        self.cursor.set(Some(Cursor { leaf: next, start: index }));
                        return (next, 0);
                    }
                }
            } else if index + 1 == cursor.start {
                if let Some(prev) = self.prev_leaf(cursor.leaf) {
                    let prev_len = self.block(prev).len();
                    self.cursor.set(Some(Cursor { leaf: prev, start: cursor.start - prev_len }));
                    return (prev, prev_len - 1);
                }
            }
        }
        let (leaf, offset) = self.locate(index);
        self.cursor.set(Some(Cursor { leaf, start: index - offset }));
        return (leaf, offset);
    }

    #[inline(always)]
    fn invalidate_cursor(&mut self) {
        *self.cursor.get_mut() = None;
    }

    fn leftmost(&self, mut node: NodeIdx) -> NodeIdx {
        while let Body::Branch { left, .. } = self.nodes[node as usize].body {
            node = left;
        }
        return node;
    }

    fn rightmost(&self, mut node: NodeIdx) -> NodeIdx {
        while let Body::Branch { right, .. } = self.nodes[node as usize].body {
            node = right;
        }
        return node;
    }

    fn next_leaf(&self, leaf: NodeIdx) -> Option<NodeIdx> {
        let mut node = leaf;
        loop {
            let parent = self.nodes[node as usize].parent;
            if parent == NONE {
                return None;
            }
            let (left, right) = self.children(parent);
            if left == node {
                return Some(self.leftmost(right));
            }
            node = parent;
        }
    }

    fn prev_leaf(&self, leaf: NodeIdx) -> Option<NodeIdx> {
        let mut node = leaf;
        loop {
            let parent = self.nodes[node as usize].parent;
            if parent == NONE {
                return None;
            }
            let (left, right) = self.children(parent);
            if right == node {
                return Some(self.rightmost(left));
            }
            node = parent;
        }
    }

    /// Point `parent`'s link at `old` to `new` (or make `new` the root).
    fn replace_child(&mut self, parent: NodeIdx, old: NodeIdx, new: NodeIdx) {
        self.nodes[new as usize].parent = parent;
        if parent == NONE {
            self.root = new;
            return;
        }
        match &mut self.nodes[parent as usize].body {
            Body::Branch { left, right } => {
                if *left == old {
                    *left = new;
                } else if *right == old {
                    *right = new;
                } else {
                    illegal_state("parent link does not name its child");
                }
            }
            _ => illegal_state("parent is not a branch"),
        }
    }

    fn set_children(&mut self, node: NodeIdx, left: NodeIdx, right: NodeIdx) {
        self.nodes[node as usize].body = Body::Branch { left, right };
        self.nodes[left as usize].parent = node;
        self.nodes[right as usize].parent = node;
    }

    fn rotate_left(&mut self, x: NodeIdx) -> NodeIdx {
        let (a, y) = self.children(x);
        let (b, c) = self.children(y);
        let parent = self.nodes[x as usize].parent;
        self.set_children(x, a, b);
        self.set_children(y, x, c);
        self.replace_child(parent, x, y);
        self.refresh(x);
        self.refresh(y);
        return y;
    }

    fn rotate_right(&mut self, x: NodeIdx) -> NodeIdx {
        let (y, c) = self.children(x);
        let (a, b) = self.children(y);
        let parent = self.nodes[x as usize].parent;
        self.set_children(x, b, c);
        self.set_children(y, a, x);
        self.replace_child(parent, x, y);
        self.refresh(x);
        self.refresh(y);
        return y;
    }

    /// Restore the height bound at `node`, returning the subtree's new root.
    fn balance(&mut self, node: NodeIdx) -> NodeIdx {
        if self.is_leaf(node) {
            return node;
        }
        let (left, right) = self.children(node);
        let hl = self.height_of(left);
        let hr = self.height_of(right);
        if hr > hl + 1 {
            let (inner, outer) = self.children(right);
            if self.height_of(inner) > self.height_of(outer) {
                self.rotate_right(right);
            }
            return self.rotate_left(node);
        }
        if hl > hr + 1 {
            let (outer, inner) = self.children(left);
            if self.height_of(inner) > self.height_of(outer) {
                self.rotate_left(left);
            }
            return self.rotate_right(node);
        }
        return node;
    }

    /// Refresh and rebalance every node from `from` up to the root.
    fn retrace(&mut self, from: NodeIdx) {
        let mut node = from;
        while node != NONE {
            self.refresh(node);
            node = self.balance(node);
            node = self.nodes[node as usize].parent;
        }
    }

    /// Hang a new leaf holding `items` next to `leaf`.
    fn attach_leaf(&mut self, leaf: NodeIdx, items: Vec<K>, after: bool) -> NodeIdx {
        let new_leaf = self.alloc(Node::leaf(items));
        let parent = self.nodes[leaf as usize].parent;
        let branch = self.alloc(Node {
            parent,
            count: 0,
            height: 1,
            body: Body::Free,
        });
        self.replace_child(parent, leaf, branch);
        if after {
            self.set_children(branch, leaf, new_leaf);
        } else {
            self.set_children(branch, new_leaf, leaf);
        }
        self.retrace(branch);
        return new_leaf;
    }

    /// Unlink a leaf; its sibling takes the parent's place. The root leaf is
    /// emptied instead.
    fn detach_leaf(&mut self, leaf: NodeIdx) {
        let parent = self.nodes[leaf as usize].parent;
        if parent == NONE {
            self.block_mut(leaf).clear();
            self.refresh(leaf);
            return;
        }
        let (left, right) = self.children(parent);
        let sibling = if left == leaf { right } else { left };
        let grand = self.nodes[parent as usize].parent;
        self.replace_child(grand, parent, sibling);
        self.release(leaf);
        self.release(parent);
        if grand != NONE {
            self.retrace(grand);
        }
    }

    fn new_block(&self, values: &[K]) -> Vec<K> {
        let mut items = Vec::with_capacity(self.block_size);
        items.extend_from_slice(values);
        return items;
    }

    /// Tail growth: top up the last block, then start fresh blocks.
    fn append_blocks(&mut self, leaf: NodeIdx, values: &[K]) {
        let space = self.block_size - self.block(leaf).len();
        let (head, rest) = values.split_at(space);
        self.block_mut(leaf).extend_from_slice(head);
        self.adjust_counts(leaf, space as isize);

        let mut last = leaf;
        for chunk in rest.chunks(self.block_size) {
            let items = self.new_block(chunk);
            last = self.attach_leaf(last, items, true);
        }
        trace!(blocks = rest.len().div_ceil(self.block_size), "block tree appends blocks");
    }

    /// Head growth: top up the first block from the front, then start fresh
    /// blocks before it.
    fn prepend_blocks(&mut self, leaf: NodeIdx, values: &[K]) {
        let space = self.block_size - self.block(leaf).len();
        let (rest, head) = values.split_at(values.len() - space);
        splice_into(self.block_mut(leaf), 0, head);
        self.adjust_counts(leaf, space as isize);

        let mut first = leaf;
        for chunk in rest.rchunks(self.block_size) {
            let items = self.new_block(chunk);
            first = self.attach_leaf(first, items, false);
        }
        trace!(blocks = rest.len().div_ceil(self.block_size), "block tree prepends blocks");
    }

    /// Re-cut `leaf[..offset] ++ values ++ leaf[offset..]` into evenly filled
    /// blocks, the first of which stays in `leaf`.
    fn split_insert(&mut self, leaf: NodeIdx, offset: usize, values: &[K]) {
        let old = std::mem::take(self.block_mut(leaf));
        let old_len = old.len();
        let mut run = Vec::with_capacity(old.len() + values.len());
        run.extend_from_slice(&old[..offset]);
        run.extend_from_slice(values);
        run.extend_from_slice(&old[offset..]);

        let cuts = even_cuts(run.len(), self.block_size);
        let first = cuts[0];
        let mut items = old;
        items.clear();
        items.extend_from_slice(&run[..first]);
        *self.block_mut(leaf) = items;
        self.adjust_counts(leaf, first as isize - old_len as isize);

        let mut last = leaf;
        let mut done = first;
        for &size in &cuts[1..] {
            let items = self.new_block(&run[done..done + size]);
            last = self.attach_leaf(last, items, true);
            done += size;
        }
        trace!(blocks = cuts.len(), len = run.len(), "block tree splits block");
    }

    /// Merge or refill an interior leaf that fell under half full.
    fn repair_at(&mut self, index: usize) {
        let (leaf, _) = self.locate(index);
        let len = self.block(leaf).len();
        if len >= self.block_size / 2 {
            return;
        }
        if self.prev_leaf(leaf).is_none() {
            return;
        }
        let Some(next) = self.next_leaf(leaf) else {
            return;
        };

        let next_len = self.block(next).len();
        if len + next_len <= self.block_size {
            let moved = std::mem::take(self.block_mut(next));
            self.block_mut(leaf).extend_from_slice(&moved);
            self.adjust_counts(leaf, next_len as isize);
            self.detach_leaf(next);
            trace!(len = len + next_len, "block tree merges blocks");
        } else {
            let take = next_len - (len + next_len) / 2;
            let moved: Vec<K> = self.block_mut(next).drain(..take).collect();
            self.block_mut(leaf).extend_from_slice(&moved);
            self.adjust_counts(leaf, take as isize);
            self.adjust_counts(next, -(take as isize));
            trace!(moved = take, "block tree refills block from neighbor");
        }
    }

    /// Visit `[index, index + len)` block by block: one descent, then a walk
    /// along the leaves.
    fn for_each_block(&self, index: usize, len: usize, mut visit: impl FnMut(&[K], usize)) {
        if len == 0 {
            return;
        }
        let (mut leaf, mut offset) = self.locate_cached(index);
        let mut done = 0;
        loop {
            let items = self.block(leaf);
            let take = (items.len() - offset).min(len - done);
            visit(&items[offset..offset + take], done);
            done += take;
            if done == len {
                self.cursor.set(Some(Cursor {
                    leaf,
                    start: index + done - offset - take,
                }));
                return;
            }
            leaf = match self.next_leaf(leaf) {
                Some(next) => next,
                None => illegal_state("region runs past the last block"),
            };
            offset = 0;
        }
    }

    /// Visit `[index, index + len)` block by block with mutable access.
    fn for_each_block_mut(&mut self, index: usize, len: usize, mut visit: impl FnMut(&mut [K], usize)) {
        if len == 0 {
            return;
        }
        let (mut leaf, mut offset) = self.locate(index);
        let mut done = 0;
        loop {
            let items = self.block_mut(leaf);
            let take = (items.len() - offset).min(len - done);
            visit(&mut items[offset..offset + take], done);
            done += take;
            if done == len {
                return;
            }
            leaf = match self.next_leaf(leaf) {
                Some(next) => next,
                None => illegal_state("region runs past the last block"),
            };
            offset = 0;
        }
    }

    /// Verify every structural invariant, panicking on the first violation.
    pub fn check_invariants(&self) {
        let root = &self.nodes[self.root as usize];
        if root.parent != NONE {
            illegal_state("root has a parent");
        }
        self.check_node(self.root);

        let mut leaves = Vec::new();
        let mut leaf = Some(self.leftmost(self.root));
        while let Some(current) = leaf {
            leaves.push(current);
            leaf = self.next_leaf(current);
        }
        if leaves.len() > 1 {
            for &leaf in &leaves[1..leaves.len() - 1] {
                if self.block(leaf).len() < self.block_size / 2 {
                    illegal_state("interior block under half full");
                }
            }
        }
        let total: usize = leaves.iter().map(|&leaf| self.block(leaf).len()).sum();
        if total != self.len() {
            illegal_state("leaf totals do not match root count");
        }
    }

    fn check_node(&self, node: NodeIdx) {
        let entry = &self.nodes[node as usize];
        match &entry.body {
            Body::Leaf(items) => {
                if entry.count != items.len() || entry.height != 0 {
                    illegal_state("leaf count or height mismatch");
                }
                if items.len() > self.block_size {
                    illegal_state("block over capacity");
                }
                if items.is_empty() && node != self.root {
                    illegal_state("empty non-root block");
                }
            }
            Body::Branch { left, right } => {
                for &child in [left, right] {
                    if self.nodes[child as usize].parent != node {
                        illegal_state("child does not link back to parent");
                    }
                    self.check_node(child);
                }
                let l = &self.nodes[*left as usize];
                let r = &self.nodes[*right as usize];
                if entry.count != l.count + r.count {
                    illegal_state("subtree count mismatch");
                }
                if entry.height != 1 + l.height.max(r.height) || l.height.abs_diff(r.height) > 1 {
                    illegal_state("height out of balance");
                }
            }
            Body::Free => illegal_state("freed node reachable from root"),
        }
    }
}

/// Sizes of `ceil(total / max)` nearly equal pieces covering `total`.
fn even_cuts(total: usize, max: usize) -> SmallVec<[usize; 8]> {
    let pieces = total.div_ceil(max).max(1);
    let base = total / pieces;
    let extra = total % pieces;
    return (0..pieces).map(|i| base + usize::from(i < extra)).collect();
}

/// Insert `values` at `at` without a temporary buffer.
fn splice_into<K: Copy>(items: &mut Vec<K>, at: usize, values: &[K]) {
    items.extend_from_slice(values);
    items[at..].rotate_right(values.len());
}

impl<K: Kind> Store for BlockTreeStore<K> {
    type Elem = K;

    fn create(config: &Config) -> Self {
        return BlockTreeStore::with_capacity(config.block_size, config.capacity);
    }

    fn from_slice(config: &Config, values: &[K]) -> Self {
        return BlockTreeStore::from_values(config.block_size, values);
    }

    fn create_like(&self, capacity: usize) -> Self {
        return BlockTreeStore::with_capacity(self.block_size, capacity);
    }

    #[inline(always)]
    fn len(&self) -> usize {
        return self.nodes[self.root as usize].count;
    }

    fn capacity(&self) -> usize {
        return self
            .nodes
            .iter()
            .map(|node| match &node.body {
                Body::Leaf(items) => items.capacity(),
                _ => 0,
            })
            .sum();
    }

    #[inline]
    fn get(&self, index: usize) -> K {
        let (leaf, offset) = self.locate_cached(index);
        return self.block(leaf)[offset];
    }

    #[inline]
    fn set(&mut self, index: usize, value: K) -> K {
        let (leaf, offset) = self.locate_cached(index);
        let slot = &mut self.block_mut(leaf)[offset];
        return std::mem::replace(slot, value);
    }

    fn chunk_at(&self, index: usize) -> &[K] {
        let (leaf, offset) = self.locate_cached(index);
        return &self.block(leaf)[offset..];
    }

    fn chunk_before(&self, end: usize) -> &[K] {
        let (leaf, offset) = self.locate_cached(end - 1);
        return &self.block(leaf)[..=offset];
    }

    fn read_region(&self, index: usize, out: &mut [K]) {
        self.for_each_block(index, out.len(), |slots, done| {
            out[done..done + slots.len()].copy_from_slice(slots);
        });
    }

    fn write_region(&mut self, index: usize, values: &[K]) {
        self.for_each_block_mut(index, values.len(), |slots, done| {
            slots.copy_from_slice(&values[done..done + slots.len()]);
        });
    }

    fn insert_region(&mut self, index: usize, values: &[K]) {
        let count = values.len();
        if count == 0 {
            return;
        }
        let len = self.len();
        assert!(index <= len, "insert index {index} beyond length {len}");
        self.invalidate_cursor();

        let (leaf, offset) = self.locate(index);
        let block_len = self.block(leaf).len();
        if block_len + count <= self.block_size {
            splice_into(self.block_mut(leaf), offset, values);
            self.adjust_counts(leaf, count as isize);
        } else if index == len {
            self.append_blocks(leaf, values);
        } else if index == 0 {
            self.prepend_blocks(leaf, values);
        } else {
            self.split_insert(leaf, offset, values);
        }
    }

    fn remove_region(&mut self, index: usize, len: usize) {
        if len == 0 {
            return;
        }
        let size = self.len();
        assert!(index + len <= size, "remove range {index}+{len} beyond length {size}");
        self.invalidate_cursor();

        // Leaves keep their arena slots through rotations, so the successor
        // found before a drain is still the successor afterwards.
        let (mut leaf, mut offset) = self.locate(index);
        let mut remaining = len;
        while remaining > 0 {
            let next = self.next_leaf(leaf);
            let block_len = self.block(leaf).len();
            let take = remaining.min(block_len - offset);
            if take == block_len && leaf != self.root {
                self.detach_leaf(leaf);
            } else {
                self.block_mut(leaf).drain(offset..offset + take);
                self.adjust_counts(leaf, -(take as isize));
            }
            remaining -= take;
            if remaining > 0 {
                leaf = match next {
                    Some(next) => next,
                    None => illegal_state("region runs past the last block"),
                };
                offset = 0;
            }
        }

        if index > 0 {
            self.repair_at(index - 1);
        }
        if index < self.len() {
            self.repair_at(index);
        }
    }

    fn fill_region(&mut self, index: usize, len: usize, value: K) {
        self.for_each_block_mut(index, len, |slots, _| slots.fill(value));
    }

    fn reserve(&mut self, min_capacity: usize) {
        if self.is_leaf(self.root) {
            let wanted = min_capacity.min(self.block_size);
            let root = self.root;
            let items = self.block_mut(root);
            items.reserve(wanted.saturating_sub(items.len()));
        }
    }

    fn trim(&mut self) {
        debug!(blocks = self.block_count(), "block tree trims blocks");
        for node in &mut self.nodes {
            if let Body::Leaf(items) = &mut node.body {
                items.shrink_to_fit();
            }
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.free_nodes.clear();
        self.nodes.push(Node::leaf(Vec::new()));
        self.root = 0;
        self.invalidate_cursor();
    }
}

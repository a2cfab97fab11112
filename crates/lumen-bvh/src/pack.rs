//! Flattening of the build-time tree into the packed word layout.
//!
//! Each node becomes a record of [`RECORD_WORDS`] `i32` words:
//!
//! - word 0: for an internal node, the word index of the second child's
//!   record (always positive). For a leaf, the negated index of its batch in
//!   the primitive batch table (zero or negative). The first child of an
//!   internal node always starts directly after it, at `record + 7`.
//! - words 1-6: `xmin, xmax, ymin, ymax, zmin, zmax` narrowed to `f32` and
//!   stored as raw bit patterns. Narrowing rounds to nearest, so a stored
//!   box may be smaller than the exact one by up to half an ulp.

use lumen_math::Aabb;

use crate::node::{Node, NodeId, NodeTree};
use crate::primitive::PrimitiveRef;

/// Number of `i32` words per packed node.
pub const RECORD_WORDS: usize = 7;

/// Output of [`pack`].
#[derive(Debug, Clone, Default)]
pub struct PackedTree {
    /// Node records, [`RECORD_WORDS`] words each.
    pub words: Vec<i32>,
    /// Primitive batches referenced by leaf records.
    pub batches: Vec<Box<[PrimitiveRef]>>,
    /// Largest pending-node stack seen while packing.
    pub depth: usize,
}

/// Narrow one bound to `f32` bits.
#[inline]
pub(crate) fn narrow(value: f64) -> i32 {
    (value as f32).to_bits() as i32
}

/// Widen stored `f32` bits back to `f64`.
#[inline]
pub(crate) fn widen(word: i32) -> f64 {
    f64::from(f32::from_bits(word as u32))
}

/// Read the bounds stored in the record starting at `record`.
pub(crate) fn record_bounds(words: &[i32], record: usize) -> Aabb {
    let b = &words[record + 1..record + RECORD_WORDS];
    Aabb::new(
        widen(b[0]),
        widen(b[1]),
        widen(b[2]),
        widen(b[3]),
        widen(b[4]),
        widen(b[5]),
    )
}

fn push_bounds(words: &mut Vec<i32>, bounds: &Aabb) {
    words.extend_from_slice(&[
        narrow(bounds.xmin),
        narrow(bounds.xmax),
        narrow(bounds.ymin),
        narrow(bounds.ymax),
        narrow(bounds.zmin),
        narrow(bounds.zmax),
    ]);
}

/// Pack a build-time tree, consuming it.
///
/// Every node is moved out of the arena as it is visited. Leaf primitive
/// lists go straight into the batch table, so the tree holds no primitive
/// references once packing is done.
pub fn pack(mut tree: NodeTree) -> PackedTree {
    let Some(root) = tree.root() else {
        return PackedTree::default();
    };

    let mut words = Vec::with_capacity(tree.len() * RECORD_WORDS);
    let mut batches = Vec::with_capacity(tree.len() / 2 + 1);
    let mut depth = 0;

    // (slot to patch with this node's record index, node)
    let mut stack: Vec<(Option<usize>, NodeId)> = vec![(None, root)];

    while let Some((patch, id)) = stack.pop() {
        let index = words.len();
        if let Some(slot) = patch {
            words[slot] = index as i32;
        }

        words.push(0);
        match tree.take(id) {
            Node::Group {
                bounds,
                child1,
                child2,
                ..
            } => {
                push_bounds(&mut words, &bounds);
                stack.push((Some(index), child2));
                stack.push((None, child1));
            }
            Node::Leaf { bounds, primitives } => {
                push_bounds(&mut words, &bounds);
                words[index] = -(batches.len() as i32);
                batches.push(primitives.into_boxed_slice());
            }
        }

        depth = depth.max(stack.len());
    }

    PackedTree {
        words,
        batches,
        depth,
    }
}

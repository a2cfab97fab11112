//! Hierarchy construction.
//!
//! All builders share one explicit-stack skeleton ([`construct`]) and differ
//! only in how they split a chunk of primitives in two ([`SplitHeuristic`]).
//! No recursion is used, so scenes with millions of primitives cannot
//! exhaust the call stack.

mod midpoint;
mod sah;
mod sah_ma;

pub use midpoint::MidpointSplit;
pub use sah::SahSplit;
pub use sah_ma::SahMajorAxisSplit;

use std::ops::Range;
use std::sync::Arc;

use lumen_math::{Aabb, Axis};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Result;
use crate::node::{NodeId, NodeTree};
use crate::primitive::PrimitiveRef;
use crate::SPLIT_LIMIT;

/// A primitive together with its cached bounds.
#[derive(Debug, Clone)]
pub struct BuildEntry {
    /// Cached `primitive.bounds()`.
    pub bounds: Aabb,
    /// The primitive itself.
    pub primitive: PrimitiveRef,
}

impl BuildEntry {
    /// Wrap a primitive, caching its bounds.
    pub fn new(primitive: PrimitiveRef) -> Self {
        Self {
            bounds: primitive.bounds(),
            primitive,
        }
    }

    /// Center of the primitive's bounds along `axis`.
    #[inline]
    pub fn centroid(&self, axis: Axis) -> f64 {
        self.bounds.centroid_on(axis)
    }
}

/// Union of the bounds of every entry in `chunk`.
pub fn chunk_bounds(chunk: &[BuildEntry]) -> Aabb {
    chunk
        .iter()
        .fold(Aabb::empty(), |acc, e| acc.expand(&e.bounds))
}

/// Worker pool used for the per-split sorts.
///
/// Sorting is the only parallel part of construction: the driving thread
/// hands each sort to the pool and blocks until it is done.
#[derive(Debug, Clone, Default)]
pub struct SortPool {
    pool: Option<Arc<ThreadPool>>,
}

impl SortPool {
    /// Sort on rayon's global pool.
    pub fn global() -> Self {
        Self::default()
    }

    /// Sort on a dedicated pool with `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("bvh-sort-{i}"))
            .build()?;
        Ok(Self::from_pool(Arc::new(pool)))
    }

    /// Sort on an existing shared pool.
    pub fn from_pool(pool: Arc<ThreadPool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Stable sort of `chunk` by centroid along `axis`.
    pub fn sort_by_axis(&self, chunk: &mut [BuildEntry], axis: Axis) {
        let mut sort = move || chunk.par_sort_by(|a, b| a.centroid(axis).total_cmp(&b.centroid(axis)));
        match &self.pool {
            Some(pool) => pool.install(sort),
            None => sort(),
        }
    }
}

/// Partitioning strategy used by [`construct`].
pub trait SplitHeuristic: Send + Sync + std::fmt::Debug {
    /// Reorder `chunk` and return the split index.
    ///
    /// [`construct`] calls this only with `chunk.len() >= SPLIT_LIMIT` and
    /// requires `1 <= split < chunk.len()`; `chunk[..split]` becomes the
    /// first child and `chunk[split..]` the second. A chunk of fewer than two
    /// entries cannot be split and yields 0.
    fn split(&self, chunk: &mut [BuildEntry], pool: &SortPool) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Push,
    Merge,
}

/// Build a node tree over `entries` with the given heuristic.
///
/// `progress` receives the number of primitives placed in leaves so far.
/// Returns `None` when there is nothing to build.
pub fn construct(
    mut entries: Vec<BuildEntry>,
    heuristic: &dyn SplitHeuristic,
    pool: &SortPool,
    progress: &mut dyn FnMut(usize),
) -> Option<NodeTree> {
    if entries.is_empty() {
        return None;
    }

    // A full binary tree with n / (SPLIT_LIMIT - 1) leaves at best.
    let mut tree = NodeTree::with_capacity(2 * entries.len() / (SPLIT_LIMIT - 1) + 1);
    let mut nodes: Vec<NodeId> = Vec::new();
    let mut actions = vec![Action::Push];
    let mut chunks: Vec<Range<usize>> = vec![0..entries.len()];
    let mut placed = 0;

    while let Some(action) = actions.pop() {
        match action {
            Action::Merge => {
                let (Some(child1), Some(child2)) = (nodes.pop(), nodes.pop()) else {
                    unreachable!("merge scheduled before both children were built");
                };
                nodes.push(tree.push_group(child1, child2));
            }
            Action::Push => {
                let Some(range) = chunks.pop() else {
                    unreachable!("push scheduled without a pending chunk");
                };
                let chunk = &mut entries[range.clone()];

                if chunk.len() < SPLIT_LIMIT {
                    let primitives = chunk.iter().map(|e| e.primitive.clone()).collect();
                    nodes.push(tree.push_leaf(chunk_bounds(chunk), primitives));

                    placed += chunk.len();
                    progress(placed);
                } else {
                    let split = heuristic.split(chunk, pool);
                    assert!(
                        split >= 1 && split < chunk.len(),
                        "{heuristic:?} produced split {split} for a chunk of {}",
                        chunk.len()
                    );
                    let mid = range.start + split;

                    actions.push(Action::Merge);
                    chunks.push(range.start..mid);
                    actions.push(Action::Push);
                    chunks.push(mid..range.end);
                    actions.push(Action::Push);
                }
            }
        }
    }

    debug_assert!(nodes.len() == 1 && nodes.last().copied() == tree.root());
    Some(tree)
}

/// Scratch buffers for the surface area sweep, reused across axes.
#[derive(Debug, Default)]
pub(crate) struct SahSweep {
    left: Vec<f64>,
    right: Vec<f64>,
}

impl SahSweep {
    /// Cheapest split of an already sorted chunk as `(cost, index)`, where
    /// the split falls after `index`. Earlier indices win ties. Chunks of
    /// fewer than two entries have no split and cost infinity.
    pub(crate) fn best_split(&mut self, chunk: &[BuildEntry]) -> (f64, usize) {
        let n = chunk.len();
        if n < 2 {
            return (f64::INFINITY, 0);
        }
        self.left.clear();
        self.left.resize(n, 0.0);
        self.right.clear();
        self.right.resize(n, 0.0);

        let mut bounds = Aabb::empty();
        for i in 0..n - 1 {
            bounds.expand_mut(&chunk[i].bounds);
            self.left[i] = bounds.surface_area();
        }
        let mut bounds = Aabb::empty();
        for i in (1..n).rev() {
            bounds.expand_mut(&chunk[i].bounds);
            self.right[i - 1] = bounds.surface_area();
        }

        let mut best = (f64::INFINITY, 0);
        for i in 0..n - 1 {
            let cost = self.left[i] * (i + 1) as f64 + self.right[i] * (n - i - 1) as f64;
            if cost < best.0 {
                best = (cost, i);
            }
        }
        best
    }
}

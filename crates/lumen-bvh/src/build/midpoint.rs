//! Spatial midpoint splits along the major axis.

use super::{chunk_bounds, BuildEntry, SortPool, SplitHeuristic};

/// Splits each chunk at the spatial midpoint of its major axis.
///
/// Fast and simple, but the resulting tree is usually not optimal and may be
/// unbalanced when primitives cluster on one side of the midpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointSplit;

impl SplitHeuristic for MidpointSplit {
    fn split(&self, chunk: &mut [BuildEntry], pool: &SortPool) -> usize {
        let bounds = chunk_bounds(chunk);
        let axis = bounds.major_axis();
        let mid = bounds.centroid_on(axis);

        pool.sort_by_axis(chunk, axis);

        // The primitive defining the upper bound has its centroid at or past
        // the midpoint, so the scan stops before the end in exact arithmetic.
        let end = chunk.len();
        let split = (1..end)
            .find(|&i| chunk[i].centroid(axis) >= mid)
            .unwrap_or(end);
        split.min(end.saturating_sub(1))
    }
}

//! Full Surface Area Heuristic splits.

use lumen_math::Axis;

use super::{BuildEntry, SahSweep, SortPool, SplitHeuristic};

/// Evaluates every split position on all three axes and keeps the one with
/// the lowest surface area cost.
///
/// Slow but nearly optimal. Each split sorts the chunk three times (four
/// when the winning axis is not the last one evaluated).
#[derive(Debug, Clone, Copy, Default)]
pub struct SahSplit;

impl SplitHeuristic for SahSplit {
    fn split(&self, chunk: &mut [BuildEntry], pool: &SortPool) -> usize {
        let mut sweep = SahSweep::default();
        let mut best_cost = f64::INFINITY;
        let mut best_axis = Axis::X;
        let mut best_index = 0;

        for axis in Axis::ALL {
            pool.sort_by_axis(chunk, axis);
            let (cost, index) = sweep.best_split(chunk);
            if cost < best_cost {
                best_cost = cost;
                best_axis = axis;
                best_index = index;
            }
        }

        if best_axis != Axis::Z {
            pool.sort_by_axis(chunk, best_axis);
        }

        (best_index + 1).min(chunk.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::build::chunk_bounds;

    #[test]
    fn test_sah_picks_best_axis() {
        // two clusters separated along y; x spread is larger but uniform
        let mut prims: Vec<_> = (0..4).map(|i| cube_at(i as f64 * 10.0, 0.0, 0.0)).collect();
        prims.extend((0..4).map(|i| cube_at(i as f64 * 10.0 + 5.0, 30.0, 0.0)));
        let mut chunk = entries(&prims);

        let split = SahSplit.split(&mut chunk, &SortPool::global());
        assert_eq!(split, 4);
        assert!(chunk[..split].iter().all(|e| e.bounds.ymin == 0.0));
        assert!(chunk[split..].iter().all(|e| e.bounds.ymin == 30.0));
    }

    #[test]
    fn test_sah_resorts_by_winning_axis() {
        // clusters along x, so the chunk must end up sorted by x again
        let mut prims: Vec<_> = (0..5).map(|i| cube_at(i as f64, i as f64 * 0.1, 0.0)).collect();
        prims.extend((0..5).map(|i| cube_at(200.0 + i as f64, 0.0, i as f64 * 0.2)));
        let mut chunk = entries(&prims);
        chunk.reverse();

        let split = SahSplit.split(&mut chunk, &SortPool::global());
        assert_eq!(split, 5);
        assert!(chunk_bounds(&chunk[..split]).xmax < 10.0);
        assert!(chunk_bounds(&chunk[split..]).xmin >= 200.0);
    }

    #[test]
    fn test_sah_split_is_valid_on_random_chunks() {
        for seed in 0..20 {
            let n = 4 + seed as usize * 5;
            let mut chunk = entries(&random_boxes(100 + seed, n));
            let split = SahSplit.split(&mut chunk, &SortPool::global());
            assert!(split >= 1 && split < n, "seed {seed}: split {split} of {n}");
        }
    }
}

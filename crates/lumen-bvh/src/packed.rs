//! The packed hierarchy and its traversal.

use lumen_math::{slab_interval, Aabb, Ray, Vec3, OFFSET};

use crate::build::{construct, BuildEntry, SortPool, SplitHeuristic};
use crate::bvh::Bvh;
use crate::pack::{pack, record_bounds, widen, PackedTree, RECORD_WORDS};
use crate::primitive::{IntersectionRecord, PrimitiveRef};

/// A hierarchy flattened into one contiguous word buffer.
///
/// See [`crate::pack`] for the record layout. Traversal walks the buffer with
/// an explicit stack, visiting the nearer child first so that an early hit
/// prunes as much of the farther subtree as possible.
#[derive(Debug, Clone)]
pub struct PackedBvh {
    words: Vec<i32>,
    batches: Vec<Box<[PrimitiveRef]>>,
    depth: usize,
}

impl PackedBvh {
    /// Build and pack a hierarchy over `primitives`.
    ///
    /// `progress` receives the number of primitives placed so far. Returns
    /// `None` for an empty primitive list.
    pub fn build(
        primitives: Vec<PrimitiveRef>,
        heuristic: &dyn SplitHeuristic,
        pool: &SortPool,
        progress: &mut dyn FnMut(usize),
    ) -> Option<Self> {
        let entries = primitives.into_iter().map(BuildEntry::new).collect();
        let tree = construct(entries, heuristic, pool, progress)?;
        Some(Self::from_packed(pack(tree)))
    }

    /// Wrap the output of [`pack`].
    pub fn from_packed(packed: PackedTree) -> Self {
        Self {
            words: packed.words,
            batches: packed.batches,
            depth: packed.depth,
        }
    }

    /// Maximum stack depth seen while packing.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of node records.
    pub fn node_count(&self) -> usize {
        self.words.len() / RECORD_WORDS
    }

    /// Number of primitives across all leaves.
    pub fn primitive_count(&self) -> usize {
        self.batches.iter().map(|b| b.len()).sum()
    }

    /// Bounds of the root node, as stored.
    pub fn bounds(&self) -> Aabb {
        if self.words.is_empty() {
            Aabb::empty()
        } else {
            record_bounds(&self.words, 0)
        }
    }

    /// Bounds stored in the record starting at word `record`.
    pub fn record_bounds(&self, record: usize) -> Aabb {
        record_bounds(&self.words, record)
    }

    /// The raw packed words.
    pub fn words(&self) -> &[i32] {
        &self.words
    }

    /// The packed words as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }

    /// Primitive batches referenced by the leaves.
    pub fn primitive_batches(&self) -> &[Box<[PrimitiveRef]>] {
        &self.batches
    }

    /// Distance at which `ray` enters the box stored at `record`, or `None`
    /// if it misses.
    ///
    /// `inv` is the reciprocal ray direction. An axis-parallel ray is inside
    /// a slab for every `t` exactly when its origin lies between the slab
    /// planes, planes included.
    #[inline]
    fn entry_distance(&self, record: usize, ray: &Ray, inv: &Vec3) -> Option<f64> {
        let b = &self.words[record + 1..record + RECORD_WORDS];
        let o = &ray.origin;

        let (tx1, tx2) = slab_interval(widen(b[0]), widen(b[1]), o.x, inv.x);
        let (ty1, ty2) = slab_interval(widen(b[2]), widen(b[3]), o.y, inv.y);
        let (tz1, tz2) = slab_interval(widen(b[4]), widen(b[5]), o.z, inv.z);

        let t_min = tx1.max(ty1).max(tz1);
        let t_max = tx2.min(ty2).min(tz2);

        (t_min <= t_max + OFFSET && t_max >= 0.0).then_some(t_min)
    }
}

impl Bvh for PackedBvh {
    fn closest_intersection(&self, ray: &Ray, record: &mut IntersectionRecord) -> bool {
        if self.words.is_empty() {
            return false;
        }

        let inv = ray.inv_direction();
        let mut hit = false;
        let mut current = 0;
        let mut to_visit: Vec<usize> = Vec::with_capacity(self.depth);

        loop {
            let word = self.words[current];
            if word <= 0 {
                for primitive in self.batches[word.unsigned_abs() as usize].iter() {
                    hit |= primitive.closest_intersection(ray, record);
                }
                match to_visit.pop() {
                    Some(next) => current = next,
                    None => break,
                }
                continue;
            }

            let first = current + RECORD_WORDS;
            let second = word as usize;
            let near = |t: Option<f64>| t.filter(|&t| t <= record.distance);
            let t1 = near(self.entry_distance(first, ray, &inv));
            let t2 = near(self.entry_distance(second, ray, &inv));

            match (t1, t2) {
                (None, None) => match to_visit.pop() {
                    Some(next) => current = next,
                    None => break,
                },
                (Some(_), None) => current = first,
                (None, Some(_)) => current = second,
                (Some(t1), Some(t2)) => {
                    if t1 < t2 {
                        to_visit.push(second);
                        current = first;
                    } else {
                        to_visit.push(first);
                        current = second;
                    }
                }
            }
        }

        hit
    }

    fn any_intersection(&self, ray: &Ray, max_distance: f64) -> bool {
        if self.words.is_empty() {
            return false;
        }

        let inv = ray.inv_direction();
        let mut record = IntersectionRecord::with_distance(max_distance);
        let mut to_visit: Vec<usize> = Vec::with_capacity(self.depth + 1);
        to_visit.push(0);

        while let Some(current) = to_visit.pop() {
            let word = self.words[current];
            if word <= 0 {
                for primitive in self.batches[word.unsigned_abs() as usize].iter() {
                    if primitive.closest_intersection(ray, &mut record) {
                        return true;
                    }
                }
                continue;
            }

            let first = current + RECORD_WORDS;
            let second = word as usize;
            for child in [second, first] {
                if self
                    .entry_distance(child, ray, &inv)
                    .is_some_and(|t| t <= max_distance)
                {
                    to_visit.push(child);
                }
            }
        }

        false
    }
}

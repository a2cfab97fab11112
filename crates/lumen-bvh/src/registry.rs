//! Named BVH builders and scene-level construction.
//!
//! A [`BuilderRegistry`] maps builder ids to implementations and turns a
//! list of scene entities into a finished hierarchy. The registry is an
//! ordinary value owned by the caller; nothing here is global.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use lumen_math::Vec3;

use crate::build::{MidpointSplit, SahMajorAxisSplit, SahSplit, SortPool, SplitHeuristic};
use crate::bvh::{Bvh, EmptyBvh};
use crate::error::Result;
use crate::packed::PackedBvh;
use crate::primitive::{HasPrimitives, PrimitiveRef};
use crate::progress::{Phase, TaskTracker, FLATTEN_SHARE, PROGRESS_TARGET};
use crate::settings::BvhSettings;

/// Id of the midpoint builder.
pub const MIDPOINT: &str = "MIDPOINT";
/// Id of the full surface area heuristic builder.
pub const SAH: &str = "SAH";
/// Id of the major-axis surface area heuristic builder, the default.
pub const SAH_MA: &str = "SAH_MA";

/// Builds a hierarchy over a flat primitive list.
pub trait BvhBuilder: Send + Sync + Debug {
    /// Unique id used for lookup and in settings.
    fn id(&self) -> &str;

    /// Human readable description for builder pickers.
    fn description(&self) -> &str;

    /// Build a hierarchy. `progress` receives the number of primitives
    /// placed so far.
    fn build(
        &self,
        primitives: Vec<PrimitiveRef>,
        pool: &SortPool,
        progress: &mut dyn FnMut(usize),
    ) -> Arc<dyn Bvh>;
}

/// A builder producing a [`PackedBvh`] with a given split heuristic.
#[derive(Debug)]
pub struct HeuristicBuilder {
    id: String,
    description: String,
    heuristic: Box<dyn SplitHeuristic>,
}

impl HeuristicBuilder {
    /// Create a builder for `heuristic`.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        heuristic: impl SplitHeuristic + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            heuristic: Box::new(heuristic),
        }
    }

    /// The midpoint builder.
    pub fn midpoint() -> Self {
        Self::new(
            MIDPOINT,
            "Fast and simple, but not optimal BVH building method.",
            MidpointSplit,
        )
    }

    /// The full surface area heuristic builder.
    pub fn sah() -> Self {
        Self::new(SAH, "Slow but nearly optimal BVH building method.", SahSplit)
    }

    /// The major-axis surface area heuristic builder.
    pub fn sah_major_axis() -> Self {
        Self::new(
            SAH_MA,
            "Fast and nearly optimal BVH building method.",
            SahMajorAxisSplit,
        )
    }
}

impl BvhBuilder for HeuristicBuilder {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn build(
        &self,
        primitives: Vec<PrimitiveRef>,
        pool: &SortPool,
        progress: &mut dyn FnMut(usize),
    ) -> Arc<dyn Bvh> {
        let start = Instant::now();
        match PackedBvh::build(primitives, self.heuristic.as_ref(), pool, progress) {
            Some(bvh) => {
                info!(
                    "built {} BVH with depth {} ({} nodes, {} primitives) in {:?}",
                    self.id,
                    bvh.depth(),
                    bvh.node_count(),
                    bvh.primitive_count(),
                    start.elapsed()
                );
                Arc::new(bvh)
            }
            None => Arc::new(EmptyBvh),
        }
    }
}

/// Registry of named builders with a fallback default.
#[derive(Debug, Clone)]
pub struct BuilderRegistry {
    builders: Vec<Arc<dyn BvhBuilder>>,
    default_id: String,
    pool: SortPool,
}

impl BuilderRegistry {
    /// A registry holding only `default`, which also serves as the fallback
    /// for unknown ids.
    pub fn new(default: Arc<dyn BvhBuilder>) -> Self {
        Self {
            default_id: default.id().to_string(),
            builders: vec![default],
            pool: SortPool::global(),
        }
    }

    /// The built-in builders, with [`SAH_MA`] as the default.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new(Arc::new(HeuristicBuilder::sah_major_axis()));
        registry.register(Arc::new(HeuristicBuilder::sah()));
        registry.register(Arc::new(HeuristicBuilder::midpoint()));
        registry
    }

    /// The built-in builders, sorting on the pool `settings` ask for.
    ///
    /// Fails if the settings are invalid or name an unregistered builder.
    pub fn from_settings(settings: &BvhSettings) -> Result<Self> {
        let registry = Self::with_builtins().with_pool(settings.sort_pool()?);
        settings.validate_against(&registry)?;
        Ok(registry)
    }

    /// Use `pool` for the sorts of every build.
    #[must_use]
    pub fn with_pool(mut self, pool: SortPool) -> Self {
        self.pool = pool;
        self
    }

    /// Register a builder under its id.
    ///
    /// Ids are unique: registering an id twice keeps the first builder and
    /// returns `false`.
    pub fn register(&mut self, builder: Arc<dyn BvhBuilder>) -> bool {
        if self.contains(builder.id()) {
            warn!(
                "BVH implementation {} is already registered, keeping the first one",
                builder.id()
            );
            return false;
        }
        self.builders.push(builder);
        true
    }

    /// Whether a builder is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.builders.iter().any(|b| b.id() == id)
    }

    /// Id of the fallback builder.
    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// The builder registered under `id`, or the default if there is none.
    pub fn get(&self, id: &str) -> &Arc<dyn BvhBuilder> {
        if let Some(builder) = self.find(id) {
            return builder;
        }
        warn!(
            "unknown BVH implementation {id}, using {} instead",
            self.default_id
        );
        self.default_builder()
    }

    fn find(&self, id: &str) -> Option<&Arc<dyn BvhBuilder>> {
        self.builders.iter().find(|b| b.id() == id)
    }

    fn default_builder(&self) -> &Arc<dyn BvhBuilder> {
        // The default is registered first and never removed.
        &self.builders[0]
    }

    /// All builders in registration order.
    pub fn implementations(&self) -> impl Iterator<Item = &Arc<dyn BvhBuilder>> + '_ {
        self.builders.iter()
    }

    /// Build a hierarchy over every primitive of `entities`.
    ///
    /// Entities are flattened with `world_offset` applied. Progress is
    /// reported to `task` out of 1000: the first half while flattening, the
    /// second half while building. A scene without primitives yields an
    /// empty hierarchy without invoking any builder.
    pub fn create<E: HasPrimitives>(
        &self,
        id: &str,
        entities: &[E],
        world_offset: &Vec3,
        task: &dyn TaskTracker,
    ) -> Arc<dyn Bvh> {
        task.update(PROGRESS_TARGET, 0);

        let mut phase = Phase::new(task, 0, FLATTEN_SHARE, entities.len());
        let mut primitives = Vec::new();
        for (done, entity) in entities.iter().enumerate() {
            primitives.extend(entity.primitives(world_offset));
            phase.advance(done + 1);
        }
        debug!(
            "flattened {} entities into {} primitives",
            entities.len(),
            primitives.len()
        );

        self.build(id, primitives, task)
    }

    /// Build a hierarchy with the builder `settings` select.
    pub fn create_with<E: HasPrimitives>(
        &self,
        settings: &BvhSettings,
        entities: &[E],
        world_offset: &Vec3,
        task: &dyn TaskTracker,
    ) -> Arc<dyn Bvh> {
        self.create(&settings.bvh_implementation, entities, world_offset, task)
    }

    /// Build a hierarchy over an already flattened primitive list.
    pub fn create_from_primitives(
        &self,
        id: &str,
        primitives: Vec<PrimitiveRef>,
        task: &dyn TaskTracker,
    ) -> Arc<dyn Bvh> {
        task.update(PROGRESS_TARGET, FLATTEN_SHARE);
        self.build(id, primitives, task)
    }

    fn build(&self, id: &str, primitives: Vec<PrimitiveRef>, task: &dyn TaskTracker) -> Arc<dyn Bvh> {
        if primitives.is_empty() {
            return Arc::new(EmptyBvh);
        }

        let builder = self.get(id);
        let mut phase = Phase::new(
            task,
            FLATTEN_SHARE,
            PROGRESS_TARGET - FLATTEN_SHARE,
            primitives.len(),
        );
        builder.build(primitives, &self.pool, &mut |placed| phase.advance(placed))
    }
}

impl Default for BuilderRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::build::testing::*;
    use crate::primitive::{Cuboid, IntersectionRecord};
    use crate::progress::testing::RecordingTask;
    use crate::progress::NullTask;
    use lumen_math::{Aabb, Point3, Ray};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[derive(Debug)]
    struct Row {
        y: f64,
        count: usize,
    }

    impl HasPrimitives for Row {
        fn primitives(&self, world_offset: &Vec3) -> Vec<PrimitiveRef> {
            (0..self.count)
                .map(|i| {
                    let x = i as f64 * 2.0;
                    let local = Aabb::new(x, x + 1.0, self.y, self.y + 1.0, 0.0, 1.0);
                    Arc::new(Cuboid::new(local.translate(world_offset))) as PrimitiveRef
                })
                .collect()
        }
    }

    /// Counts invocations, then defers to the midpoint builder.
    #[derive(Debug)]
    struct Counting {
        id: &'static str,
        calls: AtomicUsize,
    }

    impl Counting {
        fn new(id: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl BvhBuilder for Counting {
        fn id(&self) -> &str {
            self.id
        }

        fn description(&self) -> &str {
            "counting"
        }

        fn build(
            &self,
            primitives: Vec<PrimitiveRef>,
            pool: &SortPool,
            progress: &mut dyn FnMut(usize),
        ) -> Arc<dyn Bvh> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            HeuristicBuilder::midpoint().build(primitives, pool, progress)
        }
    }

    #[test]
    fn test_builtins_are_listed() {
        let registry = BuilderRegistry::default();
        assert_eq!(registry.default_id(), SAH_MA);
        let ids: Vec<_> = registry.implementations().map(|b| b.id().to_string()).collect();
        assert_eq!(ids, vec![SAH_MA, SAH, MIDPOINT]);
        for builder in registry.implementations() {
            assert!(builder.description().ends_with("BVH building method."));
        }
    }

    #[test]
    fn test_unknown_id_falls_back_to_default() {
        init_logger();
        let registry = BuilderRegistry::default();
        assert_eq!(registry.get("OCTREE").id(), SAH_MA);
        assert_eq!(registry.get(MIDPOINT).id(), MIDPOINT);
        assert!(!registry.contains("OCTREE"));
    }

    #[test]
    fn test_create_with_unknown_id_uses_default() {
        init_logger();
        let fallback = Counting::new("CUSTOM");
        let mut registry = BuilderRegistry::new(fallback.clone());
        registry.register(Arc::new(HeuristicBuilder::sah()));

        let scene = [Row { y: 0.0, count: 12 }];
        let bvh = registry.create("OCTREE", &scene, &Vec3::zeros(), &NullTask);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);

        let ray = Ray::new(Point3::new(4.5, 0.5, -2.0), Vec3::z());
        let mut record = IntersectionRecord::new();
        assert!(bvh.closest_intersection(&ray, &mut record));
        assert!((record.distance - 2.0).abs() < 1e-9);

        registry.create(SAH, &scene, &Vec3::zeros(), &NullTask);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        init_logger();
        let mut registry = BuilderRegistry::with_builtins();
        let first = Counting::new("CUSTOM");
        let second = Counting::new("CUSTOM");
        assert!(registry.register(first.clone()));
        assert!(!registry.register(second.clone()));
        assert!(!registry.register(Arc::new(HeuristicBuilder::midpoint())));
        assert_eq!(registry.implementations().count(), 4);

        let scene = [Row { y: 0.0, count: 10 }];
        registry.create("CUSTOM", &scene, &Vec3::zeros(), &NullTask);
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_scene_skips_builder() {
        let counting = Counting::new("CUSTOM");
        let registry = BuilderRegistry::new(counting.clone());

        let bvh = registry.create("CUSTOM", &[] as &[Row], &Vec3::zeros(), &NullTask);
        let scene = [Row { y: 0.0, count: 0 }, Row { y: 3.0, count: 0 }];
        let bvh2 = registry.create("CUSTOM", &scene, &Vec3::zeros(), &NullTask);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);

        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z());
        let mut record = IntersectionRecord::new();
        assert!(!bvh.closest_intersection(&ray, &mut record));
        assert!(!bvh2.closest_intersection(&ray, &mut record));
    }

    #[test]
    fn test_create_applies_world_offset() {
        init_logger();
        let registry = BuilderRegistry::default();
        let scene: Vec<_> = (0..5).map(|i| Row { y: i as f64 * 3.0, count: 20 }).collect();
        let bvh = registry.create(SAH, &scene, &Vec3::new(0.0, 0.0, 10.0), &NullTask);

        let ray = Ray::new(Point3::new(4.5, 6.5, 0.0), Vec3::z());
        let mut record = IntersectionRecord::new();
        assert!(bvh.closest_intersection(&ray, &mut record));
        assert!((record.distance - 10.0).abs() < 1e-9);
        assert!(!bvh.any_intersection(&ray, 9.0));
    }

    #[test]
    fn test_progress_is_monotonic_and_complete() {
        let registry = BuilderRegistry::default();
        let scene: Vec<_> = (0..8).map(|i| Row { y: i as f64 * 3.0, count: 50 }).collect();
        let task = RecordingTask::default();
        registry.create(SAH_MA, &scene, &Vec3::zeros(), &task);

        let done = task.done_values();
        assert_eq!(done.first(), Some(&0));
        assert!(done.contains(&FLATTEN_SHARE));
        assert_eq!(done.last(), Some(&PROGRESS_TARGET));
        assert!(done.windows(2).all(|w| w[0] <= w[1]));
        assert!(task
            .updates
            .lock()
            .unwrap()
            .iter()
            .all(|&(target, _)| target == PROGRESS_TARGET));
    }

    #[test]
    fn test_create_from_primitives() {
        let registry = BuilderRegistry::default();
        let prims = random_boxes(3, 200);
        let task = RecordingTask::default();
        let bvh = registry.create_from_primitives(MIDPOINT, prims.clone(), &task);
        assert_eq!(task.done_values().last(), Some(&PROGRESS_TARGET));

        let ray = Ray::new(Point3::new(-100.0, 0.0, 0.0), Vec3::new(1.0, 0.01, 0.02));
        let mut expected = IntersectionRecord::new();
        let hit = prims
            .iter()
            .fold(false, |hit, p| p.closest_intersection(&ray, &mut expected) | hit);
        let mut record = IntersectionRecord::new();
        assert_eq!(bvh.closest_intersection(&ray, &mut record), hit);
        assert_eq!(record.distance, expected.distance);
    }

    #[test]
    fn test_registry_from_settings() {
        let settings = BvhSettings {
            bvh_implementation: MIDPOINT.into(),
            sort_threads: Some(2),
        };
        let registry = BuilderRegistry::from_settings(&settings).unwrap();
        let scene = [Row { y: 0.0, count: 30 }];
        let bvh = registry.create_with(&settings, &scene, &Vec3::zeros(), &NullTask);
        assert!(bvh.any_intersection(
            &Ray::new(Point3::new(0.5, 0.5, -1.0), Vec3::z()),
            f64::INFINITY
        ));

        let unknown = BvhSettings {
            bvh_implementation: "OCTREE".into(),
            sort_threads: None,
        };
        assert!(BuilderRegistry::from_settings(&unknown).is_err());
    }
}

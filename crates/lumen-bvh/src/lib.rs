#![warn(missing_docs)]

//! Bounding volume hierarchies for the lumen ray tracer.
//!
//! Answers closest-hit queries between rays and a large, rebuildable set of
//! primitives without testing every primitive.
//!
//! # Architecture
//!
//! - [`build`] - explicit-stack construction with interchangeable split
//!   heuristics (midpoint, SAH, SAH on the major axis)
//! - [`node`] - the transient build-time tree
//! - [`pack`] - flattening into 7-word records with `f32` bounds
//! - [`PackedBvh`] - stack-based nearest-first traversal of the packed form
//! - [`BuilderRegistry`] - named builders with a fallback default, and
//!   scene-level construction with progress reporting
//!
//! # Example
//!
//! ```ignore
//! use lumen_bvh::{BuilderRegistry, IntersectionRecord, NullTask, SAH_MA};
//! use lumen_math::{Point3, Ray, Vec3};
//!
//! let registry = BuilderRegistry::default();
//! let bvh = registry.create(SAH_MA, &entities, &Vec3::zeros(), &NullTask);
//!
//! let ray = Ray::new(Point3::new(-1.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
//! let mut record = IntersectionRecord::new();
//! if bvh.closest_intersection(&ray, &mut record) {
//!     println!("hit at {}", record.distance);
//! }
//! ```

pub mod build;
mod bvh;
pub mod error;
pub mod node;
pub mod pack;
mod packed;
pub mod primitive;
mod progress;
mod registry;
mod settings;

pub use build::{MidpointSplit, SahMajorAxisSplit, SahSplit, SortPool, SplitHeuristic};
pub use bvh::{Bvh, EmptyBvh};
pub use error::{BvhError, Result};
pub use packed::PackedBvh;
pub use primitive::{Cuboid, HasPrimitives, IntersectionRecord, Primitive, PrimitiveRef, Sphere};
pub use progress::{NullTask, TaskTracker};
pub use registry::{BuilderRegistry, BvhBuilder, HeuristicBuilder, MIDPOINT, SAH, SAH_MA};
pub use settings::BvhSettings;

/// Chunks with fewer primitives than this become leaves.
pub const SPLIT_LIMIT: usize = 4;

//! terrain_plugin - Engine-independent planetary terrain core
//!
//! Two cooperating cores extracted for reuse outside any specific engine:
//!
//! - **Tag-driven task scheduling** ([`tasks`]): declarative work units
//!   labelled with tag bitsets. Tags double as phase barriers ("nothing
//!   tagged `render` starts while `physics_step` has incomplete work"),
//!   matched with word-wise bitset arithmetic.
//! - **Subdividable terrain topology** ([`subdiv`], [`chunk`]): a
//!   reference-counted icosahedron skeleton whose edges subdivide to
//!   deterministic vertex IDs (two-parent hashing), plus chunked dense
//!   vertex grids that share boundary vertices so neighbouring chunks
//!   never crack.
//!
//! The two compose naturally - a subdivision pass is typically expressed
//! as a task - but neither depends on the other.
//!
//! # Example
//!
//! ```ignore
//! use terrain_plugin::icosahedron::create_skeleton_icosahedron;
//! use terrain_plugin::chunk::{ChunkVrtxSubdivLUT, ChunkedTriangleMesh, TerrainVertex};
//!
//! let mut positions = Vec::new();
//! let mut normals = Vec::new();
//! let (mut skeleton, vrtx, tris) =
//!   create_skeleton_icosahedron(6_371_000.0, 10, &mut positions, &mut normals);
//!
//! // Subdivide edges, instantiate chunks, upload vertex data...
//! let mesh = ChunkedTriangleMesh::new(64, 4, std::mem::size_of::<TerrainVertex>(), 10);
//! ```
//!
//! Rendering, asset import, and the surrounding entity world are
//! external collaborators: they consume tasks from the scheduler and
//! read vertex buffers from the mesh, nothing more.

pub mod bitset;
pub mod error;
pub mod registry;

// Core A: tag-driven task scheduling
pub mod tasks;
pub use tasks::{ExecutionContext, TagId, TaskId, TaskTags};

// Core B: subdivision skeleton and chunked mesh
pub mod subdiv;
pub use subdiv::{SkTriGroupId, SkTriId, SkVrtxId, SubdivSkeleton, SubdivTriangleSkeleton};

pub mod chunk;
pub use chunk::{ChunkId, ChunkVrtxSubdivLUT, ChunkedTriangleMesh, SharedVrtxId, TerrainVertex};

// Icosahedron seeding and sphere projection
pub mod icosahedron;

pub use error::{MeshError, SchedError};
pub use registry::{IdRegistry, IdType};

// Metrics collection (compile with --features metrics)
#[cfg(feature = "metrics")]
pub mod metrics;

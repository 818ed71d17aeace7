//! Reference-counted subdivision skeleton.
//!
//! A planet surface starts as an icosahedron and subdivides 1-to-4 on
//! demand. Nothing here stores positions or normals; the skeleton only
//! manages *identity* and *topology*:
//!
//! - [`SubdivIdTree`] hands out deterministic child IDs for unordered
//!   parent pairs, which is what keeps shared edges crack-free: any two
//!   triangles bisecting the same edge get the same midpoint vertex ID.
//! - [`SubdivSkeleton`] adds per-vertex reference counts on top.
//! - [`SubdivTriangleSkeleton`] adds triangles, allocated in groups of
//!   four (one subdivision step), with their own refcounts.
//!
//! Geometric data lives outside, in caller arrays indexed by
//! `size_required()` (see [`crate::icosahedron`]).

pub mod id_tree;
pub mod skeleton;
pub mod triangles;

pub use id_tree::SubdivIdTree;
pub use skeleton::{SkVrtxId, SubdivSkeleton};
pub use triangles::{
  tri_group_id, tri_id, tri_sibling_index, SkTriGroup, SkTriGroupId, SkTriId, SkeletonTriangle,
  SubdivTriangleSkeleton,
};

//! Chunked triangle mesh over the subdivision skeleton.
//!
//! A *chunk* is a dense triangular vertex grid at a fixed subdivision
//! level, instantiated over one skeleton triangle. Interiors are private
//! to each chunk; boundaries live in a reference-counted shared pool so
//! adjacent chunks stay crack-free. See [`mesh`] for the buffer layout
//! and [`lut`] for the interior fill recipes.

pub mod fill;
pub mod lut;
pub mod mesh;

pub use fill::{fill_chunk_interior, write_shared_vertices, TerrainVertex};
pub use lut::{ChunkVrtxSubdivLUT, LutVrtx, ToSubdiv};
pub use mesh::{ChunkId, ChunkedTriangleMesh, SharedVrtxId};

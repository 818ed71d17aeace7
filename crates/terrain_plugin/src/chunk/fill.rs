//! Standard vertex payload and ready-made fill callbacks.
//!
//! The mesh itself treats vertices as opaque bytes; these helpers cover
//! the common case of a position + normal layout so consumers (and
//! tests) don't hand-roll the byte casts and the LUT walk.

use bytemuck::{Pod, Zeroable};
use glam::I64Vec3;

use crate::error::MeshError;
use crate::registry::IdType;
use crate::subdiv::SkVrtxId;

use super::lut::ChunkVrtxSubdivLUT;
use super::mesh::{ChunkId, ChunkedTriangleMesh};

/// Position + normal vertex, the layout used by the terrain renderer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
  /// World-space position (fixed point already descaled).
  pub position: [f32; 3],

  /// Surface normal (unit vector).
  pub normal: [f32; 3],
}

/// Write positions and normals for newly added shared vertices.
///
/// `positions`/`normals` are the skeleton-indexed source arrays (see
/// [`crate::icosahedron`]); fixed-point positions are descaled by the
/// mesh's `scale` exponent. Wraps
/// [`ChunkedTriangleMesh::shared_update`], so the pending list is
/// drained.
pub fn write_shared_vertices(
  mesh: &mut ChunkedTriangleMesh,
  positions: &[I64Vec3],
  normals: &[glam::Vec3],
) {
  debug_assert_eq!(mesh.vrtx_stride(), std::mem::size_of::<TerrainVertex>());
  let descale = (-(mesh.scale() as f32)).exp2();

  mesh.shared_update(|newly_added, shared_to_skel, shared_offset, buffer| {
    let verts: &mut [TerrainVertex] = bytemuck::cast_slice_mut(buffer);
    let shared_region = &mut verts[shared_offset..];

    for &shared in newly_added {
      let skel: SkVrtxId = shared_to_skel[usize::from(shared)];
      let pos = positions[skel.index()];
      shared_region[usize::from(shared)] = TerrainVertex {
        position: [
          pos.x as f32 * descale,
          pos.y as f32 * descale,
          pos.z as f32 * descale,
        ],
        normal: normals[skel.index()].to_array(),
      };
    }
  });
}

/// Fill a chunk's interior by walking the LUT: every interior vertex is
/// the midpoint of its two (already written) parents.
///
/// The LUT must have been built for the mesh's level.
pub fn fill_chunk_interior(
  mesh: &mut ChunkedTriangleMesh,
  lut: &ChunkVrtxSubdivLUT,
  chunk: ChunkId,
) -> Result<(), MeshError> {
  debug_assert_eq!(lut.level(), mesh.level());
  debug_assert_eq!(mesh.vrtx_stride(), std::mem::size_of::<TerrainVertex>());

  mesh.chunk_calc_vrtx_fill(chunk, |chunk_id, chunk_shared, fill_count, shared_offset, buffer| {
    let verts: &mut [TerrainVertex] = bytemuck::cast_slice_mut(buffer);
    let (fill_all, shared_region) = verts.split_at_mut(shared_offset);

    let fill_count = fill_count as usize;
    let chunk_start = chunk_id.index() * fill_count;
    let chunk_fill = &mut fill_all[chunk_start..chunk_start + fill_count];

    for entry in lut.data() {
      let a = *lut.get(entry.vrtx_a, chunk_shared, chunk_fill, shared_region);
      let b = *lut.get(entry.vrtx_b, chunk_shared, chunk_fill, shared_region);
      chunk_fill[entry.fill_out as usize] = TerrainVertex {
        position: [
          (a.position[0] + b.position[0]) * 0.5,
          (a.position[1] + b.position[1]) * 0.5,
          (a.position[2] + b.position[2]) * 0.5,
        ],
        normal: [
          (a.normal[0] + b.normal[0]) * 0.5,
          (a.normal[1] + b.normal[1]) * 0.5,
          (a.normal[2] + b.normal[2]) * 0.5,
        ],
      };
    }
  })
}

#[cfg(test)]
#[path = "fill_test.rs"]
mod fill_test;

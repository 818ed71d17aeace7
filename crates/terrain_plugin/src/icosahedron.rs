//! Icosahedron seeding and sphere-projected position math.
//!
//! The skeleton stores only topology; positions live in caller arrays
//! indexed by vertex ID. This module seeds the 12 vertices and 20 root
//! triangles of an icosahedron and keeps those arrays populated as edges
//! and middles are subdivided.
//!
//! Positions are fixed point: a world-space coordinate `w` is stored as
//! the integer `w · 2^scale`, giving uniform precision across a planet
//! surface where an `f32` would degrade far from the origin. Normals
//! are plain unit `f32` vectors.

use glam::{DVec3, I64Vec3, Vec3};

use crate::subdiv::{tri_id, SkTriId, SkVrtxId, SubdivTriangleSkeleton};

/// Unit-icosahedron corner directions, before normalisation.
///
/// Built from three orthogonal golden rectangles; `PHI` is the golden
/// ratio.
const PHI: f64 = 1.618_033_988_749_895;

const ICO_CORNERS: [[f64; 3]; 12] = [
  [-1.0, PHI, 0.0],
  [1.0, PHI, 0.0],
  [-1.0, -PHI, 0.0],
  [1.0, -PHI, 0.0],
  [0.0, -1.0, PHI],
  [0.0, 1.0, PHI],
  [0.0, -1.0, -PHI],
  [0.0, 1.0, -PHI],
  [PHI, 0.0, -1.0],
  [PHI, 0.0, 1.0],
  [-PHI, 0.0, -1.0],
  [-PHI, 0.0, 1.0],
];

/// Counter-clockwise faces, viewed from outside the sphere.
///
/// Ordered so each consecutive run of four forms one allocation group.
const ICO_FACES: [[usize; 3]; 20] = [
  [0, 11, 5],
  [0, 5, 1],
  [0, 1, 7],
  [0, 7, 10],
  [0, 10, 11],
  [1, 5, 9],
  [5, 11, 4],
  [11, 10, 2],
  [10, 7, 6],
  [7, 1, 8],
  [3, 9, 4],
  [3, 4, 2],
  [3, 2, 6],
  [3, 6, 8],
  [3, 8, 9],
  [4, 9, 5],
  [2, 4, 11],
  [6, 2, 10],
  [8, 6, 7],
  [9, 8, 1],
];

/// Seed a skeleton with the 12 vertices and 20 triangles of an
/// icosahedron of the given `radius`, writing fixed-point positions and
/// normals for the seed vertices.
///
/// Triangles are packed into five root groups of four; the returned
/// array maps face index to triangle ID.
pub fn create_skeleton_icosahedron(
  radius: f64,
  scale: i32,
  positions: &mut Vec<I64Vec3>,
  normals: &mut Vec<Vec3>,
) -> (SubdivTriangleSkeleton, [SkVrtxId; 12], [SkTriId; 20]) {
  let mut skel = SubdivTriangleSkeleton::new();

  let vrtx_ids: [SkVrtxId; 12] = std::array::from_fn(|_| skel.vrtx.create_root());

  positions.resize(skel.vrtx.size_required(), I64Vec3::ZERO);
  normals.resize(skel.vrtx.size_required(), Vec3::ZERO);
  for (id, corner) in vrtx_ids.iter().zip(ICO_CORNERS) {
    let unit = DVec3::from_array(corner).normalize();
    positions[id.0 as usize] = to_fixed(unit, radius, scale);
    normals[id.0 as usize] = unit.as_vec3();
  }

  let mut tri_ids = [SkTriId(0); 20];
  for group_idx in 0..5 {
    let faces: [[SkVrtxId; 3]; 4] = std::array::from_fn(|i| {
      let face = ICO_FACES[group_idx * 4 + i];
      [vrtx_ids[face[0]], vrtx_ids[face[1]], vrtx_ids[face[2]]]
    });
    let group = skel.tri_group_create(0, None, faces);
    for i in 0..4 {
      tri_ids[group_idx * 4 + i] = tri_id(group, i as u8);
    }
  }

  (skel, vrtx_ids, tri_ids)
}

/// Write positions and normals for the three middle vertices of a
/// triangle, each projected onto the sphere.
pub fn ico_calc_middles(
  radius: f64,
  scale: i32,
  corners: [SkVrtxId; 3],
  middles: [SkVrtxId; 3],
  positions: &mut [I64Vec3],
  normals: &mut [Vec3],
) {
  for k in 0..3 {
    let (pos, normal) = project_midpoint(
      radius,
      scale,
      positions[corners[k].0 as usize],
      positions[corners[(k + 1) % 3].0 as usize],
    );
    positions[middles[k].0 as usize] = pos;
    normals[middles[k].0 as usize] = normal;
  }
}

/// Write positions and normals along a subdivided edge, mirroring the
/// ID recursion of
/// [`crate::subdiv::SubdivSkeleton::create_chunk_edge_recurse`]: the
/// midpoint of `a -> b` lands at `edge[len / 2]`, then each half
/// recurses. `positions`/`normals` must already be sized for every ID
/// in `edge`.
pub fn ico_calc_chunk_edge_recurse(
  radius: f64,
  scale: i32,
  level: u32,
  a: SkVrtxId,
  b: SkVrtxId,
  edge: &[SkVrtxId],
  positions: &mut [I64Vec3],
  normals: &mut [Vec3],
) {
  debug_assert_eq!(edge.len(), (1usize << level) - 1);
  if level == 0 {
    return;
  }

  let half = edge.len() / 2;
  let mid = edge[half];
  let (pos, normal) = project_midpoint(
    radius,
    scale,
    positions[a.0 as usize],
    positions[b.0 as usize],
  );
  positions[mid.0 as usize] = pos;
  normals[mid.0 as usize] = normal;

  ico_calc_chunk_edge_recurse(radius, scale, level - 1, a, mid, &edge[..half], positions, normals);
  ico_calc_chunk_edge_recurse(radius, scale, level - 1, mid, b, &edge[half + 1..], positions, normals);
}

/// Midpoint of two fixed-point positions, pushed out to the sphere.
fn project_midpoint(radius: f64, scale: i32, a: I64Vec3, b: I64Vec3) -> (I64Vec3, Vec3) {
  // The direction of the chord midpoint is scale-independent.
  let unit = (a.as_dvec3() + b.as_dvec3()).normalize();
  (to_fixed(unit, radius, scale), unit.as_vec3())
}

#[inline]
fn to_fixed(unit: DVec3, radius: f64, scale: i32) -> I64Vec3 {
  let world = unit * radius * (scale as f64).exp2();
  I64Vec3::new(
    world.x.round() as i64,
    world.y.round() as i64,
    world.z.round() as i64,
  )
}

#[cfg(test)]
#[path = "icosahedron_test.rs"]
mod icosahedron_test;

use super::*;
use crate::error::MeshError;
use crate::subdiv::{tri_id, SkVrtxId, SubdivTriangleSkeleton};

const LEVEL: u32 = 2;
const EDGE_LEN: usize = (1 << LEVEL) - 1;
const STRIDE: usize = 24;

/// Two triangles sharing the edge a-b, plus subdivided edges for both.
struct TwoTriFixture {
  skel: SubdivTriangleSkeleton,
  tris: [crate::subdiv::SkTriId; 2],
  edges: [[Vec<SkVrtxId>; 3]; 2],
}

fn two_adjacent_triangles() -> TwoTriFixture {
  let mut skel = SubdivTriangleSkeleton::new();
  let a = skel.vrtx.create_root();
  let b = skel.vrtx.create_root();
  let c = skel.vrtx.create_root();
  let d = skel.vrtx.create_root();

  // Triangle 0 = (a, b, c), triangle 1 = (a, d, b): both walk the shared
  // edge between a and b as their first edge (top -> left).
  let group = skel.tri_group_create(0, None, [[a, b, c], [a, d, b], [a, b, c], [a, d, b]]);
  let tris = [tri_id(group, 0), tri_id(group, 1)];

  let mut edges: [[Vec<SkVrtxId>; 3]; 2] = Default::default();
  for (idx, tri) in tris.iter().enumerate() {
    let corners = skel.tri_at(*tri).unwrap().vertices;
    for edge in 0..3 {
      let (from, to) = (corners[edge], corners[(edge + 1) % 3]);
      let mut out = vec![SkVrtxId(0); EDGE_LEN];
      skel.vrtx.create_chunk_edge_recurse(LEVEL, from, to, &mut out);
      edges[idx][edge] = out;
    }
  }
  TwoTriFixture { skel, tris, edges }
}

fn create_chunk(
  mesh: &mut ChunkedTriangleMesh,
  fx: &mut TwoTriFixture,
  which: usize,
) -> Result<ChunkId, MeshError> {
  let [ref ea, ref eb, ref ec] = fx.edges[which];
  mesh.chunk_create(&mut fx.skel, fx.tris[which], ea, eb, ec)
}

#[test]
fn buffer_sized_for_fills_plus_shared() {
  let mesh = ChunkedTriangleMesh::new(4, LEVEL, STRIDE, 10);
  let fill = ChunkVrtxSubdivLUT::fill_count_for(LEVEL);
  let ring = ChunkVrtxSubdivLUT::ring_size_for(LEVEL);

  assert_eq!(mesh.chunk_fill_count(), fill);
  assert_eq!(mesh.chunk_ring_size(), ring);
  assert_eq!(mesh.shared_offset(), 4 * fill);
  assert_eq!(mesh.vrtx_buffer().len(), (4 * fill + 4 * ring) * STRIDE);
}

#[test]
fn chunk_create_populates_ring_in_order() {
  let mut fx = two_adjacent_triangles();
  let mut mesh = ChunkedTriangleMesh::new(2, LEVEL, STRIDE, 10);

  let chunk = create_chunk(&mut mesh, &mut fx, 0).unwrap();
  let ring = mesh.chunk_shared(chunk).unwrap().to_vec();
  assert_eq!(ring.len(), ChunkVrtxSubdivLUT::ring_size_for(LEVEL));

  // Ring order: corner, edge A, corner, edge B, corner, edge C.
  let corners = fx.skel.tri_at(fx.tris[0]).unwrap().vertices;
  let n = 1 << LEVEL;
  assert_eq!(mesh.shared_of_skel(corners[0]), Some(ring[0]));
  assert_eq!(mesh.shared_of_skel(corners[1]), Some(ring[n]));
  assert_eq!(mesh.shared_of_skel(corners[2]), Some(ring[2 * n]));
  for (i, &v) in fx.edges[0][0].iter().enumerate() {
    assert_eq!(mesh.shared_of_skel(v), Some(ring[1 + i]));
  }

  // One chunk, so every ring vertex has exactly one reference.
  for &shared in &ring {
    assert_eq!(mesh.shared_refcount(shared), 1);
  }
  assert_eq!(mesh.shared_count(), ring.len());
}

#[test]
fn adjacent_chunks_share_edge_vertices() {
  let mut fx = two_adjacent_triangles();
  let mut mesh = ChunkedTriangleMesh::new(2, LEVEL, STRIDE, 10);

  let chunk0 = create_chunk(&mut mesh, &mut fx, 0).unwrap();
  let chunk1 = create_chunk(&mut mesh, &mut fx, 1).unwrap();

  // The shared edge runs between the same two skeleton vertices, so its
  // interior vertices map to identical SharedVrtxIds from both sides.
  // Triangle 0 walks it top->left, triangle 1 left->right... both rings
  // reference the same pool entries, whatever their ring position.
  let ring0 = mesh.chunk_shared(chunk0).unwrap().to_vec();
  let ring1 = mesh.chunk_shared(chunk1).unwrap().to_vec();

  for &v in &fx.edges[0][0] {
    let shared = mesh.shared_of_skel(v).unwrap();
    assert!(ring0.contains(&shared));
    assert!(ring1.contains(&shared));
    assert_eq!(mesh.shared_refcount(shared), 2);
  }

  // Vertices only on chunk 0's private edges stay at refcount 1.
  for &v in &fx.edges[0][1] {
    let shared = mesh.shared_of_skel(v).unwrap();
    assert_eq!(mesh.shared_refcount(shared), 1);
  }
}

#[test]
fn chunk_remove_releases_and_recycles() {
  let mut fx = two_adjacent_triangles();
  let mut mesh = ChunkedTriangleMesh::new(2, LEVEL, STRIDE, 10);

  let chunk0 = create_chunk(&mut mesh, &mut fx, 0).unwrap();
  let chunk1 = create_chunk(&mut mesh, &mut fx, 1).unwrap();

  let shared_edge: Vec<SharedVrtxId> = fx.edges[0][0]
    .iter()
    .map(|&v| mesh.shared_of_skel(v).unwrap())
    .collect();

  mesh.chunk_remove(&mut fx.skel, chunk0).unwrap();
  for &shared in &shared_edge {
    assert_eq!(mesh.shared_refcount(shared), 1);
  }

  mesh.chunk_remove(&mut fx.skel, chunk1).unwrap();
  for &v in &fx.edges[0][0] {
    assert_eq!(mesh.shared_of_skel(v), None);
  }
  assert_eq!(mesh.shared_count(), 0);
  assert_eq!(mesh.chunk_count(), 0);

  // Removing again fails.
  assert!(matches!(
    mesh.chunk_remove(&mut fx.skel, chunk0),
    Err(MeshError::IdNotLive { .. })
  ));
}

#[test]
fn chunk_create_tracks_triangle_refcounts() {
  let mut fx = two_adjacent_triangles();
  let mut mesh = ChunkedTriangleMesh::new(2, LEVEL, STRIDE, 10);

  assert_eq!(fx.skel.tri_refcount(fx.tris[0]), 0);
  let chunk = create_chunk(&mut mesh, &mut fx, 0).unwrap();
  assert_eq!(fx.skel.tri_refcount(fx.tris[0]), 1);
  mesh.chunk_remove(&mut fx.skel, chunk).unwrap();
  assert_eq!(fx.skel.tri_refcount(fx.tris[0]), 0);
}

#[test]
fn chunk_pool_exhaustion() {
  let mut fx = two_adjacent_triangles();
  let mut mesh = ChunkedTriangleMesh::new(1, LEVEL, STRIDE, 10);

  let _chunk = create_chunk(&mut mesh, &mut fx, 0).unwrap();
  assert!(matches!(
    create_chunk(&mut mesh, &mut fx, 1),
    Err(MeshError::CapacityExceeded { .. })
  ));

  // The failed create must not have leaked shared references.
  for &v in &fx.edges[1][1] {
    assert_eq!(mesh.shared_of_skel(v), None);
  }
}

#[test]
fn shared_update_drains_pending_list() {
  let mut fx = two_adjacent_triangles();
  let mut mesh = ChunkedTriangleMesh::new(2, LEVEL, STRIDE, 10);

  let _chunk0 = create_chunk(&mut mesh, &mut fx, 0).unwrap();
  let ring_size = mesh.chunk_ring_size();

  let mut first_batch = 0;
  mesh.shared_update(|newly_added, _, _, _| first_batch = newly_added.len());
  assert_eq!(first_batch, ring_size);

  // Nothing new: second call sees an empty batch.
  let mut second_batch = usize::MAX;
  mesh.shared_update(|newly_added, _, _, _| second_batch = newly_added.len());
  assert_eq!(second_batch, 0);

  // The second chunk only adds its two private edges + no corners...
  // every vertex of the shared edge and both shared corners already
  // have pool entries.
  let _chunk1 = create_chunk(&mut mesh, &mut fx, 1).unwrap();
  let mut third_batch = 0;
  mesh.shared_update(|newly_added, _, _, _| third_batch = newly_added.len());
  let edge_len = (1 << LEVEL) - 1;
  assert_eq!(third_batch, 2 * edge_len + 1);
}

#[test]
fn removed_then_reused_vertex_is_pending_again() {
  let mut fx = two_adjacent_triangles();
  let mut mesh = ChunkedTriangleMesh::new(2, LEVEL, STRIDE, 10);

  let chunk0 = create_chunk(&mut mesh, &mut fx, 0).unwrap();
  mesh.shared_update(|_, _, _, _| {});

  mesh.chunk_remove(&mut fx.skel, chunk0).unwrap();
  let chunk0 = create_chunk(&mut mesh, &mut fx, 0).unwrap();

  let mut pending = 0;
  mesh.shared_update(|newly_added, _, _, _| pending = newly_added.len());
  assert_eq!(pending, mesh.chunk_ring_size());
  let _ = chunk0;
}

#[test]
fn remove_before_update_drops_from_pending() {
  let mut fx = two_adjacent_triangles();
  let mut mesh = ChunkedTriangleMesh::new(2, LEVEL, STRIDE, 10);

  // Create and remove without an intervening shared_update: the pending
  // list must not hand out dead IDs.
  let chunk0 = create_chunk(&mut mesh, &mut fx, 0).unwrap();
  mesh.chunk_remove(&mut fx.skel, chunk0).unwrap();

  let mut pending = usize::MAX;
  mesh.shared_update(|newly_added, _, _, _| pending = newly_added.len());
  assert_eq!(pending, 0);
}

//! Terrain-resolution chunks instantiated over skeleton triangles.
//!
//! Each chunk owns a dense interior ("fill") vertex grid; its boundary
//! vertices live in a shared pool so that neighbouring chunks reference
//! the *same* vertex along a common edge and no T-junction cracks can
//! form. Shared vertices are reference-counted by the number of chunks
//! using them.
//!
//! The single vertex byte buffer is laid out as
//!
//! ```text
//! [ chunk 0 fill | chunk 1 fill | ... | shared vertices ]
//! ```
//!
//! with a caller-defined per-vertex stride. The mesh never interprets
//! vertex bytes itself; data enters only through the callbacks of
//! [`shared_update`](ChunkedTriangleMesh::shared_update) and
//! [`chunk_calc_vrtx_fill`](ChunkedTriangleMesh::chunk_calc_vrtx_fill).

use rustc_hash::FxHashMap;

use crate::error::MeshError;
use crate::registry::{IdRegistry, IdType};
use crate::subdiv::{SkTriId, SkVrtxId, SubdivTriangleSkeleton};

#[cfg(feature = "metrics")]
use crate::metrics::MeshMetrics;

use super::lut::ChunkVrtxSubdivLUT;

/// Identifier of an instantiated terrain chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkId(pub u32);

impl IdType for ChunkId {
  fn from_index(index: usize) -> Self {
    Self(index as u32)
  }
  fn index(self) -> usize {
    self.0 as usize
  }
}

/// Identifier into the shared boundary-vertex pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SharedVrtxId(pub u32);

impl IdType for SharedVrtxId {
  fn from_index(index: usize) -> Self {
    Self(index as u32)
  }
  fn index(self) -> usize {
    self.0 as usize
  }
}

impl From<SharedVrtxId> for usize {
  fn from(id: SharedVrtxId) -> usize {
    id.index()
  }
}

/// Chunked triangle mesh over a subdivision skeleton.
///
/// Fixed-capacity: the vertex buffer and both ID pools are sized once in
/// [`new`](Self::new) and never reallocate; exhausting them surfaces as
/// `CapacityExceeded`.
pub struct ChunkedTriangleMesh {
  level: u32,
  vrtx_stride: usize,
  scale: i32,
  max_chunks: usize,
  fill_count: usize,
  ring_size: usize,

  chunk_ids: IdRegistry<ChunkId>,

  /// Skeleton triangle each live chunk sits on, indexed by `ChunkId`.
  chunk_tris: Vec<SkTriId>,

  /// Shared-pool IDs of each chunk's boundary ring, `ring_size` entries
  /// per chunk slot, in ring order (see [`super::lut`]).
  chunk_shared: Vec<SharedVrtxId>,

  shared_ids: IdRegistry<SharedVrtxId>,

  /// Skeleton vertex behind each shared vertex, indexed by `SharedVrtxId`.
  shared_to_skel: Vec<SkVrtxId>,

  skel_to_shared: FxHashMap<SkVrtxId, SharedVrtxId>,

  /// Chunks currently using each shared vertex.
  shared_refcounts: Vec<u8>,

  /// Shared vertices allocated since the last `shared_update`.
  shared_newly_added: Vec<SharedVrtxId>,

  vrtx_buffer: Vec<u8>,

  #[cfg(feature = "metrics")]
  pub metrics: MeshMetrics,
}

impl ChunkedTriangleMesh {
  /// Allocate a mesh for up to `max_chunks` chunks at subdivision
  /// `level`, with caller-defined `vrtx_stride` bytes per vertex.
  ///
  /// `scale` is the fixed-point exponent of the skeleton position data
  /// (world units are `2^-scale` of a position integer); the mesh only
  /// carries it for fill callbacks.
  ///
  /// The shared pool is sized for the no-sharing worst case
  /// (`max_chunks` full rings), so `chunk_create` can only fail on pool
  /// exhaustion when the chunk pool itself is full.
  pub fn new(max_chunks: usize, level: u32, vrtx_stride: usize, scale: i32) -> Self {
    // Fill indices share a u16 with the LUT's region tag bit.
    debug_assert!(ChunkVrtxSubdivLUT::fill_count_for(level) < (1usize << 15));
    let fill_count = ChunkVrtxSubdivLUT::fill_count_for(level);
    let ring_size = ChunkVrtxSubdivLUT::ring_size_for(level);
    let max_shared = max_chunks * ring_size;
    let vrtx_total = max_chunks * fill_count + max_shared;

    Self {
      level,
      vrtx_stride,
      scale,
      max_chunks,
      fill_count,
      ring_size,
      chunk_ids: IdRegistry::fixed(max_chunks),
      chunk_tris: vec![SkTriId(u32::MAX); max_chunks],
      chunk_shared: vec![SharedVrtxId(u32::MAX); max_chunks * ring_size],
      shared_ids: IdRegistry::fixed(max_shared),
      shared_to_skel: vec![SkVrtxId(u32::MAX); max_shared],
      skel_to_shared: FxHashMap::default(),
      shared_refcounts: vec![0; max_shared],
      shared_newly_added: Vec::new(),
      vrtx_buffer: vec![0; vrtx_total * vrtx_stride],
      #[cfg(feature = "metrics")]
      metrics: MeshMetrics::default(),
    }
  }

  #[inline]
  pub fn level(&self) -> u32 {
    self.level
  }

  #[inline]
  pub fn vrtx_stride(&self) -> usize {
    self.vrtx_stride
  }

  #[inline]
  pub fn scale(&self) -> i32 {
    self.scale
  }

  /// Interior vertices per chunk.
  #[inline]
  pub fn chunk_fill_count(&self) -> usize {
    self.fill_count
  }

  /// Boundary vertices per chunk.
  #[inline]
  pub fn chunk_ring_size(&self) -> usize {
    self.ring_size
  }

  /// Vertex index where the shared region starts.
  #[inline]
  pub fn shared_offset(&self) -> usize {
    self.max_chunks * self.fill_count
  }

  /// Number of live chunks.
  pub fn chunk_count(&self) -> usize {
    self.chunk_ids.live_count()
  }

  /// Number of live shared vertices.
  pub fn shared_count(&self) -> usize {
    self.shared_ids.live_count()
  }

  pub fn chunk_exists(&self, chunk: ChunkId) -> bool {
    self.chunk_ids.exists(chunk)
  }

  /// Chunks currently referencing a shared vertex.
  pub fn shared_refcount(&self, shared: SharedVrtxId) -> u8 {
    self.shared_refcounts[shared.index()]
  }

  /// Shared pool ID of a skeleton vertex, if one is live.
  pub fn shared_of_skel(&self, vrtx: SkVrtxId) -> Option<SharedVrtxId> {
    self.skel_to_shared.get(&vrtx).copied()
  }

  /// A chunk's boundary ring, in ring order.
  pub fn chunk_shared(&self, chunk: ChunkId) -> Result<&[SharedVrtxId], MeshError> {
    if !self.chunk_ids.exists(chunk) {
      return Err(MeshError::IdNotLive { id: chunk.0 });
    }
    let offset = chunk.index() * self.ring_size;
    Ok(&self.chunk_shared[offset..offset + self.ring_size])
  }

  /// Instantiate a chunk over skeleton triangle `sk_tri`.
  ///
  /// `edge_a/b/c` are the triangle's three subdivided edges from
  /// [`crate::subdiv::SubdivSkeleton::create_chunk_edge_recurse`], each
  /// `2^level - 1` long, in corner order (top->left, left->right,
  /// right->top). For every distinct boundary skeleton vertex the mesh
  /// reuses the live shared vertex or allocates a fresh one; either way
  /// this chunk holds one reference on it.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "mesh::chunk_create")
  )]
  pub fn chunk_create(
    &mut self,
    skeleton: &mut SubdivTriangleSkeleton,
    sk_tri: SkTriId,
    edge_a: &[SkVrtxId],
    edge_b: &[SkVrtxId],
    edge_c: &[SkVrtxId],
  ) -> Result<ChunkId, MeshError> {
    let edge_len = (1usize << self.level) - 1;
    debug_assert_eq!(edge_a.len(), edge_len);
    debug_assert_eq!(edge_b.len(), edge_len);
    debug_assert_eq!(edge_c.len(), edge_len);

    let corners = skeleton.tri_at(sk_tri)?.vertices;
    let chunk = self.chunk_ids.try_create()?;

    // Walk the boundary in ring order: corner, edge, corner, edge,
    // corner, edge. All 3·2^level ring vertices are distinct skeleton
    // vertices, so each acquires exactly one reference for this chunk.
    let ring_offset = chunk.index() * self.ring_size;
    let mut written = 0usize;
    let mut failure = None;

    'ring: for (corner, edge) in [
      (corners[0], edge_a),
      (corners[1], edge_b),
      (corners[2], edge_c),
    ] {
      for &vrtx in std::iter::once(&corner).chain(edge) {
        match self.shared_acquire(vrtx) {
          Ok(shared) => {
            self.chunk_shared[ring_offset + written] = shared;
            written += 1;
          }
          Err(err) => {
            failure = Some(err);
            break 'ring;
          }
        }
      }
    }

    if let Some(err) = failure {
      // Roll back references taken so far and the chunk slot itself.
      for i in 0..written {
        let shared = self.chunk_shared[ring_offset + i];
        self.shared_release(shared);
      }
      let _ = self.chunk_ids.remove(chunk);
      return Err(err);
    }

    skeleton.tri_refcount_add(sk_tri);
    self.chunk_tris[chunk.index()] = sk_tri;

    #[cfg(feature = "metrics")]
    {
      self.metrics.record_chunk_created(self.shared_ids.live_count());
    }

    Ok(chunk)
  }

  /// Destroy a chunk, releasing its shared-vertex and skeleton-triangle
  /// references. Shared vertices that drop to zero references are
  /// recycled.
  pub fn chunk_remove(
    &mut self,
    skeleton: &mut SubdivTriangleSkeleton,
    chunk: ChunkId,
  ) -> Result<(), MeshError> {
    if !self.chunk_ids.exists(chunk) {
      return Err(MeshError::IdNotLive { id: chunk.0 });
    }

    let ring_offset = chunk.index() * self.ring_size;
    for i in 0..self.ring_size {
      let shared = self.chunk_shared[ring_offset + i];
      self.shared_release(shared);
    }

    skeleton.tri_refcount_remove(self.chunk_tris[chunk.index()]);
    self.chunk_ids.remove(chunk)?;

    #[cfg(feature = "metrics")]
    {
      self.metrics.record_chunk_removed(self.shared_ids.live_count());
    }

    Ok(())
  }

  /// Hand newly added shared vertices to the caller for data upload.
  ///
  /// `callback(newly_added, shared_to_skel, shared_offset, buffer)` must
  /// write the per-vertex payload of every vertex in `newly_added`
  /// (addressed as `shared_offset + shared_id` vertices into `buffer`).
  /// The pending list is drained; vertices recycled and re-allocated
  /// since the last call appear again.
  pub fn shared_update<F>(&mut self, callback: F)
  where
    F: FnOnce(&[SharedVrtxId], &[SkVrtxId], usize, &mut [u8]),
  {
    let newly_added = std::mem::take(&mut self.shared_newly_added);
    let shared_offset = self.shared_offset();
    callback(
      &newly_added,
      &self.shared_to_skel,
      shared_offset,
      &mut self.vrtx_buffer,
    );
  }

  /// Run the interior-fill callback for one chunk.
  ///
  /// `callback(chunk, chunk_shared, fill_count, shared_offset, buffer)`
  /// is expected to iterate a [`ChunkVrtxSubdivLUT`] and write the
  /// chunk's fill region (vertices `chunk · fill_count ..` in `buffer`).
  pub fn chunk_calc_vrtx_fill<F>(&mut self, chunk: ChunkId, callback: F) -> Result<(), MeshError>
  where
    F: FnOnce(ChunkId, &[SharedVrtxId], u16, usize, &mut [u8]),
  {
    if !self.chunk_ids.exists(chunk) {
      return Err(MeshError::IdNotLive { id: chunk.0 });
    }

    #[cfg(feature = "metrics")]
    let fill_start = web_time::Instant::now();

    let offset = chunk.index() * self.ring_size;
    let chunk_shared = &self.chunk_shared[offset..offset + self.ring_size];
    callback(
      chunk,
      chunk_shared,
      self.fill_count as u16,
      self.max_chunks * self.fill_count,
      &mut self.vrtx_buffer,
    );

    #[cfg(feature = "metrics")]
    {
      self
        .metrics
        .record_fill_timing(fill_start.elapsed().as_micros() as u64);
    }

    Ok(())
  }

  /// Raw vertex buffer, for readers that know the layout.
  pub fn vrtx_buffer(&self) -> &[u8] {
    &self.vrtx_buffer
  }

  fn shared_acquire(&mut self, vrtx: SkVrtxId) -> Result<SharedVrtxId, MeshError> {
    if let Some(&shared) = self.skel_to_shared.get(&vrtx) {
      debug_assert!(self.shared_refcounts[shared.index()] < u8::MAX);
      self.shared_refcounts[shared.index()] += 1;
      return Ok(shared);
    }

    let shared = self.shared_ids.try_create()?;
    self.shared_to_skel[shared.index()] = vrtx;
    self.skel_to_shared.insert(vrtx, shared);
    self.shared_refcounts[shared.index()] = 1;
    self.shared_newly_added.push(shared);
    Ok(shared)
  }

  fn shared_release(&mut self, shared: SharedVrtxId) {
    debug_assert!(self.shared_refcounts[shared.index()] > 0, "refcount underflow");
    self.shared_refcounts[shared.index()] -= 1;
    if self.shared_refcounts[shared.index()] == 0 {
      let skel = self.shared_to_skel[shared.index()];
      self.skel_to_shared.remove(&skel);
      // A recycled ID may still sit in the pending list; forget it.
      self.shared_newly_added.retain(|&pending| pending != shared);
      let removed = self.shared_ids.remove(shared);
      debug_assert!(removed.is_ok());
    }
  }
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;

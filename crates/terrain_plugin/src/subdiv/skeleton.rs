//! Vertex skeleton: the ID tree plus reference counts.

use crate::registry::IdType;

use super::id_tree::SubdivIdTree;

/// Opaque skeleton vertex identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SkVrtxId(pub u32);

impl IdType for SkVrtxId {
  fn from_index(index: usize) -> Self {
    Self(index as u32)
  }
  fn index(self) -> usize {
    self.0 as usize
  }
}

/// Manages skeleton vertex IDs and their reference counts.
///
/// A vertex is referenced once per live triangle corner that uses it.
/// This type stores no positions or normals; callers keep geometric data
/// in their own arrays sized with [`size_required`](Self::size_required).
#[derive(Clone, Debug, Default)]
pub struct SubdivSkeleton {
  vrtx_ids: SubdivIdTree<SkVrtxId>,

  /// Indexed by `SkVrtxId`.
  vrtx_refcounts: Vec<u8>,
}

impl SubdivSkeleton {
  pub fn new() -> Self {
    Self::default()
  }

  /// Allocate an unrelated vertex (e.g. one of an icosahedron's 12 seed
  /// vertices). Initial refcount 0.
  pub fn create_root(&mut self) -> SkVrtxId {
    let id = self.vrtx_ids.create_root();
    self.fit_refcounts();
    self.vrtx_refcounts[id.index()] = 0;
    id
  }

  /// Canonical midpoint vertex of the unordered pair `{a, b}`; created
  /// with refcount 0 on first request.
  pub fn create_or_get_child(&mut self, a: SkVrtxId, b: SkVrtxId) -> SkVrtxId {
    let (id, created) = self.vrtx_ids.create_or_get(a, b);
    if created {
      self.fit_refcounts();
      self.vrtx_refcounts[id.index()] = 0;
    }
    id
  }

  /// The three edge midpoints of a triangle, in edge order
  /// (top-left, left-right, right-top).
  pub fn create_middles(&mut self, vertices: [SkVrtxId; 3]) -> [SkVrtxId; 3] {
    [
      self.create_or_get_child(vertices[0], vertices[1]),
      self.create_or_get_child(vertices[1], vertices[2]),
      self.create_or_get_child(vertices[2], vertices[0]),
    ]
  }

  /// Fill `out` with the vertices along the edge `a -> b` subdivided
  /// `level` times, excluding the endpoints.
  ///
  /// `out` must be `2^level - 1` long. The midpoint lands at `len / 2`
  /// and each half is filled recursively, so two triangles sharing the
  /// edge produce identical IDs in identical positions. Level 0 writes
  /// nothing.
  pub fn create_chunk_edge_recurse(
    &mut self,
    level: u32,
    a: SkVrtxId,
    b: SkVrtxId,
    out: &mut [SkVrtxId],
  ) {
    debug_assert_eq!(out.len(), (1usize << level) - 1);
    if level == 0 {
      return;
    }

    let mid = self.create_or_get_child(a, b);
    let half = out.len() / 2;
    out[half] = mid;
    self.create_chunk_edge_recurse(level - 1, a, mid, &mut out[..half]);
    self.create_chunk_edge_recurse(level - 1, mid, b, &mut out[half + 1..]);
  }

  #[inline]
  pub fn refcount(&self, id: SkVrtxId) -> u8 {
    self.vrtx_refcounts[id.index()]
  }

  #[inline]
  pub fn refcount_add(&mut self, id: SkVrtxId) {
    debug_assert!(self.vrtx_refcounts[id.index()] < u8::MAX, "refcount saturation");
    self.vrtx_refcounts[id.index()] += 1;
  }

  #[inline]
  pub fn refcount_remove(&mut self, id: SkVrtxId) {
    debug_assert!(self.vrtx_refcounts[id.index()] > 0, "refcount underflow");
    self.vrtx_refcounts[id.index()] -= 1;
  }

  /// Read-only view of the underlying ID tree.
  pub fn ids(&self) -> &SubdivIdTree<SkVrtxId> {
    &self.vrtx_ids
  }

  /// Array size required to fit all currently existing vertex IDs.
  pub fn size_required(&self) -> usize {
    self.vrtx_ids.size_required()
  }

  pub fn reserve(&mut self, n: usize) {
    self.vrtx_ids.reserve(n);
    let cap = self.vrtx_ids.capacity();
    if cap > self.vrtx_refcounts.len() {
      self.vrtx_refcounts.reserve(cap - self.vrtx_refcounts.len());
    }
  }

  pub fn reserve_more(&mut self, n: usize) {
    self.vrtx_ids.reserve_more(n);
  }

  fn fit_refcounts(&mut self) {
    let required = self.vrtx_ids.size_required();
    if self.vrtx_refcounts.len() < required {
      self.vrtx_refcounts.resize(required, 0);
    }
  }
}

#[cfg(test)]
#[path = "skeleton_test.rs"]
mod skeleton_test;

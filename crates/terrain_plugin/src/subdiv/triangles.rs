//! Triangle side of the skeleton: groups of four, subdivided on demand.

use crate::error::MeshError;
use crate::registry::{IdRegistry, IdType};

use super::skeleton::{SkVrtxId, SubdivSkeleton};

/// Identifier of a single skeleton triangle: `(group << 2) | sibling`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SkTriId(pub u32);

/// Identifier of a group of four triangles, the unit of allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SkTriGroupId(pub u32);

impl IdType for SkTriGroupId {
  fn from_index(index: usize) -> Self {
    Self(index as u32)
  }
  fn index(self) -> usize {
    self.0 as usize
  }
}

/// Group a triangle belongs to.
#[inline]
pub const fn tri_group_id(id: SkTriId) -> SkTriGroupId {
  SkTriGroupId(id.0 >> 2)
}

/// Position of a triangle within its group (0..4).
#[inline]
pub const fn tri_sibling_index(id: SkTriId) -> u8 {
  (id.0 & 3) as u8
}

/// Triangle ID from its group and sibling index.
#[inline]
pub const fn tri_id(group: SkTriGroupId, sibling: u8) -> SkTriId {
  SkTriId((group.0 << 2) | sibling as u32)
}

/// One skeleton triangle.
///
/// Vertices are ordered counter-clockwise, starting from top:
///
/// ```text
///       0
///      / \
///     /   \
///    1 ___ 2
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SkeletonTriangle {
  pub vertices: [SkVrtxId; 3],

  /// Child group, present iff this triangle has been subdivided.
  pub children: Option<SkTriGroupId>,
}

impl Default for SkeletonTriangle {
  fn default() -> Self {
    Self {
      vertices: [SkVrtxId(0); 3],
      children: None,
    }
  }
}

/// Four triangles created by one subdivision step.
///
/// ```text
///        /\
///       /  \
///      / t0 \
///     /______\
///    /\      /\
///   /  \ t3 /  \
///  / t1 \  / t2 \
/// /______\/______\
/// ```
///
/// 0: top, 1: left, 2: right, 3: center. The center triangle is upside
/// down; its 'top' vertex is the bottom-middle one. Root groups (seeded
/// directly, not by subdivision) need not follow this arrangement.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkTriGroup {
  pub triangles: [SkeletonTriangle; 4],

  /// Triangle this group was subdivided from; `None` for root groups.
  pub parent: Option<SkTriId>,

  /// Root groups are depth 0; children are parent depth + 1.
  pub depth: u8,
}

/// A subdividable triangle mesh topology with reference-counted vertices
/// and triangles.
///
/// Stores no geometric data; see the module docs.
#[derive(Clone, Debug, Default)]
pub struct SubdivTriangleSkeleton {
  /// Vertex IDs and refcounts. Public so callers can split borrows
  /// between vertex and triangle state.
  pub vrtx: SubdivSkeleton,

  tri_ids: IdRegistry<SkTriGroupId>,

  /// Indexed by `SkTriGroupId`.
  tri_data: Vec<SkTriGroup>,

  /// Indexed by `SkTriId` (four entries per group).
  tri_refcounts: Vec<u8>,
}

impl SubdivTriangleSkeleton {
  pub fn new() -> Self {
    Self::default()
  }

  /// Allocate a group of four triangles and reference all twelve corner
  /// vertices.
  pub fn tri_group_create(
    &mut self,
    depth: u8,
    parent: Option<SkTriId>,
    vertices: [[SkVrtxId; 3]; 4],
  ) -> SkTriGroupId {
    let group_id = self.tri_ids.create();
    self.tri_group_resize_fit_ids();

    let group = &mut self.tri_data[group_id.index()];
    group.parent = parent;
    group.depth = depth;
    for (tri, corners) in group.triangles.iter_mut().zip(vertices) {
      tri.children = None;
      tri.vertices = corners;
    }

    for corners in vertices {
      for vrtx in corners {
        self.vrtx.refcount_add(vrtx);
      }
    }
    group_id
  }

  /// Subdivide a leaf triangle into a child group.
  ///
  /// `middles` are the three edge midpoints from
  /// [`SubdivSkeleton::create_middles`] on the triangle's corners.
  /// Children are arranged top, left, right, center (center inverted).
  ///
  /// Idempotent: subdividing a triangle that already has children
  /// returns the existing group untouched.
  pub fn tri_subdiv(
    &mut self,
    tri_id_: SkTriId,
    middles: [SkVrtxId; 3],
  ) -> Result<SkTriGroupId, MeshError> {
    let tri = *self.tri_at(tri_id_)?;
    if let Some(existing) = tri.children {
      return Ok(existing);
    }

    let [top, left, right] = tri.vertices;
    let [mid_tl, mid_lr, mid_rt] = middles;
    debug_assert_eq!(self.vrtx.ids().get(top, left), Some(mid_tl));
    debug_assert_eq!(self.vrtx.ids().get(left, right), Some(mid_lr));
    debug_assert_eq!(self.vrtx.ids().get(right, top), Some(mid_rt));

    let depth = self.tri_data[tri_group_id(tri_id_).index()].depth;
    let group = self.tri_group_create(
      depth + 1,
      Some(tri_id_),
      [
        [top, mid_tl, mid_rt],
        [mid_tl, left, mid_lr],
        [mid_rt, mid_lr, right],
        [mid_lr, mid_tl, mid_rt],
      ],
    );

    self.tri_at_mut(tri_id_)?.children = Some(group);
    Ok(group)
  }

  /// Collapse a subdivided triangle: remove its child group and release
  /// the twelve vertex references the group held.
  ///
  /// The children must themselves be leaves; collapse bottom-up.
  /// Fails with `IdNotLive` if the triangle has no live child group.
  pub fn tri_unsubdiv(&mut self, tri_id_: SkTriId) -> Result<(), MeshError> {
    let children = self
      .tri_at(tri_id_)?
      .children
      .ok_or(MeshError::IdNotLive { id: tri_id_.0 })?;

    let group = self.tri_data[children.index()];
    debug_assert!(
      group.triangles.iter().all(|t| t.children.is_none()),
      "collapsing a group with subdivided children"
    );
    debug_assert!(
      (0..4).all(|sibling| self.tri_refcount(tri_id(children, sibling)) == 0),
      "collapsing a group with referenced triangles"
    );

    for tri in &group.triangles {
      for vrtx in tri.vertices {
        self.vrtx.refcount_remove(vrtx);
      }
    }

    self.tri_at_mut(tri_id_)?.children = None;
    self.tri_ids.remove(children)?;
    Ok(())
  }

  /// Look up a triangle by ID.
  pub fn tri_at(&self, id: SkTriId) -> Result<&SkeletonTriangle, MeshError> {
    let group = tri_group_id(id);
    if !self.tri_ids.exists(group) {
      return Err(MeshError::IdNotLive { id: id.0 });
    }
    Ok(&self.tri_data[group.index()].triangles[tri_sibling_index(id) as usize])
  }

  fn tri_at_mut(&mut self, id: SkTriId) -> Result<&mut SkeletonTriangle, MeshError> {
    let group = tri_group_id(id);
    if !self.tri_ids.exists(group) {
      return Err(MeshError::IdNotLive { id: id.0 });
    }
    Ok(&mut self.tri_data[group.index()].triangles[tri_sibling_index(id) as usize])
  }

  /// Look up a whole group by ID.
  pub fn tri_group_at(&self, id: SkTriGroupId) -> Result<&SkTriGroup, MeshError> {
    if !self.tri_ids.exists(id) {
      return Err(MeshError::IdNotLive { id: id.0 });
    }
    Ok(&self.tri_data[id.index()])
  }

  pub fn tri_group_exists(&self, id: SkTriGroupId) -> bool {
    self.tri_ids.exists(id)
  }

  #[inline]
  pub fn tri_refcount(&self, id: SkTriId) -> u8 {
    self.tri_refcounts[id.0 as usize]
  }

  #[inline]
  pub fn tri_refcount_add(&mut self, id: SkTriId) {
    debug_assert!(self.tri_refcounts[id.0 as usize] < u8::MAX, "refcount saturation");
    self.tri_refcounts[id.0 as usize] += 1;
  }

  #[inline]
  pub fn tri_refcount_remove(&mut self, id: SkTriId) {
    debug_assert!(self.tri_refcounts[id.0 as usize] > 0, "refcount underflow");
    self.tri_refcounts[id.0 as usize] -= 1;
  }

  pub fn tri_group_reserve(&mut self, n: usize) {
    self.tri_ids.reserve(n);
    let cap = self.tri_ids.capacity();
    if cap > self.tri_data.len() {
      self.tri_data.reserve(cap - self.tri_data.len());
      self.tri_refcounts.reserve(cap * 4 - self.tri_refcounts.len());
    }
  }

  pub fn tri_group_reserve_more(&mut self, n: usize) {
    self.tri_group_reserve(n + self.tri_ids.live_count());
  }

  fn tri_group_resize_fit_ids(&mut self) {
    let required = self.tri_ids.size_required();
    if self.tri_data.len() < required {
      self.tri_data.resize(required, SkTriGroup::default());
      self.tri_refcounts.resize(required * 4, 0);
    }
  }
}

#[cfg(test)]
#[path = "triangles_test.rs"]
mod triangles_test;

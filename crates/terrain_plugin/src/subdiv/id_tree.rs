//! ID registry with canonical two-parent children.
//!
//! A multitree DAG of reusable IDs where a new ID can be derived from an
//! unordered pair of parent IDs. The derivation is idempotent: the same
//! pair always yields the same child, enforced by a single hash map keyed
//! on the canonical pair encoding.

use rustc_hash::FxHashMap;

use crate::registry::{IdRegistry, IdType};

/// Canonical key for the unordered pair `{a, b}`.
///
/// The smaller index occupies the high 32 bits, the larger the low 32,
/// so `combine(a, b) == combine(b, a)` and the key space never collides
/// with raw 32-bit IDs.
#[inline]
pub fn combine(a: u32, b: u32) -> u64 {
  let (larger, smaller) = if a > b { (a, b) } else { (b, a) };
  (larger as u64) | ((smaller as u64) << 32)
}

/// [`IdRegistry`] augmented with the canonical pair-to-child map.
///
/// Parent child-counts are bumped when a child is first created; roots
/// (made with [`create_root`](Self::create_root)) have no parents.
#[derive(Clone, Debug)]
pub struct SubdivIdTree<I: IdType> {
  ids: IdRegistry<I>,

  parents_to_id: FxHashMap<u64, I>,

  /// Pair key of each ID's parents; 0 marks a root. A real pair key is
  /// never 0 because pairs of distinct IDs always differ in their two
  /// halves.
  id_to_parents: Vec<u64>,

  child_counts: Vec<u8>,
}

impl<I: IdType> Default for SubdivIdTree<I> {
  fn default() -> Self {
    Self::new()
  }
}

impl<I: IdType> SubdivIdTree<I> {
  pub fn new() -> Self {
    Self {
      ids: IdRegistry::new(),
      parents_to_id: FxHashMap::default(),
      id_to_parents: Vec::new(),
      child_counts: Vec::new(),
    }
  }

  /// Allocate an ID with no parents.
  pub fn create_root(&mut self) -> I {
    let id = self.ids.create();
    let required = self.ids.size_required();
    if self.id_to_parents.len() < required {
      self.id_to_parents.resize(required, 0);
      self.child_counts.resize(required, 0);
    }
    self.id_to_parents[id.index()] = 0;
    self.child_counts[id.index()] = 0;
    id
  }

  /// Return the canonical child of the unordered pair `{a, b}`, creating
  /// it on first request.
  ///
  /// The second element is `true` iff the child was created by this call;
  /// only then are the parents' child-counts incremented.
  pub fn create_or_get(&mut self, a: I, b: I) -> (I, bool) {
    debug_assert!(a != b, "a pair of identical parents has no midpoint");
    debug_assert!(self.ids.exists(a) && self.ids.exists(b));

    let key = combine(a.index() as u32, b.index() as u32);
    if let Some(&existing) = self.parents_to_id.get(&key) {
      return (existing, false);
    }

    let id = self.create_root();
    self.parents_to_id.insert(key, id);
    self.id_to_parents[id.index()] = key;
    self.child_counts[a.index()] += 1;
    self.child_counts[b.index()] += 1;
    (id, true)
  }

  /// Look up the child of `{a, b}` without creating it.
  pub fn get(&self, a: I, b: I) -> Option<I> {
    self
      .parents_to_id
      .get(&combine(a.index() as u32, b.index() as u32))
      .copied()
  }

  /// The parents an ID was derived from; `None` for roots.
  pub fn parents_of(&self, id: I) -> Option<(I, I)> {
    let key = self.id_to_parents[id.index()];
    if key == 0 {
      return None;
    }
    let larger = (key & 0xFFFF_FFFF) as u32;
    let smaller = (key >> 32) as u32;
    Some((
      I::from_index(smaller as usize),
      I::from_index(larger as usize),
    ))
  }

  /// How many children have been derived from this ID.
  pub fn child_count(&self, id: I) -> u8 {
    self.child_counts[id.index()]
  }

  pub fn exists(&self, id: I) -> bool {
    self.ids.exists(id)
  }

  /// Array size required to fit all currently existing IDs.
  pub fn size_required(&self) -> usize {
    self.ids.size_required()
  }

  pub fn capacity(&self) -> usize {
    self.ids.capacity()
  }

  pub fn reserve(&mut self, n: usize) {
    self.ids.reserve(n);
    self.id_to_parents.reserve(n.saturating_sub(self.id_to_parents.len()));
    self.child_counts.reserve(n.saturating_sub(self.child_counts.len()));
    self.parents_to_id.reserve(n.saturating_sub(self.parents_to_id.len()));
  }

  pub fn reserve_more(&mut self, n: usize) {
    self.reserve(n + self.ids.live_count());
  }
}

#[cfg(test)]
#[path = "id_tree_test.rs"]
mod id_tree_test;

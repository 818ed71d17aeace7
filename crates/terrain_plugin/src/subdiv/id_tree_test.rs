use super::*;
use crate::registry::IdType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(u32);

impl IdType for NodeId {
  fn from_index(index: usize) -> Self {
    Self(index as u32)
  }
  fn index(self) -> usize {
    self.0 as usize
  }
}

#[test]
fn combine_is_order_insensitive() {
  assert_eq!(combine(3, 7), combine(7, 3));
  assert_eq!(combine(0, 1), combine(1, 0));
  // Distinct pairs get distinct keys.
  assert_ne!(combine(3, 7), combine(3, 8));
  assert_ne!(combine(0, 1), combine(0, 2));
}

#[test]
fn combine_key_layout() {
  // Smaller parent in the high word, larger in the low word.
  assert_eq!(combine(2, 5), (2u64 << 32) | 5);
}

#[test]
fn create_or_get_is_idempotent() {
  let mut tree: SubdivIdTree<NodeId> = SubdivIdTree::new();
  let a = tree.create_root();
  let b = tree.create_root();

  let (m1, new1) = tree.create_or_get(a, b);
  let (m2, new2) = tree.create_or_get(b, a);

  assert_eq!(m1, m2);
  assert!(new1);
  assert!(!new2);
}

#[test]
fn child_counts_bump_on_first_creation_only() {
  let mut tree: SubdivIdTree<NodeId> = SubdivIdTree::new();
  let a = tree.create_root();
  let b = tree.create_root();
  let c = tree.create_root();

  tree.create_or_get(a, b);
  tree.create_or_get(a, b);
  tree.create_or_get(a, c);

  assert_eq!(tree.child_count(a), 2);
  assert_eq!(tree.child_count(b), 1);
  assert_eq!(tree.child_count(c), 1);
}

#[test]
fn parents_roundtrip() {
  let mut tree: SubdivIdTree<NodeId> = SubdivIdTree::new();
  let a = tree.create_root();
  let b = tree.create_root();
  let (mid, _) = tree.create_or_get(b, a);

  assert_eq!(tree.parents_of(a), None);
  assert_eq!(tree.parents_of(mid), Some((a, b)));
}

#[test]
fn get_does_not_create() {
  let mut tree: SubdivIdTree<NodeId> = SubdivIdTree::new();
  let a = tree.create_root();
  let b = tree.create_root();

  assert_eq!(tree.get(a, b), None);
  let (mid, _) = tree.create_or_get(a, b);
  assert_eq!(tree.get(b, a), Some(mid));
  assert_eq!(tree.size_required(), 3);
}

#[test]
fn grandchildren_derive_from_children() {
  let mut tree: SubdivIdTree<NodeId> = SubdivIdTree::new();
  let a = tree.create_root();
  let b = tree.create_root();
  let (mid, _) = tree.create_or_get(a, b);
  let (quarter, was_new) = tree.create_or_get(a, mid);

  assert!(was_new);
  assert_eq!(tree.parents_of(quarter), Some((a, mid)));
  assert_eq!(tree.child_count(a), 2);
  assert_eq!(tree.child_count(mid), 1);
}

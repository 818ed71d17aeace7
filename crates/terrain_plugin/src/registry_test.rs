use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TestId(u32);

impl IdType for TestId {
  fn from_index(index: usize) -> Self {
    Self(index as u32)
  }
  fn index(self) -> usize {
    self.0 as usize
  }
}

#[test]
fn sequential_allocation() {
  let mut reg: IdRegistry<TestId> = IdRegistry::new();
  assert_eq!(reg.create(), TestId(0));
  assert_eq!(reg.create(), TestId(1));
  assert_eq!(reg.create(), TestId(2));
  assert_eq!(reg.size_required(), 3);
  assert_eq!(reg.live_count(), 3);
}

#[test]
fn removed_ids_are_recycled() {
  let mut reg: IdRegistry<TestId> = IdRegistry::new();
  let a = reg.create();
  let b = reg.create();
  let _c = reg.create();

  reg.remove(b).unwrap();
  assert!(!reg.exists(b));
  assert!(reg.exists(a));

  // Recycled index comes back before the dense range grows.
  let d = reg.create();
  assert_eq!(d, b);
  assert_eq!(reg.size_required(), 3);
}

#[test]
fn remove_dead_id_fails() {
  let mut reg: IdRegistry<TestId> = IdRegistry::new();
  let a = reg.create();
  reg.remove(a).unwrap();

  assert_eq!(reg.remove(a), Err(MeshError::IdNotLive { id: 0 }));
  assert_eq!(reg.remove(TestId(99)), Err(MeshError::IdNotLive { id: 99 }));
}

#[test]
fn fixed_capacity_exhaustion() {
  let mut reg: IdRegistry<TestId> = IdRegistry::fixed(2);
  let a = reg.try_create().unwrap();
  let _b = reg.try_create().unwrap();

  assert_eq!(
    reg.try_create(),
    Err(MeshError::CapacityExceeded { capacity: 2 })
  );

  // Removing one frees a slot again.
  reg.remove(a).unwrap();
  assert_eq!(reg.try_create().unwrap(), a);
}

#[test]
fn size_required_spans_holes() {
  let mut reg: IdRegistry<TestId> = IdRegistry::new();
  for _ in 0..5 {
    reg.create();
  }
  reg.remove(TestId(4)).unwrap();

  // The dense range still covers the removed tail slot.
  assert_eq!(reg.size_required(), 5);
  assert_eq!(reg.live_count(), 4);
}

#[test]
fn iter_live_skips_removed() {
  let mut reg: IdRegistry<TestId> = IdRegistry::new();
  for _ in 0..4 {
    reg.create();
  }
  reg.remove(TestId(1)).unwrap();

  let live: Vec<TestId> = reg.iter_live().collect();
  assert_eq!(live, vec![TestId(0), TestId(2), TestId(3)]);
}

#[test]
fn allocation_past_one_word() {
  let mut reg: IdRegistry<TestId> = IdRegistry::new();
  for i in 0..130 {
    assert_eq!(reg.create(), TestId(i));
  }
  assert!(reg.exists(TestId(129)));
  assert_eq!(reg.live_count(), 130);
}

#[test]
fn reserve_more_accounts_for_free_list() {
  let mut reg: IdRegistry<TestId> = IdRegistry::new();
  for _ in 0..10 {
    reg.create();
  }
  reg.remove(TestId(3)).unwrap();
  reg.remove(TestId(7)).unwrap();

  reg.reserve_more(100);
  assert!(reg.capacity() >= 108);
}

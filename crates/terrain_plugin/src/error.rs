//! Error types surfaced at the API boundary.
//!
//! Debug-only invariants (refcount bounds, availability preconditions) are
//! `debug_assert!`s and compile out in release builds; everything here is a
//! recoverable caller-facing failure.

use std::error::Error;
use std::fmt;

/// Scheduler misuse detected at a call boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedError {
  /// `enqueue` was given a query span whose length is not
  /// `tag_ints_per_task` words.
  InvalidQuerySize { expected: usize, got: usize },

  /// `list_available` was given an output span whose length is not
  /// `task_ints` words.
  InvalidOutSize { expected: usize, got: usize },

  /// A task ID outside the registered task range.
  TaskOutOfRange { task: u32, task_count: usize },
}

impl fmt::Display for SchedError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SchedError::InvalidQuerySize { expected, got } => {
        write!(f, "query span has {got} words, expected {expected}")
      }
      SchedError::InvalidOutSize { expected, got } => {
        write!(f, "output span has {got} words, expected {expected}")
      }
      SchedError::TaskOutOfRange { task, task_count } => {
        write!(f, "task id {task} out of range ({task_count} tasks registered)")
      }
    }
  }
}

impl Error for SchedError {}

/// Failure in the subdivision skeleton or chunked mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshError {
  /// A fixed-capacity registry has no free IDs left.
  CapacityExceeded { capacity: usize },

  /// A referenced ID is not live in its registry.
  IdNotLive { id: u32 },
}

impl fmt::Display for MeshError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MeshError::CapacityExceeded { capacity } => {
        write!(f, "registry full (fixed capacity {capacity})")
      }
      MeshError::IdNotLive { id } => write!(f, "id {id} is not live"),
    }
  }
}

impl Error for MeshError {}

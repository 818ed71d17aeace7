//! Mutable scheduler state and the enqueue/list/start/finish protocol.

use crate::bitset;
use crate::error::SchedError;

use super::tags::{TagId, TaskId, TaskTags};

/// Per-scheduler-instance mutable state: three parallel counter arrays.
///
/// Invariants (over any call sequence where every started task is
/// eventually finished):
/// - `tag_incomplete_counts[t]` equals the number of queued-or-running
///   carries of tag `t`, counted with `queued_count` multiplicity.
/// - `tag_running_counts[t] <= tag_incomplete_counts[t]`.
///
/// The arrays are sized from a [`TaskTags`] and only make sense paired
/// with the registry they were sized for.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
  /// Outstanding enqueue requests per task. Usually 0 or 1; values above 1
  /// represent coalesced re-queues of a task that is still running.
  task_queued_counts: Vec<u32>,

  /// Currently-executing tasks carrying each tag.
  tag_running_counts: Vec<u32>,

  /// Queued-or-running tasks carrying each tag; a tag is a satisfied
  /// dependency iff this is zero.
  tag_incomplete_counts: Vec<u32>,
}

impl ExecutionContext {
  /// Zero-initialised state sized for `tags`.
  pub fn new(tags: &TaskTags) -> Self {
    Self {
      task_queued_counts: vec![0; tags.task_count()],
      tag_running_counts: vec![0; tags.tag_count()],
      tag_incomplete_counts: vec![0; tags.tag_count()],
    }
  }

  #[inline]
  pub fn queued_count(&self, task: TaskId) -> u32 {
    self.task_queued_counts[task.index()]
  }

  #[inline]
  pub fn running_count(&self, tag: TagId) -> u32 {
    self.tag_running_counts[tag.index()]
  }

  #[inline]
  pub fn incomplete_count(&self, tag: TagId) -> u32 {
    self.tag_incomplete_counts[tag.index()]
  }

  /// Queue every not-yet-queued task whose tag row intersects `query`.
  ///
  /// Monotonic: tasks already queued (or queued-and-running) are left
  /// untouched, so enqueueing the same query twice is a no-op after the
  /// first call. `query` must be `tag_ints_per_task` words.
  pub fn enqueue(&mut self, tags: &TaskTags, query: &[u64]) -> Result<(), SchedError> {
    if query.len() != tags.tag_ints_per_task() {
      return Err(SchedError::InvalidQuerySize {
        expected: tags.tag_ints_per_task(),
        got: query.len(),
      });
    }

    for task_idx in 0..tags.task_count() {
      if self.task_queued_counts[task_idx] != 0 {
        continue;
      }
      let row = tags.task_tag_row(TaskId(task_idx as u32));
      if bitset::intersects(row, query) {
        self.task_queued_counts[task_idx] = 1;
        for tag_idx in bitset::iter_ones(row) {
          self.tag_incomplete_counts[tag_idx] += 1;
        }
      }
    }
    Ok(())
  }

  /// Queue one specific task, stacking on top of any queued or running
  /// instance.
  ///
  /// Unlike [`enqueue`](Self::enqueue) this does not coalesce: the queued
  /// count is incremented unconditionally, letting a running task be
  /// re-queued so it runs again after it finishes.
  pub fn enqueue_task(&mut self, tags: &TaskTags, task: TaskId) -> Result<(), SchedError> {
    self.check_task(tags, task)?;
    self.task_queued_counts[task.index()] += 1;
    for tag_idx in bitset::iter_ones(tags.task_tag_row(task)) {
      self.tag_incomplete_counts[tag_idx] += 1;
    }
    Ok(())
  }

  /// Fill `tasks_out` with the set of tasks that are queued and whose
  /// every tag has all dependencies complete.
  ///
  /// Deterministic: bits are produced in task index order. `tasks_out`
  /// must be `task_ints` words and is fully overwritten.
  pub fn list_available(&self, tags: &TaskTags, tasks_out: &mut [u64]) -> Result<(), SchedError> {
    if tasks_out.len() != tags.task_ints() {
      return Err(SchedError::InvalidOutSize {
        expected: tags.task_ints(),
        got: tasks_out.len(),
      });
    }

    bitset::clear_all(tasks_out);
    let mask = self.build_tag_mask(tags);

    for task_idx in 0..tags.task_count() {
      if self.task_queued_counts[task_idx] == 0 {
        continue;
      }
      let row = tags.task_tag_row(TaskId(task_idx as u32));
      if bitset::is_subset(row, &mask) {
        bitset::set(tasks_out, task_idx);
      }
    }
    Ok(())
  }

  /// Mark a task as running: bump the running count of each of its tags.
  ///
  /// Must only be called for a task just reported by
  /// [`list_available`](Self::list_available); debug builds assert this.
  pub fn start(&mut self, tags: &TaskTags, task: TaskId) -> Result<(), SchedError> {
    self.check_task(tags, task)?;
    debug_assert!(
      self.is_available(tags, task),
      "start() on a task that list_available would not report"
    );
    for tag_idx in bitset::iter_ones(tags.task_tag_row(task)) {
      self.tag_running_counts[tag_idx] += 1;
    }
    Ok(())
  }

  /// Retire one queued instance of a task: decrement its queued count and
  /// every carried tag's running and incomplete counts.
  ///
  /// Tags whose incomplete count reaches zero become satisfied
  /// dependencies, enlarging the next `list_available` result.
  pub fn finish(&mut self, tags: &TaskTags, task: TaskId) -> Result<(), SchedError> {
    self.check_task(tags, task)?;
    debug_assert!(self.task_queued_counts[task.index()] > 0, "finish() underflow");

    self.task_queued_counts[task.index()] -= 1;
    for tag_idx in bitset::iter_ones(tags.task_tag_row(task)) {
      debug_assert!(self.tag_running_counts[tag_idx] > 0);
      debug_assert!(self.tag_incomplete_counts[tag_idx] > 0);
      self.tag_running_counts[tag_idx] -= 1;
      self.tag_incomplete_counts[tag_idx] -= 1;
    }
    Ok(())
  }

  /// Per-tag allow mask: all-ones, minus tags with an incomplete
  /// dependency.
  fn build_tag_mask(&self, tags: &TaskTags) -> Vec<u64> {
    let mut mask = vec![!0u64; tags.tag_ints_per_task()];
    for tag_idx in 0..tags.tag_count() {
      let tag = TagId(tag_idx as u32);
      let blocked = tags
        .tag_depends(tag)
        .any(|dep| self.tag_incomplete_counts[dep.index()] != 0);
      if blocked {
        bitset::clear(&mut mask, tag_idx);
      }
    }
    mask
  }

  fn is_available(&self, tags: &TaskTags, task: TaskId) -> bool {
    self.task_queued_counts[task.index()] > 0
      && bitset::is_subset(tags.task_tag_row(task), &self.build_tag_mask(tags))
  }

  fn check_task(&self, tags: &TaskTags, task: TaskId) -> Result<(), SchedError> {
    if task.index() >= tags.task_count() {
      return Err(SchedError::TaskOutOfRange {
        task: task.0,
        task_count: tags.task_count(),
      });
    }
    Ok(())
  }
}

#[cfg(test)]
#[path = "exec_test.rs"]
mod exec_test;

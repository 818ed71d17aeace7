//! Tag/task registries, fixed at configuration time.

use smallvec::SmallVec;

use crate::bitset;

/// Opaque tag identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TagId(pub u32);

impl TagId {
  /// Padding sentinel in the depends table.
  pub const NONE: TagId = TagId(u32::MAX);

  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Opaque task identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub u32);

impl TaskId {
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Immutable tag/task registry: tag dependency table plus one bit row of
/// tags per task.
///
/// Built once with [`TaskTagsBuilder`]; the scheduler never mutates it.
/// Row width (`tag_ints_per_task`) is fixed by the tag count at build time,
/// and every query span handed to the scheduler must match it.
#[derive(Clone, Debug)]
pub struct TaskTags {
  tag_count: usize,
  task_count: usize,

  /// Fixed-width depends rows, one per tag, padded with `TagId::NONE`.
  depends_per_tag: usize,
  tag_depends: Vec<TagId>,

  /// Dense 2D bit array: `task_count` rows of `tag_ints_per_task` words.
  tag_ints_per_task: usize,
  task_tags: Vec<u64>,
}

impl TaskTags {
  pub fn builder() -> TaskTagsBuilder {
    TaskTagsBuilder::default()
  }

  #[inline]
  pub fn tag_count(&self) -> usize {
    self.tag_count
  }

  #[inline]
  pub fn task_count(&self) -> usize {
    self.task_count
  }

  /// Words per task-tag row; the required length of `enqueue` queries.
  #[inline]
  pub fn tag_ints_per_task(&self) -> usize {
    self.tag_ints_per_task
  }

  /// Words needed for a task bitset; the required length of
  /// `list_available` output spans.
  #[inline]
  pub fn task_ints(&self) -> usize {
    bitset::words_for_bits(self.task_count)
  }

  /// The tag bit row of one task.
  #[inline]
  pub fn task_tag_row(&self, task: TaskId) -> &[u64] {
    let offset = task.index() * self.tag_ints_per_task;
    &self.task_tags[offset..offset + self.tag_ints_per_task]
  }

  /// Dependencies of a tag, stopping at the padding sentinel.
  pub fn tag_depends(&self, tag: TagId) -> impl Iterator<Item = TagId> + '_ {
    let offset = tag.index() * self.depends_per_tag;
    self.tag_depends[offset..offset + self.depends_per_tag]
      .iter()
      .copied()
      .take_while(|&dep| dep != TagId::NONE)
  }

  /// Build a query span selecting exactly the given tags.
  pub fn query_of(&self, tags: &[TagId]) -> Vec<u64> {
    let mut query = vec![0u64; self.tag_ints_per_task];
    for tag in tags {
      bitset::set(&mut query, tag.index());
    }
    query
  }
}

/// Accumulates tags (with their depends) and tasks (with their tag sets),
/// then freezes them into a [`TaskTags`].
///
/// Tags must be registered before any task that carries them; dependency
/// edges may only point at already-registered tags.
#[derive(Default)]
pub struct TaskTagsBuilder {
  tag_depends: Vec<SmallVec<[TagId; 4]>>,
  task_tags: Vec<SmallVec<[TagId; 4]>>,
}

impl TaskTagsBuilder {
  /// Register a tag with its dependency list.
  pub fn tag(&mut self, depends: &[TagId]) -> TagId {
    debug_assert!(depends.iter().all(|d| d.index() < self.tag_depends.len()));
    let id = TagId(self.tag_depends.len() as u32);
    self.tag_depends.push(SmallVec::from_slice(depends));
    id
  }

  /// Register a task carrying the given tag set.
  pub fn task(&mut self, tags: &[TagId]) -> TaskId {
    debug_assert!(tags.iter().all(|t| t.index() < self.tag_depends.len()));
    let id = TaskId(self.task_tags.len() as u32);
    self.task_tags.push(SmallVec::from_slice(tags));
    id
  }

  /// Freeze into the dense registry representation.
  pub fn build(self) -> TaskTags {
    let tag_count = self.tag_depends.len();
    let task_count = self.task_tags.len();
    let tag_ints_per_task = bitset::words_for_bits(tag_count);

    let depends_per_tag = self
      .tag_depends
      .iter()
      .map(|deps| deps.len())
      .max()
      .unwrap_or(0);

    let mut tag_depends = vec![TagId::NONE; tag_count * depends_per_tag];
    for (tag_idx, deps) in self.tag_depends.iter().enumerate() {
      let offset = tag_idx * depends_per_tag;
      tag_depends[offset..offset + deps.len()].copy_from_slice(deps);
    }

    let mut task_tags = vec![0u64; task_count * tag_ints_per_task];
    for (task_idx, tags) in self.task_tags.iter().enumerate() {
      let offset = task_idx * tag_ints_per_task;
      let row = &mut task_tags[offset..offset + tag_ints_per_task];
      for tag in tags {
        bitset::set(row, tag.index());
      }
    }

    TaskTags {
      tag_count,
      task_count,
      depends_per_tag,
      tag_depends,
      tag_ints_per_task,
      task_tags,
    }
  }
}

#[cfg(test)]
#[path = "tags_test.rs"]
mod tags_test;

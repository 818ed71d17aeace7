//! Tag-driven task scheduling.
//!
//! Units of work (*tasks*) carry sets of *tags*. Tags serve two roles at
//! once: callers select work by tag ("enqueue everything tagged
//! `physics_step`"), and tags gate each other ("`render` may not start until
//! `physics_step` has no incomplete work").
//!
//! ```text
//! ┌──────────┐  enqueue(query)   ┌──────────┐  start(task)   ┌─────────┐
//! │   IDLE   ├──────────────────►│  QUEUED  ├───────────────►│ RUNNING │
//! └──────────┘                   └──────────┘                └────┬────┘
//!      ▲                                                          │
//!      └────────────────────────── finish(task) ──────────────────┘
//! ```
//!
//! The registry side ([`TaskTags`]) is immutable once built: tag depends
//! table plus one dense bit row per task. The mutable side
//! ([`ExecutionContext`]) is three plain counter arrays. All matching is
//! word-wise bitset arithmetic, so a scheduling step costs
//! `O(tasks × tag_words)`.
//!
//! Task bodies live outside the scheduler; [`drain`] and [`drain_parallel`]
//! are thin drivers that map [`TaskId`]s back to caller closures.

pub mod exec;
pub mod run;
pub mod tags;

pub use exec::ExecutionContext;
pub use run::{drain, drain_parallel, DrainStats};
pub use tags::{TagId, TaskId, TaskTags, TaskTagsBuilder};

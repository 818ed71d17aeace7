//! Drivers that pump the enqueue/list/start/finish protocol to completion.
//!
//! The scheduler itself never runs task bodies; these helpers close the
//! loop for callers that map [`TaskId`]s to closures. `drain` runs bodies
//! inline in task index order, `drain_parallel` fans each round out on
//! rayon while keeping all scheduler state mutation on the calling thread.

use rayon::prelude::*;
use web_time::Instant;

use crate::bitset;
use crate::error::SchedError;

use super::exec::ExecutionContext;
use super::tags::{TaskId, TaskTags};

/// Summary of one drain call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainStats {
  /// Scheduling rounds executed (one `list_available` each).
  pub rounds: usize,
  /// Task bodies run.
  pub tasks_run: usize,
  /// Wall time of the whole drain in microseconds.
  pub elapsed_us: u64,
}

/// Run queued tasks to completion, one at a time, lowest task index first.
///
/// The available set is re-listed after every body, so work queued by a
/// body (a running task may re-queue itself, or queue others, via
/// [`ExecutionContext::enqueue_task`]) is seen immediately and dependency
/// masks are never stale.
pub fn drain<F>(
  tags: &TaskTags,
  exec: &mut ExecutionContext,
  mut run_task: F,
) -> Result<DrainStats, SchedError>
where
  F: FnMut(TaskId, &mut ExecutionContext),
{
  let start_time = Instant::now();
  let mut stats = DrainStats::default();
  let mut available = vec![0u64; tags.task_ints()];

  loop {
    exec.list_available(tags, &mut available)?;
    let Some(task) = bitset::iter_ones(&available).next().map(|idx| TaskId(idx as u32)) else {
      break;
    };

    stats.rounds += 1;
    exec.start(tags, task)?;
    run_task(task, exec);
    exec.finish(tags, task)?;
    stats.tasks_run += 1;
  }

  stats.elapsed_us = start_time.elapsed().as_micros() as u64;
  Ok(stats)
}

/// Like [`drain`], but each round's bodies run in parallel on rayon.
///
/// Scheduler state is only touched between rounds: every task in the
/// round is `start`ed first, then bodies run on the pool, then every task
/// is `finish`ed. Dependencies expressed through tags therefore hold
/// across rounds, exactly as in the serial driver.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "tasks::drain_parallel")
)]
pub fn drain_parallel<F>(
  tags: &TaskTags,
  exec: &mut ExecutionContext,
  run_task: F,
) -> Result<DrainStats, SchedError>
where
  F: Fn(TaskId) + Sync,
{
  let start_time = Instant::now();
  let mut stats = DrainStats::default();
  let mut available = vec![0u64; tags.task_ints()];

  loop {
    exec.list_available(tags, &mut available)?;
    let round: Vec<TaskId> = bitset::iter_ones(&available)
      .map(|idx| TaskId(idx as u32))
      .collect();
    if round.is_empty() {
      break;
    }

    stats.rounds += 1;
    for &task in &round {
      exec.start(tags, task)?;
    }

    round.par_iter().for_each(|&task| run_task(task));

    for &task in &round {
      exec.finish(tags, task)?;
    }
    stats.tasks_run += round.len();
  }

  stats.elapsed_us = start_time.elapsed().as_micros() as u64;
  Ok(stats)
}

#[cfg(test)]
#[path = "run_test.rs"]
mod run_test;

//! Task reporting for translation runs
//!
//! A [`Task`] is a scope guard: it is opened by a [`TaskReporter`] and closed
//! exactly once when dropped. Tasks that are dropped without [`Task::finish`]
//! are reported as failed, so early returns via `?` are still accounted for.
//!
//! Uses `linya` for allocation-free, concurrency-optimized progress bars.

use chrono::{DateTime, Utc};
use linya::{Bar, Progress};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Identifier of an open task, unique per reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TaskId(u64);

/// How a task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOutcome {
  Succeeded,
  Failed,
}

/// Receives task lifecycle events
pub trait TaskReporter: Send + Sync {
  /// A task has started
  fn open(&self, name: &str, description: &str) -> TaskId;

  /// A task has ended
  fn close(&self, id: TaskId, outcome: TaskOutcome);
}

/// Begin an immediate task; it closes when the returned guard is dropped
pub fn begin_immediate_task(reporter: &Arc<dyn TaskReporter>, name: &str, description: &str) -> Task {
  let id = reporter.open(name, description);
  Task {
    id,
    reporter: Arc::clone(reporter),
    outcome: TaskOutcome::Failed,
  }
}

/// Scope guard for one reported task
#[must_use = "a task closes as soon as it is dropped"]
pub struct Task {
  id: TaskId,
  reporter: Arc<dyn TaskReporter>,
  outcome: TaskOutcome,
}

impl Task {
  pub fn id(&self) -> TaskId {
    self.id
  }

  /// Mark the task as succeeded and close it
  pub fn finish(mut self) {
    self.outcome = TaskOutcome::Succeeded;
  }
}

impl Drop for Task {
  fn drop(&mut self) {
    self.reporter.close(self.id, self.outcome);
  }
}

fn next_id(counter: &AtomicU64) -> TaskId {
  TaskId(counter.fetch_add(1, Ordering::Relaxed))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  // A panic while reporting must not poison every later task
  mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Console reporter: one progress bar per task on stderr
pub struct ConsoleReporter {
  progress: Mutex<Progress>,
  bars: Mutex<HashMap<TaskId, (Bar, String, Instant)>>,
  next: AtomicU64,
}

impl ConsoleReporter {
  pub fn new() -> Self {
    Self {
      progress: Mutex::new(Progress::new()),
      bars: Mutex::new(HashMap::new()),
      next: AtomicU64::new(0),
    }
  }
}

impl Default for ConsoleReporter {
  fn default() -> Self {
    Self::new()
  }
}

impl TaskReporter for ConsoleReporter {
  fn open(&self, name: &str, description: &str) -> TaskId {
    let id = next_id(&self.next);
    let bar = lock(&self.progress).bar(1, description.to_string());
    lock(&self.bars).insert(id, (bar, name.to_string(), Instant::now()));
    id
  }

  fn close(&self, id: TaskId, outcome: TaskOutcome) {
    let Some((bar, name, started)) = lock(&self.bars).remove(&id) else {
      return;
    };

    let elapsed = started.elapsed();
    match outcome {
      TaskOutcome::Succeeded => {
        lock(&self.progress).set_and_draw(&bar, 1);
        eprintln!("✅ {} finished in {:.1}s", name, elapsed.as_secs_f64());
      }
      TaskOutcome::Failed => {
        eprintln!("❌ {} failed after {:.1}s", name, elapsed.as_secs_f64());
      }
    }
  }
}

/// One finished (or still open) task as recorded by [`RecordingReporter`]
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
  pub id: TaskId,
  pub name: String,
  pub description: String,
  pub started_at: DateTime<Utc>,
  /// `None` while the task is open
  pub outcome: Option<TaskOutcome>,
  pub elapsed_ms: Option<u64>,
}

/// Reporter that keeps every task in memory (JSON output, tests)
#[derive(Default)]
pub struct RecordingReporter {
  records: Mutex<Vec<(TaskRecord, Instant)>>,
  next: AtomicU64,
}

impl RecordingReporter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot of all tasks in the order they were opened
  pub fn records(&self) -> Vec<TaskRecord> {
    lock(&self.records).iter().map(|(record, _)| record.clone()).collect()
  }

  /// Tasks that have been opened but not closed
  pub fn open_tasks(&self) -> usize {
    lock(&self.records).iter().filter(|(r, _)| r.outcome.is_none()).count()
  }
}

impl TaskReporter for RecordingReporter {
  fn open(&self, name: &str, description: &str) -> TaskId {
    let id = next_id(&self.next);
    let record = TaskRecord {
      id,
      name: name.to_string(),
      description: description.to_string(),
      started_at: Utc::now(),
      outcome: None,
      elapsed_ms: None,
    };
    lock(&self.records).push((record, Instant::now()));
    id
  }

  fn close(&self, id: TaskId, outcome: TaskOutcome) {
    let mut records = lock(&self.records);
    if let Some((record, started)) = records.iter_mut().find(|(r, _)| r.id == id) {
      record.outcome = Some(outcome);
      record.elapsed_ms = Some(started.elapsed().as_millis() as u64);
    }
  }
}

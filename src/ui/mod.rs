//! User-facing progress and task reporting

pub mod progress;

pub use progress::{ConsoleReporter, RecordingReporter, Task, TaskOutcome, TaskRecord, TaskReporter};

use std::fmt;
use crossbeam::channel::unbounded;
use tracing::{info, warn, Span};
use uuid::Uuid;
use crate::batch::task::{build, Task, TaskOutcome};
use crate::core::error::{Error, ErrorKind, Result};

/// Outcome of one aggregation run, per level.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub run_id: Uuid,
    pub completed: Vec<i64>,
    pub already_complete: Vec<i64>,
    pub failed: Vec<(i64, String)>,
}

impl JobSummary {
    pub fn scheduled(&self) -> usize {
        self.completed.len() + self.already_complete.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== Aggregation summary (run {}) =====", self.run_id)?;
        writeln!(f, "Scheduled {} level(s):", self.scheduled())?;
        writeln!(f, "* {} ran successfully: {:?}", self.completed.len(), self.completed)?;
        writeln!(f, "* {} already complete: {:?}", self.already_complete.len(), self.already_complete)?;
        writeln!(f, "* {} failed", self.failed.len())?;
        for (level, reason) in &self.failed {
            writeln!(f, "    - level {}: {}", level, reason)?;
        }
        if self.is_success() {
            write!(f, "This run was successful :)")
        } else {
            write!(f, "This run had failures; rerun to retry the failed levels :(")
        }
    }
}

/// Runs one task tree per level on a bounded worker pool.
pub struct LevelScheduler {
    pub workers: usize,
}

impl LevelScheduler {
    /// `workers == 0` means one worker per CPU.
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 { num_cpus::get() } else { workers };
        LevelScheduler { workers }
    }

    /// Builds every `(level, task)` pair. A failing level is recorded and the rest
    /// carry on.
    pub fn run(&self, run_id: Uuid, tasks: Vec<(i64, Box<dyn Task>)>) -> Result<JobSummary> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("aggregate-{}", i))
            .build()
            .map_err(|e| Error::new(ErrorKind::Internal, format!("cannot start worker pool: {}", e)))?;

        let (sender, receiver) = unbounded();

        pool.scope(|scope| {
            for (level, task) in tasks {
                let sender = sender.clone();
                let span = Span::current();
                scope.spawn(move |_| {
                    let _guard = span.enter();
                    info!(level, task = %task.name(), "building level");
                    let outcome = build(task.as_ref());
                    // The receiver outlives the scope
                    let _ = sender.send((level, outcome));
                });
            }
        });
        drop(sender);

        let mut summary = JobSummary {
            run_id,
            completed: Vec::new(),
            already_complete: Vec::new(),
            failed: Vec::new(),
        };

        for (level, outcome) in receiver.iter() {
            match outcome {
                Ok(TaskOutcome::Completed) => summary.completed.push(level),
                Ok(TaskOutcome::AlreadyComplete) => {
                    info!(level, "level already complete, skipped");
                    summary.already_complete.push(level);
                }
                Err(e) if e.kind() == ErrorKind::FatalPrecondition => return Err(e),
                Err(e) => {
                    warn!(level, error = %e, "level failed");
                    summary.failed.push((level, e.to_string()));
                }
            }
        }

        summary.completed.sort_unstable();
        summary.already_complete.sort_unstable();
        summary.failed.sort_by_key(|(level, _)| *level);
        Ok(summary)
    }
}

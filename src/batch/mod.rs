pub mod scheduler;
pub mod task;
pub mod tasks;

use std::sync::Arc;
use tracing::{error, info, info_span};
use uuid::Uuid;
use crate::batch::scheduler::{JobSummary, LevelScheduler};
use crate::batch::task::Task;
use crate::batch::tasks::{CalculateTotalDifficulty, JobContext, SongsData};
use crate::core::config::BatchConfig;
use crate::core::error::Result;
use crate::storage::store::AggregateStore;

/// Offline job that precomputes per-level difficulty totals
///
/// Each level runs `SongsData -> SongsByLevel -> CalculateTotalDifficulty`.
/// Levels that already have a record are skipped unless `force` is set.
pub struct AggregationJob {
    pub config: BatchConfig,
    pub totals: Arc<dyn AggregateStore>,
    pub force: bool,
}

impl AggregationJob {
    pub fn new(config: BatchConfig, totals: Arc<dyn AggregateStore>) -> Self {
        AggregationJob {
            config,
            totals,
            force: false,
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn run(&self) -> Result<JobSummary> {
        let run_id = Uuid::new_v4();
        let span = info_span!("aggregate", %run_id);
        let _guard = span.enter();

        let source = SongsData {
            source_path: self.config.source_path.clone(),
        };
        if !source.complete()? {
            if let Err(err) = source.run() {
                error!(error = %err, "aggregation aborted");
                return Err(err);
            }
        }

        let ctx = Arc::new(JobContext {
            source_path: self.config.source_path.clone(),
            partition_dir: self.config.partition_dir.clone(),
            totals: self.totals.clone(),
            force: self.force,
        });
        let tasks: Vec<(i64, Box<dyn Task>)> = (0..self.config.levels)
            .map(|level| {
                let task: Box<dyn Task> = Box::new(CalculateTotalDifficulty {
                    ctx: ctx.clone(),
                    level,
                });
                (level, task)
            })
            .collect();

        let scheduler = LevelScheduler::new(self.config.workers);
        info!(
            source = %self.config.source_path.display(),
            levels = self.config.levels,
            workers = scheduler.workers,
            force = self.force,
            "starting aggregation"
        );

        let summary = scheduler.run(run_id, tasks)?;
        info!("\n{}", summary);
        Ok(summary)
    }
}

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::core::error::Result;
use crate::core::types::{fields, FieldValue};
use crate::core::utils::RunningTotal;
use crate::query::ast::Query;
use crate::query::pipeline::{GroupStage, Pipeline};
use crate::storage::store::{AggregateStore, RecordStore};

/// Which path computes an average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Live aggregation over the song collection.
    #[default]
    Trivial,
    /// Combination of the per-level totals written by the batch job.
    Fun,
}

impl Algorithm {
    /// `"fun"` selects the precomputed path; any other name, or none, is trivial.
    pub fn parse(name: Option<&str>) -> Self {
        match name {
            Some("fun") => Algorithm::Fun,
            _ => Algorithm::Trivial,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Trivial => "trivial",
            Algorithm::Fun => "fun",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AverageDifficulty {
    pub average_difficulty: f64,
    pub level: Option<i64>,
    pub algorithm: Algorithm,
}

/// Average difficulty over the catalog, optionally restricted to one level.
pub struct AverageEngine {
    pub records: Arc<dyn RecordStore>,
    pub totals: Arc<dyn AggregateStore>,
}

impl AverageEngine {
    pub fn new(records: Arc<dyn RecordStore>, totals: Arc<dyn AggregateStore>) -> Self {
        AverageEngine { records, totals }
    }

    /// `None` when no song (or no aggregate) falls under `level`.
    pub fn average(&self, level: Option<i64>, algorithm: Algorithm) -> Result<Option<AverageDifficulty>> {
        let average = match algorithm {
            Algorithm::Trivial => self.live_average(level)?,
            Algorithm::Fun => self.precomputed_average(level)?,
        };
        debug!(?level, %algorithm, ?average, "computed average difficulty");

        Ok(average.map(|average_difficulty| AverageDifficulty {
            average_difficulty,
            level,
            algorithm,
        }))
    }

    fn live_average(&self, level: Option<i64>) -> Result<Option<f64>> {
        let mut pipeline = Pipeline::new();
        if let Some(level) = level {
            pipeline = pipeline.matching(Query::equals(fields::LEVEL, FieldValue::Integer(level)));
        }
        let pipeline = pipeline.group(GroupStage::average_of(fields::DIFFICULTY));

        let rows = self.records.aggregate(&pipeline)?;
        Ok(rows.first().map(|row| row.average))
    }

    fn precomputed_average(&self, level: Option<i64>) -> Result<Option<f64>> {
        let mut running = RunningTotal::default();
        for record in self.totals.find_all()? {
            if level.is_some_and(|l| l != record.level) {
                continue;
            }
            running.merge(record.total_difficulty, record.number_of_songs)?;
        }
        Ok(running.mean())
    }
}

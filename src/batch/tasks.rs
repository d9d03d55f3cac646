use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::info;
use crate::batch::task::Task;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::AggregateRecord;
use crate::core::utils::RunningTotal;
use crate::storage::store::AggregateStore;

/// Settings shared by every task of one run.
pub struct JobContext {
    pub source_path: PathBuf,
    pub partition_dir: PathBuf,
    pub totals: Arc<dyn AggregateStore>,
    pub force: bool,
}

impl JobContext {
    pub fn partition_path(&self, level: i64) -> PathBuf {
        self.partition_dir.join(format!("songs_by_level_{}.json", level))
    }
}

#[derive(Deserialize)]
struct LevelLine {
    level: i64,
}

#[derive(Deserialize)]
struct DifficultyLine {
    difficulty: f64,
}

/// Reads the non-blank lines of `path` with their 1-based line numbers.
fn for_each_line(path: &Path, mut f: impl FnMut(usize, &str) -> Result<()>) -> Result<()> {
    let reader = BufReader::new(File::open(path)?);
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        f(index + 1, &line)?;
    }
    Ok(())
}

fn parse_line<T: for<'de> Deserialize<'de>>(path: &Path, line_no: usize, line: &str) -> Result<T> {
    serde_json::from_str(line).map_err(|e| {
        Error::new(
            ErrorKind::Parse,
            format!("{} line {}: {}", path.display(), line_no, e),
        )
    })
}

/// The raw song dataset. Nothing produces it; it either exists or the run cannot start.
pub struct SongsData {
    pub source_path: PathBuf,
}

impl Task for SongsData {
    fn name(&self) -> String {
        "SongsData".to_string()
    }

    fn complete(&self) -> Result<bool> {
        Ok(self.source_path.is_file())
    }

    fn run(&self) -> Result<()> {
        Err(Error::new(
            ErrorKind::FatalPrecondition,
            format!("song dataset {} does not exist", self.source_path.display()),
        ))
    }
}

/// Copies the songs of one level into their own partition file.
///
/// Never complete, so the partition is rewritten on every run. The file is
/// replaced atomically, readers never see it half written.
pub struct SongsByLevel {
    pub ctx: Arc<JobContext>,
    pub level: i64,
}

impl Task for SongsByLevel {
    fn name(&self) -> String {
        format!("SongsByLevel(level={})", self.level)
    }

    fn requires(&self) -> Vec<Box<dyn Task>> {
        vec![Box::new(SongsData {
            source_path: self.ctx.source_path.clone(),
        })]
    }

    fn complete(&self) -> Result<bool> {
        Ok(false)
    }

    fn run(&self) -> Result<()> {
        fs::create_dir_all(&self.ctx.partition_dir)?;
        let mut out = NamedTempFile::new_in(&self.ctx.partition_dir)?;
        let source = &self.ctx.source_path;

        let mut copied = 0usize;
        for_each_line(source, |line_no, line| {
            let parsed: LevelLine = parse_line(source, line_no, line)?;
            if parsed.level == self.level {
                writeln!(out, "{}", line)?;
                copied += 1;
            }
            Ok(())
        })?;

        out.flush()?;
        out.persist(self.ctx.partition_path(self.level))
            .map_err(|e| Error::from(e.error))?;

        info!(level = self.level, songs = copied, "wrote level partition");
        Ok(())
    }
}

/// Sums the difficulties of one level partition into its aggregate record.
pub struct CalculateTotalDifficulty {
    pub ctx: Arc<JobContext>,
    pub level: i64,
}

impl Task for CalculateTotalDifficulty {
    fn name(&self) -> String {
        format!("CalculateTotalDifficulty(level={})", self.level)
    }

    fn requires(&self) -> Vec<Box<dyn Task>> {
        vec![Box::new(SongsByLevel {
            ctx: self.ctx.clone(),
            level: self.level,
        })]
    }

    /// Complete once the level has an aggregate record, however old.
    fn complete(&self) -> Result<bool> {
        if self.ctx.force {
            return Ok(false);
        }
        Ok(self.ctx.totals.find_one(self.level)?.is_some())
    }

    fn run(&self) -> Result<()> {
        let partition = self.ctx.partition_path(self.level);

        let mut running = RunningTotal::default();
        for_each_line(&partition, |line_no, line| {
            let parsed: DifficultyLine = parse_line(&partition, line_no, line)?;
            running.push(parsed.difficulty)
        })?;

        let record = AggregateRecord {
            level: self.level,
            total_difficulty: running.total(),
            number_of_songs: running.count(),
        };
        info!(
            level = record.level,
            total_difficulty = record.total_difficulty,
            number_of_songs = record.number_of_songs,
            "stored level totals"
        );
        self.ctx.totals.upsert(record)
    }
}

use std::collections::BTreeMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::AggregateRecord;
use crate::storage::layout::StorageLayout;
use crate::storage::lock::StoreLock;
use crate::storage::store::{AggregateCursor, AggregateStore};
use crate::storage::wal::{SyncMode, WALTail, WAL};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TotalsOp {
    Upsert(AggregateRecord),
}

/// Per-level difficulty totals written by the aggregation job.
///
/// A handle from [`LevelTotals::open`] owns the journal and is the only one
/// allowed to write. [`LevelTotals::follow`] gives the API a read-only handle
/// that picks up whatever the job has journaled before every read.
pub struct LevelTotals {
    state: RwLock<TotalsState>,
}

struct TotalsState {
    records: BTreeMap<i64, AggregateRecord>,
    journal: Journal,
}

enum Journal {
    Memory,
    Writer { wal: WAL<TotalsOp>, _lock: StoreLock },
    Follower(WALTail<TotalsOp>),
}

impl LevelTotals {
    pub fn in_memory() -> Self {
        LevelTotals::with_journal(Journal::Memory)
    }

    pub fn open(layout: &StorageLayout) -> Result<Self> {
        let lock = StoreLock::acquire(&layout.totals_lock_path())?;
        let path = layout.totals_wal_path();
        // Few writes, each one marks a level complete: sync every one
        let (wal, entries) = WAL::open(&path, SyncMode::Immediate)?;

        let mut state = TotalsState {
            records: BTreeMap::new(),
            journal: Journal::Writer { wal, _lock: lock },
        };
        state.replay(entries.into_iter().map(|e| e.operation));
        info!(path = %path.display(), levels = state.records.len(), "opened level totals");

        Ok(LevelTotals { state: RwLock::new(state) })
    }

    pub fn follow(layout: &StorageLayout) -> Result<Self> {
        let path = layout.totals_wal_path();
        let totals = LevelTotals::with_journal(Journal::Follower(WALTail::new(path.clone())));
        totals.state.write().refresh()?;
        info!(path = %path.display(), levels = totals.len(), "following level totals");
        Ok(totals)
    }

    fn with_journal(journal: Journal) -> Self {
        LevelTotals {
            state: RwLock::new(TotalsState {
                records: BTreeMap::new(),
                journal,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TotalsState {
    fn replay(&mut self, ops: impl IntoIterator<Item = TotalsOp>) {
        for op in ops {
            let TotalsOp::Upsert(record) = op;
            self.records.insert(record.level, record);
        }
    }

    fn refresh(&mut self) -> Result<()> {
        let Journal::Follower(tail) = &mut self.journal else {
            return Ok(());
        };
        let entries = tail.read_new()?;
        if !entries.is_empty() {
            debug!(new_records = entries.len(), "caught up with level totals journal");
            self.replay(entries.into_iter().map(|e| e.operation));
        }
        Ok(())
    }
}

impl AggregateStore for LevelTotals {
    fn find_all(&self) -> Result<AggregateCursor> {
        let mut state = self.state.write();
        state.refresh()?;
        // Snapshot so the cursor does not hold the lock while it is drained
        let snapshot: Vec<AggregateRecord> = state.records.values().cloned().collect();
        Ok(Box::new(snapshot.into_iter()))
    }

    fn find_one(&self, level: i64) -> Result<Option<AggregateRecord>> {
        let mut state = self.state.write();
        state.refresh()?;
        Ok(state.records.get(&level).cloned())
    }

    fn upsert(&self, record: AggregateRecord) -> Result<()> {
        let mut state = self.state.write();
        match &mut state.journal {
            Journal::Memory => {}
            Journal::Writer { wal, .. } => wal.append(TotalsOp::Upsert(record.clone()))?,
            Journal::Follower(_) => {
                return Err(Error::new(
                    ErrorKind::InvalidState,
                    "level totals are read-only here; only the aggregation job writes them",
                ));
            }
        }
        state.records.insert(record.level, record);
        Ok(())
    }
}

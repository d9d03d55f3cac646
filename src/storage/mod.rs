pub mod aggregates;
pub mod collection;
pub mod layout;
pub mod lock;
pub mod store;
pub mod wal;

use std::sync::Arc;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::storage::aggregates::LevelTotals;
use crate::storage::collection::SongCollection;
use crate::storage::layout::StorageLayout;

/// Stores for the HTTP API: the song collection it writes ratings to, and a
/// read-only view of the level totals the aggregation job maintains.
pub fn open_stores(config: &Config) -> Result<(Arc<SongCollection>, Arc<LevelTotals>)> {
    match &config.storage_path {
        Some(path) => {
            let layout = StorageLayout::new(path.clone())?;
            Ok((
                Arc::new(SongCollection::open(&layout)?),
                Arc::new(LevelTotals::follow(&layout)?),
            ))
        }
        None => Ok((open_songs(config)?, open_totals(config)?)),
    }
}

/// The song collection alone, for the importer.
pub fn open_songs(config: &Config) -> Result<Arc<SongCollection>> {
    match &config.storage_path {
        Some(path) => Ok(Arc::new(SongCollection::open(&StorageLayout::new(path.clone())?)?)),
        None => Ok(Arc::new(SongCollection::in_memory())),
    }
}

/// The level totals alone, writable, for the aggregation job.
pub fn open_totals(config: &Config) -> Result<Arc<LevelTotals>> {
    match &config.storage_path {
        Some(path) => Ok(Arc::new(LevelTotals::open(&StorageLayout::new(path.clone())?)?)),
        None => Ok(Arc::new(LevelTotals::in_memory())),
    }
}

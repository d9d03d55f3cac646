use std::path::PathBuf;
use std::fs;
use crate::core::error::Result;

/// Directory structure for data files
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,      // Root directory
    pub wal_dir: PathBuf,       // Collection journals
}

impl StorageLayout {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        let wal_dir = base_dir.join("wal");

        fs::create_dir_all(&wal_dir)?;

        Ok(StorageLayout {
            base_dir,
            wal_dir,
        })
    }

    pub fn songs_wal_path(&self) -> PathBuf {
        self.wal_dir.join("songs.log")
    }

    pub fn totals_wal_path(&self) -> PathBuf {
        self.wal_dir.join("level_totals.log")
    }

    pub fn songs_lock_path(&self) -> PathBuf {
        self.wal_dir.join("songs.lock")
    }

    pub fn totals_lock_path(&self) -> PathBuf {
        self.wal_dir.join("level_totals.lock")
    }
}

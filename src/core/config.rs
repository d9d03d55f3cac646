use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::core::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for the collection journals; `None` keeps everything in memory.
    pub storage_path: Option<PathBuf>,
    pub bind_addr: SocketAddr,

    pub default_page_size: usize,           // `limit` when the request names none
    pub max_page_size: usize,               // larger limits are capped, not rejected

    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub source_path: PathBuf,               // newline-delimited JSON songs
    pub partition_dir: PathBuf,             // songs_by_level_<n>.json land here
    pub workers: usize,                     // 0 = one per CPU
    pub levels: i64,                        // levels 0..levels are aggregated
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_path: Some(PathBuf::from("./data")),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            default_page_size: 10,
            max_page_size: 100,
            batch: BatchConfig::default(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            source_path: PathBuf::from("tests/data/songs.json"),
            partition_dir: PathBuf::from("tmp"),
            workers: 5,
            levels: 20,
        }
    }
}

impl Config {
    /// Configuration kept entirely in memory; used by tests and benches.
    pub fn in_memory() -> Self {
        Config {
            storage_path: None,
            ..Config::default()
        }
    }

    /// Reads a TOML file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.batch.workers, 5);
        assert_eq!(config.batch.levels, 20);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anthology.toml");
        fs::write(
            &path,
            "max_page_size = 50\n\n[batch]\nworkers = 2\nsource_path = \"songs.json\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.batch.workers, 2);
        assert_eq!(config.batch.source_path, PathBuf::from("songs.json"));
        assert_eq!(config.batch.partition_dir, PathBuf::from("tmp"));
    }
}

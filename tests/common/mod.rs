#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use anthology::core::types::{SongId, SongRecord};
use anthology::search::keyset::Page;
use anthology::storage::collection::SongCollection;
use anthology::storage::store::RecordStore;
use anthology::writer::import::import_file;

pub fn dataset_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/songs.json")
}

/// The fourteen songs of `tests/data/songs.json`, ids 1 to 14 in file order.
pub fn catalog(text_index: bool) -> Arc<SongCollection> {
    let collection = Arc::new(SongCollection::in_memory());
    import_file(collection.as_ref(), &dataset_path(), text_index).unwrap();
    collection
}

/// `count` generated songs spread over levels 0..20.
pub fn synthetic_catalog(count: usize) -> Arc<SongCollection> {
    let collection = Arc::new(SongCollection::in_memory());
    for i in 0..count {
        let record = SongRecord {
            title: format!("Exercise {}", i),
            artist: "The Yousicians".to_string(),
            difficulty: (i % 15) as f64 + 0.5,
            level: (i % 20) as i64,
            released: "2016-01-01".to_string(),
        };
        collection.insert(record.into_fields()).unwrap();
    }
    collection
}

pub fn ids(page: &Page) -> Vec<u64> {
    page.items.iter().map(|song| song.id.value()).collect()
}

pub fn token(id: u64) -> String {
    SongId::new(id).to_string()
}

mod common;

use std::fs;
use anthology::core::error::ErrorKind;
use anthology::core::types::SongId;
use anthology::query::ast::Query;
use anthology::query::types::SortOrder;
use anthology::storage::collection::SongCollection;
use anthology::storage::layout::StorageLayout;
use anthology::storage::store::RecordStore;
use anthology::writer::import::import_file;

#[test]
fn import_survives_reopen_with_its_text_index() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(dir.path().to_path_buf()).unwrap();

    {
        let songs = SongCollection::open(&layout).unwrap();
        let report = import_file(&songs, &common::dataset_path(), true).unwrap();
        assert_eq!(report.imported, 14);
        assert!(report.text_index);
        songs.sync().unwrap();
    }

    let songs = SongCollection::open(&layout).unwrap();
    assert_eq!(songs.len(), 14);
    assert!(songs.has_text_index());

    let hits = songs.find(&Query::text(vec!["waki".into()]), SortOrder::Asc, None).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, SongId(11));
}

#[test]
fn reimport_appends_without_reusing_ids() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(dir.path().to_path_buf()).unwrap();

    {
        let songs = SongCollection::open(&layout).unwrap();
        import_file(&songs, &common::dataset_path(), false).unwrap();
    }

    let songs = SongCollection::open(&layout).unwrap();
    import_file(&songs, &common::dataset_path(), false).unwrap();

    let newest = songs.find(&Query::MatchAll, SortOrder::Desc, Some(1)).unwrap();
    assert_eq!(songs.len(), 28);
    assert_eq!(newest[0].id, SongId(28));
}

#[test]
fn malformed_line_fails_the_whole_import() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("songs.json");
    fs::write(
        &source,
        concat!(
            r#"{"artist": "A", "title": "One", "difficulty": 1, "level": 1, "released": "2016-01-01"}"#, "\n",
            "\n",
            r#"{"artist": "B", "title": "Two", "level": 2, "released": "2016-01-02"}"#, "\n",
        ),
    )
    .unwrap();

    let songs = SongCollection::in_memory();
    let err = import_file(&songs, &source, true).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.context.contains("line 3"), "{}", err);
    assert!(songs.is_empty());
    assert!(!songs.has_text_index());
}

#[test]
fn missing_import_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let songs = SongCollection::in_memory();
    let err = import_file(&songs, &dir.path().join("absent.json"), true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

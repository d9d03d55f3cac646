mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use anthology::batch::AggregationJob;
use anthology::core::config::BatchConfig;
use anthology::core::error::ErrorKind;
use anthology::storage::aggregates::LevelTotals;
use anthology::storage::layout::StorageLayout;
use anthology::storage::store::AggregateStore;

fn config(source_path: &Path, partition_dir: &Path) -> BatchConfig {
    BatchConfig {
        source_path: source_path.to_path_buf(),
        partition_dir: partition_dir.to_path_buf(),
        workers: 5,
        levels: 20,
    }
}

#[test]
fn missing_source_aborts_before_any_level() {
    let dir = tempfile::tempdir().unwrap();
    let partitions = dir.path().join("tmp");
    let totals = Arc::new(LevelTotals::in_memory());

    let job = AggregationJob::new(config(&dir.path().join("absent.json"), &partitions), totals.clone());
    let err = job.run().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FatalPrecondition);
    assert!(totals.is_empty());
    assert!(!partitions.exists());
}

#[test]
fn first_run_aggregates_every_level_and_rerun_skips_them() {
    let dir = tempfile::tempdir().unwrap();
    let totals = Arc::new(LevelTotals::in_memory());
    let job = AggregationJob::new(config(&common::dataset_path(), dir.path()), totals.clone());

    let first = job.run().unwrap();
    assert_eq!(first.completed, (0..20).collect::<Vec<i64>>());
    assert!(first.already_complete.is_empty());
    assert!(first.is_success());

    let level_13 = totals.find_one(13).unwrap().unwrap();
    assert_eq!(level_13.number_of_songs, 5);
    assert!((level_13.total_difficulty - 70.48).abs() < 1e-9);
    assert_eq!(totals.find_one(0).unwrap().unwrap().number_of_songs, 0);

    let partition = fs::read_to_string(dir.path().join("songs_by_level_13.json")).unwrap();
    assert_eq!(partition.lines().count(), 5);

    let second = job.run().unwrap();
    assert!(second.completed.is_empty());
    assert_eq!(second.already_complete.len(), 20);
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(totals.find_one(13).unwrap().unwrap(), level_13);
}

#[test]
fn force_recomputes_complete_levels() {
    let dir = tempfile::tempdir().unwrap();
    let totals = Arc::new(LevelTotals::in_memory());
    let cfg = config(&common::dataset_path(), dir.path());

    AggregationJob::new(cfg.clone(), totals.clone()).run().unwrap();
    let forced = AggregationJob::new(cfg, totals).force(true).run().unwrap();
    assert_eq!(forced.completed.len(), 20);
}

#[test]
fn a_broken_level_does_not_block_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("songs.json");
    let mut contents = fs::read_to_string(common::dataset_path()).unwrap();
    contents.push_str(
        r#"{"artist": "Nobody", "title": "Broken", "difficulty": "hard", "level": 7, "released": "2020-01-01"}"#,
    );
    contents.push('\n');
    fs::write(&source, &contents).unwrap();

    let totals = Arc::new(LevelTotals::in_memory());
    let cfg = config(&source, &dir.path().join("tmp"));

    let summary = AggregationJob::new(cfg.clone(), totals.clone()).run().unwrap();
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, 7);
    assert_eq!(summary.completed.len(), 19);
    assert!(totals.find_one(7).unwrap().is_none());
    assert!(summary.to_string().contains("level 7"));

    // Fixing the source lets the next run pick up only the failed level
    fs::write(&source, contents.replace(r#""hard""#, "8.5")).unwrap();
    let retry = AggregationJob::new(cfg, totals.clone()).run().unwrap();
    assert_eq!(retry.completed, [7]);
    assert_eq!(retry.already_complete.len(), 19);
    assert_eq!(totals.find_one(7).unwrap().unwrap().total_difficulty, 8.5);
}

#[test]
fn totals_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(dir.path().join("data")).unwrap();
    let cfg = config(&common::dataset_path(), &dir.path().join("tmp"));

    {
        let totals = Arc::new(LevelTotals::open(&layout).unwrap());
        AggregationJob::new(cfg.clone(), totals).run().unwrap();
    }

    let totals = Arc::new(LevelTotals::open(&layout).unwrap());
    assert_eq!(totals.len(), 20);
    let rerun = AggregationJob::new(cfg, totals).run().unwrap();
    assert_eq!(rerun.already_complete.len(), 20);
}

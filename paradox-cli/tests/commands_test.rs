use std::path::Path;

use paradox_cli::commands::{
    read_data, run_init, run_list, run_subscribers, run_validate, select_items,
};
use paradox_lib::{ItemKind, ItemStatus, JsonFileStore, Snapshot, SnapshotStore};

async fn write_seed_with_inactive(path: &Path) {
    let mut snapshot = Snapshot::seed();
    snapshot.items[0].status = ItemStatus::Inactive;
    JsonFileStore::new(path).save(&snapshot).await.unwrap();
}

fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn init_writes_seed_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");

    let mut out = Vec::new();
    run_init(&path, false, &mut out).await.unwrap();

    assert!(text(out).contains("Created"));
    assert_eq!(read_data(&path).await.unwrap(), Snapshot::seed());
}

#[tokio::test]
async fn init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, "keep me").unwrap();

    let err = run_init(&path, false, &mut Vec::new()).await.unwrap_err();
    assert!(err.to_string().contains("--force"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");

    run_init(&path, true, &mut Vec::new()).await.unwrap();
    assert_eq!(read_data(&path).await.unwrap(), Snapshot::seed());
}

#[tokio::test]
async fn validate_reports_counts_for_a_good_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    write_seed_with_inactive(&path).await;

    let mut out = Vec::new();
    run_validate(&path, &mut out).await.unwrap();
    assert!(text(out).contains("3 items (2 active), 0 subscribers"));
}

#[tokio::test]
async fn validate_fails_on_corrupt_file_and_leaves_it_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, "{ corrupt").unwrap();

    let err = run_validate(&path, &mut Vec::new()).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Parsing"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ corrupt");

    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn commands_fail_on_missing_file_without_creating_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    assert!(run_validate(&path, &mut Vec::new()).await.is_err());
    assert!(run_list(&path, true, None, &mut Vec::new()).await.is_err());
    assert!(run_subscribers(&path, &mut Vec::new()).await.is_err());
    assert!(!path.exists());
}

#[tokio::test]
async fn list_filters_by_status_and_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    write_seed_with_inactive(&path).await;
    let snapshot = read_data(&path).await.unwrap();

    let ids = |items: Vec<&paradox_lib::Item>| -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    };
    assert_eq!(ids(select_items(&snapshot, false, None)), vec!["2", "3"]);
    assert_eq!(ids(select_items(&snapshot, true, None)), vec!["1", "2", "3"]);
    assert_eq!(
        ids(select_items(&snapshot, false, Some(ItemKind::Product))),
        vec!["3"]
    );
    assert!(select_items(&snapshot, false, Some(ItemKind::Art)).is_empty());
    assert_eq!(ids(select_items(&snapshot, true, Some(ItemKind::Art))), vec!["1"]);

    let mut out = Vec::new();
    run_list(&path, true, None, &mut out).await.unwrap();
    let listing = text(out);
    assert_eq!(listing.lines().count(), 3);
    assert!(listing.contains("Nebula's Embrace (299.99) [inactive]"));
    assert!(listing.contains("The Paradox Protocol (free)"));

    let mut out = Vec::new();
    run_list(&path, false, None, &mut out).await.unwrap();
    assert!(!text(out).contains("Nebula"));
}

#[tokio::test]
async fn subscribers_are_printed_one_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let catalog = paradox_lib::Catalog::new(std::sync::Arc::new(JsonFileStore::new(&path)));
    catalog.subscribe("a@paradox.art").await.unwrap();
    catalog.subscribe("b@paradox.art").await.unwrap();

    let mut out = Vec::new();
    run_subscribers(&path, &mut out).await.unwrap();
    let listing = text(out);
    assert_eq!(listing.lines().count(), 2);
    assert!(listing.contains("a@paradox.art"));
}

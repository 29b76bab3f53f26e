use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use paradox_lib::{
    Catalog, Error, ItemKind, ItemPatch, ItemStatus, JsonFileStore, MemoryStore, NewItem,
    Snapshot, SnapshotStore, StoreError,
};

fn empty_catalog() -> Catalog {
    Catalog::new(Arc::new(MemoryStore::with_snapshot(Snapshot::default())))
}

fn art(title: &str) -> NewItem {
    NewItem {
        title: title.to_string(),
        kind: ItemKind::Art,
        content: "c".to_string(),
        price: 0.0,
        image: "u".to_string(),
    }
}

/// Store whose saves always fail; counts attempts.
struct BrokenStore {
    saves: AtomicUsize,
}

#[async_trait]
impl SnapshotStore for BrokenStore {
    async fn load(&self) -> Snapshot {
        Snapshot::seed()
    }

    async fn save(&self, _snapshot: &Snapshot) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }

    fn backend(&self) -> &'static str {
        "broken"
    }
}

#[tokio::test]
async fn create_then_fetch_returns_submitted_fields() {
    let catalog = empty_catalog();
    let created = catalog.create_item(art("X")).await.unwrap();
    let fetched = catalog.item(&created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.title, "X");
    assert_eq!(fetched.kind, ItemKind::Art);
    assert_eq!(fetched.content, "c");
    assert_eq!(fetched.image, "u");
    assert_eq!(fetched.price, 0.0);
    assert_eq!(fetched.status, ItemStatus::Active);
}

#[tokio::test]
async fn deactivated_item_only_in_full_listing() {
    let catalog = empty_catalog();
    let created = catalog.create_item(art("X")).await.unwrap();
    assert_eq!(catalog.active_items().await.len(), 1);

    let patch = ItemPatch {
        status: Some(ItemStatus::Inactive),
        ..Default::default()
    };
    let updated = catalog.update_item(&created.id, patch).await.unwrap();
    assert_eq!(updated.created_at, created.created_at);

    assert!(catalog.active_items().await.is_empty());
    assert_eq!(catalog.all_items().await, vec![updated]);
}

#[tokio::test]
async fn delete_removes_from_listing_and_lookup() {
    let catalog = Catalog::new(Arc::new(MemoryStore::new()));
    let removed = catalog.delete_item("2").await.unwrap();
    assert_eq!(removed.title, "The Paradox Protocol");

    assert!(catalog.all_items().await.iter().all(|i| i.id != "2"));
    assert!(matches!(
        catalog.item("2").await,
        Err(Error::NotFound { entity: "Item" })
    ));
    assert!(matches!(
        catalog.delete_item("2").await,
        Err(Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn subscriber_lifecycle() {
    let catalog = empty_catalog();
    assert!(matches!(
        catalog.subscribe("not-an-email").await,
        Err(Error::Validation(_))
    ));

    let first = catalog.subscribe("a@example.com").await.unwrap();
    assert!(matches!(
        catalog.subscribe("a@example.com").await,
        Err(Error::Conflict(_))
    ));
    assert_eq!(catalog.subscribers().await, vec![first.clone()]);

    catalog.delete_subscriber(&first.id).await.unwrap();
    assert!(catalog.subscribers().await.is_empty());
    assert!(matches!(
        catalog.delete_subscriber(&first.id).await,
        Err(Error::NotFound { entity: "Subscriber" })
    ));
}

#[tokio::test]
async fn concurrent_creates_are_all_kept() {
    let catalog = Arc::new(empty_catalog());
    let mut handles = Vec::new();
    for n in 0..25 {
        let catalog = Arc::clone(&catalog);
        handles.push(tokio::spawn(async move {
            catalog.create_item(art(&format!("item-{}", n))).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let items = catalog.all_items().await;
    assert_eq!(items.len(), 25);
    let mut ids: Vec<_> = items.iter().map(|i| i.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 25);
}

#[tokio::test]
async fn storage_failure_is_reported() {
    let store = Arc::new(BrokenStore {
        saves: AtomicUsize::new(0),
    });
    let catalog = Catalog::new(store.clone());

    assert!(matches!(
        catalog.create_item(art("X")).await,
        Err(Error::Storage(_))
    ));
    assert_eq!(store.saves.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_operations_do_not_save() {
    let store = Arc::new(BrokenStore {
        saves: AtomicUsize::new(0),
    });
    let catalog = Catalog::new(store.clone());

    assert!(catalog.delete_item("missing").await.is_err());
    assert!(catalog.subscribe("nope").await.is_err());
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn file_store_persists_across_catalogs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");

    let created = {
        let catalog = Catalog::new(Arc::new(JsonFileStore::new(&path)));
        catalog.subscribe("keep@example.com").await.unwrap();
        catalog.create_item(art("Persisted")).await.unwrap()
    };

    let reopened = Catalog::new(Arc::new(JsonFileStore::new(&path)));
    let items = reopened.all_items().await;
    assert_eq!(items.len(), 4);
    assert_eq!(items.last(), Some(&created));
    assert_eq!(reopened.subscribers().await[0].email, "keep@example.com");

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["admin"]["username"], "admin");
    assert_eq!(raw["items"][3]["status"], "active");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reads_racing_a_write_on_a_corrupt_file_keep_the_write() {
    let dir = tempfile::tempdir().unwrap();
    for round in 0..200 {
        let path = dir.path().join(format!("data-{}.json", round));
        std::fs::write(&path, "{ corrupt").unwrap();
        let catalog = Catalog::new(Arc::new(JsonFileStore::new(&path)));

        let (created, _, _) = tokio::join!(
            catalog.create_item(art("survivor")),
            catalog.active_items(),
            catalog.subscribers(),
        );
        let created = created.unwrap();

        let on_disk = JsonFileStore::new(&path).read_strict().await.unwrap();
        assert!(
            on_disk.items.iter().any(|i| i.id == created.id),
            "round {}: acknowledged create missing from data file",
            round
        );
    }
}

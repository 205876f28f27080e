use std::time::Duration;
use tempfile::TempDir;
use vhub_database::Database;
use vhub_domain::config::AppConfig;
use vhub_domain::events::ProjectDeleted;
use vhub_domain::pagination::PageRequest;
use vhub_event_bus::EventBus;
use vhub_storage::Storage;
use vhub_versions::{ArtifactSelector, UploadOutcome, Versions, VersionsError};

const PROJECT: &str = "ABCDEFGH";

struct Fixture {
    versions: Versions,
    storage: Storage,
    events: EventBus,
    // Dropped with the fixture, removing the blobs.
    _root: TempDir,
}

async fn fixture(db_name: &str) -> Fixture {
    let database = Database::builder()
        .url("mem://")
        .session("test_ns", db_name)
        .init()
        .await
        .expect("connect to mem://");

    let root = TempDir::new().expect("storage root");
    let storage =
        Storage::builder().root(root.path()).connect().await.expect("connect storage");

    let events = EventBus::new();
    let config = AppConfig::default();

    let slice =
        vhub_versions::init(&config, &database, &storage, &events).expect("init versions");
    let versions =
        slice.state.as_any().downcast_ref::<Versions>().expect("versions slice").clone();

    Fixture { versions, storage, events, _root: root }
}

async fn upload(versions: &Versions, bytes: &[u8]) -> vhub_versions::ArtifactVersion {
    match versions
        .upload(PROJECT, "app.db", "test upload".to_owned(), bytes)
        .await
        .expect("upload")
    {
        UploadOutcome::Created(version) => version,
        UploadOutcome::Duplicate(_) => panic!("unexpected duplicate"),
    }
}

#[tokio::test]
async fn upload_registers_latest_and_detects_duplicates() {
    let fx = fixture("versions_upload").await;

    let first = upload(&fx.versions, b"payload one").await;
    assert!(first.is_latest);
    assert_eq!(first.file_size, 11);
    assert_eq!(first.file_hash.len(), 64);
    assert_eq!(first.storage_key, first.file_hash);

    let second = upload(&fx.versions, b"payload two").await;
    assert!(second.is_latest);

    // The first upload lost the flag to the second.
    let reloaded =
        fx.versions.info(PROJECT, ArtifactSelector::Hash(&first.file_hash)).await.expect("info");
    assert!(!reloaded.is_latest);

    // Same bytes again: rejected with the existing record.
    let outcome = fx
        .versions
        .upload(PROJECT, "app.db", String::new(), b"payload one")
        .await
        .expect("duplicate upload");
    match outcome {
        UploadOutcome::Duplicate(existing) => assert_eq!(existing.id, first.id),
        UploadOutcome::Created(_) => panic!("expected duplicate"),
    }
}

#[tokio::test]
async fn upload_validates_its_input() {
    let fx = fixture("versions_validation").await;

    let err =
        fx.versions.upload(PROJECT, "app.db", String::new(), b"").await.unwrap_err();
    assert!(matches!(err, VersionsError::Validation { .. }));

    let err =
        fx.versions.upload(PROJECT, "  ", String::new(), b"bytes").await.unwrap_err();
    assert!(matches!(err, VersionsError::Validation { .. }));
}

#[tokio::test]
async fn downloads_return_the_original_bytes() {
    let fx = fixture("versions_download").await;

    let old = upload(&fx.versions, b"old payload").await;
    upload(&fx.versions, b"new payload").await;

    let latest =
        fx.versions.download(PROJECT, ArtifactSelector::Latest).await.expect("latest");
    assert_eq!(latest.bytes, b"new payload");
    assert!(latest.version.is_latest);
    assert_eq!(latest.bytes.len() as u64, latest.version.file_size);

    let by_hash = fx
        .versions
        .download(PROJECT, ArtifactSelector::Hash(&old.file_hash))
        .await
        .expect("by hash");
    assert_eq!(by_hash.bytes, b"old payload");

    let err =
        fx.versions.download("ZZZZZZZZ", ArtifactSelector::Latest).await.unwrap_err();
    assert!(matches!(err, VersionsError::NotFound { .. }));
}

#[tokio::test]
async fn listing_is_newest_first() {
    let fx = fixture("versions_listing").await;

    upload(&fx.versions, b"one").await;
    upload(&fx.versions, b"two").await;
    let third = upload(&fx.versions, b"three").await;

    let (page, total) = fx
        .versions
        .list(PROJECT, PageRequest { page: 1, page_size: 2 })
        .await
        .expect("list");
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, third.id);
}

#[tokio::test]
async fn deleting_the_latest_promotes_the_most_recent_survivor() {
    let fx = fixture("versions_promotion").await;

    let oldest = upload(&fx.versions, b"one").await;
    let middle = upload(&fx.versions, b"two").await;
    let latest = upload(&fx.versions, b"three").await;

    fx.versions.delete(&latest.id).await.expect("delete latest");

    let promoted =
        fx.versions.info(PROJECT, ArtifactSelector::Latest).await.expect("promoted");
    assert_eq!(promoted.id, middle.id);

    // The blob went with the record.
    let namespace = fx.storage.namespace(PROJECT).expect("namespace");
    assert!(!namespace.exists(&latest.storage_key).expect("exists check"));
    assert!(namespace.exists(&oldest.storage_key).expect("exists check"));

    // Deleting a non-latest version leaves the flag alone.
    fx.versions.delete(&oldest.id).await.expect("delete oldest");
    let still_latest =
        fx.versions.info(PROJECT, ArtifactSelector::Latest).await.expect("latest");
    assert_eq!(still_latest.id, middle.id);
}

#[tokio::test]
async fn set_latest_moves_the_flag() {
    let fx = fixture("versions_set_latest").await;

    let first = upload(&fx.versions, b"one").await;
    let second = upload(&fx.versions, b"two").await;

    let promoted = fx.versions.set_latest(&first.id).await.expect("set latest");
    assert!(promoted.is_latest);

    let demoted = fx
        .versions
        .info(PROJECT, ArtifactSelector::Hash(&second.file_hash))
        .await
        .expect("info");
    assert!(!demoted.is_latest);

    let err = fx.versions.set_latest("missing_id").await.unwrap_err();
    assert!(matches!(err, VersionsError::NotFound { .. }));
}

#[tokio::test]
async fn project_deletion_purges_records_and_blobs() {
    let fx = fixture("versions_purge").await;

    let version = upload(&fx.versions, b"doomed payload").await;
    let namespace = fx.storage.namespace(PROJECT).expect("namespace");
    assert!(namespace.exists(&version.storage_key).expect("exists check"));

    fx.events
        .publish(ProjectDeleted { project_id: PROJECT.to_owned() })
        .expect("publish deletion");

    // The purge runs on a background task; poll until it lands.
    let mut purged = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let (remaining, _) =
            fx.versions.list(PROJECT, PageRequest::default()).await.expect("list");
        if remaining.is_empty() {
            purged = true;
            break;
        }
    }
    assert!(purged, "expected the deletion event to purge all versions");
    assert!(!namespace.exists(&version.storage_key).expect("exists check"));
}

use camino::{Utf8Path, Utf8PathBuf};
use redb::TableDefinition;
use spectator_core::EndpointSubmission;
use spectator_persistence::{
    DbState, EndpointStore, RedbEndpointStore, StorageError, StorageErrorKind,
};

const META: TableDefinition<&str, &str> = TableDefinition::new("meta");

fn submission(game_id: &str) -> EndpointSubmission {
    EndpointSubmission {
        base_url: "http://spectator-consumer.euw1.lol.pvp.net:80".into(),
        platform_id: "EUW1".into(),
        game_id: game_id.into(),
        encryption_key: "k3y".into(),
    }
}

fn quarantined(root: &Utf8Path) -> Vec<String> {
    std::fs::read_dir(root)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| n.starts_with("endpoints.redb.corrupt."))
        .collect()
}

#[test]
fn garbage_file_is_moved_aside_by_the_insert_that_finds_it() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let db_path = RedbEndpointStore::path_for_root(&root);
    std::fs::write(&db_path, b"half-written endpoints").unwrap();

    let store = RedbEndpointStore::new();
    let err = store.insert_endpoint(&root, &submission("1")).unwrap_err();
    assert!(matches!(err, StorageError::Corrupt));
    assert!(!err.kind().is_refusal());
    assert_eq!(quarantined(&root).len(), 1);
    assert_eq!(store.validate(&root).unwrap(), DbState::Missing);

    // Resubmitting the same game works: nothing of the damaged index survives.
    let record = store.insert_endpoint(&root, &submission("1")).unwrap();
    assert_eq!(store.load_endpoint(&root, &record.id).unwrap(), record);
    assert_eq!(store.validate(&root).unwrap(), DbState::Valid);
}

#[test]
fn foreign_redb_file_is_not_mistaken_for_an_endpoint_store() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let db_path = RedbEndpointStore::path_for_root(&root);

    let db = redb::Database::create(db_path.as_std_path()).unwrap();
    let write_tx = db.begin_write().unwrap();
    {
        let mut meta = write_tx.open_table(META).unwrap();
        meta.insert("format", "some-other-app").unwrap();
        meta.insert("schema_version", "1").unwrap();
    }
    write_tx.commit().unwrap();
    drop(db);

    let store = RedbEndpointStore::new();
    let err = store.insert_endpoint(&root, &submission("2")).unwrap_err();
    assert_eq!(err.kind(), StorageErrorKind::Corrupt);
    assert_eq!(quarantined(&root).len(), 1);

    assert!(store.insert_endpoint(&root, &submission("2")).is_ok());
}

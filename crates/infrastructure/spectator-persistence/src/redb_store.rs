use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};
use spectator_core::{EndpointField, EndpointSubmission};

use crate::api::{DbState, EndpointRecord, CURRENT_SCHEMA, ENDPOINT_STORE_FILENAME};
use crate::codec::{decode_record, encode_record};
use crate::endpoint_key::EndpointKey;
use crate::maintenance::quarantine_corrupt_file;
use crate::{EndpointStore, StorageError};

const META: TableDefinition<&str, &str> = TableDefinition::new("meta");
const ENDPOINTS: TableDefinition<&str, &[u8]> = TableDefinition::new("endpoints");
const ENDPOINT_KEYS: TableDefinition<&[u8], &str> = TableDefinition::new("endpoint_keys");

const META_FORMAT_KEY: &str = "format";
const META_FORMAT_VALUE: &str = "spectator-redb";
const META_SCHEMA_VERSION: &str = "schema_version";
const META_CREATED_AT: &str = "created_at";
const META_LAST_RECORDED_AT: &str = "last_recorded_at";

#[derive(Debug, Default, Clone)]
pub struct RedbEndpointStore;

impl RedbEndpointStore {
    fn is_corrupt_open_error(err: &redb::DatabaseError) -> bool {
        match err {
            redb::DatabaseError::Storage(storage) => match storage {
                redb::StorageError::Corrupted(_) => true,
                redb::StorageError::Io(ioe) => matches!(
                    ioe.kind(),
                    std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
                ),
                _ => false,
            },
            _ => false,
        }
    }

    fn db_cache() -> &'static Mutex<HashMap<Utf8PathBuf, Arc<Database>>> {
        static CACHE: OnceLock<Mutex<HashMap<Utf8PathBuf, Arc<Database>>>> = OnceLock::new();
        CACHE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    pub fn new() -> Self {
        Self
    }

    pub fn path_for_root(root: &Utf8Path) -> Utf8PathBuf {
        root.join(ENDPOINT_STORE_FILENAME)
    }

    fn open_or_create(&self, root: &Utf8Path) -> Result<Arc<Database>, StorageError> {
        let path = Self::path_for_root(root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut cache = Self::db_cache().lock().expect("db cache lock poisoned");
        if let Some(existing) = cache.get(&path) {
            if !path.exists() {
                cache.remove(&path);
            } else {
                return Ok(existing.clone());
            }
        }

        let db = if path.exists() {
            self.open_file(&path)?
        } else {
            Database::create(path.as_std_path())?
        };

        let db = self.checked(db, &path)?;
        cache.insert(path, db.clone());
        Ok(db)
    }

    fn open_existing(&self, root: &Utf8Path) -> Result<Arc<Database>, StorageError> {
        let path = Self::path_for_root(root);
        if !path.exists() {
            return Err(StorageError::Missing);
        }

        let mut cache = Self::db_cache().lock().expect("db cache lock poisoned");
        if let Some(existing) = cache.get(&path) {
            return Ok(existing.clone());
        }

        let db = self.open_file(&path)?;
        let db = self.checked(db, &path)?;
        cache.insert(path, db.clone());
        Ok(db)
    }

    fn open_file(&self, path: &Utf8Path) -> Result<Database, StorageError> {
        match Database::open(path.as_std_path()) {
            Ok(db) => Ok(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => Err(StorageError::DatabaseAlreadyOpen),
            Err(e) if Self::is_corrupt_open_error(&e) => {
                let _ = quarantine_corrupt_file(path);
                Err(StorageError::Corrupt)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn checked(&self, db: Database, path: &Utf8Path) -> Result<Arc<Database>, StorageError> {
        if let Err(e) = self.ensure_schema(&db) {
            drop(db);
            if matches!(e, StorageError::Corrupt) {
                let _ = quarantine_corrupt_file(path);
            }
            return Err(e);
        }
        Ok(Arc::new(db))
    }

    fn ensure_schema(&self, db: &Database) -> Result<(), StorageError> {
        // Create tables and required meta keys on first open.
        let write_tx = db.begin_write()?;
        {
            let mut meta = write_tx.open_table(META)?;
            let format: Option<String> = meta.get(META_FORMAT_KEY)?.map(|g| g.value().to_string());
            if format.is_none() {
                let schema_version = CURRENT_SCHEMA.to_string();
                let created_at = Utc::now().to_rfc3339();
                meta.insert(META_FORMAT_KEY, META_FORMAT_VALUE)?;
                meta.insert(META_SCHEMA_VERSION, schema_version.as_str())?;
                meta.insert(META_CREATED_AT, created_at.as_str())?;
            } else if format.as_deref() != Some(META_FORMAT_VALUE) {
                return Err(StorageError::Corrupt);
            }
        }
        let _ = write_tx.open_table(ENDPOINTS)?;
        let _ = write_tx.open_table(ENDPOINT_KEYS)?;
        write_tx.commit()?;

        let read_tx = db.begin_read()?;
        let meta = read_tx.open_table(META)?;
        let schema_version = meta
            .get(META_SCHEMA_VERSION)?
            .and_then(|g| g.value().parse::<u32>().ok())
            .unwrap_or(0);
        if schema_version == 0 {
            return Err(StorageError::Corrupt);
        }
        if schema_version > CURRENT_SCHEMA {
            return Err(StorageError::NewerSchema {
                found: schema_version,
                supported: CURRENT_SCHEMA,
            });
        }
        if schema_version != CURRENT_SCHEMA {
            return Err(StorageError::Corrupt);
        }
        Ok(())
    }

    /// The store's own admission rule: every field must carry a value.
    fn check_record(submission: &EndpointSubmission) -> Result<(), StorageError> {
        for field in EndpointField::ALL {
            if submission.field(field).trim().is_empty() {
                return Err(StorageError::InvalidRecord(format!("{field} required")));
            }
        }
        Ok(())
    }
}

impl EndpointStore for RedbEndpointStore {
    fn validate(&self, root: &Utf8Path) -> Result<DbState, StorageError> {
        let path = Self::path_for_root(root);
        if !path.exists() {
            return Ok(DbState::Missing);
        }
        {
            let mut cache = Self::db_cache().lock().expect("db cache lock poisoned");
            if cache.contains_key(&path) {
                if !path.exists() {
                    cache.remove(&path);
                    return Ok(DbState::Missing);
                }
                return Ok(DbState::Valid);
            }
        }

        match Database::open(path.as_std_path()) {
            Ok(db) => match self.ensure_schema(&db) {
                Ok(()) => Ok(DbState::Valid),
                Err(StorageError::NewerSchema { found, supported }) => {
                    Ok(DbState::NewerSchema { found, supported })
                }
                Err(StorageError::DatabaseAlreadyOpen) => Ok(DbState::Busy),
                Err(StorageError::Corrupt) => {
                    drop(db);
                    let _ = quarantine_corrupt_file(&path);
                    Ok(DbState::Corrupt)
                }
                Err(e) => Err(e),
            },
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => Ok(DbState::Busy),
            Err(e) if Self::is_corrupt_open_error(&e) => {
                let _ = quarantine_corrupt_file(&path);
                Ok(DbState::Corrupt)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn insert_endpoint(
        &self,
        root: &Utf8Path,
        submission: &EndpointSubmission,
    ) -> Result<EndpointRecord, StorageError> {
        Self::check_record(submission)?;
        let key = EndpointKey::new(&submission.platform_id, &submission.game_id)?.to_bytes();
        let db = self.open_or_create(root)?;

        let record = EndpointRecord {
            id: uuid::Uuid::new_v4().to_string(),
            base_url: submission.base_url.clone(),
            platform_id: submission.platform_id.clone(),
            game_id: submission.game_id.clone(),
            encryption_key: submission.encryption_key.clone(),
            created_at: Utc::now(),
        };
        let bytes = encode_record(&record)?;

        let write_tx = db.begin_write()?;
        let existing: Option<String> = {
            let keys = write_tx.open_table(ENDPOINT_KEYS)?;
            let existing = keys.get(key.as_slice())?.map(|g| g.value().to_string());
            existing
        };
        if let Some(existing_id) = existing {
            write_tx.abort()?;
            tracing::debug!(
                "endpoint {} already holds {}/{}",
                existing_id,
                submission.platform_id,
                submission.game_id
            );
            return Err(StorageError::Duplicate {
                platform_id: submission.platform_id.clone(),
                game_id: submission.game_id.clone(),
            });
        }
        {
            let mut keys = write_tx.open_table(ENDPOINT_KEYS)?;
            keys.insert(key.as_slice(), record.id.as_str())?;

            let mut endpoints = write_tx.open_table(ENDPOINTS)?;
            endpoints.insert(record.id.as_str(), bytes.as_slice())?;

            let ts = record.created_at.to_rfc3339();
            let mut meta = write_tx.open_table(META)?;
            meta.insert(META_LAST_RECORDED_AT, ts.as_str())?;
        }
        write_tx.commit()?;

        tracing::info!(
            "recorded endpoint {} for {}/{} at {}",
            record.id,
            record.platform_id,
            record.game_id,
            record.base_url
        );
        Ok(record)
    }

    fn load_endpoint(&self, root: &Utf8Path, id: &str) -> Result<EndpointRecord, StorageError> {
        let db = self.open_existing(root)?;
        let read_tx = db.begin_read()?;
        let endpoints = read_tx.open_table(ENDPOINTS)?;
        let guard = endpoints
            .get(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        decode_record(guard.value())
    }

    fn find_endpoint(
        &self,
        root: &Utf8Path,
        platform_id: &str,
        game_id: &str,
    ) -> Result<Option<EndpointRecord>, StorageError> {
        let key = EndpointKey::new(platform_id, game_id)?.to_bytes();
        let db = match self.open_existing(root) {
            Ok(db) => db,
            Err(StorageError::Missing) => return Ok(None),
            Err(e) => return Err(e),
        };

        let read_tx = db.begin_read()?;
        let keys = read_tx.open_table(ENDPOINT_KEYS)?;
        let Some(id) = keys.get(key.as_slice())?.map(|g| g.value().to_string()) else {
            return Ok(None);
        };
        let endpoints = read_tx.open_table(ENDPOINTS)?;
        let guard = endpoints
            .get(id.as_str())?
            .ok_or(StorageError::Corrupt)?;
        decode_record(guard.value()).map(Some)
    }
}

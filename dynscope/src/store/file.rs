//! A scope store persisted to a local JSON file

use std::{
    collections::{btree_map::Entry, BTreeMap},
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs::OpenOptions, sync::RwLock};

use super::{upsert, ScopeStore, StoreError, Upserted};
use crate::{Scope, ScopeDefinition, ScopeName, ScopeNameRef};

/// A scope store that keeps its records in a local file
///
/// The whole file is read on every access and rewritten on every write.
/// A missing file holds no records.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the
/// store, so a failed write leaves the previous records in place. Reads
/// and writes through the same store never overlap.
#[derive(Debug)]
pub struct FileScopeStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileScopeStore {
    /// Constructs a new file scope store
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// The file backing the store
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<BTreeMap<ScopeName, Scope>, StoreError> {
        use tokio::io::AsyncReadExt;

        let mut file = match OpenOptions::new().read(true).open(&self.path).await {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };

        let mut data = String::new();
        file.read_to_string(&mut data).await?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let scopes: Vec<Scope> = serde_json::from_str(&data)?;
        let mut records = BTreeMap::new();
        for scope in scopes {
            match records.entry(scope.name().to_owned()) {
                Entry::Occupied(entry) => {
                    return Err(StoreError::DuplicateName(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(scope);
                }
            }
        }

        Ok(records)
    }

    async fn write_records(&self, records: &BTreeMap<ScopeName, Scope>) -> Result<(), StoreError> {
        use tokio::io::AsyncWriteExt;

        let scopes: Vec<&Scope> = records.values().collect();
        let data = serde_json::to_string_pretty(&scopes)?;

        let tmp_path = self.tmp_path();
        let written = async {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&tmp_path)
                .await?;
            file.write_all(data.as_bytes()).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp_path, &self.path).await
        }
        .await;

        if let Err(err) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                tracing::debug!(
                    path = %tmp_path.display(),
                    error = %cleanup,
                    "unable to remove temporary file"
                );
            }
            return Err(err.into());
        }

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl ScopeStore for FileScopeStore {
    async fn update_or_create(&self, definition: &ScopeDefinition) -> Result<Upserted, StoreError> {
        let _guard = self.lock.write().await;

        let mut records = self.read_records().await?;
        let upserted = upsert(&mut records, definition);
        self.write_records(&records).await?;

        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            "persisted scope records"
        );

        Ok(upserted)
    }

    async fn get(&self, name: &ScopeNameRef) -> Result<Option<Scope>, StoreError> {
        let _guard = self.lock.read().await;
        Ok(self.read_records().await?.remove(name))
    }

    async fn all(&self) -> Result<Vec<Scope>, StoreError> {
        let _guard = self.lock.read().await;
        Ok(self.read_records().await?.into_values().collect())
    }
}

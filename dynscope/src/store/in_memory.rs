//! An in-memory scope store

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{upsert, ScopeStore, StoreError, Upserted};
use crate::{Scope, ScopeDefinition, ScopeName, ScopeNameRef};

/// An in-memory scope store
///
/// Records live only as long as the store.
#[derive(Debug, Default)]
pub struct InMemoryScopeStore {
    records: RwLock<BTreeMap<ScopeName, Scope>>,
}

impl InMemoryScopeStore {
    /// Constructs a new, empty in-memory scope store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScopeStore for InMemoryScopeStore {
    async fn update_or_create(&self, definition: &ScopeDefinition) -> Result<Upserted, StoreError> {
        let mut records = self.records.write().await;
        Ok(upsert(&mut records, definition))
    }

    async fn get(&self, name: &ScopeNameRef) -> Result<Option<Scope>, StoreError> {
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn all(&self) -> Result<Vec<Scope>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ScopeName {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn second_write_updates_in_place() {
        let store = InMemoryScopeStore::new();

        let first = store
            .update_or_create(&ScopeDefinition::new(name("read"), "D1"))
            .await
            .unwrap();
        assert!(first.created);

        let second = store
            .update_or_create(&ScopeDefinition::new(name("read"), "D2").default_scope(true))
            .await
            .unwrap();
        assert!(!second.created);

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description(), "D2");
        assert!(all[0].is_default());
    }

    #[tokio::test]
    async fn records_are_ordered_by_name() {
        let store = InMemoryScopeStore::new();
        for n in ["write", "admin", "read"] {
            store
                .update_or_create(&ScopeDefinition::new(name(n), n))
                .await
                .unwrap();
        }

        let names: Vec<_> = store
            .all()
            .await
            .unwrap()
            .iter()
            .map(|s| s.name().as_str().to_owned())
            .collect();
        assert_eq!(names, vec!["admin", "read", "write"]);
    }

    #[tokio::test]
    async fn missing_record_is_none() {
        let store = InMemoryScopeStore::new();
        assert!(store.get(&name("read")).await.unwrap().is_none());
    }
}

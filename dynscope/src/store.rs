//! Scope storage

use std::{collections::BTreeMap, io};

use async_trait::async_trait;
use thiserror::Error;

use crate::{Scope, ScopeDefinition, ScopeName, ScopeNameRef};

pub mod file;
pub mod in_memory;

pub use file::FileScopeStore;
pub use in_memory::InMemoryScopeStore;

/// The result of writing a scope definition to a store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upserted {
    /// The scope as stored after the write
    pub scope: Scope,
    /// Whether the write created a new record
    pub created: bool,
}

/// An error while reading or writing scope records
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage could not be accessed
    #[error("error accessing scope storage")]
    Io(#[from] io::Error),
    /// Stored records could not be encoded or decoded
    #[error("error encoding scope records")]
    Serialization(#[from] serde_json::Error),
    /// Stored records violate the unique scope name constraint
    #[error("more than one scope record is named {0}")]
    DuplicateName(ScopeName),
}

/// A store of scope records, unique by name
#[async_trait]
pub trait ScopeStore: Send + Sync {
    /// Inserts a record for the definition, or updates the existing record
    /// with the same name
    ///
    /// Updating overwrites the description and the default flag. The owning
    /// application is only overwritten when the definition names one.
    async fn update_or_create(&self, definition: &ScopeDefinition) -> Result<Upserted, StoreError>;

    /// Looks up a record by name
    async fn get(&self, name: &ScopeNameRef) -> Result<Option<Scope>, StoreError>;

    /// All records, ordered by name
    async fn all(&self) -> Result<Vec<Scope>, StoreError>;
}

#[async_trait]
impl<T: ScopeStore + ?Sized> ScopeStore for std::sync::Arc<T> {
    async fn update_or_create(&self, definition: &ScopeDefinition) -> Result<Upserted, StoreError> {
        (**self).update_or_create(definition).await
    }

    async fn get(&self, name: &ScopeNameRef) -> Result<Option<Scope>, StoreError> {
        (**self).get(name).await
    }

    async fn all(&self) -> Result<Vec<Scope>, StoreError> {
        (**self).all().await
    }
}

pub(crate) fn upsert(
    records: &mut BTreeMap<ScopeName, Scope>,
    definition: &ScopeDefinition,
) -> Upserted {
    if let Some(existing) = records.get_mut(&definition.name) {
        existing.apply(definition);
        Upserted {
            scope: existing.clone(),
            created: false,
        }
    } else {
        let scope = Scope::from_definition(definition);
        records.insert(definition.name.clone(), scope.clone());
        Upserted {
            scope,
            created: true,
        }
    }
}

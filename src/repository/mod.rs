//! Ownership-scoped access to stored resources.
//!
//! Every query built here carries `owner_id = <principal>` ahead of any
//! caller-supplied condition, and every write of `owner_id` comes from the
//! principal. A row owned by someone else is indistinguishable from a row
//! that does not exist.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::{Row, Storage, StorageError};
use crate::filter::{Fields, Filter, SortDirection};
use crate::models::{
    IntoFields, Patchable, Resource, CREATED_AT_COLUMN, ID_COLUMN, IMMUTABLE_COLUMNS, OWNER_COLUMN,
    UPDATED_AT_COLUMN,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{field}: {name} not found")]
    UnknownReference { field: &'static str, name: &'static str },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to decode {table} row: {source}")]
    Decode {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub struct OwnedRepository<R> {
    storage: Arc<dyn Storage>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> OwnedRepository<R> {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage, _resource: PhantomData }
    }

    fn scope(principal: &Principal) -> Filter {
        Filter::new().eq(OWNER_COLUMN, principal.id())
    }

    fn scope_id(principal: &Principal, id: Uuid) -> Filter {
        Self::scope(principal).eq(ID_COLUMN, id)
    }

    fn decode(row: Row) -> Result<R, RepositoryError> {
        serde_json::from_value(serde_json::Value::Object(row))
            .map_err(|source| RepositoryError::Decode { table: R::TABLE, source })
    }

    /// Drops anything that slipped past the owner predicate.
    fn owned(principal: &Principal, resource: R) -> Option<R> {
        if resource.is_owned_by(principal) {
            Some(resource)
        } else {
            warn!(table = R::TABLE, resource_id = %resource.id(), principal = %principal.id(), "Storage returned a foreign row");
            None
        }
    }

    /// Rows owned by `principal`. `options` may narrow, order and page;
    /// without an explicit order rows come back oldest first. Ties are
    /// broken by id so pages are stable on every backend.
    pub async fn list(&self, principal: &Principal, options: Filter) -> Result<Vec<R>, RepositoryError> {
        let mut filter = Self::scope(principal).merge(options);
        if filter.order().is_empty() {
            filter = filter.order_by(CREATED_AT_COLUMN, SortDirection::Asc);
        }
        if !filter.order().iter().any(|o| o.column == ID_COLUMN) {
            let direction = filter.order().last().map_or(SortDirection::Asc, |o| o.sort);
            filter = filter.order_by(ID_COLUMN, direction);
        }

        let rows = self.storage.select_where(R::TABLE, &filter).await?;
        debug!(table = R::TABLE, principal = %principal.id(), rows = rows.len(), "Listed resources");

        let mut resources = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(resource) = Self::owned(principal, Self::decode(row)?) {
                resources.push(resource);
            }
        }
        Ok(resources)
    }

    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<R, RepositoryError> {
        let filter = Self::scope_id(principal, id).limit(1);
        let row = self
            .storage
            .select_where(R::TABLE, &filter)
            .await?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound(R::NAME))?;

        Self::owned(principal, Self::decode(row)?).ok_or(RepositoryError::NotFound(R::NAME))
    }

    /// Every resource `input` points at must belong to `principal`.
    async fn check_references(&self, principal: &Principal, input: &R::New) -> Result<(), RepositoryError> {
        for reference in R::references(input) {
            let filter = Self::scope_id(principal, reference.id).limit(1);
            if self.storage.select_where(reference.table, &filter).await?.is_empty() {
                debug!(table = R::TABLE, field = reference.field, principal = %principal.id(), "Rejected reference");
                return Err(RepositoryError::UnknownReference { field: reference.field, name: reference.name });
            }
        }
        Ok(())
    }

    pub async fn create(&self, principal: &Principal, input: R::New) -> Result<R, RepositoryError> {
        self.check_references(principal, &input).await?;
        let now = Utc::now();
        let mut fields = input.into_fields();
        for column in IMMUTABLE_COLUMNS {
            fields.remove(column);
        }
        fields.insert(ID_COLUMN, Uuid::new_v4());
        fields.insert(OWNER_COLUMN, principal.id());
        fields.insert(CREATED_AT_COLUMN, now);
        if R::TRACKS_UPDATES {
            fields.insert(UPDATED_AT_COLUMN, now);
        }

        let row = self.storage.insert(R::TABLE, fields).await?;
        let resource = Self::decode(row)?;
        debug!(table = R::TABLE, resource_id = %resource.id(), principal = %principal.id(), "Created resource");
        Ok(resource)
    }

    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), RepositoryError> {
        let removed = self.storage.delete_where(R::TABLE, &Self::scope_id(principal, id)).await?;
        if removed == 0 {
            return Err(RepositoryError::NotFound(R::NAME));
        }
        debug!(table = R::TABLE, resource_id = %id, principal = %principal.id(), "Deleted resource");
        Ok(())
    }
}

impl<R: Patchable> OwnedRepository<R> {
    pub async fn update(&self, principal: &Principal, id: Uuid, patch: R::Patch) -> Result<R, RepositoryError> {
        let mut fields: Fields = patch.into_fields();
        for column in IMMUTABLE_COLUMNS {
            fields.remove(column);
        }
        if R::TRACKS_UPDATES {
            fields.insert(UPDATED_AT_COLUMN, Utc::now());
        }

        let row = self
            .storage
            .update_where(R::TABLE, &Self::scope_id(principal, id), fields)
            .await?
            .ok_or(RepositoryError::NotFound(R::NAME))?;

        let resource = Self::owned(principal, Self::decode(row)?).ok_or(RepositoryError::NotFound(R::NAME))?;
        debug!(table = R::TABLE, resource_id = %id, principal = %principal.id(), "Updated resource");
        Ok(resource)
    }
}

impl<R> Clone for OwnedRepository<R> {
    fn clone(&self) -> Self {
        Self { storage: self.storage.clone(), _resource: PhantomData }
    }
}

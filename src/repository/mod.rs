//! Persistence contract consumed by the resource controllers, plus the bundled backends.

mod memory;
mod postgres;

pub use memory::{InMemoryRepository, Record};
pub use postgres::PgRepository;

use crate::error::RepositoryError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Equality filter: field name to required value.
pub type Filter = BTreeMap<String, Value>;

/// Rows exchanged with the table-driven backends.
pub type JsonRow = Map<String, Value>;

/// Arguments for [`Repository::find_many`]. `None` skip/take means no bound.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindMany {
    pub skip: Option<u64>,
    pub take: Option<u64>,
    pub filter: Filter,
}

impl FindMany {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

/// What a persistence backend must provide for one resource type.
///
/// `None` from `find_unique`, `update` and `delete` means the id does not exist.
/// `count` is optional: backends that implement it must also return `true` from `supports_count`.
#[async_trait]
pub trait Repository: Send + Sync {
    type Entity: Serialize + Send + Sync;
    type CreateDto: Send + 'static;
    type UpdateDto: Send + 'static;

    async fn find_many(&self, args: FindMany) -> Result<Vec<Self::Entity>, RepositoryError>;

    async fn find_unique(&self, id: i64) -> Result<Option<Self::Entity>, RepositoryError>;

    async fn create(&self, data: Self::CreateDto) -> Result<Self::Entity, RepositoryError>;

    async fn update(
        &self,
        id: i64,
        data: Self::UpdateDto,
    ) -> Result<Option<Self::Entity>, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<Option<Self::Entity>, RepositoryError>;

    fn supports_count(&self) -> bool {
        false
    }

    async fn count(&self, _filter: &Filter) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unsupported("count"))
    }
}

/// Object-safe form used by the HTTP layer, shared by every bundled backend.
pub type JsonRepository =
    dyn Repository<Entity = JsonRow, CreateDto = JsonRow, UpdateDto = JsonRow>;

//! In-memory repository for development without a database, and for tests.

use crate::error::RepositoryError;
use crate::repository::{Filter, FindMany, JsonRow, Repository};
use crate::validation::formats::coerce_number;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

/// An entity the in-memory repository can build from a create payload and patch with an update payload.
pub trait Record: Serialize + Clone + Send + Sync + 'static {
    type Create: Send + 'static;
    type Update: Send + 'static;

    fn build(id: i64, data: Self::Create) -> Self;

    fn apply(&mut self, data: Self::Update);
}

impl Record for JsonRow {
    type Create = JsonRow;
    type Update = JsonRow;

    fn build(id: i64, mut data: JsonRow) -> Self {
        data.insert("id".to_string(), Value::from(id));
        data
    }

    fn apply(&mut self, data: JsonRow) {
        for (k, v) in data {
            if k != "id" {
                self.insert(k, v);
            }
        }
    }
}

/// Rows kept in id order behind a `RwLock`; ids are assigned sequentially from 1.
pub struct InMemoryRepository<T: Record> {
    rows: RwLock<BTreeMap<i64, T>>,
    next_id: AtomicI64,
    count_enabled: bool,
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            count_enabled: true,
        }
    }

    /// Same store without the count capability, so callers fall back to a full scan.
    pub fn without_count() -> Self {
        Self {
            count_enabled: false,
            ..Self::new()
        }
    }

    fn poisoned<E: std::fmt::Display>(e: E) -> RepositoryError {
        RepositoryError::Backend(format!("in-memory store lock poisoned: {}", e))
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (coerce_number(a), coerce_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn matches_filter<T: Serialize>(row: &T, filter: &Filter) -> bool {
    if filter.is_empty() {
        return true;
    }
    let Ok(Value::Object(fields)) = serde_json::to_value(row) else {
        return false;
    };
    filter.iter().all(|(k, expected)| {
        fields
            .get(k)
            .map(|actual| loosely_equal(actual, expected))
            .unwrap_or(false)
    })
}

#[async_trait]
impl<T: Record> Repository for InMemoryRepository<T> {
    type Entity = T;
    type CreateDto = T::Create;
    type UpdateDto = T::Update;

    async fn find_many(&self, args: FindMany) -> Result<Vec<T>, RepositoryError> {
        let rows = self.rows.read().map_err(Self::poisoned)?;
        let skip = args.skip.unwrap_or(0) as usize;
        let take = args.take.map(|n| n as usize).unwrap_or(usize::MAX);
        Ok(rows
            .values()
            .filter(|row| matches_filter(*row, &args.filter))
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn find_unique(&self, id: i64) -> Result<Option<T>, RepositoryError> {
        let rows = self.rows.read().map_err(Self::poisoned)?;
        Ok(rows.get(&id).cloned())
    }

    async fn create(&self, data: T::Create) -> Result<T, RepositoryError> {
        let mut rows = self.rows.write().map_err(Self::poisoned)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = T::build(id, data);
        rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, data: T::Update) -> Result<Option<T>, RepositoryError> {
        let mut rows = self.rows.write().map_err(Self::poisoned)?;
        Ok(rows.get_mut(&id).map(|row| {
            row.apply(data);
            row.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<Option<T>, RepositoryError> {
        let mut rows = self.rows.write().map_err(Self::poisoned)?;
        Ok(rows.remove(&id))
    }

    fn supports_count(&self) -> bool {
        self.count_enabled
    }

    async fn count(&self, filter: &Filter) -> Result<u64, RepositoryError> {
        if !self.count_enabled {
            return Err(RepositoryError::Unsupported("count"));
        }
        let rows = self.rows.read().map_err(Self::poisoned)?;
        Ok(rows.values().filter(|row| matches_filter(*row, filter)).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> JsonRow {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let repo = InMemoryRepository::<JsonRow>::new();
        let a = repo.create(row(json!({"name": "Asthma"}))).await.unwrap();
        let b = repo.create(row(json!({"name": "Flu"}))).await.unwrap();
        assert_eq!(a["id"], 1);
        assert_eq!(b["id"], 2);
    }

    #[tokio::test]
    async fn update_merges_and_keeps_id() {
        let repo = InMemoryRepository::<JsonRow>::new();
        repo.create(row(json!({"name": "Asthma", "icdCode": "J45"}))).await.unwrap();
        let updated = repo
            .update(1, row(json!({"id": 99, "name": "Chronic asthma"})))
            .await
            .unwrap()
            .expect("row exists");
        assert_eq!(updated, row(json!({"id": 1, "name": "Chronic asthma", "icdCode": "J45"})));
        assert!(repo.update(7, JsonRow::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_returns_removed_row_once() {
        let repo = InMemoryRepository::<JsonRow>::new();
        repo.create(row(json!({"name": "Cough"}))).await.unwrap();
        assert!(repo.delete(1).await.unwrap().is_some());
        assert!(repo.delete(1).await.unwrap().is_none());
        assert!(repo.find_unique(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn filters_and_windows() {
        let repo = InMemoryRepository::<JsonRow>::new();
        for patient in [1, 2, 1, 1] {
            repo.create(row(json!({"patientId": patient}))).await.unwrap();
        }
        let mut filter = Filter::new();
        filter.insert("patientId".into(), json!(1));
        assert_eq!(repo.count(&filter).await.unwrap(), 3);

        let page = repo
            .find_many(FindMany {
                skip: Some(1),
                take: Some(1),
                filter: filter.clone(),
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["id"], 3);

        filter.insert("patientId".into(), json!("2"));
        assert_eq!(repo.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn count_capability_can_be_disabled() {
        let repo = InMemoryRepository::<JsonRow>::without_count();
        assert!(!repo.supports_count());
        assert!(matches!(
            repo.count(&Filter::new()).await,
            Err(RepositoryError::Unsupported("count"))
        ));
    }
}

//! Child listings such as `/patients/:id/appointments`, built on the generic controller.

use crate::error::AppError;
use crate::repository::{Filter, Repository};
use crate::response::{PaginatedResponse, Reply};
use crate::service::crud::{parse_id, PageQuery, ResourceController};
use serde_json::Value;

pub struct ScopedListing<R: ?Sized> {
    child: ResourceController<R>,
    foreign_key: String,
}

impl<R: ?Sized> Clone for ScopedListing<R> {
    fn clone(&self) -> Self {
        Self {
            child: self.child.clone(),
            foreign_key: self.foreign_key.clone(),
        }
    }
}

impl<R> ScopedListing<R>
where
    R: Repository + ?Sized,
{
    /// `foreign_key` is the child field holding the parent id (e.g. `patientId`).
    pub fn new(child: ResourceController<R>, foreign_key: impl Into<String>) -> Self {
        Self {
            child,
            foreign_key: foreign_key.into(),
        }
    }

    pub async fn list_for(
        &self,
        parent_id: &str,
        query: &PageQuery,
    ) -> Result<Reply<PaginatedResponse<R::Entity>>, AppError> {
        let parent_id = parse_id(parent_id)?;
        let mut filter = Filter::new();
        filter.insert(self.foreign_key.clone(), Value::from(parent_id));
        self.child.list_where(filter, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryRepository, JsonRow};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn lists_children_of_one_parent() {
        let repo = InMemoryRepository::<JsonRow>::new();
        for (patient, reason) in [(1, "checkup"), (2, "fever"), (1, "follow-up")] {
            let data = json!({"patientId": patient, "reason": reason});
            repo.create(data.as_object().cloned().unwrap()).await.unwrap();
        }
        let scoped = ScopedListing::new(
            ResourceController::new("appointments", Arc::new(repo)),
            "patientId",
        );
        let page = scoped
            .list_for("1", &PageQuery::default())
            .await
            .unwrap()
            .body
            .data
            .unwrap();
        let reasons: Vec<_> = page.data.iter().map(|r| r["reason"].clone()).collect();
        assert_eq!(reasons, vec![json!("checkup"), json!("follow-up")]);
        assert_eq!(page.pagination.total, 2);

        assert!(matches!(
            scoped.list_for("zero", &PageQuery::default()).await,
            Err(AppError::InvalidId)
        ));
    }
}

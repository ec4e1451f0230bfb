//! Generic resource controller: list/get/create/update/delete over any [`Repository`].

use crate::error::{AppError, RepositoryError};
use crate::pagination::{
    pagination_window, parse_positive_int, Pagination, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT,
};
use crate::repository::{Filter, FindMany, Repository};
use crate::response::{
    success_created, success_many, success_message, success_one, PaginatedResponse, Reply,
};
use std::collections::HashMap;
use std::sync::Arc;

pub const CREATED_MESSAGE: &str = "resource created successfully";
pub const DELETED_MESSAGE: &str = "resource deleted successfully";

/// Raw `page`/`limit` query values; parsed leniently.
#[derive(Clone, Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    /// Picks `page` and `limit` out of raw query parameters; other keys are ignored.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            page: params.get("page").cloned(),
            limit: params.get("limit").cloned(),
        }
    }

    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
        }
    }
}

/// Ids are positive integers; anything else is a client error.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(AppError::InvalidId)
}

/// Stateless handler set for one resource. The repository is shared, never owned.
pub struct ResourceController<R: ?Sized> {
    name: String,
    repo: Arc<R>,
}

impl<R: ?Sized> Clone for ResourceController<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R> ResourceController<R>
where
    R: Repository + ?Sized,
{
    pub fn new(name: impl Into<String>, repo: Arc<R>) -> Self {
        Self {
            name: name.into(),
            repo,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn list(
        &self,
        query: &PageQuery,
    ) -> Result<Reply<PaginatedResponse<R::Entity>>, AppError> {
        self.list_where(Filter::new(), query).await
    }

    /// Paginated list restricted to rows matching `filter`; the total honours the same filter.
    pub async fn list_where(
        &self,
        filter: Filter,
        query: &PageQuery,
    ) -> Result<Reply<PaginatedResponse<R::Entity>>, AppError> {
        let page = parse_positive_int(query.page.as_deref(), DEFAULT_PAGE);
        let limit = parse_positive_int(query.limit.as_deref(), DEFAULT_LIMIT).min(MAX_LIMIT);
        let window = pagination_window(page, limit);
        let args = FindMany {
            skip: Some(window.skip),
            take: Some(window.take),
            filter: filter.clone(),
        };

        let (rows, total) = tokio::join!(self.repo.find_many(args), self.total(&filter));
        let rows = rows.map_err(|e| self.failure("list", e))?;
        let total = total.map_err(|e| self.failure("count", e))?;

        Ok(success_many(PaginatedResponse::new(
            rows,
            Pagination::new(page, limit, total),
        )))
    }

    async fn total(&self, filter: &Filter) -> Result<u64, RepositoryError> {
        if self.repo.supports_count() {
            return self.repo.count(filter).await;
        }
        tracing::warn!(
            resource = %self.name,
            "repository cannot count; totalling with a full scan"
        );
        let all = self.repo.find_many(FindMany::filtered(filter.clone())).await?;
        Ok(all.len() as u64)
    }

    pub async fn get_one(&self, id: &str) -> Result<Reply<R::Entity>, AppError> {
        let id = parse_id(id)?;
        match self.repo.find_unique(id).await {
            Ok(Some(entity)) => Ok(success_one(entity)),
            Ok(None) => Err(AppError::NotFound),
            Err(e) => Err(self.failure("get", e)),
        }
    }

    pub async fn create(&self, payload: R::CreateDto) -> Result<Reply<R::Entity>, AppError> {
        let entity = self
            .repo
            .create(payload)
            .await
            .map_err(|e| self.failure("create", e))?;
        tracing::info!(resource = %self.name, "created");
        Ok(success_created(entity, CREATED_MESSAGE))
    }

    pub async fn update(
        &self,
        id: &str,
        payload: R::UpdateDto,
    ) -> Result<Reply<R::Entity>, AppError> {
        let id = parse_id(id)?;
        match self.repo.update(id, payload).await {
            Ok(Some(entity)) => Ok(success_one(entity)),
            Ok(None) => Err(AppError::NotFound),
            Err(e) => Err(self.failure("update", e)),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<Reply<()>, AppError> {
        let id = parse_id(id)?;
        match self.repo.delete(id).await {
            Ok(Some(_)) => {
                tracing::info!(resource = %self.name, id, "deleted");
                Ok(success_message(DELETED_MESSAGE))
            }
            Ok(None) => Err(AppError::NotFound),
            Err(e) => Err(self.failure("delete", e)),
        }
    }

    fn failure(&self, operation: &'static str, e: RepositoryError) -> AppError {
        tracing::warn!(resource = %self.name, operation, error = %e, "repository call failed");
        AppError::from(e)
    }
}

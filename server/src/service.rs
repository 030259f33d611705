//! CRUD operations over todo items.
//!
//! # Design
//! `TodoItemService` owns only the pool. Each operation acquires one
//! connection for its whole duration and releases it when the connection
//! guard drops, on success and error paths alike. Steps within an operation
//! run strictly in sequence. No retries.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::ServiceError;
use crate::model::{TodoItem, TodoItemDto};
use crate::patch::{self, PatchOperation};
use crate::repository::{self, StoreError};

#[derive(Debug, Clone)]
pub struct TodoItemService {
    pool: SqlitePool,
}

impl TodoItemService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All items, in store order.
    pub async fn list(&self) -> Result<Vec<TodoItemDto>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let items = repository::list(&mut conn).await?;
        tracing::debug!(count = items.len(), "listed todo items");
        Ok(items.iter().map(TodoItemDto::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<TodoItemDto, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let item = load(&mut conn, id).await?;
        Ok(TodoItemDto::from(&item))
    }

    /// Insert `input` under a fresh id. Any id in `input` is ignored.
    pub async fn create(&self, input: TodoItemDto) -> Result<TodoItemDto, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let item = repository::insert(&mut conn, &input).await?;
        tracing::info!(id = item.id, "created todo item");
        Ok(TodoItemDto::from(&item))
    }

    /// Overwrite `name` and `is_complete` of item `id` with `input`'s.
    pub async fn replace(&self, id: i64, input: TodoItemDto) -> Result<(), ServiceError> {
        if input.id != id {
            return Err(ServiceError::IdMismatch {
                route: id,
                body: input.id,
            });
        }

        let mut conn = self.pool.acquire().await?;
        let mut item = load(&mut conn, id).await?;
        item.apply(&input);
        save(&mut conn, &item).await?;
        tracing::info!(id, "replaced todo item");
        Ok(())
    }

    /// Apply `ops` to the DTO view of item `id` and persist the result.
    ///
    /// Nothing is written when the patch is rejected.
    pub async fn partial_update(
        &self,
        id: i64,
        ops: &[PatchOperation],
    ) -> Result<TodoItemDto, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let mut item = load(&mut conn, id).await?;

        let mut view = TodoItemDto::from(&item);
        patch::apply(&mut view, ops).map_err(|errors| {
            tracing::debug!(id, errors = errors.len(), "rejected patch document");
            ServiceError::Validation(errors)
        })?;

        item.apply(&view);
        let saved = save(&mut conn, &item).await?;
        tracing::info!(id, ops = ops.len(), "patched todo item");
        Ok(TodoItemDto::from(&saved))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let item = load(&mut conn, id).await?;
        remove(&mut conn, &item).await?;
        tracing::info!(id, "deleted todo item");
        Ok(())
    }
}

async fn load(conn: &mut SqliteConnection, id: i64) -> Result<TodoItem, ServiceError> {
    match repository::find(conn, id).await? {
        Some(item) => Ok(item),
        None => {
            tracing::debug!(id, "todo item not found");
            Err(ServiceError::NotFound(id))
        }
    }
}

async fn save(conn: &mut SqliteConnection, item: &TodoItem) -> Result<TodoItem, ServiceError> {
    match repository::update(conn, item).await {
        Ok(saved) => Ok(saved),
        Err(err) => Err(settle(conn, err).await),
    }
}

async fn remove(conn: &mut SqliteConnection, item: &TodoItem) -> Result<(), ServiceError> {
    match repository::delete(conn, item).await {
        Ok(()) => Ok(()),
        Err(err) => Err(settle(conn, err).await),
    }
}

/// Turn a failed write into the error the caller sees. A conflict on a row
/// that no longer exists is a plain `NotFound`.
async fn settle(conn: &mut SqliteConnection, err: StoreError) -> ServiceError {
    let id = match err {
        StoreError::Conflict { id } => id,
        other => return other.into(),
    };
    match repository::exists(conn, id).await {
        Ok(false) => {
            tracing::warn!(id, "todo item vanished during write");
            ServiceError::NotFound(id)
        }
        Ok(true) => ServiceError::Conflict(id),
        Err(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db;

    async fn service() -> TodoItemService {
        let pool = db::open(&DatabaseConfig::in_memory()).await.unwrap();
        TodoItemService::new(pool)
    }

    fn input(name: &str) -> TodoItemDto {
        TodoItemDto {
            id: 0,
            name: Some(name.to_string()),
            is_complete: false,
        }
    }

    #[tokio::test]
    async fn created_items_can_be_fetched() {
        let svc = service().await;
        let created = svc.create(input("buy milk")).await.unwrap();
        assert_eq!(svc.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn deleted_items_are_not_found() {
        let svc = service().await;
        let created = svc.create(input("buy milk")).await.unwrap();
        svc.delete(created.id).await.unwrap();
        assert!(matches!(svc.get(created.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(created.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn replace_rejects_mismatched_id_without_writing() {
        let svc = service().await;
        let created = svc.create(input("buy milk")).await.unwrap();

        let body = TodoItemDto {
            id: created.id + 1,
            name: Some("changed".to_string()),
            is_complete: true,
        };
        let err = svc.replace(created.id, body).await.unwrap_err();
        assert!(matches!(err, ServiceError::IdMismatch { .. }));
        assert_eq!(svc.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn replace_missing_item_is_not_found() {
        let svc = service().await;
        let err = svc.replace(9, TodoItemDto { id: 9, ..input("x") }).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(9)));
    }

    #[tokio::test]
    async fn empty_patch_keeps_fields() {
        let svc = service().await;
        let created = svc.create(input("buy milk")).await.unwrap();
        assert_eq!(svc.partial_update(created.id, &[]).await.unwrap(), created);
    }

    #[tokio::test]
    async fn rejected_patch_is_not_persisted() {
        let svc = service().await;
        let created = svc.create(input("buy milk")).await.unwrap();

        let ops = [
            PatchOperation::replace("/name", "changed"),
            PatchOperation::replace("/isComplete", "yes"),
        ];
        let err = svc.partial_update(created.id, &ops).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn list_reflects_creates_and_deletes() {
        let svc = service().await;
        let mut ids = Vec::new();
        for n in 0..5 {
            ids.push(svc.create(input(&format!("item {n}"))).await.unwrap().id);
        }
        svc.delete(ids[1]).await.unwrap();
        svc.delete(ids[3]).await.unwrap();
        assert_eq!(svc.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn conflict_on_existing_row_is_surfaced() {
        let svc = service().await;
        let mut conn = svc.pool.acquire().await.unwrap();
        let stale = repository::insert(&mut conn, &input("a")).await.unwrap();
        repository::update(&mut conn, &stale).await.unwrap();

        let err = save(&mut conn, &stale).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(id) if id == stale.id));
    }

    #[tokio::test]
    async fn conflict_on_vanished_row_is_not_found() {
        let svc = service().await;
        let mut conn = svc.pool.acquire().await.unwrap();
        let stale = repository::insert(&mut conn, &input("a")).await.unwrap();
        repository::delete(&mut conn, &stale).await.unwrap();

        let err = save(&mut conn, &stale).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(id) if id == stale.id));
    }

    #[tokio::test]
    async fn stale_delete_on_existing_row_is_surfaced() {
        let svc = service().await;
        let mut conn = svc.pool.acquire().await.unwrap();
        let stale = repository::insert(&mut conn, &input("a")).await.unwrap();
        repository::update(&mut conn, &stale).await.unwrap();

        let err = remove(&mut conn, &stale).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(id) if id == stale.id));
        assert!(repository::exists(&mut conn, stale.id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_of_vanished_row_is_not_found() {
        let svc = service().await;
        let mut conn = svc.pool.acquire().await.unwrap();
        let stale = repository::insert(&mut conn, &input("a")).await.unwrap();
        repository::delete(&mut conn, &stale).await.unwrap();

        let err = remove(&mut conn, &stale).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(id) if id == stale.id));
    }
}

//! Queries against `todo_items`.
//!
//! # Design
//! Functions take a `&mut SqliteConnection` so a caller can run a whole
//! operation on one pooled connection. `update` and `delete` are guarded by
//! the `version` the caller read; zero affected rows means the row changed
//! or disappeared in between, reported as `StoreError::Conflict`.

use sqlx::SqliteConnection;
use thiserror::Error;

use crate::model::{TodoItem, TodoItemDto};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("todo item {id} was modified or deleted since it was read")]
    Conflict { id: i64 },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<TodoItem>, StoreError> {
    let items = sqlx::query_as::<_, TodoItem>(
        "SELECT id, name, is_complete, secret, version FROM todo_items ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(items)
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<TodoItem>, StoreError> {
    let item = sqlx::query_as::<_, TodoItem>(
        "SELECT id, name, is_complete, secret, version FROM todo_items WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(item)
}

pub async fn exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, StoreError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todo_items WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

/// Insert a new row. The DTO's `id` is ignored; the store assigns one.
pub async fn insert(conn: &mut SqliteConnection, input: &TodoItemDto) -> Result<TodoItem, StoreError> {
    let done = sqlx::query("INSERT INTO todo_items (name, is_complete) VALUES (?, ?)")
        .bind(input.name.as_deref())
        .bind(input.is_complete)
        .execute(&mut *conn)
        .await?;

    Ok(TodoItem {
        id: done.last_insert_rowid(),
        name: input.name.clone(),
        is_complete: input.is_complete,
        secret: None,
        version: 0,
    })
}

/// Write `name` and `is_complete` back, returning the item with its new version.
pub async fn update(conn: &mut SqliteConnection, item: &TodoItem) -> Result<TodoItem, StoreError> {
    let done = sqlx::query(
        "UPDATE todo_items SET name = ?, is_complete = ?, version = version + 1 \
         WHERE id = ? AND version = ?",
    )
    .bind(item.name.as_deref())
    .bind(item.is_complete)
    .bind(item.id)
    .bind(item.version)
    .execute(&mut *conn)
    .await?;

    if done.rows_affected() == 0 {
        return Err(StoreError::Conflict { id: item.id });
    }
    Ok(TodoItem {
        version: item.version + 1,
        ..item.clone()
    })
}

pub async fn delete(conn: &mut SqliteConnection, item: &TodoItem) -> Result<(), StoreError> {
    let done = sqlx::query("DELETE FROM todo_items WHERE id = ? AND version = ?")
        .bind(item.id)
        .bind(item.version)
        .execute(&mut *conn)
        .await?;

    if done.rows_affected() == 0 {
        return Err(StoreError::Conflict { id: item.id });
    }
    Ok(())
}

//! The persisted todo entity and the DTO it is exposed through.
//!
//! # Design
//! Handlers never serialize `TodoItem` directly. Every response and every
//! request body goes through `TodoItemDto`, which has no `secret` or
//! `version` field, so neither can be read or overposted by a client.
//! Unknown JSON fields are ignored on deserialization.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of `todo_items`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TodoItem {
    pub id: i64,
    pub name: Option<String>,
    pub is_complete: bool,
    /// Internal-only. Never mapped to or from a DTO.
    pub secret: Option<String>,
    /// Optimistic concurrency token, bumped on every write.
    pub version: i64,
}

impl TodoItem {
    /// Copy the client-mutable fields of `dto` onto this entity.
    ///
    /// `id`, `secret` and `version` are left untouched.
    pub fn apply(&mut self, dto: &TodoItemDto) {
        self.name = dto.name.clone();
        self.is_complete = dto.is_complete;
    }
}

/// External representation of a todo item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemDto {
    #[serde(default)]
    pub id: i64,
    pub name: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
}

impl From<&TodoItem> for TodoItemDto {
    fn from(item: &TodoItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            is_complete: item.is_complete,
        }
    }
}

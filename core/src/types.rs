//! Wire DTOs for the todo item API.
//!
//! # Design
//! These mirror the server's JSON schema but are defined independently so
//! the client carries no axum or sqlx dependency. The integration test
//! catches any drift between the two crates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A todo item as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: i64,
    pub name: Option<String>,
    pub is_complete: bool,
}

/// Request payload for creating a todo item. The server assigns the id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodoItem {
    pub name: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
}

/// A created item together with the `Location` the server returned for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub item: TodoItem,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

/// One entry of a patch document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl PatchOperation {
    pub fn replace(path: &str, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.to_string(),
            value: Some(value.into()),
            from: None,
        }
    }

    pub fn add(path: &str, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Add,
            ..Self::replace(path, value)
        }
    }

    pub fn remove(path: &str) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.to_string(),
            value: None,
            from: None,
        }
    }

    pub fn test(path: &str, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Test,
            ..Self::replace(path, value)
        }
    }
}

//! REST service for todo items backed by SQLite.
//!
//! # Overview
//! Six routes under `/api/todoitems` map onto list, get, create, replace,
//! patch and delete. Items are always exposed as `TodoItemDto`; the stored
//! entity carries internal fields that never leave the server.
//!
//! # Design
//! - `handlers` only extract and respond; `service` holds the operation
//!   logic; `repository` holds the SQL.
//! - `patch` is a pure transform over `TodoItemDto` with no I/O.
//! - Writes use an optimistic version check. A conflicting write on a row
//!   that vanished is a 404; on a row that still exists it is a 500.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod model;
pub mod patch;
pub mod repository;
pub mod service;

use std::future::Future;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ServiceError;
pub use model::{TodoItem, TodoItemDto};
pub use patch::{PatchOp, PatchOperation};
pub use service::TodoItemService;

use handlers::*;

pub fn app(service: TodoItemService) -> Router {
    Router::new()
        .route(COLLECTION_PATH, get(list_todo_items).post(create_todo_item))
        .route(
            "/api/todoitems/{id}",
            get(get_todo_item)
                .put(replace_todo_item)
                .patch(patch_todo_item)
                .delete(delete_todo_item),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

pub async fn run(listener: TcpListener, service: TodoItemService) -> Result<(), std::io::Error> {
    run_with_shutdown(listener, service, std::future::pending()).await
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn run_with_shutdown<F>(
    listener: TcpListener,
    service: TodoItemService,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(service))
        .with_graceful_shutdown(shutdown)
        .await
}

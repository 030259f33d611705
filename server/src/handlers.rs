//! Axum handlers for `/api/todoitems`.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::error::ServiceError;
use crate::model::TodoItemDto;
use crate::patch::PatchOperation;
use crate::service::TodoItemService;

pub const COLLECTION_PATH: &str = "/api/todoitems";

pub async fn list_todo_items(
    State(service): State<TodoItemService>,
) -> Result<Json<Vec<TodoItemDto>>, ServiceError> {
    service.list().await.map(Json)
}

pub async fn get_todo_item(
    State(service): State<TodoItemService>,
    Path(id): Path<i64>,
) -> Result<Json<TodoItemDto>, ServiceError> {
    service.get(id).await.map(Json)
}

/// `201 Created` with a `Location` pointing at the new item.
pub async fn create_todo_item(
    State(service): State<TodoItemService>,
    Json(input): Json<TodoItemDto>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = service.create(input).await?;
    let location = format!("{COLLECTION_PATH}/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

pub async fn replace_todo_item(
    State(service): State<TodoItemService>,
    Path(id): Path<i64>,
    Json(input): Json<TodoItemDto>,
) -> Result<StatusCode, ServiceError> {
    service.replace(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn patch_todo_item(
    State(service): State<TodoItemService>,
    Path(id): Path<i64>,
    Json(ops): Json<Vec<PatchOperation>>,
) -> Result<Json<TodoItemDto>, ServiceError> {
    service.partial_update(id, &ops).await.map(Json)
}

pub async fn delete_todo_item(
    State(service): State<TodoItemService>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Stateless HTTP request builder and response parser for the todo item API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Created, NewTodoItem, PatchOperation, TodoItem};

const RESOURCE: &str = "/api/todoitems";

/// Synchronous, stateless client for the todo item API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection(&self) -> String {
        format!("{}{RESOURCE}", self.base_url)
    }

    fn member(&self, id: i64) -> String {
        format!("{}{RESOURCE}/{id}", self.base_url)
    }

    pub fn build_list_todo_items(&self) -> HttpRequest {
        bodiless(HttpMethod::Get, self.collection())
    }

    pub fn build_get_todo_item(&self, id: i64) -> HttpRequest {
        bodiless(HttpMethod::Get, self.member(id))
    }

    pub fn build_create_todo_item(&self, input: &NewTodoItem) -> Result<HttpRequest, ApiError> {
        with_json(HttpMethod::Post, self.collection(), input)
    }

    /// PUT `item` to `/api/todoitems/{id}`. The server rejects the request
    /// with 400 unless `item.id == id`.
    pub fn build_replace_todo_item(&self, id: i64, item: &TodoItem) -> Result<HttpRequest, ApiError> {
        with_json(HttpMethod::Put, self.member(id), item)
    }

    pub fn build_patch_todo_item(
        &self,
        id: i64,
        ops: &[PatchOperation],
    ) -> Result<HttpRequest, ApiError> {
        with_json(HttpMethod::Patch, self.member(id), ops)
    }

    pub fn build_delete_todo_item(&self, id: i64) -> HttpRequest {
        bodiless(HttpMethod::Delete, self.member(id))
    }

    pub fn parse_list_todo_items(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_get_todo_item(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_create_todo_item(&self, response: HttpResponse) -> Result<Created, ApiError> {
        check_status(&response, 201)?;
        let location = response
            .header("location")
            .ok_or(ApiError::MissingLocation)?
            .to_string();
        let item = decode(&response.body)?;
        Ok(Created { item, location })
    }

    pub fn parse_replace_todo_item(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_patch_todo_item(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_delete_todo_item(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }
}

fn bodiless(method: HttpMethod, path: String) -> HttpRequest {
    HttpRequest {
        method,
        path,
        headers: Vec::new(),
        body: None,
    }
}

fn with_json<T: Serialize + ?Sized>(
    method: HttpMethod,
    path: String,
    payload: &T,
) -> Result<HttpRequest, ApiError> {
    let body =
        serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        404 => Err(ApiError::NotFound),
        400 => Err(ApiError::BadRequest {
            body: response.body.clone(),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Deserialize;

use crate::application::todo_service::TodoService;
use crate::domain::query::{Pagination, SortBy, SortType, Sorting};
use crate::domain::todo::{NewTodo, Todo, TodoId};
use crate::http::types::ApiError;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/api/v1/todos", get(list_todos::<S>).post(create_todo::<S>).put(update_todo::<S>))
        .route("/api/v1/todos/:id", get(get_todo::<S>).delete(delete_todo::<S>))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub filter: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    /// Unknown sort values fall back to id ascending.
    fn sorting(&self) -> Sorting {
        Sorting::new(
            self.sort_by.as_deref().and_then(SortBy::from_param).unwrap_or_default(),
            self.sort_type.as_deref().and_then(SortType::from_param).unwrap_or_default(),
        )
    }

    fn pagination(&self) -> Result<Pagination, ApiError> {
        Ok(Pagination::new(
            int_param("page", self.page.as_deref(), DEFAULT_PAGE)?,
            int_param("limit", self.limit.as_deref(), DEFAULT_LIMIT)?,
        ))
    }
}

/// Absent and empty values both take the default.
fn int_param(name: &str, value: Option<&str>, default: i64) -> Result<i64, ApiError> {
    match value {
        None | Some("") => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ApiError::bad_request(format!("invalid {name}: {raw}"))),
    }
}

async fn list_todos<S: TodoService>(
    State(state): State<AppState<S>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let filter = params.filter.as_deref().unwrap_or_default();
    let todos = state.service.list(filter, params.sorting(), params.pagination()?).await?;
    Ok(Json(todos))
}

async fn create_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    Ok(Json(state.service.create(input).await?))
}

async fn get_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.get(id).await?))
}

async fn update_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    payload: Result<Json<Todo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(todo) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    Ok(Json(state.service.update(todo).await?))
}

async fn delete_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(s: &str) -> Result<TodoId, ApiError> { s.parse().map(TodoId).map_err(|_| ApiError::bad_request("invalid id")) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_absent_pagination_values_default() {
        let params = ListParams { page: Some(String::new()), limit: None, ..Default::default() };
        assert_eq!(params.pagination().unwrap(), Pagination::new(DEFAULT_PAGE, DEFAULT_LIMIT));

        let params = ListParams { page: Some("3".into()), limit: Some("0".into()), ..Default::default() };
        assert_eq!(params.pagination().unwrap(), Pagination::new(3, 0));

        let params = ListParams { limit: Some("ten".into()), ..Default::default() };
        assert_eq!(params.pagination().unwrap_err().status, StatusCode::BAD_REQUEST);
    }
}

use std::{num::IntErrorKind, sync::Arc};

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

use crate::{
    db::entities::todo,
    error::AppError,
    response::ApiResult,
    services::{
        ServiceContext,
        todo_service::{NewTodo, TODO_NOT_FOUND, TodoChanges, TodoService},
    },
    state::AppState,
};

const INVALID_BODY_MESSAGE: &str = "Invalid JSON body";
const INVALID_ID_MESSAGE: &str = "Invalid todo id";

#[derive(Debug, Serialize)]
pub struct TodoResponse {
    pub id: i32,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<todo::Model> for TodoResponse {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            completed: model.completed,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(state)
}

async fn list_todos(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<TodoResponse>>> {
    let todos = todo_service_from_state(&state).list().await?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewTodo>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TodoResponse>)> {
    let Json(input) = body.map_err(invalid_body)?;
    let todo = todo_service_from_state(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(todo.into())))
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<TodoResponse>> {
    let id = todo_id(id)?;
    let todo = todo_service_from_state(&state).find(id).await?;
    Ok(Json(todo.into()))
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<TodoChanges>, JsonRejection>,
) -> ApiResult<Json<TodoResponse>> {
    let id = todo_id(id)?;
    let Json(changes) = body.map_err(invalid_body)?;
    let todo = todo_service_from_state(&state).update(id, changes).await?;
    Ok(Json(todo.into()))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = todo_id(id)?;
    todo_service_from_state(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Integers outside the column range can never have been issued, so they are
/// reported as missing rather than malformed.
fn todo_id(path: Result<Path<String>, PathRejection>) -> Result<i32, AppError> {
    let Path(raw) = path.map_err(|_| AppError::bad_request(INVALID_ID_MESSAGE))?;
    raw.parse::<i32>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            AppError::not_found(TODO_NOT_FOUND)
        }
        _ => AppError::bad_request(INVALID_ID_MESSAGE),
    })
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::bad_request(format!("{INVALID_BODY_MESSAGE}: {}", rejection.body_text()))
}

fn todo_service_from_state(state: &AppState) -> TodoService {
    ServiceContext::from_state(state).todo()
}

use serde::Deserialize;
use tracing::info;

use crate::{
    db::{
        dao::{DaoLayerError, TodoDao},
        entities::{TITLE_MAX_LEN, todo},
    },
    error::AppError,
};

pub const TITLE_REQUIRED: &str = "Title is required";
pub const TODO_NOT_FOUND: &str = "Todo not found";

/// Body of a create request. `title` stays optional here so a missing field
/// is reported as a validation error instead of a decoding error.
#[derive(Debug, Default, Deserialize)]
pub struct NewTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Body of an update request; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Clone, Copy)]
enum CrudOp {
    Create,
    Find,
    List,
    Update,
    Delete,
}

impl CrudOp {
    fn as_str(self) -> &'static str {
        match self {
            CrudOp::Create => "create",
            CrudOp::Find => "find",
            CrudOp::List => "list",
            CrudOp::Update => "update",
            CrudOp::Delete => "delete",
        }
    }
}

#[derive(Clone)]
pub struct TodoService {
    todo_dao: TodoDao,
}

impl TodoService {
    pub fn new(todo_dao: TodoDao) -> Self {
        Self { todo_dao }
    }

    pub async fn list(&self) -> Result<Vec<todo::Model>, AppError> {
        let todos = self
            .todo_dao
            .list()
            .await
            .map_err(|err| map_error(CrudOp::List, None, err))?;
        info!(count = todos.len(), "retrieved todos");
        Ok(todos)
    }

    pub async fn create(&self, input: NewTodo) -> Result<todo::Model, AppError> {
        let title = match input.title.as_deref() {
            Some(title) => normalize_title(title)?,
            None => return Err(AppError::bad_request(TITLE_REQUIRED)),
        };
        let todo = self
            .todo_dao
            .create(title, input.completed.unwrap_or(false))
            .await
            .map_err(|err| map_error(CrudOp::Create, None, err))?;
        info!(id = todo.id, title = %todo.title, "created todo");
        Ok(todo)
    }

    pub async fn find(&self, id: i32) -> Result<todo::Model, AppError> {
        self.todo_dao
            .find_by_id(id)
            .await
            .map_err(|err| map_error(CrudOp::Find, Some(id), err))
    }

    pub async fn update(&self, id: i32, changes: TodoChanges) -> Result<todo::Model, AppError> {
        let title = match changes.title.as_deref() {
            Some(title) => Some(normalize_title(title)?.to_string()),
            None => None,
        };
        let todo = self
            .todo_dao
            .update(id, title, changes.completed)
            .await
            .map_err(|err| map_error(CrudOp::Update, Some(id), err))?;
        info!(id, "updated todo");
        Ok(todo)
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        self.todo_dao
            .delete(id)
            .await
            .map_err(|err| map_error(CrudOp::Delete, Some(id), err))?;
        info!(id, "deleted todo");
        Ok(())
    }
}

fn map_error(op: CrudOp, id: Option<i32>, err: DaoLayerError) -> AppError {
    match err {
        DaoLayerError::NotFound { .. } => AppError::not_found(TODO_NOT_FOUND),
        DaoLayerError::Db(db_err) => AppError::internal_with_source(
            "Database error",
            anyhow::Error::new(db_err).context(match id {
                Some(id) => format!("todo {} failed for id {id}", op.as_str()),
                None => format!("todo {} failed", op.as_str()),
            }),
        ),
    }
}

fn normalize_title(title: &str) -> Result<&str, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(TITLE_REQUIRED));
    }
    if trimmed.chars().count() > TITLE_MAX_LEN {
        return Err(AppError::bad_request(format!(
            "Title must be at most {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(trimmed)
}

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, Set,
};

use super::{DaoLayerError, DaoResult};
use crate::db::entities::{prelude::Todo, todo};

const ENTITY: &str = "todo";

#[derive(Clone)]
pub struct TodoDao {
    db: DatabaseConnection,
}

impl TodoDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub async fn create(&self, title: &str, completed: bool) -> DaoResult<todo::Model> {
        let now = Utc::now().fixed_offset();
        let model = todo::ActiveModel {
            title: Set(title.to_string()),
            completed: Set(completed),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    /// All rows, oldest id first.
    pub async fn list(&self) -> DaoResult<Vec<todo::Model>> {
        Ok(Todo::find()
            .order_by_asc(todo::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> DaoResult<todo::Model> {
        Todo::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DaoLayerError::NotFound {
                entity: ENTITY,
                id: id.into(),
            })
    }

    /// Applies only the provided fields; `updated_at` is always refreshed.
    pub async fn update(
        &self,
        id: i32,
        title: Option<String>,
        completed: Option<bool>,
    ) -> DaoResult<todo::Model> {
        let mut active = self.find_by_id(id).await?.into_active_model();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(completed) = completed {
            active.completed = Set(completed);
        }
        active.updated_at = Set(Utc::now().fixed_offset());

        Ok(active.update(&self.db).await?)
    }

    pub async fn delete(&self, id: i32) -> DaoResult<i32> {
        let result = Todo::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFound {
                entity: ENTITY,
                id: id.into(),
            });
        }

        Ok(id)
    }
}

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;

/// Static reference data, seeded by migration.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Level {
    id: String,
    name: String,
    code: Option<String>,
}

impl ResourceTyped for Level {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Level
    }
}

impl Level {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub async fn list(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM levels ORDER BY id")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM levels WHERE id = $1")
            .bind(id)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }
        Ok(Some(result?))
    }
}

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use blossom_db::Database;
use blossom_db::models::CategoryRow;
use blossom_types::api::{CreateCategoryRequest, DeleteResponse, UpdateCategoryRequest};
use blossom_types::models::Category;

use super::{blocking, parse_id, parse_stored_id};
use crate::error::AppError;

#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<Database>,
}

impl CategoryRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Category>, AppError> {
        let rows = blocking(&self.db, |db| db.list_categories()).await?;
        let categories = rows
            .into_iter()
            .map(category_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(categories)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Category, AppError> {
        let category_id = parse_id(id)?;
        self.find(category_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category not found with ID of {id}")))
    }

    /// Existence lookup for callers holding an already-parsed id.
    pub async fn find(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let key = id.to_string();
        let row = blocking(&self.db, move |db| db.get_category(&key)).await?;
        Ok(row.map(category_from_row).transpose()?)
    }

    /// Batch lookup used to populate flower reads.
    pub async fn find_many(&self, ids: Vec<String>) -> Result<Vec<Category>, AppError> {
        let rows = blocking(&self.db, move |db| db.get_categories_by_ids(&ids)).await?;
        let categories = rows
            .into_iter()
            .map(category_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(categories)
    }

    pub async fn create(&self, req: CreateCategoryRequest) -> Result<Category, AppError> {
        let row = CategoryRow {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            description: req.description,
            create_at: None,
        };

        let stored = row.clone();
        blocking(&self.db, move |db| db.insert_category(&stored)).await?;
        debug!("Created category {}", row.id);

        Ok(category_from_row(row)?)
    }

    pub async fn update_by_id(
        &self,
        id: &str,
        req: UpdateCategoryRequest,
    ) -> Result<Category, AppError> {
        let category_id = parse_id(id)?;
        let key = category_id.to_string();
        let mut row = blocking(&self.db, move |db| db.get_category(&key))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category not found with ID of {id}")))?;

        if let Some(name) = req.name {
            row.name = Some(name);
        }
        if let Some(description) = req.description {
            row.description = Some(description);
        }
        if let Some(create_at) = req.create_at {
            row.create_at = Some(create_at);
        }

        let stored = row.clone();
        let changed = blocking(&self.db, move |db| db.update_category(&stored)).await?;
        if changed == 0 {
            return Err(AppError::not_found(format!("Category not found with ID of {id}")));
        }
        debug!("Updated category {}", row.id);

        Ok(category_from_row(row)?)
    }

    /// Removes the category without touching flowers that still reference it.
    pub async fn delete_by_id(&self, id: &str) -> Result<DeleteResponse, AppError> {
        let key = parse_id(id)?.to_string();
        let deleted = blocking(&self.db, move |db| db.delete_category(&key)).await?;
        debug!("Deleted {} category row(s) for {}", deleted, id);

        Ok(DeleteResponse {
            acknowledged: true,
            deleted_count: deleted as u64,
        })
    }
}

pub(crate) fn category_from_row(row: CategoryRow) -> anyhow::Result<Category> {
    Ok(Category {
        id: parse_stored_id(&row.id)?,
        name: row.name,
        description: row.description,
        create_at: row.create_at,
    })
}

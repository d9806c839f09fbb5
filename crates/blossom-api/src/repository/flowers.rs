use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use blossom_db::Database;
use blossom_db::models::{FlowerFilter, FlowerRow};
use blossom_types::api::{CreateFlowerRequest, DeleteResponse, FlowerQuery, UpdateFlowerRequest};
use blossom_types::models::{Category, CategoryRef, Flower};

use super::{
    CategoryRepository, blocking, format_timestamp, next_timestamp, now, parse_id,
    parse_stored_id, parse_timestamp, trimmed,
};
use crate::error::AppError;
use crate::validation::ValidationErrors;

#[derive(Clone)]
pub struct FlowerRepository {
    db: Arc<Database>,
    categories: CategoryRepository,
}

impl FlowerRepository {
    pub fn new(db: Arc<Database>, categories: CategoryRepository) -> Self {
        Self { db, categories }
    }

    /// All flowers matching every supplied filter, with categories populated.
    pub async fn list(&self, query: FlowerQuery) -> Result<Vec<Flower>, AppError> {
        let filter = build_filter(query)?;
        let rows = blocking(&self.db, move |db| db.find_flowers(&filter)).await?;

        let mut category_ids: Vec<String> = rows.iter().map(|r| r.category_id.clone()).collect();
        category_ids.sort();
        category_ids.dedup();

        let categories: HashMap<Uuid, Category> = self
            .categories
            .find_many(category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let flowers = rows
            .into_iter()
            .map(|row| {
                let category_id = parse_stored_id(&row.category_id)?;
                let category = CategoryRef::Populated(categories.get(&category_id).cloned());
                flower_from_row(row, category)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        debug!("Listed {} flower(s)", flowers.len());
        Ok(flowers)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Flower, AppError> {
        let row = self.fetch(id).await?;
        let category_id = parse_stored_id(&row.category_id)?;
        let category = self.categories.find(category_id).await?;

        Ok(flower_from_row(row, CategoryRef::Populated(category))?)
    }

    /// Persist a new flower. The referenced category must already exist; when it
    /// does not, nothing is written.
    pub async fn create(&self, req: CreateFlowerRequest) -> Result<Flower, AppError> {
        let category_id = self.require_category(&req.category_id).await?;

        let draft = Draft {
            name: trimmed(req.name),
            description: trimmed(req.description),
            price: req.price,
            image_url: trimmed(req.image_url),
            stock: req.stock,
            is_featured: req.is_featured,
        };
        let (name, stock) = draft.check()?;

        let timestamp = format_timestamp(now());
        let row = FlowerRow {
            id: Uuid::new_v4().to_string(),
            name,
            description: draft.description,
            price: draft.price,
            category_id: category_id.to_string(),
            image_url: draft.image_url,
            stock,
            is_featured: draft.is_featured,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        };

        let stored = row.clone();
        blocking(&self.db, move |db| db.insert_flower(&stored)).await?;
        debug!("Created flower {} in category {}", row.id, category_id);

        Ok(flower_from_row(row, CategoryRef::Id(category_id))?)
    }

    /// Apply only the supplied fields to an existing flower.
    pub async fn update_by_id(&self, id: &str, req: UpdateFlowerRequest) -> Result<Flower, AppError> {
        let existing = self.fetch(id).await?;

        let category_id = match &req.category_id {
            Some(raw) => self.require_category(raw).await?,
            None => parse_stored_id(&existing.category_id)?,
        };

        let draft = Draft {
            name: match req.name {
                Some(name) => trimmed(Some(name)),
                None => Some(existing.name.clone()),
            },
            description: match req.description {
                Some(description) => trimmed(Some(description)),
                None => existing.description.clone(),
            },
            price: req.price.unwrap_or(existing.price),
            image_url: match req.image_url {
                Some(url) => trimmed(Some(url)),
                None => existing.image_url.clone(),
            },
            stock: req.stock.unwrap_or(existing.stock as f64),
            is_featured: req.is_featured.unwrap_or(existing.is_featured),
        };
        let (name, stock) = draft.check()?;

        let previous = parse_timestamp(&existing.updated_at)?;
        let row = FlowerRow {
            id: existing.id,
            name,
            description: draft.description,
            price: draft.price,
            category_id: category_id.to_string(),
            image_url: draft.image_url,
            stock,
            is_featured: draft.is_featured,
            created_at: existing.created_at,
            updated_at: format_timestamp(next_timestamp(previous)),
        };

        let stored = row.clone();
        let changed = blocking(&self.db, move |db| db.update_flower(&stored)).await?;
        if changed == 0 {
            // Deleted between the read and the write.
            return Err(not_found(id));
        }
        debug!("Updated flower {}", row.id);

        Ok(flower_from_row(row, CategoryRef::Id(category_id))?)
    }

    /// Delete by id without checking existence first.
    pub async fn delete_by_id(&self, id: &str) -> Result<DeleteResponse, AppError> {
        let key = parse_id(id)?.to_string();
        let deleted = blocking(&self.db, move |db| db.delete_flower(&key)).await?;
        debug!("Deleted {} flower row(s) for {}", deleted, id);

        Ok(DeleteResponse {
            acknowledged: true,
            deleted_count: deleted as u64,
        })
    }

    async fn fetch(&self, id: &str) -> Result<FlowerRow, AppError> {
        let key = parse_id(id)?.to_string();
        blocking(&self.db, move |db| db.get_flower(&key))
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn require_category(&self, raw: &str) -> Result<Uuid, AppError> {
        let category_id = parse_id(raw)?;
        match self.categories.find(category_id).await? {
            Some(_) => Ok(category_id),
            None => Err(AppError::not_found(format!(
                "Category not found with ID of {raw}"
            ))),
        }
    }
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("Flower not found with ID of {id}"))
}

/// First value that no longer fits the stored integer column (2^63).
const MAX_STOCK: f64 = 9_223_372_036_854_775_808.0;

/// Field values about to be written, before model-level checks.
struct Draft {
    name: Option<String>,
    description: Option<String>,
    price: f64,
    image_url: Option<String>,
    stock: f64,
    is_featured: bool,
}

impl Draft {
    /// Model-level rules. Returns the name and integral stock when all hold.
    fn check(&self) -> Result<(String, i64), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.name.is_none() {
            errors.push("name", "Flower name is required.");
        }
        if self.price < 0.0 {
            errors.push("price", "Price cannot be negative.");
        }
        if self.stock < 0.0 {
            errors.push("stock", "Stock cannot be negative.");
        } else if self.stock.fract() != 0.0 {
            errors.push("stock", "Stock must be a whole number.");
        } else if self.stock >= MAX_STOCK {
            errors.push("stock", "Stock is too large.");
        }

        errors.into_result()?;
        Ok((self.name.clone().unwrap_or_default(), self.stock as i64))
    }
}

/// Turn raw query-string parameters into typed predicates. Empty values are unset.
pub fn build_filter(query: FlowerQuery) -> Result<FlowerFilter, AppError> {
    fn present(value: Option<String>) -> Option<String> {
        value.filter(|v| !v.is_empty())
    }

    let mut errors = ValidationErrors::default();
    let mut price = |field: &str, raw: Option<String>| -> Option<f64> {
        let raw = present(raw)?;
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                errors.push(field, format!("\"{field}\" must be a number"));
                None
            }
        }
    };
    let min_price = price("minPrice", query.min_price);
    let max_price = price("maxPrice", query.max_price);

    let is_featured = match present(query.is_featured) {
        None => None,
        Some(v) if v.eq_ignore_ascii_case("true") => Some(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Some(false),
        Some(_) => {
            errors.push("isFeatured", "\"isFeatured\" must be a boolean");
            None
        }
    };
    errors.into_result()?;

    let category_id = match present(query.category) {
        Some(raw) => Some(parse_id(&raw)?.to_string()),
        None => None,
    };

    Ok(FlowerFilter {
        category_id,
        search: present(query.search),
        min_price,
        max_price,
        is_featured,
    })
}

fn flower_from_row(row: FlowerRow, category: CategoryRef) -> anyhow::Result<Flower> {
    Ok(Flower {
        id: parse_stored_id(&row.id)?,
        name: row.name,
        description: row.description,
        price: row.price,
        category,
        image_url: row.image_url,
        stock: row.stock,
        is_featured: row.is_featured,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use blossom_types::api::CreateCategoryRequest;

    struct Fixture {
        flowers: FlowerRepository,
        categories: CategoryRepository,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let categories = CategoryRepository::new(db.clone());
        Fixture {
            flowers: FlowerRepository::new(db, categories.clone()),
            categories,
        }
    }

    async fn category(fx: &Fixture, name: &str) -> Category {
        fx.categories
            .create(CreateCategoryRequest {
                name: Some(name.into()),
                description: None,
            })
            .await
            .unwrap()
    }

    fn tulip(category_id: Uuid) -> CreateFlowerRequest {
        CreateFlowerRequest {
            name: Some("  Tulip ".into()),
            description: None,
            price: 12.99,
            category_id: category_id.to_string(),
            image_url: None,
            stock: 20.0,
            is_featured: true,
        }
    }

    #[tokio::test]
    async fn created_flower_is_retrievable_with_category_populated() {
        let fx = fixture();
        let tulips = category(&fx, "Tulips").await;

        let created = fx.flowers.create(tulip(tulips.id)).await.unwrap();
        assert_eq!(created.name, "Tulip");
        assert_eq!(created.category, CategoryRef::Id(tulips.id));
        assert_eq!(created.created_at, created.updated_at);

        let fetched = fx.flowers.get_by_id(&created.id.to_string()).await.unwrap();
        assert_eq!(fetched.category, CategoryRef::Populated(Some(tulips)));
        assert_eq!(fetched.stock, 20);
    }

    #[tokio::test]
    async fn create_with_unknown_category_persists_nothing() {
        let fx = fixture();
        let missing = Uuid::new_v4();

        let err = fx.flowers.create(tulip(missing)).await.unwrap_err();
        assert!(
            matches!(err, AppError::Status { ref message, .. } if *message == format!("Category not found with ID of {missing}"))
        );
        assert!(fx.flowers.list(FlowerQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn model_rules_are_accumulated() {
        let fx = fixture();
        let roses = category(&fx, "Roses").await;

        let mut req = tulip(roses.id);
        req.name = Some("   ".into());
        req.price = -1.0;
        req.stock = 2.5;

        let err = fx.flowers.create(req).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Flower name is required., Price cannot be negative., Stock must be a whole number."
        );
    }

    #[tokio::test]
    async fn oversized_stock_is_rejected_not_clamped() {
        let fx = fixture();
        let roses = category(&fx, "Roses").await;

        let mut req = tulip(roses.id);
        req.stock = 1e30;

        let err = fx.flowers.create(req).await.unwrap_err();
        assert_eq!(err.to_string(), "Stock is too large.");

        let listed = fx.flowers.list(FlowerQuery::default()).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn partial_update_keeps_omitted_fields_and_bumps_updated_at() {
        let fx = fixture();
        let tulips = category(&fx, "Tulips").await;
        let created = fx.flowers.create(tulip(tulips.id)).await.unwrap();
        let id = created.id.to_string();

        let first = fx
            .flowers
            .update_by_id(
                &id,
                UpdateFlowerRequest {
                    price: Some(9.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let second = fx
            .flowers
            .update_by_id(
                &id,
                UpdateFlowerRequest {
                    stock: Some(3.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(second.name, "Tulip");
        assert_eq!(second.price, 9.5);
        assert_eq!(second.stock, 3);
        assert!(second.is_featured);
        assert_eq!(second.created_at, created.created_at);
        assert!(first.updated_at > created.updated_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn update_can_move_flower_to_existing_category_only() {
        let fx = fixture();
        let tulips = category(&fx, "Tulips").await;
        let roses = category(&fx, "Roses").await;
        let created = fx.flowers.create(tulip(tulips.id)).await.unwrap();
        let id = created.id.to_string();

        let moved = fx
            .flowers
            .update_by_id(
                &id,
                UpdateFlowerRequest {
                    category_id: Some(roses.id.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.category, CategoryRef::Id(roses.id));

        let err = fx
            .flowers
            .update_by_id(
                &id,
                UpdateFlowerRequest {
                    category_id: Some(Uuid::new_v4().to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Status { .. }));
    }

    #[tokio::test]
    async fn update_of_missing_flower_creates_nothing() {
        let fx = fixture();
        let missing = Uuid::new_v4().to_string();

        let err = fx
            .flowers
            .update_by_id(&missing, UpdateFlowerRequest::default())
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::Status { ref message, .. } if *message == format!("Flower not found with ID of {missing}"))
        );
        assert!(fx.flowers.list(FlowerQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_survives_a_deleted_category() {
        let fx = fixture();
        let tulips = category(&fx, "Tulips").await;
        fx.flowers.create(tulip(tulips.id)).await.unwrap();
        fx.categories.delete_by_id(&tulips.id.to_string()).await.unwrap();

        let listed = fx.flowers.list(FlowerQuery::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].category, CategoryRef::Populated(None));
    }

    #[test]
    fn filter_parsing_treats_empty_values_as_unset() {
        let filter = build_filter(FlowerQuery {
            category: Some(String::new()),
            search: Some(String::new()),
            min_price: Some("10".into()),
            max_price: Some(String::new()),
            is_featured: Some("false".into()),
        })
        .unwrap();

        assert_eq!(
            filter,
            FlowerFilter {
                min_price: Some(10.0),
                is_featured: Some(false),
                ..Default::default()
            }
        );
    }

    #[test]
    fn filter_parsing_rejects_bad_values() {
        let err = build_filter(FlowerQuery {
            min_price: Some("cheap".into()),
            max_price: Some("NaN".into()),
            is_featured: Some("maybe".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"minPrice\" must be a number, \"maxPrice\" must be a number, \"isFeatured\" must be a boolean"
        );

        let err = build_filter(FlowerQuery {
            category: Some("roses".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidId { value } if value == "roses"));
    }
}

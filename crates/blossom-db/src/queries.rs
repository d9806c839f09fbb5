use crate::Database;
use crate::models::{CategoryRow, FlowerFilter, FlowerRow, UserRow};
use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

const CATEGORY_COLUMNS: &str = "id, name, description, create_at";
const FLOWER_COLUMNS: &str =
    "id, name, description, price, category_id, image_url, stock, is_featured, created_at, updated_at";
const USER_COLUMNS: &str =
    "id, google_id, email, display_name, profile_picture, is_admin, created_at, updated_at";

impl Database {
    // -- Categories --

    pub fn insert_category(&self, category: &CategoryRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO categories (id, name, description, create_at) VALUES (?1, ?2, ?3, ?4)",
                params![category.id, category.name, category.description, category.create_at],
            )?;
            Ok(())
        })
    }

    pub fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_category)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_category(&self, id: &str) -> Result<Option<CategoryRow>> {
        self.with_conn(|conn| query_category(conn, id))
    }

    /// Batch-fetch categories for a set of ids (used to populate flower reads).
    pub fn get_categories_by_ids(&self, ids: &[String]) -> Result<Vec<CategoryRow>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(ids.iter()), map_category)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrites every column of an existing category. Returns rows changed.
    pub fn update_category(&self, category: &CategoryRow) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE categories SET name = ?2, description = ?3, create_at = ?4 WHERE id = ?1",
                params![category.id, category.name, category.description, category.create_at],
            )?;
            Ok(changed)
        })
    }

    pub fn delete_category(&self, id: &str) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM categories WHERE id = ?1", [id])?))
    }

    // -- Flowers --

    pub fn insert_flower(&self, flower: &FlowerRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO flowers (id, name, description, price, category_id, image_url, stock, is_featured, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    flower.id,
                    flower.name,
                    flower.description,
                    flower.price,
                    flower.category_id,
                    flower.image_url,
                    flower.stock,
                    flower.is_featured,
                    flower.created_at,
                    flower.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_flower(&self, id: &str) -> Result<Option<FlowerRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {FLOWER_COLUMNS} FROM flowers WHERE id = ?1");
            let row = conn.query_row(&sql, [id], map_flower).optional()?;
            Ok(row)
        })
    }

    /// Scan flowers in insertion order, keeping only rows that satisfy every
    /// predicate set on `filter`.
    pub fn find_flowers(&self, filter: &FlowerFilter) -> Result<Vec<FlowerRow>> {
        self.with_conn(|conn| {
            let mut clauses: Vec<String> = Vec::new();
            let mut values: Vec<Value> = Vec::new();

            if let Some(category_id) = &filter.category_id {
                values.push(Value::Text(category_id.clone()));
                clauses.push(format!("category_id = ?{}", values.len()));
            }
            if let Some(search) = &filter.search {
                values.push(Value::Text(search.clone()));
                clauses.push(format!("instr(fold_case(name), fold_case(?{})) > 0", values.len()));
            }
            if let Some(min) = filter.min_price {
                values.push(Value::Real(min));
                clauses.push(format!("price >= ?{}", values.len()));
            }
            if let Some(max) = filter.max_price {
                values.push(Value::Real(max));
                clauses.push(format!("price <= ?{}", values.len()));
            }
            if let Some(featured) = filter.is_featured {
                values.push(Value::Integer(featured as i64));
                clauses.push(format!("is_featured = ?{}", values.len()));
            }

            let mut sql = format!("SELECT {FLOWER_COLUMNS} FROM flowers");
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY rowid");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(values.iter()), map_flower)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrites every mutable column of an existing flower. Returns rows changed.
    pub fn update_flower(&self, flower: &FlowerRow) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE flowers
                 SET name = ?2, description = ?3, price = ?4, category_id = ?5, image_url = ?6,
                     stock = ?7, is_featured = ?8, updated_at = ?9
                 WHERE id = ?1",
                params![
                    flower.id,
                    flower.name,
                    flower.description,
                    flower.price,
                    flower.category_id,
                    flower.image_url,
                    flower.stock,
                    flower.is_featured,
                    flower.updated_at,
                ],
            )?;
            Ok(changed)
        })
    }

    pub fn delete_flower(&self, id: &str) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM flowers WHERE id = ?1", [id])?))
    }

    // -- Users --

    pub fn insert_user(&self, user: &UserRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, google_id, email, display_name, profile_picture, is_admin, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    user.id,
                    user.google_id,
                    user.email,
                    user.display_name,
                    user.profile_picture,
                    user.is_admin,
                    user.created_at,
                    user.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_google_id(&self, google_id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "google_id", google_id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_category(conn: &Connection, id: &str) -> Result<Option<CategoryRow>> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1");
    let row = conn.query_row(&sql, [id], map_category).optional()?;
    Ok(row)
}

/// `column` is always a literal from this module, never caller input.
fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let row = conn.query_row(&sql, [value], map_user).optional()?;
    Ok(row)
}

fn map_category(row: &Row<'_>) -> rusqlite::Result<CategoryRow> {
    Ok(CategoryRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        create_at: row.get(3)?,
    })
}

fn map_flower(row: &Row<'_>) -> rusqlite::Result<FlowerRow> {
    Ok(FlowerRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category_id: row.get(4)?,
        image_url: row.get(5)?,
        stock: row.get(6)?,
        is_featured: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        google_id: row.get(1)?,
        email: row.get(2)?,
        display_name: row.get(3)?,
        profile_picture: row.get(4)?,
        is_admin: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str) -> CategoryRow {
        CategoryRow {
            id: id.into(),
            name: Some(name.into()),
            description: None,
            create_at: None,
        }
    }

    fn flower(id: &str, name: &str, price: f64, category_id: &str, featured: bool) -> FlowerRow {
        FlowerRow {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            category_id: category_id.into(),
            image_url: None,
            stock: 10,
            is_featured: featured,
            created_at: "2024-05-01T10:00:00.000000Z".into(),
            updated_at: "2024-05-01T10:00:00.000000Z".into(),
        }
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_category(&category("c1", "Roses")).unwrap();
        db.insert_category(&category("c2", "Tulips")).unwrap();
        db.insert_flower(&flower("f1", "Red Rose", 15.0, "c1", true)).unwrap();
        db.insert_flower(&flower("f2", "rose bush", 40.0, "c1", false)).unwrap();
        db.insert_flower(&flower("f3", "Tulip", 12.99, "c2", true)).unwrap();
        db
    }

    fn ids(rows: &[FlowerRow]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_returns_everything_in_insertion_order() {
        let db = seeded();
        let rows = db.find_flowers(&FlowerFilter::default()).unwrap();
        assert_eq!(ids(&rows), vec!["f1", "f2", "f3"]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let db = seeded();
        let filter = FlowerFilter {
            search: Some("ROSE".into()),
            ..Default::default()
        };
        assert_eq!(ids(&db.find_flowers(&filter).unwrap()), vec!["f1", "f2"]);
    }

    #[test]
    fn search_folds_non_ascii_case() {
        let db = seeded();
        db.insert_flower(&flower("f9", "Édelweiss Étoile", 9.0, "c1", false))
            .unwrap();

        let filter = FlowerFilter {
            search: Some("édelweiss".into()),
            ..Default::default()
        };
        assert_eq!(ids(&db.find_flowers(&filter).unwrap()), vec!["f9"]);
    }

    #[test]
    fn predicates_are_anded() {
        let db = seeded();
        let filter = FlowerFilter {
            category_id: Some("c1".into()),
            min_price: Some(15.0),
            max_price: Some(40.0),
            is_featured: Some(false),
            ..Default::default()
        };
        assert_eq!(ids(&db.find_flowers(&filter).unwrap()), vec!["f2"]);

        let bounds_inclusive = FlowerFilter {
            min_price: Some(12.99),
            max_price: Some(15.0),
            ..Default::default()
        };
        assert_eq!(ids(&db.find_flowers(&bounds_inclusive).unwrap()), vec!["f1", "f3"]);
    }

    #[test]
    fn delete_reports_rows_removed() {
        let db = seeded();
        assert_eq!(db.delete_flower("f1").unwrap(), 1);
        assert_eq!(db.delete_flower("f1").unwrap(), 0);
        assert!(db.get_flower("f1").unwrap().is_none());
    }

    #[test]
    fn deleting_category_keeps_its_flowers() {
        let db = seeded();
        assert_eq!(db.delete_category("c1").unwrap(), 1);
        assert!(db.get_flower("f1").unwrap().is_some());
        assert_eq!(
            db.get_categories_by_ids(&["c1".into(), "c2".into()]).unwrap(),
            vec![category("c2", "Tulips")]
        );
    }

    #[test]
    fn duplicate_category_name_is_a_unique_violation() {
        let db = seeded();
        let err = db.insert_category(&category("c3", "Roses")).unwrap_err();
        let sqlite = err.downcast_ref::<rusqlite::Error>().unwrap();
        assert_eq!(
            sqlite.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        );
    }

    #[test]
    fn users_are_found_by_google_id() {
        let db = Database::open_in_memory().unwrap();
        let user = UserRow {
            id: "u1".into(),
            google_id: Some("g-123".into()),
            email: "ada@example.com".into(),
            display_name: Some("Ada".into()),
            profile_picture: None,
            is_admin: false,
            created_at: "2024-05-01T10:00:00.000000Z".into(),
            updated_at: "2024-05-01T10:00:00.000000Z".into(),
        };
        db.insert_user(&user).unwrap();

        assert_eq!(db.get_user_by_google_id("g-123").unwrap(), Some(user.clone()));
        assert_eq!(db.get_user_by_id("u1").unwrap(), Some(user));
        assert!(db.get_user_by_google_id("g-999").unwrap().is_none());
    }
}

/// Database row types. These map directly to SQLite rows and stay independent
/// of the blossom-types API models.

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub create_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowerRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: String,
    pub image_url: Option<String>,
    pub stock: i64,
    pub is_featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub id: String,
    pub google_id: Option<String>,
    pub email: String,
    pub display_name: Option<String>,
    pub profile_picture: Option<String>,
    pub is_admin: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Typed predicates for a flower scan. Every `None` leaves that column unconstrained;
/// the rest are ANDed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowerFilter {
    pub category_id: Option<String>,
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub is_featured: Option<bool>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[schema(example = "Roses")]
    pub name: Option<String>,
    #[schema(example = "Various types of roses.")]
    pub description: Option<String>,
    /// Legacy free-form field, stored as given.
    pub create_at: Option<String>,
}

/// A flower's category reference. Reads that populate the reference carry the
/// full category (or `null` when it has since been deleted); writes echo the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(Uuid),
    Populated(Option<Category>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Flower {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[schema(example = "Red Rose")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 15.99)]
    pub price: f64,
    pub category: CategoryRef,
    pub image_url: Option<String>,
    #[schema(example = 100)]
    pub stock: i64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user. The Google account id never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[schema(example = "user@example.com")]
    pub email: String,
    pub display_name: Option<String>,
    pub profile_picture: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Orders and wishlists (stored, no endpoints yet) --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub flower: Uuid,
    pub quantity: u32,
    /// Captured when the order is placed so later price edits leave history intact.
    pub price_at_purchase: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Uuid,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    #[serde(default)]
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub order_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Uuid,
    pub flowers: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ref_serializes_as_id_or_document() {
        let id = Uuid::new_v4();
        assert_eq!(
            serde_json::to_value(CategoryRef::Id(id)).unwrap(),
            serde_json::json!(id.to_string())
        );

        let populated = CategoryRef::Populated(Some(Category {
            id,
            name: Some("Roses".into()),
            description: None,
            create_at: None,
        }));
        let value = serde_json::to_value(&populated).unwrap();
        assert_eq!(value["_id"], serde_json::json!(id.to_string()));
        assert_eq!(value["name"], "Roses");

        let dangling = serde_json::to_value(CategoryRef::Populated(None)).unwrap();
        assert!(dangling.is_null());
    }

    #[test]
    fn order_status_defaults_to_pending() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": Uuid::new_v4(),
            "user": Uuid::new_v4(),
            "items": [{ "flower": Uuid::new_v4(), "quantity": 2, "priceAtPurchase": 15.99 }],
            "totalAmount": 31.98,
            "shippingAddress": {
                "street": "123 Flower St",
                "city": "Bloomtown",
                "state": "CA",
                "zipCode": "90210",
                "country": "USA"
            },
            "orderDate": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items[0].price_at_purchase, 15.99);
        assert_eq!(
            serde_json::to_value(OrderStatus::Cancelled).unwrap(),
            serde_json::json!("cancelled")
        );
    }
}

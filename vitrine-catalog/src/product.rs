use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product. The pricing core only reads `price_cents`; the rest is
/// carried for admin listings and quick-view payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Base price in minor currency units. Never negative.
    pub price_cents: i64,
    pub stock: i32,
    pub category: String,
    pub is_active: bool,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: String,
        description: Option<String>,
        price_cents: i64,
        stock: i32,
        category: String,
        metadata: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            price_cents,
            stock,
            category,
            is_active: true,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

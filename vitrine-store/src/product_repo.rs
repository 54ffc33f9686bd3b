use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vitrine_catalog::Product;
use vitrine_core::repository::{ProductRepository, RepoError};

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price_cents: i64,
    stock: i32,
    category: String,
    is_active: bool,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            stock: row.stock,
            category: row.category,
            is_active: row.is_active,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price_cents, stock, category, is_active, metadata, created_at, updated_at";

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create_product(&self, product: &Product) -> Result<Uuid, RepoError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price_cents, stock, category, is_active, metadata, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.category)
        .bind(product.is_active)
        .bind(&product.metadata)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.id)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, RepoError> {
        let rows: Vec<ProductRow> = if let Some(category) = category {
            sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {} FROM products WHERE category = $1 ORDER BY name",
                PRODUCT_COLUMNS
            ))
            .bind(category)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {} FROM products ORDER BY name",
                PRODUCT_COLUMNS
            ))
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update_product(&self, id: Uuid, product: &Product) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE products
            SET name = $1, description = $2, price_cents = $3, stock = $4, category = $5,
                is_active = $6, metadata = $7, updated_at = NOW()
            WHERE id = $8
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.category)
        .bind(product.is_active)
        .bind(&product.metadata)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

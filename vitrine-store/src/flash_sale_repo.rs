use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use vitrine_catalog::{DiscountType, FlashSale, FlashSaleProduct};
use vitrine_core::repository::{FlashSaleRepository, LiveEntry, RepoError};

pub struct PgFlashSaleRepository {
    pool: PgPool,
}

impl PgFlashSaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_entries(
        &self,
        sale_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<FlashSaleProduct>>, RepoError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT sale_id, product_id, discount_type, discount_value, max_per_customer
            FROM flash_sale_products
            WHERE sale_id = ANY($1)
            ORDER BY sale_id, position
            "#,
        )
        .bind(sale_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_sale: HashMap<Uuid, Vec<FlashSaleProduct>> = HashMap::new();
        for row in rows {
            let sale_id = row.sale_id;
            match row.into_entry() {
                Some(entry) => by_sale.entry(sale_id).or_default().push(entry),
                None => warn!(sale_id = %sale_id, "skipping flash sale entry with malformed discount type"),
            }
        }
        Ok(by_sale)
    }
}

#[derive(sqlx::FromRow)]
struct SaleRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self, products: Vec<FlashSaleProduct>) -> FlashSale {
        FlashSale {
            id: self.id,
            name: self.name,
            description: self.description,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            is_active: self.is_active,
            products,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    sale_id: Uuid,
    product_id: Uuid,
    discount_type: String,
    discount_value: f64,
    max_per_customer: Option<i32>,
}

impl EntryRow {
    // Rows with an unknown discount type are treated as "no discount" rather
    // than failing the read.
    fn into_entry(self) -> Option<FlashSaleProduct> {
        let discount_type = DiscountType::parse(&self.discount_type)?;
        Some(FlashSaleProduct {
            product_id: self.product_id,
            discount_type,
            discount_value: self.discount_value,
            max_per_customer: self.max_per_customer,
        })
    }
}

const SALE_COLUMNS: &str = "id, name, description, starts_at, ends_at, is_active, created_at";

#[async_trait]
impl FlashSaleRepository for PgFlashSaleRepository {
    async fn create_sale(&self, sale: &FlashSale) -> Result<Uuid, RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO flash_sales (id, name, description, starts_at, ends_at, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(sale.id)
        .bind(&sale.name)
        .bind(&sale.description)
        .bind(sale.starts_at)
        .bind(sale.ends_at)
        .bind(sale.is_active)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, entry) in sale.products.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO flash_sale_products (sale_id, product_id, discount_type, discount_value, max_per_customer, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(sale.id)
            .bind(entry.product_id)
            .bind(entry.discount_type.as_str())
            .bind(entry.discount_value)
            .bind(entry.max_per_customer)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(sale.id)
    }

    async fn get_sale(&self, id: Uuid) -> Result<Option<FlashSale>, RepoError> {
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM flash_sales WHERE id = $1",
            SALE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut entries = self.load_entries(&[id]).await?;
        Ok(Some(row.into_sale(entries.remove(&id).unwrap_or_default())))
    }

    async fn list_sales(&self) -> Result<Vec<FlashSale>, RepoError> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM flash_sales ORDER BY created_at DESC",
            SALE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut entries = self.load_entries(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let products = entries.remove(&row.id).unwrap_or_default();
                row.into_sale(products)
            })
            .collect())
    }

    async fn update_sale(&self, id: Uuid, sale: &FlashSale) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE flash_sales
            SET name = $1, description = $2, starts_at = $3, ends_at = $4, is_active = $5
            WHERE id = $6
            "#,
        )
        .bind(&sale.name)
        .bind(&sale.description)
        .bind(sale.starts_at)
        .bind(sale.ends_at)
        .bind(sale.is_active)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // Entries are replaced wholesale; the admin form always submits the
        // full product list.
        sqlx::query("DELETE FROM flash_sale_products WHERE sale_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for (position, entry) in sale.products.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO flash_sale_products (sale_id, product_id, discount_type, discount_value, max_per_customer, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id)
            .bind(entry.product_id)
            .bind(entry.discount_type.as_str())
            .bind(entry.discount_value)
            .bind(entry.max_per_customer)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_sale(&self, id: Uuid) -> Result<(), RepoError> {
        // flash_sale_products rows go with it via ON DELETE CASCADE
        sqlx::query("DELETE FROM flash_sales WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<FlashSale>, RepoError> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM flash_sales WHERE is_active AND starts_at <= $1 AND ends_at >= $1 ORDER BY starts_at, id",
            SALE_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut entries = self.load_entries(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let products = entries.remove(&row.id).unwrap_or_default();
                row.into_sale(products)
            })
            .collect())
    }

    async fn find_live_entry(
        &self,
        product_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<LiveEntry>, RepoError> {
        // Same tie-break as vitrine_core::select_live_entry: earliest
        // starts_at, then smallest sale id.
        let row = sqlx::query_as::<_, LiveEntryRow>(
            r#"
            SELECT s.id AS sale_id, s.ends_at, p.product_id, p.discount_type, p.discount_value, p.max_per_customer
            FROM flash_sale_products p
            JOIN flash_sales s ON s.id = p.sale_id
            WHERE p.product_id = $1 AND s.is_active AND s.starts_at <= $2 AND s.ends_at >= $2
            ORDER BY s.starts_at ASC, s.id ASC
            LIMIT 1
            "#,
        )
        .bind(product_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Some(discount_type) = DiscountType::parse(&row.discount_type) else {
            warn!(
                sale_id = %row.sale_id,
                product_id = %row.product_id,
                discount_type = %row.discount_type,
                "live flash sale entry has malformed discount type, treating as no discount"
            );
            return Ok(None);
        };

        Ok(Some(LiveEntry {
            sale_id: row.sale_id,
            ends_at: row.ends_at,
            entry: FlashSaleProduct {
                product_id: row.product_id,
                discount_type,
                discount_value: row.discount_value,
                max_per_customer: row.max_per_customer,
            },
        }))
    }
}

#[derive(sqlx::FromRow)]
struct LiveEntryRow {
    sale_id: Uuid,
    ends_at: DateTime<Utc>,
    product_id: Uuid,
    discount_type: String,
    discount_value: f64,
    max_per_customer: Option<i32>,
}

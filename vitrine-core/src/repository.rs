use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use vitrine_catalog::{FlashSale, FlashSaleProduct, Product};
use vitrine_shared::models::events::ProductViewedEvent;

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// A live flash-sale entry for one product, with enough of the parent sale
/// attached to build a price quote.
#[derive(Debug, Clone)]
pub struct LiveEntry {
    pub sale_id: Uuid,
    pub entry: FlashSaleProduct,
    pub ends_at: DateTime<Utc>,
}

/// Repository trait for product catalog access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(&self, product: &Product) -> Result<Uuid, RepoError>;

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError>;

    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, RepoError>;

    async fn update_product(&self, id: Uuid, product: &Product) -> Result<(), RepoError>;

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Repository trait for flash sale access
#[async_trait]
pub trait FlashSaleRepository: Send + Sync {
    async fn create_sale(&self, sale: &FlashSale) -> Result<Uuid, RepoError>;

    async fn get_sale(&self, id: Uuid) -> Result<Option<FlashSale>, RepoError>;

    async fn list_sales(&self) -> Result<Vec<FlashSale>, RepoError>;

    async fn update_sale(&self, id: Uuid, sale: &FlashSale) -> Result<(), RepoError>;

    async fn delete_sale(&self, id: Uuid) -> Result<(), RepoError>;

    /// Sales that are live at `now`, ordered by start time.
    async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<FlashSale>, RepoError>;

    /// The live entry for this product, if any, after tie-breaking.
    async fn find_live_entry(
        &self,
        product_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<LiveEntry>, RepoError>;
}

/// Product view analytics, decoupled from pricing.
#[async_trait]
pub trait ViewCounter: Send + Sync {
    /// Records one view and returns the new total.
    async fn record_view(&self, event: &ProductViewedEvent) -> Result<u64, RepoError>;

    async fn view_count(&self, product_id: Uuid) -> Result<u64, RepoError>;
}

/// Tie-break shared by every `FlashSaleRepository` implementation: among live
/// sales containing the product, the earliest `starts_at` wins, then the
/// smallest sale id.
pub fn select_live_entry(
    sales: &[FlashSale],
    product_id: Uuid,
    now: DateTime<Utc>,
) -> Option<LiveEntry> {
    sales
        .iter()
        .filter(|sale| sale.is_live_at(now))
        .filter_map(|sale| sale.entry_for(product_id).map(|entry| (sale, entry)))
        .min_by_key(|(sale, _)| (sale.starts_at, sale.id))
        .map(|(sale, entry)| LiveEntry {
            sale_id: sale.id,
            entry: entry.clone(),
            ends_at: sale.ends_at,
        })
}

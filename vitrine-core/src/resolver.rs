use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use vitrine_catalog::{Clock, FlashSale, LineQuote, PriceQuote, Product, SaleSummary};

use crate::repository::{FlashSaleRepository, LiveEntry, ProductRepository, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    #[error("pricing store error: {0}")]
    Repository(RepoError),
}

/// Pricing for one entry of a flash-sale listing.
#[derive(Debug, Clone, Serialize)]
pub struct SalePricing {
    pub product_id: Uuid,
    pub name: String,
    pub max_per_customer: Option<i32>,
    #[serde(flatten)]
    pub quote: PriceQuote,
}

/// One live sale with every entry priced, for the listing page.
#[derive(Debug, Clone, Serialize)]
pub struct PricedSale {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub entries: Vec<SalePricing>,
}

/// Resolves a product's effective price: base price from the catalog, then
/// the live flash-sale discount if one applies.
///
/// A missing product is fatal and propagated; a failing flash-sale lookup is
/// not — the sale is a bonus, so those paths degrade to the base price.
pub struct PricingResolver {
    products: Arc<dyn ProductRepository>,
    sales: Arc<dyn FlashSaleRepository>,
    clock: Arc<dyn Clock>,
}

impl PricingResolver {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        sales: Arc<dyn FlashSaleRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            products,
            sales,
            clock,
        }
    }

    /// Current effective price for one product.
    pub async fn get_product_price(&self, product_id: Uuid) -> Result<PriceQuote, PricingError> {
        let product = self.fetch_product(product_id).await?;
        let live = self.live_entry(product_id).await;
        Ok(quote_from(&product, live))
    }

    /// Quote for an already-fetched product, saving a second catalog read.
    pub async fn quote_for_product(&self, product: &Product) -> PriceQuote {
        let live = self.live_entry(product.id).await;
        quote_from(product, live)
    }

    /// Live quote for `quantity` units of one product. Cart totals are
    /// recomputed from current sale state on every call, never from an
    /// add-to-cart snapshot.
    pub async fn price_line(
        &self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<LineQuote, PricingError> {
        if quantity < 1 {
            return Err(PricingError::InvalidQuantity(quantity));
        }
        let product = self.fetch_product(product_id).await?;
        let live = self.live_entry(product_id).await;
        let max_per_customer = live.as_ref().and_then(|l| l.entry.max_per_customer);
        let unit = quote_from(&product, live);
        Ok(LineQuote::new(product_id, quantity, unit, max_per_customer))
    }

    /// Prices every entry of one sale. Entries whose product cannot be
    /// resolved are skipped rather than failing the whole listing.
    pub async fn price_sale(&self, sale: &FlashSale) -> Vec<SalePricing> {
        let now = self.clock.now();
        let mut entries = Vec::with_capacity(sale.products.len());

        for entry in &sale.products {
            let product = match self.products.get_product(entry.product_id).await {
                Ok(Some(product)) => product,
                Ok(None) => {
                    tracing::warn!(
                        product_id = %entry.product_id,
                        sale_id = %sale.id,
                        "flash sale references a missing product, skipping entry"
                    );
                    continue;
                }
                Err(err) => {
                    tracing::warn!(
                        product_id = %entry.product_id,
                        sale_id = %sale.id,
                        error = %err,
                        "product lookup failed, skipping sale entry"
                    );
                    continue;
                }
            };

            let quote = if sale.is_live_at(now) {
                PriceQuote::discounted(
                    product.price_cents,
                    SaleSummary {
                        id: sale.id,
                        discount_type: entry.discount_type,
                        discount_value: entry.discount_value,
                        ends_at: sale.ends_at,
                    },
                )
            } else {
                PriceQuote::base(product.price_cents)
            };

            entries.push(SalePricing {
                product_id: product.id,
                name: product.name,
                max_per_customer: entry.max_per_customer,
                quote,
            });
        }

        entries
    }

    /// Every live sale with its entries priced, for the listing page.
    pub async fn live_sales(&self) -> Result<Vec<PricedSale>, PricingError> {
        let now = self.clock.now();
        let sales = self
            .sales
            .list_live(now)
            .await
            .map_err(PricingError::Repository)?;

        let mut priced = Vec::with_capacity(sales.len());
        for sale in &sales {
            priced.push(PricedSale {
                id: sale.id,
                name: sale.name.clone(),
                description: sale.description.clone(),
                starts_at: sale.starts_at,
                ends_at: sale.ends_at,
                entries: self.price_sale(sale).await,
            });
        }
        Ok(priced)
    }

    async fn fetch_product(&self, product_id: Uuid) -> Result<Product, PricingError> {
        self.products
            .get_product(product_id)
            .await
            .map_err(PricingError::Repository)?
            .ok_or(PricingError::ProductNotFound(product_id))
    }

    async fn live_entry(&self, product_id: Uuid) -> Option<LiveEntry> {
        let now = self.clock.now();
        match self.sales.find_live_entry(product_id, now).await {
            Ok(live) => live,
            Err(err) => {
                tracing::warn!(
                    product_id = %product_id,
                    error = %err,
                    "flash sale lookup failed, falling back to base price"
                );
                None
            }
        }
    }
}

fn quote_from(product: &Product, live: Option<LiveEntry>) -> PriceQuote {
    match live {
        Some(live) => PriceQuote::discounted(
            product.price_cents,
            SaleSummary {
                id: live.sale_id,
                discount_type: live.entry.discount_type,
                discount_value: live.entry.discount_value,
                ends_at: live.ends_at,
            },
        ),
        None => PriceQuote::base(product.price_cents),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::select_live_entry;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use vitrine_catalog::{DiscountType, FixedClock, FlashSaleProduct};

    struct InMemoryProducts {
        products: Mutex<HashMap<Uuid, Product>>,
    }

    impl InMemoryProducts {
        fn with(products: Vec<Product>) -> Arc<Self> {
            Arc::new(Self {
                products: Mutex::new(products.into_iter().map(|p| (p.id, p)).collect()),
            })
        }
    }

    #[async_trait]
    impl ProductRepository for InMemoryProducts {
        async fn create_product(&self, product: &Product) -> Result<Uuid, RepoError> {
            self.products
                .lock()
                .unwrap()
                .insert(product.id, product.clone());
            Ok(product.id)
        }

        async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
            Ok(self.products.lock().unwrap().get(&id).cloned())
        }

        async fn list_products(&self, _category: Option<&str>) -> Result<Vec<Product>, RepoError> {
            Ok(self.products.lock().unwrap().values().cloned().collect())
        }

        async fn update_product(&self, id: Uuid, product: &Product) -> Result<(), RepoError> {
            self.products.lock().unwrap().insert(id, product.clone());
            Ok(())
        }

        async fn delete_product(&self, id: Uuid) -> Result<(), RepoError> {
            self.products.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    struct InMemorySales {
        sales: Mutex<Vec<FlashSale>>,
    }

    impl InMemorySales {
        fn with(sales: Vec<FlashSale>) -> Arc<Self> {
            Arc::new(Self {
                sales: Mutex::new(sales),
            })
        }
    }

    #[async_trait]
    impl FlashSaleRepository for InMemorySales {
        async fn create_sale(&self, sale: &FlashSale) -> Result<Uuid, RepoError> {
            self.sales.lock().unwrap().push(sale.clone());
            Ok(sale.id)
        }

        async fn get_sale(&self, id: Uuid) -> Result<Option<FlashSale>, RepoError> {
            Ok(self
                .sales
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned())
        }

        async fn list_sales(&self) -> Result<Vec<FlashSale>, RepoError> {
            Ok(self.sales.lock().unwrap().clone())
        }

        async fn update_sale(&self, id: Uuid, sale: &FlashSale) -> Result<(), RepoError> {
            let mut sales = self.sales.lock().unwrap();
            if let Some(existing) = sales.iter_mut().find(|s| s.id == id) {
                *existing = sale.clone();
            }
            Ok(())
        }

        async fn delete_sale(&self, id: Uuid) -> Result<(), RepoError> {
            self.sales.lock().unwrap().retain(|s| s.id != id);
            Ok(())
        }

        async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<FlashSale>, RepoError> {
            let mut live: Vec<FlashSale> = self
                .sales
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.is_live_at(now))
                .cloned()
                .collect();
            live.sort_by_key(|s| (s.starts_at, s.id));
            Ok(live)
        }

        async fn find_live_entry(
            &self,
            product_id: Uuid,
            now: DateTime<Utc>,
        ) -> Result<Option<LiveEntry>, RepoError> {
            Ok(select_live_entry(
                &self.sales.lock().unwrap(),
                product_id,
                now,
            ))
        }
    }

    struct FailingSales;

    #[async_trait]
    impl FlashSaleRepository for FailingSales {
        async fn create_sale(&self, _sale: &FlashSale) -> Result<Uuid, RepoError> {
            Err("sale store down".into())
        }

        async fn get_sale(&self, _id: Uuid) -> Result<Option<FlashSale>, RepoError> {
            Err("sale store down".into())
        }

        async fn list_sales(&self) -> Result<Vec<FlashSale>, RepoError> {
            Err("sale store down".into())
        }

        async fn update_sale(&self, _id: Uuid, _sale: &FlashSale) -> Result<(), RepoError> {
            Err("sale store down".into())
        }

        async fn delete_sale(&self, _id: Uuid) -> Result<(), RepoError> {
            Err("sale store down".into())
        }

        async fn list_live(&self, _now: DateTime<Utc>) -> Result<Vec<FlashSale>, RepoError> {
            Err("sale store down".into())
        }

        async fn find_live_entry(
            &self,
            _product_id: Uuid,
            _now: DateTime<Utc>,
        ) -> Result<Option<LiveEntry>, RepoError> {
            Err("sale store down".into())
        }
    }

    fn product(price_cents: i64) -> Product {
        Product::new(
            "Mechanical Keyboard".to_string(),
            None,
            price_cents,
            25,
            "electronics".to_string(),
            serde_json::json!({}),
        )
    }

    fn sale_for(
        product_id: Uuid,
        now: DateTime<Utc>,
        discount_type: DiscountType,
        discount_value: f64,
        max_per_customer: Option<i32>,
    ) -> FlashSale {
        FlashSale::new(
            "Lightning Deal".to_string(),
            None,
            now - Duration::hours(1),
            now + Duration::hours(1),
            true,
            vec![FlashSaleProduct {
                product_id,
                discount_type,
                discount_value,
                max_per_customer,
            }],
        )
    }

    fn resolver(
        products: Arc<dyn ProductRepository>,
        sales: Arc<dyn FlashSaleRepository>,
        now: DateTime<Utc>,
    ) -> PricingResolver {
        PricingResolver::new(products, sales, Arc::new(FixedClock(now)))
    }

    #[tokio::test]
    async fn test_live_sale_discounts_price() {
        let now = Utc::now();
        let product = product(10000);
        let sale = sale_for(product.id, now, DiscountType::Percentage, 20.0, None);
        let sale_id = sale.id;

        let resolver = resolver(
            InMemoryProducts::with(vec![product.clone()]),
            InMemorySales::with(vec![sale]),
            now,
        );

        let quote = resolver.get_product_price(product.id).await.unwrap();
        assert_eq!(quote.original_cents, 10000);
        assert_eq!(quote.final_cents, 8000);
        assert!(quote.has_flash_sale);
        let summary = quote.flash_sale.unwrap();
        assert_eq!(summary.id, sale_id);
        assert_eq!(summary.discount_type, DiscountType::Percentage);
    }

    #[tokio::test]
    async fn test_no_sale_returns_base_price() {
        let now = Utc::now();
        let product = product(4500);

        let resolver = resolver(
            InMemoryProducts::with(vec![product.clone()]),
            InMemorySales::with(vec![]),
            now,
        );

        let quote = resolver.get_product_price(product.id).await.unwrap();
        assert_eq!(quote.final_cents, 4500);
        assert!(!quote.has_flash_sale);
        assert!(quote.flash_sale.is_none());
    }

    #[tokio::test]
    async fn test_inactive_sale_is_ignored() {
        let now = Utc::now();
        let product = product(4500);
        let mut sale = sale_for(product.id, now, DiscountType::Percentage, 50.0, None);
        sale.is_active = false;

        let resolver = resolver(
            InMemoryProducts::with(vec![product.clone()]),
            InMemorySales::with(vec![sale]),
            now,
        );

        let quote = resolver.get_product_price(product.id).await.unwrap();
        assert!(!quote.has_flash_sale);
        assert_eq!(quote.final_cents, 4500);
    }

    #[tokio::test]
    async fn test_upcoming_sale_is_ignored() {
        let now = Utc::now();
        let product = product(4500);
        let mut sale = sale_for(product.id, now, DiscountType::Fixed, 1000.0, None);
        sale.starts_at = now + Duration::hours(1);
        sale.ends_at = now + Duration::hours(2);

        let resolver = resolver(
            InMemoryProducts::with(vec![product.clone()]),
            InMemorySales::with(vec![sale]),
            now,
        );

        let quote = resolver.get_product_price(product.id).await.unwrap();
        assert!(!quote.has_flash_sale);
    }

    #[tokio::test]
    async fn test_sale_ending_exactly_now_still_applies() {
        let now = Utc::now();
        let product = product(10000);
        let mut sale = sale_for(product.id, now, DiscountType::Percentage, 10.0, None);
        sale.ends_at = now;

        let resolver = resolver(
            InMemoryProducts::with(vec![product.clone()]),
            InMemorySales::with(vec![sale]),
            now,
        );

        let quote = resolver.get_product_price(product.id).await.unwrap();
        assert!(quote.has_flash_sale);
        assert_eq!(quote.final_cents, 9000);
    }

    #[tokio::test]
    async fn test_missing_product_is_fatal() {
        let now = Utc::now();
        let resolver = resolver(
            InMemoryProducts::with(vec![]),
            InMemorySales::with(vec![]),
            now,
        );

        let missing = Uuid::new_v4();
        match resolver.get_product_price(missing).await {
            Err(PricingError::ProductNotFound(id)) => assert_eq!(id, missing),
            other => panic!("expected ProductNotFound, got {:?}", other.map(|q| q.final_cents)),
        }
    }

    #[tokio::test]
    async fn test_sale_lookup_failure_degrades_to_base_price() {
        let now = Utc::now();
        let product = product(7700);

        let resolver = resolver(
            InMemoryProducts::with(vec![product.clone()]),
            Arc::new(FailingSales),
            now,
        );

        let quote = resolver.get_product_price(product.id).await.unwrap();
        assert!(!quote.has_flash_sale);
        assert_eq!(quote.final_cents, 7700);
    }

    #[tokio::test]
    async fn test_repeated_calls_yield_identical_quotes() {
        let now = Utc::now();
        let product = product(10000);
        let sale = sale_for(product.id, now, DiscountType::Percentage, 25.0, None);

        let resolver = resolver(
            InMemoryProducts::with(vec![product.clone()]),
            InMemorySales::with(vec![sale]),
            now,
        );

        let first = resolver.get_product_price(product.id).await.unwrap();
        let second = resolver.get_product_price(product.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_price_line_caps_discounted_units() {
        let now = Utc::now();
        let product = product(1000);
        let sale = sale_for(product.id, now, DiscountType::Fixed, 300.0, Some(2));

        let resolver = resolver(
            InMemoryProducts::with(vec![product.clone()]),
            InMemorySales::with(vec![sale]),
            now,
        );

        let line = resolver.price_line(product.id, 5).await.unwrap();
        assert_eq!(line.discounted_units, 2);
        assert_eq!(line.total_cents, 2 * 700 + 3 * 1000);
    }

    #[tokio::test]
    async fn test_price_line_rejects_non_positive_quantity() {
        let now = Utc::now();
        let product = product(1000);
        let resolver = resolver(
            InMemoryProducts::with(vec![product.clone()]),
            InMemorySales::with(vec![]),
            now,
        );

        assert!(matches!(
            resolver.price_line(product.id, 0).await,
            Err(PricingError::InvalidQuantity(0))
        ));
    }

    #[tokio::test]
    async fn test_live_sales_skip_missing_products() {
        let now = Utc::now();
        let product = product(2000);
        let mut sale = sale_for(product.id, now, DiscountType::Percentage, 50.0, None);
        sale.products.push(FlashSaleProduct {
            product_id: Uuid::new_v4(), // not in the catalog
            discount_type: DiscountType::Percentage,
            discount_value: 10.0,
            max_per_customer: None,
        });

        let resolver = resolver(
            InMemoryProducts::with(vec![product.clone()]),
            InMemorySales::with(vec![sale]),
            now,
        );

        let listing = resolver.live_sales().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].entries.len(), 1);
        assert_eq!(listing[0].entries[0].quote.final_cents, 1000);
    }
}

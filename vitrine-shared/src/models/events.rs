use uuid::Uuid;

/// Which storefront surface generated a product view.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewSource {
    ProductPage,
    QuickView,
    FlashSaleListing,
}

impl ViewSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewSource::ProductPage => "PRODUCT_PAGE",
            ViewSource::QuickView => "QUICK_VIEW",
            ViewSource::FlashSaleListing => "FLASH_SALE_LISTING",
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ProductViewedEvent {
    pub product_id: Uuid,
    pub source: ViewSource,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct FlashSaleCreatedEvent {
    pub sale_id: Uuid,
    pub product_count: usize,
    pub starts_at: i64,
    pub ends_at: i64,
}

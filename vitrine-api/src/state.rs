use std::sync::Arc;

use vitrine_core::{FlashSaleRepository, PricingResolver, ProductRepository, ViewCounter};

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub sales: Arc<dyn FlashSaleRepository>,
    pub views: Arc<dyn ViewCounter>,
    pub resolver: Arc<PricingResolver>,
}

pub mod repository;
pub mod resolver;

pub use repository::{
    select_live_entry, FlashSaleRepository, LiveEntry, ProductRepository, RepoError, ViewCounter,
};
pub use resolver::{PricedSale, PricingError, PricingResolver, SalePricing};

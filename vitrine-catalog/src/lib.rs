pub mod clock;
pub mod discount;
pub mod product;
pub mod quote;
pub mod sale;

pub use clock::{Clock, FixedClock, SystemClock};
pub use discount::apply_discount;
pub use product::Product;
pub use quote::{LineQuote, PriceQuote, SaleSummary};
pub use sale::{DiscountType, FlashSale, FlashSaleProduct, SaleValidationError};

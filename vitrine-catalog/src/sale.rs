use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a flash-sale entry discounts the base price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// `discount_value` is a percent in 0..=100.
    Percentage,
    /// `discount_value` is an amount in minor currency units.
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "PERCENTAGE",
            DiscountType::Fixed => "FIXED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PERCENTAGE" => Some(DiscountType::Percentage),
            "FIXED" => Some(DiscountType::Fixed),
            _ => None,
        }
    }
}

/// One discounted product within a flash sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashSaleProduct {
    pub product_id: Uuid,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    /// Cap on how many units per customer take the sale price.
    pub max_per_customer: Option<i32>,
}

/// A time-windowed promotion over a set of products.
///
/// Effectiveness is computed on read: a sale is live at `now` iff it is
/// flagged active and `starts_at <= now <= ends_at`. The flag is a manual
/// override, independent of the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashSale {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_active: bool,
    pub products: Vec<FlashSaleProduct>,
    pub created_at: DateTime<Utc>,
}

impl FlashSale {
    pub fn new(
        name: String,
        description: Option<String>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        is_active: bool,
        products: Vec<FlashSaleProduct>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            starts_at,
            ends_at,
            is_active,
            products,
            created_at: Utc::now(),
        }
    }

    /// Both window bounds are inclusive.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.starts_at <= now && now <= self.ends_at
    }

    pub fn entry_for(&self, product_id: Uuid) -> Option<&FlashSaleProduct> {
        self.products.iter().find(|p| p.product_id == product_id)
    }

    /// Admin-boundary validation. Invalid discount data is rejected here so
    /// the pricing path can treat stored entries as well-formed.
    pub fn validate(&self) -> Result<(), SaleValidationError> {
        if self.starts_at >= self.ends_at {
            return Err(SaleValidationError::InvalidDateRange);
        }
        if self.products.is_empty() {
            return Err(SaleValidationError::NoProducts);
        }

        let mut seen = std::collections::HashSet::new();
        for entry in &self.products {
            if !seen.insert(entry.product_id) {
                return Err(SaleValidationError::DuplicateProduct(entry.product_id));
            }
            if !entry.discount_value.is_finite() || entry.discount_value < 0.0 {
                return Err(SaleValidationError::InvalidDiscountValue {
                    product_id: entry.product_id,
                    value: entry.discount_value,
                });
            }
            if entry.discount_type == DiscountType::Percentage && entry.discount_value > 100.0 {
                return Err(SaleValidationError::PercentOutOfRange {
                    product_id: entry.product_id,
                    value: entry.discount_value,
                });
            }
            if let Some(max) = entry.max_per_customer {
                if max < 1 {
                    return Err(SaleValidationError::InvalidMaxPerCustomer {
                        product_id: entry.product_id,
                        value: max,
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SaleValidationError {
    #[error("starts_at must be before ends_at")]
    InvalidDateRange,

    #[error("a flash sale needs at least one product entry")]
    NoProducts,

    #[error("product {0} appears more than once")]
    DuplicateProduct(Uuid),

    #[error("discount value {value} for product {product_id} is not a non-negative number")]
    InvalidDiscountValue { product_id: Uuid, value: f64 },

    #[error("percentage discount {value} for product {product_id} is outside 0..=100")]
    PercentOutOfRange { product_id: Uuid, value: f64 },

    #[error("max_per_customer {value} for product {product_id} must be positive")]
    InvalidMaxPerCustomer { product_id: Uuid, value: i32 },
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::discount::apply_discount;
use crate::sale::DiscountType;

/// Enough of the winning flash sale for badges and countdowns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleSummary {
    pub id: Uuid,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub ends_at: DateTime<Utc>,
}

/// The effective price of one product at one instant. Derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    pub original_cents: i64,
    pub final_cents: i64,
    pub has_flash_sale: bool,
    pub flash_sale: Option<SaleSummary>,
}

impl PriceQuote {
    /// Quote with no discount applied.
    pub fn base(original_cents: i64) -> Self {
        Self {
            original_cents,
            final_cents: original_cents,
            has_flash_sale: false,
            flash_sale: None,
        }
    }

    /// Quote with the given sale's discount applied.
    pub fn discounted(original_cents: i64, sale: SaleSummary) -> Self {
        let final_cents = apply_discount(original_cents, sale.discount_type, sale.discount_value);
        Self {
            original_cents,
            final_cents,
            has_flash_sale: true,
            flash_sale: Some(sale),
        }
    }
}

/// Quote for `quantity` units of one product on a cart line.
///
/// When the sale entry carries `max_per_customer`, only that many units take
/// the sale price; the remainder pays the base price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineQuote {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit: PriceQuote,
    pub discounted_units: i32,
    pub total_cents: i64,
}

impl LineQuote {
    pub fn new(
        product_id: Uuid,
        quantity: i32,
        unit: PriceQuote,
        max_per_customer: Option<i32>,
    ) -> Self {
        let discounted_units = if unit.has_flash_sale {
            max_per_customer.map_or(quantity, |max| quantity.min(max))
        } else {
            0
        };
        let full_price_units = quantity - discounted_units;
        let total_cents = discounted_units as i64 * unit.final_cents
            + full_price_units as i64 * unit.original_cents;
        Self {
            product_id,
            quantity,
            unit,
            discounted_units,
            total_cents,
        }
    }
}

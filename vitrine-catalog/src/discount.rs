use crate::sale::DiscountType;

/// Applies a flash-sale discount to a base price in minor currency units.
///
/// Percentage discounts take `discount_value` percent off; fixed discounts
/// subtract `discount_value` cents. The result is clamped to
/// `0..=original_cents`, so an oversized discount floors at free rather than
/// going negative.
pub fn apply_discount(original_cents: i64, discount_type: DiscountType, discount_value: f64) -> i64 {
    let discounted = match discount_type {
        DiscountType::Percentage => {
            let off = (original_cents as f64 * discount_value / 100.0).round() as i64;
            original_cents - off
        }
        DiscountType::Fixed => original_cents - discount_value.round() as i64,
    };
    discounted.clamp(0, original_cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_discount() {
        // 20% off 100.00
        assert_eq!(apply_discount(10000, DiscountType::Percentage, 20.0), 8000);
    }

    #[test]
    fn test_fixed_discount_clamps_at_zero() {
        // 70.00 off 50.00
        assert_eq!(apply_discount(5000, DiscountType::Fixed, 7000.0), 0);
    }

    #[test]
    fn test_zero_discount_is_identity() {
        assert_eq!(apply_discount(9999, DiscountType::Percentage, 0.0), 9999);
        assert_eq!(apply_discount(9999, DiscountType::Fixed, 0.0), 9999);
    }

    #[test]
    fn test_oversized_percentage_clamps_at_zero() {
        assert_eq!(apply_discount(10000, DiscountType::Percentage, 150.0), 0);
    }

    #[test]
    fn test_percentage_stays_within_original() {
        for value in [0.0, 1.0, 33.3, 50.0, 99.9, 100.0] {
            let result = apply_discount(12345, DiscountType::Percentage, value);
            assert!((0..=12345i64).contains(&result), "value {} gave {}", value, result);
        }
    }

    #[test]
    fn test_full_percentage_is_free() {
        assert_eq!(apply_discount(10000, DiscountType::Percentage, 100.0), 0);
    }

    #[test]
    fn test_fractional_percentage_rounds() {
        // 33.3% of 100 cents rounds to 33 off
        assert_eq!(apply_discount(100, DiscountType::Percentage, 33.3), 67);
    }

    #[test]
    fn test_zero_price_stays_zero() {
        assert_eq!(apply_discount(0, DiscountType::Percentage, 50.0), 0);
        assert_eq!(apply_discount(0, DiscountType::Fixed, 100.0), 0);
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Draft,
    Active,
    Paused,
}

/// A product listing synthesized from a trend. Listings are never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub cost: Decimal,
    /// `(price - cost) / price`, as a ratio rather than a percentage.
    pub margin: Decimal,
    pub category: String,
    /// De-duplicated, in first-seen order.
    pub tags: Vec<String>,
    pub variants: Vec<ProductVariant>,
    /// Stock photo URLs, one per listing slot.
    pub images: Vec<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

/// A purchasable option of a [`Product`], e.g. `"Premium"` at `+10`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub sku: String,
    pub inventory: u32,
}

/// Margin ratio for a price/cost pair. A zero price yields a zero margin
/// rather than a division error.
#[must_use]
pub fn compute_margin(price: Decimal, cost: Decimal) -> Decimal {
    if price.is_zero() {
        return Decimal::ZERO;
    }
    (price - cost) / price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_is_ratio_of_price() {
        let margin = compute_margin(Decimal::from(40), Decimal::from(10));
        assert_eq!(margin, Decimal::new(75, 2));
    }

    #[test]
    fn margin_of_zero_price_is_zero() {
        assert_eq!(compute_margin(Decimal::ZERO, Decimal::from(5)), Decimal::ZERO);
    }

    #[test]
    fn margin_can_be_negative_when_sold_below_cost() {
        let margin = compute_margin(Decimal::from(10), Decimal::from(15));
        assert_eq!(margin, Decimal::new(-5, 1));
    }

    #[test]
    fn product_status_serializes_lowercase() {
        let json = serde_json::to_string(&ProductStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }
}

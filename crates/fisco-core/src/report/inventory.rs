//! # Inventory Report
//!
//! Point-in-time stock snapshot with a 30-day sales window.
//!
//! ## Stock Metrics
//! ```text
//! average_weekly_sales = units_sold_30d / 4.3
//! stock_days           = stock / average_weekly_sales × 7    (999 without sales)
//! turnover_rate        = units_sold_30d / (stock + units_sold_30d)
//!
//! status:  out_of_stock > low_stock > reorder_soon > in_stock
//!          stock == 0     ≤ min_stock   < 7 days
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::report::Recommendation;
use crate::types::Product;

/// Trailing window used for sales velocity.
pub const SALES_WINDOW_DAYS: i64 = 30;

/// Weeks in the 30-day window.
pub const WEEKS_PER_WINDOW: f64 = 4.3;

/// Days of stock below which a product should be reordered.
pub const REORDER_SOON_DAYS: f64 = 7.0;

/// Sentinel for products that did not sell in the window.
pub const NO_SALES_STOCK_DAYS: f64 = 999.0;

/// Stock (at retail) above which an unsold product is worth flagging, RD$1,000.
pub const SLOW_MOVER_VALUE_THRESHOLD: Money = Money::from_cents(1_000_00);

// =============================================================================
// Stock Metrics
// =============================================================================

/// Stock status, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    ReorderSoon,
    InStock,
}

impl StockStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Agotado",
            StockStatus::LowStock => "Stock bajo",
            StockStatus::ReorderSoon => "Reordenar pronto",
            StockStatus::InStock => "Disponible",
        }
    }
}

/// Velocity figures for one product over the sales window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockMetrics {
    pub units_sold: i64,
    pub average_weekly_sales: f64,
    pub stock_days: f64,
    pub turnover_rate: f64,
    pub status: StockStatus,
}

impl StockMetrics {
    pub fn compute(product: &Product, units_sold: i64) -> Self {
        let average_weekly_sales = units_sold as f64 / WEEKS_PER_WINDOW;
        let stock_days = if average_weekly_sales > 0.0 {
            product.stock as f64 / average_weekly_sales * 7.0
        } else {
            NO_SALES_STOCK_DAYS
        };
        let moved = product.stock + units_sold;
        let turnover_rate = if moved > 0 {
            units_sold as f64 / moved as f64
        } else {
            0.0
        };

        let status = if product.stock == 0 {
            StockStatus::OutOfStock
        } else if product.stock <= product.min_stock {
            StockStatus::LowStock
        } else if stock_days < REORDER_SOON_DAYS {
            StockStatus::ReorderSoon
        } else {
            StockStatus::InStock
        };

        StockMetrics {
            units_sold,
            average_weekly_sales,
            stock_days,
            turnover_rate,
            status,
        }
    }

    /// Unsold in the window with more than RD$1,000 sitting on the shelf.
    pub fn is_high_value_slow_mover(&self, product: &Product) -> bool {
        self.units_sold == 0 && product.retail_value() > SLOW_MOVER_VALUE_THRESHOLD
    }
}

// =============================================================================
// Payload
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryReport {
    /// Day the snapshot was taken; the sales window ends here.
    #[ts(as = "String")]
    pub as_of: NaiveDate,
    pub summary: InventorySummary,
    pub products: Vec<ProductStock>,
    pub categories: Vec<CategoryRollup>,
    pub slow_movers: Vec<ProductStock>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventorySummary {
    pub total_products: i64,
    pub total_units: i64,
    pub cost_value: Money,
    pub retail_value: Money,
    pub potential_profit: Money,
    pub out_of_stock: i64,
    pub low_stock: i64,
    pub reorder_soon: i64,
    pub in_stock: i64,
}

impl InventorySummary {
    pub fn count(&mut self, status: StockStatus) {
        match status {
            StockStatus::OutOfStock => self.out_of_stock += 1,
            StockStatus::LowStock => self.low_stock += 1,
            StockStatus::ReorderSoon => self.reorder_soon += 1,
            StockStatus::InStock => self.in_stock += 1,
        }
    }
}

/// One product row of the inventory report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductStock {
    pub product_id: String,
    pub name: String,
    pub category: Option<String>,
    pub stock: i64,
    pub min_stock: i64,
    pub price: Money,
    pub retail_value: Money,
    pub units_sold_30d: i64,
    pub average_weekly_sales: f64,
    pub stock_days: f64,
    pub turnover_rate: f64,
    pub status: StockStatus,
}

impl ProductStock {
    pub fn new(product: &Product, category: Option<String>, metrics: &StockMetrics) -> Self {
        ProductStock {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category,
            stock: product.stock,
            min_stock: product.min_stock,
            price: product.price,
            retail_value: product.retail_value(),
            units_sold_30d: metrics.units_sold,
            average_weekly_sales: metrics.average_weekly_sales,
            stock_days: metrics.stock_days,
            turnover_rate: metrics.turnover_rate,
            status: metrics.status,
        }
    }
}

/// Totals over the products of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryRollup {
    pub category_id: Option<String>,
    pub name: String,
    pub product_count: i64,
    pub total_units: i64,
    pub cost_value: Money,
    pub retail_value: Money,
    pub units_sold_30d: i64,
    /// Products that are out of stock or at/below their minimum.
    pub needs_attention: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, min_stock: i64, price_cents: i64) -> Product {
        Product {
            id: "p1".into(),
            name: "Arroz".into(),
            price: Money::from_cents(price_cents),
            cost: Money::from_cents(price_cents / 2),
            stock,
            min_stock,
            category_id: None,
        }
    }

    #[test]
    fn test_no_sales_sentinel() {
        let m = StockMetrics::compute(&product(20, 5, 100), 0);
        assert_eq!(m.stock_days, NO_SALES_STOCK_DAYS);
        assert_eq!(m.turnover_rate, 0.0);
        assert_eq!(m.status, StockStatus::InStock);
    }

    #[test]
    fn test_velocity() {
        // 43 units in 30 days → 10/week → 20 units last 14 days
        let m = StockMetrics::compute(&product(20, 2, 100), 43);
        assert!((m.average_weekly_sales - 10.0).abs() < 1e-9);
        assert!((m.stock_days - 14.0).abs() < 1e-9);
        assert!((m.turnover_rate - 43.0 / 63.0).abs() < 1e-9);
        assert_eq!(m.status, StockStatus::InStock);

        let m = StockMetrics::compute(&product(5, 2, 100), 43);
        assert_eq!(m.status, StockStatus::ReorderSoon);
    }

    #[test]
    fn test_status_precedence() {
        // Out of stock wins even with min_stock 0 and heavy sales
        assert_eq!(StockMetrics::compute(&product(0, 0, 100), 100).status, StockStatus::OutOfStock);
        // Low stock wins over reorder soon
        assert_eq!(StockMetrics::compute(&product(3, 5, 100), 100).status, StockStatus::LowStock);
    }

    #[test]
    fn test_slow_mover() {
        let p = product(11, 1, 100_00); // RD$1,100 on the shelf
        assert!(StockMetrics::compute(&p, 0).is_high_value_slow_mover(&p));
        let p = product(10, 1, 100_00); // exactly RD$1,000
        assert!(!StockMetrics::compute(&p, 0).is_high_value_slow_mover(&p));
    }
}

//! # Aggregators
//!
//! One aggregator per report type. Each runs its grouped store queries
//! concurrently, enriches the distinct keys in one batched round, and hands
//! the figures to the fisco-core synthesizer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Aggregator Pattern                                   │
//! │                                                                         │
//! │  DateRange ──► try_join!(grouped queries)        fisco-db               │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │               distinct keys ──► Lookups::fetch   enrich.rs              │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │               scoring / compliance / recommend   fisco-core             │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │               XxxReport (typed payload)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Module        | Report         | Range        |
//! |---------------|----------------|--------------|
//! | [`sales`]     | daily-sales    | required     |
//! | [`itbis`]     | itbis          | required     |
//! | [`ncf`]       | ncf            | required     |
//! | [`inventory`] | inventory      | ignored      |
//! | [`customers`] | customers      | required     |
//! | [`audit`]     | audit          | required     |
//! | [`dgii`]      | dgii           | required     |

pub mod audit;
pub mod customers;
pub mod dgii;
pub mod inventory;
pub mod itbis;
pub mod ncf;
pub mod sales;

pub use audit::aggregate_audit;
pub use customers::aggregate_customers;
pub use dgii::aggregate_dgii;
pub use inventory::aggregate_inventory;
pub use itbis::aggregate_itbis;
pub use ncf::aggregate_ncf;
pub use sales::aggregate_daily_sales;

use fisco_core::{NcfType, PaymentMethod};

/// Display label for a payment-method group key.
pub(crate) fn payment_label(key: &str) -> String {
    key.parse::<PaymentMethod>()
        .map(|m| m.label().to_string())
        .unwrap_or_else(|_| key.to_string())
}

/// Display label for an NCF-type group key.
pub(crate) fn ncf_type_label(key: &str) -> String {
    key.parse::<NcfType>()
        .map(|t| format!("{} - {}", t.as_str(), t.description()))
        .unwrap_or_else(|_| key.to_string())
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use fisco_core::{
        Cashier, Category, Customer, CustomerClass, DateRange, Money, NcfType, PaymentMethod,
        Product, Sale, SaleLineItem,
    };
    use fisco_db::{Database, DbConfig};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn at(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap()
    }

    pub fn january() -> DateRange {
        DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap()
    }

    /// In-memory store with cashier `u1`, category `c1` and product `p1` (RD$1,000).
    pub async fn store() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.cashiers()
            .insert(&Cashier { id: "u1".into(), name: "Ana Martínez".into() })
            .await
            .unwrap();
        db.categories()
            .insert(&Category { id: "c1".into(), name: "Bebidas".into() })
            .await
            .unwrap();
        db.products().insert(&product("p1", "Ron Añejo", 1_000_00, 20, 5)).await.unwrap();
        db
    }

    pub fn product(id: &str, name: &str, price_cents: i64, stock: i64, min_stock: i64) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            price: Money::from_cents(price_cents),
            cost: Money::from_cents(price_cents * 6 / 10),
            stock,
            min_stock,
            category_id: Some("c1".into()),
        }
    }

    pub fn customer(id: &str, name: &str, class: CustomerClass, tax_id: Option<&str>) -> Customer {
        Customer {
            id: id.into(),
            name: name.into(),
            class,
            tax_id: tax_id.map(Into::into),
            email: None,
            phone: None,
            address: None,
        }
    }

    /// Cash B02 sale of one `p1` line; no receipt, no customer.
    pub fn sale(id: &str, created_at: DateTime<Utc>, subtotal_cents: i64, tax_cents: i64) -> Sale {
        Sale {
            id: id.into(),
            created_at,
            subtotal: Money::from_cents(subtotal_cents),
            tax: Money::from_cents(tax_cents),
            total: Money::from_cents(subtotal_cents + tax_cents),
            ncf: None,
            ncf_type: NcfType::B02,
            payment_method: PaymentMethod::Cash,
            cashier_id: "u1".into(),
            customer_id: None,
            items: vec![SaleLineItem {
                product_id: "p1".into(),
                quantity: 1,
                unit_price: Money::from_cents(subtotal_cents),
                line_total: Money::from_cents(subtotal_cents),
            }],
        }
    }

    pub fn receipt(ncf_type: NcfType, n: i64) -> Option<String> {
        Some(format!("{}{:08}", ncf_type.as_str(), n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_fall_back_to_key() {
        assert_eq!(payment_label("cash"), PaymentMethod::Cash.label());
        assert_eq!(payment_label("barter"), "barter");
        assert!(ncf_type_label("B01").starts_with("B01 - "));
        assert_eq!(ncf_type_label("Z99"), "Z99");
    }
}

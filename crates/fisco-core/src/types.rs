//! # Domain Types
//!
//! Read-only snapshots of the entities the reporting engine aggregates.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Sale       │   │ FiscalSequence  │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  subtotal/tax   │   │  ncf_type       │   │  class          │       │
//! │  │  total          │   │  current ≤ max  │   │  tax_id         │       │
//! │  │  ncf (unique)   │   │  active         │   │  (RNC/Cédula)   │       │
//! │  │  items[]        │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Category     │   │    Cashier      │       │
//! │  │  price / cost   │   │  id, name       │   │  id, name       │       │
//! │  │  stock/min_stock│   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! The engine owns no long-lived state. Every value here is fetched per
//! request from the external store and dropped after rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so ITBIS at 18% is 1800 bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Standard ITBIS rate (18%).
    pub const ITBIS_STANDARD: TaxRate = TaxRate(1800);

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (18.0 for ITBIS).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    /// Store credit ("a crédito"), settled later.
    Credit,
}

impl PaymentMethod {
    /// Every payment method, in breakdown order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Transfer,
        PaymentMethod::Credit,
    ];

    /// Storage tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Credit => "credit",
        }
    }

    /// Label printed on documents.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Card => "Tarjeta",
            PaymentMethod::Transfer => "Transferencia",
            PaymentMethod::Credit => "Crédito",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(PaymentMethod::Cash),
            "card" | "tarjeta" => Ok(PaymentMethod::Card),
            "transfer" | "transferencia" => Ok(PaymentMethod::Transfer),
            "credit" | "credito" | "crédito" => Ok(PaymentMethod::Credit),
            other => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// NCF Type
// =============================================================================

/// DGII fiscal receipt (NCF) type.
///
/// Each type authorizes its own numeric range for a transaction category.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum NcfType {
    /// Crédito fiscal (business buyers with RNC).
    B01,
    /// Consumo (final consumers).
    B02,
    /// Nota de débito.
    B03,
    /// Nota de crédito.
    B04,
    /// Comprobante de compras.
    B11,
    /// Registro único de ingresos.
    B12,
    /// Gastos menores.
    B13,
    /// Regímenes especiales.
    B14,
    /// Gubernamental.
    B15,
    /// Exportaciones.
    B16,
}

impl NcfType {
    /// Every NCF type, in report order.
    pub const ALL: [NcfType; 10] = [
        NcfType::B01,
        NcfType::B02,
        NcfType::B03,
        NcfType::B04,
        NcfType::B11,
        NcfType::B12,
        NcfType::B13,
        NcfType::B14,
        NcfType::B15,
        NcfType::B16,
    ];

    /// The two-character series code ("01" for B01).
    pub fn as_str(&self) -> &'static str {
        match self {
            NcfType::B01 => "B01",
            NcfType::B02 => "B02",
            NcfType::B03 => "B03",
            NcfType::B04 => "B04",
            NcfType::B11 => "B11",
            NcfType::B12 => "B12",
            NcfType::B13 => "B13",
            NcfType::B14 => "B14",
            NcfType::B15 => "B15",
            NcfType::B16 => "B16",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            NcfType::B01 => "Crédito Fiscal",
            NcfType::B02 => "Consumo",
            NcfType::B03 => "Nota de Débito",
            NcfType::B04 => "Nota de Crédito",
            NcfType::B11 => "Compras",
            NcfType::B12 => "Registro Único de Ingresos",
            NcfType::B13 => "Gastos Menores",
            NcfType::B14 => "Regímenes Especiales",
            NcfType::B15 => "Gubernamental",
            NcfType::B16 => "Exportaciones",
        }
    }
}

impl fmt::Display for NcfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NcfType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        NcfType::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or(ValidationError::NotAllowed {
                field: "ncf_type".to_string(),
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Customer Class
// =============================================================================

/// Customer classification; decides which tax id applies.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerClass {
    /// Company, identified by a 9-digit RNC.
    Business,
    /// Person, identified by an 11-digit Cédula.
    Individual,
}

impl CustomerClass {
    pub const ALL: [CustomerClass; 2] = [CustomerClass::Business, CustomerClass::Individual];

    pub fn label(&self) -> &'static str {
        match self {
            CustomerClass::Business => "Empresa",
            CustomerClass::Individual => "Persona Física",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line item in a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineItem {
    pub product_id: String,
    /// Always > 0.
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A completed sale as seen by the reporting engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    /// Fiscal receipt number (e.g. `B0100000001`), globally unique when present.
    pub ncf: Option<String>,
    pub ncf_type: NcfType,
    pub payment_method: PaymentMethod,
    pub cashier_id: String,
    pub customer_id: Option<String>,
    pub items: Vec<SaleLineItem>,
}

/// Largest tolerated gap between `total` and `subtotal + tax` (one centavo).
pub const TOTAL_ROUNDING_TOLERANCE_CENTS: i64 = 1;

impl Sale {
    /// Checks the store contract: `total == subtotal + tax` within rounding,
    /// and every line item has a positive quantity.
    pub fn validate(&self) -> CoreResult<()> {
        let expected = self.subtotal + self.tax;
        if (expected - self.total).abs().cents() > TOTAL_ROUNDING_TOLERANCE_CENTS {
            return Err(CoreError::TotalMismatch {
                sale_id: self.id.clone(),
                subtotal: self.subtotal.cents(),
                tax: self.tax.cents(),
                total: self.total.cents(),
            });
        }

        if let Some(item) = self.items.iter().find(|i| i.quantity <= 0) {
            return Err(CoreError::InvalidLineItem {
                sale_id: self.id.clone(),
                product_id: item.product_id.clone(),
            });
        }

        Ok(())
    }

    /// Whether the sale carries a receipt number at all.
    #[inline]
    pub fn has_ncf(&self) -> bool {
        self.ncf.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

// =============================================================================
// Fiscal Sequence
// =============================================================================

/// A DGII-authorized NCF range for one receipt type.
///
/// ## Invariant
/// `0 ≤ current ≤ max`; `remaining = max − current`. Enforced by [`FiscalSequence::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FiscalSequence {
    pub ncf_type: NcfType,
    current: i64,
    max: i64,
    pub active: bool,
}

impl FiscalSequence {
    /// Builds a sequence snapshot, rejecting counters outside `0..=max`.
    pub fn new(ncf_type: NcfType, current: i64, max: i64, active: bool) -> CoreResult<Self> {
        if current < 0 || max < 0 || current > max {
            return Err(CoreError::SequenceOutOfBounds {
                ncf_type: ncf_type.to_string(),
                current,
                max,
            });
        }

        Ok(FiscalSequence {
            ncf_type,
            current,
            max,
            active,
        })
    }

    #[inline]
    pub fn current(&self) -> i64 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Receipt numbers still available.
    #[inline]
    pub fn remaining(&self) -> i64 {
        self.max - self.current
    }

    /// `current / max * 100`, or 0 for an empty range.
    pub fn percentage_used(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f64 / self.max as f64 * 100.0
    }
}

// =============================================================================
// Customer / Product / Category / Cashier
// =============================================================================

/// A customer snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub class: CustomerClass,
    /// RNC for businesses, Cédula for individuals.
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// A product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub cost: Money,
    pub stock: i64,
    pub min_stock: i64,
    pub category_id: Option<String>,
}

impl Product {
    /// Stock valued at retail price.
    #[inline]
    pub fn retail_value(&self) -> Money {
        self.price.multiply_quantity(self.stock.max(0))
    }

    /// Stock valued at cost.
    #[inline]
    pub fn cost_value(&self) -> Money {
        self.cost.multiply_quantity(self.stock.max(0))
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A POS user who rings up sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cashier {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sale(subtotal: i64, tax: i64, total: i64) -> Sale {
        Sale {
            id: "s-1".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            subtotal: Money::from_cents(subtotal),
            tax: Money::from_cents(tax),
            total: Money::from_cents(total),
            ncf: Some("B0200000001".to_string()),
            ncf_type: NcfType::B02,
            payment_method: PaymentMethod::Cash,
            cashier_id: "u-1".to_string(),
            customer_id: None,
            items: vec![],
        }
    }

    #[test]
    fn test_tax_rate_itbis() {
        assert_eq!(TaxRate::ITBIS_STANDARD.bps(), 1800);
        assert!((TaxRate::ITBIS_STANDARD.percentage() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_sale_total_invariant() {
        assert!(sale(100_000, 18_000, 118_000).validate().is_ok());
        assert!(sale(100_000, 18_000, 118_001).validate().is_ok());
        assert!(sale(100_000, 18_000, 117_000).validate().is_err());
    }

    #[test]
    fn test_sequence_bounds() {
        let seq = FiscalSequence::new(NcfType::B01, 9950, 10_000, true).unwrap();
        assert_eq!(seq.remaining(), 50);
        assert!((seq.percentage_used() - 99.5).abs() < 1e-9);

        assert!(FiscalSequence::new(NcfType::B01, 10_001, 10_000, true).is_err());
        assert!(FiscalSequence::new(NcfType::B01, -1, 10, true).is_err());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("b01".parse::<NcfType>().unwrap(), NcfType::B01);
        assert!("B99".parse::<NcfType>().is_err());
        assert_eq!("Efectivo".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_product_values() {
        let p = Product {
            id: "p".to_string(),
            name: "Ron".to_string(),
            price: Money::from_cents(50_000),
            cost: Money::from_cents(30_000),
            stock: 3,
            min_stock: 1,
            category_id: None,
        };
        assert_eq!(p.retail_value().cents(), 150_000);
        assert_eq!(p.cost_value().cents(), 90_000);
    }
}

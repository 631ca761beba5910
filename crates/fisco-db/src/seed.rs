//! # Demo Data Seeder
//!
//! Populates an empty store with a month of realistic colmado activity so
//! every report has something to say.
//!
//! ## What Gets Generated
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Categories   5 (Bebidas, Snacks, Lácteos, Limpieza, Colmado)          │
//! │  Products     one per catalog entry, stock spread from 0 to 60         │
//! │  Cashiers     3                                                        │
//! │  Customers    business (RNC) and individual (cédula), one bad id       │
//! │  Sequences    B01 close to exhaustion, B02 healthy, B14 inactive       │
//! │  Sales        30 days ending on `today`, 3 to 7 per day, 08:00-19:59   │
//! │               B01 for business buyers, B02 for everyone else           │
//! │               plus one missing, one duplicated and one malformed NCF   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Generation is a pure function of the sale index, so two seeds of the
//! same day produce the same figures (ids aside).

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbResult;
use crate::pool::Database;
use fisco_core::{
    Cashier, Category, Customer, CustomerClass, FiscalSequence, Money, NcfType, PaymentMethod,
    Product, Sale, SaleLineItem, TaxRate,
};

/// Days of sales history generated.
pub const SEED_DAYS: i64 = 30;

const CATEGORIES: &[(&str, &str)] = &[
    ("BEB", "Bebidas"),
    ("SNK", "Snacks"),
    ("LAC", "Lácteos"),
    ("LIM", "Limpieza"),
    ("COL", "Colmado"),
];

/// (category, name, price cents, cost cents)
const CATALOG: &[(&str, &str, i64, i64)] = &[
    ("BEB", "Refresco Cola 2L", 125_00, 85_00),
    ("BEB", "Agua Planeta Azul 20oz", 35_00, 18_00),
    ("BEB", "Cerveza Presidente Grande", 225_00, 160_00),
    ("BEB", "Jugo de Chinola 1L", 110_00, 70_00),
    ("BEB", "Ron Brugal Añejo 700ml", 750_00, 520_00),
    ("SNK", "Platanitos Picantes", 45_00, 25_00),
    ("SNK", "Galletas de Soda", 60_00, 38_00),
    ("SNK", "Maní Tostado", 40_00, 22_00),
    ("LAC", "Leche Rica 1L", 85_00, 62_00),
    ("LAC", "Queso de Freír 1lb", 240_00, 170_00),
    ("LAC", "Yogurt de Fresa", 55_00, 34_00),
    ("LIM", "Detergente 1kg", 185_00, 120_00),
    ("LIM", "Cloro 1 Galón", 140_00, 90_00),
    ("COL", "Arroz Selecto 5lb", 210_00, 165_00),
    ("COL", "Habichuelas Rojas 1lb", 95_00, 60_00),
    ("COL", "Aceite de Soya 1L", 260_00, 200_00),
    ("COL", "Salami Induveca 1lb", 195_00, 135_00),
    ("COL", "Café Santo Domingo 1lb", 330_00, 250_00),
    ("COL", "Huevos (cartón de 30)", 290_00, 230_00),
    ("COL", "Olla de Presión 6L", 2_450_00, 1_900_00),
];

const CASHIERS: &[(&str, &str)] = &[
    ("cashier-ana", "Ana Martínez"),
    ("cashier-luis", "Luis Peña"),
    ("cashier-rosa", "Rosa Jiménez"),
];

/// (name, class, tax id)
const CUSTOMERS: &[(&str, CustomerClass, Option<&str>)] = &[
    ("Colmado El Progreso SRL", CustomerClass::Business, Some("131456789")),
    ("Ferretería Ozama", CustomerClass::Business, Some("101234567")),
    ("Cafetería La Esquina", CustomerClass::Business, Some("1-30-98765")),
    ("María Fernández", CustomerClass::Individual, Some("00112345678")),
    ("José Rodríguez", CustomerClass::Individual, Some("40298765432")),
    ("Carmen Batista", CustomerClass::Individual, None),
    ("Pedro Almonte", CustomerClass::Individual, Some("12345")),
];

/// Walk-in, then payment rotation; cash dominates like a real colmado.
const PAYMENT_ROTATION: [PaymentMethod; 8] = [
    PaymentMethod::Cash,
    PaymentMethod::Cash,
    PaymentMethod::Card,
    PaymentMethod::Cash,
    PaymentMethod::Transfer,
    PaymentMethod::Credit,
    PaymentMethod::Cash,
    PaymentMethod::Card,
];

const B01_START: i64 = 9_900;
const B01_MAX: i64 = 10_000;
const B02_START: i64 = 1_200;
const B02_MAX: i64 = 50_000;

/// Counts of what the seeder wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub products: usize,
    pub customers: usize,
    pub sales: usize,
}

/// Seeds demo data ending on `today`. A store that already has products is
/// left untouched and reported as an empty summary.
pub async fn seed_demo_data(db: &Database, today: NaiveDate) -> DbResult<SeedSummary> {
    if db.products().count().await? > 0 {
        warn!("Store already has products, skipping seed");
        return Ok(SeedSummary::default());
    }

    let mut summary = SeedSummary::default();

    for (code, name) in CATEGORIES {
        db.categories()
            .insert(&Category { id: category_id(code), name: name.to_string() })
            .await?;
    }

    let products = catalog();
    for product in &products {
        db.products().insert(product).await?;
        summary.products += 1;
    }

    for (id, name) in CASHIERS {
        db.cashiers()
            .insert(&Cashier { id: id.to_string(), name: name.to_string() })
            .await?;
    }

    let customers = customers();
    for customer in &customers {
        db.customers().insert(customer).await?;
        summary.customers += 1;
    }

    let mut b01 = B01_START;
    let mut b02 = B02_START;
    let mut last_ncf: Option<String> = None;
    let mut index = 0usize;

    for offset in (0..SEED_DAYS).rev() {
        let day = today - Duration::days(offset);
        let per_day = 3 + (offset as usize * 7) % 5;

        for _ in 0..per_day {
            let customer = match index % 3 {
                0 => None,
                _ => customers.get(index % customers.len()),
            };
            let is_fiscal_buyer = customer
                .is_some_and(|c| c.class == CustomerClass::Business && c.tax_id.is_some());

            let ncf_type = if is_fiscal_buyer { NcfType::B01 } else { NcfType::B02 };
            let counter = if is_fiscal_buyer { &mut b01 } else { &mut b02 };

            let ncf = match index {
                5 => None,
                11 => last_ncf.clone(),
                17 => Some("B0212345".to_string()),
                _ => {
                    *counter += 1;
                    Some(format!("{}{:08}", ncf_type.as_str(), *counter))
                }
            };
            if ncf.is_some() {
                last_ncf = ncf.clone();
            }

            let sale = build_sale(index, day, &products, customer, ncf_type, ncf);
            db.sales().insert(&sale).await?;
            summary.sales += 1;
            index += 1;
        }
    }

    let sequences = [
        FiscalSequence::new(NcfType::B01, b01.min(B01_MAX), B01_MAX, true)?,
        FiscalSequence::new(NcfType::B02, b02.min(B02_MAX), B02_MAX, true)?,
        FiscalSequence::new(NcfType::B14, 0, 500, false)?,
    ];
    for sequence in &sequences {
        db.ncf_sequences().upsert(sequence).await?;
    }

    info!(
        products = summary.products,
        customers = summary.customers,
        sales = summary.sales,
        %today,
        "Demo data seeded"
    );

    Ok(summary)
}

fn category_id(code: &str) -> String {
    format!("cat-{}", code.to_lowercase())
}

fn catalog() -> Vec<Product> {
    CATALOG
        .iter()
        .enumerate()
        .map(|(i, (category, name, price, cost))| Product {
            id: format!("{}-{:03}", category, i + 1),
            name: name.to_string(),
            price: Money::from_cents(*price),
            cost: Money::from_cents(*cost),
            // 0, 3, 6 ... wraps at 60: a few products land out of stock.
            stock: ((i * 23) % 61) as i64 / 3 * 3,
            min_stock: 5 + (i % 3) as i64 * 5,
            category_id: Some(category_id(category)),
        })
        .collect()
}

fn customers() -> Vec<Customer> {
    CUSTOMERS
        .iter()
        .enumerate()
        .map(|(i, (name, class, tax_id))| Customer {
            id: format!("customer-{:02}", i + 1),
            name: name.to_string(),
            class: *class,
            tax_id: tax_id.map(str::to_string),
            email: Some(format!("cliente{}@example.do", i + 1)),
            phone: Some(format!("809-555-{:04}", 1000 + i * 37)),
            address: None,
        })
        .collect()
}

fn build_sale(
    index: usize,
    day: NaiveDate,
    products: &[Product],
    customer: Option<&Customer>,
    ncf_type: NcfType,
    ncf: Option<String>,
) -> Sale {
    let hour = 8 + (index * 5 % 12) as u32;
    let minute = (index * 13 % 60) as u32;
    let created_at = day
        .and_hms_opt(hour, minute, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_else(|| Utc.from_utc_datetime(&day.and_time(Default::default())));

    let line_count = 1 + index % 3;
    let items: Vec<SaleLineItem> = (0..line_count)
        .map(|k| {
            let product = &products[(index * 7 + k * 3) % products.len()];
            let quantity = 1 + ((index + k) % 3) as i64;
            SaleLineItem {
                product_id: product.id.clone(),
                quantity,
                unit_price: product.price,
                line_total: product.price.multiply_quantity(quantity),
            }
        })
        .collect();

    let subtotal: Money = items.iter().map(|i| i.line_total).sum();
    let tax = subtotal.calculate_tax(TaxRate::ITBIS_STANDARD);

    Sale {
        id: Uuid::new_v4().to_string(),
        created_at,
        subtotal,
        tax,
        total: subtotal + tax,
        ncf,
        ncf_type,
        payment_method: PAYMENT_ROTATION[index % PAYMENT_ROTATION.len()],
        cashier_id: CASHIERS[index % CASHIERS.len()].0.to_string(),
        customer_id: customer.map(|c| c.id.clone()),
        items,
    }
}

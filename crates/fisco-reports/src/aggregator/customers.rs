//! # Customers Aggregator
//!
//! Segments by customer class, per-customer loyalty, tax-id validity, and
//! which categories each class buys.
//!
//! ```text
//! customers.list_all ───────┐
//! customer_sales ───────────┤
//! payment counts ───────────┼── try_join! ──► segments + insights ──► CustomersReport
//! category × class sales ───┘                      │
//!                                  category names ─┘ (Lookups)
//! ```

use std::collections::HashMap;

use fisco_core::insights::{loyalty_score, LoyaltyTier, PurchaseHistory};
use fisco_core::recommend;
use fisco_core::report::{
    retention_rate, CategoryPreference, CustomerInsight, CustomerSegment, CustomerSummary,
    CustomersReport,
};
use fisco_core::validation::validate_tax_id;
use fisco_core::{Customer, CustomerClass, DateRange, Money, PaymentMethod};
use fisco_db::{CategoryClassSales, CustomerPaymentCount, Database, DbResult};
use tracing::warn;

use crate::enrich::{EntityKeys, Lookups};

pub async fn aggregate_customers(db: &Database, range: &DateRange) -> DbResult<CustomersReport> {
    let sales = db.sales();
    let customers = db.customers();

    let (directory, purchases, payments, by_class) = tokio::try_join!(
        customers.list_all(),
        sales.customer_sales(range, None),
        sales.customer_payment_counts(range),
        sales.category_sales_by_class(range),
    )?;

    let keys = EntityKeys::new().categories(by_class.iter().filter_map(|c| c.category_id.as_deref()));
    let lookups = Lookups::fetch(db, keys).await?;

    let known: HashMap<&str, &Customer> = directory.iter().map(|c| (c.id.as_str(), c)).collect();
    let preferred = preferred_payments(&payments);
    let days_in_range = range.days();

    let mut customers = Vec::with_capacity(purchases.len());
    for history in &purchases {
        let Some(customer) = known.get(history.customer_id.as_str()) else {
            warn!(customer_id = %history.customer_id, "Sales reference an unknown customer");
            continue;
        };

        let days_since_last = (range.to_date() - history.last_purchase.date_naive()).num_days().max(0);
        let score = loyalty_score(
            &PurchaseHistory {
                purchases: history.purchases,
                total_spent: history.total,
                days_since_last,
            },
            days_in_range,
        );

        customers.push(CustomerInsight {
            customer_id: customer.id.clone(),
            name: customer.name.clone(),
            class: customer.class,
            tax_id: customer.tax_id.clone(),
            tax_id_valid: has_valid_tax_id(customer),
            purchases: history.purchases,
            total_spent: history.total,
            average_ticket: history.total.average_over(history.purchases),
            last_purchase: Some(history.last_purchase),
            days_since_last: Some(days_since_last),
            preferred_payment: preferred.get(customer.id.as_str()).copied(),
            loyalty_score: score,
            tier: LoyaltyTier::from_score(score),
        });
    }

    let segments = CustomerClass::ALL
        .iter()
        .map(|&class| segment(class, &directory, &customers))
        .collect();

    let active = customers.len() as i64;
    let total_revenue = customers.iter().map(|c| c.total_spent).sum::<Money>();
    let summary = CustomerSummary {
        total_customers: directory.len() as i64,
        active_customers: active,
        retention_rate: retention_rate(active, directory.len() as i64),
        total_revenue,
        average_spend: total_revenue.average_over(active),
        valid_tax_ids: directory.iter().filter(|c| has_valid_tax_id(c)).count() as i64,
    };

    let category_preferences = category_preferences(&by_class, &lookups);
    let recommendations = recommend::for_customers(&summary, &customers);

    Ok(CustomersReport {
        period: *range,
        summary,
        segments,
        customers,
        category_preferences,
        recommendations,
    })
}

fn has_valid_tax_id(customer: &Customer) -> bool {
    customer
        .tax_id
        .as_deref()
        .is_some_and(|id| validate_tax_id(customer.class, id).is_ok())
}

/// Most used payment method per customer.
///
/// Rows arrive ordered by count descending, so the first row per customer wins.
fn preferred_payments(counts: &[CustomerPaymentCount]) -> HashMap<&str, PaymentMethod> {
    let mut preferred = HashMap::new();
    for row in counts {
        preferred.entry(row.customer_id.as_str()).or_insert(row.method);
    }
    preferred
}

fn segment(class: CustomerClass, directory: &[Customer], active: &[CustomerInsight]) -> CustomerSegment {
    let members = active.iter().filter(|c| c.class == class);
    CustomerSegment {
        class,
        label: class.label().to_string(),
        customers: directory.iter().filter(|c| c.class == class).count() as i64,
        active: members.clone().count() as i64,
        purchases: members.clone().map(|c| c.purchases).sum(),
        revenue: members.map(|c| c.total_spent).sum(),
    }
}

/// Merges the per-category rows by display name, highest revenue first.
fn category_preferences(rows: &[CategoryClassSales], lookups: &Lookups) -> Vec<CategoryPreference> {
    let mut merged: Vec<CategoryPreference> = Vec::new();
    for row in rows {
        let name = lookups.category_name(row.category_id.as_deref());
        let index = match merged.iter().position(|p| p.category == name) {
            Some(index) => index,
            None => {
                merged.push(CategoryPreference::new(name));
                merged.len() - 1
            }
        };
        merged[index].add(row.class, row.units, row.revenue);
    }
    merged.sort_by(|a, b| b.total_revenue().cmp(&a.total_revenue()));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::fixtures::*;
    use fisco_core::Sale;

    fn bought(id: &str, customer: &str, day: u32, subtotal_cents: i64, method: PaymentMethod) -> Sale {
        let mut s = sale(id, at(2024, 1, day, 11), subtotal_cents, 0);
        s.customer_id = Some(customer.into());
        s.payment_method = method;
        s
    }

    #[tokio::test]
    async fn test_loyal_customer_scores_gold() {
        let db = store().await;
        db.customers()
            .insert(&customer("k1", "Colmado Don Pepe", CustomerClass::Business, Some("131000001")))
            .await
            .unwrap();

        // Five purchases totalling RD$6,000, the last one 3 days before the end.
        for (i, day) in [2, 9, 15, 21, 27].into_iter().enumerate() {
            let method = if i == 0 { PaymentMethod::Card } else { PaymentMethod::Cash };
            db.sales()
                .insert(&bought(&format!("s{i}"), "k1", day, 1_200_00, method))
                .await
                .unwrap();
        }

        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 30)).unwrap();
        let report = aggregate_customers(&db, &range).await.unwrap();

        let k1 = &report.customers[0];
        assert_eq!(k1.purchases, 5);
        assert_eq!(k1.total_spent, Money::from_cents(6_000_00));
        assert_eq!(k1.days_since_last, Some(3));
        assert_eq!(k1.loyalty_score, 100);
        assert_eq!(k1.tier, LoyaltyTier::Gold);
        assert_eq!(k1.preferred_payment, Some(PaymentMethod::Cash));
        assert!(k1.tax_id_valid);
    }

    #[tokio::test]
    async fn test_segments_and_retention() {
        let db = store().await;
        let customers = db.customers();
        customers
            .insert(&customer("b1", "Ferretería Ochoa", CustomerClass::Business, Some("101010101")))
            .await
            .unwrap();
        customers
            .insert(&customer("i1", "María Pérez", CustomerClass::Individual, Some("00112345678")))
            .await
            .unwrap();
        customers
            .insert(&customer("i2", "Juan Díaz", CustomerClass::Individual, Some("123")))
            .await
            .unwrap();
        customers
            .insert(&customer("i3", "Rosa Peña", CustomerClass::Individual, None))
            .await
            .unwrap();

        db.sales().insert(&bought("a", "b1", 5, 3_000_00, PaymentMethod::Transfer)).await.unwrap();
        db.sales().insert(&bought("b", "i2", 6, 500_00, PaymentMethod::Cash)).await.unwrap();
        // walk-in sale, no customer
        db.sales().insert(&sale("c", at(2024, 1, 7, 9), 800_00, 0)).await.unwrap();

        let report = aggregate_customers(&db, &january()).await.unwrap();

        assert_eq!(report.summary.total_customers, 4);
        assert_eq!(report.summary.active_customers, 2);
        assert!((report.summary.retention_rate - 0.5).abs() < 1e-9);
        assert_eq!(report.summary.total_revenue, Money::from_cents(3_500_00));
        assert_eq!(report.summary.valid_tax_ids, 2);

        let names: Vec<_> = report.customers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ferretería Ochoa", "Juan Díaz"]);
        assert!(!report.customers[1].tax_id_valid);

        let business = &report.segments[0];
        assert_eq!(business.class, CustomerClass::Business);
        assert_eq!((business.customers, business.active), (1, 1));
        let individual = &report.segments[1];
        assert_eq!((individual.customers, individual.active), (3, 1));
        assert_eq!(individual.revenue, Money::from_cents(500_00));

        assert_eq!(report.category_preferences.len(), 1);
        let bebidas = &report.category_preferences[0];
        assert_eq!(bebidas.category, "Bebidas");
        assert_eq!(bebidas.business_revenue, Money::from_cents(3_000_00));
        assert_eq!(bebidas.individual_units, 1);

        assert!(report
            .recommendations
            .iter()
            .any(|r| r.message.contains("RNC/Cédula")));
    }
}

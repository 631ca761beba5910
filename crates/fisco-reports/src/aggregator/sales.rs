//! # Daily Sales Aggregator
//!
//! ```text
//! totals ─────────────┐
//! by payment method ──┤
//! by NCF type ────────┤
//! top 10 products ────┼── try_join! ──► enrich names ──► DailySalesReport
//! top 10 customers ───┤
//! hourly buckets ─────┤
//! catalog + 30d units ┘ (stock alerts)
//! ```

use std::collections::HashMap;

use fisco_core::report::{
    DailySalesReport, HourlyBucket, PaymentBreakdown, SalesSummary, StockAlerts, StockMetrics,
    TopCustomer, TopProduct, REORDER_SOON_DAYS, SALES_WINDOW_DAYS, TOP_LIMIT,
};
use fisco_core::{DateRange, Product};
use fisco_db::{Database, DbResult, ProductSales, SaleDimension};
use tracing::debug;

use crate::enrich::{EntityKeys, Lookups};

pub async fn aggregate_daily_sales(db: &Database, range: &DateRange) -> DbResult<DailySalesReport> {
    let sales = db.sales();
    let products = db.products();
    let window = DateRange::trailing(range.to_date(), SALES_WINDOW_DAYS);
    let top = Some(TOP_LIMIT as i64);

    let (totals, by_method, by_ncf_type, top_products, top_customers, hourly, catalog, window_sales) = tokio::try_join!(
        sales.totals(range),
        sales.totals_by(SaleDimension::PaymentMethod, range),
        sales.totals_by(SaleDimension::NcfType, range),
        sales.product_sales(range, top),
        sales.customer_sales(range, top),
        sales.hourly_totals(range),
        products.list_all(),
        sales.product_sales(&window, None),
    )?;

    let keys = EntityKeys::new()
        .products(top_products.iter().map(|p| p.product_id.as_str()))
        .customers(top_customers.iter().map(|c| c.customer_id.as_str()));
    let lookups = Lookups::fetch(db, keys).await?;

    let top_products = top_products
        .into_iter()
        .map(|p| TopProduct {
            name: lookups.product_name(&p.product_id),
            category: lookups.product_category(&p.product_id),
            units_sold: p.units,
            revenue: p.revenue,
            product_id: p.product_id,
        })
        .collect();

    let top_customers = top_customers
        .into_iter()
        .map(|c| TopCustomer {
            name: lookups.customer_name(&c.customer_id),
            tax_id: lookups.customer_tax_id(&c.customer_id),
            purchases: c.purchases,
            total_spent: c.total,
            customer_id: c.customer_id,
        })
        .collect();

    let hourly: Vec<(u32, i64, _)> = hourly.iter().map(|h| (h.hour, h.count, h.total)).collect();
    let stock_alerts = stock_alerts(&catalog, &window_sales);
    debug!(?stock_alerts, "Stock alerts computed");

    Ok(DailySalesReport {
        period: *range,
        summary: SalesSummary {
            total_sales: totals.count,
            subtotal: totals.subtotal,
            total_tax: totals.tax,
            total_amount: totals.total,
            average_sale: totals.average(),
        },
        payments: PaymentBreakdown::from_groups(by_method),
        by_ncf_type,
        top_products,
        top_customers,
        hourly: HourlyBucket::fill_day(&hourly),
        stock_alerts,
    })
}

/// Alert counts over the catalog. The four counters are independent: a
/// low-stock product can also be about to run out, and a sold-out product
/// that moved in the window has 0 days left and counts as reorder-soon.
fn stock_alerts(catalog: &[Product], window_sales: &[ProductSales]) -> StockAlerts {
    let units: HashMap<&str, i64> = window_sales
        .iter()
        .map(|s| (s.product_id.as_str(), s.units))
        .collect();

    let mut alerts = StockAlerts::default();
    for product in catalog {
        let metrics = StockMetrics::compute(product, units.get(product.id.as_str()).copied().unwrap_or(0));

        if product.stock == 0 {
            alerts.critical += 1;
        } else if product.stock <= product.min_stock {
            alerts.low += 1;
        }
        if metrics.stock_days < REORDER_SOON_DAYS {
            alerts.reorder_soon += 1;
        }
        if metrics.is_high_value_slow_mover(product) {
            alerts.high_value_slow_moving += 1;
        }
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::fixtures::*;
    use fisco_core::{CustomerClass, Money, PaymentMethod};

    #[tokio::test]
    async fn test_three_cash_sales() {
        let db = store().await;
        // RD$1,000 tickets, ITBIS included
        for (i, day) in [5, 12, 20].into_iter().enumerate() {
            db.sales()
                .insert(&sale(&format!("s{i}"), at(2024, 1, day, 10), 820_00, 180_00))
                .await
                .unwrap();
        }
        // Outside the range, must not count.
        db.sales().insert(&sale("late", at(2024, 2, 1, 0), 820_00, 180_00)).await.unwrap();

        let report = aggregate_daily_sales(&db, &january()).await.unwrap();

        assert_eq!(report.summary.total_sales, 3);
        assert_eq!(report.summary.total_amount, Money::from_cents(3_000_00));
        assert_eq!(report.summary.total_tax, Money::from_cents(540_00));
        assert_eq!(report.summary.average_sale, Money::from_cents(1_000_00));
        assert_eq!(report.payments.total_cash, Money::from_cents(3_000_00));
        assert_eq!(report.payments.total_card, Money::zero());
        assert_eq!(report.payments.total(), report.summary.total_amount);
        assert_eq!(report.hourly.len(), 24);
        assert_eq!(report.hourly[10].count, 3);
    }

    #[tokio::test]
    async fn test_top_lists_are_enriched_and_stable() {
        let db = store().await;
        db.products().insert(&product("p2", "Café Molido", 1_000_00, 30, 5)).await.unwrap();
        db.customers()
            .insert(&customer("k1", "Colmado Don Pepe", CustomerClass::Business, Some("131000001")))
            .await
            .unwrap();

        // Same revenue for p1 and p2: p1 sold first, so it ranks first.
        let mut first = sale("a", at(2024, 1, 3, 9), 1_000_00, 180_00);
        first.customer_id = Some("k1".into());
        db.sales().insert(&first).await.unwrap();

        let mut second = sale("b", at(2024, 1, 4, 9), 1_000_00, 180_00);
        second.items[0].product_id = "p2".into();
        second.payment_method = PaymentMethod::Card;
        db.sales().insert(&second).await.unwrap();

        let report = aggregate_daily_sales(&db, &january()).await.unwrap();

        let names: Vec<_> = report.top_products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ron Añejo", "Café Molido"]);
        assert_eq!(report.top_products[0].category.as_deref(), Some("Bebidas"));
        assert_eq!(report.top_customers.len(), 1);
        assert_eq!(report.top_customers[0].name, "Colmado Don Pepe");
        assert_eq!(report.top_customers[0].tax_id.as_deref(), Some("131000001"));
    }

    #[test]
    fn test_stock_alert_counters() {
        let catalog = vec![
            product("out", "Agotado", 100_00, 0, 2),
            product("low", "Bajo", 100_00, 2, 5),
            product("fast", "Rápido", 100_00, 8, 1),
            product("idle", "Caro", 500_00, 3, 1),
        ];
        let sold = vec![ProductSales {
            product_id: "fast".into(),
            units: 43,
            revenue: Money::from_cents(4_300_00),
        }];

        let alerts = stock_alerts(&catalog, &sold);
        assert_eq!(alerts.critical, 1);
        assert_eq!(alerts.low, 1);
        // 43 units / 4.3 weeks = 10 per week; 8 units last 5.6 days
        assert_eq!(alerts.reorder_soon, 1);
        // RD$1,500 unsold; the low-stock product holds only RD$200
        assert_eq!(alerts.high_value_slow_moving, 1);
    }

    #[test]
    fn test_sold_out_product_with_sales_is_reorder_soon() {
        let catalog = vec![
            product("gone", "Vendido", 100_00, 0, 2),
            product("never", "Sin ventas", 100_00, 0, 2),
        ];
        let sold = vec![ProductSales {
            product_id: "gone".into(),
            units: 12,
            revenue: Money::from_cents(1_200_00),
        }];

        let alerts = stock_alerts(&catalog, &sold);
        assert_eq!(alerts.critical, 2);
        // 0 days of stock left; the unsold one has no projection
        assert_eq!(alerts.reorder_soon, 1);
    }
}

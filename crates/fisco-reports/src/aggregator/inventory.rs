//! # Inventory Aggregator
//!
//! Point-in-time stock snapshot with 30-day velocity. Ignores the request
//! range; the sales window ends on `as_of`.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use fisco_core::recommend;
use fisco_core::report::{
    CategoryRollup, InventoryReport, InventorySummary, ProductStock, StockMetrics, StockStatus,
    SALES_WINDOW_DAYS,
};
use fisco_core::{DateRange, Money};
use fisco_db::{Database, DbResult};

use crate::enrich::{EntityKeys, Lookups};

pub async fn aggregate_inventory(db: &Database, as_of: NaiveDate) -> DbResult<InventoryReport> {
    let window = DateRange::trailing(as_of, SALES_WINDOW_DAYS);
    let sales = db.sales();
    let products = db.products();

    let (catalog, window_sales) = tokio::try_join!(products.list_all(), sales.product_sales(&window, None))?;

    let keys = EntityKeys::new().categories(catalog.iter().filter_map(|p| p.category_id.as_deref()));
    let lookups = Lookups::fetch(db, keys).await?;

    let units: HashMap<&str, i64> = window_sales
        .iter()
        .map(|s| (s.product_id.as_str(), s.units))
        .collect();

    let mut summary = InventorySummary::default();
    let mut rollups: BTreeMap<String, CategoryRollup> = BTreeMap::new();
    let mut rows = Vec::with_capacity(catalog.len());
    let mut slow_movers = Vec::new();

    for product in &catalog {
        let metrics = StockMetrics::compute(product, units.get(product.id.as_str()).copied().unwrap_or(0));
        let category = product
            .category_id
            .as_deref()
            .map(|id| lookups.category_name(Some(id)));

        summary.total_products += 1;
        summary.total_units += product.stock;
        summary.cost_value += product.cost_value();
        summary.retail_value += product.retail_value();
        summary.count(metrics.status);

        let name = lookups.category_name(product.category_id.as_deref());
        let rollup = rollups.entry(name.clone()).or_insert_with(|| CategoryRollup {
            category_id: product.category_id.clone(),
            name,
            product_count: 0,
            total_units: 0,
            cost_value: Money::zero(),
            retail_value: Money::zero(),
            units_sold_30d: 0,
            needs_attention: 0,
        });
        rollup.product_count += 1;
        rollup.total_units += product.stock;
        rollup.cost_value += product.cost_value();
        rollup.retail_value += product.retail_value();
        rollup.units_sold_30d += metrics.units_sold;
        if matches!(metrics.status, StockStatus::OutOfStock | StockStatus::LowStock) {
            rollup.needs_attention += 1;
        }

        let row = ProductStock::new(product, category, &metrics);
        if metrics.is_high_value_slow_mover(product) {
            slow_movers.push(row.clone());
        }
        rows.push(row);
    }

    summary.potential_profit = summary.retail_value - summary.cost_value;
    slow_movers.sort_by(|a, b| b.retail_value.cmp(&a.retail_value));

    let recommendations = recommend::for_inventory(&summary, &slow_movers);

    Ok(InventoryReport {
        as_of,
        summary,
        products: rows,
        categories: rollups.into_values().collect(),
        slow_movers,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::fixtures::*;

    #[tokio::test]
    async fn test_snapshot_and_rollups() {
        let db = store().await;
        // p1: stock 20, min 5, RD$1,000 → sells 43 in the window
        db.products().insert(&product("p2", "Hielo", 50_00, 0, 10)).await.unwrap();
        let mut idle = product("p3", "Olla", 2_000_00, 4, 1);
        idle.category_id = None;
        db.products().insert(&idle).await.unwrap();

        let mut bulk = sale("a", at(2024, 3, 20, 10), 43_000_00, 7_740_00);
        bulk.items[0].quantity = 43;
        bulk.items[0].unit_price = Money::from_cents(1_000_00);
        db.sales().insert(&bulk).await.unwrap();
        // Older than 30 days, ignored.
        db.sales().insert(&sale("old", at(2024, 1, 2, 10), 1_000_00, 180_00)).await.unwrap();

        let report = aggregate_inventory(&db, date(2024, 3, 31)).await.unwrap();

        assert_eq!(report.summary.total_products, 3);
        assert_eq!(report.summary.out_of_stock, 1);
        assert_eq!(report.summary.in_stock, 2);
        assert_eq!(report.summary.total_units, 24);
        assert_eq!(
            report.summary.potential_profit,
            report.summary.retail_value - report.summary.cost_value
        );

        let ron = report.products.iter().find(|p| p.product_id == "p1").unwrap();
        assert_eq!(ron.units_sold_30d, 43);
        assert!((ron.stock_days - 14.0).abs() < 1e-6);

        assert_eq!(report.slow_movers.len(), 1);
        assert_eq!(report.slow_movers[0].product_id, "p3");

        let names: Vec<_> = report.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bebidas", "Sin categoría"]);
        assert_eq!(report.categories[0].product_count, 2);
        assert_eq!(report.categories[0].needs_attention, 1);
        assert_eq!(report.categories[0].units_sold_30d, 43);
        assert!(!report.recommendations.is_empty());
    }
}

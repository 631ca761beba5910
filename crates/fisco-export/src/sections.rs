//! # Report Sections
//!
//! The neutral model both back ends render. A report becomes a list of
//! titled tables; the document lays them out on pages, the CSV writes them
//! one after another.
//!
//! ```text
//! ReportResult ──► report_sections() ──► Vec<Section> ──┬──► document.rs (PDF)
//!                                                       └──► csv.rs
//! ```

use fisco_core::report::{
    AuditReport, CustomersReport, DailySalesReport, DgiiReport, GroupTotals, InventoryReport,
    ItbisReport, NcfReport, Recommendation,
};
use fisco_core::ReportResult;

use crate::format::{
    format_amount, format_count, format_currency, format_date, format_decimal, format_percent,
    format_ratio,
};

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub header: String,
    pub align: Align,
    /// Cells longer than this are cut with `...` when they overflow.
    pub max_chars: Option<usize>,
}

/// One titled table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Section {
            title: title.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn text(mut self, header: &str) -> Self {
        self.columns.push(Column {
            header: header.to_string(),
            align: Align::Left,
            max_chars: None,
        });
        self
    }

    /// Left-aligned column cut at `max_chars`.
    pub fn long_text(mut self, header: &str, max_chars: usize) -> Self {
        self.columns.push(Column {
            header: header.to_string(),
            align: Align::Left,
            max_chars: Some(max_chars),
        });
        self
    }

    pub fn number(mut self, header: &str) -> Self {
        self.columns.push(Column {
            header: header.to_string(),
            align: Align::Right,
            max_chars: None,
        });
        self
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.header.as_str())
    }

    /// Two-column "Concepto / Valor" table.
    fn key_values(title: &str, pairs: Vec<(&str, String)>) -> Self {
        let mut section = Section::new(title).text("Concepto").number("Valor");
        for (key, value) in pairs {
            section.row(vec![key.to_string(), value]);
        }
        section
    }
}

/// Sections of a report, in reading order.
pub fn report_sections(report: &ReportResult) -> Vec<Section> {
    let mut sections = match report {
        ReportResult::DailySales(r) => daily_sales(r),
        ReportResult::Itbis(r) => itbis(r),
        ReportResult::Ncf(r) => ncf(r),
        ReportResult::Inventory(r) => inventory(r),
        ReportResult::Customers(r) => customers(r),
        ReportResult::Audit(r) => audit(r),
        ReportResult::Dgii(r) => dgii(r),
    };
    sections.extend(recommendations(report.recommendations()));
    sections
}

fn group_table(title: &str, key_header: &str, groups: &[GroupTotals], label: impl Fn(&str) -> String) -> Section {
    let mut section = Section::new(title)
        .text(key_header)
        .number("Ventas")
        .number("Subtotal")
        .number("ITBIS")
        .number("Total");
    for g in groups {
        section.row(vec![
            label(&g.key),
            format_count(g.count),
            format_amount(g.subtotal),
            format_amount(g.tax),
            format_amount(g.total),
        ]);
    }
    section
}

fn payment_label(key: &str) -> String {
    key.parse::<fisco_core::PaymentMethod>()
        .map(|m| m.label().to_string())
        .unwrap_or_else(|_| key.to_string())
}

fn recommendations(recs: &[Recommendation]) -> Option<Section> {
    if recs.is_empty() {
        return None;
    }
    let mut section = Section::new("Recomendaciones")
        .text("Prioridad")
        .long_text("Recomendación", 110);
    for r in recs {
        section.row(vec![r.priority.label().to_string(), r.message.clone()]);
    }
    Some(section)
}

// =============================================================================
// Per-Report Sections
// =============================================================================

fn daily_sales(r: &DailySalesReport) -> Vec<Section> {
    let summary = Section::key_values(
        "Resumen de Ventas",
        vec![
            ("Total de ventas", format_count(r.summary.total_sales)),
            ("Subtotal", format_currency(r.summary.subtotal)),
            ("ITBIS", format_currency(r.summary.total_tax)),
            ("Monto total", format_currency(r.summary.total_amount)),
            ("Venta promedio", format_currency(r.summary.average_sale)),
        ],
    );

    let payments = Section::key_values(
        "Métodos de Pago",
        vec![
            ("Efectivo", format_currency(r.payments.total_cash)),
            ("Tarjeta", format_currency(r.payments.total_card)),
            ("Transferencia", format_currency(r.payments.total_transfer)),
            ("Crédito", format_currency(r.payments.total_credit)),
        ],
    );

    let by_type = group_table("Ventas por Tipo de NCF", "Tipo NCF", &r.by_ncf_type, str::to_string);

    let mut products = Section::new("Productos Más Vendidos")
        .long_text("Producto", 40)
        .text("Categoría")
        .number("Unidades")
        .number("Ingresos");
    for p in &r.top_products {
        products.row(vec![
            p.name.clone(),
            p.category.clone().unwrap_or_default(),
            format_count(p.units_sold),
            format_amount(p.revenue),
        ]);
    }

    let mut clients = Section::new("Mejores Clientes")
        .long_text("Cliente", 40)
        .text("RNC/Cédula")
        .number("Compras")
        .number("Total");
    for c in &r.top_customers {
        clients.row(vec![
            c.name.clone(),
            c.tax_id.clone().unwrap_or_default(),
            format_count(c.purchases),
            format_amount(c.total_spent),
        ]);
    }

    let mut hourly = Section::new("Ventas por Hora").text("Hora").number("Ventas").number("Total");
    for h in r.hourly.iter().filter(|h| h.count > 0) {
        hourly.row(vec![
            format!("{:02}:00", h.hour),
            format_count(h.count),
            format_amount(h.total),
        ]);
    }

    let alerts = Section::key_values(
        "Alertas de Inventario",
        vec![
            ("Agotados", format_count(r.stock_alerts.critical)),
            ("Stock bajo", format_count(r.stock_alerts.low)),
            ("Reordenar pronto", format_count(r.stock_alerts.reorder_soon)),
            ("Alto valor sin movimiento", format_count(r.stock_alerts.high_value_slow_moving)),
        ],
    );

    vec![summary, payments, by_type, products, clients, hourly, alerts]
}

fn itbis(r: &ItbisReport) -> Vec<Section> {
    let summary = Section::key_values(
        "Resumen de ITBIS",
        vec![
            ("Transacciones", format_count(r.summary.transactions)),
            ("Base imponible", format_currency(r.summary.taxable_base)),
            ("ITBIS cobrado", format_currency(r.summary.total_tax)),
            ("Total con ITBIS", format_currency(r.summary.total_with_tax)),
            ("Tasa efectiva", format_percent(r.summary.effective_rate)),
            ("Cumplimiento de tasa", format_percent(r.summary.compliance_pct)),
            ("Tendencia", r.trend.label().to_string()),
        ],
    );

    let variance = Section::key_values(
        "Verificación de Varianza",
        vec![
            ("ITBIS esperado (18%)", format_currency(r.variance.expected)),
            ("ITBIS cobrado", format_currency(r.variance.actual)),
            ("Varianza", format_currency(r.variance.variance)),
            ("Varianza %", format_percent(r.variance.variance_pct)),
            ("Estado", if r.variance.compliant { "Conforme" } else { "No conforme" }.to_string()),
        ],
    );

    let share_table = |title: &str, header: &str, shares: &[fisco_core::report::TaxShare]| {
        let mut section = Section::new(title)
            .text(header)
            .number("Ventas")
            .number("Base")
            .number("ITBIS")
            .number("% del ITBIS");
        for s in shares {
            section.row(vec![
                s.label.clone(),
                format_count(s.transactions),
                format_amount(s.taxable_base),
                format_amount(s.tax),
                format_percent(s.percentage),
            ]);
        }
        section
    };

    let mut daily = Section::new("ITBIS Diario")
        .text("Fecha")
        .number("Ventas")
        .number("Base")
        .number("ITBIS");
    for d in &r.daily {
        daily.row(vec![
            format_date(d.date),
            format_count(d.transactions),
            format_amount(d.taxable_base),
            format_amount(d.tax),
        ]);
    }

    vec![
        summary,
        variance,
        share_table("ITBIS por Tipo de NCF", "Tipo NCF", &r.by_ncf_type),
        share_table("ITBIS por Método de Pago", "Método", &r.by_payment_method),
        daily,
    ]
}

fn ncf(r: &NcfReport) -> Vec<Section> {
    let mut sequences = Section::new("Secuencias Activas")
        .text("Tipo")
        .long_text("Descripción", 30)
        .number("Actual")
        .number("Máximo")
        .number("Usados")
        .number("Disponibles")
        .number("% Uso")
        .text("Estado");
    for s in &r.sequences {
        sequences.row(vec![
            s.ncf_type.as_str().to_string(),
            s.description.clone(),
            format_count(s.current),
            format_count(s.max),
            format_count(s.used),
            format_count(s.remaining),
            format_percent(s.percentage),
            s.status.label().to_string(),
        ]);
    }

    let compliance = Section::key_values(
        "Cumplimiento",
        vec![
            ("Ventas del período", format_count(r.compliance.total_sales)),
            ("NCF duplicados", format_count(r.compliance.duplicate_count)),
            ("NCF con formato inválido", format_count(r.compliance.invalid_format_count)),
            ("Puntuación", format_decimal(r.compliance.compliance_score)),
            ("Consumo diario promedio", format_decimal(r.depletion.average_daily_consumption)),
            (
                "Días estimados restantes",
                r.depletion
                    .estimated_days_remaining
                    .map(format_decimal)
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ],
    );

    let mut issues = Section::new("Incidencias").long_text("Detalle", 110);
    for issue in &r.compliance.issues {
        issues.row(vec![issue.message.clone()]);
    }

    let by_type = group_table("Uso por Tipo", "Tipo NCF", &r.usage_by_type, str::to_string);

    vec![sequences, compliance, issues, by_type]
}

fn inventory(r: &InventoryReport) -> Vec<Section> {
    let s = &r.summary;
    let summary = Section::key_values(
        "Resumen de Inventario",
        vec![
            ("Productos", format_count(s.total_products)),
            ("Unidades en stock", format_count(s.total_units)),
            ("Valor al costo", format_currency(s.cost_value)),
            ("Valor de venta", format_currency(s.retail_value)),
            ("Ganancia potencial", format_currency(s.potential_profit)),
            ("Agotados", format_count(s.out_of_stock)),
            ("Stock bajo", format_count(s.low_stock)),
            ("Reordenar pronto", format_count(s.reorder_soon)),
            ("Disponibles", format_count(s.in_stock)),
        ],
    );

    let mut categories = Section::new("Por Categoría")
        .long_text("Categoría", 30)
        .number("Productos")
        .number("Unidades")
        .number("Valor venta")
        .number("Vendidos 30d")
        .number("Atención");
    for c in &r.categories {
        categories.row(vec![
            c.name.clone(),
            format_count(c.product_count),
            format_count(c.total_units),
            format_amount(c.retail_value),
            format_count(c.units_sold_30d),
            format_count(c.needs_attention),
        ]);
    }

    let product_table = |title: &str, rows: &[fisco_core::report::ProductStock]| {
        let mut section = Section::new(title)
            .long_text("Producto", 35)
            .number("Stock")
            .number("Vendidos 30d")
            .number("Días de stock")
            .number("Rotación")
            .text("Estado");
        for p in rows {
            section.row(vec![
                p.name.clone(),
                format_count(p.stock),
                format_count(p.units_sold_30d),
                format_decimal(p.stock_days),
                format_ratio(p.turnover_rate),
                p.status.label().to_string(),
            ]);
        }
        section
    };

    vec![
        summary,
        categories,
        product_table("Productos", &r.products),
        product_table("Alto Valor sin Movimiento", &r.slow_movers),
    ]
}

fn customers(r: &CustomersReport) -> Vec<Section> {
    let s = &r.summary;
    let summary = Section::key_values(
        "Resumen de Clientes",
        vec![
            ("Clientes registrados", format_count(s.total_customers)),
            ("Clientes activos", format_count(s.active_customers)),
            ("Retención", format_ratio(s.retention_rate)),
            ("Ingresos", format_currency(s.total_revenue)),
            ("Gasto promedio", format_currency(s.average_spend)),
            ("RNC/Cédula válidos", format_count(s.valid_tax_ids)),
        ],
    );

    let mut segments = Section::new("Segmentos")
        .text("Tipo")
        .number("Clientes")
        .number("Activos")
        .number("Compras")
        .number("Ingresos");
    for seg in &r.segments {
        segments.row(vec![
            seg.label.clone(),
            format_count(seg.customers),
            format_count(seg.active),
            format_count(seg.purchases),
            format_amount(seg.revenue),
        ]);
    }

    let mut detail = Section::new("Clientes Activos")
        .long_text("Cliente", 30)
        .text("RNC/Cédula")
        .number("Compras")
        .number("Total")
        .number("Lealtad")
        .text("Nivel")
        .text("Pago preferido");
    for c in &r.customers {
        detail.row(vec![
            c.name.clone(),
            c.tax_id.clone().unwrap_or_default(),
            format_count(c.purchases),
            format_amount(c.total_spent),
            c.loyalty_score.to_string(),
            c.tier.label().to_string(),
            c.preferred_payment.map(|m| m.label().to_string()).unwrap_or_default(),
        ]);
    }

    let mut prefs = Section::new("Preferencias por Categoría")
        .long_text("Categoría", 30)
        .number("Unid. empresas")
        .number("Ingresos empresas")
        .number("Unid. personas")
        .number("Ingresos personas");
    for p in &r.category_preferences {
        prefs.row(vec![
            p.category.clone(),
            format_count(p.business_units),
            format_amount(p.business_revenue),
            format_count(p.individual_units),
            format_amount(p.individual_revenue),
        ]);
    }

    vec![summary, segments, detail, prefs]
}

fn audit(r: &AuditReport) -> Vec<Section> {
    let s = &r.summary;
    let summary = Section::key_values(
        "Resumen de Auditoría",
        vec![
            ("Transacciones", format_count(s.total_transactions)),
            ("Monto total", format_currency(s.total_amount)),
            ("Venta promedio", format_currency(s.average_sale)),
            ("Con NCF válido", format_count(s.with_valid_ncf)),
            ("Cumplimiento NCF", format_ratio(s.ncf_compliance_rate)),
            ("NCF duplicados", format_count(s.duplicate_ncf)),
            ("Efectivo / ingresos", format_percent(r.payment_risk.cash_percentage)),
            ("Riesgo", format!("{} ({})", r.risk.level.label(), r.risk.score)),
        ],
    );

    let mut cashiers = Section::new("Desempeño por Cajero")
        .long_text("Cajero", 30)
        .number("Ventas")
        .number("Total")
        .number("Promedio")
        .number("Efectivo")
        .number("Sin NCF");
    for c in &r.cashiers {
        cashiers.row(vec![
            c.name.clone(),
            format_count(c.transactions),
            format_amount(c.total),
            format_amount(c.average_sale),
            format_amount(c.cash_total),
            format_count(c.missing_ncf),
        ]);
    }

    let methods = group_table("Métodos de Pago", "Método", &r.payment_risk.by_method, payment_label);

    let mut high_value = Section::new("Transacciones de Alto Valor")
        .text("Fecha")
        .long_text("Cajero", 30)
        .text("NCF")
        .number("Total");
    for h in &r.high_value {
        high_value.row(vec![
            h.created_at.format("%d/%m/%Y %H:%M").to_string(),
            h.cashier.clone(),
            h.ncf.clone().unwrap_or_default(),
            format_amount(h.total),
        ]);
    }

    vec![summary, cashiers, methods, high_value]
}

fn dgii(r: &DgiiReport) -> Vec<Section> {
    let s = &r.summary;
    let summary = Section::key_values(
        "Resumen para la DGII",
        vec![
            ("Total de ventas", format_count(s.total_sales)),
            ("Base imponible", format_currency(s.taxable_base)),
            ("ITBIS", format_currency(s.total_tax)),
            ("Monto total", format_currency(s.total_amount)),
            ("Ventas con NCF", format_count(s.with_ncf)),
            ("Cobertura NCF", format_percent(s.ncf_coverage)),
            ("Ventas con RNC/Cédula", format_count(s.with_tax_id)),
            ("Cobertura RNC/Cédula", format_percent(s.tax_id_coverage)),
            ("Varianza de ITBIS", format_percent(r.variance.variance_pct)),
        ],
    );

    let by_type = group_table("Ventas por Tipo de NCF", "Tipo NCF", &r.by_ncf_type, str::to_string);

    vec![summary, by_type]
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_daily_sales;
    use super::*;
    use fisco_core::report::Priority;

    #[test]
    fn test_daily_sales_sections() {
        let sections = report_sections(&sample_daily_sales());
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles[0], "Resumen de Ventas");
        // no recommendations for daily sales
        assert!(!titles.contains(&"Recomendaciones"));

        assert_eq!(sections[0].rows[3], vec!["Monto total", "RD$3,000.00"]);
        let hourly = sections.iter().find(|s| s.title == "Ventas por Hora").unwrap();
        assert_eq!(hourly.rows, vec![vec!["10:00", "3", "3,000.00"]]);
    }

    #[test]
    fn test_rows_match_headers() {
        for section in report_sections(&sample_daily_sales()) {
            for row in &section.rows {
                assert_eq!(row.len(), section.columns.len(), "{}", section.title);
            }
        }
    }

    #[test]
    fn test_recommendation_section() {
        let recs = vec![Recommendation::new(Priority::High, "Revise el ITBIS")];
        let section = recommendations(&recs).unwrap();
        assert_eq!(section.rows[0][0], Priority::High.label());
        assert!(recommendations(&[]).is_none());
    }
}

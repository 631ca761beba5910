//! # Recommendations
//!
//! Turns report insights into a prioritized action list.
//!
//! ```text
//! ┌──────────────┬───────────────────────────────────────────┬──────────┐
//! │ Report       │ Trigger                                   │ Priority │
//! ├──────────────┼───────────────────────────────────────────┼──────────┤
//! │ ncf          │ usage > 90 % / depletion < 30 days        │ urgent   │
//! │ ncf          │ usage > 80 %                              │ high     │
//! │ ncf, audit   │ duplicate or malformed receipts           │ urgent   │
//! │ itbis, dgii  │ ITBIS variance over 0.01 %                │ high     │
//! │ inventory    │ out of stock / low stock                  │ high/med │
//! │ inventory    │ high-value slow movers                    │ low      │
//! │ customers    │ retention under 50 %                      │ medium   │
//! │ audit        │ cash concentration, high-value sales      │ med/high │
//! └──────────────┴───────────────────────────────────────────┴──────────┘
//! ```

use crate::compliance::{ComplianceSummary, DepletionEstimate, RenewalUrgency};
use crate::insights::{RiskAssessment, RiskLevel, TaxVariance};
use crate::money::Money;
use crate::report::{
    sort_recommendations, AuditSummary, CustomerInsight, CustomerSummary, DgiiSummary,
    InventorySummary, PaymentRisk, Priority, ProductStock, Recommendation, SequenceUsage,
    TrendDirection,
};

/// Retention ratio under which customer reactivation is suggested.
const LOW_RETENTION_RATE: f64 = 0.5;

/// DGII coverage (percent) under which missing receipts/tax ids are flagged.
const LOW_COVERAGE_PCT: f64 = 95.0;

fn finish(mut recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    sort_recommendations(&mut recommendations);
    recommendations
}

fn variance_recommendation(variance: &TaxVariance) -> Option<Recommendation> {
    (!variance.compliant).then(|| {
        Recommendation::new(
            Priority::High,
            format!(
                "El ITBIS cobrado ({}) difiere del esperado ({}) en {:.2}%. Revise la configuración de impuestos.",
                variance.actual, variance.expected, variance.variance_pct
            ),
        )
    })
}

fn receipt_recommendations(duplicates: i64, invalid: i64, out: &mut Vec<Recommendation>) {
    if duplicates > 0 {
        out.push(Recommendation::new(
            Priority::Urgent,
            format!("Se detectaron {duplicates} NCF duplicados. Anule y reemita los comprobantes afectados."),
        ));
    }
    if invalid > 0 {
        out.push(Recommendation::new(
            Priority::Urgent,
            format!("{invalid} NCF no cumplen el formato de la DGII. Corrija la numeración."),
        ));
    }
}

pub fn for_itbis(variance: &TaxVariance, trend: TrendDirection) -> Vec<Recommendation> {
    let mut out = Vec::new();
    out.extend(variance_recommendation(variance));
    if trend == TrendDirection::Decreasing {
        out.push(Recommendation::new(
            Priority::Low,
            "El ITBIS diario va en disminución. Compare con el volumen de ventas del período.",
        ));
    }
    finish(out)
}

pub fn for_ncf(
    sequences: &[SequenceUsage],
    compliance: &ComplianceSummary,
    depletion: &DepletionEstimate,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    for usage in sequences {
        match usage.urgency {
            RenewalUrgency::Urgent => out.push(Recommendation::new(
                Priority::Urgent,
                format!(
                    "Solicite nueva secuencia {} a la DGII: {:.1}% utilizada, quedan {}.",
                    usage.ncf_type, usage.percentage, usage.remaining
                ),
            )),
            RenewalUrgency::PlanRenewal => out.push(Recommendation::new(
                Priority::High,
                format!(
                    "Planifique la renovación de la secuencia {} ({:.1}% utilizada).",
                    usage.ncf_type, usage.percentage
                ),
            )),
            RenewalUrgency::None => {}
        }
    }

    if depletion.urgent {
        if let (Some(days), Some(ncf_type)) = (depletion.estimated_days_remaining, depletion.limiting_type) {
            out.push(Recommendation::new(
                Priority::Urgent,
                format!("La secuencia {ncf_type} se agotará en aproximadamente {days:.0} días al ritmo actual."),
            ));
        }
    }

    receipt_recommendations(compliance.duplicate_count, compliance.invalid_format_count, &mut out);
    finish(out)
}

pub fn for_inventory(summary: &InventorySummary, slow_movers: &[ProductStock]) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if summary.out_of_stock > 0 {
        out.push(Recommendation::new(
            Priority::High,
            format!("{} productos agotados. Reabastezca de inmediato.", summary.out_of_stock),
        ));
    }
    if summary.low_stock > 0 {
        out.push(Recommendation::new(
            Priority::Medium,
            format!("{} productos por debajo del stock mínimo.", summary.low_stock),
        ));
    }
    if summary.reorder_soon > 0 {
        out.push(Recommendation::new(
            Priority::Medium,
            format!("{} productos se agotarán en menos de 7 días.", summary.reorder_soon),
        ));
    }
    if !slow_movers.is_empty() {
        let value: Money = slow_movers.iter().map(|p| p.retail_value).sum();
        out.push(Recommendation::new(
            Priority::Low,
            format!(
                "{} productos sin ventas en 30 días inmovilizan {}. Considere promociones.",
                slow_movers.len(),
                value
            ),
        ));
    }

    finish(out)
}

pub fn for_customers(summary: &CustomerSummary, customers: &[CustomerInsight]) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if summary.total_customers > 0 && summary.retention_rate < LOW_RETENTION_RATE {
        out.push(Recommendation::new(
            Priority::Medium,
            format!(
                "Solo {:.0}% de los clientes compró en el período. Lance una campaña de reactivación.",
                summary.retention_rate * 100.0
            ),
        ));
    }

    let invalid_ids = customers.iter().filter(|c| !c.tax_id_valid).count();
    if invalid_ids > 0 {
        out.push(Recommendation::new(
            Priority::Medium,
            format!("{invalid_ids} clientes activos sin RNC/Cédula válido. Actualice sus datos fiscales."),
        ));
    }

    finish(out)
}

pub fn for_audit(
    summary: &AuditSummary,
    payment_risk: &PaymentRisk,
    risk: &RiskAssessment,
    high_value_count: usize,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if payment_risk.flagged {
        out.push(Recommendation::new(
            Priority::Medium,
            format!(
                "El efectivo representa {:.1}% de los ingresos. Refuerce los arqueos de caja.",
                payment_risk.cash_percentage
            ),
        ));
    }
    if high_value_count > 0 {
        let priority = if risk.level == RiskLevel::Low {
            Priority::Medium
        } else {
            Priority::High
        };
        out.push(Recommendation::new(
            priority,
            format!("Revise {high_value_count} transacciones de alto valor."),
        ));
    }
    let missing = summary.total_transactions - summary.with_valid_ncf - summary.duplicate_ncf;
    if missing > 0 {
        out.push(Recommendation::new(
            Priority::High,
            format!("{missing} ventas sin NCF válido."),
        ));
    }
    receipt_recommendations(summary.duplicate_ncf, 0, &mut out);

    finish(out)
}

pub fn for_dgii(summary: &DgiiSummary, variance: &TaxVariance) -> Vec<Recommendation> {
    let mut out = Vec::new();
    out.extend(variance_recommendation(variance));

    if summary.total_sales > 0 && summary.ncf_coverage < LOW_COVERAGE_PCT {
        out.push(Recommendation::new(
            Priority::High,
            format!(
                "{} ventas sin NCF ({:.1}% de cobertura).",
                summary.total_sales - summary.with_ncf,
                summary.ncf_coverage
            ),
        ));
    }
    if summary.total_sales > 0 && summary.tax_id_coverage < LOW_COVERAGE_PCT {
        out.push(Recommendation::new(
            Priority::Low,
            format!(
                "{:.1}% de las ventas identifican al comprador con RNC/Cédula válido.",
                summary.tax_id_coverage
            ),
        ));
    }

    finish(out)
}

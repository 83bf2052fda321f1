use super::super::domain::{Category, TaxType};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LedgerRowView {
    pub name: String,
    pub projection: f64,
    pub income: f64,
    pub deduction: f64,
    pub asset_value: f64,
    pub category: Category,
    pub category_label: &'static str,
    pub tax_types: String,
    pub deduction_types: String,
    pub income_types: String,
    pub alert_triggered: bool,
}

/// Table of the ledger evaluated against the threshold active when it was built.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerView {
    pub threshold: f64,
    pub alerting: usize,
    pub clients: Vec<LedgerRowView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMean {
    pub category: Category,
    pub category_label: &'static str,
    pub clients: usize,
    pub mean_projection: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxTypeMean {
    pub tax_type: TaxType,
    pub tax_type_label: &'static str,
    pub clients: usize,
    pub mean_projection: f64,
}

/// Datasets behind the projection distribution and per-group average charts.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub clients: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub histogram: Vec<HistogramBin>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category_means: Vec<CategoryMean>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tax_type_means: Vec<TaxTypeMean>,
}

use super::super::alert::AlertThreshold;
use super::super::domain::{Category, TaxType};
use super::super::ledger::{ClientLedger, ScoredClient};
use super::views::{
    CategoryMean, HistogramBin, LedgerRowView, LedgerSummary, LedgerView, TaxTypeMean,
};
use std::collections::HashMap;

pub const HISTOGRAM_BINS: usize = 10;

pub fn ledger_view(ledger: &ClientLedger, threshold: AlertThreshold) -> LedgerView {
    let clients: Vec<LedgerRowView> = ledger
        .entries()
        .iter()
        .map(|entry| row_view(entry, threshold))
        .collect();
    let alerting = clients.iter().filter(|row| row.alert_triggered).count();

    LedgerView {
        threshold: threshold.value(),
        alerting,
        clients,
    }
}

fn row_view(entry: &ScoredClient, threshold: AlertThreshold) -> LedgerRowView {
    let record = &entry.record;
    LedgerRowView {
        name: record.name.clone(),
        projection: entry.projection,
        income: record.income,
        deduction: record.deduction,
        asset_value: record.asset_value,
        category: record.category,
        category_label: record.category.label(),
        tax_types: record.tax_labels(),
        deduction_types: record.deduction_labels(),
        income_types: record.income_labels(),
        alert_triggered: entry.alert_triggered(threshold),
    }
}

pub fn ledger_summary(ledger: &ClientLedger) -> LedgerSummary {
    let projections: Vec<f64> = ledger.entries().iter().map(|entry| entry.projection).collect();

    LedgerSummary {
        clients: ledger.len(),
        histogram: histogram(&projections, HISTOGRAM_BINS),
        category_means: category_means(ledger),
        tax_type_means: tax_type_means(ledger),
    }
}

/// Equal-width bins spanning the observed range; the last bin includes its upper edge.
fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lower, upper) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (upper - lower) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in values {
        let index = (((value - lower) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| HistogramBin {
            lower: lower + width * index as f64,
            upper: if index + 1 == bins {
                upper
            } else {
                lower + width * (index + 1) as f64
            },
            count,
        })
        .collect()
}

#[derive(Default)]
struct Accumulator {
    total: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.total / self.count as f64
    }
}

fn category_means(ledger: &ClientLedger) -> Vec<CategoryMean> {
    let mut groups: HashMap<Category, Accumulator> = HashMap::new();
    for entry in ledger.entries() {
        groups
            .entry(entry.record.category)
            .or_default()
            .add(entry.projection);
    }

    Category::ordered()
        .into_iter()
        .filter_map(|category| {
            groups.get(&category).map(|acc| CategoryMean {
                category,
                category_label: category.label(),
                clients: acc.count,
                mean_projection: acc.mean(),
            })
        })
        .collect()
}

fn tax_type_means(ledger: &ClientLedger) -> Vec<TaxTypeMean> {
    let mut groups: HashMap<TaxType, Accumulator> = HashMap::new();
    for entry in ledger.entries() {
        for tax in &entry.record.tax_types {
            groups.entry(*tax).or_default().add(entry.projection);
        }
    }

    TaxType::ordered()
        .into_iter()
        .filter_map(|tax_type| {
            groups.get(&tax_type).map(|acc| TaxTypeMean {
                tax_type,
                tax_type_label: tax_type.label(),
                clients: acc.count,
                mean_projection: acc.mean(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::projection::domain::ClientRecord;
    use std::collections::BTreeSet;

    fn scored(name: &str, category: Category, taxes: &[TaxType], projection: f64) -> ScoredClient {
        ScoredClient::new(
            ClientRecord {
                name: name.to_string(),
                income: 1.0,
                deduction: 0.0,
                asset_value: 0.0,
                category,
                tax_types: taxes.iter().copied().collect(),
                deduction_types: BTreeSet::new(),
                income_types: BTreeSet::new(),
            },
            projection,
        )
    }

    fn sample_ledger() -> ClientLedger {
        let mut ledger = ClientLedger::new();
        ledger.merge_batch(vec![
            scored("Ana", Category::Autonomo, &[TaxType::Iva], 10.0),
            scored("Bruno", Category::Empresa, &[TaxType::Iva, TaxType::ImpuestoGanancias], 30.0),
            scored("Carla", Category::Empresa, &[], 110.0),
        ]);
        ledger
    }

    #[test]
    fn view_flags_clients_above_threshold() {
        let ledger = sample_ledger();
        let threshold = AlertThreshold::new(30.0).expect("valid");
        let view = ledger_view(&ledger, threshold);

        assert_eq!(view.clients.len(), 3);
        assert_eq!(view.alerting, 1);
        assert!(view.clients[2].alert_triggered);
        assert!(!view.clients[1].alert_triggered);
        assert_eq!(view.clients[1].tax_types, "IVA, Impuesto a las Ganancias");
    }

    #[test]
    fn histogram_spans_the_observed_range() {
        let summary = ledger_summary(&sample_ledger());

        assert_eq!(summary.histogram.len(), HISTOGRAM_BINS);
        assert_eq!(summary.histogram[0].lower, 10.0);
        assert_eq!(summary.histogram[HISTOGRAM_BINS - 1].upper, 110.0);
        assert_eq!(summary.histogram[0].count, 1);
        assert_eq!(summary.histogram[2].count, 1);
        assert_eq!(summary.histogram[HISTOGRAM_BINS - 1].count, 1);
        let total: usize = summary.histogram.iter().map(|bin| bin.count).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn histogram_of_identical_values_uses_unit_range() {
        let bins = histogram(&[500.0, 500.0], 10);
        assert_eq!(bins[0].lower, 499.5);
        assert_eq!(bins[9].upper, 500.5);
        assert_eq!(bins.iter().map(|bin| bin.count).sum::<usize>(), 2);
    }

    #[test]
    fn means_group_by_category_and_exploded_tax_type() {
        let summary = ledger_summary(&sample_ledger());

        assert_eq!(summary.category_means.len(), 2);
        assert_eq!(summary.category_means[0].category, Category::Autonomo);
        assert_eq!(summary.category_means[1].mean_projection, 70.0);
        assert_eq!(summary.category_means[1].clients, 2);

        assert_eq!(summary.tax_type_means.len(), 2);
        assert_eq!(summary.tax_type_means[0].tax_type, TaxType::Iva);
        assert_eq!(summary.tax_type_means[0].mean_projection, 20.0);
        assert_eq!(summary.tax_type_means[1].clients, 1);
    }

    #[test]
    fn empty_ledger_has_no_chart_data() {
        let summary = ledger_summary(&ClientLedger::new());
        assert_eq!(summary.clients, 0);
        assert!(summary.histogram.is_empty());
        assert!(summary.category_means.is_empty());
        assert!(summary.tax_type_means.is_empty());
    }
}

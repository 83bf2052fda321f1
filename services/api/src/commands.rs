use crate::cli::ScoringArgs;
use crate::infra::build_session;
use clap::Args;
use fiscal_projection::config::AppConfig;
use fiscal_projection::error::AppError;
use fiscal_projection::telemetry;
use fiscal_projection::workflows::projection::report::views::{LedgerSummary, LedgerView};
use fiscal_projection::workflows::projection::{
    BatchReport, ClientSubmission, SubmissionOutcome,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Client spreadsheet exported as CSV
    pub(crate) path: PathBuf,
    /// Print the per-category and per-tax-type summary after the ledger
    #[arg(long)]
    pub(crate) summary: bool,
    #[command(flatten)]
    pub(crate) scoring: ScoringArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Client name
    #[arg(long)]
    pub(crate) name: String,
    /// Declared income
    #[arg(long)]
    pub(crate) income: f64,
    /// Declared deductions
    #[arg(long, default_value_t = 0.0)]
    pub(crate) deduction: f64,
    /// Declared asset value
    #[arg(long, default_value_t = 0.0)]
    pub(crate) asset_value: f64,
    /// Client category (Autónomo, Empresa, Persona Física)
    #[arg(long)]
    pub(crate) category: String,
    /// Comma-separated tax types
    #[arg(long, value_delimiter = ',')]
    pub(crate) tax_types: Vec<String>,
    /// Comma-separated deduction types
    #[arg(long, value_delimiter = ',')]
    pub(crate) deduction_types: Vec<String>,
    /// Comma-separated income types
    #[arg(long, value_delimiter = ',')]
    pub(crate) income_types: Vec<String>,
    /// Print every encoded feature column
    #[arg(long)]
    pub(crate) show_features: bool,
    #[command(flatten)]
    pub(crate) scoring: ScoringArgs,
}

impl ScoreArgs {
    fn submission(&self) -> ClientSubmission {
        ClientSubmission {
            name: self.name.clone(),
            income: self.income,
            deduction: self.deduction,
            asset_value: self.asset_value,
            category: self.category.clone(),
            tax_types: self.tax_types.clone(),
            deduction_types: self.deduction_types.clone(),
            income_types: self.income_types.clone(),
        }
    }
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let mut session = build_session(&config.scoring, &args.scoring);

    let report = session.ingest_csv_path(&args.path)?;
    render_batch_report(&args.path, &report);
    render_ledger(&session.view());
    if args.summary {
        render_summary(&session.summary());
    }

    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let mut session = build_session(&config.scoring, &args.scoring);

    let outcome = session.submit(args.submission())?;
    render_outcome(&outcome, args.show_features);

    Ok(())
}

fn render_batch_report(path: &std::path::Path, report: &BatchReport) {
    println!("Client import: {}", path.display());
    println!(
        "- {} rows read | {} ingested | {} skipped | {} clients in ledger",
        report.rows_read,
        report.ingested,
        report.failures.len(),
        report.ledger_size
    );
    if !report.failures.is_empty() {
        println!("Skipped rows:");
        for failure in &report.failures {
            println!("  - line {}: {}", failure.line, failure.message);
        }
    }
    if !report.alerts.is_empty() {
        println!("Alerts:");
        for alert in &report.alerts {
            println!("  ! {}", alert.message);
        }
    }
}

fn render_ledger(view: &LedgerView) {
    println!(
        "\nClient ledger (threshold ${:.2}, {} alerting)",
        view.threshold, view.alerting
    );
    for row in &view.clients {
        let marker = if row.alert_triggered { "!" } else { "-" };
        println!(
            "  {} {} | {} | projection ${:.2} | income ${:.2} | taxes: {}",
            marker,
            row.name,
            row.category_label,
            row.projection,
            row.income,
            if row.tax_types.is_empty() {
                "none"
            } else {
                row.tax_types.as_str()
            }
        );
    }
}

fn render_summary(summary: &LedgerSummary) {
    println!("\nProjection distribution ({} clients)", summary.clients);
    for bin in &summary.histogram {
        println!(
            "  [{:>12.2}, {:>12.2}] {}",
            bin.lower,
            bin.upper,
            "#".repeat(bin.count)
        );
    }
    println!("Mean projection by category:");
    for mean in &summary.category_means {
        println!(
            "  - {}: ${:.2} across {} clients",
            mean.category_label, mean.mean_projection, mean.clients
        );
    }
    println!("Mean projection by tax type:");
    for mean in &summary.tax_type_means {
        println!(
            "  - {}: ${:.2} across {} clients",
            mean.tax_type_label, mean.mean_projection, mean.clients
        );
    }
}

fn render_outcome(outcome: &SubmissionOutcome, show_features: bool) {
    println!(
        "Projected fiscal obligation for {}: ${:.2}",
        outcome.client.name(),
        outcome.client.projection
    );
    match &outcome.alert {
        Some(alert) => println!("! {}", alert.message),
        None => println!("- below the alert threshold"),
    }
    if show_features {
        println!("Encoded features:");
        for (column, value) in outcome.features.iter() {
            println!("  {column}: {value}");
        }
    }
}

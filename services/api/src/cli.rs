use crate::commands::{run_import, run_score, ImportArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fiscal_projection::error::AppError;
use fiscal_projection::workflows::projection::AlertThreshold;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Fiscal Projection",
    about = "Score clients' fiscal obligations and flag projections above the alert threshold",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Import a client spreadsheet (CSV export) and print the resulting ledger
    Import(ImportArgs),
    /// Score a single client from command-line fields
    Score(ScoreArgs),
}

/// Overrides for the model artifact and alert threshold from the environment.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ScoringArgs {
    /// Path to the exported linear model (defaults to PROJECTION_MODEL_PATH)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Alert threshold in currency units (defaults to PROJECTION_ALERT_THRESHOLD)
    #[arg(long, value_parser = crate::infra::parse_threshold)]
    pub(crate) threshold: Option<AlertThreshold>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) scoring: ScoringArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Import(args) => run_import(args),
        Command::Score(args) => run_score(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_score_command_with_tag_lists() {
        let cli = Cli::try_parse_from([
            "fiscal-projection",
            "score",
            "--name",
            "Andes SRL",
            "--income",
            "120000",
            "--category",
            "Empresa",
            "--tax-types",
            "IVA,Ingresos Brutos",
            "--threshold",
            "50000",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Score(args)) => {
                assert_eq!(args.name, "Andes SRL");
                assert_eq!(args.tax_types, vec!["IVA", "Ingresos Brutos"]);
                assert_eq!(args.deduction, 0.0);
                assert_eq!(
                    args.scoring.threshold.map(AlertThreshold::value),
                    Some(50_000.0)
                );
            }
            other => panic!("expected score command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_threshold_flag() {
        let result = Cli::try_parse_from([
            "fiscal-projection",
            "import",
            "clients.csv",
            "--threshold",
            "-5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["fiscal-projection"]).expect("no arguments parse");
        assert!(cli.command.is_none());
    }
}

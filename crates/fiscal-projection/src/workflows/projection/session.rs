use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use super::alert::{AlertThreshold, ProjectionAlert};
use super::domain::{ClientSubmission, ConversionError, RecordError};
use super::encoder::{FeatureEncoder, FeatureVector};
use super::ledger::{ClientLedger, ScoredClient};
use super::report::views::{LedgerSummary, LedgerView};
use super::report::{ledger_summary, ledger_view};
use super::scorer::{Scorer, ScoringError};
use crate::workflows::intake::{read_sheet, BatchImportError, SheetRow};

/// Error returned for a single client that could not be scored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl From<ConversionError> for SubmissionError {
    fn from(value: ConversionError) -> Self {
        Self::Record(RecordError::Conversion(value))
    }
}

impl SubmissionError {
    pub fn kind(&self) -> RowFailureKind {
        match self {
            SubmissionError::Record(RecordError::Schema(_)) => RowFailureKind::SchemaMismatch,
            SubmissionError::Record(RecordError::Conversion(_)) => RowFailureKind::Conversion,
            SubmissionError::Scoring(ScoringError::ModelUnavailable) => {
                RowFailureKind::ModelUnavailable
            }
            SubmissionError::Scoring(ScoringError::Inference(_)) => RowFailureKind::Inference,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub client: ScoredClient,
    pub raw_projection: f64,
    pub features: FeatureVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<ProjectionAlert>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowFailureKind {
    SchemaMismatch,
    Conversion,
    ModelUnavailable,
    Inference,
}

/// A spreadsheet row that was skipped, with the reason shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    pub line: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    pub kind: RowFailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub rows_read: usize,
    pub ingested: usize,
    pub ledger_size: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RowFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<ProjectionAlert>,
}

/// Owns the scorer, the client ledger and the active alert threshold.
///
/// Form submissions and spreadsheet imports both run through
/// encode, score and merge here.
#[derive(Debug)]
pub struct ProjectionSession {
    scorer: Scorer,
    ledger: ClientLedger,
    threshold: AlertThreshold,
}

impl ProjectionSession {
    pub fn new(scorer: Scorer, threshold: AlertThreshold) -> Self {
        Self {
            scorer,
            ledger: ClientLedger::new(),
            threshold,
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn ledger(&self) -> &ClientLedger {
        &self.ledger
    }

    pub fn threshold(&self) -> AlertThreshold {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: AlertThreshold) {
        info!(
            previous = self.threshold.value(),
            threshold = threshold.value(),
            "alert threshold updated"
        );
        self.threshold = threshold;
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.ledger.clear();
        info!(removed, "client ledger cleared");
        removed
    }

    pub fn view(&self) -> LedgerView {
        ledger_view(&self.ledger, self.threshold)
    }

    pub fn summary(&self) -> LedgerSummary {
        ledger_summary(&self.ledger)
    }

    /// Scores one client; on any error the ledger is left untouched.
    pub fn submit(
        &mut self,
        submission: ClientSubmission,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let (client, features, raw_projection) = self.score_submission(submission)?;

        // Evaluated on the stored cent-rounded projection, matching the ledger view.
        let alert = client
            .alert_triggered(self.threshold)
            .then(|| ProjectionAlert::new(client.name(), client.projection, self.threshold));
        if let Some(alert) = &alert {
            warn!(client = %alert.client, projection = alert.projection, threshold = alert.threshold, "projection above alert threshold");
        }

        self.ledger.merge_one(client.clone());
        info!(client = %client.name(), projection = client.projection, "client projection recorded");

        Ok(SubmissionOutcome {
            client,
            raw_projection,
            features,
            alert,
        })
    }

    pub fn ingest_csv_path<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<BatchReport, BatchImportError> {
        let file = std::fs::File::open(path)?;
        self.ingest_csv(file)
    }

    /// Imports a spreadsheet export. File-level problems reject the whole
    /// import; rows that fail are skipped and listed in the report.
    pub fn ingest_csv<R: Read>(&mut self, reader: R) -> Result<BatchReport, BatchImportError> {
        let rows = read_sheet(reader)?;
        let rows_read = rows.len();
        let mut scored = Vec::with_capacity(rows_read);
        let mut failures = Vec::new();

        for SheetRow {
            line,
            client,
            submission,
        } in rows
        {
            let result = submission
                .map_err(SubmissionError::from)
                .and_then(|submission| self.score_submission(submission));

            match result {
                Ok((entry, _, _)) => scored.push(entry),
                Err(error) => {
                    warn!(line, client = ?client, %error, "skipping client row");
                    failures.push(RowFailure {
                        line,
                        client,
                        kind: error.kind(),
                        message: error.to_string(),
                    });
                }
            }
        }

        let ingested = scored.len();
        let batch_names: HashSet<String> = scored
            .iter()
            .map(|entry| entry.name().to_string())
            .collect();

        self.ledger.merge_batch(scored);

        // Alerts follow ledger order and reflect the entry that survived the merge.
        let alerts = self
            .ledger
            .entries()
            .iter()
            .filter(|entry| batch_names.contains(entry.name()))
            .filter(|entry| entry.alert_triggered(self.threshold))
            .map(|entry| ProjectionAlert::new(entry.name(), entry.projection, self.threshold))
            .collect::<Vec<_>>();

        info!(
            rows_read,
            ingested,
            failed = failures.len(),
            alerts = alerts.len(),
            ledger_size = self.ledger.len(),
            "client spreadsheet processed"
        );

        Ok(BatchReport {
            rows_read,
            ingested,
            ledger_size: self.ledger.len(),
            failures,
            alerts,
        })
    }

    fn score_submission(
        &self,
        submission: ClientSubmission,
    ) -> Result<(ScoredClient, FeatureVector, f64), SubmissionError> {
        let (record, features) = FeatureEncoder::encode_submission(submission)?;
        let raw_projection = self.scorer.score(&features)?;
        debug!(client = %record.name, raw_projection, "client scored");
        Ok((ScoredClient::new(record, raw_projection), features, raw_projection))
    }
}

//! Client fiscal-obligation projections.
//!
//! Raw client data is validated against the fixed feature schema, encoded
//! into a model row, scored by the loaded regression model and merged into
//! the session's client ledger, where alerts are derived against the
//! operator's threshold.

pub mod alert;
pub mod domain;
mod encoder;
mod ledger;
pub mod model;
pub mod report;
pub mod router;
mod schema;
mod scorer;
pub mod session;

#[cfg(test)]
mod tests;

pub use alert::{
    AlertEvaluator, AlertThreshold, ProjectionAlert, ThresholdError, DEFAULT_ALERT_THRESHOLD,
};
pub use domain::{
    Category, ClientRecord, ClientSubmission, ConversionError, DeductionType, IncomeType,
    RecordError, RecordField, SchemaMismatch, TaxType,
};
pub use encoder::{protective_ratio, FeatureEncoder, FeatureVector};
pub use ledger::{ClientLedger, ScoredClient};
pub use model::{
    InferenceError, LinearProjectionModel, ModelLoadError, ProjectionModel, DEFAULT_MODEL_PATH,
};
pub use router::{projection_router, SharedSession};
pub use schema::{FeatureSchema, FEATURE_COUNT};
pub use scorer::{round_projection, Scorer, ScoringError};
pub use session::{
    BatchReport, ProjectionSession, RowFailure, RowFailureKind, SubmissionError,
    SubmissionOutcome,
};

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::intake::BatchImportError;
use crate::workflows::projection::{
    ModelLoadError, RecordError, ScoringError, SubmissionError, ThresholdError,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Model(ModelLoadError),
    Import(BatchImportError),
    Submission(SubmissionError),
    Threshold(ThresholdError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Import(BatchImportError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Submission(SubmissionError::Record(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Submission(SubmissionError::Scoring(ScoringError::ModelUnavailable))
            | AppError::Model(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Threshold(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Submission(SubmissionError::Scoring(ScoringError::Inference(_)))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Model(err) => write!(f, "model error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Submission(SubmissionError::Record(RecordError::Schema(err))) => {
                write!(f, "schema mismatch: {}", err)
            }
            AppError::Submission(err) => write!(f, "{}", err),
            AppError::Threshold(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Model(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Submission(err) => Some(err),
            AppError::Threshold(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ModelLoadError> for AppError {
    fn from(value: ModelLoadError) -> Self {
        Self::Model(value)
    }
}

impl From<BatchImportError> for AppError {
    fn from(value: BatchImportError) -> Self {
        Self::Import(value)
    }
}

impl From<SubmissionError> for AppError {
    fn from(value: SubmissionError) -> Self {
        Self::Submission(value)
    }
}

impl From<ThresholdError> for AppError {
    fn from(value: ThresholdError) -> Self {
        Self::Threshold(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::FileFormatError;
    use crate::workflows::projection::ConversionError;

    #[test]
    fn maps_domain_errors_to_statuses() {
        let missing = AppError::from(BatchImportError::from(FileFormatError::MissingColumn(
            "Activo",
        )));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let blank = AppError::from(SubmissionError::from(ConversionError::BlankName));
        assert_eq!(blank.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let degraded = AppError::from(SubmissionError::Scoring(ScoringError::ModelUnavailable));
        assert_eq!(degraded.status(), StatusCode::SERVICE_UNAVAILABLE);

        let threshold = AppError::from(ThresholdError::Invalid(-1.0));
        assert_eq!(threshold.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

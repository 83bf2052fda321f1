use std::fmt;
use std::sync::Arc;

use super::encoder::FeatureVector;
use super::model::{InferenceError, ProjectionModel};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("projection model is unavailable; scoring is disabled until it loads")]
    ModelUnavailable,
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Wraps the process-wide model. A scorer built without a model fails every
/// call with [`ScoringError::ModelUnavailable`].
#[derive(Clone)]
pub struct Scorer {
    model: Option<Arc<dyn ProjectionModel>>,
}

impl Scorer {
    pub fn new(model: Arc<dyn ProjectionModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn unavailable() -> Self {
        Self { model: None }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn score(&self, vector: &FeatureVector) -> Result<f64, ScoringError> {
        let model = self.model.as_ref().ok_or(ScoringError::ModelUnavailable)?;
        let predictions = model.predict(std::slice::from_ref(vector))?;

        match predictions.as_slice() {
            [projection] if projection.is_finite() => Ok(*projection),
            [projection] => Err(InferenceError(format!(
                "model returned a non-finite projection ({projection})"
            ))
            .into()),
            other => Err(InferenceError(format!(
                "model returned {} predictions for a single row",
                other.len()
            ))
            .into()),
        }
    }
}

impl fmt::Debug for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scorer")
            .field("available", &self.is_available())
            .finish()
    }
}

/// Rounds a projection to cents for storage and display.
///
/// Magnitudes too large to scale by 100 carry no cents and are returned as-is.
pub fn round_projection(value: f64) -> f64 {
    let cents = value * 100.0;
    if cents.is_finite() {
        cents.round() / 100.0
    } else {
        value
    }
}

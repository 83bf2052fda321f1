use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use super::encoder::FeatureVector;
use super::schema::{FeatureSchema, FEATURE_COUNT};

/// Artifact looked up in the working directory when no path is configured.
pub const DEFAULT_MODEL_PATH: &str = "modelo_predictivo.json";

/// Boundary to a pre-trained regression model.
///
/// Implementations receive rows already laid out in schema order and return
/// one prediction per row.
pub trait ProjectionModel: Send + Sync {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, InferenceError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("model inference failed: {0}")]
pub struct InferenceError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid model artifact: {0}")]
    Format(#[from] serde_json::Error),
    #[error("model artifact references unknown feature '{0}'")]
    UnknownFeature(String),
    #[error("model artifact has a non-finite weight for '{0}'")]
    NonFiniteWeight(String),
}

#[derive(Debug, Deserialize)]
struct LinearArtifact {
    intercept: f64,
    #[serde(default)]
    coefficients: BTreeMap<String, f64>,
}

/// Linear regression exported as JSON: an intercept plus one weight per feature column.
///
/// Columns absent from the artifact weigh zero.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProjectionModel {
    intercept: f64,
    weights: [f64; FEATURE_COUNT],
}

impl LinearProjectionModel {
    pub fn new(intercept: f64, weights: [f64; FEATURE_COUNT]) -> Self {
        Self { intercept, weights }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelLoadError> {
        let artifact: LinearArtifact = serde_json::from_reader(reader)?;
        if !artifact.intercept.is_finite() {
            return Err(ModelLoadError::NonFiniteWeight("intercept".to_string()));
        }

        let mut weights = [0.0; FEATURE_COUNT];
        for (column, weight) in artifact.coefficients {
            let index = FeatureSchema::index_of(&column)
                .ok_or_else(|| ModelLoadError::UnknownFeature(column.clone()))?;
            if !weight.is_finite() {
                return Err(ModelLoadError::NonFiniteWeight(column));
            }
            weights[index] = weight;
        }

        Ok(Self::new(artifact.intercept, weights))
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn weights(&self) -> &[f64; FEATURE_COUNT] {
        &self.weights
    }
}

impl ProjectionModel for LinearProjectionModel {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
        rows.iter()
            .map(|row| {
                let prediction = row
                    .values()
                    .iter()
                    .zip(self.weights.iter())
                    .fold(self.intercept, |acc, (value, weight)| acc + value * weight);
                if prediction.is_finite() {
                    Ok(prediction)
                } else {
                    Err(InferenceError(format!(
                        "prediction overflowed to {prediction}"
                    )))
                }
            })
            .collect()
    }
}

use serde::{Deserialize, Serialize};

pub const DEFAULT_ALERT_THRESHOLD: f64 = 100_000.0;

/// Stateless threshold check; the threshold is supplied on every call.
pub struct AlertEvaluator;

impl AlertEvaluator {
    /// True only when the projection is strictly above the threshold.
    pub fn evaluate(projection: f64, threshold: f64) -> bool {
        projection > threshold
    }
}

/// Operator-configured alert threshold, always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct AlertThreshold(f64);

impl AlertThreshold {
    pub fn new(value: f64) -> Result<Self, ThresholdError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(ThresholdError::Invalid(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_exceeded_by(self, projection: f64) -> bool {
        AlertEvaluator::evaluate(projection, self.0)
    }
}

impl Default for AlertThreshold {
    fn default() -> Self {
        Self(DEFAULT_ALERT_THRESHOLD)
    }
}

impl<'de> Deserialize<'de> for AlertThreshold {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        AlertThreshold::new(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("alert threshold must be a finite non-negative amount, got {0}")]
    Invalid(f64),
}

/// Raised when a scored client's projection exceeds the active threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionAlert {
    pub client: String,
    pub projection: f64,
    pub threshold: f64,
    pub message: String,
}

impl ProjectionAlert {
    pub fn new(client: &str, projection: f64, threshold: AlertThreshold) -> Self {
        let message = format!(
            "projection for '{}' (${:.2}) exceeds the alert threshold (${:.2})",
            client,
            projection,
            threshold.value()
        );
        Self {
            client: client.to_string(),
            projection,
            threshold: threshold.value(),
            message,
        }
    }
}

use crate::cli::ScoringArgs;
use fiscal_projection::config::ScoringConfig;
use fiscal_projection::workflows::projection::{
    AlertThreshold, LinearProjectionModel, ProjectionSession, Scorer,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) model_loaded: bool,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the model artifact once per process. A missing or invalid artifact
/// leaves the service in degraded mode instead of aborting startup.
pub(crate) fn load_scorer(path: &Path) -> Scorer {
    match LinearProjectionModel::from_path(path) {
        Ok(model) => {
            info!(path = %path.display(), "projection model loaded");
            Scorer::new(Arc::new(model))
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "projection model unavailable; scoring disabled");
            Scorer::unavailable()
        }
    }
}

pub(crate) fn build_session(config: &ScoringConfig, overrides: &ScoringArgs) -> ProjectionSession {
    let model_path = overrides
        .model
        .as_deref()
        .unwrap_or(config.model_path.as_path());
    let threshold = overrides.threshold.unwrap_or(config.alert_threshold);
    ProjectionSession::new(load_scorer(model_path), threshold)
}

pub(crate) fn parse_threshold(raw: &str) -> Result<AlertThreshold, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("failed to parse '{raw}' as an amount ({err})"))?;
    AlertThreshold::new(value).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_model_degrades_scorer() {
        let scorer = load_scorer(Path::new("./no-such-model.json"));
        assert!(!scorer.is_available());
    }

    #[test]
    fn overrides_take_precedence_over_config() {
        let config = ScoringConfig {
            model_path: PathBuf::from("./no-such-model.json"),
            alert_threshold: AlertThreshold::default(),
        };
        let overrides = ScoringArgs {
            model: Some(
                PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../modelo_predictivo.json"),
            ),
            threshold: Some(AlertThreshold::new(5_000.0).expect("valid")),
        };

        let session = build_session(&config, &overrides);

        assert!(session.scorer().is_available());
        assert_eq!(session.threshold().value(), 5_000.0);
    }

    #[test]
    fn threshold_parser_validates_amounts() {
        assert_eq!(
            parse_threshold(" 1500.5 ").map(AlertThreshold::value),
            Ok(1_500.5)
        );
        assert!(parse_threshold("mucho").is_err());
        assert!(parse_threshold("-1").is_err());
    }
}

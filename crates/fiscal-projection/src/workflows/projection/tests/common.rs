use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::projection::{
    AlertThreshold, ClientSubmission, FeatureSchema, FeatureVector, InferenceError,
    LinearProjectionModel, ProjectionModel, ProjectionSession, Scorer, SharedSession,
    FEATURE_COUNT,
};

pub(super) const HEADER: &str =
    "Cliente,Ingreso,Deduccion,Activo,Categoria,Tipos_Impuestos,Tipos_Deducciones,Tipos_Ingresos\n";

/// Projects each client at exactly its declared income.
pub(super) fn income_model() -> LinearProjectionModel {
    let mut weights = [0.0; FEATURE_COUNT];
    weights[FeatureSchema::index_of("monto_ingreso").expect("income column")] = 1.0;
    LinearProjectionModel::new(0.0, weights)
}

/// Fails inference for any client whose income is above `limit`.
pub(super) struct CappedModel {
    pub(super) limit: f64,
}

impl ProjectionModel for CappedModel {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
        rows.iter()
            .map(|row| {
                let income = row.get("monto_ingreso").unwrap_or_default();
                if income > self.limit {
                    Err(InferenceError(format!("income {income} outside training range")))
                } else {
                    Ok(income)
                }
            })
            .collect()
    }
}

pub(super) fn session() -> ProjectionSession {
    ProjectionSession::new(Scorer::new(Arc::new(income_model())), AlertThreshold::default())
}

pub(super) fn degraded_session() -> ProjectionSession {
    ProjectionSession::new(Scorer::unavailable(), AlertThreshold::default())
}

pub(super) fn shared(session: ProjectionSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

pub(super) fn submission(name: &str, income: f64) -> ClientSubmission {
    ClientSubmission {
        name: name.to_string(),
        income,
        deduction: 20_000.0,
        asset_value: 400_000.0,
        category: "Persona Física".to_string(),
        tax_types: vec!["IVA".to_string()],
        deduction_types: vec!["Gastos Médicos".to_string()],
        income_types: vec!["Venta de Bienes".to_string()],
    }
}

pub(super) fn sheet(rows: &[&str]) -> String {
    let mut csv = HEADER.to_string();
    for row in rows {
        csv.push_str(row);
        csv.push('\n');
    }
    csv
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

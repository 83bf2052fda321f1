use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::domain::{ClientRecord, ClientSubmission, RecordError};
use super::schema::{
    FeatureSchema, ASSET_INCOME_RATIO, ASSET_VALUE, DEDUCTION_AMOUNT, DEDUCTION_INCOME_RATIO,
    FEATURE_COUNT, INCOME_AMOUNT,
};

/// One model row: exactly the schema's columns, in schema order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    fn zeroed() -> Self {
        Self {
            values: [0.0; FEATURE_COUNT],
        }
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        FeatureSchema::index_of(column).map(|index| self.values[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FeatureSchema::columns()
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}

impl Serialize for FeatureVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}

/// Maps client records onto the model's feature layout.
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn encode(record: &ClientRecord) -> FeatureVector {
        let mut vector = FeatureVector::zeroed();
        let values = &mut vector.values;

        values[INCOME_AMOUNT] = record.income;
        values[DEDUCTION_AMOUNT] = record.deduction;
        values[ASSET_VALUE] = record.asset_value;
        values[DEDUCTION_INCOME_RATIO] = protective_ratio(record.deduction, record.income);
        values[ASSET_INCOME_RATIO] = protective_ratio(record.asset_value, record.income);

        values[FeatureSchema::category_column(record.category)] = 1.0;
        for tax in &record.tax_types {
            values[FeatureSchema::tax_column(*tax)] = 1.0;
        }
        for deduction in &record.deduction_types {
            values[FeatureSchema::deduction_column(*deduction)] = 1.0;
        }
        for income in &record.income_types {
            values[FeatureSchema::income_column(*income)] = 1.0;
        }

        vector
    }

    /// Validate a raw submission and encode it, returning the typed record alongside.
    pub fn encode_submission(
        submission: ClientSubmission,
    ) -> Result<(ClientRecord, FeatureVector), RecordError> {
        let record = submission.validate()?;
        let vector = Self::encode(&record);
        Ok((record, vector))
    }
}

/// Division that yields 0 for a zero denominator.
pub fn protective_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

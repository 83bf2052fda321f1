use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::schema::FeatureSchema;

/// Fiscal classification of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Autónomo")]
    Autonomo,
    #[serde(rename = "Empresa")]
    Empresa,
    #[serde(rename = "Persona Física")]
    PersonaFisica,
}

impl Category {
    pub const fn ordered() -> [Category; 3] {
        [Self::Autonomo, Self::Empresa, Self::PersonaFisica]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Autonomo => "Autónomo",
            Self::Empresa => "Empresa",
            Self::PersonaFisica => "Persona Física",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ordered()
            .into_iter()
            .find(|category| category.label() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaxType {
    #[serde(rename = "IVA")]
    Iva,
    #[serde(rename = "Impuesto a las Ganancias")]
    ImpuestoGanancias,
    #[serde(rename = "Ingresos Brutos")]
    IngresosBrutos,
    #[serde(rename = "Monotributo")]
    Monotributo,
}

impl TaxType {
    pub const fn ordered() -> [TaxType; 4] {
        [
            Self::Iva,
            Self::ImpuestoGanancias,
            Self::IngresosBrutos,
            Self::Monotributo,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Iva => "IVA",
            Self::ImpuestoGanancias => "Impuesto a las Ganancias",
            Self::IngresosBrutos => "Ingresos Brutos",
            Self::Monotributo => "Monotributo",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ordered().into_iter().find(|tax| tax.label() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeductionType {
    #[serde(rename = "Aportes Seguridad Social")]
    AportesSeguridadSocial,
    #[serde(rename = "Gastos Deducibles")]
    GastosDeducibles,
    #[serde(rename = "Gastos Médicos")]
    GastosMedicos,
    #[serde(rename = "Inversiones")]
    Inversiones,
}

impl DeductionType {
    pub const fn ordered() -> [DeductionType; 4] {
        [
            Self::AportesSeguridadSocial,
            Self::GastosDeducibles,
            Self::GastosMedicos,
            Self::Inversiones,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AportesSeguridadSocial => "Aportes Seguridad Social",
            Self::GastosDeducibles => "Gastos Deducibles",
            Self::GastosMedicos => "Gastos Médicos",
            Self::Inversiones => "Inversiones",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ordered()
            .into_iter()
            .find(|deduction| deduction.label() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IncomeType {
    #[serde(rename = "Alquileres")]
    Alquileres,
    #[serde(rename = "Inversiones")]
    Inversiones,
    #[serde(rename = "Prestación de Servicios")]
    PrestacionServicios,
    #[serde(rename = "Venta de Bienes")]
    VentaBienes,
}

impl IncomeType {
    pub const fn ordered() -> [IncomeType; 4] {
        [
            Self::Alquileres,
            Self::Inversiones,
            Self::PrestacionServicios,
            Self::VentaBienes,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Alquileres => "Alquileres",
            Self::Inversiones => "Inversiones",
            Self::PrestacionServicios => "Prestación de Servicios",
            Self::VentaBienes => "Venta de Bienes",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ordered().into_iter().find(|income| income.label() == value)
    }
}

/// Input field of a client record, named after the spreadsheet column it is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Name,
    Income,
    Deduction,
    AssetValue,
    Category,
    TaxTypes,
    DeductionTypes,
    IncomeTypes,
}

impl RecordField {
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "Cliente",
            Self::Income => "Ingreso",
            Self::Deduction => "Deduccion",
            Self::AssetValue => "Activo",
            Self::Category => "Categoria",
            Self::TaxTypes => "Tipos_Impuestos",
            Self::DeductionTypes => "Tipos_Deducciones",
            Self::IncomeTypes => "Tipos_Ingresos",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A category or tag value with no matching feature column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("client '{client}': unknown {field} value '{value}'")]
pub struct SchemaMismatch {
    pub client: String,
    pub field: RecordField,
    pub value: String,
}

/// A malformed numeric field or missing identity on a single record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("client name must not be blank")]
    BlankName,
    #[error("{field} cell is not valid UTF-8 text")]
    InvalidText { field: RecordField },
    #[error("client '{client}': {field} value '{value}' is not a number")]
    NotANumber {
        client: String,
        field: RecordField,
        value: String,
    },
    #[error("client '{client}': {field} must be a finite non-negative amount, got {value}")]
    InvalidAmount {
        client: String,
        field: RecordField,
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Unvalidated client data as entered on the form or read from a spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSubmission {
    pub name: String,
    pub income: f64,
    pub deduction: f64,
    pub asset_value: f64,
    pub category: String,
    #[serde(default)]
    pub tax_types: Vec<String>,
    #[serde(default)]
    pub deduction_types: Vec<String>,
    #[serde(default)]
    pub income_types: Vec<String>,
}

impl ClientSubmission {
    /// Resolve every category and tag against the feature schema.
    pub fn validate(self) -> Result<ClientRecord, RecordError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ConversionError::BlankName.into());
        }

        let income = checked_amount(&name, RecordField::Income, self.income)?;
        let deduction = checked_amount(&name, RecordField::Deduction, self.deduction)?;
        let asset_value = checked_amount(&name, RecordField::AssetValue, self.asset_value)?;

        let category = FeatureSchema::parse_category(&name, &self.category)?;
        let tax_types = self
            .tax_types
            .iter()
            .map(|value| FeatureSchema::parse_tax_type(&name, value))
            .collect::<Result<BTreeSet<_>, _>>()?;
        let deduction_types = self
            .deduction_types
            .iter()
            .map(|value| FeatureSchema::parse_deduction_type(&name, value))
            .collect::<Result<BTreeSet<_>, _>>()?;
        let income_types = self
            .income_types
            .iter()
            .map(|value| FeatureSchema::parse_income_type(&name, value))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(ClientRecord {
            name,
            income,
            deduction,
            asset_value,
            category,
            tax_types,
            deduction_types,
            income_types,
        })
    }
}

fn checked_amount(client: &str, field: RecordField, value: f64) -> Result<f64, ConversionError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConversionError::InvalidAmount {
            client: client.to_string(),
            field,
            value,
        })
    }
}

/// Validated client financial record; `name` is the ledger key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub name: String,
    pub income: f64,
    pub deduction: f64,
    pub asset_value: f64,
    pub category: Category,
    pub tax_types: BTreeSet<TaxType>,
    pub deduction_types: BTreeSet<DeductionType>,
    pub income_types: BTreeSet<IncomeType>,
}

impl ClientRecord {
    pub fn tax_labels(&self) -> String {
        join_labels(self.tax_types.iter().map(|tax| tax.label()))
    }

    pub fn deduction_labels(&self) -> String {
        join_labels(self.deduction_types.iter().map(|deduction| deduction.label()))
    }

    pub fn income_labels(&self) -> String {
        join_labels(self.income_types.iter().map(|income| income.label()))
    }
}

fn join_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}

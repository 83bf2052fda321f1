use super::domain::{
    Category, DeductionType, IncomeType, RecordField, SchemaMismatch, TaxType,
};

/// Number of columns the projection model was trained on.
pub const FEATURE_COUNT: usize = 20;

static FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "tipo_cliente_Autónomo",
    "tipo_cliente_Empresa",
    "tipo_cliente_Persona Física",
    "tipo_impuesto_IVA",
    "tipo_impuesto_Impuesto a las Ganancias",
    "tipo_impuesto_Ingresos Brutos",
    "tipo_impuesto_Monotributo",
    "tipo_deduccion_Aportes Seguridad Social",
    "tipo_deduccion_Gastos Deducibles",
    "tipo_deduccion_Gastos Médicos",
    "tipo_deduccion_Inversiones",
    "tipo_ingreso_Alquileres",
    "tipo_ingreso_Inversiones",
    "tipo_ingreso_Prestación de Servicios",
    "tipo_ingreso_Venta de Bienes",
    "monto_ingreso",
    "monto_deduccion",
    "valor_activo",
    "deduccion_ingresos_ratio",
    "activo_ingreso_ratio",
];

const CATEGORY_OFFSET: usize = 0;
const TAX_OFFSET: usize = 3;
const DEDUCTION_OFFSET: usize = 7;
const INCOME_TYPE_OFFSET: usize = 11;

pub(crate) const INCOME_AMOUNT: usize = 15;
pub(crate) const DEDUCTION_AMOUNT: usize = 16;
pub(crate) const ASSET_VALUE: usize = 17;
pub(crate) const DEDUCTION_INCOME_RATIO: usize = 18;
pub(crate) const ASSET_INCOME_RATIO: usize = 19;

/// Column layout shared by the encoder and the model boundary.
///
/// Every enumerated value owns a fixed offset, so an encoded row can never
/// grow or reorder columns.
pub struct FeatureSchema;

impl FeatureSchema {
    pub fn columns() -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    pub const fn len() -> usize {
        FEATURE_COUNT
    }

    pub fn index_of(column: &str) -> Option<usize> {
        FEATURE_NAMES.iter().position(|name| *name == column)
    }

    pub const fn category_column(category: Category) -> usize {
        CATEGORY_OFFSET + category as usize
    }

    pub const fn tax_column(tax: TaxType) -> usize {
        TAX_OFFSET + tax as usize
    }

    pub const fn deduction_column(deduction: DeductionType) -> usize {
        DEDUCTION_OFFSET + deduction as usize
    }

    pub const fn income_column(income: IncomeType) -> usize {
        INCOME_TYPE_OFFSET + income as usize
    }

    pub fn parse_category(client: &str, value: &str) -> Result<Category, SchemaMismatch> {
        Category::from_label(value).ok_or_else(|| mismatch(client, RecordField::Category, value))
    }

    pub fn parse_tax_type(client: &str, value: &str) -> Result<TaxType, SchemaMismatch> {
        TaxType::from_label(value).ok_or_else(|| mismatch(client, RecordField::TaxTypes, value))
    }

    pub fn parse_deduction_type(client: &str, value: &str) -> Result<DeductionType, SchemaMismatch> {
        DeductionType::from_label(value)
            .ok_or_else(|| mismatch(client, RecordField::DeductionTypes, value))
    }

    pub fn parse_income_type(client: &str, value: &str) -> Result<IncomeType, SchemaMismatch> {
        IncomeType::from_label(value)
            .ok_or_else(|| mismatch(client, RecordField::IncomeTypes, value))
    }
}

fn mismatch(client: &str, field: RecordField, value: &str) -> SchemaMismatch {
    SchemaMismatch {
        client: client.to_string(),
        field,
        value: value.trim().to_string(),
    }
}

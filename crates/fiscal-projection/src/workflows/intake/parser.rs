use super::{BatchImportError, FileFormatError};
use crate::workflows::projection::{ClientSubmission, ConversionError, RecordField};
use std::io::Read;

const COLUMN_COUNT: usize = 8;

/// Columns every client spreadsheet must carry; extra columns are ignored.
pub const REQUIRED_COLUMNS: [RecordField; COLUMN_COUNT] = [
    RecordField::Name,
    RecordField::Income,
    RecordField::Deduction,
    RecordField::AssetValue,
    RecordField::Category,
    RecordField::TaxTypes,
    RecordField::DeductionTypes,
    RecordField::IncomeTypes,
];

/// One data row of the spreadsheet, converted as far as its cells allow.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub line: u64,
    pub client: Option<String>,
    pub submission: Result<ClientSubmission, ConversionError>,
}

pub fn read_sheet<R: Read>(reader: R) -> Result<Vec<SheetRow>, BatchImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers)?;
    let mut rows = Vec::new();

    // Cells are decoded one by one so bad text only fails its own row.
    for record in csv_reader.byte_records() {
        let record = record?;
        if record
            .iter()
            .all(|cell| cell.iter().all(u8::is_ascii_whitespace))
        {
            continue;
        }

        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or_default();
        rows.push(columns.row(line, &record));
    }

    Ok(rows)
}

struct ColumnIndex {
    positions: [usize; COLUMN_COUNT],
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, FileFormatError> {
        let names: Vec<&str> = headers.iter().map(normalize_header).collect();
        let mut positions = [0usize; COLUMN_COUNT];

        for (slot, field) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = names
                .iter()
                .position(|name| *name == field.column())
                .ok_or(FileFormatError::MissingColumn(field.column()))?;
        }

        Ok(Self { positions })
    }

    fn cell<'r>(
        &self,
        record: &'r csv::ByteRecord,
        field: RecordField,
    ) -> Result<&'r str, ConversionError> {
        let raw = REQUIRED_COLUMNS
            .iter()
            .position(|candidate| *candidate == field)
            .and_then(|slot| record.get(self.positions[slot]))
            .unwrap_or_default();

        std::str::from_utf8(raw)
            .map(str::trim)
            .map_err(|_| ConversionError::InvalidText { field })
    }

    fn row(&self, line: u64, record: &csv::ByteRecord) -> SheetRow {
        let name = self.cell(record, RecordField::Name);
        let client = name
            .as_ref()
            .ok()
            .filter(|name| !name.is_empty())
            .map(|name| name.to_string());

        SheetRow {
            line,
            client,
            submission: name.and_then(|name| self.submission(name, record)),
        }
    }

    fn submission(
        &self,
        name: &str,
        record: &csv::ByteRecord,
    ) -> Result<ClientSubmission, ConversionError> {
        if name.is_empty() {
            return Err(ConversionError::BlankName);
        }

        let amount = |field: RecordField| parse_amount(name, field, self.cell(record, field)?);

        Ok(ClientSubmission {
            name: name.to_string(),
            income: amount(RecordField::Income)?,
            deduction: amount(RecordField::Deduction)?,
            asset_value: amount(RecordField::AssetValue)?,
            category: self.cell(record, RecordField::Category)?.to_string(),
            tax_types: split_tags(self.cell(record, RecordField::TaxTypes)?),
            deduction_types: split_tags(self.cell(record, RecordField::DeductionTypes)?),
            income_types: split_tags(self.cell(record, RecordField::IncomeTypes)?),
        })
    }
}

fn normalize_header(value: &str) -> &str {
    value.trim_start_matches('\u{feff}').trim()
}

fn parse_amount(client: &str, field: RecordField, raw: &str) -> Result<f64, ConversionError> {
    raw.parse::<f64>()
        .map_err(|_| ConversionError::NotANumber {
            client: client.to_string(),
            field,
            value: raw.to_string(),
        })
}

/// Splits a comma-separated tag cell, trimming each tag and dropping empty segments.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

//! CSV text to [`Row`]s.
//!
//! The first record is always the header. Data cells are looked up by
//! header name, so uploads may order their columns freely. Decoding stops
//! at the first bad record and returns no rows at all in that case.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;

use crate::error::{DecodeError, DecodeResult};
use crate::models::{Column, CsvFormat, Row, COLUMN_COUNT};

const BOM: char = '\u{feff}';

/// Decode CSV text into rows numbered from 1 in input order.
///
/// # Example
/// ```ignore
/// use codelist::{decode, CsvFormat};
///
/// let csv = "source,codeListCode,code,displayValue,longDescription,fromDate,toDate,sortingPriority\r\n\
///            ZIB,ZIB001,271636001,Polsslag regelmatig,,01-01-2019,,1\r\n";
/// let rows = decode(csv, &CsvFormat::default()).unwrap();
///
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].row_number, 1);
/// assert_eq!(rows[0].long_description, None);
/// ```
pub fn decode(content: &str, format: &CsvFormat) -> DecodeResult<Vec<Row>> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    if content.trim().is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(format.delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(DecodeError::EmptyInput),
    };
    let index = HeaderIndex::from_header(&header, format)?;

    let mut seen_codes: HashMap<String, usize> = HashMap::new();
    let mut rows = Vec::new();

    for (position, record) in records.enumerate() {
        let row_number = position + 1;
        let record = record?;
        rows.push(index.decode_row(&record, row_number, &mut seen_codes)?);
    }

    Ok(rows)
}

/// Header name to record position, for one decode call.
struct HeaderIndex<'f> {
    format: &'f CsvFormat,
    positions: [usize; COLUMN_COUNT],
}

impl<'f> HeaderIndex<'f> {
    fn from_header(header: &StringRecord, format: &'f CsvFormat) -> DecodeResult<Self> {
        // later duplicates of a header name win
        let by_name: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(position, name)| (name, position))
            .collect();

        let mut positions = [0; COLUMN_COUNT];
        for column in Column::ALL {
            let name = format.header(column);
            positions[column.index()] =
                *by_name
                    .get(name)
                    .ok_or_else(|| DecodeError::MissingColumn {
                        column: name.to_string(),
                    })?;
        }

        Ok(Self { format, positions })
    }

    fn decode_row(
        &self,
        record: &StringRecord,
        row: usize,
        seen_codes: &mut HashMap<String, usize>,
    ) -> DecodeResult<Row> {
        let code = self.cell(record, row, Column::Code)?;
        if code.is_empty() {
            return Err(DecodeError::BlankCode { row });
        }
        if let Some(&first_row) = seen_codes.get(code) {
            return Err(DecodeError::DuplicateCode {
                code: code.to_string(),
                row,
                first_row,
            });
        }
        seen_codes.insert(code.to_string(), row);

        Ok(Row {
            row_number: row,
            source: self.text(record, row, Column::Source)?,
            code_list_code: self.text(record, row, Column::CodeListCode)?,
            code: code.to_string(),
            display_value: self.text(record, row, Column::DisplayValue)?,
            long_description: self.text(record, row, Column::LongDescription)?,
            from_date: self.date(record, row, Column::FromDate)?,
            to_date: self.date(record, row, Column::ToDate)?,
            sorting_priority: self.priority(record, row, Column::SortingPriority)?,
        })
    }

    fn cell<'r>(&self, record: &'r StringRecord, row: usize, column: Column) -> DecodeResult<&'r str> {
        record
            .get(self.positions[column.index()])
            .ok_or_else(|| DecodeError::MissingField {
                row,
                column: self.format.header(column).to_string(),
            })
    }

    fn text(&self, record: &StringRecord, row: usize, column: Column) -> DecodeResult<Option<String>> {
        let value = self.cell(record, row, column)?;
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    fn date(&self, record: &StringRecord, row: usize, column: Column) -> DecodeResult<Option<NaiveDate>> {
        let value = self.cell(record, row, column)?;
        if value.is_empty() {
            return Ok(None);
        }
        if !matches_fixed_width(value, self.format.date_format) {
            return Err(self.malformed(row, column, value, "expected a dd-MM-yyyy date".to_string()));
        }
        NaiveDate::parse_from_str(value, self.format.date_format)
            .map(Some)
            .map_err(|e| self.malformed(row, column, value, format!("expected a dd-MM-yyyy date ({e})")))
    }

    fn priority(&self, record: &StringRecord, row: usize, column: Column) -> DecodeResult<Option<u64>> {
        let value = self.cell(record, row, column)?;
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse::<u64>()
            .map(Some)
            .map_err(|e| self.malformed(row, column, value, format!("expected a non-negative integer ({e})")))
    }

    fn malformed(&self, row: usize, column: Column, value: &str, message: String) -> DecodeError {
        DecodeError::MalformedField {
            row,
            column: self.format.header(column).to_string(),
            value: value.to_string(),
            message,
        }
    }
}

/// Whether `value` has exactly the digit count of each numeric specifier in
/// `date_format` and the same literal separators.
///
/// chrono alone accepts `1-1-2019` or `01-01-19` for `%d-%m-%Y`. A format
/// using any other specifier is left to chrono.
fn matches_fixed_width(value: &str, date_format: &str) -> bool {
    let mut value = value.bytes();
    let mut spec = date_format.bytes();

    while let Some(b) = spec.next() {
        let width = match b {
            b'%' => match spec.next() {
                Some(b'd' | b'm') => 2,
                Some(b'Y') => 4,
                _ => return true,
            },
            literal => {
                if value.next() != Some(literal) {
                    return false;
                }
                continue;
            }
        };
        for _ in 0..width {
            if !value.next().is_some_and(|c| c.is_ascii_digit()) {
                return false;
            }
        }
    }

    value.next().is_none()
}

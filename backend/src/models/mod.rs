//! Domain models for the code-list pipeline.
//!
//! - [`Row`] - One decoded CSV data record
//! - [`CsvFile`] - A stored upload owning its rows
//! - [`FileId`] - Generated identifier of a stored upload
//! - [`Column`] / [`CsvFormat`] - The fixed wire format shared by decoder and encoder

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// Columns & format
// =============================================================================

/// Logical columns of a code-list CSV, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Source,
    CodeListCode,
    Code,
    DisplayValue,
    LongDescription,
    FromDate,
    ToDate,
    SortingPriority,
}

/// Number of logical columns.
pub const COLUMN_COUNT: usize = 8;

impl Column {
    /// All columns in canonical output order.
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Source,
        Column::CodeListCode,
        Column::Code,
        Column::DisplayValue,
        Column::LongDescription,
        Column::FromDate,
        Column::ToDate,
        Column::SortingPriority,
    ];

    /// Position in the canonical header list.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Canonical header names, indexed by [`Column::index`].
pub const CANONICAL_HEADERS: [&str; COLUMN_COUNT] = [
    "source",
    "codeListCode",
    "code",
    "displayValue",
    "longDescription",
    "fromDate",
    "toDate",
    "sortingPriority",
];

/// `dd-MM-yyyy`
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Media type accepted on upload.
pub const UPLOAD_MEDIA_TYPE: &str = "text/csv";

/// Media type sent on download.
pub const DOWNLOAD_MEDIA_TYPE: &str = "application/csv";

/// Wire format description.
///
/// The delimiter, record separator and date format are fixed; only the
/// header names can be swapped, which tests use to exercise name-driven
/// column lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFormat {
    pub delimiter: u8,
    pub date_format: &'static str,
    pub headers: [&'static str; COLUMN_COUNT],
}

impl CsvFormat {
    /// Header name configured for a column.
    pub fn header(&self, column: Column) -> &'static str {
        self.headers[column.index()]
    }
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            date_format: DATE_FORMAT,
            headers: CANONICAL_HEADERS,
        }
    }
}

// =============================================================================
// Row
// =============================================================================

/// One decoded CSV data record.
///
/// Optional fields are `None` when the source cell was blank; `code` is
/// never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    /// 1-based position in the uploaded file, header excluded.
    pub row_number: usize,
    pub source: Option<String>,
    pub code_list_code: Option<String>,
    pub code: String,
    pub display_value: Option<String>,
    pub long_description: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub sorting_priority: Option<u64>,
}

impl Row {
    /// Create a row with only the required fields set.
    pub fn new(row_number: usize, code: impl Into<String>) -> Self {
        Self {
            row_number,
            source: None,
            code_list_code: None,
            code: code.into(),
            display_value: None,
            long_description: None,
            from_date: None,
            to_date: None,
            sorting_priority: None,
        }
    }
}

// =============================================================================
// File identifier
// =============================================================================

/// Opaque identifier of a stored upload (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for FileId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for FileId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

// =============================================================================
// Stored file
// =============================================================================

/// A persisted upload: the original filename plus the rows it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvFile {
    pub id: FileId,
    pub original_filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub rows: Vec<Row>,
}

impl CsvFile {
    pub fn new(id: FileId, original_filename: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            id,
            original_filename: original_filename.into(),
            uploaded_at: Utc::now(),
            rows,
        }
    }

    /// Rows in upload order.
    pub fn rows_in_upload_order(&self) -> Vec<Row> {
        let mut rows = self.rows.clone();
        rows.sort_by_key(|row| row.row_number);
        rows
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order_matches_headers() {
        let format = CsvFormat::default();
        assert_eq!(format.header(Column::Source), "source");
        assert_eq!(format.header(Column::Code), "code");
        assert_eq!(format.header(Column::SortingPriority), "sortingPriority");
        for (i, column) in Column::ALL.iter().enumerate() {
            assert_eq!(column.index(), i);
        }
    }

    #[test]
    fn test_file_id_parse_and_display() {
        let id = FileId::generate();
        let parsed: FileId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<FileId>().is_err());
    }

    #[test]
    fn test_rows_in_upload_order() {
        let file = CsvFile::new(
            FileId::generate(),
            "codes.csv",
            vec![Row::new(3, "C"), Row::new(1, "A"), Row::new(2, "B")],
        );
        let codes: Vec<_> = file
            .rows_in_upload_order()
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_row_serializes_camel_case() {
        let mut row = Row::new(1, "271636001");
        row.from_date = NaiveDate::from_ymd_opt(2019, 1, 1);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["rowNumber"], 1);
        assert_eq!(json["code"], "271636001");
        assert_eq!(json["fromDate"], "2019-01-01");
        assert!(json["codeListCode"].is_null());
    }
}

//! [`Row`]s back to canonical CSV bytes.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::EncodeResult;
use crate::models::{CsvFormat, Row, COLUMN_COUNT};

/// Encode rows as CSV: the canonical header first, then one record per
/// row in the order given. Callers sort by `row_number` beforehand.
///
/// Output is CRLF-terminated and only quotes fields that need it, so the
/// same rows always produce the same bytes.
pub fn encode(rows: &[Row], format: &CsvFormat) -> EncodeResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(format.delimiter)
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(format.headers)?;
    for row in rows {
        writer.write_record(fields(row, format))?;
    }

    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Cell values in canonical column order; absent values are empty.
fn fields(row: &Row, format: &CsvFormat) -> [String; COLUMN_COUNT] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let date = |value: &Option<chrono::NaiveDate>| {
        value
            .map(|d| d.format(format.date_format).to_string())
            .unwrap_or_default()
    };

    [
        text(&row.source),
        text(&row.code_list_code),
        row.code.clone(),
        text(&row.display_value),
        text(&row.long_description),
        date(&row.from_date),
        date(&row.to_date),
        row.sorting_priority.map(|p| p.to_string()).unwrap_or_default(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str =
        "source,codeListCode,code,displayValue,longDescription,fromDate,toDate,sortingPriority\r\n";

    #[test]
    fn test_empty_rows_writes_header_only() {
        let bytes = encode(&[], &CsvFormat::default()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), HEADER);
    }

    #[test]
    fn test_full_row() {
        let row = Row {
            row_number: 1,
            source: Some("ZIB".into()),
            code_list_code: Some("ZIB001".into()),
            code: "271636001".into(),
            display_value: Some("Polsslag regelmatig".into()),
            long_description: Some("The long description".into()),
            from_date: NaiveDate::from_ymd_opt(2019, 1, 1),
            to_date: NaiveDate::from_ymd_opt(2020, 3, 9),
            sorting_priority: Some(12),
        };
        let bytes = encode(&[row], &CsvFormat::default()).unwrap();
        let expected = format!(
            "{HEADER}ZIB,ZIB001,271636001,Polsslag regelmatig,The long description,01-01-2019,09-03-2020,12\r\n"
        );
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_absent_fields_are_empty() {
        let bytes = encode(&[Row::new(1, "A1")], &CsvFormat::default()).unwrap();
        let expected = format!("{HEADER},,A1,,,,,\r\n");
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_quotes_only_when_needed() {
        let mut row = Row::new(1, "A1");
        row.display_value = Some("Hello, World".into());
        row.long_description = Some(r#"says "hi""#.into());
        let bytes = encode(&[row], &CsvFormat::default()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with(",,A1,\"Hello, World\",\"says \"\"hi\"\"\",,,\r\n"));
    }

    #[test]
    fn test_keeps_given_order() {
        let rows = vec![Row::new(2, "B"), Row::new(1, "A")];
        let bytes = encode(&rows, &CsvFormat::default()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.split("\r\n").collect();
        assert_eq!(lines[1], ",,B,,,,,");
        assert_eq!(lines[2], ",,A,,,,,");
    }

    #[test]
    fn test_deterministic() {
        let rows = vec![Row::new(1, "A"), Row::new(2, "B")];
        let first = encode(&rows, &CsvFormat::default()).unwrap();
        let second = encode(&rows, &CsvFormat::default()).unwrap();
        assert_eq!(first, second);
    }
}

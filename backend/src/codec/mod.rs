//! Code-list CSV codec.
//!
//! - [`decoder`] - validated, all-or-nothing CSV text to rows
//! - [`encoder`] - rows to canonical CSV bytes
//!
//! Both sides share one [`crate::models::CsvFormat`]: comma delimiter,
//! CRLF records, `dd-MM-yyyy` dates and the canonical header list.

pub mod decoder;
pub mod encoder;

pub use decoder::decode;
pub use encoder::encode;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CsvFormat, Row};
    use chrono::NaiveDate;

    fn sample_rows() -> Vec<Row> {
        let mut first = Row::new(1, "271636001");
        first.source = Some("ZIB".into());
        first.code_list_code = Some("ZIB001".into());
        first.display_value = Some("Polsslag regelmatig".into());
        first.long_description = Some("Regular, \"steady\" pulse".into());
        first.from_date = NaiveDate::from_ymd_opt(2019, 1, 1);
        first.sorting_priority = Some(1);

        let mut second = Row::new(2, "61086009");
        second.source = Some("ZIB".into());
        second.to_date = NaiveDate::from_ymd_opt(2021, 12, 31);
        second.sorting_priority = Some(0);

        vec![first, second, Row::new(3, "Type 2")]
    }

    #[test]
    fn test_decode_encode_roundtrip() {
        let format = CsvFormat::default();
        let rows = sample_rows();

        let bytes = encode(&rows, &format).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let decoded = decode(&text, &format).unwrap();

        assert_eq!(decoded, rows);
    }

    #[test]
    fn test_reencode_is_byte_stable() {
        let format = CsvFormat::default();
        let upload = "toDate,code,source,codeListCode,displayValue,longDescription,fromDate,sortingPriority\n\
                      , A1 ,ZIB,,Shown,,01-01-2019,  3\n\
                      31-12-2020,A2,,,,,,\n";

        let rows = decode(upload, &format).unwrap();
        let first = encode(&rows, &format).unwrap();
        let again = encode(&decode(std::str::from_utf8(&first).unwrap(), &format).unwrap(), &format).unwrap();

        assert_eq!(first, again);
        assert_eq!(
            String::from_utf8(first).unwrap(),
            "source,codeListCode,code,displayValue,longDescription,fromDate,toDate,sortingPriority\r\n\
             ZIB,,A1,Shown,,01-01-2019,,3\r\n\
             ,,A2,,,,31-12-2020,\r\n"
        );
    }
}

//! Comma-separated lead files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::{ErrorKind, ReaderBuilder, Trim};

use leaddesk_core::LeadRecord;

use super::{Columns, ParseError};

/// Read qualifying rows from a CSV file.
///
/// Records the reader cannot decode (bad UTF-8, broken quoting) are skipped
/// like any other unusable row. Only OS-level read failures are errors.
pub(super) fn read_records(path: &Path) -> Result<Vec<LeadRecord>, ParseError> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(BufReader::new(file));

    let columns = match reader.headers() {
        Ok(headers) => Columns::locate(headers.iter()),
        Err(err) => match err.into_kind() {
            ErrorKind::Io(io) => return Err(ParseError::Io(io)),
            other => {
                tracing::debug!(error = ?other, path = %path.display(), "unreadable CSV header row");
                None
            }
        },
    };

    let Some(columns) = columns else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    let mut skipped = 0_usize;

    for result in reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(err) => match err.into_kind() {
                ErrorKind::Io(io) => return Err(ParseError::Io(io)),
                other => {
                    tracing::debug!(error = ?other, "skipping unreadable CSV record");
                    skipped += 1;
                    continue;
                }
            },
        };

        match columns.record(|index| row.get(index)) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    tracing::debug!(
        path = %path.display(),
        accepted = records.len(),
        skipped,
        "parsed CSV upload"
    );

    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::super::{ParseError, parse_file};
    use super::*;

    fn write_csv(dir: &TempDir, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("leads.csv");
        fs::write(&path, contents).unwrap();
        path
    }

    fn names(records: &[LeadRecord]) -> Vec<&str> {
        records.iter().map(LeadRecord::first_name).collect()
    }

    #[test]
    fn test_reads_rows_in_order_and_trims() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            b"FirstName,Phone,Notes\n  Ada , +1 555 0100 , call after 5 \nGrace,555-0101,\n",
        );

        let records = parse_file(&path).unwrap();
        assert_eq!(names(&records), vec!["Ada", "Grace"]);
        assert_eq!(records[0].phone(), "+1 555 0100");
        assert_eq!(records[0].notes(), "call after 5");
        assert_eq!(records[1].notes(), "");
    }

    #[test]
    fn test_drops_rows_missing_required_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            b"FirstName,Phone,Notes\nAda,,no phone\n,555,no name\n   ,  ,\nLin,555-0102,ok\nShort\n",
        );

        let records = parse_file(&path).unwrap();
        assert_eq!(names(&records), vec!["Lin"]);
    }

    #[test]
    fn test_notes_column_is_optional() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, b"Phone,FirstName\n555-0100,Ada\n");

        let records = parse_file(&path).unwrap();
        assert_eq!(records, vec![LeadRecord::new("Ada", "555-0100", None).unwrap()]);
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, b"FirstName,Phone,Notes\n\"Ada\",\"555\",\"likes email, not calls\"\n");

        let records = parse_file(&path).unwrap();
        assert_eq!(records[0].notes(), "likes email, not calls");
    }

    #[test]
    fn test_bom_prefixed_header() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, b"\xEF\xBB\xBFFirstName,Phone\nAda,555\n");

        let records = parse_file(&path).unwrap();
        assert_eq!(names(&records), vec!["Ada"]);
    }

    #[test]
    fn test_empty_file_has_no_valid_data() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, b"");
        assert!(matches!(parse_file(&path), Err(ParseError::NoValidData)));
    }

    #[test]
    fn test_header_only_has_no_valid_data() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, b"FirstName,Phone,Notes\n");
        assert!(matches!(parse_file(&path), Err(ParseError::NoValidData)));
    }

    #[test]
    fn test_wrong_headers_have_no_valid_data() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, b"firstname,phone\nAda,555\n");
        assert!(matches!(parse_file(&path), Err(ParseError::NoValidData)));
    }

    #[test]
    fn test_unbalanced_quote_has_no_valid_data() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, b"FirstName,Phone\n\"Ada,555\nGrace,556\n");
        assert!(matches!(parse_file(&path), Err(ParseError::NoValidData)));
    }

    #[test]
    fn test_invalid_utf8_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, b"FirstName,Phone\n\xFF\xFE,555\nAda,556\n");

        let records = parse_file(&path).unwrap();
        assert_eq!(names(&records), vec!["Ada"]);
    }

    #[test]
    fn test_invalid_utf8_only_has_no_valid_data() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, b"\xFF\xFE\xFD\n\xC3\x28,\xA0\xA1\n");
        assert!(matches!(parse_file(&path), Err(ParseError::NoValidData)));
    }

    #[test]
    fn test_parsing_leaves_file_in_place() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, b"FirstName,Phone\nAda,555\n");
        parse_file(&path).unwrap();
        assert!(path.exists());
    }
}

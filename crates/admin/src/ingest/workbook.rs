//! Excel workbook lead files.

use std::fs::File;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use leaddesk_core::LeadRecord;

use super::{Columns, ParseError};

/// Read qualifying rows from the first worksheet of a workbook.
///
/// A file calamine cannot decode is treated as having no usable rows.
pub(super) fn read_records(path: &Path) -> Result<Vec<LeadRecord>, ParseError> {
    // calamine folds open failures into its format errors; surface them as I/O first.
    drop(File::open(path)?);

    let mut workbook = match open_workbook_auto(path) {
        Ok(workbook) => workbook,
        Err(err) => {
            tracing::debug!(error = %err, path = %path.display(), "unreadable workbook");
            return Ok(Vec::new());
        }
    };

    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };

    let range = match workbook.worksheet_range(&sheet) {
        Ok(range) => range,
        Err(err) => {
            tracing::debug!(error = %err, sheet, "unreadable worksheet");
            return Ok(Vec::new());
        }
    };

    let records = records_from_rows(range.rows());
    tracing::debug!(
        path = %path.display(),
        sheet,
        accepted = records.len(),
        "parsed workbook upload"
    );

    Ok(records)
}

/// Turn worksheet rows into records.
///
/// The first row that has any non-empty cell is the header row. Cells are
/// rendered as text, so a phone stored as a number is kept.
fn records_from_rows<'a>(rows: impl IntoIterator<Item = &'a [Data]>) -> Vec<LeadRecord> {
    let mut rows = rows
        .into_iter()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|cell| !cell.trim().is_empty()));

    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let Some(columns) = Columns::locate(header.iter().map(String::as_str)) else {
        return Vec::new();
    };

    rows.filter_map(|cells| columns.record(|index| cells.get(index).map(String::as_str)))
        .collect()
}

/// Render a cell as text.
///
/// Integral floats print without a fractional part (`5550100.0` becomes
/// `5550100`), matching how the number appears in the spreadsheet.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    use super::super::parse_file;
    use super::*;

    fn text(s: &str) -> Data {
        Data::String(s.to_owned())
    }

    fn parse(rows: &[Vec<Data>]) -> Vec<LeadRecord> {
        records_from_rows(rows.iter().map(Vec::as_slice))
    }

    #[test]
    fn test_numeric_cells_become_text() {
        assert_eq!(cell_text(&Data::Float(15_550_100_101.0)), "15550100101");
        assert_eq!(cell_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_text(&Data::Int(5_550_100)), "5550100");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_rows_with_numeric_phone() {
        let rows = vec![
            vec![text("FirstName"), text("Phone"), text("Notes")],
            vec![text(" Ada "), Data::Float(5_550_100.0), Data::Empty],
            vec![text("Grace"), Data::Int(5_550_101), Data::Float(3.0)],
        ];

        let records = parse(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].first_name(), "Ada");
        assert_eq!(records[0].phone(), "5550100");
        assert_eq!(records[0].notes(), "");
        assert_eq!(records[1].notes(), "3");
    }

    #[test]
    fn test_leading_blank_rows_are_skipped_before_header() {
        let rows = vec![
            vec![Data::Empty, Data::Empty],
            vec![text("Phone"), text("FirstName")],
            vec![Data::Empty, Data::Empty],
            vec![text("555"), text("Lin")],
        ];

        let records = parse(&rows);
        assert_eq!(records, vec![LeadRecord::new("Lin", "555", None).unwrap()]);
    }

    #[test]
    fn test_rows_missing_required_cells_are_dropped() {
        let rows = vec![
            vec![text("FirstName"), text("Phone")],
            vec![text("Ada"), Data::Empty],
            vec![text("   "), text("555")],
            vec![text("Short")],
            vec![text("Grace"), text("556")],
        ];

        let records = parse(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].first_name(), "Grace");
    }

    #[test]
    fn test_header_only_sheet_is_empty() {
        let rows = vec![vec![text("FirstName"), text("Phone"), text("Notes")]];
        assert!(parse(&rows).is_empty());
    }

    #[test]
    fn test_missing_required_header_is_empty() {
        let rows = vec![
            vec![text("Name"), text("Phone")],
            vec![text("Ada"), text("555")],
        ];
        assert!(parse(&rows).is_empty());
    }

    #[test]
    fn test_reads_first_sheet_of_real_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leads.xlsx");

        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        // Row 0 is left blank; the header sits on row 1.
        first.write_string(1, 0, "FirstName").unwrap();
        first.write_string(1, 1, "Phone").unwrap();
        first.write_string(1, 2, "Notes").unwrap();
        first.write_string(2, 0, " Ada ").unwrap();
        first.write_number(2, 1, 2_015_550_123.0).unwrap();
        first.write_string(2, 2, "hot").unwrap();
        first.write_string(3, 0, "Grace").unwrap();
        first.write_string(3, 1, "+44 121 234 5678").unwrap();
        first.write_string(4, 0, "No Phone").unwrap();

        let second = workbook.add_worksheet();
        second.write_string(0, 0, "FirstName").unwrap();
        second.write_string(0, 1, "Phone").unwrap();
        second.write_string(1, 0, "Ignored").unwrap();
        second.write_string(1, 1, "555").unwrap();
        workbook.save(&path).unwrap();

        let records = parse_file(&path).unwrap();
        assert_eq!(
            records,
            vec![
                LeadRecord::new("Ada", "2015550123", Some("hot")).unwrap(),
                LeadRecord::new("Grace", "+44 121 234 5678", None).unwrap(),
            ]
        );
    }

    #[test]
    fn test_corrupt_workbook_has_no_valid_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leads.xlsx");
        fs::write(&path, b"FirstName,Phone\nAda,555\n").unwrap();

        assert!(matches!(parse_file(&path), Err(ParseError::NoValidData)));
    }

    #[test]
    fn test_missing_workbook_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.xlsx");

        assert!(matches!(parse_file(&path), Err(ParseError::Io(_))));
    }
}

//! Tabular lead file parsing.
//!
//! Uploads arrive as delimited text (`.csv`) or spreadsheet workbooks
//! (`.xlsx`, `.xls`). The format is resolved once from the file extension
//! into a [`FileFormat`], and every format yields the same ordered
//! `Vec<LeadRecord>`.
//!
//! The header row must name the columns `FirstName`, `Phone` and,
//! optionally, `Notes` (case-sensitive). Rows without a first name or a
//! phone are dropped silently. A file that yields no rows at all - empty,
//! header-only, missing required columns, or malformed - fails with
//! [`ParseError::NoValidData`].
//!
//! Parsing only reads the file; removing it is the caller's job.

mod delimited;
mod workbook;

use std::path::Path;

use thiserror::Error;

use leaddesk_core::LeadRecord;

/// Header naming the contact's first name.
pub const FIRST_NAME_HEADER: &str = "FirstName";
/// Header naming the contact's phone number.
pub const PHONE_HEADER: &str = "Phone";
/// Header naming the optional free-text note.
pub const NOTES_HEADER: &str = "Notes";

/// Errors produced while turning an upload into lead records.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file extension is not a supported tabular format.
    #[error("unsupported file format '{extension}': upload a .csv, .xlsx or .xls file")]
    UnsupportedFormat { extension: String },

    /// The file contained no row with both a first name and a phone.
    #[error("no valid leads found: rows need non-empty {FIRST_NAME_HEADER} and {PHONE_HEADER} columns")]
    NoValidData,

    /// The file could not be opened or read.
    #[error("could not read uploaded file: {0}")]
    Io(#[from] std::io::Error),
}

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated text.
    DelimitedText,
    /// Excel workbook, first worksheet.
    Workbook,
}

impl FileFormat {
    /// Resolve the format from a file name or path (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::DelimitedText),
            "xlsx" | "xls" => Ok(Self::Workbook),
            _ => Err(ParseError::UnsupportedFormat {
                extension: if extension.is_empty() {
                    "(none)".to_owned()
                } else {
                    format!(".{extension}")
                },
            }),
        }
    }

    /// Read every qualifying row from `path`, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoValidData`] when no row qualifies and
    /// [`ParseError::Io`] when the file cannot be read.
    pub fn parse(self, path: &Path) -> Result<Vec<LeadRecord>, ParseError> {
        let records = match self {
            Self::DelimitedText => delimited::read_records(path)?,
            Self::Workbook => workbook::read_records(path)?,
        };

        if records.is_empty() {
            return Err(ParseError::NoValidData);
        }
        Ok(records)
    }
}

/// Parse a lead file, dispatching on its extension.
///
/// # Errors
///
/// See [`ParseError`].
pub fn parse_file(path: &Path) -> Result<Vec<LeadRecord>, ParseError> {
    FileFormat::from_path(path)?.parse(path)
}

/// Parse a lead file on the blocking thread pool.
///
/// # Errors
///
/// See [`ParseError`].
pub async fn parse_upload(path: &Path) -> Result<Vec<LeadRecord>, ParseError> {
    let format = FileFormat::from_path(path)?;
    let owned = path.to_owned();

    tokio::task::spawn_blocking(move || format.parse(&owned))
        .await
        .map_err(|e| ParseError::Io(std::io::Error::other(e)))?
}

/// Column positions of the recognized headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    first_name: usize,
    phone: usize,
    notes: Option<usize>,
}

impl Columns {
    /// Locate the recognized headers. The first occurrence of a name wins.
    ///
    /// Returns `None` when `FirstName` or `Phone` is missing, in which case
    /// no row of the file can qualify.
    fn locate<'a>(headers: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut first_name = None;
        let mut phone = None;
        let mut notes = None;

        for (index, header) in headers.into_iter().enumerate() {
            let slot = match header.trim().trim_start_matches('\u{feff}') {
                FIRST_NAME_HEADER => &mut first_name,
                PHONE_HEADER => &mut phone,
                NOTES_HEADER => &mut notes,
                _ => continue,
            };
            slot.get_or_insert(index);
        }

        Some(Self {
            first_name: first_name?,
            phone: phone?,
            notes,
        })
    }

    /// Build a record from one row, using `cell` to fetch a column's text.
    fn record<'r>(&self, cell: impl Fn(usize) -> Option<&'r str>) -> Option<LeadRecord> {
        LeadRecord::new(
            cell(self.first_name)?,
            cell(self.phone)?,
            self.notes.and_then(&cell),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            FileFormat::from_path(Path::new("leads.csv")).ok(),
            Some(FileFormat::DelimitedText)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("/tmp/Leads.XLSX")).ok(),
            Some(FileFormat::Workbook)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("old.xls")).ok(),
            Some(FileFormat::Workbook)
        );
    }

    #[test]
    fn test_unsupported_extensions() {
        for name in ["leads.txt", "leads.json", "leads", "leads.csv.bak"] {
            let err = FileFormat::from_path(&PathBuf::from(name)).unwrap_err();
            assert!(
                matches!(err, ParseError::UnsupportedFormat { .. }),
                "{name} should be unsupported"
            );
        }
    }

    #[test]
    fn test_unsupported_message_names_extension() {
        let err = FileFormat::from_path(Path::new("leads.txt")).unwrap_err();
        assert!(err.to_string().contains("'.txt'"));
    }

    #[test]
    fn test_locate_columns_any_order() {
        let columns = Columns::locate(["Notes", "Phone", "Email", "FirstName"]).unwrap();
        assert_eq!(columns.first_name, 3);
        assert_eq!(columns.phone, 1);
        assert_eq!(columns.notes, Some(0));
    }

    #[test]
    fn test_locate_columns_is_case_sensitive() {
        assert!(Columns::locate(["firstname", "phone"]).is_none());
        assert!(Columns::locate(["FirstName"]).is_none());
    }

    #[test]
    fn test_locate_columns_strips_bom_and_padding() {
        let columns = Columns::locate(["\u{feff}FirstName", " Phone "]).unwrap();
        assert_eq!(columns.first_name, 0);
        assert_eq!(columns.phone, 1);
        assert_eq!(columns.notes, None);
    }

    #[test]
    fn test_parse_missing_file_is_io_error() {
        let err = parse_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}

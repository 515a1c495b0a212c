//! Normalized lead record produced by the upload parser.

use serde::{Deserialize, Serialize};

/// One contact row accepted from an uploaded file.
///
/// Fields are trimmed on construction. `first_name` and `phone` are never
/// empty; `notes` may be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    first_name: String,
    phone: String,
    notes: String,
}

impl LeadRecord {
    /// Build a record from raw cell values.
    ///
    /// Returns `None` when the trimmed name or phone is empty, which is how
    /// the parser drops unusable rows. A missing `notes` value becomes an
    /// empty string.
    ///
    /// ```
    /// use leaddesk_core::LeadRecord;
    ///
    /// let record = LeadRecord::new(" Ada ", "+1 555 0100", None).unwrap();
    /// assert_eq!(record.first_name(), "Ada");
    /// assert_eq!(record.notes(), "");
    ///
    /// assert!(LeadRecord::new("Ada", "   ", Some("call back")).is_none());
    /// ```
    #[must_use]
    pub fn new(first_name: &str, phone: &str, notes: Option<&str>) -> Option<Self> {
        let first_name = first_name.trim();
        let phone = phone.trim();
        if first_name.is_empty() || phone.is_empty() {
            return None;
        }

        Some(Self {
            first_name: first_name.to_owned(),
            phone: phone.to_owned(),
            notes: notes.map(str::trim).unwrap_or_default().to_owned(),
        })
    }

    /// Contact's first name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Contact's phone number, as written in the upload.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Free-text note, empty when the upload had none.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }
}

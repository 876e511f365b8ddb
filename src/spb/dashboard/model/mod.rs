use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One spreadsheet line. Cells are accessed positionally; no schema is
/// enforced on the row itself.
pub type RawRow = Vec<String>;

/// Status value that marks a row as successful. Compared case-insensitively
/// against the sheet and written verbatim on generated records.
pub const SUCCESS_STATUS: &str = "sucesso";

/// A successful message, either read from a row or generated from one by a
/// catalog rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessRecord {
    pub timestamp: String,
    pub message_code: String,
    pub status: String,
    pub details: String,
    /// Lower-cased catalog column, empty when the row has none.
    pub catalog_code: String,
    /// Only present (and `true`) on generated records.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub generated: bool,
}

impl SuccessRecord {
    /// True when the record was synthesized from a primary record.
    pub fn is_generated(&self) -> bool {
        self.generated
    }
}

/// Summary statistics over a set of success records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_success: usize,
    pub today_success: usize,
    /// Six-character message prefix → occurrence count.
    pub message_types: BTreeMap<String, usize>,
    pub recent_messages: Vec<SuccessRecord>,
}

/// Identifies the single worksheet the dashboard reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetRef {
    pub spreadsheet_id: String,
    /// Numeric tab identifier (the `gid` in sheet URLs).
    pub gid: i64,
}

impl WorksheetRef {
    pub fn new(spreadsheet_id: impl Into<String>, gid: i64) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            gid,
        }
    }
}

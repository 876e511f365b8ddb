use crate::model::{RawRow, SUCCESS_STATUS, SuccessRecord};

/// Column holding the row timestamp.
pub const TIMESTAMP_COLUMN: usize = 0;
/// Column holding the message code (e.g. `STR0012`).
pub const MESSAGE_CODE_COLUMN: usize = 1;
/// Column holding the processing status.
pub const STATUS_COLUMN: usize = 2;
/// Column holding free-text details.
pub const DETAILS_COLUMN: usize = 3;
/// Column holding the catalog code (spreadsheet column E).
pub const CATALOG_COLUMN: usize = 4;

/// Rows shorter than this are skipped.
const MIN_CELLS: usize = STATUS_COLUMN + 1;
/// Suffix appended to the message code of a generated record.
pub const GENERATED_SUFFIX: &str = "R2";

/// A catalog-transfer rule: rows carrying `catalog` whose message code
/// starts with `family` (and is not listed in `excluded`) get a generated
/// `R2` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogRule {
    pub catalog: &'static str,
    pub family: &'static str,
    pub excluded: &'static [&'static str],
}

impl CatalogRule {
    /// Whether the rule produces a generated record for `message_code`.
    pub fn applies_to(&self, message_code: &str) -> bool {
        message_code.starts_with(self.family) && !self.excluded.contains(&message_code)
    }
}

/// The recognized catalog codes, matched against the lower-cased column.
pub const CATALOG_RULES: &[CatalogRule] = &[
    // STR from Nu Pagamentos, R2 for Nu Financeira.
    CatalogRule {
        catalog: "trocadecatalagonupag",
        family: "STR",
        excluded: &["STR0010", "STR0013"],
    },
    // STR from Nu Financeira, R2 for Nu Invest.
    CatalogRule {
        catalog: "trocadecatalagonufin",
        family: "STR",
        excluded: &[],
    },
    // STR from Nu Invest, R2 for Nu Pagamentos.
    CatalogRule {
        catalog: "trocadecatalagonuinvest",
        family: "STR",
        excluded: &[],
    },
];

/// Looks up the rule registered for a (lower-cased) catalog code.
pub fn rule_for(catalog_code: &str) -> Option<&'static CatalogRule> {
    CATALOG_RULES
        .iter()
        .find(|rule| rule.catalog == catalog_code)
}

/// Turns raw sheet rows into success records.
///
/// The first row is the header and is skipped. Each successful row yields
/// its primary record, immediately followed by at most one generated record.
pub fn expand_rows(rows: &[RawRow]) -> Vec<SuccessRecord> {
    if rows.len() <= 1 {
        return Vec::new();
    }

    let mut records = Vec::new();
    for row in rows.iter().skip(1) {
        let Some(primary) = classify_row(row) else {
            continue;
        };
        let derived = derive_record(&primary);
        records.push(primary);
        records.extend(derived);
    }
    records
}

/// Builds the primary record for a row, or `None` when the row is too short
/// or not successful.
pub fn classify_row(row: &[String]) -> Option<SuccessRecord> {
    if row.len() < MIN_CELLS {
        return None;
    }
    if row[STATUS_COLUMN].to_lowercase() != SUCCESS_STATUS {
        return None;
    }

    Some(SuccessRecord {
        timestamp: cell(row, TIMESTAMP_COLUMN),
        message_code: cell(row, MESSAGE_CODE_COLUMN),
        status: cell(row, STATUS_COLUMN),
        details: cell(row, DETAILS_COLUMN),
        catalog_code: cell(row, CATALOG_COLUMN).to_lowercase(),
        generated: false,
    })
}

/// Applies the catalog rule matching `primary`, if any.
pub fn derive_record(primary: &SuccessRecord) -> Option<SuccessRecord> {
    let rule = rule_for(&primary.catalog_code)?;
    if !rule.applies_to(&primary.message_code) {
        return None;
    }

    Some(SuccessRecord {
        timestamp: primary.timestamp.clone(),
        message_code: format!("{}{GENERATED_SUFFIX}", primary.message_code),
        status: SUCCESS_STATUS.to_string(),
        details: format!("R2 gerado por {}", primary.catalog_code),
        catalog_code: primary.catalog_code.clone(),
        generated: true,
    })
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

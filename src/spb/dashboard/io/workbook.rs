use std::path::{Path, PathBuf};

use calamine::{DataType, Reader, Xlsx, open_workbook};
use chrono::{Duration, NaiveDate};
use tracing::{info, instrument};

use crate::error::{DashboardError, Result};
use crate::io::SheetSource;
use crate::model::{RawRow, WorksheetRef};

/// Reads rows from a local `.xlsx` export of the message log.
///
/// Local workbooks carry no numeric tab identifiers, so the worksheet is
/// selected by name (or the first sheet) and the gid is ignored.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    path: PathBuf,
    sheet: Option<String>,
}

impl WorkbookSource {
    pub fn new(path: impl Into<PathBuf>, sheet: Option<String>) -> Self {
        Self {
            path: path.into(),
            sheet,
        }
    }
}

impl SheetSource for WorkbookSource {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    fn fetch_rows(&self, _worksheet: &WorksheetRef) -> Result<Vec<RawRow>> {
        let rows = read_rows(&self.path, self.sheet.as_deref())?;
        info!(row_count = rows.len(), "rows read from workbook");
        Ok(rows)
    }
}

/// Reads every row of `sheet` (or the first sheet) as strings, keeping cell
/// positions relative to `A1`.
pub fn read_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<RawRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| DashboardError::MissingSheet("<first>".into()))?,
    };
    let range = workbook
        .worksheet_range(&name)
        .ok_or_else(|| DashboardError::MissingSheet(name.clone()))??;

    let (row_offset, col_offset) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or_default();

    let mut rows: Vec<RawRow> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![String::new(); col_offset];
        cells.extend(row.iter().map(|cell| cell_to_string(Some(cell))));
        trim_trailing_empty(&mut cells);
        rows.push(cells);
    }
    Ok(rows)
}

// The Sheets API omits trailing empty cells; match that so short rows look
// the same from either source.
fn trim_trailing_empty(cells: &mut RawRow) {
    while cells.last().is_some_and(String::is_empty) {
        cells.pop();
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::DateTime(serial)) => excel_serial_to_string(*serial),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Formats an Excel serial date as `YYYY-MM-DD HH:MM:SS` so timestamps keep
/// sorting as strings. Serials outside the calendar range keep their numeric
/// text.
fn excel_serial_to_string(serial: f64) -> String {
    let millis = (serial * 86_400_000.0).round() as i64;
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.and_hms_opt(0, 0, 0))
        .and_then(|epoch| epoch.checked_add_signed(Duration::try_milliseconds(millis)?))
        .map(|moment| moment.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| serial.to_string())
}

use tracing::{error, info, instrument};

use crate::error::DashboardError;
use crate::expand::expand_rows;
use crate::io::SheetSource;
use crate::model::{Stats, SuccessRecord, WorksheetRef};
use crate::stats::{self, RECENT_LIMIT};

/// Result of one fetch cycle.
///
/// The HTTP surface collapses both variants into a (possibly empty) record
/// list; the distinction is kept for callers that need to tell an empty sheet
/// from an unreachable one.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The source answered; the records may still be empty.
    Fetched(Vec<SuccessRecord>),
    /// The source failed and no records are available.
    Degraded { error: DashboardError },
}

impl FetchOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, FetchOutcome::Degraded { .. })
    }

    pub fn records(&self) -> &[SuccessRecord] {
        match self {
            FetchOutcome::Fetched(records) => records,
            FetchOutcome::Degraded { .. } => &[],
        }
    }

    pub fn into_records(self) -> Vec<SuccessRecord> {
        match self {
            FetchOutcome::Fetched(records) => records,
            FetchOutcome::Degraded { .. } => Vec::new(),
        }
    }
}

/// Fetches the worksheet and expands its rows into success records.
///
/// Source failures are logged and reported as [`FetchOutcome::Degraded`];
/// they never propagate.
#[instrument(
    level = "info",
    skip_all,
    fields(spreadsheet = %worksheet.spreadsheet_id, gid = worksheet.gid)
)]
pub fn fetch_success_data(source: &dyn SheetSource, worksheet: &WorksheetRef) -> FetchOutcome {
    match source.fetch_rows(worksheet) {
        Ok(rows) => {
            let records = expand_rows(&rows);
            let generated = records.iter().filter(|record| record.is_generated()).count();
            info!(
                row_count = rows.len(),
                record_count = records.len(),
                generated,
                "success records expanded"
            );
            FetchOutcome::Fetched(records)
        }
        Err(error) => {
            error!(%error, "failed to read spreadsheet, serving empty data");
            FetchOutcome::Degraded { error }
        }
    }
}

/// Fresh fetch followed by aggregation.
pub fn fetch_stats(source: &dyn SheetSource, worksheet: &WorksheetRef) -> Stats {
    stats::compute_stats(&fetch_success_data(source, worksheet).into_records())
}

/// Fresh fetch followed by the most-recent-first cut.
pub fn fetch_recent(source: &dyn SheetSource, worksheet: &WorksheetRef) -> Vec<SuccessRecord> {
    stats::recent(fetch_success_data(source, worksheet).records(), RECENT_LIMIT)
}

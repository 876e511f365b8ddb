use std::collections::BTreeMap;

use chrono::Local;

use crate::model::{Stats, SuccessRecord};

/// Number of records kept in the "recent" views.
pub const RECENT_LIMIT: usize = 10;
/// Length of the message-code prefix used as the histogram key.
pub const MESSAGE_TYPE_PREFIX_LEN: usize = 6;
/// Histogram key for records without a message code.
pub const UNKNOWN_MESSAGE_TYPE: &str = "Unknown";

/// Current local date as `YYYY-MM-DD`, the prefix `today_success` matches on.
pub fn local_today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Computes statistics using the current local date.
pub fn compute_stats(records: &[SuccessRecord]) -> Stats {
    compute_stats_for_day(records, &local_today())
}

/// Computes statistics, counting records whose timestamp starts with `today`.
pub fn compute_stats_for_day(records: &[SuccessRecord], today: &str) -> Stats {
    if records.is_empty() {
        return Stats::default();
    }

    let today_success = records
        .iter()
        .filter(|record| record.timestamp.starts_with(today))
        .count();

    Stats {
        total_success: records.len(),
        today_success,
        message_types: message_types(records),
        recent_messages: recent(records, RECENT_LIMIT),
    }
}

/// Histogram of message families keyed by the raw six-character prefix.
pub fn message_types(records: &[SuccessRecord]) -> BTreeMap<String, usize> {
    let mut histogram = BTreeMap::new();
    for record in records {
        *histogram
            .entry(message_type_key(&record.message_code))
            .or_insert(0) += 1;
    }
    histogram
}

/// First six characters of the code, or `"Unknown"` for an empty code.
pub fn message_type_key(message_code: &str) -> String {
    if message_code.is_empty() {
        return UNKNOWN_MESSAGE_TYPE.to_string();
    }
    message_code.chars().take(MESSAGE_TYPE_PREFIX_LEN).collect()
}

/// The `limit` records with the greatest timestamps, most recent first.
///
/// Timestamps compare as plain strings. The sort is stable, so equal
/// timestamps keep their encounter order.
pub fn recent(records: &[SuccessRecord], limit: usize) -> Vec<SuccessRecord> {
    let mut sorted: Vec<&SuccessRecord> = records.iter().collect();
    sorted.sort_by(|lhs, rhs| rhs.timestamp.cmp(&lhs.timestamp));
    sorted.into_iter().take(limit).cloned().collect()
}

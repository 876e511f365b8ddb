//! Worksheet resolution.
//!
//! Some backends do not reliably resolve a tab from its numeric identifier,
//! and tab metadata does not always carry the identifier in the same place.
//! Resolution therefore runs an ordered list of [`LookupStrategy`] values and
//! stops at the first one that finds the tab.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{DashboardError, Result};
use crate::model::WorksheetRef;

/// A worksheet that has been located inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: i64,
    pub title: String,
}

/// Read access to the tabs of one spreadsheet.
pub trait TabDirectory {
    /// Direct lookup by identifier. `Ok(None)` means the backend answered but
    /// does not know the tab.
    fn tab_by_id(&self, gid: i64) -> Result<Option<Tab>>;

    /// Raw metadata for every tab, in whatever shape the backend returns.
    fn list_tabs(&self) -> Result<Vec<Value>>;
}

/// One way of locating a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// Ask the backend for the identifier directly.
    ById,
    /// Scan all tabs for a top-level `sheetId` (or `id`) field.
    ScanTopLevelId,
    /// Scan all tabs for a nested `properties.sheetId` field.
    ScanPropertiesId,
}

/// Identifier lookup first, then the two metadata scans.
pub const DEFAULT_STRATEGIES: &[LookupStrategy] = &[
    LookupStrategy::ById,
    LookupStrategy::ScanTopLevelId,
    LookupStrategy::ScanPropertiesId,
];

impl LookupStrategy {
    fn find<D: TabDirectory + ?Sized>(
        self,
        directory: &D,
        gid: i64,
        listing: &mut Option<Vec<Value>>,
    ) -> Result<Option<Tab>> {
        match self {
            LookupStrategy::ById => directory.tab_by_id(gid),
            LookupStrategy::ScanTopLevelId => {
                let tabs = listing_or_fetch(directory, listing)?;
                Ok(scan(tabs, gid, top_level_id))
            }
            LookupStrategy::ScanPropertiesId => {
                let tabs = listing_or_fetch(directory, listing)?;
                Ok(scan(tabs, gid, properties_id))
            }
        }
    }
}

/// Runs `strategies` in order until one locates `worksheet`.
///
/// A strategy that fails is logged and treated as not-found so the next one
/// still runs.
pub fn resolve_worksheet<D: TabDirectory + ?Sized>(
    directory: &D,
    worksheet: &WorksheetRef,
    strategies: &[LookupStrategy],
) -> Result<Tab> {
    let mut listing = None;
    for strategy in strategies {
        match strategy.find(directory, worksheet.gid, &mut listing) {
            Ok(Some(tab)) => {
                info!(?strategy, title = %tab.title, id = tab.id, "worksheet found");
                return Ok(tab);
            }
            Ok(None) => debug!(?strategy, gid = worksheet.gid, "worksheet not found"),
            Err(error) => warn!(?strategy, %error, "worksheet lookup failed"),
        }
    }

    Err(DashboardError::WorksheetNotFound {
        spreadsheet_id: worksheet.spreadsheet_id.clone(),
        gid: worksheet.gid,
    })
}

fn listing_or_fetch<'a, D: TabDirectory + ?Sized>(
    directory: &D,
    listing: &'a mut Option<Vec<Value>>,
) -> Result<&'a [Value]> {
    if listing.is_none() {
        let tabs = directory.list_tabs()?;
        for tab in &tabs {
            debug!(
                title = tab_title(tab).unwrap_or("<untitled>"),
                top_level_id = ?top_level_id(tab),
                properties_id = ?properties_id(tab),
                "available tab"
            );
        }
        *listing = Some(tabs);
    }
    Ok(listing.as_deref().unwrap_or_default())
}

fn scan(tabs: &[Value], gid: i64, id_of: fn(&Value) -> Option<i64>) -> Option<Tab> {
    tabs.iter().find_map(|tab| {
        if id_of(tab)? != gid {
            return None;
        }
        let Some(title) = tab_title(tab) else {
            warn!(gid, "matching tab has no title, skipping");
            return None;
        };
        Some(Tab {
            id: gid,
            title: title.to_string(),
        })
    })
}

fn tab_title(tab: &Value) -> Option<&str> {
    tab.get("title")
        .or_else(|| tab.pointer("/properties/title"))
        .and_then(Value::as_str)
}

fn top_level_id(tab: &Value) -> Option<i64> {
    tab.get("sheetId")
        .or_else(|| tab.get("id"))
        .and_then(Value::as_i64)
}

fn properties_id(tab: &Value) -> Option<i64> {
    tab.pointer("/properties/sheetId").and_then(Value::as_i64)
}

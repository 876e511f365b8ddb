pub mod credentials;
pub mod lookup;
pub mod sheets;
pub mod workbook;

use crate::error::Result;
use crate::model::{RawRow, WorksheetRef};

/// A collaborator that returns every row of a worksheet as strings.
///
/// Implementations are constructed once at startup and shared across
/// requests; each call is one independent attempt against the backing store.
pub trait SheetSource: Send + Sync {
    fn fetch_rows(&self, worksheet: &WorksheetRef) -> Result<Vec<RawRow>>;
}

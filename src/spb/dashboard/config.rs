use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::error::{DashboardError, Result};
use crate::io::SheetSource;
use crate::io::credentials::{self, CREDENTIALS_ENV};
use crate::io::sheets::GoogleSheetsClient;
use crate::io::workbook::WorkbookSource;
use crate::model::WorksheetRef;

/// Spreadsheet the dashboard reads when none is configured.
pub const DEFAULT_SPREADSHEET_ID: &str = "17aWoS5Q8x-1I5VY8Sr1re2aA3GhauCLSMZeaklSne18";
/// Tab identifier of the message log inside [`DEFAULT_SPREADSHEET_ID`].
pub const DEFAULT_WORKSHEET_GID: i64 = 862097115;
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where rows come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// Google Sheets with a service-account key. The key JSON is taken from
    /// `inline_credentials` when set, otherwise from `credentials_file`.
    GoogleSheets {
        inline_credentials: Option<String>,
        credentials_file: PathBuf,
    },
    /// A local `.xlsx` workbook.
    Workbook { path: PathBuf, sheet: Option<String> },
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub host: IpAddr,
    pub port: u16,
    pub worksheet: WorksheetRef,
    pub source: SourceConfig,
    pub timeout: Duration,
}

impl DashboardConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Constructs the row source once; the result is shared by every request.
    pub fn build_source(&self) -> Result<Arc<dyn SheetSource>> {
        match &self.source {
            SourceConfig::GoogleSheets {
                inline_credentials,
                credentials_file,
            } => {
                let inline = inline_credentials.as_deref();
                let key = credentials::load_service_account(inline, credentials_file)?;
                let client = GoogleSheetsClient::new(key, self.timeout)?;
                info!(account = client.service_account(), "google sheets client ready");
                Ok(Arc::new(client))
            }
            SourceConfig::Workbook { path, sheet } => {
                if !path.exists() {
                    return Err(DashboardError::Config(format!(
                        "workbook not found: {}",
                        path.display()
                    )));
                }
                info!(path = %path.display(), "workbook source ready");
                Ok(Arc::new(WorkbookSource::new(path.clone(), sheet.clone())))
            }
        }
    }
}

/// Reads the inline credential blob from the process environment.
pub fn inline_credentials_from_env() -> Option<String> {
    std::env::var(CREDENTIALS_ENV).ok()
}

use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Error type covering the failures that can occur while reaching the
/// spreadsheet, configuring the process, or serving the dashboard.
///
/// None of these surface to API consumers as an error status: request-time
/// failures are logged and degrade to empty data in [`crate::sync`].
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Wrapper for IO failures such as reading credential files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport failures talking to the token endpoint or the Sheets API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Raised when the service-account assertion cannot be signed.
    #[error("token signing error: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when no credential blob could be found in the environment or on disk.
    #[error("spreadsheet credentials not found (looked in {env_var} and {})", .path.display())]
    MissingCredentials { env_var: String, path: PathBuf },

    /// Raised when a credential blob is present but lacks required fields.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Raised when an upstream API answers with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Raised when no lookup strategy could locate the configured tab.
    #[error("worksheet {gid} not found in spreadsheet {spreadsheet_id}")]
    WorksheetNotFound { spreadsheet_id: String, gid: i64 },

    /// Raised when a local workbook does not contain the requested sheet.
    #[error("sheet '{0}' not found in workbook")]
    MissingSheet(String),

    /// Raised when runtime settings are inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

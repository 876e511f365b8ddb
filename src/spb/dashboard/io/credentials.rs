use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{DashboardError, Result};

/// Environment variable holding the full service-account JSON blob.
pub const CREDENTIALS_ENV: &str = "GOOGLE_CREDENTIALS";
/// File name of the service-account key in the local development layout.
pub const DEFAULT_KEY_FILE: &str = "google_service_account_key.json";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a Google service-account key the client needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parses a key from its JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(json)?;
        if key.client_email.trim().is_empty() {
            return Err(DashboardError::InvalidCredentials(
                "client_email is empty".into(),
            ));
        }
        if !key.private_key.contains("PRIVATE KEY") {
            return Err(DashboardError::InvalidCredentials(
                "private_key is not a PEM block".into(),
            ));
        }
        Ok(key)
    }
}

/// `<Documents>/Python/google_service_account_key.json`, falling back to the
/// working directory when the platform has no documents folder.
pub fn default_key_path() -> PathBuf {
    let documents = directories_next::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    documents.join("Python").join(DEFAULT_KEY_FILE)
}

/// Resolves the credential blob: the inline JSON (normally the value of
/// [`CREDENTIALS_ENV`]) wins, otherwise the key file is read.
pub fn load_service_account(inline: Option<&str>, path: &Path) -> Result<ServiceAccountKey> {
    if let Some(json) = inline.filter(|value| !value.trim().is_empty()) {
        info!(source = CREDENTIALS_ENV, "loading service account from environment");
        return ServiceAccountKey::from_json(json);
    }

    debug!(path = %path.display(), "looking for service account key file");
    if !path.exists() {
        return Err(DashboardError::MissingCredentials {
            env_var: CREDENTIALS_ENV.to_string(),
            path: path.to_path_buf(),
        });
    }

    let json = fs::read_to_string(path)?;
    info!(path = %path.display(), "loading service account from file");
    ServiceAccountKey::from_json(&json)
}

use std::cell::OnceCell;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::{DashboardError, Result};
use crate::io::SheetSource;
use crate::io::credentials::ServiceAccountKey;
use crate::io::lookup::{self, DEFAULT_STRATEGIES, LookupStrategy, Tab, TabDirectory};
use crate::model::{RawRow, WorksheetRef};

/// Base URL of the Sheets v4 spreadsheet resource.
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
/// Read-only scope requested for the access token.
pub const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google Sheets client authenticated with a service account.
///
/// Built once at startup. Every fetch authorizes explicitly through
/// [`GoogleSheetsClient::authorize`]; no token is kept between fetches.
pub struct GoogleSheetsClient {
    http: Client,
    key: ServiceAccountKey,
    api_base: String,
    strategies: Vec<LookupStrategy>,
}

impl GoogleSheetsClient {
    pub fn new(key: ServiceAccountKey, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            key,
            api_base: SHEETS_API_BASE.to_string(),
            strategies: DEFAULT_STRATEGIES.to_vec(),
        })
    }

    /// Points the client at another Sheets API root (e.g. a regional
    /// endpoint or a local stand-in).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the HTTP client, e.g. one with custom proxy settings.
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn service_account(&self) -> &str {
        &self.key.client_email
    }

    /// Exchanges a signed service-account assertion for an access token.
    #[instrument(level = "debug", skip(self), fields(account = %self.key.client_email))]
    pub fn authorize(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: READONLY_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        let header = Header::new(Algorithm::RS256);
        let assertion = jsonwebtoken::encode(&header, &claims, &signing_key)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()?;
        let token: TokenResponse = ensure_success(response)?.json()?;
        debug!("access token issued");
        Ok(token.access_token)
    }

    /// Opens an authorized session scoped to one spreadsheet.
    pub fn session<'a>(&'a self, spreadsheet_id: &'a str) -> Result<SheetsSession<'a>> {
        Ok(SheetsSession {
            client: self,
            spreadsheet_id,
            token: self.authorize()?,
            metadata: OnceCell::new(),
        })
    }
}

impl SheetSource for GoogleSheetsClient {
    #[instrument(
        level = "info",
        skip_all,
        fields(spreadsheet = %worksheet.spreadsheet_id, gid = worksheet.gid)
    )]
    fn fetch_rows(&self, worksheet: &WorksheetRef) -> Result<Vec<RawRow>> {
        let session = self.session(&worksheet.spreadsheet_id)?;
        let tab = lookup::resolve_worksheet(&session, worksheet, &self.strategies)?;
        let rows = session.values(&tab)?;
        info!(row_count = rows.len(), title = %tab.title, "rows fetched");
        Ok(rows)
    }
}

/// An access token bound to one spreadsheet.
///
/// Tab metadata is requested at most once per session and shared by every
/// lookup strategy.
pub struct SheetsSession<'a> {
    client: &'a GoogleSheetsClient,
    spreadsheet_id: &'a str,
    token: String,
    metadata: OnceCell<Value>,
}

impl SheetsSession<'_> {
    fn spreadsheet_url(&self) -> String {
        format!("{}/{}", self.client.api_base, self.spreadsheet_id)
    }

    fn sheet_metadata(&self) -> Result<&Value> {
        if let Some(metadata) = self.metadata.get() {
            return Ok(metadata);
        }
        let response = self
            .client
            .http
            .get(self.spreadsheet_url())
            .bearer_auth(&self.token)
            .query(&[("fields", "sheets.properties")])
            .send()?;
        let metadata: Value = ensure_success(response)?.json()?;
        Ok(self.metadata.get_or_init(|| metadata))
    }

    /// Every cell of `tab`, rendered as the sheet displays it.
    pub fn values(&self, tab: &Tab) -> Result<Vec<RawRow>> {
        let range = quote_sheet_title(&tab.title);
        let response = self
            .client
            .http
            .get(format!("{}/values:batchGet", self.spreadsheet_url()))
            .bearer_auth(&self.token)
            .query(&[("ranges", range.as_str()), ("majorDimension", "ROWS")])
            .send()?;
        let body: Value = ensure_success(response)?.json()?;
        Ok(parse_value_ranges(&body))
    }
}

impl TabDirectory for SheetsSession<'_> {
    /// Sheets v4 has no endpoint that fetches a single tab by id, so this
    /// reads the `sheetId` from the (cached) spreadsheet metadata.
    fn tab_by_id(&self, gid: i64) -> Result<Option<Tab>> {
        Ok(parse_sheet_metadata(self.sheet_metadata()?)
            .into_iter()
            .find(|tab| tab.id == gid))
    }

    fn list_tabs(&self) -> Result<Vec<Value>> {
        Ok(self
            .sheet_metadata()?
            .get("sheets")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }
}

/// A1 range covering a whole sheet, e.g. `'Log de Mensagens'`.
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Tabs listed in a `spreadsheets.get` response that carry both an id and a
/// title.
pub fn parse_sheet_metadata(metadata: &Value) -> Vec<Tab> {
    let Some(sheets) = metadata.get("sheets").and_then(Value::as_array) else {
        return Vec::new();
    };
    sheets
        .iter()
        .filter_map(|sheet| {
            let properties = sheet.get("properties")?;
            Some(Tab {
                id: properties.get("sheetId")?.as_i64()?,
                title: properties.get("title")?.as_str()?.to_string(),
            })
        })
        .collect()
}

/// Rows of the first range in a `values:batchGet` response.
///
/// Non-string cells are rendered with their JSON text; a response without
/// values (an empty sheet) yields no rows.
pub fn parse_value_ranges(body: &Value) -> Vec<RawRow> {
    let values = body
        .pointer("/valueRanges/0/values")
        .or_else(|| body.get("values"))
        .and_then(Value::as_array);
    let Some(values) = values else {
        return Vec::new();
    };

    values
        .iter()
        .map(|row| {
            row.as_array()
                .map(|cells| cells.iter().map(cell_to_string).collect())
                .unwrap_or_default()
        })
        .collect()
}

fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(value) => value.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(DashboardError::Upstream {
        status: status.as_u16(),
        body,
    })
}

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use spb_dashboard::config::{
    self, DEFAULT_PORT, DEFAULT_SPREADSHEET_ID, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKSHEET_GID,
    DashboardConfig, SourceConfig,
};
use spb_dashboard::io::SheetSource;
use spb_dashboard::io::credentials::default_key_path;
use spb_dashboard::model::WorksheetRef;
use spb_dashboard::server::{self, AppState};
use spb_dashboard::sync::{self, FetchOutcome};
use spb_dashboard::{DashboardError, Result};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    // A missing .env file is the normal production case.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    let check_only = cli.check;
    let config = cli.into_config()?;

    info!("starting SPB message dashboard");
    let source = config.build_source()?;
    let connected = probe(source.as_ref(), &config.worksheet);
    if check_only {
        return if connected {
            Ok(())
        } else {
            Err(DashboardError::Config("spreadsheet connection check failed".into()))
        };
    }

    let addr = config.socket_addr();
    info!(url = %format!("http://localhost:{}", addr.port()), "dashboard available");

    let state = AppState::new(Arc::clone(&source), config.worksheet.clone());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let listener = TcpListener::bind(addr).await?;
        server::serve(listener, state).await
    })?;

    // The blocking HTTP client must not be dropped inside the runtime.
    drop(runtime);
    drop(source);
    Ok(())
}

/// One full fetch at startup so operators see connection problems early.
fn probe(source: &dyn SheetSource, worksheet: &WorksheetRef) -> bool {
    match sync::fetch_success_data(source, worksheet) {
        FetchOutcome::Fetched(records) => {
            info!(record_count = records.len(), "spreadsheet connection OK");
            true
        }
        FetchOutcome::Degraded { error } => {
            error!(%error, "spreadsheet connection failed, dashboard will serve empty data");
            false
        }
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| DashboardError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Dashboard of successful SPB messages read from a Google Sheets log."
)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Spreadsheet holding the message log.
    #[arg(long, env = "SPREADSHEET_ID", default_value = DEFAULT_SPREADSHEET_ID)]
    spreadsheet_id: String,

    /// Numeric identifier of the message log tab.
    #[arg(long, env = "WORKSHEET_GID", default_value_t = DEFAULT_WORKSHEET_GID)]
    worksheet_gid: i64,

    /// Service-account key file, used when GOOGLE_CREDENTIALS is unset.
    #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
    credentials_file: Option<PathBuf>,

    /// Read rows from a local .xlsx workbook instead of Google Sheets.
    #[arg(long)]
    workbook: Option<PathBuf>,

    /// Sheet to read from the workbook (defaults to the first one).
    #[arg(long, requires = "workbook")]
    workbook_sheet: Option<String>,

    /// Request timeout for spreadsheet calls, in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Probe the spreadsheet once and exit.
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn into_config(self) -> Result<DashboardConfig> {
        if self.timeout_secs == 0 {
            return Err(DashboardError::Config(
                "--timeout-secs must be greater than zero".into(),
            ));
        }

        let source = match self.workbook {
            Some(path) => SourceConfig::Workbook {
                path,
                sheet: self.workbook_sheet,
            },
            None => SourceConfig::GoogleSheets {
                inline_credentials: config::inline_credentials_from_env(),
                credentials_file: self.credentials_file.unwrap_or_else(default_key_path),
            },
        };

        Ok(DashboardConfig {
            host: self.host,
            port: self.port,
            worksheet: WorksheetRef::new(self.spreadsheet_id, self.worksheet_gid),
            source,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

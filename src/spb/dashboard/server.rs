use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::{Html, Json};
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Result;
use crate::io::SheetSource;
use crate::model::{Stats, SuccessRecord, WorksheetRef};
use crate::sync;

const DASHBOARD_PAGE: &str = include_str!("../../../assets/dashboard.html");

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn SheetSource>,
    worksheet: Arc<WorksheetRef>,
}

impl AppState {
    pub fn new(source: Arc<dyn SheetSource>, worksheet: WorksheetRef) -> Self {
        Self {
            source,
            worksheet: Arc::new(worksheet),
        }
    }

    /// Runs one fetch cycle on the blocking pool.
    ///
    /// A panicking fetch is logged and answered with the empty value, like
    /// any other source failure.
    async fn run_blocking<T, F>(&self, job: F) -> T
    where
        T: Default + Send + 'static,
        F: FnOnce(&dyn SheetSource, &WorksheetRef) -> T + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        let worksheet = Arc::clone(&self.worksheet);
        match tokio::task::spawn_blocking(move || job(&*source, &*worksheet)).await {
            Ok(value) => value,
            Err(join_error) => {
                error!(error = %join_error, "fetch task failed, serving empty data");
                T::default()
            }
        }
    }
}

/// The dashboard routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/data", get(api_data))
        .route("/api/stats", get(api_stats))
        .route("/api/recent", get(api_recent))
        .with_state(state)
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}

async fn api_data(State(state): State<AppState>) -> Json<Vec<SuccessRecord>> {
    let records = state
        .run_blocking(|source, worksheet| {
            sync::fetch_success_data(source, worksheet).into_records()
        })
        .await;
    Json(records)
}

async fn api_stats(State(state): State<AppState>) -> Json<Stats> {
    Json(state.run_blocking(sync::fetch_stats).await)
}

async fn api_recent(State(state): State<AppState>) -> Json<Vec<SuccessRecord>> {
    Json(state.run_blocking(sync::fetch_recent).await)
}

/// Serves the dashboard until Ctrl+C.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "dashboard listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

//! Read-only REST API
//!
//! Serves projects, capex records, suppliers and the derived dashboard and
//! breakdown views as JSON. The shared `Storage` is reloaded from disk before
//! each request, so answers reflect writes made by the CLI while the server
//! runs. Errors become `{"message": ...}` bodies with a matching status.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::config::settings::Settings;
use crate::error::LedgerError;
use crate::models::{Capex, CapexId, Project, ProjectId, Supplier, SupplierId, UserId};
use crate::reports::{compute_dashboard, compute_monthly_breakdown, DashboardSummary, MonthlyBreakdownRow};
use crate::services::{CapexService, Page, ProjectSearchHit, ProjectService, SupplierService};
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(storage: Storage, settings: Settings) -> Self {
        Self {
            storage: Arc::new(storage),
            settings: Arc::new(settings),
        }
    }
}

/// `LedgerError` as an HTTP response
#[derive(Debug)]
pub struct ApiError(LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
            LedgerError::Validation(_) | LedgerError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            LedgerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LedgerError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    search: Option<String>,
    query: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
    limit: Option<usize>,
}

impl SearchParams {
    /// The search text, whichever parameter name the route uses
    fn text(&self) -> Result<&str, ApiError> {
        self.search
            .as_deref()
            .or(self.query.as_deref())
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| LedgerError::Validation("A search query is required".into()).into())
    }

    fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }

    fn page_size(&self, settings: &Settings) -> usize {
        self.page_size.unwrap_or(settings.default_page_size)
    }
}

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| LedgerError::Validation(format!("Invalid {} id: {}", what, raw)).into())
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(welcome))
        .route("/api/project/get/all", get(all_projects))
        .route("/api/project/get/byUser/{id}", get(projects_by_user))
        .route("/api/project/get/{name}", get(project_by_name))
        .route("/api/project/search", get(search_projects))
        .route("/api/project/dashboard/{name}", get(project_dashboard))
        .route("/api/project/breakdown/{id}", get(project_breakdown))
        .route("/api/capex/get/all", get(all_capex))
        .route("/api/capex/get/{id}", get(capex_by_id))
        .route("/api/capex/search", get(search_capex))
        .route("/api/supplier/get/all", get(all_suppliers))
        .route("/api/supplier/get/{id}", get(supplier_by_id))
        .route("/api/supplier/search", get(search_suppliers))
        .layer(from_fn_with_state(state.clone(), reload_storage))
        .layer(from_fn(log_requests))
        .with_state(state)
}

/// Re-read the data files so every request sees current state
async fn reload_storage(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let storage = Arc::clone(&state.storage);
    tokio::task::spawn_blocking(move || storage.load_all())
        .await
        .map_err(|e| LedgerError::Storage(format!("Reload task failed: {}", e)))??;
    Ok(next.run(req).await)
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to the capex-ledger API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn all_projects(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    Ok(Json(ProjectService::new(&state.storage).list(None, None)?))
}

async fn project_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Project> {
    let project = ProjectService::new(&state.storage)
        .get_by_name(&name)?
        .ok_or_else(|| LedgerError::project_not_found(name))?;
    Ok(Json(project))
}

async fn search_projects(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<ProjectSearchHit>> {
    let limit = params.limit.unwrap_or(state.settings.search_limit);
    let hits = ProjectService::new(&state.storage).search(
        params.text()?,
        limit,
        state.settings.month_enumeration,
    )?;
    Ok(Json(hits))
}

async fn project_dashboard(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<DashboardSummary> {
    let summary = compute_dashboard(&*state.storage, &name, state.settings.month_enumeration)?
        .ok_or_else(|| LedgerError::project_not_found(name))?;
    Ok(Json(summary))
}

async fn project_breakdown(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<MonthlyBreakdownRow>> {
    let id: ProjectId = parse_id(&id, "project")?;
    let rows = compute_monthly_breakdown(&*state.storage, id, state.settings.month_enumeration)?;
    Ok(Json(rows))
}

async fn projects_by_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Page<Project>> {
    let user_id: UserId = parse_id(&id, "user")?;
    let page = ProjectService::new(&state.storage).by_member(
        user_id,
        params.page(),
        params.page_size(&state.settings),
    )?;
    Ok(Json(page))
}

async fn all_capex(State(state): State<AppState>) -> ApiResult<Vec<Capex>> {
    Ok(Json(CapexService::new(&state.storage).list()?))
}

async fn capex_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Capex> {
    let capex_id: CapexId = parse_id(&id, "capex")?;
    let capex = CapexService::new(&state.storage)
        .get(capex_id)?
        .ok_or_else(|| LedgerError::capex_not_found(id))?;
    Ok(Json(capex))
}

async fn search_capex(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Page<Capex>> {
    let page = CapexService::new(&state.storage).search(
        params.text()?,
        params.page(),
        params.page_size(&state.settings),
    )?;
    Ok(Json(page))
}

async fn all_suppliers(State(state): State<AppState>) -> ApiResult<Vec<Supplier>> {
    Ok(Json(SupplierService::new(&state.storage).list()?))
}

async fn supplier_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Supplier> {
    let supplier_id: SupplierId = parse_id(&id, "supplier")?;
    let supplier = SupplierService::new(&state.storage)
        .get(supplier_id)?
        .ok_or_else(|| LedgerError::supplier_not_found(id))?;
    Ok(Json(supplier))
}

async fn search_suppliers(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Page<Supplier>> {
    let page = SupplierService::new(&state.storage).search(
        params.text()?,
        params.page(),
        params.page_size(&state.settings),
    )?;
    Ok(Json(page))
}

/// Bind the configured address and serve until Ctrl-C
pub async fn run_server(state: AppState, bind: Option<String>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or_else(|| state.settings.server.bind_address.clone());
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", bind, e))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(bind = %listener.local_addr()?, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

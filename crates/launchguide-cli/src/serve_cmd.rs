//! `launchguide serve`: JSON API plus a minimal HTML page over the same flow
//! the CLI runs.
//!
//! ```text
//! GET  /                              HTML overview (catalog + current plan)
//! GET  /api/channels                  channel catalog
//! POST /api/onboarding/validate       validate a raw onboarding payload
//! POST /api/plans                     {record, channels, policy?} -> new plan
//! GET  /api/plan                      current plan with completion state
//! POST /api/plan/steps/{index}/toggle flip completion of one line
//! ```
//!
//! The current plan is loaded from the store at startup and overwritten on
//! every generation. Completion state lives in memory only.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use launchguide_core::aggregator::{AggregateError, Aggregator};
use launchguide_core::catalog::{SelectionPolicy, load_catalog};
use launchguide_core::checklist::{Checklist, ChecklistError, ChecklistItem};
use launchguide_core::onboarding::{FieldError, RawOnboarding, ValidationError, validate};
use launchguide_core::store::{
    KeyValueStore, PlanMeta, StoreError, load_plan, load_plan_meta, save_plan, save_plan_meta,
};
use launchguide_core::wizard::{OnboardingStep, WizardError};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
    fields: Vec<FieldError>,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
            fields: Vec::new(),
        }
    }

    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.into(),
            fields: Vec::new(),
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{:#}", err.into()),
            fields: Vec::new(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "invalid onboarding input".to_string(),
            fields: err.errors,
        }
    }
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Invalid(e) | WizardError::Aggregate(AggregateError::Invalid(e)) => {
                e.into()
            }
            other => Self::unprocessable(other.to_string()),
        }
    }
}

impl From<ChecklistError> for AppError {
    fn from(err: ChecklistError) -> Self {
        Self::not_found(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = if self.fields.is_empty() {
            json!({ "error": self.message })
        } else {
            json!({ "error": self.message, "fields": self.fields })
        };
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct CurrentPlan {
    meta: Option<PlanMeta>,
    checklist: Checklist,
}

#[derive(Clone)]
pub struct AppState {
    aggregator: Aggregator,
    store: Arc<dyn KeyValueStore>,
    policy: SelectionPolicy,
    current: Arc<Mutex<CurrentPlan>>,
}

impl AppState {
    /// Build server state, loading any previously stored plan.
    pub fn new(
        aggregator: Aggregator,
        store: Arc<dyn KeyValueStore>,
        policy: SelectionPolicy,
    ) -> Result<Self> {
        let plan = load_plan(store.as_ref()).context("failed to load stored plan")?;
        let meta = load_plan_meta(store.as_ref()).context("failed to load plan metadata")?;
        Ok(Self {
            aggregator,
            store,
            policy,
            current: Arc::new(Mutex::new(CurrentPlan {
                meta,
                checklist: Checklist::new(plan),
            })),
        })
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub record: RawOnboarding,
    pub channels: Vec<String>,
    #[serde(default)]
    pub policy: Option<SelectionPolicy>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub done: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse<'a> {
    pub meta: Option<&'a PlanMeta>,
    pub items: Vec<ChecklistItem<'a>>,
    pub progress: ProgressResponse,
}

impl<'a> PlanResponse<'a> {
    fn from_current(current: &'a CurrentPlan) -> Self {
        let (done, total) = current.checklist.progress();
        Self {
            meta: current.meta.as_ref(),
            items: current.checklist.items(),
            progress: ProgressResponse { done, total },
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/channels", get(list_channels))
        .route("/api/onboarding/validate", post(validate_onboarding))
        .route("/api/plans", post(create_plan))
        .route("/api/plan", get(get_plan))
        .route("/api/plan/steps/{index}/toggle", post(toggle_step))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("launchguide serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("launchguide serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C; shutting down");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(state): State<AppState>) -> Html<String> {
    let channels = load_catalog()
        .iter()
        .map(|c| format!("<li><b>{}</b>: {}</li>", escape(&c.name), escape(&c.description)))
        .collect::<Vec<_>>()
        .join("\n");

    let current = state.current.lock().await;
    let plan = if current.checklist.is_empty() {
        "<p>No plan yet. POST to <code>/api/plans</code> to generate one.</p>".to_string()
    } else {
        let items = current
            .checklist
            .items()
            .iter()
            .map(|item| {
                if item.heading {
                    format!("<h3>{}</h3>", escape(item.text.trim_start_matches("## ")))
                } else {
                    let checked = if item.completed { " checked" } else { "" };
                    format!(
                        "<div><input type=\"checkbox\" disabled{checked}> {}</div>",
                        escape(item.text)
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        let (done, total) = current.checklist.progress();
        format!("<p>{done}/{total} steps done</p>{items}")
    };

    Html(format!(
        "<!DOCTYPE html>\
<html><head><title>launchguide</title></head><body>\
<h1>launchguide</h1>\
<p><a href=\"/api/channels\">/api/channels</a> | <a href=\"/api/plan\">/api/plan</a></p>\
<h2>Channels</h2><ul>{channels}</ul>\
<h2>Your plan</h2>{plan}\
</body></html>"
    ))
}

async fn list_channels() -> Response {
    Json(load_catalog()).into_response()
}

async fn validate_onboarding(Json(raw): Json<RawOnboarding>) -> Result<Response, AppError> {
    let record = validate(&raw)?;
    Ok(Json(json!({ "valid": true, "record": record })).into_response())
}

async fn create_plan(
    State(state): State<AppState>,
    Json(request): Json<CreatePlanRequest>,
) -> Result<Response, AppError> {
    let policy = request.policy.unwrap_or(state.policy);
    let display = OnboardingStep::submit(&request.record)?
        .choose(request.channels, policy)?
        .generate(&state.aggregator)
        .await?;
    let (meta, checklist) = display.into_parts();

    // Store and swap under one lock so the stored plan, its metadata and the
    // in-memory checklist always belong to the same submission.
    let mut current = state.current.lock().await;
    save_plan(state.store.as_ref(), checklist.plan())?;
    save_plan_meta(state.store.as_ref(), &meta)?;
    tracing::info!(submission_id = %meta.submission_id, "plan stored");
    *current = CurrentPlan {
        meta: Some(meta),
        checklist,
    };
    Ok((StatusCode::CREATED, Json(PlanResponse::from_current(&current))).into_response())
}

async fn get_plan(State(state): State<AppState>) -> Response {
    let current = state.current.lock().await;
    Json(PlanResponse::from_current(&current)).into_response()
}

async fn toggle_step(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Response, AppError> {
    let mut current = state.current.lock().await;
    let completed = current.checklist.toggle(index)?;
    let (done, total) = current.checklist.progress();
    let progress = ProgressResponse { done, total };
    Ok(Json(json!({
        "index": index,
        "completed": completed,
        "progress": progress,
    }))
    .into_response())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::advisor::{self, AdviceContext, AdviceTracker, AdvisorError, GeminiClient};
use crate::config::ServeConfig;
use crate::core::{
    ContributionEntry, ContributionSchedule, MonthlySnapshot, ProjectionParameters,
    ProjectionSummary, project, summarize, year_end_view,
};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ProjectArgs {
    #[arg(long, default_value = "1000", help = "Starting capital")]
    pub initial_capital: Decimal,
    #[arg(long, default_value = "100", help = "Contribution made every month")]
    pub monthly_contribution: Decimal,
    #[arg(long, default_value = "7", help = "Expected annual return in percent, e.g. 7")]
    pub annual_return: Decimal,
    #[arg(long, default_value_t = 20, help = "Number of years to project")]
    pub time_horizon: u32,
    #[arg(
        long = "extra",
        value_name = "YEAR:MONTH:AMOUNT",
        value_parser = parse_extra,
        help = "One-off contribution; repeat for several"
    )]
    pub extras: Vec<ContributionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionPayload {
    year: u32,
    month: u32,
    amount: Decimal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    initial_capital: Option<Decimal>,
    monthly_contribution: Option<Decimal>,
    annual_return: Option<Decimal>,
    time_horizon: Option<u32>,
    additional_contributions: Vec<ContributionPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AdvicePayload {
    #[serde(flatten)]
    projection: ProjectPayload,
    question: String,
}

/// A validated parameter set, its schedule, and everything derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub parameters: ProjectionParameters,
    pub schedule: ContributionSchedule,
    pub snapshots: Vec<MonthlySnapshot>,
}

impl Projection {
    pub fn year_end(&self) -> Vec<MonthlySnapshot> {
        year_end_view(&self.snapshots)
    }

    pub fn summary(&self) -> ProjectionSummary {
        summarize(&self.parameters, &self.snapshots)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    parameters: ProjectionParameters,
    additional_contributions: Vec<ContributionEntry>,
    summary: ProjectionSummary,
    year_end: Vec<MonthlySnapshot>,
    snapshots: Vec<MonthlySnapshot>,
}

impl From<&Projection> for ProjectResponse {
    fn from(projection: &Projection) -> Self {
        Self {
            parameters: projection.parameters,
            additional_contributions: projection.schedule.entries().to_vec(),
            summary: projection.summary(),
            year_end: projection.year_end(),
            snapshots: projection.snapshots.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
struct AppState {
    advisor: Option<GeminiClient>,
    tracker: Arc<AdviceTracker>,
}

pub fn parse_extra(raw: &str) -> Result<ContributionEntry, String> {
    let parts = raw.split(':').map(str::trim).collect::<Vec<_>>();
    let [year, month, amount] = parts.as_slice() else {
        return Err(format!("expected YEAR:MONTH:AMOUNT, got '{raw}'"));
    };
    let year = year
        .parse::<u32>()
        .map_err(|e| format!("invalid year '{year}': {e}"))?;
    let month = month
        .parse::<u32>()
        .map_err(|e| format!("invalid month '{month}': {e}"))?;
    let amount = amount
        .parse::<Decimal>()
        .map_err(|e| format!("invalid amount '{amount}': {e}"))?;
    Ok(ContributionEntry::new(year, month, amount))
}

/// Validates `args` and runs the projection.
pub fn build_projection(args: &ProjectArgs) -> Result<Projection, String> {
    let parameters = ProjectionParameters::new(
        args.initial_capital,
        args.monthly_contribution,
        args.annual_return,
        args.time_horizon,
    )
    .map_err(|e| e.to_string())?;

    let mut schedule = ContributionSchedule::new();
    for (idx, entry) in args.extras.iter().enumerate() {
        schedule
            .add(*entry, parameters.time_horizon_years())
            .map_err(|e| format!("additional contribution #{}: {e}", idx + 1))?;
    }

    let snapshots = project(&parameters, &schedule).map_err(|e| e.to_string())?;
    Ok(Projection {
        parameters,
        schedule,
        snapshots,
    })
}

pub fn default_project_args() -> ProjectArgs {
    ProjectArgs {
        initial_capital: Decimal::from(1000),
        monthly_contribution: Decimal::from(100),
        annual_return: Decimal::from(7),
        time_horizon: 20,
        extras: Vec::new(),
    }
}

fn project_args_from_payload(payload: ProjectPayload) -> ProjectArgs {
    let mut args = default_project_args();

    if let Some(v) = payload.initial_capital {
        args.initial_capital = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_return {
        args.annual_return = v;
    }
    if let Some(v) = payload.time_horizon {
        args.time_horizon = v;
    }
    args.extras = payload
        .additional_contributions
        .into_iter()
        .map(|c| ContributionEntry::new(c.year, c.month, c.amount))
        .collect();

    args
}

fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/advice", post(advice_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(config: ServeConfig) -> std::io::Result<()> {
    let advisor = match GeminiClient::from_config(&config.advisor) {
        Ok(client) => Some(client),
        Err(err) => {
            tracing::warn!(error = %err, "advice endpoint disabled");
            None
        }
    };
    let state = AppState {
        advisor,
        tracker: Arc::new(AdviceTracker::new()),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "projection API listening");
    tracing::info!("local access: http://127.0.0.1:{}/api/project", config.port);

    axum::serve(listener, router(state)).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let args = project_args_from_payload(payload);
    match build_projection(&args) {
        Ok(projection) => json_response(StatusCode::OK, ProjectResponse::from(&projection)),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn advice_handler(
    State(state): State<AppState>,
    Json(payload): Json<AdvicePayload>,
) -> Response {
    let args = project_args_from_payload(payload.projection);
    let projection = match build_projection(&args) {
        Ok(projection) => projection,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let Some(client) = state.advisor.as_ref() else {
        return advisor_error_response(&AdvisorError::MissingApiKey);
    };

    let context = AdviceContext {
        params: &projection.parameters,
        schedule: &projection.schedule,
        final_capital: projection.summary().final_capital,
        question: &payload.question,
    };
    match advisor::ask(client, &state.tracker, &context).await {
        Some(Ok(answer)) => json_response(StatusCode::OK, answer),
        Some(Err(err)) => advisor_error_response(&err),
        None => error_response(StatusCode::CONFLICT, "superseded by a newer advice request"),
    }
}

fn advisor_error_response(err: &AdvisorError) -> Response {
    let status = match err {
        AdvisorError::EmptyQuestion => StatusCode::BAD_REQUEST,
        AdvisorError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
        AdvisorError::NoContent | AdvisorError::TransportFailure(_) => StatusCode::BAD_GATEWAY,
    };
    error_response(status, &err.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn project_args_from_json(json: &str) -> Result<ProjectArgs, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(project_args_from_payload(payload))
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::principal::Principal;
use super::service::{AnalyticsError, AnalyticsService};
use crate::ai::TextGenerator;
use crate::scoring::compute_score;
use crate::workforce::{EmployeeId, TaskSnapshot, WorkforceRepository};

#[derive(Debug, Deserialize)]
pub struct ComputeScoreRequest {
    pub tasks: Vec<TaskSnapshot>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshParams {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<usize>,
}

/// Router builder exposing scoring and analytics endpoints.
pub fn analytics_router<R, G>(service: Arc<AnalyticsService<R, G>>) -> Router
where
    R: WorkforceRepository + 'static,
    G: TextGenerator + 'static,
{
    Router::new()
        .route("/api/v1/scores/compute", post(compute_handler))
        .route(
            "/api/v1/analytics/employees/:employee_id/score",
            get(employee_score_handler::<R, G>),
        )
        .route("/api/v1/analytics/leaderboard", get(leaderboard_handler::<R, G>))
        .route("/api/v1/analytics/dashboard", get(dashboard_handler::<R, G>))
        .route("/api/v1/analytics/insights", get(insights_handler::<R, G>))
        .route("/api/v1/analytics/query", get(query_handler::<R, G>))
        .with_state(service)
}

pub(crate) async fn compute_handler(Json(request): Json<ComputeScoreRequest>) -> Response {
    let result = compute_score(&request.tasks);
    (StatusCode::OK, Json(result)).into_response()
}

pub(crate) async fn employee_score_handler<R, G>(
    State(service): State<Arc<AnalyticsService<R, G>>>,
    principal: Principal,
    Path(employee_id): Path<String>,
) -> Response
where
    R: WorkforceRepository + 'static,
    G: TextGenerator + 'static,
{
    match service.employee_score(&principal, &EmployeeId(employee_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn leaderboard_handler<R, G>(
    State(service): State<Arc<AnalyticsService<R, G>>>,
    principal: Principal,
    Query(params): Query<LeaderboardParams>,
) -> Response
where
    R: WorkforceRepository + 'static,
    G: TextGenerator + 'static,
{
    match service.leaderboard(&principal, params.limit) {
        Ok(entries) => (StatusCode::OK, Json(json!({ "entries": entries }))).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn dashboard_handler<R, G>(
    State(service): State<Arc<AnalyticsService<R, G>>>,
    principal: Principal,
) -> Response
where
    R: WorkforceRepository + 'static,
    G: TextGenerator + 'static,
{
    match service.dashboard(&principal) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn insights_handler<R, G>(
    State(service): State<Arc<AnalyticsService<R, G>>>,
    principal: Principal,
    Query(params): Query<RefreshParams>,
) -> Response
where
    R: WorkforceRepository + 'static,
    G: TextGenerator + 'static,
{
    match service.team_insights(&principal, params.refresh).await {
        Ok(insights) => (StatusCode::OK, Json(insights)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn query_handler<R, G>(
    State(service): State<Arc<AnalyticsService<R, G>>>,
    principal: Principal,
    Query(params): Query<QueryParams>,
) -> Response
where
    R: WorkforceRepository + 'static,
    G: TextGenerator + 'static,
{
    match service
        .workforce_query(&principal, &params.q, params.refresh)
        .await
    {
        Ok(answer) => (StatusCode::OK, Json(answer)).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let status = match &self {
            AnalyticsError::Forbidden => StatusCode::FORBIDDEN,
            AnalyticsError::OrganizationNotFound(_) | AnalyticsError::EmployeeNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AnalyticsError::EmptyQuestion => StatusCode::BAD_REQUEST,
            AnalyticsError::Ai(_) => StatusCode::BAD_GATEWAY,
            AnalyticsError::Repository(_)
            | AnalyticsError::Store(_)
            | AnalyticsError::MalformedCachedPayload(_)
            | AnalyticsError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(target: "workforce::analytics", error = %self, "analytics request failed");
        }

        let payload = json!({ "error": self.to_string() });
        (status, Json(payload)).into_response()
    }
}

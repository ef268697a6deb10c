use std::sync::Arc;

use auto_finance::error::AppError;
use auto_finance::workflows::advisory::advisory_router;
use auto_finance::workflows::financing::{
    quote_router, ApplicantProfile, FinancingEngine, ProfileForm, RecommendationResult,
    SchedulePoint, VehicleCatalog,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::infra::{AppState, Services};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecommendationRequest {
    #[serde(default)]
    pub(crate) form_data: ProfileForm,
    pub(crate) vehicle_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendationResponse {
    pub(crate) recommendation: RecommendationResult,
    pub(crate) schedule: Vec<SchedulePoint>,
}

#[derive(Clone)]
struct RecommendationState {
    engine: Arc<FinancingEngine>,
    catalog: Arc<VehicleCatalog>,
}

pub(crate) fn with_application_routes(services: &Services) -> Router {
    let recommendation_state = RecommendationState {
        engine: Arc::clone(&services.engine),
        catalog: Arc::clone(&services.catalog),
    };

    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/vehicles", get(vehicles_endpoint))
        .route("/api/recommendation", post(recommendation_endpoint))
        .with_state(recommendation_state)
        .merge(advisory_router(Arc::clone(&services.advisory)))
        .merge(quote_router(Arc::clone(&services.engine)))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VehiclesQuery {
    #[serde(default)]
    pub(crate) monthly_budget: Option<f64>,
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

async fn vehicles_endpoint(
    State(state): State<RecommendationState>,
    query: Result<Query<VehiclesQuery>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(query)) => {
            Json(state.catalog.badged_for(query.monthly_budget)).into_response()
        }
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected vehicles query");
            bad_request(rejection.body_text())
        }
    }
}

async fn recommendation_endpoint(
    State(state): State<RecommendationState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected recommendation request");
            return bad_request(rejection.body_text());
        }
    };

    match recommend(&state, request) {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}

fn recommend(
    state: &RecommendationState,
    request: RecommendationRequest,
) -> Result<RecommendationResponse, AppError> {
    let RecommendationRequest {
        form_data,
        vehicle_id,
    } = request;

    let vehicle = state.catalog.get(&vehicle_id)?;
    let profile = ApplicantProfile::from_form(form_data);
    let recommendation = state.engine.recommend(&profile, vehicle)?;
    let schedule = recommendation.payment_schedule();

    Ok(RecommendationResponse {
        recommendation,
        schedule,
    })
}

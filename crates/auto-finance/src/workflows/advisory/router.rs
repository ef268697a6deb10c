use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::workflows::financing::{ApplicantProfile, ProfileForm};

use super::{AdviceRequest, AdvisoryService, Enrichment, FallbackReason};

/// `POST /api/choose-car` and `POST /api/payment-advice`.
pub fn advisory_router(service: Arc<AdvisoryService>) -> Router {
    Router::new()
        .route("/api/choose-car", post(choose_car_handler))
        .route("/api/payment-advice", post(payment_advice_handler))
        .with_state(service)
}

fn log_fallback<T>(endpoint: &'static str, outcome: &Enrichment<T>) {
    match outcome.fallback_reason() {
        None => {}
        Some(FallbackReason::NotConfigured) => {
            debug!(endpoint, "advisory service not configured; using heuristic");
        }
        Some(reason) => warn!(endpoint, %reason, "advisory fallback"),
    }
}

fn failure(message: &'static str) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}

pub(crate) async fn choose_car_handler(
    State(service): State<Arc<AdvisoryService>>,
    payload: Result<Json<ProfileForm>, JsonRejection>,
) -> Response {
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected vehicle pick request");
            return failure("Failed to choose car");
        }
    };

    let profile = ApplicantProfile::from_form(form);
    let outcome = service.choose(&profile).await;
    log_fallback("choose-car", &outcome);

    (StatusCode::OK, Json(outcome.into_value())).into_response()
}

pub(crate) async fn payment_advice_handler(
    State(service): State<Arc<AdvisoryService>>,
    payload: Result<Json<AdviceRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected payment advice request");
            return failure("Failed to generate advice");
        }
    };

    let outcome = service.advise(&request).await;
    log_fallback("payment-advice", &outcome);

    let payload = json!({ "advice": outcome.into_value() });
    (StatusCode::OK, Json(payload)).into_response()
}

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::engine::FinancingEngine;
use super::quotes::{FinanceQuoteRequest, LeaseQuoteRequest};

/// Server side of the quote endpoints. Both respond with a bare JSON number.
pub fn quote_router(engine: Arc<FinancingEngine>) -> Router {
    Router::new()
        .route("/calculatefinance", get(finance_handler))
        .route("/calculatefinance/", get(finance_handler))
        .route("/calculatelease", get(lease_handler))
        .route("/calculatelease/", get(lease_handler))
        .with_state(engine)
}

pub(crate) async fn finance_handler(
    State(_engine): State<Arc<FinancingEngine>>,
    query: Result<Query<FinanceQuoteRequest>, QueryRejection>,
) -> Response {
    let request = match query {
        Ok(Query(request)) => request,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    match request.validate() {
        Ok(()) => (StatusCode::OK, axum::Json(request.local_monthly())).into_response(),
        Err(error) => bad_request(error.to_string()),
    }
}

pub(crate) async fn lease_handler(
    State(engine): State<Arc<FinancingEngine>>,
    query: Result<Query<LeaseQuoteRequest>, QueryRejection>,
) -> Response {
    let request = match query {
        Ok(Query(request)) => request,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    match request.validate() {
        Ok(()) => {
            let monthly = request.local_monthly(&engine.config().lease);
            (StatusCode::OK, axum::Json(monthly)).into_response()
        }
        Err(error) => bad_request(error.to_string()),
    }
}

fn bad_request(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

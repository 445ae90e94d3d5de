use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{Filter, Rejection, Reply};

use super::types::{ErrorResponse, PredictRequest};
use crate::core::HealthChecker;
use crate::error::PredictionError;
use crate::prediction::PredictionOrchestrator;

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// `POST /predict`, `GET /health` and `GET /metrics`, with permissive CORS.
pub fn routes(
    orchestrator: Arc<PredictionOrchestrator>,
    health: HealthChecker,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"])
        .max_age(3600);

    let predict = warp::path("predict")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_orchestrator(orchestrator.clone()))
        .and_then(handle_predict);

    let health_route = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::any().map(move || health.clone()))
        .and_then(|checker: HealthChecker| async move {
            let status = checker.get_status().await;
            Ok::<_, Rejection>(warp::reply::json(&status))
        });

    let metrics_route = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_orchestrator(orchestrator))
        .and_then(handle_metrics);

    predict
        .or(health_route)
        .or(metrics_route)
        .with(cors)
        .with(warp::trace::request())
        .recover(handle_rejection)
}

fn with_orchestrator(
    orchestrator: Arc<PredictionOrchestrator>,
) -> impl Filter<Extract = (Arc<PredictionOrchestrator>,), Error = Infallible> + Clone {
    warp::any().map(move || orchestrator.clone())
}

async fn handle_predict(
    body: Bytes,
    orchestrator: Arc<PredictionOrchestrator>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, Infallible> {
    let request = match PredictRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("❌ Rejected request: {}", e);
            if let Some(metrics) = orchestrator.metrics() {
                metrics.record_rejected();
            }
            return Ok(error_reply(&e));
        }
    };

    match orchestrator.predict(&request.last_5_numbers).await {
        Ok(response) => Ok(warp::reply::with_status(
            warp::reply::json(&response),
            StatusCode::OK,
        )),
        Err(e) => Ok(error_reply(&e)),
    }
}

async fn handle_metrics(
    orchestrator: Arc<PredictionOrchestrator>,
) -> Result<warp::reply::Response, Infallible> {
    let rendered = orchestrator.metrics().map(|metrics| metrics.render());

    let response = match rendered {
        Some(Ok(text)) => warp::reply::with_header(
            text,
            "content-type",
            "text/plain; version=0.0.4",
        )
        .into_response(),
        Some(Err(e)) => {
            tracing::error!("❌ Failed to render metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    };

    Ok(response)
}

fn error_reply(e: &PredictionError) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&ErrorResponse::from(e)),
        StatusCode::BAD_REQUEST,
    )
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "payload too large")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
    } else if err.find::<warp::cors::CorsForbidden>().is_some() {
        (StatusCode::FORBIDDEN, "CORS request forbidden")
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorResponse {
            error: message.to_string(),
        }),
        code,
    ))
}

use std::net::SocketAddr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;

use crate::error::{AppError, field_errors_json};
use crate::state::SharedState;
use crate::submission::{SubmitOutcome, metadata, parser};

pub async fn validate(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let draft = parser::parse_draft(content_type, &body).map_err(AppError::BadRequest)?;

    let errors = state.pipeline.validate(&draft);

    Ok(Json(json!({
        "valid": errors.is_empty(),
        "errors": field_errors_json(&errors),
    })))
}

pub async fn submit(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let ip = metadata::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies);
    state
        .submission_limiter
        .check(ip, state.config.rate_limit, state.config.rate_limit_window_secs)
        .map_err(AppError::RateLimited)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let draft = parser::parse_draft(content_type, &body).map_err(AppError::BadRequest)?;

    let record = match state.pipeline.submit(&draft).await {
        SubmitOutcome::Success(record) => record,
        SubmitOutcome::ValidationFailed(errors) => return Err(AppError::Unprocessable(errors)),
        SubmitOutcome::StorageFailed(err) => return Err(AppError::Storage(err)),
    };

    // Plain HTML form posts go back to the site instead of receiving JSON.
    if let Some(ref url) = state.config.redirect_url {
        if content_type.is_some_and(|ct| ct.contains("form")) {
            return Ok(Redirect::to(url).into_response());
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "created",
            "submission_id": record.id,
            "created_at": record.created_at,
        })),
    )
        .into_response())
}

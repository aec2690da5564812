use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_core::ShortCode;
use burrow_shortener::{ExpirationPolicy, ShortenParams};
use tracing::debug;
use validator::Validate;

/// `POST /api/url`
///
/// Returns `201 Created` with the short URL and its expiry.
pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUrlResponse>)> {
    let Json(request) = payload?;
    request.validate()?;

    let mut params = ShortenParams::new(request.original_url);
    if let Some(code) = request.custom_code {
        params = params.with_alias(ShortCode::new(code)?);
    }
    if let Some(hours) = request.duration {
        params = params.with_expiration(ExpirationPolicy::after_hours(hours));
    }

    let created = state.shortener.shorten(params).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUrlResponse {
            short_url: created.short_url,
            expire_at: created.expire_at,
        }),
    ))
}

/// `GET /{code}`
///
/// Answers `302 Found` pointing at the original URL.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = parse_path_code(code)?;
    let url = state.shortener.resolve(&code).await?;

    debug!(code = %code, url = %url, "redirecting");
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

/// `DELETE /api/url/{code}`
pub async fn delete_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let code = parse_path_code(code)?;
    state.shortener.delete(&code).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// A path segment that is not a well-formed code cannot name a record.
fn parse_path_code(code: String) -> Result<ShortCode> {
    ShortCode::new(code.as_str())
        .map_err(|_| AppError::NotFound(format!("short code not found: {code}")))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::analytics::{self, LinkView, StatsResponse};
use crate::models::{DecodeQuery, EncodeRequest, Link};
use crate::shortcode;
use crate::storage::{Storage, StorageError};

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub base_url: String,
    pub code_length: usize,
}

impl AppState {
    fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeResponse {
    pub original_url: String,
    pub short_url: String,
    pub url_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EncodeResponse {
    fn new(link: &Link, message: Option<&str>) -> Self {
        Self {
            original_url: link.original_url.clone(),
            short_url: link.short_url.clone(),
            url_path: link.short_code.clone(),
            message: message.map(String::from),
        }
    }
}

fn internal_error(msg: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
}

fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "URL not found".to_string(),
        }),
    )
}

/// Shorten a URL
///
/// Destinations are deduplicated: encoding an already-shortened URL
/// returns the existing mapping with a marker message instead of minting
/// a second code.
pub async fn encode_url(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EncodeRequest>,
) -> Result<(StatusCode, Json<EncodeResponse>), (StatusCode, Json<ErrorResponse>)> {
    let original_url = match payload.original_url {
        Some(url) if !url.is_empty() => url,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Original URL is required".to_string(),
                }),
            ));
        }
    };

    match state.storage.find_by_destination(&original_url).await {
        Ok(Some(existing)) => {
            return Ok((
                StatusCode::OK,
                Json(EncodeResponse::new(&existing, Some("URL already shortened"))),
            ));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, "failed to check for existing destination");
            return Err(internal_error("Server error"));
        }
    }

    // The pre-check above is only an optimization; the store's unique
    // insert is what actually closes the race. Retry on code collisions,
    // widening the candidate length as they accumulate.
    for attempt in 0..shortcode::MAX_CODE_ATTEMPTS {
        let code = shortcode::generate(shortcode::length_for_attempt(state.code_length, attempt));
        let short_url = state.short_url(&code);

        match state.storage.create(&code, &original_url, &short_url).await {
            Ok(link) => {
                return Ok((StatusCode::CREATED, Json(EncodeResponse::new(&link, None))));
            }
            Err(StorageError::DuplicateCode) => {
                tracing::debug!(short_code = %code, attempt, "short code collision, retrying");
                continue;
            }
            Err(StorageError::DuplicateDestination) => {
                // A concurrent encode of the same destination won the race
                return match state.storage.find_by_destination(&original_url).await {
                    Ok(Some(existing)) => Ok((
                        StatusCode::OK,
                        Json(EncodeResponse::new(&existing, Some("URL already shortened"))),
                    )),
                    Ok(None) => Err(internal_error("Server error")),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to fetch deduplicated destination");
                        Err(internal_error("Server error"))
                    }
                };
            }
            Err(StorageError::Other(e)) => {
                tracing::error!(error = %e, "failed to create shortened URL");
                return Err(internal_error("Server error"));
            }
        }
    }

    tracing::error!(
        attempts = shortcode::MAX_CODE_ATTEMPTS,
        "exhausted short code generation attempts"
    );
    Err(internal_error("Failed to generate unique short code"))
}

/// Resolve a short URL (or bare code) back to its destination
pub async fn decode_url(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DecodeQuery>,
) -> Result<Json<EncodeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let short_url = match query.short_url {
        Some(s) if !s.is_empty() => s,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Short URL is required".to_string(),
                }),
            ));
        }
    };

    // The code is the trailing path segment; a bare code has no '/' and
    // passes through unchanged.
    let code = short_url.rsplit('/').next().unwrap_or(short_url.as_str());

    match state.storage.find_by_code(code).await {
        Ok(Some(link)) => Ok(Json(EncodeResponse::new(&link, None))),
        Ok(None) => Err(not_found()),
        Err(e) => {
            tracing::error!(error = %e, "failed to decode short URL");
            Err(internal_error("Server error"))
        }
    }
}

/// List all links, newest first
pub async fn list_urls(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LinkView>>, (StatusCode, Json<ErrorResponse>)> {
    match state.storage.list().await {
        Ok(links) => Ok(Json(links.iter().map(LinkView::from).collect())),
        Err(e) => {
            tracing::error!(error = %e, "failed to list URLs");
            Err(internal_error("Server error"))
        }
    }
}

/// Summary statistics for one short code, aggregated from its visit log
pub async fn url_stats(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<StatsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let link = match state.storage.find_by_code(&code).await {
        Ok(Some(link)) => link,
        Ok(None) => return Err(not_found()),
        Err(e) => {
            tracing::error!(error = %e, "failed to look up link for stats");
            return Err(internal_error("Server error"));
        }
    };

    match state.storage.visits_for_code(&code).await {
        Ok(visits) => Ok(Json(analytics::build_stats(&link, &visits))),
        Err(e) => {
            tracing::error!(error = %e, short_code = %code, "failed to load visits");
            Err(internal_error("Server error"))
        }
    }
}

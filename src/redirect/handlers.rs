use axum::{
    extract::{ConnectInfo, Path, State},
    http::{
        header::{HeaderMap, HeaderValue, LOCATION, REFERER, USER_AGENT},
        StatusCode,
    },
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::storage::Storage;

pub struct RedirectState {
    pub storage: Arc<dyn Storage>,
}

/// Redirect to the original URL and record the visit.
///
/// The click increment is the gate: an unknown code means no redirect and
/// no visit record. The visit append runs fire-and-forget after the
/// increment, so a failed append degrades analytics without delaying or
/// failing the user-visible redirect.
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let link = match state.storage.increment_clicks(&code).await {
        Ok(Some(link)) => link,
        Ok(None) => return (StatusCode::NOT_FOUND, "URL not found").into_response(),
        Err(e) => {
            tracing::error!(short_code = %code, error = %e, "failed to increment clicks");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    let ip_address = client_ip(&headers, addr);
    let user_agent = header_string(&headers, USER_AGENT.as_str());
    let referrer =
        header_string(&headers, REFERER.as_str()).or_else(|| header_string(&headers, "referrer"));

    let storage = Arc::clone(&state.storage);
    tokio::spawn(async move {
        if let Err(e) = storage
            .record_visit(
                &code,
                ip_address.as_deref(),
                user_agent.as_deref(),
                referrer.as_deref(),
            )
            .await
        {
            tracing::warn!(short_code = %code, error = %e, "failed to record visit");
        }
    });

    match HeaderValue::from_str(&link.original_url) {
        Ok(location) => {
            let mut response_headers = HeaderMap::new();
            response_headers.insert(LOCATION, location);
            (StatusCode::FOUND, response_headers).into_response()
        }
        Err(_) => {
            tracing::error!(short_code = %link.short_code, "destination URL is not a valid Location header");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Client IP as an opaque string: first X-Forwarded-For entry when the
/// header is present, otherwise the socket peer address.
fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|h| h.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    Some(addr.ip().to_string())
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(String::from)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

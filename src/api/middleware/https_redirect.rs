//! HTTPS redirect middleware.
//!
//! TLS is terminated by the reverse proxy in front of this service, so
//! plain-HTTP requests are detected via the `x-forwarded-proto` header.
//! Active only when `FORCE_HTTPS` is set.

use axum::{
    extract::{Request, State},
    http::{header::HOST, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::api::AppState;

/// Redirect plain-HTTP requests to their HTTPS equivalent.
pub async fn https_redirect_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.force_https {
        return next.run(request).await;
    }

    let forwarded_proto = request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok());

    if forwarded_proto != Some("http") {
        // Already HTTPS, or no proxy header to go on
        return next.run(request).await;
    }

    let Some(host) = request.headers().get(HOST).and_then(|h| h.to_str().ok()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    // 308 preserves the request method across the redirect
    Redirect::permanent(&format!("https://{}{}", host, path_and_query)).into_response()
}

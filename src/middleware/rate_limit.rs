use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::utils::client_ip;
use crate::utils::rate_limiter::RateLimiter;

/// General API quota, keyed by client IP
pub async fn api_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(state.api_limiter.as_ref(), request, next).await
}

/// Tighter quota for comment writes
pub async fn comment_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(state.comment_limiter.as_ref(), request, next).await
}

/// Client address for the request, honoring proxy headers
pub fn request_ip(request: &Request) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    client_ip(request.headers(), peer)
}

async fn enforce(limiter: Option<&RateLimiter>, request: Request, next: Next) -> Response {
    let Some(limiter) = limiter else {
        return next.run(request).await;
    };

    let ip = request_ip(&request);
    if limiter.allow(&ip).await {
        return next.run(request).await;
    }

    tracing::warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
    let mut response = ApiError::too_many_requests("Rate limit exceeded").into_response();
    if let Ok(value) = HeaderValue::from_str(&limiter.window().as_secs().to_string()) {
        response.headers_mut().insert(RETRY_AFTER, value);
    }
    response
}

use std::time::Instant;

use axum::{extract::Request, middleware::{self, Next}, response::{IntoResponse, Response}, routing::get, Router};
use ::http::{header, HeaderValue, Method, StatusCode};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

pub fn app(router: Router) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(router)
        .layer(middleware::from_fn(log_requests))
        .layer(middleware::from_fn(cors))
}

/// Answers preflight requests directly and stamps CORS headers on everything else.
async fn cors(req: Request, next: Next) -> Response {
    let mut res = if req.method() == Method::OPTIONS { StatusCode::OK.into_response() } else { next.run(req).await };
    let headers = res.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    res
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();
    let res = next.run(req).await;
    tracing::info!(%method, %path, status = res.status().as_u16(), elapsed_ms = started.elapsed().as_millis() as u64, "request");
    res
}

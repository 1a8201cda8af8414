use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;

/// Logging middleware for HTTP requests
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let version = request.version();
    let start_time = Instant::now();
    let response = next.run(request).await;
    let duration = start_time.elapsed();
    let status = response.status();

    info!(
        "{} {} -- {:?} {} (served in {:.3}ms; {} bytes)",
        method,
        path,
        version,
        status,
        duration.as_secs_f64() * 1000.0,
        response_size(&response)
    );

    response
}

fn response_size(response: &Response) -> usize {
    response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0)
}

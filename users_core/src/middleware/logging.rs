//! Request tracing layer

use std::time::Duration;

use axum::{body::Body, extract::MatchedPath};
use http::{Request, Response};
use tower_http::classify::{ServerErrorsAsFailures, ServerErrorsFailureClass, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::{info_span, Span};

pub fn logging_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> Span + Clone,
    (),
    impl Fn(&Response<Body>, Duration, &Span) + Clone,
    (),
    (),
    impl Fn(ServerErrorsFailureClass, Duration, &Span) + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let route = request
                .extensions()
                .get::<MatchedPath>()
                .map(|path| path.as_str().to_string());

            info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                route = route.as_deref().unwrap_or(""),
                request_id = %uuid::Uuid::new_v4(),
            )
        })
        .on_request(())
        .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
            let status = response.status();
            let latency_ms = latency.as_millis() as u64;

            if status.is_server_error() {
                tracing::error!(status = status.as_u16(), latency_ms, "request failed");
            } else if status.is_client_error() {
                tracing::warn!(status = status.as_u16(), latency_ms, "request rejected");
            } else {
                tracing::info!(status = status.as_u16(), latency_ms, "request completed");
            }
        })
        .on_body_chunk(())
        .on_eos(())
        .on_failure(|error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
            tracing::error!(latency_ms = latency.as_millis() as u64, error = %error, "request errored");
        })
}

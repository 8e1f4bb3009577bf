//! Access logging on top of `TraceLayer`.
//!
//! Outside production every request gets a start event with its headers and
//! a response event with latency. In production only one concise line per
//! response is emitted, carrying the combined-log fields on its span.

use std::{net::SocketAddr, time::Duration};

use axum::{
    body::HttpBody,
    extract::ConnectInfo,
    http::{header, Request, Response},
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::{field::Empty, Span};

#[derive(Debug, Clone, Copy)]
pub struct AccessLog {
    production: bool,
}

pub type AccessLogLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, AccessLog, AccessLog, AccessLog>;

pub fn layer(production: bool) -> AccessLogLayer {
    let log = AccessLog { production };
    TraceLayer::new_for_http()
        .make_span_with(log)
        .on_request(log)
        .on_response(log)
}

fn header_str<B>(request: &Request<B>, name: header::HeaderName) -> &str {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// Peer address recorded by `into_make_service_with_connect_info`.
fn remote_addr<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Response size from `content-length`, or from the body when its length is
/// known up front.
fn response_bytes<B: HttpBody>(response: &Response<B>) -> Option<u64> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .or_else(|| response.body().size_hint().exact())
}

impl<B> MakeSpan<B> for AccessLog {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http_request",
            remote_addr = %remote_addr(request),
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
            referrer = header_str(request, header::REFERER),
            user_agent = header_str(request, header::USER_AGENT),
            status = Empty,
            latency_ms = Empty,
            bytes = Empty,
        )
    }
}

impl<B> OnRequest<B> for AccessLog {
    fn on_request(&mut self, request: &Request<B>, _span: &Span) {
        if !self.production {
            tracing::debug!(headers = ?request.headers(), "started processing request");
        }
    }
}

impl<B: HttpBody> OnResponse<B> for AccessLog {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let status = response.status();
        let latency_ms = latency.as_millis() as u64;
        span.record("status", tracing::field::display(status));
        span.record("latency_ms", latency_ms);
        if let Some(bytes) = response_bytes(response) {
            span.record("bytes", bytes);
        }
        if status.is_server_error() {
            tracing::error!(%status, latency_ms, "response");
        } else if self.production {
            tracing::info!(%status, "response");
        } else {
            tracing::info!(%status, latency_ms, "finished processing request");
        }
    }
}

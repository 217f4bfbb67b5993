//! Outbound trace propagation.
//!
//! Calls made through [`TracedClientExt`] carry the current span as a W3C
//! `traceparent` (plus `tracestate` when set) and the inbound `x-request-id`.
//! See https://www.w3.org/TR/trace-context/

use opentelemetry::trace::{SpanContext, TraceContextExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use std::time::Duration;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub const TRACEPARENT_HEADER: &str = "traceparent";
pub const TRACESTATE_HEADER: &str = "tracestate";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// `version-trace_id-span_id-trace_flags`
fn traceparent(span_context: &SpanContext) -> String {
    format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    )
}

/// Headers for an outbound call made within the current span.
pub fn inject_trace_headers(headers: &mut HeaderMap, request_id: Option<&str>) {
    let context = Span::current().context();
    let span = context.span();
    let span_context = span.span_context();

    if span_context.is_valid() {
        if let Ok(value) = HeaderValue::from_str(&traceparent(span_context)) {
            headers.insert(TRACEPARENT_HEADER, value);
        }

        let state = span_context.trace_state().header();
        if !state.is_empty()
            && let Ok(value) = HeaderValue::from_str(&state)
        {
            headers.insert(TRACESTATE_HEADER, value);
        }
    }

    if let Some(id) = request_id
        && let Ok(value) = HeaderValue::from_str(id)
    {
        headers.insert(REQUEST_ID_HEADER, value);
    }
}

/// Request builder whose trace headers are attached at send time, inside
/// whatever span the caller is in.
pub struct TracedRequest {
    builder: RequestBuilder,
    request_id: Option<String>,
}

impl TracedRequest {
    fn map(self, f: impl FnOnce(RequestBuilder) -> RequestBuilder) -> Self {
        Self {
            builder: f(self.builder),
            request_id: self.request_id,
        }
    }

    pub fn json<T: serde::Serialize + ?Sized>(self, body: &T) -> Self {
        self.map(|b| b.json(body))
    }

    pub fn query<T: serde::Serialize + ?Sized>(self, query: &T) -> Self {
        self.map(|b| b.query(query))
    }

    pub fn bearer_auth<T: std::fmt::Display>(self, token: T) -> Self {
        self.map(|b| b.bearer_auth(token))
    }

    /// Overrides the client-wide timeout for this call.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.map(|b| b.timeout(timeout))
    }

    pub fn request_id(mut self, request_id: Option<&str>) -> Self {
        self.request_id = request_id.map(str::to_string);
        self
    }

    pub async fn send(self) -> Result<reqwest::Response, reqwest::Error> {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, self.request_id.as_deref());
        self.builder.headers(headers).send().await
    }
}

pub trait TracedClientExt {
    fn traced(&self, method: Method, url: &str) -> TracedRequest;

    fn traced_get(&self, url: &str) -> TracedRequest {
        self.traced(Method::GET, url)
    }

    fn traced_post(&self, url: &str) -> TracedRequest {
        self.traced(Method::POST, url)
    }

    fn traced_put(&self, url: &str) -> TracedRequest {
        self.traced(Method::PUT, url)
    }
}

impl TracedClientExt for Client {
    fn traced(&self, method: Method, url: &str) -> TracedRequest {
        TracedRequest {
            builder: self.request(method, url),
            request_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{SpanId, TraceFlags, TraceId, TraceState};

    #[test]
    fn request_id_without_active_span() {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, Some("req-42"));

        assert_eq!(headers.get(REQUEST_ID_HEADER).unwrap(), "req-42");
        assert!(headers.get(TRACEPARENT_HEADER).is_none());
    }

    #[test]
    fn nothing_to_inject() {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, None);
        assert!(headers.is_empty());
    }

    #[test]
    fn traceparent_format() {
        let span_context = SpanContext::new(
            TraceId::from_hex("0af7651916cd43dd8448eb211c80319c").unwrap(),
            SpanId::from_hex("b7ad6b7169203331").unwrap(),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        assert_eq!(
            traceparent(&span_context),
            "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01"
        );
    }

    #[test]
    fn traced_request_carries_request_id() {
        let client = Client::new();
        let request = client
            .traced_get("http://127.0.0.1:9/reservations")
            .request_id(Some("req-7"))
            .query(&[("page", "1")]);

        assert_eq!(request.request_id.as_deref(), Some("req-7"));
        let built = request.builder.build().unwrap();
        assert_eq!(built.url().query(), Some("page=1"));
    }
}

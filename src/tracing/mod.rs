use axum::http::Request;
use std::{cell::RefCell, fmt, future::Future};
use tower_http::{
    classify::{SharedClassifier, StatusInRangeAsFailures},
    trace::{
        DefaultOnBodyChunk, DefaultOnEos, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse,
        MakeSpan, TraceLayer,
    },
};
use uuid::Uuid;

/// Request ID tracking information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl Default for RequestId {
    fn default() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }
}

impl RequestId {
    pub fn new(value: impl Into<String>) -> Self {
        RequestId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

tokio::task_local! {
    static CURRENT_REQUEST_ID: RefCell<Option<RequestId>>;
}

/// Runs `future` with `request_id` visible to [`current_request_id`].
pub async fn scope_request_id<Fut, R>(request_id: RequestId, future: Fut) -> R
where
    Fut: Future<Output = R>,
{
    CURRENT_REQUEST_ID
        .scope(RefCell::new(Some(request_id)), future)
        .await
}

pub fn current_request_id() -> Option<RequestId> {
    CURRENT_REQUEST_ID
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
}

/// Id for the request span: the extension set by the middleware, then the
/// incoming header, then a fresh one.
pub fn span_request_id<B>(request: &Request<B>) -> RequestId {
    request
        .extensions()
        .get::<RequestId>()
        .cloned()
        .or_else(|| {
            request
                .headers()
                .get(crate::middleware_helpers::REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(RequestId::new)
        })
        .unwrap_or_default()
}

#[derive(Clone, Default)]
pub struct RequestSpanMaker;

impl<B> MakeSpan<B> for RequestSpanMaker {
    fn make_span(&mut self, request: &Request<B>) -> tracing::Span {
        let request_id = span_request_id(request);

        tracing::info_span!(
            "http.request",
            request_id = %request_id.as_str(),
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}

/// HTTP trace layer: 5xx responses are classified as failures.
pub fn configure_http_tracing() -> TraceLayer<
    SharedClassifier<StatusInRangeAsFailures>,
    RequestSpanMaker,
    DefaultOnRequest,
    DefaultOnResponse,
    DefaultOnBodyChunk,
    DefaultOnEos,
    DefaultOnFailure,
> {
    let classifier = SharedClassifier::new(StatusInRangeAsFailures::new(500..=599));
    TraceLayer::new(classifier)
        .make_span_with(RequestSpanMaker)
        .on_request(DefaultOnRequest::default())
        .on_response(DefaultOnResponse::default())
        .on_body_chunk(DefaultOnBodyChunk::default())
        .on_eos(DefaultOnEos::default())
        .on_failure(DefaultOnFailure::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_id_is_visible_inside_scope_only() {
        assert!(current_request_id().is_none());

        let inside = scope_request_id(RequestId::new("rid-7"), async { current_request_id() }).await;
        assert_eq!(inside, Some(RequestId::new("rid-7")));

        assert!(current_request_id().is_none());
    }

    #[test]
    fn span_id_prefers_extension_then_header() {
        let mut request = Request::builder()
            .uri("/api/v1/orders")
            .header("x-request-id", "from-header")
            .body(())
            .unwrap();
        assert_eq!(span_request_id(&request), RequestId::new("from-header"));

        request.extensions_mut().insert(RequestId::new("from-extension"));
        assert_eq!(span_request_id(&request), RequestId::new("from-extension"));

        let bare = Request::builder().uri("/").body(()).unwrap();
        let generated = span_request_id(&bare);
        assert!(Uuid::parse_str(generated.as_str()).is_ok());
        assert_ne!(generated, span_request_id(&bare));

        let _span = RequestSpanMaker.make_span(&request);
    }
}

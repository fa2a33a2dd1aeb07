//! Tower layer that resolves, propagates and echoes `X-Request-Id`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context as TaskContext, Poll};

use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tracing::instrument::Instrumented;
use tracing::{Instrument, Span};

use crate::context::{with_request_id, Context};
use crate::provider::{DefaultRequestIdProvider, MakeRequestId};

/// Header carrying the identifier on requests and responses.
pub const HEADER: &str = "X-Request-Id";

/// [`HEADER`] as a typed header name.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Wraps services in [`RequestIdService`].
#[derive(Debug)]
pub struct RequestIdLayer<P> {
    provider: Arc<P>,
}

impl<P> RequestIdLayer<P> {
    /// Generate identifiers with `provider` when a request arrives without one.
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

impl Default for RequestIdLayer<DefaultRequestIdProvider> {
    fn default() -> Self {
        Self::new(DefaultRequestIdProvider)
    }
}

impl<P> Clone for RequestIdLayer<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<S, P> Layer<S> for RequestIdLayer<P> {
    type Service = RequestIdService<S, P>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService {
            inner,
            provider: Arc::clone(&self.provider),
        }
    }
}

/// Wrap `next` so every request through it has a resolved identifier.
pub fn middleware<S, P>(next: S, provider: P) -> RequestIdService<S, P> {
    RequestIdLayer::new(provider).layer(next)
}

/// Service produced by [`RequestIdLayer`].
///
/// For each request:
/// 1. take `X-Request-Id` from the request, or ask the provider when it is
///    absent or empty,
/// 2. layer the identifier onto the request's [`Context`] extension,
/// 3. call the inner service once, inside an `http_request` span,
/// 4. set `X-Request-Id` on the response.
#[derive(Debug)]
pub struct RequestIdService<S, P> {
    inner: S,
    provider: Arc<P>,
}

impl<S: Clone, P> Clone for RequestIdService<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<S, P> RequestIdService<S, P> {
    /// Borrow the wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Unwrap into the inner service, dropping the provider.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, P, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S, P>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    P: MakeRequestId,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let (request_id, header) = match inbound_request_id(req.headers()) {
            Some((id, value)) => (id.to_string(), Some(value.clone())),
            None => {
                let id = self.provider.make_request_id();
                let header = generated_header(&id);
                (id, header)
            }
        };

        let parent = req.extensions().get::<Context>().cloned().unwrap_or_default();
        req.extensions_mut()
            .insert(with_request_id(&parent, request_id.as_str()));

        let span = request_span(&request_id, req.method(), req.uri().path());
        let future = {
            let _entered = span.enter();
            tracing::debug!("Request id resolved");
            self.inner.call(req)
        };

        ResponseFuture {
            inner: future.instrument(span),
            header,
        }
    }
}

/// The caller-supplied identifier and its raw header value, if present and
/// non-empty.
///
/// The raw value is echoed byte for byte. Values that are not UTF-8 cannot
/// be carried as a string and are treated as absent.
fn inbound_request_id(headers: &HeaderMap) -> Option<(&str, &HeaderValue)> {
    let value = headers.get(&REQUEST_ID_HEADER)?;
    match std::str::from_utf8(value.as_bytes()) {
        Ok("") => None,
        Ok(id) => Some((id, value)),
        Err(_) => {
            tracing::debug!("Ignoring non-UTF-8 inbound request id");
            None
        }
    }
}

/// Response header for a provider-made identifier.
fn generated_header(request_id: &str) -> Option<HeaderValue> {
    match HeaderValue::from_str(request_id) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                error = %e,
                request_id = ?request_id,
                "Request id is not a valid header value, omitting response header"
            );
            None
        }
    }
}

/// Span wrapping one request; `status` is recorded when the inner service
/// responds.
fn request_span(request_id: &str, method: &Method, path: &str) -> Span {
    tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = tracing::field::Empty,
    )
}

pin_project! {
    /// Response future for [`RequestIdService`].
    pub struct ResponseFuture<F> {
        #[pin]
        inner: Instrumented<F>,
        header: Option<HeaderValue>,
    }
}

impl<F, ResBody, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        let mut response = ready!(this.inner.as_mut().poll(cx))?;

        this.inner
            .span()
            .record("status", response.status().as_u16());

        if let Some(value) = this.header.take() {
            response
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), value);
        }

        Poll::Ready(Ok(response))
    }
}

//! axum extractors for the request context and identifier.

use std::convert::Infallible;
use std::fmt;
use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::context::{get_from_context, Context};

/// Extracts the request's [`Context`], or an empty one when no layer ran.
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Context>().cloned().unwrap_or_default())
    }
}

/// The identifier resolved by [`RequestIdLayer`](crate::RequestIdLayer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for RequestId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejection used when a handler asks for a [`RequestId`] but the layer is
/// not installed in front of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestIdRejection;

impl IntoResponse for RequestIdRejection {
    fn into_response(self) -> Response {
        tracing::error!("RequestId extracted without RequestIdLayer installed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "request id layer is not installed",
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = RequestIdRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        get_from_context(parts.extensions.get::<Context>())
            .map(|id| RequestId(id.to_string()))
            .ok_or(RequestIdRejection)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;
    use crate::context::with_request_id;

    fn parts_with(ctx: Option<Context>) -> Parts {
        let mut req = Request::new(());
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req.into_parts().0
    }

    #[tokio::test]
    async fn test_context_defaults_to_background() {
        let mut parts = parts_with(None);
        let ctx = Context::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(get_from_context(Some(&ctx)), None);
        assert_eq!(ctx.depth(), 0);
    }

    #[tokio::test]
    async fn test_request_id_from_context() {
        let ctx = with_request_id(&Context::background(), "abc");
        let mut parts = parts_with(Some(ctx));

        let id = RequestId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id.as_str(), "abc");
        assert_eq!(id.to_string(), "abc");
    }

    #[tokio::test]
    async fn test_missing_request_id_is_rejected() {
        let mut parts = parts_with(None);
        let rejection = RequestId::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();

        assert_eq!(rejection, RequestIdRejection);
        assert_eq!(
            rejection.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

//! Pattern-gated passthrough transport.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::pattern::RequestPattern;
use crate::transport::Transport;

/// Forwards to `inner` only when `pattern` matches; otherwise fails with
/// [`TransportError::PatternNotMatched`].
#[derive(Debug, Clone)]
pub struct MatchingTransport<T> {
    pattern: RequestPattern,
    inner: T,
}

impl<T: Transport> MatchingTransport<T> {
    pub fn new(pattern: RequestPattern, inner: T) -> Self {
        Self { pattern, inner }
    }

    pub fn pattern(&self) -> &RequestPattern {
        &self.pattern
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for MatchingTransport<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if !self.pattern.matches(&request) {
            return Err(TransportError::PatternNotMatched);
        }
        self.inner.send(request).await
    }
}

//! Fixed-response transport for tests and previews.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// A response served by the test-double transports.
#[derive(Debug, Clone, PartialEq)]
pub struct CannedResponse {
    pub body: Bytes,
    pub status: u16,
    pub headers: Option<Vec<(String, String)>>,
}

impl CannedResponse {
    /// A 200 response with `body` and no headers.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            status: 200,
            headers: None,
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(Bytes::copy_from_slice(text.as_bytes()))
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::to_vec(value)?))
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    pub fn to_response(&self) -> HttpResponse {
        HttpResponse {
            status: self.status,
            headers: self.headers.clone().unwrap_or_default(),
            body: self.body.clone(),
        }
    }
}

/// Answers every request with the same [`CannedResponse`].
#[derive(Debug, Clone)]
pub struct CannedTransport {
    response: CannedResponse,
}

impl CannedTransport {
    pub fn new(response: CannedResponse) -> Self {
        Self { response }
    }

    /// Shorthand for a text body with the given status.
    pub fn text(text: &str, status: u16) -> Self {
        Self::new(CannedResponse::from_text(text).with_status(status))
    }

    pub fn response(&self) -> &CannedResponse {
        &self.response
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if request.url.is_none() {
            return Err(TransportError::MissingUrl);
        }
        Ok(self.response.to_response())
    }
}

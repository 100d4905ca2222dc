//! Transports: the layer that actually sends a request, or pretends to.
//!
//! # Design
//! [`Transport`] is a single async method from `HttpRequest` to
//! `HttpResponse`. Every status code is data at this layer; interpreting it
//! is the network service's job. Errors are propagated as-is.
//!
//! - [`UreqTransport`] talks to real servers.
//! - [`CannedTransport`] always answers with one fixed response.
//! - [`CannedRoutesTransport`] picks a response from a routing table.
//! - [`MatchingTransport`] forwards to another transport only when the
//!   request matches a pattern, which lets tests assert where calls go.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

pub mod canned;
pub mod live;
pub mod matching;
pub mod routes;

pub use canned::{CannedResponse, CannedTransport};
pub use live::UreqTransport;
pub use matching::MatchingTransport;
pub use routes::{CannedRoute, CannedRoutesTransport, RouteMode};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

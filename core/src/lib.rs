//! Declarative endpoint networking core.
//!
//! # Overview
//! Describe an HTTP call as an endpoint, pick an environment (base URL), and
//! let [`NetworkService`] build the request, optionally add the bearer token,
//! send it through a [`Transport`], check the status and decode the JSON body.
//!
//! # Design
//! - Endpoints are a trait ([`ApiEndpoint`]) so a closed enum of API calls can
//!   describe itself; [`Endpoint`] covers ad-hoc calls.
//! - Transports are injected. [`UreqTransport`] is the live one; the canned,
//!   routing and matching transports are test doubles that never touch the
//!   network.
//! - The bearer token lives in a [`CredentialStore`] behind [`AuthService`].
//! - A 401 notifies an optional [`InvalidationHandler`] before the error is
//!   returned; nothing is retried.

pub mod auth;
pub mod credentials;
pub mod dates;
pub mod endpoint;
pub mod environment;
pub mod error;
pub mod http;
pub mod mock;
pub mod pattern;
pub mod service;
pub mod transport;

pub use auth::AuthService;
pub use credentials::{CredentialStore, FileCredentialStore, InMemoryCredentialStore};
pub use endpoint::{build_request, ApiEndpoint, Endpoint, JsonBody, Query};
pub use environment::Environment;
pub use error::{ApiError, CredentialStoreError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mock::MockNetworkService;
pub use pattern::RequestPattern;
pub use service::{
    InvalidationHandler, NetworkClient, NetworkService, NetworkServiceBuilder, ResponseLogger,
    TracingResponseLogger,
};
pub use transport::{
    CannedResponse, CannedRoute, CannedRoutesTransport, CannedTransport, MatchingTransport,
    RouteMode, Transport, UreqTransport,
};

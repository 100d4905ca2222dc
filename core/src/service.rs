//! The network service: endpoint + environment in, typed model out.
//!
//! # Design
//! Every call runs the same pipeline:
//! 1. build the request from the endpoint and the environment's base URL
//!    (panics when the base URL is missing),
//! 2. stamp the bearer token when the endpoint requires auth,
//! 3. send it through the transport,
//! 4. reject statuses outside `[200, 300)`, notifying the invalidation
//!    handler first when the status is 401,
//! 5. decode the body, or return the bare status.
//!
//! The service holds only shared, immutable collaborators, so one instance
//! can serve concurrent calls without locking. Nothing is retried.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, Span};

use crate::auth::AuthService;
use crate::endpoint::ApiEndpoint;
use crate::environment::Environment;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// Notified when the server rejects the current credential (HTTP 401).
///
/// The service awaits the notification before returning the error, and the
/// error is returned regardless of what the handler does.
#[async_trait]
pub trait InvalidationHandler: Send + Sync {
    async fn on_token_invalid(&self);
}

/// Diagnostic hook that sees every request/response pair, including failed
/// statuses. Off unless configured.
pub trait ResponseLogger: Send + Sync {
    fn log(&self, request: &HttpRequest, response: &HttpResponse);
}

/// Writes method, URL, status and body to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingResponseLogger;

impl ResponseLogger for TracingResponseLogger {
    fn log(&self, request: &HttpRequest, response: &HttpResponse) {
        let url = request.url.as_ref().map(|u| u.as_str()).unwrap_or("<none>");
        match std::str::from_utf8(&response.body) {
            Ok(text) => debug!(
                method = %request.method,
                url,
                status = response.status,
                body = text,
                "response"
            ),
            Err(_) => debug!(
                method = %request.method,
                url,
                status = response.status,
                bytes = response.body.len(),
                "response (non-UTF-8 body)"
            ),
        }
    }
}

/// The three call shapes every network client offers.
pub trait NetworkClient: Send + Sync {
    /// Decode the response body as a single `T`.
    fn fetch_one<T>(
        &self,
        endpoint: &dyn ApiEndpoint,
        environment: &Environment,
    ) -> impl Future<Output = Result<T, ApiError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Decode the response body as a JSON array of `T`.
    fn fetch_many<T>(
        &self,
        endpoint: &dyn ApiEndpoint,
        environment: &Environment,
    ) -> impl Future<Output = Result<Vec<T>, ApiError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Ignore the body and return the (successful) status code.
    fn fetch_status(
        &self,
        endpoint: &dyn ApiEndpoint,
        environment: &Environment,
    ) -> impl Future<Output = Result<u16, ApiError>> + Send;
}

#[derive(Clone)]
pub struct NetworkService {
    transport: Arc<dyn Transport>,
    auth: AuthService,
    invalidation_handler: Option<Arc<dyn InvalidationHandler>>,
    response_logger: Option<Arc<dyn ResponseLogger>>,
}

impl NetworkService {
    /// Live transport, in-memory token store, no hooks.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> NetworkServiceBuilder {
        NetworkServiceBuilder::default()
    }

    pub fn auth_service(&self) -> &AuthService {
        &self.auth
    }

    #[instrument(
        name = "network_request",
        skip_all,
        fields(
            http.method = %endpoint.method(),
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        )
    )]
    async fn execute(
        &self,
        endpoint: &dyn ApiEndpoint,
        environment: &Environment,
    ) -> Result<HttpResponse, ApiError> {
        let mut request = endpoint.to_request(environment.base_url())?;
        if let Some(url) = &request.url {
            Span::current().record("http.url", url.as_str());
        }

        if endpoint.requires_auth() {
            request = self.auth.authorize(request).await;
        }

        let logged_request = self.response_logger.as_ref().map(|_| request.clone());
        let response = self.transport.send(request).await?;
        Span::current().record("http.status_code", response.status);

        if let (Some(logger), Some(request)) = (&self.response_logger, &logged_request) {
            logger.log(request, &response);
        }

        if !response.is_success() {
            if response.status == 401 {
                if let Some(handler) = &self.invalidation_handler {
                    debug!("credential rejected, notifying invalidation handler");
                    handler.on_token_invalid().await;
                }
            }
            return Err(ApiError::InvalidStatusCode {
                status: response.status,
            });
        }

        Ok(response)
    }
}

impl Default for NetworkService {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NetworkService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkService")
            .field("auth", &self.auth)
            .field("invalidation_handler", &self.invalidation_handler.is_some())
            .field("response_logger", &self.response_logger.is_some())
            .finish_non_exhaustive()
    }
}

impl NetworkClient for NetworkService {
    async fn fetch_one<T>(
        &self,
        endpoint: &dyn ApiEndpoint,
        environment: &Environment,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        let response = self.execute(endpoint, environment).await?;
        serde_json::from_slice(&response.body).map_err(ApiError::Decoding)
    }

    async fn fetch_many<T>(
        &self,
        endpoint: &dyn ApiEndpoint,
        environment: &Environment,
    ) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        let response = self.execute(endpoint, environment).await?;
        serde_json::from_slice(&response.body).map_err(ApiError::Decoding)
    }

    async fn fetch_status(
        &self,
        endpoint: &dyn ApiEndpoint,
        environment: &Environment,
    ) -> Result<u16, ApiError> {
        Ok(self.execute(endpoint, environment).await?.status)
    }
}

#[derive(Default)]
pub struct NetworkServiceBuilder {
    transport: Option<Arc<dyn Transport>>,
    auth: Option<AuthService>,
    invalidation_handler: Option<Arc<dyn InvalidationHandler>>,
    response_logger: Option<Arc<dyn ResponseLogger>>,
}

impl NetworkServiceBuilder {
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Use an already shared transport, e.g. one a test keeps a handle to.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn auth_service(mut self, auth: AuthService) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn invalidation_handler(mut self, handler: Arc<dyn InvalidationHandler>) -> Self {
        self.invalidation_handler = Some(handler);
        self
    }

    pub fn response_logger(mut self, logger: Arc<dyn ResponseLogger>) -> Self {
        self.response_logger = Some(logger);
        self
    }

    pub fn build(self) -> NetworkService {
        NetworkService {
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(UreqTransport::new())),
            auth: self.auth.unwrap_or_default(),
            invalidation_handler: self.invalidation_handler,
            response_logger: self.response_logger,
        }
    }
}

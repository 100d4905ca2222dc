//! Bearer-token authentication on top of a [`CredentialStore`].

use std::fmt;
use std::sync::Arc;

use crate::credentials::{CredentialStore, InMemoryCredentialStore};
use crate::error::CredentialStoreError;
use crate::http::HttpRequest;

pub const DEFAULT_HEADER_FIELD: &str = "Authorization";
pub const DEFAULT_HEADER_VALUE_PREFIX: &str = "Bearer ";
pub const DEFAULT_CREDENTIAL_KEY: &str = "accessToken";

/// Loads the access token from a credential store and stamps it on requests
/// as `<header_field>: <header_value_prefix><token>`.
#[derive(Clone)]
pub struct AuthService {
    header_field: String,
    header_value_prefix: String,
    credential_key: String,
    store: Arc<dyn CredentialStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            header_field: DEFAULT_HEADER_FIELD.to_string(),
            header_value_prefix: DEFAULT_HEADER_VALUE_PREFIX.to_string(),
            credential_key: DEFAULT_CREDENTIAL_KEY.to_string(),
            store,
        }
    }

    pub fn with_header_field(mut self, field: impl Into<String>) -> Self {
        self.header_field = field.into();
        self
    }

    pub fn with_header_value_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.header_value_prefix = prefix.into();
        self
    }

    pub fn with_credential_key(mut self, key: impl Into<String>) -> Self {
        self.credential_key = key.into();
        self
    }

    pub fn header_field(&self) -> &str {
        &self.header_field
    }

    pub fn header_value_prefix(&self) -> &str {
        &self.header_value_prefix
    }

    pub fn credential_key(&self) -> &str {
        &self.credential_key
    }

    /// The stored token, if any.
    ///
    /// Store failures are logged and reported as `None`, so "never logged in"
    /// and "storage unreadable" look the same to the caller.
    pub async fn load_token(&self) -> Option<String> {
        match self.store.load(&self.credential_key).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(
                    key = %self.credential_key,
                    error = %e,
                    "failed to load access token"
                );
                None
            }
        }
    }

    pub async fn save_token(&self, token: &str) -> Result<(), CredentialStoreError> {
        self.store.save(&self.credential_key, token).await
    }

    pub async fn delete_token(&self) -> Result<(), CredentialStoreError> {
        self.store.delete(&self.credential_key).await
    }

    /// Return `request` with the auth header set when a token is available,
    /// replacing any previous value of that header. Unchanged otherwise.
    pub async fn authorize(&self, mut request: HttpRequest) -> HttpRequest {
        if let Some(token) = self.load_token().await {
            request.set_header(
                self.header_field.clone(),
                format!("{}{token}", self.header_value_prefix),
            );
        }
        request
    }
}

impl Default for AuthService {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryCredentialStore::new()))
    }
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("header_field", &self.header_field)
            .field("header_value_prefix", &self.header_value_prefix)
            .field("credential_key", &self.credential_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use async_trait::async_trait;
    use tracing_test::traced_test;
    use url::Url;

    struct BrokenStore;

    #[async_trait]
    impl CredentialStore for BrokenStore {
        async fn save(&self, _key: &str, _secret: &str) -> Result<(), CredentialStoreError> {
            Err(CredentialStoreError::Encoding("refused".into()))
        }

        async fn load(&self, _key: &str) -> Result<Option<String>, CredentialStoreError> {
            Err(CredentialStoreError::Decoding("corrupt".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CredentialStoreError> {
            Err(CredentialStoreError::Backend {
                operation: "delete",
                source: std::io::Error::other("locked"),
            })
        }
    }

    fn request() -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, Url::parse("https://api.example.com/me").unwrap())
    }

    #[test]
    fn defaults() {
        let auth = AuthService::default();
        assert_eq!(auth.header_field(), "Authorization");
        assert_eq!(auth.header_value_prefix(), "Bearer ");
        assert_eq!(auth.credential_key(), "accessToken");
    }

    #[tokio::test]
    async fn save_load_delete_token() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let auth = AuthService::new(store.clone());

        assert!(auth.load_token().await.is_none());
        auth.save_token("tok").await.unwrap();
        assert_eq!(store.load("accessToken").await.unwrap().as_deref(), Some("tok"));
        assert_eq!(auth.load_token().await.as_deref(), Some("tok"));

        auth.delete_token().await.unwrap();
        assert!(auth.load_token().await.is_none());
    }

    #[tokio::test]
    async fn authorize_adds_header() {
        let auth = AuthService::default();
        auth.save_token("tok").await.unwrap();
        let req = auth.authorize(request()).await;
        assert_eq!(req.header("Authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn authorize_preserves_other_headers_and_overwrites_its_own() {
        let auth = AuthService::default();
        auth.save_token("new").await.unwrap();

        let mut req = request();
        req.set_header("X-Custom", "kept");
        req.set_header("authorization", "Bearer stale");

        let req = auth.authorize(req).await;
        assert_eq!(req.header("X-Custom"), Some("kept"));
        assert_eq!(req.header("Authorization"), Some("Bearer new"));
        assert_eq!(req.headers.len(), 2);
    }

    #[tokio::test]
    async fn authorize_without_token_is_a_no_op() {
        let auth = AuthService::default();
        let req = auth.authorize(request()).await;
        assert_eq!(req, request());
    }

    #[tokio::test]
    async fn custom_header_prefix_and_key() {
        let store = Arc::new(InMemoryCredentialStore::new());
        store.save("apiKey", "k-1").await.unwrap();
        let auth = AuthService::new(store)
            .with_header_field("X-Api-Key")
            .with_header_value_prefix("")
            .with_credential_key("apiKey");

        let req = auth.authorize(request()).await;
        assert_eq!(req.header("x-api-key"), Some("k-1"));
        assert!(req.header("Authorization").is_none());
    }

    #[tokio::test]
    #[traced_test]
    async fn load_failures_are_swallowed_but_logged() {
        let auth = AuthService::new(Arc::new(BrokenStore));
        assert!(auth.load_token().await.is_none());
        assert!(logs_contain("failed to load access token"));

        let req = auth.authorize(request()).await;
        assert!(req.header("Authorization").is_none());
    }

    #[tokio::test]
    async fn save_and_delete_failures_propagate() {
        let auth = AuthService::new(Arc::new(BrokenStore));
        assert!(matches!(
            auth.save_token("x").await,
            Err(CredentialStoreError::Encoding(_))
        ));
        assert!(matches!(
            auth.delete_token().await,
            Err(CredentialStoreError::Backend { operation: "delete", .. })
        ));
    }

    #[tokio::test]
    async fn store_errors_lift_into_api_errors_with_question_mark() {
        async fn sign_out(auth: &AuthService) -> Result<(), crate::error::ApiError> {
            auth.delete_token().await?;
            Ok(())
        }

        let err = sign_out(&AuthService::new(Arc::new(BrokenStore)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ApiError::Credential(CredentialStoreError::Backend {
                operation: "delete",
                ..
            })
        ));
        assert_eq!(err.status(), None);

        assert!(sign_out(&AuthService::default()).await.is_ok());
    }
}

//! A network client that never builds a request.
//!
//! Useful for previews and UI tests: every call decodes the same stored
//! bytes, optionally after an artificial delay.

use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::endpoint::ApiEndpoint;
use crate::environment::Environment;
use crate::error::ApiError;
use crate::service::NetworkClient;

#[derive(Debug, Clone, Default)]
pub struct MockNetworkService {
    data: Bytes,
    delay: Duration,
}

impl MockNetworkService {
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn from_json_str(json: &str) -> Self {
        Self::from_bytes(Bytes::copy_from_slice(json.as_bytes()))
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl NetworkClient for MockNetworkService {
    async fn fetch_one<T>(
        &self,
        _endpoint: &dyn ApiEndpoint,
        _environment: &Environment,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        self.pause().await;
        serde_json::from_slice(&self.data).map_err(ApiError::Decoding)
    }

    async fn fetch_many<T>(
        &self,
        _endpoint: &dyn ApiEndpoint,
        _environment: &Environment,
    ) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        self.pause().await;
        serde_json::from_slice(&self.data).map_err(ApiError::Decoding)
    }

    async fn fetch_status(
        &self,
        _endpoint: &dyn ApiEndpoint,
        _environment: &Environment,
    ) -> Result<u16, ApiError> {
        self.pause().await;
        Ok(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;
    use serde::Deserialize;
    use std::time::Instant;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Todo {
        id: u32,
        title: String,
        completed: bool,
    }

    #[tokio::test]
    async fn fetch_one_decodes_stored_json() {
        let mock =
            MockNetworkService::from_json_str(r#"{"id":1,"title":"Write","completed":false}"#);
        let todo: Todo = mock
            .fetch_one(&Endpoint::get("/todos/1"), &Environment::default())
            .await
            .unwrap();
        assert_eq!(todo.title, "Write");
    }

    #[tokio::test]
    async fn fetch_many_decodes_array() {
        let mock = MockNetworkService::from_json_str(
            r#"[{"id":1,"title":"a","completed":true},{"id":2,"title":"b","completed":false}]"#,
        );
        let todos: Vec<Todo> = mock
            .fetch_many(&Endpoint::get("/todos"), &Environment::default())
            .await
            .unwrap();
        assert_eq!(todos.len(), 2);
        assert!(todos[0].completed);
    }

    #[tokio::test]
    async fn fetch_status_is_always_ok() {
        let mock = MockNetworkService::default();
        let status = mock
            .fetch_status(&Endpoint::delete("/todos/1"), &Environment::default())
            .await
            .unwrap();
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn bad_json_is_a_decoding_error() {
        let mock = MockNetworkService::from_json_str("{");
        let err = mock
            .fetch_one::<Todo>(&Endpoint::get("/todos/1"), &Environment::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decoding(_)));
    }

    #[tokio::test]
    async fn applies_delay() {
        let mock = MockNetworkService::default().with_delay(Duration::from_millis(50));
        let start = Instant::now();
        mock.fetch_status(&Endpoint::get("/"), &Environment::default())
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}

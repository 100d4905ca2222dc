//! Declarative endpoint descriptions and request building.
//!
//! # Design
//! An endpoint says *what* to call: path, method, query, JSON body fields and
//! whether the call needs the bearer token. [`ApiEndpoint`] is the extension
//! point; a closed enum of API calls can implement it and compute each
//! accessor per variant. [`Endpoint`] is the plain value implementation for
//! ad-hoc calls.
//!
//! [`build_request`] resolves an endpoint against a base URL. It never adds
//! authentication; that is the network service's job.

use std::borrow::Cow;

use bytes::Bytes;
use serde_json::{Map, Value};
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};

/// Ordered query parameters.
pub type Query = Vec<(String, String)>;

/// Flat JSON object sent as the request body.
pub type JsonBody = Map<String, Value>;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Anything that can describe one HTTP call.
///
/// `path` must start with `/`; this is not validated.
pub trait ApiEndpoint: Send + Sync {
    fn path(&self) -> Cow<'_, str>;

    fn method(&self) -> HttpMethod;

    fn query(&self) -> Option<Query> {
        None
    }

    fn body(&self) -> Option<JsonBody> {
        None
    }

    fn requires_auth(&self) -> bool {
        false
    }

    /// Resolve this endpoint against `base_url`. See [`build_request`].
    fn to_request(&self, base_url: &Url) -> Result<HttpRequest, ApiError> {
        build_request(self, base_url)
    }
}

/// A plain endpoint value.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
    pub query: Option<Query>,
    pub body: Option<JsonBody>,
    pub requires_auth: bool,
}

impl Endpoint {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            query: None,
            body: None,
            requires_auth: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Append one query parameter, creating the query if needed.
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    /// Replace the body. An empty map still counts as a body.
    pub fn with_body(mut self, body: JsonBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Set one body field, creating the body if needed.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }
}

impl ApiEndpoint for Endpoint {
    fn path(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.path)
    }

    fn method(&self) -> HttpMethod {
        self.method
    }

    fn query(&self) -> Option<Query> {
        self.query.clone()
    }

    fn body(&self) -> Option<JsonBody> {
        self.body.clone()
    }

    fn requires_auth(&self) -> bool {
        self.requires_auth
    }
}

/// Build the outbound request for `endpoint` against `base_url`.
///
/// The path is appended segment by segment to the base URL's path. The query
/// string is omitted entirely when the query is absent or empty. A body (even
/// an empty one) is serialized as a JSON object and sets
/// `Content-Type: application/json`.
pub fn build_request<E>(endpoint: &E, base_url: &Url) -> Result<HttpRequest, ApiError>
where
    E: ApiEndpoint + ?Sized,
{
    let query = endpoint.query();
    let url = resolve_url(base_url, &endpoint.path(), query.as_deref())?;
    let mut request = HttpRequest::new(endpoint.method(), url);

    if let Some(body) = endpoint.body() {
        let bytes = serde_json::to_vec(&body).map_err(ApiError::Serialization)?;
        request.set_header(CONTENT_TYPE, APPLICATION_JSON);
        request.body = Some(Bytes::from(bytes));
    }

    Ok(request)
}

fn resolve_url(
    base_url: &Url,
    path: &str,
    query: Option<&[(String, String)]>,
) -> Result<Url, ApiError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(path.trim_start_matches('/').split('/'));

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.query_pairs_mut().extend_pairs(query);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("https://api.example.com").unwrap()
    }

    #[test]
    fn requires_auth_defaults_to_false() {
        let endpoint = Endpoint::get("/public");
        assert!(!endpoint.requires_auth);
        assert!(endpoint.query.is_none());
        assert!(endpoint.body.is_none());
    }

    #[test]
    fn appends_path_to_base_url() {
        let req = Endpoint::get("/users/123").to_request(&base()).unwrap();
        assert_eq!(req.url.unwrap().as_str(), "https://api.example.com/users/123");
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn keeps_base_url_path_prefix() {
        let base = Url::parse("https://api.example.com/v2/").unwrap();
        let req = Endpoint::get("/users").to_request(&base).unwrap();
        assert_eq!(req.url.unwrap().as_str(), "https://api.example.com/v2/users");
    }

    #[test]
    fn attaches_query_in_order() {
        let endpoint = Endpoint::get("/posts")
            .with_query_param("_limit", "10")
            .with_query_param("userId", "1");
        let req = endpoint.to_request(&base()).unwrap();
        assert_eq!(
            req.url.unwrap().as_str(),
            "https://api.example.com/posts?_limit=10&userId=1"
        );
    }

    #[test]
    fn empty_query_adds_no_question_mark() {
        let req = Endpoint::get("/posts")
            .with_query(Vec::new())
            .to_request(&base())
            .unwrap();
        assert_eq!(req.url.unwrap().as_str(), "https://api.example.com/posts");
    }

    #[test]
    fn body_sets_content_type_and_json() {
        let endpoint = Endpoint::post("/posts")
            .with_field("title", "a")
            .with_field("body", "b")
            .with_field("userId", 1);
        let req = endpoint.to_request(&base()).unwrap();

        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_slice(&req.body.unwrap()).unwrap();
        assert_eq!(body, json!({"title": "a", "body": "b", "userId": 1}));
    }

    #[test]
    fn empty_body_is_still_sent() {
        let req = Endpoint::put("/posts/1")
            .with_body(JsonBody::new())
            .to_request(&base())
            .unwrap();
        assert_eq!(req.header(CONTENT_TYPE), Some(APPLICATION_JSON));
        assert_eq!(req.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn nested_body_values_serialize_natively() {
        let endpoint = Endpoint::patch("/users/1")
            .with_field("tags", json!(["a", "b"]))
            .with_field("address", json!({"city": "Paris"}))
            .with_field("nickname", Value::Null);
        let req = endpoint.to_request(&base()).unwrap();
        let body: Value = serde_json::from_slice(&req.body.unwrap()).unwrap();
        assert_eq!(body["tags"], json!(["a", "b"]));
        assert_eq!(body["address"]["city"], "Paris");
        assert!(body["nickname"].is_null());
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected() {
        let base = Url::parse("mailto:someone@example.com").unwrap();
        let err = Endpoint::get("/users").to_request(&base).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}

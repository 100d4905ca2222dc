//! Routing-table transport: picks a canned response by request pattern.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::pattern::RequestPattern;
use crate::transport::{CannedResponse, Transport};

#[derive(Debug, Clone)]
pub struct CannedRoute {
    pub pattern: RequestPattern,
    pub response: CannedResponse,
}

impl CannedRoute {
    pub fn new(pattern: RequestPattern, response: CannedResponse) -> Self {
        Self { pattern, response }
    }
}

/// How [`CannedRoutesTransport`] resolves several matching routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RouteMode {
    /// Routes are evaluated in order; the first match answers.
    #[default]
    FirstMatchWins,
    /// Exactly one route must match; zero or several is an error.
    RequireUniqueMatch,
}

#[derive(Debug, Clone)]
pub struct CannedRoutesTransport {
    routes: Vec<CannedRoute>,
    mode: RouteMode,
}

impl CannedRoutesTransport {
    pub fn new(routes: Vec<CannedRoute>) -> Self {
        Self::with_mode(routes, RouteMode::default())
    }

    pub fn with_mode(routes: Vec<CannedRoute>, mode: RouteMode) -> Self {
        Self { routes, mode }
    }

    pub fn routes(&self) -> &[CannedRoute] {
        &self.routes
    }

    pub fn mode(&self) -> RouteMode {
        self.mode
    }

    fn resolve(&self, request: &HttpRequest) -> Result<&CannedRoute, TransportError> {
        if request.url.is_none() {
            return Err(TransportError::MissingUrl);
        }

        let mut matches = self.routes.iter().filter(|r| r.pattern.matches(request));

        match self.mode {
            RouteMode::FirstMatchWins => matches.next().ok_or(TransportError::NoRouteMatch),
            RouteMode::RequireUniqueMatch => {
                let matches: Vec<&CannedRoute> = matches.collect();
                match matches.as_slice() {
                    [] => Err(TransportError::NoRouteMatch),
                    [route] => Ok(*route),
                    many => Err(TransportError::AmbiguousRouteMatch { count: many.len() }),
                }
            }
        }
    }
}

#[async_trait]
impl Transport for CannedRoutesTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let route = self.resolve(&request)?;
        tracing::debug!(
            method = %request.method,
            path = route.pattern.path_regex_str(),
            status = route.response.status,
            "canned route matched"
        );
        Ok(route.response.to_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use url::Url;

    fn get(url: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, Url::parse(url).unwrap())
    }

    fn routes() -> Vec<CannedRoute> {
        vec![
            CannedRoute::new(
                RequestPattern::path("/users/1"),
                CannedResponse::from_text("exact"),
            ),
            CannedRoute::new(
                RequestPattern::path_regex("/users").unwrap(),
                CannedResponse::from_text("prefix").with_status(202),
            ),
            CannedRoute::new(
                RequestPattern::path("/posts").with_method(HttpMethod::Post),
                CannedResponse::from_text("created").with_status(201),
            ),
        ]
    }

    #[tokio::test]
    async fn first_match_wins_uses_route_order() {
        let transport = CannedRoutesTransport::new(routes());
        assert_eq!(transport.mode(), RouteMode::FirstMatchWins);

        let response = transport.send(get("https://x.test/users/1")).await.unwrap();
        assert_eq!(&response.body[..], b"exact");

        let response = transport.send(get("https://x.test/users/2")).await.unwrap();
        assert_eq!(&response.body[..], b"prefix");
        assert_eq!(response.status, 202);
    }

    #[tokio::test]
    async fn first_match_wins_without_match_fails() {
        let transport = CannedRoutesTransport::new(routes());
        let err = transport.send(get("https://x.test/posts")).await.unwrap_err();
        assert!(matches!(err, TransportError::NoRouteMatch));
    }

    #[tokio::test]
    async fn unique_mode_with_zero_matches() {
        let transport = CannedRoutesTransport::with_mode(routes(), RouteMode::RequireUniqueMatch);
        let err = transport.send(get("https://x.test/comments")).await.unwrap_err();
        assert!(matches!(err, TransportError::NoRouteMatch));
    }

    #[tokio::test]
    async fn unique_mode_with_one_match() {
        let transport = CannedRoutesTransport::with_mode(routes(), RouteMode::RequireUniqueMatch);
        let response = transport.send(get("https://x.test/users/9")).await.unwrap();
        assert_eq!(&response.body[..], b"prefix");

        let mut post = get("https://x.test/posts");
        post.method = HttpMethod::Post;
        assert_eq!(transport.send(post).await.unwrap().status, 201);
    }

    #[tokio::test]
    async fn unique_mode_with_two_matches() {
        let transport = CannedRoutesTransport::with_mode(routes(), RouteMode::RequireUniqueMatch);
        let err = transport.send(get("https://x.test/users/1")).await.unwrap_err();
        assert!(matches!(err, TransportError::AmbiguousRouteMatch { count: 2 }));
    }

    #[tokio::test]
    async fn missing_url_fails_before_matching() {
        let transport = CannedRoutesTransport::new(Vec::new());
        let mut req = get("https://x.test/");
        req.url = None;
        let err = transport.send(req).await.unwrap_err();
        assert!(matches!(err, TransportError::MissingUrl));
    }
}

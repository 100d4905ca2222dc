//! Request patterns used by the test-double transports.
//!
//! # Design
//! A pattern filters on method, host and path. Host and path filters are
//! regexes searched anywhere in the subject, not full matches. The one
//! exception is [`RequestPattern::path`]: a literal path is escaped and
//! anchored with `^...$`, so `path("/users")` matches `/users` only while
//! `path_regex("/users")` also matches `/users/123` and `/api/users`.
//!
//! Paths are matched percent-decoded, so a pattern is written the same way
//! as the endpoint path that produced the request.

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::http::{HttpMethod, HttpRequest};

#[derive(Debug, Clone)]
pub struct RequestPattern {
    method: Option<HttpMethod>,
    host: Option<Regex>,
    path: Regex,
}

impl RequestPattern {
    /// Match exactly the literal `path`.
    pub fn path(path: &str) -> Self {
        let anchored = format!("^{}$", regex::escape(path));
        Self {
            method: None,
            host: None,
            path: compile_escaped(&anchored),
        }
    }

    /// Match any path containing a match for `pattern`. No anchoring is added.
    pub fn path_regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            method: None,
            host: None,
            path: Regex::new(pattern)?,
        })
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Require the host to contain the literal `host`.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = Some(compile_escaped(&regex::escape(host)));
        self
    }

    pub fn with_host_regex(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.host = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    pub fn host_regex(&self) -> Option<&str> {
        self.host.as_ref().map(Regex::as_str)
    }

    pub fn path_regex_str(&self) -> &str {
        self.path.as_str()
    }

    /// `true` if `request` passes every filter. A request without a URL never
    /// matches.
    pub fn matches(&self, request: &HttpRequest) -> bool {
        if self.method.is_some_and(|m| m != request.method) {
            return false;
        }

        let Some(url) = request.url.as_ref() else {
            return false;
        };

        if let Some(host) = &self.host {
            if !host.is_match(url.host_str().unwrap_or("")) {
                return false;
            }
        }

        self.path
            .is_match(&percent_decode_str(url.path()).decode_utf8_lossy())
    }
}

/// Compile a pattern produced by `regex::escape`, which is always valid.
fn compile_escaped(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| unreachable!("escaped pattern failed to compile: {e}"))
}

//! Collected request
//!
//! The server reads the whole body before routing, so handlers work on a
//! plain value and tests can build requests without a socket.

use bytes::Bytes;
use hyper::header::{AsHeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method};
use serde::de::DeserializeOwned;

use crate::types::RecordError;

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiRequest {
    /// Request for `target`, which may carry a query string
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };

        Self {
            method,
            path: path.to_string(),
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
        }
    }

    pub fn with_bearer(mut self, token: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            self.headers.insert(AUTHORIZATION, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json(mut self, body: &serde_json::Value) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Bytes::from(body.to_string());
        self
    }

    pub fn header(&self, name: impl AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Non-empty path segments
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Decode the JSON body
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RecordError> {
        if self.body.is_empty() {
            return Err(RecordError::Validation(
                "malformed JSON body: empty body".into(),
            ));
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// First non-empty value of a query parameter, trimmed like stored text
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        serde_urlencoded::from_str::<Vec<(String, String)>>(query)
            .ok()?
            .into_iter()
            .find(|(key, value)| key == name && !value.trim().is_empty())
            .map(|(_, value)| value.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target_split() {
        let req = ApiRequest::new(Method::GET, "/event?project_id=p%201&page=2");
        assert_eq!(req.path, "/event");
        assert_eq!(req.segments(), ["event"]);
        assert_eq!(req.query_param("project_id").as_deref(), Some("p 1"));
        assert_eq!(req.query_param("page").as_deref(), Some("2"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn test_empty_query_values_ignored() {
        let req = ApiRequest::new(Method::GET, "/animal?project_id=");
        assert_eq!(req.query_param("project_id"), None);
    }

    #[test]
    fn test_query_values_trimmed() {
        let req = ApiRequest::new(Method::GET, "/bookmarks?link=%20https%3A%2F%2Fa%20");
        assert_eq!(req.query_param("link").as_deref(), Some("https://a"));
    }

    #[test]
    fn test_segments_ignore_slashes() {
        let req = ApiRequest::new(Method::GET, "//event/e1/s1/");
        assert_eq!(req.segments(), ["event", "e1", "s1"]);
    }

    #[test]
    fn test_json_body() {
        #[derive(Debug, serde::Deserialize)]
        struct Body {
            name: String,
        }

        let req = ApiRequest::new(Method::POST, "/project").with_json(&json!({ "name": "Goats" }));
        let body: Body = req.json().unwrap();
        assert_eq!(body.name, "Goats");

        let err = ApiRequest::new(Method::POST, "/project")
            .json::<Body>()
            .unwrap_err();
        assert!(err.to_string().starts_with("malformed JSON body"));

        let err = ApiRequest::new(Method::POST, "/project")
            .with_body("{not json")
            .json::<Body>()
            .unwrap_err();
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[test]
    fn test_bearer_header() {
        let req = ApiRequest::new(Method::GET, "/user").with_bearer("abc");
        assert_eq!(req.header(AUTHORIZATION), Some("Bearer abc"));
    }
}

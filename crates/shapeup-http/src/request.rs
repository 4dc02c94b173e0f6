//! HTTP request type.
//!
//! [`HttpRequest`] is what a view sees of an incoming request: the method and
//! path, query parameters, submitted form fields, uploaded files, and the
//! keyword parameters the host's URL router captured from the path.

use std::collections::HashMap;

use http::{HeaderMap, Method};

use crate::querydict::QueryDict;
use crate::upload::{self, Files, UploadedFile};

/// An incoming request as seen by a view.
///
/// Instances are built from an Axum request with [`HttpRequest::from_axum`],
/// or with [`HttpRequest::builder`] in tests.
///
/// # Examples
///
/// ```
/// use shapeup_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::GET)
///     .path("/articles/42/")
///     .query_string("page=2")
///     .kwarg("pk", "42")
///     .build();
///
/// assert_eq!(request.get().get("page"), Some("2"));
/// assert_eq!(request.kwarg("pk"), Some("42"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    headers: HeaderMap,
    get: QueryDict,
    post: QueryDict,
    files: Files,
    kwargs: HashMap<String, String>,
}

impl HttpRequest {
    /// Creates a new [`HttpRequestBuilder`].
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Creates an `HttpRequest` from Axum request parts, the collected body,
    /// and the path parameters the router matched.
    pub fn from_axum(
        parts: http::request::Parts,
        body: &[u8],
        kwargs: HashMap<String, String>,
    ) -> Self {
        let query_string = parts.uri.query().unwrap_or("").to_string();
        let content_type = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let (post, files) = parse_body(content_type.as_deref(), body);

        Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            get: QueryDict::parse(&query_string),
            query_string,
            content_type,
            headers: parts.headers,
            post,
            files,
            kwargs,
        }
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the content type of the request body, if set.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the query parameters.
    pub const fn get(&self) -> &QueryDict {
        &self.get
    }

    /// Returns the submitted form fields.
    pub const fn post(&self) -> &QueryDict {
        &self.post
    }

    /// Returns the uploaded files.
    pub const fn files(&self) -> &Files {
        &self.files
    }

    /// Returns the routing keyword parameters.
    pub const fn kwargs(&self) -> &HashMap<String, String> {
        &self.kwargs
    }

    /// Returns a single routing keyword parameter.
    pub fn kwarg(&self, name: &str) -> Option<&str> {
        self.kwargs.get(name).map(String::as_str)
    }

    /// Replaces the routing keyword parameters.
    pub fn set_kwargs(&mut self, kwargs: HashMap<String, String>) {
        self.kwargs = kwargs;
    }

    /// Returns the full path including the query string.
    pub fn get_full_path(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }
}

/// Decodes a urlencoded or multipart body into form fields and files.
///
/// Other content types yield an empty, immutable `QueryDict`. A multipart
/// body that fails to parse is logged and treated as empty.
fn parse_body(content_type: Option<&str>, body: &[u8]) -> (QueryDict, Files) {
    match content_type {
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
            (QueryDict::parse(&String::from_utf8_lossy(body)), Files::new())
        }
        Some(ct) if ct.starts_with("multipart/form-data") => {
            let Some(boundary) = upload::extract_boundary(ct) else {
                return (QueryDict::new(), Files::new());
            };
            match upload::parse_multipart(body, boundary) {
                Ok(data) => (QueryDict::from_pairs(data.fields), data.files),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable multipart body");
                    (QueryDict::new(), Files::new())
                }
            }
        }
        _ => (QueryDict::new(), Files::new()),
    }
}

/// Builder for constructing [`HttpRequest`] instances in tests.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    headers: HeaderMap,
    body: Vec<u8>,
    files: Files,
    kwargs: HashMap<String, String>,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            content_type: None,
            headers: HeaderMap::new(),
            body: Vec::new(),
            files: Files::new(),
            kwargs: HashMap::new(),
        }
    }
}

impl HttpRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string (without leading `?`).
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(mut self, ct: &str) -> Self {
        self.content_type = Some(ct.to_string());
        self
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the raw request body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Sets a urlencoded form body and the matching content type.
    #[must_use]
    pub fn form(mut self, encoded: &str) -> Self {
        self.content_type = Some("application/x-www-form-urlencoded".to_string());
        self.body = encoded.as_bytes().to_vec();
        self
    }

    /// Attaches an uploaded file under a field name.
    #[must_use]
    pub fn file(mut self, field: &str, file: UploadedFile) -> Self {
        self.files.append(field.to_string(), file);
        self
    }

    /// Adds a routing keyword parameter.
    #[must_use]
    pub fn kwarg(mut self, name: &str, value: &str) -> Self {
        self.kwargs.insert(name.to_string(), value.to_string());
        self
    }

    /// Builds the [`HttpRequest`].
    pub fn build(self) -> HttpRequest {
        let (post, parsed_files) = parse_body(self.content_type.as_deref(), &self.body);
        let mut files = self.files;
        for (field, uploads) in parsed_files {
            for upload in uploads {
                files.append(field.clone(), upload);
            }
        }

        HttpRequest {
            get: QueryDict::parse(&self.query_string),
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            content_type: self.content_type,
            headers: self.headers,
            post,
            files,
            kwargs: self.kwargs,
        }
    }
}

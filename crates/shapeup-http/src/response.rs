//! HTTP response types.
//!
//! [`HttpResponse`] is what every view returns. Rendered responses remember
//! the template that produced them and the context it was given, which is
//! what tests and middleware inspect. [`HttpResponseRedirect`] builds the
//! `302 Found` responses that the processing views return on success.

use axum::response::IntoResponse;
use http::{HeaderMap, HeaderValue, StatusCode};

use shapeup_core::{ShapeupError, SETTINGS};

const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// An HTTP response.
///
/// All responses convert into an Axum response via [`IntoResponse`].
///
/// # Examples
///
/// ```
/// use shapeup_http::HttpResponse;
///
/// let response = HttpResponse::ok("Hello, World!");
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.text(), "Hello, World!");
/// ```
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    content: Vec<u8>,
    content_type: String,
    template_name: Option<String>,
    context: Option<serde_json::Value>,
}

impl HttpResponse {
    /// Creates a new `text/html` response with the given status and body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: body.into().into_bytes(),
            content_type: "text/html; charset=utf-8".to_string(),
            template_name: None,
            context: None,
        }
    }

    /// Creates a 200 OK response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    /// Creates a 500 Internal Server Error response.
    pub fn server_error(body: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    /// Creates a 405 Method Not Allowed response carrying an `Allow` header.
    pub fn not_allowed(permitted_methods: &[&str]) -> Self {
        let allowed = permitted_methods.join(", ");
        let mut response = Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method Not Allowed. Permitted: {allowed}"),
        );
        if let Ok(value) = HeaderValue::from_str(&allowed) {
            response.headers.insert(http::header::ALLOW, value);
        }
        response
    }

    /// Converts an error that escaped a view into a response.
    ///
    /// The status comes from [`ShapeupError::status_code`]. The error text is
    /// only exposed when the configured settings have `debug` enabled. Error
    /// messages can quote request input, so the body is always `text/plain`.
    pub fn from_error(error: &ShapeupError) -> Self {
        let status =
            StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = if SETTINGS.get_or_default().debug {
            error.to_string()
        } else {
            status.canonical_reason().unwrap_or("Error").to_string()
        };
        let mut response = Self::new(status, body);
        response.set_content_type(PLAIN_TEXT);
        response
    }

    /// Records the template and context that produced this response.
    #[must_use]
    pub fn with_template(mut self, template_name: &str, context: serde_json::Value) -> Self {
        self.template_name = Some(template_name.to_string());
        self.context = Some(context);
        self
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns the response headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the response headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the `Location` header, if this is a redirect.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Returns the raw body.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// The template this response was rendered from, if any.
    pub fn template_name(&self) -> Option<&str> {
        self.template_name.as_deref()
    }

    /// The context this response was rendered with, if any.
    pub const fn context(&self) -> Option<&serde_json::Value> {
        self.context.as_ref()
    }

    /// Returns `true` for 3xx statuses.
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> axum::response::Response {
        let mut response = axum::response::Response::new(axum::body::Body::from(self.content));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        if let Ok(ct) = HeaderValue::from_str(&self.content_type) {
            headers.insert(http::header::CONTENT_TYPE, ct);
        }
        for (key, value) in &self.headers {
            headers.insert(key, value.clone());
        }
        response
    }
}

/// A `302 Found` redirect.
///
/// # Examples
///
/// ```
/// use shapeup_http::HttpResponseRedirect;
///
/// let response = HttpResponseRedirect::new("/done/");
/// assert_eq!(response.status(), http::StatusCode::FOUND);
/// assert_eq!(response.location(), Some("/done/"));
/// ```
pub struct HttpResponseRedirect;

impl HttpResponseRedirect {
    /// Creates a redirect response to `url`.
    ///
    /// A URL that is not a valid header value produces a redirect with no
    /// `Location` header. `SuccessUrl::get_success_url` in `shapeup-views`
    /// encodes and checks configured destinations before they reach here.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(url: &str) -> HttpResponse {
        let mut response = HttpResponse::new(StatusCode::FOUND, "");
        if let Ok(value) = HeaderValue::from_str(url) {
            response.headers.insert(http::header::LOCATION, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok() {
        let response = HttpResponse::ok("hi");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content(), b"hi");
        assert_eq!(response.content_type(), "text/html; charset=utf-8");
        assert!(response.template_name().is_none());
        assert!(!response.is_redirect());
    }

    #[test]
    fn test_not_allowed_sets_allow_header() {
        let response = HttpResponse::not_allowed(&["GET", "POST"]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(http::header::ALLOW).unwrap(), "GET, POST");
    }

    #[test]
    fn test_from_error_status() {
        let response = HttpResponse::from_error(&ShapeupError::NotFound("Item 9".into()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.content_type(), "text/plain; charset=utf-8");

        let response =
            HttpResponse::from_error(&ShapeupError::ImproperlyConfigured("no template".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_quoting_markup_is_served_as_plain_text() {
        let error = ShapeupError::NotFound("No object found matching pk=<img src=x>".into());
        let axum_response = HttpResponse::from_error(&error).into_response();
        assert_eq!(axum_response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            axum_response.headers()[http::header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_with_template_records_context() {
        let response = HttpResponse::ok("<p>x</p>")
            .with_template("items/list.html", serde_json::json!({"is_paginated": false}));
        assert_eq!(response.template_name(), Some("items/list.html"));
        assert_eq!(response.context().unwrap()["is_paginated"], false);
    }

    #[test]
    fn test_redirect() {
        let response = HttpResponseRedirect::new("/items/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(response.is_redirect());
        assert_eq!(response.location(), Some("/items/"));
    }

    #[tokio::test]
    async fn test_into_response() {
        let mut response = HttpResponseRedirect::new("/next/");
        response.set_content_type("text/plain");
        let axum_response = response.into_response();
        assert_eq!(axum_response.status(), StatusCode::FOUND);
        assert_eq!(axum_response.headers()[http::header::LOCATION], "/next/");
        assert_eq!(axum_response.headers()[http::header::CONTENT_TYPE], "text/plain");
    }
}

//! Error taxonomy for shapeup views.
//!
//! [`ShapeupError`] separates developer-facing failures (a view that is
//! missing configuration) from client-facing ones (an object that does not
//! exist, a page number that is out of range). Each variant maps to an HTTP
//! status via [`ShapeupError::status_code`]; the host boundary uses that
//! mapping to build the final response.

use thiserror::Error;

/// The error type returned by every view operation.
#[derive(Error, Debug)]
pub enum ShapeupError {
    // ── Developer-facing ─────────────────────────────────────────────

    /// A view is missing a required attribute or override.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A collaborator was asked for an operation it does not provide.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// None of the candidate templates could be found.
    #[error("Template does not exist: {0}")]
    TemplateDoesNotExist(String),

    /// The renderer failed while rendering an existing template.
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Settings could not be read or parsed.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A context value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A persistence hook reported a failure.
    #[error("Persistence error: {0}")]
    Persistence(String),

    // ── Client-facing ────────────────────────────────────────────────

    /// The requested object, list, or page does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request attempted something the framework refuses to do.
    #[error("Suspicious operation: {0}")]
    SuspiciousOperation(String),
}

impl ShapeupError {
    /// Builds the error for a view that neither defines an attribute nor
    /// overrides the method that would supply it.
    ///
    /// ```
    /// use shapeup_core::ShapeupError;
    ///
    /// let err = ShapeupError::missing_attribute("ArticleList", "template_name", "get_template_names()");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Improperly configured: 'ArticleList' must either define 'template_name' or override 'get_template_names()'"
    /// );
    /// ```
    pub fn missing_attribute(view: &str, attribute: &str, method: &str) -> Self {
        Self::ImproperlyConfigured(format!(
            "'{view}' must either define '{attribute}' or override '{method}'"
        ))
    }

    /// Builds the error for a processing view without a success URL.
    pub fn missing_success_url(view: &str) -> Self {
        Self::ImproperlyConfigured(format!(
            "No URL to redirect to. '{view}' must provide 'success_url'."
        ))
    }

    /// Builds the error for routing kwargs that lack the lookup key.
    pub fn missing_lookup_kwarg(key: &str, view: &str) -> Self {
        Self::ImproperlyConfigured(format!(
            "Lookup field '{key}' was not provided in view kwargs to '{view}'"
        ))
    }

    /// Returns the HTTP status code associated with this error.
    ///
    /// - `NotFound` -> 404
    /// - `SuspiciousOperation` -> 400
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::SuspiciousOperation(_) => 400,
            Self::ImproperlyConfigured(_)
            | Self::NotImplemented(_)
            | Self::TemplateDoesNotExist(_)
            | Self::TemplateError(_)
            | Self::ConfigurationError(_)
            | Self::Serialization(_)
            | Self::Persistence(_) => 500,
        }
    }

    /// Returns `true` if the error is the client's fault rather than the view author's.
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<serde_json::Error> for ShapeupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A convenience type alias for `Result<T, ShapeupError>`.
pub type ShapeupResult<T> = Result<T, ShapeupError>;

//! Where processing views go after a successful submission.

use http::HeaderValue;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use shapeup_core::{ShapeupError, ShapeupResult};
use shapeup_http::{HttpResponse, HttpResponseRedirect};

/// Bytes escaped when turning a configured IRI into a `Location` value.
/// Reserved characters and `%` pass through so already-encoded URLs survive.
const IRI_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// The success destination of a form, create, update, or delete view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuccessUrl(Option<String>);

impl SuccessUrl {
    /// No destination configured.
    pub const fn none() -> Self {
        Self(None)
    }

    pub fn to(url: &str) -> Self {
        Self(Some(url.to_string()))
    }

    pub fn get(&self) -> Option<&str> {
        self.0.as_deref().filter(|url| !url.is_empty())
    }

    /// The destination, percent-encoded for use as a `Location` header, or a
    /// configuration error naming `view`.
    ///
    /// Processing views call this before their persistence hook, so a bad
    /// destination fails the request with nothing saved.
    pub fn get_success_url(&self, view: &str) -> ShapeupResult<String> {
        let url = self
            .get()
            .ok_or_else(|| ShapeupError::missing_success_url(view))?;
        let encoded = utf8_percent_encode(url, IRI_ESCAPE).to_string();
        HeaderValue::from_str(&encoded).map_err(|_| {
            ShapeupError::ImproperlyConfigured(format!(
                "'{view}' has a success_url that is not a valid redirect target: {url:?}"
            ))
        })?;
        Ok(encoded)
    }

    /// A redirect to the destination.
    pub fn redirect(&self, view: &str) -> ShapeupResult<HttpResponse> {
        Ok(HttpResponseRedirect::new(&self.get_success_url(view)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured() {
        let success = SuccessUrl::to("/done/");
        assert_eq!(success.get_success_url("V").unwrap(), "/done/");
        let response = success.redirect("V").unwrap();
        assert_eq!(response.location(), Some("/done/"));
    }

    #[test]
    fn test_non_ascii_destination_is_encoded() {
        let success = SuccessUrl::to("/tâches/?q=a b&page=2");
        assert_eq!(
            success.get_success_url("TaskCreate").unwrap(),
            "/t%C3%A2ches/?q=a%20b&page=2"
        );
        let response = success.redirect("TaskCreate").unwrap();
        assert_eq!(response.location(), Some("/t%C3%A2ches/?q=a%20b&page=2"));
    }

    #[test]
    fn test_encoded_destination_is_untouched() {
        let success = SuccessUrl::to("/search/?q=caf%C3%A9#results");
        assert_eq!(
            success.get_success_url("Search").unwrap(),
            "/search/?q=caf%C3%A9#results"
        );
    }

    #[test]
    fn test_missing_or_empty() {
        for success in [SuccessUrl::none(), SuccessUrl::to("")] {
            let err = success.redirect("ArticleCreate").unwrap_err();
            assert_eq!(
                err.to_string(),
                "Improperly configured: No URL to redirect to. 'ArticleCreate' must provide 'success_url'."
            );
        }
    }
}

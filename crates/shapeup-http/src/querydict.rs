//! Query string dictionary for request parameters.
//!
//! [`QueryDict`] wraps [`MultiValueDict`] to provide an immutable-by-default
//! dictionary for GET and POST parameters.

use shapeup_core::utils::MultiValueDict;
use shapeup_core::{ShapeupError, ShapeupResult};

/// An immutable-by-default, insertion-ordered dictionary for query string
/// and form data.
///
/// # Examples
///
/// ```
/// use shapeup_http::QueryDict;
///
/// let qd = QueryDict::parse("title=Hello&tag=rust&tag=web&preview=");
/// assert_eq!(qd.get("tag"), Some("web"));
/// assert_eq!(qd.get_list("tag").map(<[String]>::len), Some(2));
/// assert!(qd.contains_key("preview"));
///
/// let mut mutable = qd.copy();
/// mutable.set("title", "Bye").unwrap();
/// assert_eq!(mutable.get("title"), Some("Bye"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    data: MultiValueDict<String, String>,
    mutable: bool,
}

impl QueryDict {
    /// Creates a new, empty, immutable `QueryDict`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty, mutable `QueryDict`.
    pub fn new_mutable() -> Self {
        Self {
            data: MultiValueDict::new(),
            mutable: true,
        }
    }

    /// Parses a URL-encoded string (`"k1=v1&k2=v2"`) into an immutable `QueryDict`.
    ///
    /// Pairs without `=` are kept with an empty value, so a bare `preview`
    /// in a form body is still detectable.
    pub fn parse(query_string: &str) -> Self {
        Self::from_pairs(
            query_string
                .split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| {
                    let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                    (percent_decode(key), percent_decode(value))
                }),
        )
    }

    /// Builds an immutable `QueryDict` from already-decoded pairs, keeping
    /// repeated keys in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            mutable: false,
        }
    }

    /// Returns the last value for the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Returns all values for the given key.
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.data.get_list(key)
    }

    /// Sets a single value for the given key, replacing any existing values.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeupError::SuspiciousOperation`] if this `QueryDict` is immutable.
    pub fn set(&mut self, key: &str, value: &str) -> ShapeupResult<()> {
        self.ensure_mutable()?;
        self.data.set(key.to_string(), value.to_string());
        Ok(())
    }

    /// Appends a value to the list for the given key.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeupError::SuspiciousOperation`] if this `QueryDict` is immutable.
    pub fn append(&mut self, key: &str, value: &str) -> ShapeupResult<()> {
        self.ensure_mutable()?;
        self.data.append(key.to_string(), value.to_string());
        Ok(())
    }

    fn ensure_mutable(&self) -> ShapeupResult<()> {
        if self.mutable {
            Ok(())
        } else {
            Err(ShapeupError::SuspiciousOperation(
                "This QueryDict instance is immutable".to_string(),
            ))
        }
    }

    /// Returns a mutable copy of this `QueryDict`.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            data: self.data.clone(),
            mutable: true,
        }
    }

    /// Encodes this `QueryDict` as a URL query string, in insertion order.
    pub fn urlencode(&self) -> String {
        self.data
            .iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(move |value| format!("{}={}", percent_encode(key), percent_encode(value)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Returns `true` if this `QueryDict` is mutable.
    pub const fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the `QueryDict` contains no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the specified key is present, whatever its value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns an iterator over the keys, in submission order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Returns an iterator over `(key, last value)` pairs, in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().filter_map(|(key, values)| {
            values.last().map(|value| (key.as_str(), value.as_str()))
        })
    }
}

fn percent_decode(input: &str) -> String {
    // Form encoding uses '+' for spaces.
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

fn percent_encode(input: &str) -> String {
    percent_encoding::utf8_percent_encode(input, percent_encoding::NON_ALPHANUMERIC).to_string()
}

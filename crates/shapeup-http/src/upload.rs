//! Uploaded files and `multipart/form-data` bodies.
//!
//! Process views hand the request's files to the form alongside its data;
//! [`parse_multipart`] is how the request types fill both from a multipart
//! submission.

use shapeup_core::utils::MultiValueDict;
use shapeup_core::{ShapeupError, ShapeupResult};

/// Largest single file accepted from a multipart body (2.5 MB).
pub const MAX_UPLOAD_SIZE: usize = 2_621_440;

/// Uploaded files keyed by form field name, in submission order.
pub type Files = MultiValueDict<String, UploadedFile>;

/// A file submitted through a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// The filename the client supplied.
    pub name: String,
    /// The MIME type declared for the part.
    pub content_type: String,
    /// Raw content.
    pub content: Vec<u8>,
}

impl UploadedFile {
    /// Creates an uploaded file from its parts.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            content,
        }
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Plain fields and files decoded from a multipart body.
#[derive(Debug, Clone, Default)]
pub struct MultipartData {
    pub fields: Vec<(String, String)>,
    pub files: Files,
}

/// Extracts the `boundary` parameter from a `multipart/form-data` content type.
pub fn extract_boundary(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("boundary="))
        .map(|boundary| boundary.trim_matches('"'))
        .find(|boundary| !boundary.is_empty())
}

/// Parses a `multipart/form-data` body into its fields and files.
///
/// Parts without a `name` are skipped, as are file inputs submitted empty.
///
/// # Errors
///
/// Returns [`ShapeupError::SuspiciousOperation`] when a file exceeds
/// [`MAX_UPLOAD_SIZE`].
pub fn parse_multipart(body: &[u8], boundary: &str) -> ShapeupResult<MultipartData> {
    let mut data = MultipartData::default();
    let delimiter = format!("--{boundary}");
    let text = String::from_utf8_lossy(body);

    for part in text.split(delimiter.as_str()) {
        let part = part.strip_prefix("\r\n").unwrap_or(part);
        if part.is_empty() || part.starts_with("--") {
            continue;
        }

        let Some((head, content)) = part
            .split_once("\r\n\r\n")
            .or_else(|| part.split_once("\n\n"))
        else {
            continue;
        };
        let content = content.strip_suffix("\r\n").unwrap_or(content);

        let mut name = None;
        let mut filename = None;
        let mut content_type = "text/plain".to_string();
        for line in head.lines() {
            let Some((header, value)) = line.split_once(':') else {
                continue;
            };
            if header.trim().eq_ignore_ascii_case("content-disposition") {
                for (key, param) in disposition_params(value) {
                    match key {
                        "name" => name = Some(param),
                        "filename" => filename = Some(param),
                        _ => {}
                    }
                }
            } else if header.trim().eq_ignore_ascii_case("content-type") {
                content_type = value.trim().to_string();
            }
        }

        let Some(name) = name else {
            continue;
        };

        match filename {
            Some(filename) if filename.is_empty() && content.is_empty() => {}
            Some(filename) => {
                if content.len() > MAX_UPLOAD_SIZE {
                    return Err(ShapeupError::SuspiciousOperation(format!(
                        "File '{filename}' exceeds maximum upload size of {MAX_UPLOAD_SIZE} bytes"
                    )));
                }
                data.files.append(
                    name,
                    UploadedFile::new(filename, content_type, content.as_bytes().to_vec()),
                );
            }
            None => data.fields.push((name, content.to_string())),
        }
    }

    Ok(data)
}

/// Splits `form-data; name="a"; filename="b"` into `("name", "a")` pairs.
fn disposition_params(value: &str) -> impl Iterator<Item = (&str, String)> {
    value.split(';').filter_map(|param| {
        let (key, raw) = param.trim().split_once('=')?;
        Some((key.trim(), raw.trim().trim_matches('"').to_string()))
    })
}

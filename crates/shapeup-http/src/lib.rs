//! # shapeup-http
//!
//! The request and response types that shapeup views consume and produce.
//! Requests carry the routing kwargs extracted by the host's URL router next
//! to the usual query, form, and file data; responses remember which template
//! produced them so tests and middleware can inspect the rendering.

pub mod querydict;
pub mod request;
pub mod response;
pub mod upload;

pub use querydict::QueryDict;
pub use request::{HttpRequest, HttpRequestBuilder};
pub use response::{HttpResponse, HttpResponseRedirect};
pub use upload::{Files, UploadedFile};

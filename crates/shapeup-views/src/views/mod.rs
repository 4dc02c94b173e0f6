//! Concrete views and the [`View`] dispatch trait.
//!
//! Every view is a plain struct composed of collaborators: a [`TemplateView`]
//! base for naming, context, and rendering, plus whatever the view needs on
//! top (a listing configuration and [`ObjectSource`](crate::listing::ObjectSource),
//! a lookup configuration and [`ObjectLookup`](crate::lookup::ObjectLookup),
//! a [`FormFlow`], a persistence capability). Views return
//! [`ShapeupResult`]; [`View::as_view`] and [`crate::handler`] are where errors
//! become responses.

pub mod create;
pub mod delete;
pub mod detail;
pub mod form;
pub mod list;
pub mod process;
pub mod template;
pub mod update;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use tracing::Instrument;

use shapeup_core::logging::view_span;
use shapeup_core::ShapeupResult;
use shapeup_http::{HttpRequest, HttpResponse};

pub use create::CreateView;
pub use delete::DeleteView;
pub use detail::DetailView;
pub use form::{FormFlow, FormValid, FormView, Submission};
pub use list::ListView;
pub use process::SuccessUrl;
pub use template::{TemplateView, Templated};
pub use update::UpdateView;

/// A view converted to a plain async function, as returned by
/// [`View::as_view`].
pub type ViewFunction =
    Box<dyn Fn(HttpRequest) -> Pin<Box<dyn Future<Output = HttpResponse> + Send>> + Send + Sync>;

/// HTTP method dispatch for a view.
///
/// Override `get` and `post` as needed; methods not in
/// [`allowed_methods`](Self::allowed_methods) answer 405 with an `Allow`
/// header.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use shapeup_core::ShapeupResult;
/// use shapeup_http::{HttpRequest, HttpResponse};
/// use shapeup_views::views::View;
///
/// struct Ping;
///
/// #[async_trait]
/// impl View for Ping {
///     fn name(&self) -> &str {
///         "Ping"
///     }
///
///     async fn get(&self, _request: &HttpRequest) -> ShapeupResult<HttpResponse> {
///         Ok(HttpResponse::ok("pong"))
///     }
/// }
/// ```
#[async_trait]
pub trait View: Send + Sync {
    /// The view's name, used in error messages and logs.
    fn name(&self) -> &str;

    fn allowed_methods(&self) -> Vec<Method> {
        vec![Method::GET, Method::HEAD, Method::OPTIONS]
    }

    /// Routes the request to the handler for its method.
    async fn dispatch(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let span = view_span(self.name(), request.method().as_str(), request.path());
        async {
            if !self.allowed_methods().contains(request.method()) {
                tracing::debug!("Method not allowed");
                return Ok(self.http_method_not_allowed(request));
            }
            match *request.method() {
                Method::GET => self.get(request).await,
                Method::POST => self.post(request).await,
                Method::HEAD => self.head(request).await,
                Method::OPTIONS => Ok(self.options(request)),
                _ => Ok(self.http_method_not_allowed(request)),
            }
        }
        .instrument(span)
        .await
    }

    async fn get(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        Ok(self.http_method_not_allowed(request))
    }

    async fn post(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        Ok(self.http_method_not_allowed(request))
    }

    /// Delegates to `get`.
    async fn head(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        self.get(request).await
    }

    /// An empty 200 listing the allowed methods.
    fn options(&self, _request: &HttpRequest) -> HttpResponse {
        let mut response = HttpResponse::ok("");
        if let Ok(value) = http::HeaderValue::from_str(&allow_header(&self.allowed_methods())) {
            response.headers_mut().insert(http::header::ALLOW, value);
        }
        response
    }

    fn http_method_not_allowed(&self, _request: &HttpRequest) -> HttpResponse {
        let methods = self.allowed_methods();
        let names: Vec<&str> = methods.iter().map(Method::as_str).collect();
        HttpResponse::not_allowed(&names)
    }

    /// Converts the view into a function that always produces a response.
    #[allow(clippy::wrong_self_convention)]
    fn as_view(self) -> ViewFunction
    where
        Self: Sized + 'static,
    {
        let view = Arc::new(self);
        Box::new(move |request: HttpRequest| -> Pin<Box<dyn Future<Output = HttpResponse> + Send>> {
            let view = Arc::clone(&view);
            Box::pin(async move {
                let result = view.dispatch(&request).await;
                respond(view.name(), result)
            })
        })
    }
}

fn allow_header(methods: &[Method]) -> String {
    methods.iter().map(Method::as_str).collect::<Vec<_>>().join(", ")
}

/// Turns a view result into a response, logging failures.
///
/// Client errors are logged at debug level, everything else at error level.
pub fn respond(view: &str, result: ShapeupResult<HttpResponse>) -> HttpResponse {
    match result {
        Ok(response) => response,
        Err(error) => {
            if error.is_client_error() {
                tracing::debug!(view, error = %error, "View returned a client error");
            } else {
                tracing::error!(view, error = %error, "View failed");
            }
            HttpResponse::from_error(&error)
        }
    }
}

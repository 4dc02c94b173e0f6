//! Mounting views on an axum router.
//!
//! [`route`] wraps a [`View`] in an axum [`MethodRouter`]. Path parameters
//! matched by the router become the request's routing kwargs, so a view
//! mounted at `/articles/{pk}/` sees `pk` the way it would from any other
//! host.
//!
//! # Examples
//!
//! ```
//! use axum::Router;
//! use shapeup_views::handler::route;
//! use shapeup_views::views::{ListView, Templated};
//!
//! let articles = vec!["first".to_string(), "second".to_string()];
//! let app: Router = Router::new().route(
//!     "/articles/",
//!     route(ListView::new(articles).with_template("articles.html")),
//! );
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, Request};
use axum::routing::{any, MethodRouter};
use http::StatusCode;

use shapeup_http::upload::MAX_UPLOAD_SIZE;
use shapeup_http::{HttpRequest, HttpResponse};

use crate::views::{respond, View};

/// Request bodies larger than this are rejected with 400.
pub const MAX_BODY_SIZE: usize = MAX_UPLOAD_SIZE * 4;

/// An axum method router that dispatches every method to `view`.
pub fn route<V: View + 'static>(view: V) -> MethodRouter {
    let view = Arc::new(view);
    any(move |request: Request| {
        let view = Arc::clone(&view);
        async move { handle(view.as_ref(), request).await }
    })
}

/// Converts an axum request, dispatches it, and converts errors.
pub async fn handle<V: View>(view: &V, request: Request) -> HttpResponse {
    let (mut parts, body) = request.into_parts();
    let kwargs = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &())
        .await
        .map(|Path(kwargs)| kwargs)
        .unwrap_or_default();

    let body = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(body) => body,
        Err(error) => {
            tracing::warn!(view = view.name(), error = %error, "Could not read request body");
            return HttpResponse::new(StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    let request = HttpRequest::from_axum(parts, &body, kwargs);
    let result = view.dispatch(&request).await;
    respond(view.name(), result)
}

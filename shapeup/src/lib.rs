//! # shapeup
//!
//! Composable class-based views for Rust web applications.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on `shapeup`
//! to get everything, or on individual crates for finer-grained control.
//!
//! # Examples
//!
//! ```
//! use shapeup::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let view = ListView::new(vec!["a", "b", "c"])
//!     .with_name("LetterList")
//!     .with_template("letters.html")
//!     .with_listing(MultipleObjects::new().paginate_by(2));
//!
//! let request = HttpRequest::builder().query_string("page=2").build();
//! let response = view.dispatch(&request).await.unwrap();
//! assert_eq!(response.context().unwrap()["object_list"][0], "c");
//! # }
//! ```

/// Errors, settings, logging, and `MultiValueDict`.
pub use shapeup_core as core;

/// Requests with routing kwargs, query dictionaries, uploads, and responses.
#[cfg(feature = "http")]
pub use shapeup_http as http;

/// Views, pagination, lookup, forms, renderers, and the axum handler.
#[cfg(feature = "views")]
pub use shapeup_views as views;

pub use async_trait;
pub use axum;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// The types most applications need.
pub mod prelude {
    pub use async_trait::async_trait;

    pub use shapeup_core::logging::setup_logging;
    pub use shapeup_core::{Settings, ShapeupError, ShapeupResult, SETTINGS};

    #[cfg(feature = "http")]
    pub use shapeup_http::{HttpRequest, HttpResponse, HttpResponseRedirect, QueryDict};

    #[cfg(feature = "views")]
    pub use shapeup_views::form::{FormDefinition, FormField};
    #[cfg(feature = "views")]
    pub use shapeup_views::handler::route;
    #[cfg(feature = "views")]
    pub use shapeup_views::views::{
        CreateView, DeleteView, DetailView, FormView, FormValid, ListView, TemplateView,
        Templated, UpdateView, View,
    };
    #[cfg(feature = "views")]
    pub use shapeup_views::{
        Context, Entity, FieldValues, Form, FormClass, LookupParam, MultipleObjects,
        ObjectDeleter, ObjectLookup, ObjectSaver, ObjectSource, ObjectUpdater, SingleObject,
        TeraRenderer,
    };
}

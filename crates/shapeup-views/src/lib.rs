//! # shapeup-views
//!
//! Class-based views built by composition. A view is a struct holding a
//! [`TemplateView`](views::TemplateView) base plus the collaborators it
//! needs: an [`ObjectSource`](listing::ObjectSource) for listings, an
//! [`ObjectLookup`](lookup::ObjectLookup) for single objects, a
//! [`FormFlow`](views::FormFlow) for forms, and one of the
//! [`persist`] capabilities for create, update, and delete.
//!
//! ## Modules
//!
//! - [`context`] - The template [`Context`]
//! - [`fields`] - [`FieldValues`], the structured arguments of persistence hooks
//! - [`collection`] - The [`Collection`](collection::Collection) and [`Entity`](collection::Entity) seams
//! - [`pagination`] - `Paginator`, `Page`, and page tokens
//! - [`listing`] - Multiple-object retrieval and pagination settings
//! - [`lookup`] - Single-object lookup
//! - [`form`] - The form seam and a ready-made field-list form
//! - [`render`] - Tera and debug renderers
//! - [`persist`] - Save, update, and delete capabilities
//! - [`query`] - Named query handlers
//! - [`views`] - The views and the `View` dispatch trait
//! - [`handler`] - axum integration

pub mod collection;
pub mod context;
pub mod fields;
pub mod form;
pub mod handler;
pub mod listing;
pub mod lookup;
pub mod pagination;
pub mod persist;
pub mod query;
pub mod render;
pub mod views;

pub use collection::{Collection, Entity};
pub use context::Context;
pub use fields::FieldValues;
pub use form::{Form, FormClass};
pub use listing::{MultipleObjects, ObjectSource};
pub use lookup::{LookupParam, ObjectLookup, SingleObject};
pub use persist::{ObjectDeleter, ObjectSaver, ObjectUpdater};
pub use render::{DebugRenderer, Renderer, TeraRenderer};
pub use views::View;

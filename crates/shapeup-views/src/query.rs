//! Named query handlers.
//!
//! A [`QueryInterface`] is a two-level registry of handlers: a category (say,
//! `"article"`) holds selectors (`"by_pk"`, `"by_slug"`), and each selector
//! maps to a function from [`FieldValues`] to a result. Views pick a handler
//! by name instead of embedding queries; [`QueryLookup`] adapts a registered
//! handler into an [`ObjectLookup`].
//!
//! # Examples
//!
//! ```
//! use shapeup_views::query::QueryInterface;
//! use shapeup_views::FieldValues;
//!
//! let titles = vec!["Intro".to_string(), "Outro".to_string()];
//! let interface = QueryInterface::new().handler("title", "by_index", move |fields: &FieldValues| {
//!     let index = fields.get("index").and_then(|v| v.as_u64()).unwrap_or(0);
//!     Ok(titles.get(index as usize).cloned())
//! });
//!
//! let fields: FieldValues = [("index", 1)].into_iter().collect();
//! let found = interface.query("title", "by_index", &fields).unwrap();
//! assert_eq!(found.as_deref(), Some("Outro"));
//! assert!(interface.get("title", "by_name").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use shapeup_core::{ShapeupError, ShapeupResult};
use shapeup_http::HttpRequest;

use crate::collection::Entity;
use crate::fields::FieldValues;
use crate::lookup::{LookupParam, ObjectLookup};

/// A registered query: structured arguments in, a result out.
pub type QueryHandler<T> = Arc<dyn Fn(&FieldValues) -> ShapeupResult<T> + Send + Sync>;

/// Handlers grouped by category and selector.
pub struct QueryInterface<T> {
    seed: HashMap<String, HashMap<String, QueryHandler<T>>>,
}

impl<T> Default for QueryInterface<T> {
    fn default() -> Self {
        Self {
            seed: HashMap::new(),
        }
    }
}

impl<T> Clone for QueryInterface<T> {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed.clone(),
        }
    }
}

impl<T> fmt::Debug for QueryInterface<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self
            .seed
            .iter()
            .flat_map(|(category, selectors)| {
                selectors.keys().map(move |selector| format!("{category}.{selector}"))
            })
            .collect();
        names.sort();
        f.debug_struct("QueryInterface").field("handlers", &names).finish()
    }
}

impl<T> QueryInterface<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `category` and `selector`, replacing any
    /// handler already there.
    #[must_use]
    pub fn handler<F>(mut self, category: &str, selector: &str, handler: F) -> Self
    where
        F: Fn(&FieldValues) -> ShapeupResult<T> + Send + Sync + 'static,
    {
        self.seed
            .entry(category.to_string())
            .or_default()
            .insert(selector.to_string(), Arc::new(handler));
        self
    }

    /// The handler for `category` and `selector`, if one is registered.
    pub fn get(&self, category: &str, selector: &str) -> Option<QueryHandler<T>> {
        self.seed.get(category)?.get(selector).cloned()
    }

    /// Runs the named handler.
    ///
    /// An unregistered pair is a [`ShapeupError::NotImplemented`].
    pub fn query(&self, category: &str, selector: &str, fields: &FieldValues) -> ShapeupResult<T> {
        let handler = self.get(category, selector).ok_or_else(|| {
            ShapeupError::NotImplemented(format!(
                "No query handler registered for '{category}.{selector}'"
            ))
        })?;
        handler(fields)
    }

    pub fn contains(&self, category: &str, selector: &str) -> bool {
        self.seed
            .get(category)
            .is_some_and(|selectors| selectors.contains_key(selector))
    }
}

/// An [`ObjectLookup`] that runs a handler from a [`QueryInterface`].
///
/// The handler receives the lookup parameter as its only field.
pub struct QueryLookup<T> {
    interface: Arc<QueryInterface<Option<T>>>,
    category: String,
    selector: String,
}

impl<T> QueryLookup<T> {
    pub fn new(interface: Arc<QueryInterface<Option<T>>>, category: &str, selector: &str) -> Self {
        Self {
            interface,
            category: category.to_string(),
            selector: selector.to_string(),
        }
    }
}

impl<T> fmt::Debug for QueryLookup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryLookup")
            .field("category", &self.category)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Entity + 'static> ObjectLookup for QueryLookup<T> {
    type Object = T;

    async fn lookup_object(
        &self,
        param: &LookupParam,
        _request: &HttpRequest,
    ) -> ShapeupResult<Option<T>> {
        self.interface
            .query(&self.category, &self.selector, &param.to_field_values())
    }
}

//! Multiple-object listing.
//!
//! A list view holds a [`MultipleObjects`] configuration and an
//! [`ObjectSource`] that supplies the collection. Together they produce the
//! `object_list`, `page_obj`, `is_paginated`, and `paginator` context entries.

use serde_json::Value;

use shapeup_core::{ShapeupError, ShapeupResult, SETTINGS};
use shapeup_http::HttpRequest;

use crate::collection::Collection;
use crate::context::Context;
use crate::pagination::{PageToken, Paginator};

/// Supplies the collection a list view displays.
///
/// Retrieval has two levels. Implement [`queryset`](Self::queryset) to hand
/// over a fixed collection, or override [`get_queryset`](Self::get_queryset)
/// or [`list_objects`](Self::list_objects) to derive one per request.
/// Returning `None` from every level is a configuration error.
pub trait ObjectSource: Send + Sync {
    type Objects: Collection;

    /// A preconfigured collection.
    fn queryset(&self) -> Option<Self::Objects> {
        None
    }

    /// The collection for this request. Defaults to a clone of
    /// [`queryset`](Self::queryset).
    fn get_queryset(&self, _request: &HttpRequest) -> ShapeupResult<Option<Self::Objects>> {
        Ok(self.queryset())
    }

    /// The objects to list. Defaults to [`get_queryset`](Self::get_queryset).
    fn list_objects(&self, request: &HttpRequest) -> ShapeupResult<Option<Self::Objects>> {
        self.get_queryset(request)
    }

    /// Page size; `None` or `Some(0)` disables pagination.
    fn get_paginate_by(&self, config: &MultipleObjects) -> Option<usize> {
        config.paginate_by
    }

    /// Builds the paginator for `objects`.
    fn get_paginator(
        &self,
        objects: Self::Objects,
        page_size: usize,
        config: &MultipleObjects,
    ) -> Paginator<Self::Objects> {
        Paginator::new(objects, page_size)
            .orphans(config.orphans)
            .allow_empty_first_page(config.allow_empty)
    }
}

impl<T: serde::Serialize + Clone + Send + Sync> ObjectSource for Vec<T> {
    type Objects = Self;

    fn queryset(&self) -> Option<Self> {
        Some(self.clone())
    }
}

/// Listing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleObjects {
    /// Items per page; `None` disables pagination.
    pub paginate_by: Option<usize>,
    /// Name of the routing kwarg or query parameter carrying the page token.
    pub page_kwarg: String,
    /// Whether an empty listing renders. When `false` it is a 404.
    pub allow_empty: bool,
    pub orphans: usize,
}

/// Copies `paginate_by`, `page_kwarg`, and `allow_empty` from the global
/// settings as they are when the view is built, so configure settings first.
impl Default for MultipleObjects {
    fn default() -> Self {
        let settings = SETTINGS.get_or_default();
        Self {
            paginate_by: settings.paginate_by,
            page_kwarg: settings.page_kwarg.clone(),
            allow_empty: settings.allow_empty,
            orphans: 0,
        }
    }
}

impl MultipleObjects {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn paginate_by(mut self, per_page: usize) -> Self {
        self.paginate_by = Some(per_page);
        self
    }

    #[must_use]
    pub fn page_kwarg(mut self, name: &str) -> Self {
        self.page_kwarg = name.to_string();
        self
    }

    #[must_use]
    pub const fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    #[must_use]
    pub const fn orphans(mut self, orphans: usize) -> Self {
        self.orphans = orphans;
        self
    }

    /// Reads the page token from the request.
    ///
    /// A non-empty routing kwarg wins over a non-empty query parameter of the
    /// same name; with neither, the first page is requested.
    pub fn page_token(&self, request: &HttpRequest) -> ShapeupResult<PageToken> {
        let raw = request
            .kwarg(&self.page_kwarg)
            .filter(|v| !v.is_empty())
            .or_else(|| request.get().get(&self.page_kwarg).filter(|v| !v.is_empty()));
        raw.map_or_else(|| Ok(PageToken::default()), str::parse)
    }

    /// Fetches the list from `source`, paginates it, and adds the listing
    /// entries to `context`.
    pub fn contribute<S: ObjectSource>(
        &self,
        source: &S,
        view: &str,
        request: &HttpRequest,
        context: &mut Context,
    ) -> ShapeupResult<()> {
        let objects = source.list_objects(request)?.ok_or_else(|| {
            ShapeupError::ImproperlyConfigured(format!(
                "'{view}' must either override 'list_objects()' or 'get_queryset()', or define 'queryset'"
            ))
        })?;

        if !self.allow_empty && !objects.exists() {
            return Err(ShapeupError::NotFound(format!(
                "Empty list and '{view}.allow_empty' is False."
            )));
        }

        let (object_list, page, paginator) = match source.get_paginate_by(self).filter(|n| *n > 0) {
            Some(page_size) => {
                let paginator = source.get_paginator(objects.clone(), page_size, self);
                let page = paginator.resolve(self.page_token(request)?)?;
                (page.object_list().to_vec(), Some(page), Some(paginator))
            }
            None => (objects.items(), None, None),
        };

        context.insert_serialized("object_list", &object_list)?;
        match (&page, &paginator) {
            (Some(page), Some(paginator)) => {
                context.insert_serialized("page_obj", page)?;
                context.insert("is_paginated", page.has_other_pages());
                context.insert_serialized("paginator", paginator)?;
            }
            _ => {
                context.insert("page_obj", Value::Null);
                context.insert("is_paginated", Value::Null);
                context.insert("paginator", Value::Null);
            }
        }
        Ok(())
    }
}

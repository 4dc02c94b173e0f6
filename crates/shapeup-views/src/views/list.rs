//! The multiple-object listing view.

use async_trait::async_trait;

use shapeup_core::ShapeupResult;
use shapeup_http::{HttpRequest, HttpResponse};

use crate::context::Context;
use crate::listing::{MultipleObjects, ObjectSource};

use super::template::{TemplateView, Templated};
use super::View;

/// Renders a collection, paginated when configured.
///
/// # Examples
///
/// ```
/// use shapeup_views::listing::MultipleObjects;
/// use shapeup_views::views::{ListView, Templated, View};
/// use shapeup_http::HttpRequest;
///
/// # #[tokio::main]
/// # async fn main() {
/// let view = ListView::new((1..=25).collect::<Vec<u32>>())
///     .with_template("numbers.html")
///     .with_listing(MultipleObjects::new().paginate_by(10));
///
/// let request = HttpRequest::builder().query_string("page=last").build();
/// let response = view.dispatch(&request).await.unwrap();
/// let context = response.context().unwrap();
/// assert_eq!(context["page_obj"]["number"], 3);
/// assert_eq!(context["object_list"].as_array().unwrap().len(), 5);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ListView<S> {
    base: TemplateView,
    listing: MultipleObjects,
    source: S,
}

impl<S: ObjectSource> ListView<S> {
    pub fn new(source: S) -> Self {
        Self {
            base: TemplateView::named("ListView"),
            listing: MultipleObjects::default(),
            source,
        }
    }

    #[must_use]
    pub fn with_listing(mut self, listing: MultipleObjects) -> Self {
        self.listing = listing;
        self
    }

    pub const fn listing(&self) -> &MultipleObjects {
        &self.listing
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The base context followed by the listing entries.
    pub fn get_context_data(&self, request: &HttpRequest, kwargs: &Context) -> ShapeupResult<Context> {
        let mut context = self.base.get_context_data(kwargs);
        self.listing
            .contribute(&self.source, &self.base.name, request, &mut context)?;
        Ok(context)
    }
}

impl<S> Templated for ListView<S> {
    fn base(&self) -> &TemplateView {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TemplateView {
        &mut self.base
    }
}

#[async_trait]
impl<S: ObjectSource> View for ListView<S> {
    fn name(&self) -> &str {
        &self.base.name
    }

    async fn get(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let context = self.get_context_data(request, &Context::new())?;
        self.base.render_to_response(&context, request)
    }
}

//! The single-object view.

use async_trait::async_trait;

use shapeup_core::ShapeupResult;
use shapeup_http::{HttpRequest, HttpResponse};

use crate::context::Context;
use crate::lookup::{ObjectLookup, SingleObject};

use super::template::{TemplateView, Templated};
use super::View;

/// Renders one object resolved from the routing kwargs.
#[derive(Debug, Clone)]
pub struct DetailView<L> {
    base: TemplateView,
    lookup: SingleObject,
    source: L,
}

impl<L: ObjectLookup> DetailView<L> {
    pub fn new(source: L) -> Self {
        Self {
            base: TemplateView::named("DetailView"),
            lookup: SingleObject::default(),
            source,
        }
    }

    #[must_use]
    pub fn with_lookup(mut self, lookup: SingleObject) -> Self {
        self.lookup = lookup;
        self
    }

    pub const fn lookup(&self) -> &SingleObject {
        &self.lookup
    }

    /// The base context followed by `object`.
    pub async fn get_context_data(
        &self,
        request: &HttpRequest,
        kwargs: &Context,
    ) -> ShapeupResult<Context> {
        let mut context = self.base.get_context_data(kwargs);
        self.lookup
            .contribute(&self.source, &self.base.name, request, &mut context)
            .await?;
        Ok(context)
    }
}

impl<L> Templated for DetailView<L> {
    fn base(&self) -> &TemplateView {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TemplateView {
        &mut self.base
    }
}

#[async_trait]
impl<L: ObjectLookup> View for DetailView<L> {
    fn name(&self) -> &str {
        &self.base.name
    }

    async fn get(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let context = self.get_context_data(request, &Context::new()).await?;
        self.base.render_to_response(&context, request)
    }
}

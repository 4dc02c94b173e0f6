//! The template-rendering base view.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use shapeup_core::{ShapeupError, ShapeupResult};
use shapeup_http::{HttpRequest, HttpResponse};

use crate::context::Context;
use crate::render::{DebugRenderer, Renderer};

use super::View;

/// Renders a configured template with a context.
///
/// Every other view embeds one as its base and builds on its context. The
/// context always carries `view` (`{"name": ...}`); `extra_context` and the
/// caller's entries are laid down first.
///
/// # Examples
///
/// ```
/// use shapeup_views::views::{TemplateView, Templated, View};
/// use shapeup_http::HttpRequest;
///
/// # #[tokio::main]
/// # async fn main() {
/// let view = TemplateView::new().with_name("About").with_template("about.html");
/// let request = HttpRequest::builder().path("/about/").build();
/// let response = view.dispatch(&request).await.unwrap();
/// assert_eq!(response.template_name(), Some("about.html"));
/// # }
/// ```
#[derive(Clone)]
pub struct TemplateView {
    pub name: String,
    pub template_name: Option<String>,
    pub extra_context: Context,
    pub renderer: Arc<dyn Renderer>,
}

impl fmt::Debug for TemplateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateView")
            .field("name", &self.name)
            .field("template_name", &self.template_name)
            .field("extra_context", &self.extra_context)
            .finish_non_exhaustive()
    }
}

impl Default for TemplateView {
    fn default() -> Self {
        Self::named("TemplateView")
    }
}

impl TemplateView {
    pub fn new() -> Self {
        Self::default()
    }

    /// A base with the given view name and no template.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            template_name: None,
            extra_context: Context::new(),
            renderer: Arc::new(DebugRenderer),
        }
    }

    /// The candidate templates, which is just the configured one.
    pub fn get_template_names(&self) -> ShapeupResult<Vec<String>> {
        self.template_name
            .clone()
            .map(|name| vec![name])
            .ok_or_else(|| {
                ShapeupError::missing_attribute(&self.name, "template_name", "get_template_names()")
            })
    }

    /// `extra_context`, then a copy of `kwargs`, then `view` unless `kwargs`
    /// already set it.
    pub fn get_context_data(&self, kwargs: &Context) -> Context {
        let mut context = self.extra_context.clone();
        context.update(kwargs);
        context.set_default("view", json!({ "name": self.name }));
        context
    }

    pub fn render(
        &self,
        template_names: &[String],
        context: &Context,
        request: &HttpRequest,
    ) -> ShapeupResult<HttpResponse> {
        self.renderer.render(template_names, context, request)
    }

    pub fn render_to_response(
        &self,
        context: &Context,
        request: &HttpRequest,
    ) -> ShapeupResult<HttpResponse> {
        let names = self.get_template_names()?;
        self.render(&names, context, request)
    }
}

#[async_trait]
impl View for TemplateView {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let context = self.get_context_data(&Context::new());
        self.render_to_response(&context, request)
    }
}

/// Builder methods shared by every view that embeds a [`TemplateView`].
pub trait Templated: Sized {
    fn base(&self) -> &TemplateView;

    fn base_mut(&mut self) -> &mut TemplateView;

    /// Sets the name used in errors and logs.
    #[must_use]
    fn with_name(mut self, name: &str) -> Self {
        self.base_mut().name = name.to_string();
        self
    }

    #[must_use]
    fn with_template(mut self, template_name: &str) -> Self {
        self.base_mut().template_name = Some(template_name.to_string());
        self
    }

    #[must_use]
    fn with_extra_context(mut self, extra_context: Context) -> Self {
        self.base_mut().extra_context = extra_context;
        self
    }

    #[must_use]
    fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.base_mut().renderer = renderer;
        self
    }
}

impl Templated for TemplateView {
    fn base(&self) -> &TemplateView {
        self
    }

    fn base_mut(&mut self) -> &mut TemplateView {
        self
    }
}

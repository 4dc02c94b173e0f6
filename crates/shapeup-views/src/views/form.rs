//! Form processing with a preview branch.
//!
//! A submission is classified into one of three outcomes ([`Submission`]):
//! invalid forms re-render with their errors, valid forms carrying the
//! preview field re-render through the preview template, and all other valid
//! forms go to the view's `form_valid` step. [`FormFlow`] holds the
//! configuration and the shared steps; [`FormView`],
//! [`CreateView`](super::CreateView), and [`UpdateView`](super::UpdateView)
//! embed one.

use async_trait::async_trait;
use http::Method;

use shapeup_core::{ShapeupError, ShapeupResult, SETTINGS};
use shapeup_http::{Files, HttpRequest, HttpResponse, QueryDict};

use crate::context::Context;
use crate::fields::FieldValues;
use crate::form::{Form, FormClass};

use super::process::SuccessUrl;
use super::template::{TemplateView, Templated};
use super::View;

/// The outcome of validating a submitted form.
#[derive(Debug)]
pub enum Submission<F> {
    Invalid(F),
    Preview(F),
    Valid(F),
}

/// Form configuration and the steps shared by every form-processing view.
#[derive(Debug, Clone)]
pub struct FormFlow<C> {
    pub form_class: C,
    pub preview_template_name: Option<String>,
    /// Submitted field whose presence requests a preview.
    pub preview_field: String,
    pub success_url: SuccessUrl,
}

impl<C: FormClass> FormFlow<C> {
    /// A flow for `form_class`. The preview field is read from the global
    /// settings now, not per request.
    pub fn new(form_class: C) -> Self {
        Self {
            form_class,
            preview_template_name: None,
            preview_field: SETTINGS.get_or_default().preview_field.clone(),
            success_url: SuccessUrl::none(),
        }
    }

    #[must_use]
    pub fn preview_template(mut self, template_name: &str) -> Self {
        self.preview_template_name = Some(template_name.to_string());
        self
    }

    #[must_use]
    pub fn preview_field(mut self, field: &str) -> Self {
        self.preview_field = field.to_string();
        self
    }

    #[must_use]
    pub fn success_url(mut self, url: &str) -> Self {
        self.success_url = SuccessUrl::to(url);
        self
    }

    /// Whether the submitted data contains the preview field. Its value is
    /// not inspected.
    pub fn is_preview(&self, request: &HttpRequest) -> bool {
        request.post().contains_key(&self.preview_field)
    }

    /// The preview template for previews, the base template otherwise.
    pub fn get_template_names(
        &self,
        base: &TemplateView,
        request: &HttpRequest,
    ) -> ShapeupResult<Vec<String>> {
        if !self.is_preview(request) {
            return base.get_template_names();
        }
        self.preview_template_name
            .clone()
            .map(|name| vec![name])
            .ok_or_else(|| {
                ShapeupError::missing_attribute(
                    &base.name,
                    "preview_template_name",
                    "get_template_names()",
                )
            })
    }

    pub fn get_form(
        &self,
        data: Option<&QueryDict>,
        files: Option<&Files>,
        initial: FieldValues,
    ) -> C::Form {
        self.form_class.build(data, files, initial)
    }

    /// Binds the submitted fields and files, validates, and classifies.
    pub async fn classify(&self, request: &HttpRequest) -> Submission<C::Form> {
        let mut form = self.get_form(Some(request.post()), Some(request.files()), FieldValues::new());
        if !form.is_valid().await {
            tracing::debug!(errors = form.errors().len(), "Form is invalid");
            return Submission::Invalid(form);
        }
        if self.is_preview(request) {
            tracing::debug!("Rendering preview");
            return Submission::Preview(form);
        }
        Submission::Valid(form)
    }

    /// Renders `context` through [`get_template_names`](Self::get_template_names).
    pub fn render(
        &self,
        base: &TemplateView,
        context: &Context,
        request: &HttpRequest,
    ) -> ShapeupResult<HttpResponse> {
        let names = self.get_template_names(base, request)?;
        base.render(&names, context, request)
    }
}

/// The caller context every form view starts from.
pub(crate) fn form_kwargs<F: Form>(form: &F) -> Context {
    let mut kwargs = Context::new();
    kwargs.insert("form", form.as_context());
    kwargs
}

pub(crate) fn form_methods() -> Vec<Method> {
    vec![Method::GET, Method::HEAD, Method::POST, Method::OPTIONS]
}

/// What a [`FormView`] does with a valid, non-preview submission.
///
/// After it returns, the view redirects to its success URL.
#[async_trait]
pub trait FormValid<F: Form>: Send + Sync {
    async fn form_valid(&self, form: &F, request: &HttpRequest) -> ShapeupResult<()>;
}

/// Displays a form, validates submissions, and hands valid ones to a
/// [`FormValid`] handler.
#[derive(Debug, Clone)]
pub struct FormView<C, H> {
    base: TemplateView,
    flow: FormFlow<C>,
    handler: H,
}

impl<C, H> FormView<C, H>
where
    C: FormClass,
    H: FormValid<C::Form>,
{
    pub fn new(form_class: C, handler: H) -> Self {
        Self {
            base: TemplateView::named("FormView"),
            flow: FormFlow::new(form_class),
            handler,
        }
    }

    #[must_use]
    pub fn with_flow(mut self, configure: impl FnOnce(FormFlow<C>) -> FormFlow<C>) -> Self {
        self.flow = configure(self.flow);
        self
    }

    pub const fn flow(&self) -> &FormFlow<C> {
        &self.flow
    }

    pub fn get_context_data(&self, kwargs: &Context) -> Context {
        self.base.get_context_data(kwargs)
    }

    /// Re-renders a valid form through the preview template.
    pub fn preview(&self, form: &C::Form, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let context = self.get_context_data(&form_kwargs(form));
        self.flow.render(&self.base, &context, request)
    }

    pub fn form_invalid(&self, form: &C::Form, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let context = self.get_context_data(&form_kwargs(form));
        self.flow.render(&self.base, &context, request)
    }

    pub async fn form_valid(
        &self,
        form: &C::Form,
        request: &HttpRequest,
    ) -> ShapeupResult<HttpResponse> {
        let url = self.flow.success_url.get_success_url(&self.base.name)?;
        self.handler.form_valid(form, request).await?;
        Ok(shapeup_http::HttpResponseRedirect::new(&url))
    }
}

impl<C, H> Templated for FormView<C, H> {
    fn base(&self) -> &TemplateView {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TemplateView {
        &mut self.base
    }
}

#[async_trait]
impl<C, H> View for FormView<C, H>
where
    C: FormClass,
    H: FormValid<C::Form>,
{
    fn name(&self) -> &str {
        &self.base.name
    }

    fn allowed_methods(&self) -> Vec<Method> {
        form_methods()
    }

    async fn get(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let form = self.flow.get_form(None, None, FieldValues::new());
        let context = self.get_context_data(&form_kwargs(&form));
        self.base.render_to_response(&context, request)
    }

    async fn post(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        match self.flow.classify(request).await {
            Submission::Invalid(form) => self.form_invalid(&form, request),
            Submission::Preview(form) => self.preview(&form, request),
            Submission::Valid(form) => self.form_valid(&form, request).await,
        }
    }
}

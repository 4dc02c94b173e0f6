//! The update view.

use async_trait::async_trait;
use http::Method;

use shapeup_core::ShapeupResult;
use shapeup_http::{HttpRequest, HttpResponse, HttpResponseRedirect};

use crate::collection::Entity;
use crate::context::Context;
use crate::form::{Form, FormClass};
use crate::lookup::{ObjectLookup, SingleObject};
use crate::persist::ObjectUpdater;

use super::form::{form_kwargs, form_methods, FormFlow, Submission};
use super::template::{TemplateView, Templated};
use super::View;

/// Edits an existing object.
///
/// `GET` resolves the object and builds an unbound form whose initial values
/// are the object's fields. A valid submission is merged with the lookup
/// parameter and handed to the [`ObjectUpdater`]. Every render carries the
/// current object as `object`.
#[derive(Debug, Clone)]
pub struct UpdateView<C, P> {
    base: TemplateView,
    flow: FormFlow<C>,
    lookup: SingleObject,
    persister: P,
}

impl<C, P> UpdateView<C, P>
where
    C: FormClass,
    P: ObjectLookup + ObjectUpdater,
{
    pub fn new(form_class: C, persister: P) -> Self {
        Self {
            base: TemplateView::named("UpdateView"),
            flow: FormFlow::new(form_class),
            lookup: SingleObject::default(),
            persister,
        }
    }

    #[must_use]
    pub fn with_flow(mut self, configure: impl FnOnce(FormFlow<C>) -> FormFlow<C>) -> Self {
        self.flow = configure(self.flow);
        self
    }

    #[must_use]
    pub fn with_lookup(mut self, lookup: SingleObject) -> Self {
        self.lookup = lookup;
        self
    }

    pub const fn flow(&self) -> &FormFlow<C> {
        &self.flow
    }

    pub const fn persister(&self) -> &P {
        &self.persister
    }

    /// An unbound form initialised from `object`'s fields.
    pub fn get_form(&self, object: &P::Object) -> ShapeupResult<C::Form> {
        Ok(self.flow.get_form(None, None, object.field_values()?))
    }

    /// The base context followed by `object`.
    pub async fn get_context_data(
        &self,
        request: &HttpRequest,
        kwargs: &Context,
    ) -> ShapeupResult<Context> {
        let mut context = self.base.get_context_data(kwargs);
        self.lookup
            .contribute(&self.persister, &self.base.name, request, &mut context)
            .await?;
        Ok(context)
    }

    pub async fn preview(
        &self,
        form: &C::Form,
        request: &HttpRequest,
    ) -> ShapeupResult<HttpResponse> {
        let context = self.get_context_data(request, &form_kwargs(form)).await?;
        self.flow.render(&self.base, &context, request)
    }

    pub async fn form_invalid(
        &self,
        form: &C::Form,
        request: &HttpRequest,
    ) -> ShapeupResult<HttpResponse> {
        let context = self.get_context_data(request, &form_kwargs(form)).await?;
        self.flow.render(&self.base, &context, request)
    }

    /// Merges the cleaned values with the lookup parameter, updates, and
    /// redirects. The lookup parameter wins over a cleaned field of the same
    /// name.
    pub async fn form_valid(
        &self,
        form: &C::Form,
        request: &HttpRequest,
    ) -> ShapeupResult<HttpResponse> {
        let url = self.flow.success_url.get_success_url(&self.base.name)?;
        let param = self.lookup.get_lookup_param(&self.base.name, request)?;
        let fields = form.cleaned_data().clone().merged(param.to_field_values());
        tracing::info!(
            view = %self.base.name,
            field = %param.field,
            value = %param.value,
            "Updating object"
        );
        self.persister.update_object(fields, request).await?;
        Ok(HttpResponseRedirect::new(&url))
    }
}

impl<C, P> Templated for UpdateView<C, P> {
    fn base(&self) -> &TemplateView {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TemplateView {
        &mut self.base
    }
}

#[async_trait]
impl<C, P> View for UpdateView<C, P>
where
    C: FormClass,
    P: ObjectLookup + ObjectUpdater,
{
    fn name(&self) -> &str {
        &self.base.name
    }

    fn allowed_methods(&self) -> Vec<Method> {
        form_methods()
    }

    async fn get(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let object = self
            .lookup
            .get_object(&self.persister, &self.base.name, request)
            .await?;
        let form = self.get_form(&object)?;
        let mut context = self.base.get_context_data(&form_kwargs(&form));
        context.insert_serialized("object", &object)?;
        self.base.render_to_response(&context, request)
    }

    async fn post(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        match self.flow.classify(request).await {
            Submission::Invalid(form) => self.form_invalid(&form, request).await,
            Submission::Preview(form) => self.preview(&form, request).await,
            Submission::Valid(form) => self.form_valid(&form, request).await,
        }
    }
}

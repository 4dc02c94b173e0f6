//! The create view.

use async_trait::async_trait;
use http::Method;

use shapeup_core::ShapeupResult;
use shapeup_http::{HttpRequest, HttpResponse, HttpResponseRedirect};

use crate::context::Context;
use crate::fields::FieldValues;
use crate::form::{Form, FormClass};
use crate::persist::ObjectSaver;

use super::form::{form_kwargs, form_methods, FormFlow, Submission};
use super::template::{TemplateView, Templated};
use super::View;

/// Creates an object from a valid submission through an [`ObjectSaver`],
/// then redirects to the success URL.
#[derive(Debug, Clone)]
pub struct CreateView<C, P> {
    base: TemplateView,
    flow: FormFlow<C>,
    saver: P,
}

impl<C, P> CreateView<C, P>
where
    C: FormClass,
    P: ObjectSaver,
{
    pub fn new(form_class: C, saver: P) -> Self {
        Self {
            base: TemplateView::named("CreateView"),
            flow: FormFlow::new(form_class),
            saver,
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

    pub const fn saver(&self) -> &P {
        &self.saver
    }

    /// The base context, plus `object` when a saved object is given.
    pub fn get_context_data(
        &self,
        kwargs: &Context,
        saved: Option<&P::Object>,
    ) -> ShapeupResult<Context> {
        let mut context = self.base.get_context_data(kwargs);
        if let Some(object) = saved {
            context.insert_serialized("object", object)?;
        }
        Ok(context)
    }

    pub fn preview(&self, form: &C::Form, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let context = self.get_context_data(&form_kwargs(form), None)?;
        self.flow.render(&self.base, &context, request)
    }

    pub fn form_invalid(&self, form: &C::Form, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let context = self.get_context_data(&form_kwargs(form), None)?;
        self.flow.render(&self.base, &context, request)
    }

    /// Passes the cleaned values to the saver.
    pub async fn save(&self, form: &C::Form, request: &HttpRequest) -> ShapeupResult<P::Object> {
        tracing::info!(view = %self.base.name, fields = form.cleaned_data().len(), "Saving object");
        self.saver
            .save_object(form.cleaned_data().clone(), request)
            .await
    }

    pub async fn form_valid(
        &self,
        form: &C::Form,
        request: &HttpRequest,
    ) -> ShapeupResult<HttpResponse> {
        let url = self.flow.success_url.get_success_url(&self.base.name)?;
        self.save(form, request).await?;
        Ok(HttpResponseRedirect::new(&url))
    }
}

impl<C, P> Templated for CreateView<C, P> {
    fn base(&self) -> &TemplateView {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TemplateView {
        &mut self.base
    }
}

#[async_trait]
impl<C, P> View for CreateView<C, P>
where
    C: FormClass,
    P: ObjectSaver,
{
    fn name(&self) -> &str {
        &self.base.name
    }

    fn allowed_methods(&self) -> Vec<Method> {
        form_methods()
    }

    async fn get(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let form = self.flow.get_form(None, None, FieldValues::new());
        let context = self.get_context_data(&form_kwargs(&form), None)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormDefinition, FormField};
    use serde::Serialize;
    use shapeup_core::ShapeupError;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Serialize, PartialEq)]
    struct Task {
        id: u32,
        title: String,
    }

    #[derive(Default)]
    struct Tasks {
        rows: Mutex<Vec<Task>>,
    }

    #[async_trait]
    impl ObjectSaver for Tasks {
        type Object = Task;

        async fn save_object(
            &self,
            fields: FieldValues,
            _request: &HttpRequest,
        ) -> ShapeupResult<Task> {
            let mut rows = self.rows.lock().unwrap();
            let task = Task {
                id: u32::try_from(rows.len()).unwrap() + 1,
                title: fields.get_str("title").unwrap_or_default().to_string(),
            };
            rows.push(task.clone());
            Ok(task)
        }
    }

    fn view() -> CreateView<FormDefinition, Tasks> {
        CreateView::new(
            FormDefinition::new().field(FormField::char("title")),
            Tasks::default(),
        )
        .with_name("TaskCreate")
        .with_template("task_form.html")
        .with_flow(|flow| flow.preview_template("task_preview.html").success_url("/tasks/"))
    }

    fn post(body: &str) -> HttpRequest {
        HttpRequest::builder().method(Method::POST).form(body).build()
    }

    #[tokio::test]
    async fn test_valid_post_saves_and_redirects() {
        let view = view();
        let response = view.post(&post("title=Write+docs")).await.unwrap();
        assert_eq!(response.location(), Some("/tasks/"));
        assert_eq!(
            *view.saver().rows.lock().unwrap(),
            vec![Task {
                id: 1,
                title: "Write docs".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_non_ascii_success_url_keeps_location() {
        let view = view().with_flow(|flow| flow.success_url("/tâches/"));
        let response = view.post(&post("title=Ship")).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::FOUND);
        assert_eq!(response.location(), Some("/t%C3%A2ches/"));
        assert_eq!(view.saver().rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_preview_saves_nothing() {
        let view = view();
        let response = view.post(&post("title=Draft&preview=on")).await.unwrap();
        assert_eq!(response.template_name(), Some("task_preview.html"));
        assert!(view.saver().rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_rerenders() {
        let view = view();
        let response = view.post(&post("title=")).await.unwrap();
        assert_eq!(response.template_name(), Some("task_form.html"));
        assert_eq!(
            response.context().unwrap()["form"]["errors"]["title"][0],
            "This field is required."
        );
        assert!(view.saver().rows.lock().unwrap().is_empty());
    }

    #[test]
    fn test_saved_object_in_context() {
        let view = view();
        let task = Task {
            id: 7,
            title: "Ship".into(),
        };
        let context = view.get_context_data(&Context::new(), Some(&task)).unwrap();
        assert_eq!(context["object"]["id"], 7);
        assert!(!view
            .get_context_data(&Context::new(), None)
            .unwrap()
            .contains_key("object"));
    }

    #[tokio::test]
    async fn test_missing_success_url_saves_nothing() {
        let view = view().with_flow(|mut flow| {
            flow.success_url = crate::views::SuccessUrl::none();
            flow
        });
        let err = view.post(&post("title=Ship")).await.unwrap_err();
        assert!(matches!(err, ShapeupError::ImproperlyConfigured(_)));
        assert!(view.saver().rows.lock().unwrap().is_empty());
    }
}

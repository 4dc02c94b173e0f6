//! The delete view.

use async_trait::async_trait;
use http::Method;

use shapeup_core::ShapeupResult;
use shapeup_http::{HttpRequest, HttpResponse, HttpResponseRedirect};

use crate::context::Context;
use crate::lookup::SingleObject;
use crate::persist::ObjectDeleter;

use super::process::SuccessUrl;
use super::template::{TemplateView, Templated};
use super::View;

/// Deletes the object named by the routing kwargs on `POST`.
///
/// `GET` renders the confirmation template with the base context only; the
/// object is not fetched.
#[derive(Debug, Clone)]
pub struct DeleteView<P> {
    base: TemplateView,
    lookup: SingleObject,
    success_url: SuccessUrl,
    deleter: P,
}

impl<P: ObjectDeleter> DeleteView<P> {
    pub fn new(deleter: P) -> Self {
        Self {
            base: TemplateView::named("DeleteView"),
            lookup: SingleObject::default(),
            success_url: SuccessUrl::none(),
            deleter,
        }
    }

    #[must_use]
    pub fn with_lookup(mut self, lookup: SingleObject) -> Self {
        self.lookup = lookup;
        self
    }

    #[must_use]
    pub fn with_success_url(mut self, url: &str) -> Self {
        self.success_url = SuccessUrl::to(url);
        self
    }

    pub const fn deleter(&self) -> &P {
        &self.deleter
    }
}

impl<P> Templated for DeleteView<P> {
    fn base(&self) -> &TemplateView {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TemplateView {
        &mut self.base
    }
}

#[async_trait]
impl<P: ObjectDeleter> View for DeleteView<P> {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn allowed_methods(&self) -> Vec<Method> {
        vec![Method::GET, Method::HEAD, Method::POST, Method::OPTIONS]
    }

    async fn get(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let context = self.base.get_context_data(&Context::new());
        self.base.render_to_response(&context, request)
    }

    async fn post(&self, request: &HttpRequest) -> ShapeupResult<HttpResponse> {
        let url = self.success_url.get_success_url(&self.base.name)?;
        let param = self.lookup.get_lookup_param(&self.base.name, request)?;
        tracing::info!(
            view = %self.base.name,
            field = %param.field,
            value = %param.value,
            "Deleting object"
        );
        self.deleter.delete_object(&param, request).await?;
        Ok(HttpResponseRedirect::new(&url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupParam;
    use shapeup_core::ShapeupError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Trash {
        deleted: Mutex<Vec<LookupParam>>,
    }

    #[async_trait]
    impl ObjectDeleter for Trash {
        async fn delete_object(
            &self,
            param: &LookupParam,
            _request: &HttpRequest,
        ) -> ShapeupResult<()> {
            self.deleted.lock().unwrap().push(param.clone());
            Ok(())
        }
    }

    fn view() -> DeleteView<Trash> {
        DeleteView::new(Trash::default())
            .with_name("PostDelete")
            .with_template("post_confirm_delete.html")
            .with_lookup(SingleObject::new().lookup_field("id").lookup_url_kwarg("post_id"))
            .with_success_url("/posts/")
    }

    #[tokio::test]
    async fn test_post_deletes_and_redirects() {
        let view = view();
        let request = HttpRequest::builder()
            .method(Method::POST)
            .kwarg("post_id", "12")
            .build();
        let response = view.dispatch(&request).await.unwrap();
        assert_eq!(response.location(), Some("/posts/"));
        assert_eq!(
            *view.deleter().deleted.lock().unwrap(),
            vec![LookupParam::new("id", "12")]
        );
    }

    #[tokio::test]
    async fn test_get_renders_confirmation_without_object() {
        let view = view();
        let request = HttpRequest::builder().kwarg("post_id", "12").build();
        let response = view.dispatch(&request).await.unwrap();
        assert_eq!(response.template_name(), Some("post_confirm_delete.html"));
        assert!(response.context().unwrap().get("object").is_none());
        assert!(view.deleter().deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_kwarg() {
        let request = HttpRequest::builder().method(Method::POST).build();
        let err = view().dispatch(&request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Improperly configured: Lookup field 'post_id' was not provided in view kwargs to 'PostDelete'"
        );
    }

    #[tokio::test]
    async fn test_missing_success_url() {
        let view = DeleteView::new(Trash::default()).with_name("PostDelete");
        let request = HttpRequest::builder()
            .method(Method::POST)
            .kwarg("pk", "1")
            .build();
        let err = view.dispatch(&request).await.unwrap_err();
        assert!(matches!(err, ShapeupError::ImproperlyConfigured(_)));
        assert!(view.deleter().deleted.lock().unwrap().is_empty());
    }
}

//! Single-object lookup.
//!
//! A [`SingleObject`] configuration names the lookup field and the routing
//! kwarg that carries its value. It turns the request into a
//! [`LookupParam`], and an [`ObjectLookup`] implementation fetches the entity.

use async_trait::async_trait;

use shapeup_core::{ShapeupError, ShapeupResult, SETTINGS};
use shapeup_http::HttpRequest;

use crate::collection::Entity;
use crate::context::Context;
use crate::fields::FieldValues;

/// The field/value pair used to fetch one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupParam {
    pub field: String,
    pub value: String,
}

impl LookupParam {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// The parameter as a one-entry [`FieldValues`].
    pub fn to_field_values(&self) -> FieldValues {
        [(self.field.clone(), self.value.clone())].into_iter().collect()
    }
}

/// Fetches the entity a lookup parameter identifies.
///
/// `Ok(None)` means no such entity and becomes a 404.
#[async_trait]
pub trait ObjectLookup: Send + Sync {
    type Object: Entity;

    async fn lookup_object(
        &self,
        param: &LookupParam,
        request: &HttpRequest,
    ) -> ShapeupResult<Option<Self::Object>>;
}

/// Lookup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleObject {
    /// The entity field matched against the kwarg value.
    pub lookup_field: String,
    /// Routing kwarg holding the value. Defaults to `lookup_field`.
    pub lookup_url_kwarg: Option<String>,
}

/// Takes `lookup_field` from the global settings as they are at construction.
impl Default for SingleObject {
    fn default() -> Self {
        Self {
            lookup_field: SETTINGS.get_or_default().lookup_field.clone(),
            lookup_url_kwarg: None,
        }
    }
}

impl SingleObject {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lookup_field(mut self, field: &str) -> Self {
        self.lookup_field = field.to_string();
        self
    }

    #[must_use]
    pub fn lookup_url_kwarg(mut self, kwarg: &str) -> Self {
        self.lookup_url_kwarg = Some(kwarg.to_string());
        self
    }

    /// The routing kwarg that is read.
    pub fn url_kwarg(&self) -> &str {
        self.lookup_url_kwarg.as_deref().unwrap_or(&self.lookup_field)
    }

    /// Builds the lookup parameter from the request's routing kwargs.
    pub fn get_lookup_param(&self, view: &str, request: &HttpRequest) -> ShapeupResult<LookupParam> {
        let kwarg = self.url_kwarg();
        request
            .kwarg(kwarg)
            .map(|value| LookupParam::new(&self.lookup_field, value))
            .ok_or_else(|| ShapeupError::missing_lookup_kwarg(kwarg, view))
    }

    /// Resolves the entity, failing with a 404 when the lookup finds nothing.
    pub async fn get_object<L: ObjectLookup>(
        &self,
        lookup: &L,
        view: &str,
        request: &HttpRequest,
    ) -> ShapeupResult<L::Object> {
        let param = self.get_lookup_param(view, request)?;
        if let Some(object) = lookup.lookup_object(&param, request).await? {
            return Ok(object);
        }
        tracing::debug!(view, field = %param.field, value = %param.value, "Lookup found no object");
        Err(ShapeupError::NotFound(format!(
            "No object found matching {}={}",
            param.field, param.value
        )))
    }

    /// Resolves the entity and adds it to `context` as `object`.
    pub async fn contribute<L: ObjectLookup>(
        &self,
        lookup: &L,
        view: &str,
        request: &HttpRequest,
        context: &mut Context,
    ) -> ShapeupResult<L::Object> {
        let object = self.get_object(lookup, view, request).await?;
        context.insert_serialized("object", &object)?;
        Ok(object)
    }
}

//! Persistence capabilities of the processing views.
//!
//! Each processing view requires exactly the capability it calls: a create
//! view needs an [`ObjectSaver`], an update view an [`ObjectUpdater`], a
//! delete view an [`ObjectDeleter`]. The application implements them over its
//! own storage.

use async_trait::async_trait;
use serde::Serialize;

use shapeup_core::ShapeupResult;
use shapeup_http::HttpRequest;

use crate::fields::FieldValues;
use crate::lookup::LookupParam;

/// Creates an object from a valid form's cleaned values.
#[async_trait]
pub trait ObjectSaver: Send + Sync {
    type Object: Serialize + Send + Sync;

    async fn save_object(
        &self,
        fields: FieldValues,
        request: &HttpRequest,
    ) -> ShapeupResult<Self::Object>;
}

/// Applies a valid form's cleaned values to an existing object.
///
/// `fields` carries the lookup parameter alongside the cleaned values, so
/// the implementation can tell which object to update.
#[async_trait]
pub trait ObjectUpdater: Send + Sync {
    async fn update_object(&self, fields: FieldValues, request: &HttpRequest) -> ShapeupResult<()>;
}

/// Deletes the object a lookup parameter identifies.
#[async_trait]
pub trait ObjectDeleter: Send + Sync {
    async fn delete_object(&self, param: &LookupParam, request: &HttpRequest) -> ShapeupResult<()>;
}

//! Turning a template list and a context into a response.
//!
//! Views resolve one or more candidate template names and hand them to a
//! [`Renderer`] together with the context and the request. [`TeraRenderer`]
//! renders with the Tera engine. [`DebugRenderer`] needs no templates at all
//! and dumps the context as JSON, which is what views use until a real
//! renderer is attached.

use std::error::Error as _;
use std::path::Path;

use serde_json::json;
use tera::{escape_html, Tera};

use shapeup_core::{Settings, ShapeupError, ShapeupResult};
use shapeup_http::{HttpRequest, HttpResponse};

use crate::context::Context;

/// Builds a response from candidate templates, a context, and the request.
pub trait Renderer: Send + Sync {
    /// Renders the first usable template in `template_names`.
    fn render(
        &self,
        template_names: &[String],
        context: &Context,
        request: &HttpRequest,
    ) -> ShapeupResult<HttpResponse>;
}

/// Renders templates with [Tera](https://keats.github.io/tera/).
///
/// The first name in the candidate list that Tera knows is rendered. The
/// request is exposed to templates as `request` (`path`, `method`,
/// `full_path`) unless the view context already defines that key.
#[derive(Debug, Clone)]
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    /// Wraps an existing Tera instance.
    pub const fn new(tera: Tera) -> Self {
        Self { tera }
    }

    /// Loads every template below each of `settings.template_dirs`.
    ///
    /// Templates are named by their path relative to their directory.
    pub fn from_settings(settings: &Settings) -> ShapeupResult<Self> {
        let mut tera = Tera::default();
        for dir in &settings.template_dirs {
            tera.extend(&load_dir(dir)?).map_err(template_error)?;
        }
        tracing::debug!(
            templates = tera.get_template_names().count(),
            "Loaded templates"
        );
        Ok(Self { tera })
    }

    /// Builds a renderer from in-memory `(name, source)` pairs.
    pub fn from_templates<'a, I>(templates: I) -> ShapeupResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates).map_err(template_error)?;
        Ok(Self { tera })
    }

    pub const fn tera(&self) -> &Tera {
        &self.tera
    }
}

impl Renderer for TeraRenderer {
    fn render(
        &self,
        template_names: &[String],
        context: &Context,
        request: &HttpRequest,
    ) -> ShapeupResult<HttpResponse> {
        let known: Vec<&str> = self.tera.get_template_names().collect();
        let name = template_names
            .iter()
            .find(|name| known.contains(&name.as_str()))
            .ok_or_else(|| ShapeupError::TemplateDoesNotExist(template_names.join(", ")))?;

        let mut tera_context =
            tera::Context::from_value(context.clone().into_value()).map_err(template_error)?;
        if !context.contains_key("request") {
            tera_context.insert(
                "request",
                &json!({
                    "path": request.path(),
                    "method": request.method().as_str(),
                    "full_path": request.get_full_path(),
                }),
            );
        }

        let html = self.tera.render(name, &tera_context).map_err(template_error)?;
        Ok(HttpResponse::ok(html).with_template(name, context.clone().into_value()))
    }
}

fn load_dir(dir: &Path) -> ShapeupResult<Tera> {
    let pattern = dir.join("**").join("*");
    Tera::new(&pattern.to_string_lossy()).map_err(template_error)
}

/// Flattens a Tera error and its sources into one message.
fn template_error(error: tera::Error) -> ShapeupError {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    ShapeupError::TemplateError(message)
}

/// Renders the context as pretty, HTML-escaped JSON under a comment naming
/// the template.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugRenderer;

impl Renderer for DebugRenderer {
    fn render(
        &self,
        template_names: &[String],
        context: &Context,
        _request: &HttpRequest,
    ) -> ShapeupResult<HttpResponse> {
        let name = template_names.first().ok_or_else(|| {
            ShapeupError::TemplateDoesNotExist("no template names given".to_string())
        })?;
        let context_json = escape_html(&serde_json::to_string_pretty(context)?);
        let body = format!(
            "<!-- Template: {} -->\n<html><body><pre>{context_json}</pre></body></html>",
            escape_html(name)
        );
        Ok(HttpResponse::ok(body).with_template(name, context.clone().into_value()))
    }
}

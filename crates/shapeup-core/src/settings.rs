//! Settings for shapeup views.
//!
//! [`Settings`] holds the defaults that view constructors pick up (page
//! parameter name, preview field, lookup field, and so on) together with the
//! logging configuration. [`LazySettings`] is a globally-accessible,
//! lazily-initialized container; [`SETTINGS`] is the process-wide instance.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{ShapeupError, ShapeupResult};

/// The complete set of view settings.
///
/// # Examples
///
/// ```
/// use shapeup_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.page_kwarg, "page");
/// assert_eq!(settings.preview_field, "preview");
/// assert!(settings.allow_empty);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter (e.g. "info", "shapeup_views=debug").
    pub log_level: String,

    // ── Listing ──────────────────────────────────────────────────────

    /// Name of the routing kwarg / query parameter that carries the page token.
    pub page_kwarg: String,
    /// Default page size for listing views; `None` disables pagination.
    pub paginate_by: Option<usize>,
    /// Whether listing views accept an empty object list.
    pub allow_empty: bool,

    // ── Lookup ───────────────────────────────────────────────────────

    /// Default field used by single-object views.
    pub lookup_field: String,

    // ── Forms ────────────────────────────────────────────────────────

    /// Name of the submitted field whose presence switches a form view into preview.
    pub preview_field: String,

    // ── Templates ────────────────────────────────────────────────────

    /// Template directories searched by `TeraRenderer::from_settings`.
    pub template_dirs: Vec<PathBuf>,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            page_kwarg: "page".to_string(),
            paginate_by: None,
            allow_empty: true,
            lookup_field: "pk".to_string(),
            preview_field: "preview".to_string(),
            template_dirs: Vec::new(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup. Code that
/// reads settings through [`get_or_default`](LazySettings::get_or_default)
/// works without configuration and sees [`Settings::default`]; reading the
/// defaults does not prevent a later `configure`. Values already copied out
/// (view constructors copy their defaults) keep what they read.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the settings. Succeeds only once.
    pub fn configure(&self, settings: Settings) -> ShapeupResult<()> {
        self.inner.set(settings).map_err(|_| {
            ShapeupError::ConfigurationError("Settings have already been configured".to_string())
        })
    }

    /// Returns the configured settings, if any.
    pub fn get(&self) -> Option<&Settings> {
        self.inner.get()
    }

    /// Returns the configured settings, or the shared defaults until
    /// [`configure`](Self::configure) is called.
    pub fn get_or_default(&self) -> &Settings {
        static DEFAULTS: OnceLock<Settings> = OnceLock::new();
        self.inner
            .get()
            .unwrap_or_else(|| DEFAULTS.get_or_init(Settings::default))
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.page_kwarg, "page");
        assert_eq!(s.paginate_by, None);
        assert!(s.allow_empty);
        assert_eq!(s.lookup_field, "pk");
        assert_eq!(s.preview_field, "preview");
        assert!(s.template_dirs.is_empty());
    }

    #[test]
    fn test_lazy_settings_configure_and_get() {
        let lazy = LazySettings::new();
        assert!(!lazy.is_configured());
        assert!(lazy.get().is_none());

        let settings = Settings {
            page_kwarg: "p".to_string(),
            ..Settings::default()
        };
        lazy.configure(settings).unwrap();
        assert!(lazy.is_configured());
        assert_eq!(lazy.get_or_default().page_kwarg, "p");
    }

    #[test]
    fn test_lazy_settings_double_configure_fails() {
        let lazy = LazySettings::new();
        lazy.configure(Settings::default()).unwrap();
        let err = lazy.configure(Settings::default()).unwrap_err();
        assert!(err.to_string().contains("already been configured"));
    }

    #[test]
    fn test_reading_defaults_does_not_block_configure() {
        let lazy = LazySettings::new();
        assert_eq!(lazy.get_or_default().lookup_field, "pk");
        assert!(!lazy.is_configured());

        let settings = Settings {
            lookup_field: "slug".into(),
            ..Settings::default()
        };
        lazy.configure(settings).unwrap();
        assert_eq!(lazy.get_or_default().lookup_field, "slug");
    }
}

//! # shapeup-core
//!
//! Core types shared by every shapeup crate. This crate has no web-framework
//! dependencies and provides the error taxonomy, settings, and logging setup.
//!
//! ## Modules
//!
//! - [`error`] - The [`ShapeupError`] enum and result alias
//! - [`settings`] - View defaults and the global settings container
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - Utility types (`MultiValueDict`)

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{ShapeupError, ShapeupResult};
pub use settings::{Settings, SETTINGS};

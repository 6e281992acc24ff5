//! Template navigation endpoint.
//!
//! # Responsibility
//! - Turn a marker link into an editor URL for the template and line.
//! - Refuse identifiers and paths that leave the configured template roots.
//!
//! # Invariants
//! - Navigation failures are request-level; they never reach the overlay.

pub mod endpoint;
pub mod link_format;
pub mod locator;

pub use endpoint::{
    open_template, validate_file_path, validate_template_name, NavigationError, NavigationRequest,
    NavigationResult,
};
pub use link_format::FileLinkFormatter;
pub use locator::{FilesystemLocator, StaticLocator, TemplateLocator};

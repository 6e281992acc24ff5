//! Open-template endpoint contract.
//!
//! # Responsibility
//! - Validate a template identifier and line coming from a marker link.
//! - Resolve the template to a file inside the allowed roots and format the
//!   editor redirect target.
//!
//! # Invariants
//! - Identifier validation runs before any filesystem access.
//! - Every rejection maps to a 4xx status with a human-readable reason.

use crate::navigation::link_format::FileLinkFormatter;
use crate::navigation::locator::TemplateLocator;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type NavigationResult<T> = Result<T, NavigationError>;

/// Request-level failures of the open-template endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    EmptyTemplate,
    PathTraversal,
    AbsolutePath,
    InvalidLine(i64),
    /// The link does not address the open-template route.
    UnknownRoute(String),
    UnresolvedPath(PathBuf),
    OutsideRoots(PathBuf),
    TemplateNotFound(String),
}

impl NavigationError {
    /// HTTP status reported to the browser.
    pub fn status(&self) -> u16 {
        match self {
            Self::UnknownRoute(_) | Self::TemplateNotFound(_) => 404,
            _ => 400,
        }
    }
}

impl Display for NavigationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTemplate => write!(f, "Template name cannot be empty."),
            Self::PathTraversal => write!(f, "Invalid template name: path traversal detected."),
            Self::AbsolutePath => {
                write!(f, "Invalid template name: absolute paths are not allowed.")
            }
            Self::InvalidLine(line) => {
                write!(f, "Line number must be a positive integer, got {line}.")
            }
            Self::UnknownRoute(link) => write!(f, "No template route matches `{link}`."),
            Self::UnresolvedPath(path) => write!(
                f,
                "Template file path could not be resolved: {}.",
                path.display()
            ),
            Self::OutsideRoots(_) => {
                write!(f, "Template file is outside allowed template directories.")
            }
            Self::TemplateNotFound(template) => write!(f, "Template \"{template}\" not found."),
        }
    }
}

impl Error for NavigationError {}

/// Decoded open-template request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub template: String,
    /// Raw requested line; validated by `open_template`.
    pub line: i64,
}

impl NavigationRequest {
    pub fn new(template: impl Into<String>, line: i64) -> Self {
        Self {
            template: template.into(),
            line,
        }
    }

    /// Decodes `{route_prefix}{template}?line=N` (absolute URLs accepted).
    ///
    /// A missing `line` reads as 1; a non-numeric one reads as 0 and is
    /// rejected later.
    pub fn from_link(link: &str, route_prefix: &str) -> NavigationResult<Self> {
        let (path, query) = link.split_once('?').unwrap_or((link, ""));
        let encoded = path
            .find(route_prefix)
            .map(|at| &path[at + route_prefix.len()..])
            .ok_or_else(|| NavigationError::UnknownRoute(link.to_string()))?;
        let template = urlencoding::decode(&encoded.replace('+', " "))
            .map_err(|_| NavigationError::UnknownRoute(link.to_string()))?
            .into_owned();

        let line = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "line")
            .map(|(_, value)| value.parse().unwrap_or(0))
            .unwrap_or(1);

        Ok(Self { template, line })
    }
}

/// Rejects identifiers that could escape the template roots.
pub fn validate_template_name(template: &str) -> NavigationResult<()> {
    if template.trim().is_empty() {
        return Err(NavigationError::EmptyTemplate);
    }
    if template.contains("..") || template.contains('\0') {
        return Err(NavigationError::PathTraversal);
    }
    if template.starts_with('/') || is_windows_absolute(template) {
        return Err(NavigationError::AbsolutePath);
    }
    Ok(())
}

fn is_windows_absolute(template: &str) -> bool {
    let bytes = template.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\'
}

/// Checks that `file` resolves inside one of `roots`.
///
/// Containment is component-wise on canonical paths.
pub fn validate_file_path(file: &Path, roots: &[PathBuf]) -> NavigationResult<PathBuf> {
    let real_file = file
        .canonicalize()
        .map_err(|_| NavigationError::UnresolvedPath(file.to_path_buf()))?;
    let inside = roots
        .iter()
        .filter_map(|root| root.canonicalize().ok())
        .any(|root| real_file.starts_with(root));
    if !inside {
        return Err(NavigationError::OutsideRoots(real_file));
    }
    Ok(real_file)
}

/// Resolves `request` to the editor URL the endpoint redirects to.
pub fn open_template(
    request: &NavigationRequest,
    locator: &impl TemplateLocator,
    formatter: &FileLinkFormatter,
) -> NavigationResult<String> {
    validate_template_name(&request.template)?;
    let line = u32::try_from(request.line)
        .ok()
        .filter(|line| *line >= 1)
        .ok_or(NavigationError::InvalidLine(request.line))?;

    let file = locator
        .locate(&request.template)
        .ok_or_else(|| NavigationError::TemplateNotFound(request.template.clone()))?;
    let file = match locator.allowed_roots() {
        Some(roots) => validate_file_path(&file, &roots)?,
        None => file,
    };

    let url = formatter.format(&file.to_string_lossy(), line);
    log::info!(
        "event=open_template module=navigation status=ok template={} line={line}",
        request.template
    );
    Ok(url)
}

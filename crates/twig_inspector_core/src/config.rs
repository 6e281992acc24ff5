//! Inspector configuration model and loader.
//!
//! # Responsibility
//! - Define every tunable used by the overlay client and navigation endpoint.
//! - Load configuration from JSON with per-field defaults.
//!
//! # Invariants
//! - Defaults reproduce the stock toolbar integration (`sf-toolbar`, cookie
//!   `twig_inspector_is_active`, `/_template/` route prefix).
//! - A loaded config is only handed out after `validate()` passes.

use crate::navigation::FileLinkFormatter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default name of the cookie that switches marker rendering on.
pub const DEFAULT_COOKIE_NAME: &str = "twig_inspector_is_active";
/// Default id of the enable/disable checkbox in the toolbar panel.
pub const DEFAULT_STATUS_CHECKBOX_ID: &str = "_twig_inspector__status";
/// Default id of the clickable status icon in the toolbar.
pub const DEFAULT_STATUS_ICON_ID: &str = "_twig_inspector__icon";
/// Default class of the developer toolbar region.
pub const DEFAULT_TOOLBAR_CLASS: &str = "sf-toolbar";
/// Default route prefix of the open-template endpoint.
pub const DEFAULT_ROUTE_PREFIX: &str = "/_template/";
/// Default editor link pattern (`%f` file, `%l` line).
pub const DEFAULT_FILE_LINK_FORMAT: &str = "vscode://file/%f:%l";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration load and validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    EmptyField(&'static str),
    InvalidField { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::EmptyField(field) => write!(f, "config field `{field}` must not be empty"),
            Self::InvalidField { field, reason } => {
                write!(f, "config field `{field}` is invalid: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::EmptyField(_) | Self::InvalidField { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Root configuration for the inspector client and endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Cookie read by the renderer to decide whether markers are emitted.
    pub cookie_name: String,
    pub dom: DomSurfaceConfig,
    pub overlay: OverlayConfig,
    pub navigation: NavigationConfig,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            dom: DomSurfaceConfig::default(),
            overlay: OverlayConfig::default(),
            navigation: NavigationConfig::default(),
        }
    }
}

impl InspectorConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        log::debug!(
            "event=config_load module=config status=ok path={} roots={}",
            path.display(),
            config.navigation.template_roots.len()
        );
        Ok(config)
    }

    /// Validates declaration-level invariants.
    pub fn validate(&self) -> ConfigResult<()> {
        require_token(&self.cookie_name, "cookie_name")?;
        if self
            .cookie_name
            .chars()
            .any(|c| c == '=' || c == ';' || c == ',' || c.is_whitespace())
        {
            return Err(ConfigError::InvalidField {
                field: "cookie_name",
                reason: "must not contain `=`, `;`, `,` or whitespace".to_string(),
            });
        }
        require_token(&self.dom.status_checkbox_id, "dom.status_checkbox_id")?;
        require_token(&self.dom.status_icon_id, "dom.status_icon_id")?;
        require_token(&self.dom.toolbar_class, "dom.toolbar_class")?;

        let metrics = &self.overlay.text_metrics;
        if !(metrics.char_width > 0.0 && metrics.line_height > 0.0 && metrics.padding >= 0.0) {
            return Err(ConfigError::InvalidField {
                field: "overlay.text_metrics",
                reason: "char_width and line_height must be positive, padding non-negative"
                    .to_string(),
            });
        }

        let prefix = &self.navigation.route_prefix;
        if !prefix.starts_with('/') || !prefix.ends_with('/') {
            return Err(ConfigError::InvalidField {
                field: "navigation.route_prefix",
                reason: format!("must start and end with `/`, got `{prefix}`"),
            });
        }
        let formatter = FileLinkFormatter::new(&self.navigation.file_link_format);
        if !formatter.pattern().contains("%f") {
            return Err(ConfigError::InvalidField {
                field: "navigation.file_link_format",
                reason: "must contain the `%f` placeholder".to_string(),
            });
        }
        Ok(())
    }
}

fn require_token(value: &str, field: &'static str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyField(field));
    }
    Ok(())
}

/// Fixed DOM hooks the client looks up at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomSurfaceConfig {
    pub status_checkbox_id: String,
    pub status_icon_id: String,
    /// Class of the developer toolbar, excluded from hit-testing and attribution.
    pub toolbar_class: String,
}

impl Default for DomSurfaceConfig {
    fn default() -> Self {
        Self {
            status_checkbox_id: DEFAULT_STATUS_CHECKBOX_ID.to_string(),
            status_icon_id: DEFAULT_STATUS_ICON_ID.to_string(),
            toolbar_class: DEFAULT_TOOLBAR_CLASS.to_string(),
        }
    }
}

/// Overlay placement constants, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Room required under the element before the label flips above it.
    pub below_margin: f64,
    /// Gap between the element edge and the label.
    pub label_gap: f64,
    /// Offset of the disambiguation menu from the click point.
    pub menu_offset: f64,
    pub text_metrics: TextMetrics,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            below_margin: 50.0,
            label_gap: 2.0,
            menu_offset: 20.0,
            text_metrics: TextMetrics::default(),
        }
    }
}

/// Fixed-pitch estimate of label text extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 16.0,
            padding: 4.0,
        }
    }
}

impl TextMetrics {
    /// Returns `(width, height)` of a label holding `lines`.
    pub fn measure<S: AsRef<str>>(&self, lines: &[S]) -> (f64, f64) {
        let widest = lines
            .iter()
            .map(|line| line.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        let width = widest as f64 * self.char_width + 2.0 * self.padding;
        let height = lines.len() as f64 * self.line_height + 2.0 * self.padding;
        (width, height)
    }
}

/// Open-template endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Main template directories, searched in order.
    pub template_roots: Vec<PathBuf>,
    /// `@Namespace` roots, keyed without the leading `@`.
    pub namespaced_roots: BTreeMap<String, Vec<PathBuf>>,
    /// Editor URL pattern or preset name (`vscode`, `phpstorm`, ...).
    pub file_link_format: String,
    pub route_prefix: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            template_roots: Vec::new(),
            namespaced_roots: BTreeMap::new(),
            file_link_format: DEFAULT_FILE_LINK_FORMAT.to_string(),
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, InspectorConfig, TextMetrics, DEFAULT_COOKIE_NAME};

    #[test]
    fn empty_json_yields_defaults() {
        let config = InspectorConfig::from_json_str("{}").expect("empty object should parse");
        assert_eq!(config, InspectorConfig::default());
        assert_eq!(config.cookie_name, DEFAULT_COOKIE_NAME);
        assert_eq!(config.dom.toolbar_class, "sf-toolbar");
        assert_eq!(config.overlay.below_margin, 50.0);
    }

    #[test]
    fn partial_json_overrides_single_fields() {
        let config = InspectorConfig::from_json_str(
            r#"{"cookie_name":"inspect","navigation":{"template_roots":["/srv/templates"]}}"#,
        )
        .expect("partial config should parse");
        assert_eq!(config.cookie_name, "inspect");
        assert_eq!(config.navigation.route_prefix, "/_template/");
        assert_eq!(config.navigation.template_roots.len(), 1);
    }

    #[test]
    fn rejects_cookie_name_with_separator() {
        let err = InspectorConfig::from_json_str(r#"{"cookie_name":"a;b"}"#)
            .expect_err("separator must be rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "cookie_name",
                ..
            }
        ));
    }

    #[test]
    fn rejects_blank_toolbar_class() {
        let err = InspectorConfig::from_json_str(r#"{"dom":{"toolbar_class":"  "}}"#)
            .expect_err("blank class must be rejected");
        assert!(matches!(err, ConfigError::EmptyField("dom.toolbar_class")));
    }

    #[test]
    fn rejects_link_format_without_file_placeholder() {
        let err =
            InspectorConfig::from_json_str(r#"{"navigation":{"file_link_format":"editor://"}}"#)
                .expect_err("missing %f must be rejected");
        assert!(err.to_string().contains("%f"));

        let preset = InspectorConfig::from_json_str(
            r#"{"navigation":{"file_link_format":"phpstorm"}}"#,
        );
        assert!(preset.is_ok(), "editor presets expand before validation");
    }

    #[test]
    fn text_metrics_measure_widest_line() {
        let metrics = TextMetrics {
            char_width: 10.0,
            line_height: 20.0,
            padding: 1.0,
        };
        assert_eq!(metrics.measure(&["ab", "abcd"]), (42.0, 42.0));
        assert_eq!(metrics.measure::<&str>(&[]), (2.0, 2.0));
    }
}

//! Editor URL formatting.

/// Renders `file:line` pairs into editor-openable URLs.
///
/// Pattern placeholders: `%f` (absolute file path) and `%l` (line). Path
/// mappings may follow the last placeholder as `&from>to` pairs, rewriting a
/// container path prefix into a host path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLinkFormatter {
    pattern: String,
    mappings: Vec<(String, String)>,
}

impl FileLinkFormatter {
    /// Builds a formatter from a preset name or a raw pattern.
    pub fn new(format: &str) -> Self {
        let format = preset(format).unwrap_or(format);
        let placeholder_end = [format.rfind("%f"), format.rfind("%l")]
            .into_iter()
            .flatten()
            .max()
            .map(|at| at + 2)
            .unwrap_or(0);
        let split_at = format[placeholder_end..]
            .find('&')
            .map(|at| placeholder_end + at)
            .unwrap_or(format.len());

        let mappings = format[split_at..]
            .split('&')
            .filter_map(|pair| pair.split_once('>'))
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        Self {
            pattern: format[..split_at].to_string(),
            mappings,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self, file: &str, line: u32) -> String {
        let file = self
            .mappings
            .iter()
            .find_map(|(from, to)| file.strip_prefix(from.as_str()).map(|rest| format!("{to}{rest}")))
            .unwrap_or_else(|| file.to_string());
        self.pattern
            .replace("%f", &file)
            .replace("%l", &line.to_string())
    }
}

fn preset(name: &str) -> Option<&'static str> {
    Some(match name {
        "vscode" => "vscode://file/%f:%l",
        "phpstorm" => "phpstorm://open?file=%f&line=%l",
        "idea" => "idea://open?file=%f&line=%l",
        "sublime" => "subl://open?url=file://%f&line=%l",
        "atom" => "atom://core/open/file?filename=%f&line=%l",
        "file" => "file://%f#L%l",
        _ => return None,
    })
}

//! Activation cookie shared with the renderer.

/// Boolean cookie deciding whether pages render with markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieFlag {
    name: String,
}

impl CookieFlag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `document.cookie` assignment for the given state, scoped to `/`.
    pub fn assignment(&self, active: bool) -> String {
        format!("{}={active};path=/", self.name)
    }

    /// Reads the flag from a `Cookie` header or `document.cookie` string.
    ///
    /// Accepts `1`, `true`, `on` and `yes` (case-insensitive) as set; a
    /// missing cookie reads as unset.
    pub fn read(&self, header: &str) -> bool {
        header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .filter(|(key, _)| key.trim() == self.name)
            .next_back()
            .map(|(_, value)| parse_flag(value))
            .unwrap_or(false)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::CookieFlag;

    #[test]
    fn assignment_is_path_scoped() {
        let flag = CookieFlag::new("twig_inspector_is_active");
        assert_eq!(flag.assignment(true), "twig_inspector_is_active=true;path=/");
        assert_eq!(flag.assignment(false), "twig_inspector_is_active=false;path=/");
    }

    #[test]
    fn reads_flag_among_other_cookies() {
        let flag = CookieFlag::new("inspect");
        assert!(flag.read("session=abc; inspect=true; theme=dark"));
        assert!(flag.read("inspect=1"));
        assert!(flag.read("inspect=ON"));
        assert!(!flag.read("inspect=false"));
        assert!(!flag.read("other_inspect=true"));
        assert!(!flag.read(""));
    }

    #[test]
    fn last_occurrence_wins() {
        let flag = CookieFlag::new("inspect");
        assert!(!flag.read("inspect=true; inspect=false"));
    }
}

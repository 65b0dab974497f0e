//! App configuration types.

/// Per-app configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Display name used in logs and errors.
    pub name: &'static str,

    /// Attribute that identifies the focused element across renders. When the
    /// focused element lacks it, the first class token is used instead.
    pub identity_attribute: String,

    /// Re-focus the logical element (and restore its caret) after each render.
    pub restore_focus: bool,

    /// Location the navigator starts at.
    pub initial_location: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "App",
            identity_attribute: "data-id".to_string(),
            restore_focus: true,
            initial_location: "/".to_string(),
        }
    }
}

impl AppConfig {
    /// Create a new config with the given name.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Set the focus identity attribute.
    pub fn identity_attribute(mut self, name: impl Into<String>) -> Self {
        self.identity_attribute = name.into();
        self
    }

    /// Leave focus wherever reconciliation puts it.
    pub fn without_focus_restore(mut self) -> Self {
        self.restore_focus = false;
        self
    }

    pub fn initial_location(mut self, location: impl Into<String>) -> Self {
        self.initial_location = location.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = AppConfig::new("todos")
            .identity_attribute("data-key")
            .without_focus_restore()
            .initial_location("/active");
        assert_eq!(config.name, "todos");
        assert_eq!(config.identity_attribute, "data-key");
        assert!(!config.restore_focus);
        assert_eq!(config.initial_location, "/active");
        assert!(AppConfig::default().restore_focus);
    }
}

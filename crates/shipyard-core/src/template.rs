//! `{{name}}` placeholders in names and paths.
//!
//! Archive names, image names and artifact paths may reference project and
//! unit facts. Unknown placeholders are left as written so a later pass with
//! more facts can still expand them.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z][A-Za-z0-9_.]*)\s*\}\}").expect("placeholder pattern is valid")
});

/// Values available to placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: IndexMap<String, String>,
}

impl TemplateContext {
    /// Empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Add every entry of `other`, overriding shared keys.
    pub fn extend(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Expand placeholders in `template`.
    pub fn render(&self, template: &str) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| {
                self.get(&caps[1])
                    .map_or_else(|| caps[0].to_string(), str::to_string)
            })
            .into_owned()
    }
}

/// True when `template` still holds placeholders.
pub fn has_placeholders(template: &str) -> bool {
    PLACEHOLDER.is_match(template)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_placeholders() {
        let ctx = TemplateContext::new()
            .with("distributionName", "cli")
            .with("projectVersion", "1.2.3");
        assert_eq!(ctx.render("{{distributionName}}-{{ projectVersion }}"), "cli-1.2.3");
    }

    #[test]
    fn keeps_unknown_placeholders() {
        let ctx = TemplateContext::new().with("a", "1");
        assert_eq!(ctx.render("{{a}}/{{missing}}"), "1/{{missing}}");
        assert!(has_placeholders("{{missing}}"));
        assert!(!has_placeholders("plain"));
    }

    #[test]
    fn extend_overrides_shared_keys() {
        let mut base = TemplateContext::new().with("a", "1").with("b", "2");
        base.extend(&TemplateContext::new().with("b", "3"));
        assert_eq!(base.render("{{a}}{{b}}"), "13");
    }
}

//! Blank-string helpers.
//!
//! Configuration treats `None`, `""` and whitespace-only values alike: the
//! value is unset.

/// Blank-aware access to optional text.
pub trait Blank {
    /// True when unset or whitespace-only.
    fn is_blank(&self) -> bool;

    /// The value when it carries text.
    fn non_blank(&self) -> Option<&str>;
}

impl Blank for str {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }

    fn non_blank(&self) -> Option<&str> {
        (!self.is_blank()).then_some(self)
    }
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.as_str().is_blank()
    }

    fn non_blank(&self) -> Option<&str> {
        self.as_str().non_blank()
    }
}

impl Blank for Option<String> {
    fn is_blank(&self) -> bool {
        self.as_deref().is_none_or(str::is_blank)
    }

    fn non_blank(&self) -> Option<&str> {
        self.as_deref().and_then(str::non_blank)
    }
}

/// Set `slot` to `value` when it is blank.
pub fn default_to(slot: &mut Option<String>, value: impl Into<String>) {
    if slot.is_blank() {
        *slot = Some(value.into());
    }
}

/// Upper-case the first character.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// `my-app` / `my_app` to `MyApp`.
pub fn camel_case(value: &str) -> String {
    value
        .split(|c: char| c == '-' || c == '_' || c == '.' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

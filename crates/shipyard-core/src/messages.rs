//! Localized validation messages.
//!
//! Every error and warning recorded during validation is a [`Message`]: a
//! stable key, its named arguments, and the text rendered from the bundled
//! Fluent resources under `locales/`. Tests and tooling match on the key;
//! humans read the text.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use fluent_templates::fluent_bundle::FluentValue;
use fluent_templates::loader::LanguageIdentifier;
use fluent_templates::{Loader, static_loader};
use serde::Serialize;
use unic_langid::langid;

static_loader! {
    static BUNDLE = {
        locales: "./locales",
        fallback_language: "en-US",
        customise: |bundle| bundle.set_use_isolating(false),
    };
}

const FALLBACK_LANGUAGE: LanguageIdentifier = langid!("en-US");

/// A localizable diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    key: &'static str,
    args: Vec<(&'static str, String)>,
    text: String,
}

impl Message {
    /// Render `key` with `args` in the fallback locale.
    pub fn new(key: &'static str, args: Vec<(&'static str, String)>) -> Self {
        let text = render(&FALLBACK_LANGUAGE, key, &args);
        Self { key, args, text }
    }

    /// Stable message key, e.g. `validation_slack_token`.
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Named argument value.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Rendered text in the fallback locale.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Render again for `locale`, falling back to en-US for unknown locales
    /// or keys missing from the requested bundle.
    pub fn localized(&self, locale: &str) -> String {
        let language = LanguageIdentifier::from_str(locale).unwrap_or(FALLBACK_LANGUAGE);
        render(&language, self.key, &self.args)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn render(language: &LanguageIdentifier, key: &str, args: &[(&'static str, String)]) -> String {
    let fluent_args: HashMap<Cow<'static, str>, FluentValue<'static>> = args
        .iter()
        .map(|(name, value)| (Cow::Borrowed(*name), FluentValue::from(value.clone())))
        .collect();

    BUNDLE
        .try_lookup_with_args(language, key, &fluent_args)
        .unwrap_or_else(|| {
            tracing::trace!(key, "message missing from bundle");
            let rendered: Vec<String> = args.iter().map(|(k, v)| format!("{k}={v}")).collect();
            if rendered.is_empty() {
                key.to_string()
            } else {
                format!("{key} ({})", rendered.join(", "))
            }
        })
}

/// Build a [`Message`]: `msg!("validation_must_not_be_blank", field = "project.name")`.
#[macro_export]
macro_rules! msg {
    ($key:literal $(, $name:ident = $value:expr)* $(,)?) => {
        $crate::messages::Message::new(
            $key,
            vec![$((stringify!($name), ($value).to_string())),*],
        )
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn renders_from_bundle() {
        let message = msg!("validation_must_not_be_blank", field = "project.name");
        assert_eq!(message.key(), "validation_must_not_be_blank");
        assert_eq!(message.arg("field"), Some("project.name"));
        assert_eq!(message.text(), "project.name must not be blank");
    }

    #[test]
    fn unknown_key_falls_back_to_key_and_args() {
        let message = msg!("no_such_message", a = 1);
        assert_eq!(message.text(), "no_such_message (a=1)");
    }

    #[test]
    fn unknown_locale_uses_fallback_bundle() {
        let message = msg!("validation_must_not_be_blank", field = "x");
        assert_eq!(message.localized("zz-ZZ"), message.text());
    }
}

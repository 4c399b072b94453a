//! Accumulated validation outcome.
//!
//! Validation never stops at the first problem. Every stage appends to an
//! [`Errors`] collection: configuration errors fail the run, assembly errors
//! only fail steps that need assembled outputs, warnings are informational.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::messages::Message;

/// Errors and warnings collected while resolving a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Errors {
    configuration: Vec<Message>,
    assembly: Vec<Message>,
    warnings: Vec<Message>,
    nags: Vec<Message>,
}

impl Errors {
    /// Record a configuration error.
    pub fn configuration(&mut self, message: Message) {
        self.configuration.push(message);
    }

    /// Record an assembly error.
    pub fn assembly(&mut self, message: Message) {
        self.assembly.push(message);
    }

    /// Record a warning.
    pub fn warning(&mut self, message: Message) {
        self.warnings.push(message);
    }

    /// Record a deprecation notice. Nags are reported once, after warnings.
    pub fn nag(&mut self, message: Message) {
        if !self.nags.contains(&message) {
            self.nags.push(message);
        }
    }

    /// True when any configuration or assembly error was recorded.
    pub fn has_errors(&self) -> bool {
        self.has_configuration_errors() || self.has_assembly_errors()
    }

    /// True when any configuration error was recorded.
    pub fn has_configuration_errors(&self) -> bool {
        !self.configuration.is_empty()
    }

    /// True when any assembly error was recorded.
    pub fn has_assembly_errors(&self) -> bool {
        !self.assembly.is_empty()
    }

    /// True when any warning was recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Configuration errors in recording order.
    pub fn configuration_errors(&self) -> &[Message] {
        &self.configuration
    }

    /// Assembly errors in recording order.
    pub fn assembly_errors(&self) -> &[Message] {
        &self.assembly
    }

    /// Warnings in recording order.
    pub fn warnings(&self) -> &[Message] {
        &self.warnings
    }

    /// Deprecation notices.
    pub fn nags(&self) -> &[Message] {
        &self.nags
    }

    /// True when any error or warning carries `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.all().any(|m| m.key() == key)
    }

    /// Every recorded message, errors first.
    pub fn all(&self) -> impl Iterator<Item = &Message> {
        self.configuration
            .iter()
            .chain(&self.assembly)
            .chain(&self.warnings)
            .chain(&self.nags)
    }

    /// Append everything recorded in `other`.
    pub fn extend(&mut self, other: Self) {
        self.configuration.extend(other.configuration);
        self.assembly.extend(other.assembly);
        self.warnings.extend(other.warnings);
        for nag in other.nags {
            self.nag(nag);
        }
    }

    /// Append `other` with every error downgraded to a warning.
    pub fn extend_as_warnings(&mut self, other: Self) {
        self.warnings.extend(other.configuration);
        self.warnings.extend(other.assembly);
        self.warnings.extend(other.warnings);
        for nag in other.nags {
            self.nag(nag);
        }
    }

    /// Emit warnings and nags through tracing.
    pub fn log_warnings(&self) {
        for message in &self.warnings {
            warn!(key = message.key(), "{message}");
        }
        for message in &self.nags {
            info!(key = message.key(), "{message}");
        }
    }

    /// Emit errors through tracing.
    pub fn log_errors(&self) {
        for message in &self.configuration {
            error!(key = message.key(), kind = "configuration", "{message}");
        }
        for message in &self.assembly {
            error!(key = message.key(), kind = "assembly", "{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg;

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut errors = Errors::default();
        errors.warning(msg!("validation_must_not_be_blank", field = "x"));
        assert!(!errors.has_errors());
        assert!(errors.has_warnings());
    }

    #[test]
    fn assembly_errors_count_as_errors() {
        let mut errors = Errors::default();
        errors.assembly(msg!("assembly_output_missing", assembler = "cli", path = "a.zip"));
        assert!(errors.has_errors());
        assert!(!errors.has_configuration_errors());
    }

    #[test]
    fn downgrade_moves_errors_to_warnings() {
        let mut scoped = Errors::default();
        scoped.configuration(msg!("validation_must_not_be_blank", field = "a"));
        scoped.assembly(msg!("validation_must_not_be_blank", field = "b"));

        let mut main = Errors::default();
        main.extend_as_warnings(scoped);
        assert!(!main.has_errors());
        assert_eq!(main.warnings().len(), 2);
    }

    #[test]
    fn nags_are_deduplicated() {
        let mut errors = Errors::default();
        errors.nag(msg!("validation_deprecated", property = "a", replacement = "b"));
        errors.nag(msg!("validation_deprecated", property = "a", replacement = "b"));
        assert_eq!(errors.nags().len(), 1);
    }
}

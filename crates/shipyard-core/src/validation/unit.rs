//! The per-unit validation driver.
//!
//! Every integration unit goes through the same steps: resolve activation,
//! stop when disabled, stop when the mode does not validate this family,
//! honour `--include`/`--exclude` filters in standalone modes, then run the
//! type's required-field, default and shared checks in that order.

use tracing::debug;

use super::checks::Checks;
use crate::activation::{Activatable, Active};
use crate::context::{Mode, Scope};

/// Type-specific validation rules for one family of units.
pub trait Rules {
    /// Unit validated by these rules.
    type Unit: Activatable + ?Sized;

    /// Activation used when the unit does not set one.
    fn default_active(&self) -> Active {
        Active::Never
    }

    /// True when `mode` validates this family.
    fn applies(&self, mode: Mode) -> bool {
        mode.validate_config()
    }

    /// Filter scopes and the key each one matches against.
    fn filters<'n>(&self, _unit: &'n Self::Unit, _name: &'n str) -> Vec<(Scope, &'n str)> {
        Vec::new()
    }

    /// Required fields and secrets.
    fn require(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut Self::Unit);

    /// Fill defaults.
    fn defaults(&self, _checks: &mut Checks<'_>, _scope: &str, _unit: &mut Self::Unit) {}

    /// Checks every unit of the family shares, such as timeouts.
    fn shared(&self, _checks: &mut Checks<'_>, _scope: &str, _unit: &mut Self::Unit) {}
}

/// Validate one unit under `rules`. Returns the unit's enabled state.
pub fn validate_unit<R: Rules>(
    rules: &R,
    checks: &mut Checks<'_>,
    scope: &str,
    name: &str,
    unit: &mut R::Unit,
) -> bool {
    if !checks.resolve(unit, rules.default_active()) {
        debug!(scope, "unit is disabled");
        return false;
    }
    if !rules.applies(checks.mode) {
        return true;
    }
    if checks.mode.validate_standalone() {
        let filters = &checks.settings.filters;
        let rejected = rules
            .filters(unit, name)
            .into_iter()
            .find(|(filter, key)| !filters.accepts(*filter, key))
            .map(|(filter, _)| filter);
        if let Some(filter) = rejected {
            debug!(scope, filter = %filter, "unit excluded by filter");
            unit.set_enabled(false);
            return false;
        }
    }
    rules.require(checks, scope, unit);
    rules.defaults(checks, scope, unit);
    rules.shared(checks, scope, unit);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Filters;
    use crate::errors::Errors;
    use crate::msg;
    use crate::property::MapSource;
    use crate::validation::checks::Facts;
    use crate::validation::checks::tests::settings;
    use camino::Utf8PathBuf;

    #[derive(Default)]
    struct Unit {
        active: Option<Active>,
        enabled: bool,
        explicit_enabled: Option<bool>,
        value: Option<String>,
    }

    crate::activation::activatable!(Unit);

    struct UnitRules;

    impl Rules for UnitRules {
        type Unit = Unit;

        fn filters<'n>(&self, _unit: &'n Unit, name: &'n str) -> Vec<(Scope, &'n str)> {
            vec![(Scope::Announcers, name)]
        }

        fn require(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut Unit) {
            checks.not_blank(unit.value.as_deref(), &format!("{scope}.value"));
        }

        fn defaults(&self, checks: &mut Checks<'_>, _scope: &str, _unit: &mut Unit) {
            checks.warn(msg!("validation_must_not_be_blank", field = "defaults-ran"));
        }
    }

    fn basedir() -> Utf8PathBuf {
        Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    }

    #[test]
    fn disabled_units_record_nothing() {
        let settings = settings(&basedir(), MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);
        let mut unit = Unit::default();
        assert!(!validate_unit(&UnitRules, &mut checks, "unit", "unit", &mut unit));
        assert!(errors.all().next().is_none());
    }

    #[test]
    fn enabled_units_run_every_step() {
        let settings = settings(&basedir(), MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);
        let mut unit = Unit {
            active: Some(Active::Always),
            ..Unit::default()
        };
        assert!(validate_unit(&UnitRules, &mut checks, "unit", "unit", &mut unit));
        assert!(errors.has_configuration_errors());
        assert!(errors.has_warnings());
    }

    #[test]
    fn other_modes_skip_checks() {
        let settings = settings(&basedir(), MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Download);
        let mut unit = Unit {
            active: Some(Active::Always),
            ..Unit::default()
        };
        assert!(validate_unit(&UnitRules, &mut checks, "unit", "unit", &mut unit));
        assert!(errors.all().next().is_none());
    }

    #[test]
    fn standalone_filters_disable() {
        let mut settings = settings(&basedir(), MapSource::new());
        settings.filters = Filters::default().exclude(Scope::Announcers, ["unit"]);
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Announce);

        struct AnnounceRules;
        impl Rules for AnnounceRules {
            type Unit = Unit;
            fn applies(&self, mode: Mode) -> bool {
                mode.validate_announce()
            }
            fn filters<'n>(&self, _unit: &'n Unit, name: &'n str) -> Vec<(Scope, &'n str)> {
                vec![(Scope::Announcers, name)]
            }
            fn require(&self, _checks: &mut Checks<'_>, _scope: &str, _unit: &mut Unit) {}
        }

        let mut unit = Unit {
            active: Some(Active::Always),
            ..Unit::default()
        };
        assert!(!validate_unit(&AnnounceRules, &mut checks, "unit", "unit", &mut unit));
        assert!(!unit.enabled);
    }
}

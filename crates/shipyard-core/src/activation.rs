//! Activation: when is a unit enabled?
//!
//! Every announcer, assembler, packager and friends carries an optional
//! [`Active`] policy. Validation fills in the unit's default policy and
//! evaluates it against the project's release lifecycle, storing the
//! outcome as the unit's `enabled` flag.

use crate::keyword::keyword_enum;

keyword_enum! {
    /// Activation policy.
    pub enum Active {
        /// Always enabled.
        Always => "ALWAYS",
        /// Never enabled.
        Never => "NEVER",
        /// Enabled for final releases only.
        Release => "RELEASE",
        /// Enabled for prereleases only.
        Prerelease => "PRERELEASE",
        /// Enabled for final releases and prereleases, not snapshots.
        ReleasePrerelease => "RELEASE_PRERELEASE",
        /// Enabled for snapshots only.
        Snapshot => "SNAPSHOT",
    }
}

/// Release status of the project being resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lifecycle {
    /// Version matches the snapshot pattern.
    pub snapshot: bool,
    /// Version is a prerelease.
    pub prerelease: bool,
}

impl Lifecycle {
    /// A final release.
    pub const RELEASE: Self = Self {
        snapshot: false,
        prerelease: false,
    };
}

impl Active {
    /// Evaluate the policy for `lifecycle`.
    pub const fn check(self, lifecycle: Lifecycle) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Release => !lifecycle.snapshot && !lifecycle.prerelease,
            Self::Prerelease => !lifecycle.snapshot && lifecycle.prerelease,
            Self::ReleasePrerelease => !lifecycle.snapshot,
            Self::Snapshot => lifecycle.snapshot,
        }
    }
}

/// A unit with an activation policy.
pub trait Activatable {
    /// Configured policy, if any.
    fn active(&self) -> Option<Active>;

    /// Replace the policy.
    fn set_active(&mut self, active: Active);

    /// Resolved enabled state.
    fn is_enabled(&self) -> bool;

    /// Store the resolved enabled state.
    fn set_enabled(&mut self, enabled: bool);

    /// Explicit `enabled = true|false` from configuration, for units that
    /// accept one.
    fn enabled_override(&self) -> Option<bool> {
        None
    }
}

/// Fill in `default` when unset, evaluate, and store the outcome.
///
/// An explicit `enabled = false` override always disables.
pub fn resolve<U: Activatable + ?Sized>(unit: &mut U, default: Active, lifecycle: Lifecycle) -> bool {
    let active = unit.active().unwrap_or(default);
    unit.set_active(active);
    let enabled = match unit.enabled_override() {
        Some(false) => false,
        _ => active.check(lifecycle),
    };
    unit.set_enabled(enabled);
    enabled
}

/// Settle a container after its children were resolved.
///
/// A container whose policy was not written explicitly, and which was not
/// explicitly enabled, follows its children: enabled when any child is,
/// otherwise forced to [`Active::Never`].
pub fn settle_container<C: Activatable + ?Sized>(
    container: &mut C,
    explicit: bool,
    any_child_enabled: bool,
    lifecycle: Lifecycle,
) {
    if explicit || container.enabled_override() == Some(true) {
        return;
    }
    let active = if any_child_enabled {
        Active::Always
    } else {
        Active::Never
    };
    container.set_active(active);
    container.set_enabled(active.check(lifecycle));
}

/// Implement [`Activatable`] for structs with `active`, `enabled` and
/// `explicit_enabled` fields, directly or through a flattened `base`.
macro_rules! activatable {
    (base: $($ty:ty),+ $(,)?) => {
        $(impl $crate::activation::Activatable for $ty {
            fn active(&self) -> Option<$crate::activation::Active> {
                self.base.active
            }
            fn set_active(&mut self, active: $crate::activation::Active) {
                self.base.active = Some(active);
            }
            fn is_enabled(&self) -> bool {
                self.base.enabled
            }
            fn set_enabled(&mut self, enabled: bool) {
                self.base.enabled = enabled;
            }
            fn enabled_override(&self) -> Option<bool> {
                self.base.explicit_enabled
            }
        })+
    };
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::activation::Activatable for $ty {
            fn active(&self) -> Option<$crate::activation::Active> {
                self.active
            }
            fn set_active(&mut self, active: $crate::activation::Active) {
                self.active = Some(active);
            }
            fn is_enabled(&self) -> bool {
                self.enabled
            }
            fn set_enabled(&mut self, enabled: bool) {
                self.enabled = enabled;
            }
            fn enabled_override(&self) -> Option<bool> {
                self.explicit_enabled
            }
        })+
    };
}

pub(crate) use activatable;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SNAPSHOT: Lifecycle = Lifecycle {
        snapshot: true,
        prerelease: false,
    };
    const PRERELEASE: Lifecycle = Lifecycle {
        snapshot: false,
        prerelease: true,
    };

    #[rstest]
    #[case(Active::Always, Lifecycle::RELEASE, true)]
    #[case(Active::Never, Lifecycle::RELEASE, false)]
    #[case(Active::Release, Lifecycle::RELEASE, true)]
    #[case(Active::Release, PRERELEASE, false)]
    #[case(Active::Prerelease, PRERELEASE, true)]
    #[case(Active::Prerelease, SNAPSHOT, false)]
    #[case(Active::ReleasePrerelease, PRERELEASE, true)]
    #[case(Active::ReleasePrerelease, SNAPSHOT, false)]
    #[case(Active::Snapshot, SNAPSHOT, true)]
    #[case(Active::Snapshot, Lifecycle::RELEASE, false)]
    fn policy_table(#[case] active: Active, #[case] lifecycle: Lifecycle, #[case] expected: bool) {
        assert_eq!(active.check(lifecycle), expected);
    }

    #[derive(Default)]
    struct Unit {
        active: Option<Active>,
        enabled: bool,
        explicit_enabled: Option<bool>,
    }

    activatable!(Unit);

    #[test]
    fn resolve_fills_default() {
        let mut unit = Unit::default();
        assert!(resolve(&mut unit, Active::Always, Lifecycle::RELEASE));
        assert_eq!(unit.active, Some(Active::Always));
        assert!(unit.enabled);
    }

    #[test]
    fn resolve_keeps_explicit_policy() {
        let mut unit = Unit {
            active: Some(Active::Snapshot),
            enabled: true,
            ..Unit::default()
        };
        assert!(!resolve(&mut unit, Active::Always, Lifecycle::RELEASE));
        assert!(!unit.enabled);
    }

    #[test]
    fn container_without_enabled_children_is_disabled() {
        let mut unit = Unit::default();
        resolve(&mut unit, Active::Always, Lifecycle::RELEASE);
        settle_container(&mut unit, false, false, Lifecycle::RELEASE);
        assert_eq!(unit.active, Some(Active::Never));
        assert!(!unit.enabled);
    }

    #[test]
    fn explicit_container_is_left_alone() {
        let mut unit = Unit {
            active: Some(Active::Always),
            ..Unit::default()
        };
        resolve(&mut unit, Active::Always, Lifecycle::RELEASE);
        settle_container(&mut unit, true, false, Lifecycle::RELEASE);
        assert!(unit.enabled);
    }

    #[test]
    fn enabled_container_survives_settling() {
        let mut unit = Unit {
            explicit_enabled: Some(true),
            ..Unit::default()
        };
        resolve(&mut unit, Active::Always, Lifecycle::RELEASE);
        settle_container(&mut unit, false, false, Lifecycle::RELEASE);
        assert_eq!(unit.active, Some(Active::Always));
        assert!(unit.enabled);
    }

    #[test]
    fn disabled_override_beats_policy() {
        let mut unit = Unit {
            active: Some(Active::Always),
            explicit_enabled: Some(false),
            ..Unit::default()
        };
        assert!(!resolve(&mut unit, Active::Always, Lifecycle::RELEASE));
        assert!(!unit.enabled);
    }
}

//! Workflow hooks: commands and scripts run around each step.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::activation::{Active, activatable};
use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;

keyword_enum! {
    /// Shell used by script hooks.
    pub enum Shell {
        /// bash.
        Bash => "BASH",
        /// sh.
        Sh => "SH",
        /// cmd.exe.
        Cmd => "CMD",
        /// PowerShell.
        Powershell => "POWERSHELL",
        /// pwsh.
        Pwsh => "PWSH",
    }
}

/// Steps a hook runs for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    /// Steps to include; all when empty.
    pub includes: Vec<String>,
    /// Steps to exclude.
    pub excludes: Vec<String>,
}

impl Merge for Filter {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [includes, excludes]);
    }
}

impl Filter {
    /// True when `step` passes the filter.
    pub fn accepts(&self, step: &str) -> bool {
        let included = self.includes.is_empty() || self.includes.iter().any(|s| s == step);
        included && !self.excludes.iter().any(|s| s == step)
    }
}

/// A single hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hook {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Command line, for command hooks.
    pub cmd: Option<String>,
    /// Script body, for script hooks.
    pub run: Option<String>,
    /// Shell for scripts.
    pub shell: Option<Shell>,
    /// Failures do not fail the step.
    pub continue_on_error: Option<bool>,
    /// Log the hook's output.
    pub verbose: Option<bool>,
    /// Platforms the hook runs on; all when empty.
    pub platforms: Vec<String>,
    /// Steps the hook runs for.
    pub filter: Filter,
    /// Extra environment.
    pub environment: IndexMap<String, String>,
}

impl Merge for Hook {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                active,
                explicit_enabled,
                cmd,
                run,
                shell,
                continue_on_error,
                verbose,
                platforms,
                filter,
                environment,
            ]
        );
    }
}

/// Hooks for one kind, by phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookSet {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Before the step.
    pub before: Vec<Hook>,
    /// After the step succeeds.
    pub success: Vec<Hook>,
    /// After the step fails.
    pub failure: Vec<Hook>,
    /// Extra environment for every hook in the set.
    pub environment: IndexMap<String, String>,
}

impl Merge for HookSet {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [active, explicit_enabled, before, success, failure, environment]
        );
    }
}

impl HookSet {
    /// Every hook with its phase name.
    pub fn phases_mut(&mut self) -> [(&'static str, &mut Vec<Hook>); 3] {
        [
            ("before", &mut self.before),
            ("success", &mut self.success),
            ("failure", &mut self.failure),
        ]
    }
}

activatable!(Hook, HookSet, Hooks);

/// Workflow hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hooks {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Command hooks.
    pub command: HookSet,
    /// Script hooks.
    pub script: HookSet,
    /// Extra environment for every hook.
    pub environment: IndexMap<String, String>,
}

impl Merge for Hooks {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [active, explicit_enabled, command, script, environment]);
    }
}

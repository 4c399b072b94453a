//! Workflow hooks.

use super::checks::Checks;
use crate::activation::{Active, settle_container};
use crate::error::ValidationResult;
use crate::model::Model;
use crate::model::hooks::{HookSet, Shell};
use crate::msg;
use crate::platform;

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let hooks = &mut model.hooks;
    let explicit = hooks.active.is_some();
    if !checks.resolve(hooks, Active::Always) {
        return Ok(());
    }
    let command = hook_set(checks, "hooks.command", &mut hooks.command, true);
    let script = hook_set(checks, "hooks.script", &mut hooks.script, false);
    let lifecycle = checks.facts.lifecycle;
    settle_container(hooks, explicit, command || script, lifecycle);
    Ok(())
}

fn hook_set(checks: &mut Checks<'_>, scope: &str, set: &mut HookSet, commands: bool) -> bool {
    let explicit = set.active.is_some();
    if !checks.resolve(set, Active::Always) {
        return false;
    }
    let mut any = false;
    for (phase, hooks) in set.phases_mut() {
        for (index, hook) in hooks.iter_mut().enumerate() {
            if !checks.resolve(hook, Active::Always) {
                continue;
            }
            any = true;
            let field = format!("{scope}.{phase}[{index}]");
            if commands {
                checks.not_blank(hook.cmd.as_deref(), &format!("{field}.cmd"));
            } else {
                checks.not_blank(hook.run.as_deref(), &format!("{field}.run"));
                hook.shell.get_or_insert(Shell::Bash);
            }
            hook.continue_on_error.get_or_insert(false);
            hook.verbose.get_or_insert(false);
            for token in &hook.platforms {
                let bare = token.strip_prefix('!').unwrap_or(token);
                if !platform::is_supported(bare) {
                    checks.error(msg!("validation_unsupported_platform", field = field, platform = token));
                }
            }
        }
    }
    let lifecycle = checks.facts.lifecycle;
    settle_container(set, explicit, any, lifecycle);
    any
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Mode;
    use crate::errors::Errors;
    use crate::model::hooks::Hook;
    use crate::property::MapSource;
    use crate::validation::checks::Facts;
    use crate::validation::checks::tests::settings;
    use camino::Utf8Path;

    #[test]
    fn script_hooks_default_to_bash() {
        let settings = settings(Utf8Path::new(env!("CARGO_MANIFEST_DIR")), MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);

        let mut model = Model::default();
        model.hooks.script.before.push(Hook {
            run: Some("echo hi".into()),
            ..Hook::default()
        });
        model.hooks.command.success.push(Hook::default());
        validate(&mut checks, &mut model).unwrap();

        assert_eq!(model.hooks.script.before[0].shell, Some(Shell::Bash));
        assert!(model.hooks.enabled);
        assert!(errors.contains_key("validation_must_not_be_blank"));
    }

    #[test]
    fn empty_hooks_settle_to_disabled() {
        let settings = settings(Utf8Path::new(env!("CARGO_MANIFEST_DIR")), MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);
        let mut model = Model::default();
        validate(&mut checks, &mut model).unwrap();
        assert!(!model.hooks.enabled);
        assert_eq!(model.hooks.active, Some(Active::Never));
    }
}

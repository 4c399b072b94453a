//! Announcers.

use super::checks::{Checks, keys};
use super::unit::{Rules, validate_unit};
use crate::activation::{Active, settle_container};
use crate::context::{Mode, Scope};
use crate::error::ValidationResult;
use crate::model::announce::{
    Announcer, Bluesky, Discord, Discussions, Gitter, GoogleChat, HttpAnnouncer, Linkedin, Mastodon, Mattermost,
    MimeType, Slack, Smtp, Teams, Telegram, Twitter, WebhookAnnouncer, Zulip,
};
use crate::model::{Authorization, HttpMethod, Model};
use crate::msg;
use crate::text::{Blank, default_to};

/// Message used when neither a message nor a template is configured.
pub const DEFAULT_MESSAGE: &str = "{{projectName}} {{projectVersion}} has been released! {{releaseNotesUrl}}";
/// Subject of e-mail and forum announcements.
pub const DEFAULT_SUBJECT: &str = "{{projectName}} {{projectVersion}} released!";
/// Bluesky server used when none is configured.
pub const DEFAULT_BLUESKY_HOST: &str = "https://bsky.social";

type Check<U> = fn(&mut Checks<'_>, &str, &mut U);

/// Rules for one announcer type: the shared lifecycle plus a type check.
struct AnnouncerRules<U> {
    filter: Scope,
    check: Check<U>,
}

impl<U: Announcer> Rules for AnnouncerRules<U> {
    type Unit = U;

    fn applies(&self, mode: Mode) -> bool {
        mode.validate_config() || mode.validate_announce()
    }

    fn filters<'n>(&self, unit: &'n U, name: &'n str) -> Vec<(Scope, &'n str)> {
        match self.filter {
            Scope::Announcers => vec![(Scope::Announcers, unit.kind())],
            filter => vec![(Scope::Announcers, unit.kind()), (filter, name)],
        }
    }

    fn require(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut U) {
        (self.check)(checks, scope, unit);
    }

    fn shared(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut U) {
        checks.timeouts(scope, unit.base_mut());
    }
}

fn single<U: Announcer>(checks: &mut Checks<'_>, unit: &mut U, check: Check<U>) -> bool {
    let kind = unit.kind();
    unit.base_mut().name = kind.to_string();
    let rules = AnnouncerRules {
        filter: Scope::Announcers,
        check,
    };
    validate_unit(&rules, checks, &format!("announce.{kind}"), kind, unit)
}

fn required(checks: &mut Checks<'_>, scope: &str, kind: &str, field: &str, slot: &mut Option<String>) {
    let property = field.replace('_', ".");
    checks.require_property(&keys(scope, kind, &property), slot, &format!("{scope}.{field}"));
}

// ──────────────────────────────────────────────
// Per-type checks
// ──────────────────────────────────────────────

fn slack(checks: &mut Checks<'_>, scope: &str, unit: &mut Slack) {
    checks.optional_property(&keys(scope, "slack", "token"), &mut unit.token);
    checks.optional_property(&keys(scope, "slack", "webhook"), &mut unit.webhook);
    if unit.token.is_blank() && unit.webhook.is_blank() && !checks.dry_run() {
        checks.error(msg!("validation_slack_token"));
    }
    checks.http_url(&format!("{scope}.webhook"), unit.webhook.as_deref());
    checks.message_template(scope, "slack", &mut unit.message_template, &mut unit.message, DEFAULT_MESSAGE);
}

fn webhook(checks: &mut Checks<'_>, scope: &str, kind: &str, unit: &mut WebhookAnnouncer) {
    required(checks, scope, kind, "webhook", &mut unit.webhook);
    checks.http_url(&format!("{scope}.webhook"), unit.webhook.as_deref());
    checks.message_template(scope, kind, &mut unit.message_template, &mut unit.message, DEFAULT_MESSAGE);
    unit.structured_message.get_or_insert(false);
}

fn telegram(checks: &mut Checks<'_>, scope: &str, unit: &mut Telegram) {
    required(checks, scope, "telegram", "token", &mut unit.token);
    required(checks, scope, "telegram", "chat_id", &mut unit.chat_id);
    checks.message_template(scope, "telegram", &mut unit.message_template, &mut unit.message, DEFAULT_MESSAGE);
}

fn discussions(checks: &mut Checks<'_>, scope: &str, unit: &mut Discussions) {
    checks.not_blank(unit.organization.as_deref(), &format!("{scope}.organization"));
    checks.not_blank(unit.team.as_deref(), &format!("{scope}.team"));
    default_to(&mut unit.title, DEFAULT_SUBJECT);
    checks.message_template(scope, "discussions", &mut unit.message_template, &mut unit.message, DEFAULT_MESSAGE);
}

fn zulip(checks: &mut Checks<'_>, scope: &str, unit: &mut Zulip) {
    required(checks, scope, "zulip", "account", &mut unit.account);
    required(checks, scope, "zulip", "api_key", &mut unit.api_key);
    required(checks, scope, "zulip", "api_host", &mut unit.api_host);
    checks.http_url(&format!("{scope}.api_host"), unit.api_host.as_deref());
    default_to(&mut unit.channel, "announce");
    default_to(&mut unit.subject, DEFAULT_SUBJECT);
    checks.message_template(scope, "zulip", &mut unit.message_template, &mut unit.message, DEFAULT_MESSAGE);
}

/// Fold the deprecated single `status` into `statuses`.
fn statuses(
    checks: &mut Checks<'_>,
    scope: &str,
    status: &mut Option<String>,
    statuses: &mut Vec<String>,
    template: Option<&str>,
) {
    if let Some(single) = status.take().filter(|s| !s.is_blank()) {
        checks.deprecated(&format!("{scope}.status"), &format!("{scope}.statuses"));
        if statuses.is_empty() {
            statuses.push(single);
        }
    }
    match template.and_then(|t| t.non_blank()) {
        Some(path) if !checks.is_file(path) => {
            checks.error(msg!(
                "validation_template_missing",
                field = format!("{scope}.status_template"),
                path = path
            ));
        }
        Some(_) => {}
        None if statuses.is_empty() => statuses.push(DEFAULT_MESSAGE.into()),
        None => {}
    }
}

fn twitter(checks: &mut Checks<'_>, scope: &str, unit: &mut Twitter) {
    for (field, slot) in [
        ("consumer_key", &mut unit.consumer_key),
        ("consumer_secret", &mut unit.consumer_secret),
        ("access_token", &mut unit.access_token),
        ("access_token_secret", &mut unit.access_token_secret),
    ] {
        required(checks, scope, "twitter", field, slot);
    }
    statuses(checks, scope, &mut unit.status, &mut unit.statuses, unit.status_template.as_deref());
}

fn mastodon(checks: &mut Checks<'_>, scope: &str, unit: &mut Mastodon) {
    checks.not_blank(unit.host.as_deref(), &format!("{scope}.host"));
    checks.http_url(&format!("{scope}.host"), unit.host.as_deref());
    required(checks, scope, "mastodon", "access_token", &mut unit.access_token);
    statuses(checks, scope, &mut unit.status, &mut unit.statuses, unit.status_template.as_deref());
}

fn bluesky(checks: &mut Checks<'_>, scope: &str, unit: &mut Bluesky) {
    default_to(&mut unit.host, DEFAULT_BLUESKY_HOST);
    checks.http_url(&format!("{scope}.host"), unit.host.as_deref());
    required(checks, scope, "bluesky", "handle", &mut unit.handle);
    required(checks, scope, "bluesky", "password", &mut unit.password);
    statuses(checks, scope, &mut unit.status, &mut unit.statuses, unit.status_template.as_deref());
}

fn linkedin(checks: &mut Checks<'_>, scope: &str, unit: &mut Linkedin) {
    checks.optional_property(&keys(scope, "linkedin", "owner"), &mut unit.owner);
    required(checks, scope, "linkedin", "access_token", &mut unit.access_token);
    default_to(&mut unit.subject, DEFAULT_SUBJECT);
    checks.message_template(scope, "linkedin", &mut unit.message_template, &mut unit.message, DEFAULT_MESSAGE);
}

fn smtp(checks: &mut Checks<'_>, scope: &str, unit: &mut Smtp) {
    required(checks, scope, "smtp", "host", &mut unit.host);
    unit.port.get_or_insert(587);
    checks.optional_property(&keys(scope, "smtp", "username"), &mut unit.username);
    let auth = *unit.auth.get_or_insert(!unit.username.is_blank());
    if auth {
        required(checks, scope, "smtp", "password", &mut unit.password);
    }
    checks.not_blank(unit.from.as_deref(), &format!("{scope}.from"));
    if unit.to.is_blank() && unit.cc.is_blank() && unit.bcc.is_blank() {
        checks.error(msg!("validation_must_not_be_blank", field = format!("{scope}.to")));
    }
    unit.mime_type.get_or_insert(MimeType::Text);
    default_to(&mut unit.subject, DEFAULT_SUBJECT);
    checks.message_template(scope, "smtp", &mut unit.message_template, &mut unit.message, DEFAULT_MESSAGE);
}

fn http(checks: &mut Checks<'_>, scope: &str, unit: &mut HttpAnnouncer) {
    if checks.not_blank(unit.url.as_deref(), &format!("{scope}.url")) {
        checks.http_url(&format!("{scope}.url"), unit.url.as_deref());
    }
    Checks::method(&mut unit.method, HttpMethod::Put);
    match *unit.authorization.get_or_insert(Authorization::None) {
        Authorization::None => {}
        Authorization::Basic => {
            required(checks, scope, "http", "username", &mut unit.username);
            required(checks, scope, "http", "password", &mut unit.password);
        }
        Authorization::Bearer => {
            required(checks, scope, "http", "password", &mut unit.password);
            default_to(&mut unit.bearer_keyword, "Bearer");
        }
    }
    match unit.payload_template.non_blank() {
        Some(path) if !checks.is_file(path) => {
            checks.error(msg!(
                "validation_template_missing",
                field = format!("{scope}.payload_template"),
                path = path
            ));
        }
        Some(_) => {}
        None => {
            checks.not_blank(unit.payload.as_deref(), &format!("{scope}.payload"));
        }
    }
}

fn named_webhook(checks: &mut Checks<'_>, scope: &str, unit: &mut WebhookAnnouncer) {
    default_to(&mut unit.message_property, "text");
    webhook(checks, scope, "webhook", unit);
}

// ──────────────────────────────────────────────
// Stage
// ──────────────────────────────────────────────

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let announce = &mut model.announce;
    let explicit = announce.active.is_some();
    if !checks.resolve(announce, Active::Always) {
        return Ok(());
    }

    let mut any = false;
    any |= single(checks, &mut announce.bluesky, bluesky);
    any |= single::<Discord>(checks, &mut announce.discord, |c, s, u| webhook(c, s, "discord", u));
    any |= single(checks, &mut announce.discussions, discussions);
    any |= single::<Gitter>(checks, &mut announce.gitter, |c, s, u| webhook(c, s, "gitter", u));
    any |= single::<GoogleChat>(checks, &mut announce.google_chat, |c, s, u| webhook(c, s, "google_chat", u));
    any |= single(checks, &mut announce.linkedin, linkedin);
    any |= single(checks, &mut announce.mastodon, mastodon);
    any |= single::<Mattermost>(checks, &mut announce.mattermost, |c, s, u| webhook(c, s, "mattermost", u));
    any |= single(checks, &mut announce.slack, slack);
    any |= single(checks, &mut announce.smtp, smtp);
    any |= single::<Teams>(checks, &mut announce.teams, |c, s, u| webhook(c, s, "teams", u));
    any |= single(checks, &mut announce.telegram, telegram);
    any |= single(checks, &mut announce.twitter, twitter);
    any |= single(checks, &mut announce.zulip, zulip);

    let lifecycle = checks.facts.lifecycle;

    let endpoints = &mut announce.http;
    let http_explicit = endpoints.active.is_some();
    if checks.resolve(endpoints, Active::Always) {
        let rules = AnnouncerRules {
            filter: Scope::HttpAnnouncers,
            check: http as Check<HttpAnnouncer>,
        };
        let mut any_http = false;
        for (name, endpoint) in &mut endpoints.endpoints {
            endpoint.base.name.clone_from(name);
            let scope = format!("announce.http.{name}");
            any_http |= validate_unit(&rules, checks, &scope, name, endpoint);
        }
        settle_container(endpoints, http_explicit, any_http, lifecycle);
        any |= endpoints.enabled;
    }

    let webhooks = &mut announce.webhooks;
    let webhooks_explicit = webhooks.active.is_some();
    if checks.resolve(webhooks, Active::Always) {
        let rules = AnnouncerRules {
            filter: Scope::Webhooks,
            check: named_webhook as Check<WebhookAnnouncer>,
        };
        let mut any_webhook = false;
        for (name, hook) in &mut webhooks.webhooks {
            hook.base.name.clone_from(name);
            let scope = format!("announce.webhooks.{name}");
            any_webhook |= validate_unit(&rules, checks, &scope, name, hook);
        }
        settle_container(webhooks, webhooks_explicit, any_webhook, lifecycle);
        any |= webhooks.enabled;
    }

    settle_container(announce, explicit, any, lifecycle);
    Ok(())
}

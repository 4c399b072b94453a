//! Announcers: chat, social and webhook notifications sent after a release.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Authorization, HttpMethod, UnitBase};
use crate::activation::{Activatable, Active, activatable};
use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;

keyword_enum! {
    /// Email body type.
    pub enum MimeType {
        /// Plain text.
        Text => "TEXT",
        /// HTML.
        Html => "HTML",
    }
}

/// Behavior common to every announcer.
pub trait Announcer: Activatable {
    /// Configuration key, e.g. `slack`.
    fn kind(&self) -> &'static str;
    /// Shared settings.
    fn base(&self) -> &UnitBase;
    /// Shared settings, mutably.
    fn base_mut(&mut self) -> &mut UnitBase;
}

macro_rules! announcer {
    ($($ty:ty => $kind:literal),+ $(,)?) => {
        $(impl Announcer for $ty {
            fn kind(&self) -> &'static str {
                $kind
            }
            fn base(&self) -> &UnitBase {
                &self.base
            }
            fn base_mut(&mut self) -> &mut UnitBase {
                &mut self.base
            }
        })+
        activatable!(base: $($ty),+);
    };
}

/// Slack, through a bot token or an incoming webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slack {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Bot token.
    pub token: Option<String>,
    /// Incoming webhook URL.
    pub webhook: Option<String>,
    /// Channel, for token-based posting.
    pub channel: Option<String>,
    /// Inline message.
    pub message: Option<String>,
    /// Message template file.
    pub message_template: Option<String>,
}

impl Merge for Slack {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [base, token, webhook, channel, message, message_template]);
    }
}

/// An announcer that posts a message to a single webhook URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookAnnouncer {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Webhook URL.
    pub webhook: Option<String>,
    /// Inline message.
    pub message: Option<String>,
    /// Message template file.
    pub message_template: Option<String>,
    /// JSON property carrying the message, for generic webhooks.
    pub message_property: Option<String>,
    /// Send the template as the whole JSON payload.
    pub structured_message: Option<bool>,
}

impl Merge for WebhookAnnouncer {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [base, webhook, message, message_template, message_property, structured_message]
        );
    }
}

/// Discord.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Discord(pub WebhookAnnouncer);

/// Gitter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gitter(pub WebhookAnnouncer);

/// Google Chat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoogleChat(pub WebhookAnnouncer);

/// Mattermost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mattermost(pub WebhookAnnouncer);

/// Microsoft Teams.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Teams(pub WebhookAnnouncer);

macro_rules! webhook_announcer {
    ($($ty:ident => $kind:literal),+ $(,)?) => {
        $(
            impl Merge for $ty {
                fn merge(&mut self, other: Self) {
                    self.0.merge(other.0);
                }
            }

            impl std::ops::Deref for $ty {
                type Target = WebhookAnnouncer;
                fn deref(&self) -> &WebhookAnnouncer {
                    &self.0
                }
            }

            impl std::ops::DerefMut for $ty {
                fn deref_mut(&mut self) -> &mut WebhookAnnouncer {
                    &mut self.0
                }
            }
        )+
        announcer!($($ty => $kind),+);
    };
}

/// Telegram bot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Telegram {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Bot token.
    pub token: Option<String>,
    /// Chat id.
    pub chat_id: Option<String>,
    /// Inline message.
    pub message: Option<String>,
    /// Message template file.
    pub message_template: Option<String>,
}

impl Merge for Telegram {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [base, token, chat_id, message, message_template]);
    }
}

/// GitHub discussions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Discussions {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Organization.
    pub organization: Option<String>,
    /// Team.
    pub team: Option<String>,
    /// Discussion title template.
    pub title: Option<String>,
    /// Inline message.
    pub message: Option<String>,
    /// Message template file.
    pub message_template: Option<String>,
}

impl Merge for Discussions {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [base, organization, team, title, message, message_template]);
    }
}

/// Zulip stream message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Zulip {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Bot account email.
    pub account: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// API host.
    pub api_host: Option<String>,
    /// Stream.
    pub channel: Option<String>,
    /// Topic template.
    pub subject: Option<String>,
    /// Inline message.
    pub message: Option<String>,
    /// Message template file.
    pub message_template: Option<String>,
}

impl Merge for Zulip {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [base, account, api_key, api_host, channel, subject, message, message_template]
        );
    }
}

/// Twitter / X.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Twitter {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// API consumer key.
    pub consumer_key: Option<String>,
    /// API consumer secret.
    pub consumer_secret: Option<String>,
    /// Access token.
    pub access_token: Option<String>,
    /// Access token secret.
    pub access_token_secret: Option<String>,
    /// Single status; deprecated in favor of `statuses`.
    pub status: Option<String>,
    /// Statuses posted as a thread.
    pub statuses: Vec<String>,
    /// Status template file.
    pub status_template: Option<String>,
}

impl Merge for Twitter {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                base,
                consumer_key,
                consumer_secret,
                access_token,
                access_token_secret,
                status,
                statuses,
                status_template,
            ]
        );
    }
}

/// Mastodon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mastodon {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Instance URL.
    pub host: Option<String>,
    /// Access token.
    pub access_token: Option<String>,
    /// Single status; deprecated in favor of `statuses`.
    pub status: Option<String>,
    /// Statuses posted as a thread.
    pub statuses: Vec<String>,
    /// Status template file.
    pub status_template: Option<String>,
}

impl Merge for Mastodon {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [base, host, access_token, status, statuses, status_template]);
    }
}

/// Bluesky.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bluesky {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// PDS host.
    pub host: Option<String>,
    /// Account handle.
    pub handle: Option<String>,
    /// App password.
    pub password: Option<String>,
    /// Single status; deprecated in favor of `statuses`.
    pub status: Option<String>,
    /// Statuses posted as a thread.
    pub statuses: Vec<String>,
    /// Status template file.
    pub status_template: Option<String>,
}

impl Merge for Bluesky {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [base, host, handle, password, status, statuses, status_template]
        );
    }
}

/// LinkedIn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Linkedin {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Owner URN.
    pub owner: Option<String>,
    /// Access token.
    pub access_token: Option<String>,
    /// Post subject.
    pub subject: Option<String>,
    /// Inline message.
    pub message: Option<String>,
    /// Message template file.
    pub message_template: Option<String>,
}

impl Merge for Linkedin {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [base, owner, access_token, subject, message, message_template]);
    }
}

/// Email through SMTP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Smtp {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Server host.
    pub host: Option<String>,
    /// Server port.
    pub port: Option<u16>,
    /// Authenticate.
    pub auth: Option<bool>,
    /// User name.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Sender.
    pub from: Option<String>,
    /// Recipients.
    pub to: Option<String>,
    /// Carbon copy.
    pub cc: Option<String>,
    /// Blind carbon copy.
    pub bcc: Option<String>,
    /// Subject template.
    pub subject: Option<String>,
    /// Inline message.
    pub message: Option<String>,
    /// Message template file.
    pub message_template: Option<String>,
    /// Body type.
    pub mime_type: Option<MimeType>,
}

impl Merge for Smtp {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                base,
                host,
                port,
                auth,
                username,
                password,
                from,
                to,
                cc,
                bcc,
                subject,
                message,
                message_template,
                mime_type,
            ]
        );
    }
}

/// A generic HTTP announcement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpAnnouncer {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Target URL.
    pub url: Option<String>,
    /// Method.
    pub method: Option<HttpMethod>,
    /// Authorization scheme.
    pub authorization: Option<Authorization>,
    /// User name for basic auth.
    pub username: Option<String>,
    /// Password or bearer token.
    pub password: Option<String>,
    /// Keyword for bearer auth.
    pub bearer_keyword: Option<String>,
    /// Extra headers.
    pub headers: IndexMap<String, String>,
    /// Inline payload.
    pub payload: Option<String>,
    /// Payload template file.
    pub payload_template: Option<String>,
}

impl Merge for HttpAnnouncer {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                base,
                url,
                method,
                authorization,
                username,
                password,
                bearer_keyword,
                headers,
                payload,
                payload_template,
            ]
        );
    }
}

/// Named HTTP announcers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpAnnouncers {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Announcers by name.
    #[serde(flatten)]
    pub endpoints: IndexMap<String, HttpAnnouncer>,
}

impl Merge for HttpAnnouncers {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [active, explicit_enabled, endpoints]);
    }
}

/// Named generic webhooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhooksAnnouncers {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Webhooks by name.
    #[serde(flatten)]
    pub webhooks: IndexMap<String, WebhookAnnouncer>,
}

impl Merge for WebhooksAnnouncers {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [active, explicit_enabled, webhooks]);
    }
}

announcer!(
    Slack => "slack",
    Telegram => "telegram",
    Discussions => "discussions",
    Zulip => "zulip",
    Twitter => "twitter",
    Mastodon => "mastodon",
    Bluesky => "bluesky",
    Linkedin => "linkedin",
    Smtp => "smtp",
    HttpAnnouncer => "http",
    WebhookAnnouncer => "webhook",
);

webhook_announcer!(
    Discord => "discord",
    Gitter => "gitter",
    GoogleChat => "google_chat",
    Mattermost => "mattermost",
    Teams => "teams",
);

activatable!(HttpAnnouncers, WebhooksAnnouncers, Announce);

/// Every announcer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Announce {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Bluesky.
    pub bluesky: Bluesky,
    /// Discord.
    pub discord: Discord,
    /// GitHub discussions.
    pub discussions: Discussions,
    /// Gitter.
    pub gitter: Gitter,
    /// Google Chat.
    pub google_chat: GoogleChat,
    /// Named HTTP announcers.
    pub http: HttpAnnouncers,
    /// LinkedIn.
    pub linkedin: Linkedin,
    /// Mastodon.
    pub mastodon: Mastodon,
    /// Mattermost.
    pub mattermost: Mattermost,
    /// Slack.
    pub slack: Slack,
    /// Email.
    pub smtp: Smtp,
    /// Microsoft Teams.
    pub teams: Teams,
    /// Telegram.
    pub telegram: Telegram,
    /// Twitter / X.
    pub twitter: Twitter,
    /// Named webhooks.
    pub webhooks: WebhooksAnnouncers,
    /// Zulip.
    pub zulip: Zulip,
}

impl Merge for Announce {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                active,
                explicit_enabled,
                bluesky,
                discord,
                discussions,
                gitter,
                google_chat,
                http,
                linkedin,
                mastodon,
                mattermost,
                slack,
                smtp,
                teams,
                telegram,
                twitter,
                webhooks,
                zulip,
            ]
        );
    }
}

impl Announce {
    /// Single announcers (not the named maps) in alphabetical order.
    pub fn singles(&self) -> [&dyn Announcer; 14] {
        [
            &self.bluesky,
            &self.discord,
            &self.discussions,
            &self.gitter,
            &self.google_chat,
            &self.linkedin,
            &self.mastodon,
            &self.mattermost,
            &self.slack,
            &self.smtp,
            &self.teams,
            &self.telegram,
            &self.twitter,
            &self.zulip,
        ]
    }

    /// True when any announcer, single or named, is enabled.
    pub fn any_enabled(&self) -> bool {
        self.singles().iter().any(|a| a.is_enabled()) || self.http.enabled || self.webhooks.enabled
    }

    /// Find an announcer by kind, or a named HTTP announcer or webhook.
    pub fn find(&self, name: &str) -> Option<&dyn Announcer> {
        self.singles()
            .into_iter()
            .find(|a| a.kind() == name)
            .or_else(|| self.http.endpoints.get(name).map(|a| a as &dyn Announcer))
            .or_else(|| self.webhooks.webhooks.get(name).map(|a| a as &dyn Announcer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_http_announcers_flatten_next_to_active() {
        let http: HttpAnnouncers = serde_json::from_str(
            r#"{"active":"ALWAYS","hook":{"url":"https://example.com","method":"PUT"}}"#,
        )
        .unwrap();
        assert_eq!(http.active, Some(Active::Always));
        assert_eq!(http.endpoints.len(), 1);
        assert_eq!(http.endpoints["hook"].method, Some(HttpMethod::Put));
    }

    #[test]
    fn webhook_announcers_share_fields() {
        let discord: Discord = serde_json::from_str(r#"{"webhook":"https://discord"}"#).unwrap();
        assert_eq!(discord.webhook.as_deref(), Some("https://discord"));
        assert_eq!(discord.kind(), "discord");
    }

    #[test]
    fn find_by_kind_or_name() {
        let mut announce = Announce::default();
        announce.http.endpoints.insert("release-hook".into(), HttpAnnouncer::default());
        assert_eq!(announce.find("slack").map(|a| a.kind()), Some("slack"));
        assert_eq!(announce.find("release-hook").map(|a| a.kind()), Some("http"));
        assert!(announce.find("nope").is_none());
    }
}

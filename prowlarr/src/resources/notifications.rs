//! Notification connections

use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::{AttributePath, DynamicValue};

use super::family::{Family, KindSpec};
use crate::api::endpoint::Endpoint;
use crate::api::notifications::Notification;
use crate::api::Client;
use crate::helpers::schema::bool_value;
use crate::helpers::FieldSpec;

pub struct Notifications;

const NOTIFICATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::bool("alwaysUpdate", "always_update"),
    FieldSpec::bool("cleanLibrary", "clean_library"),
    FieldSpec::bool("directMessage", "direct_message"),
    FieldSpec::bool("notify", "notify"),
    FieldSpec::bool("requireEncryption", "require_encryption"),
    FieldSpec::bool("sendSilently", "send_silently"),
    FieldSpec::bool("useSsl", "use_ssl"),
    FieldSpec::bool("updateLibrary", "update_library"),
    FieldSpec::bool("useEuEndpoint", "use_eu_endpoint"),
    FieldSpec::int("port", "port"),
    FieldSpec::int("importFields", "import_fields"),
    FieldSpec::int("priority", "priority"),
    FieldSpec::int("retry", "retry"),
    FieldSpec::int("expire", "expire"),
    FieldSpec::int("method", "method"),
    FieldSpec::int("notificationType", "notification_type"),
    FieldSpec::int("topicId", "topic_id"),
    FieldSpec::string("accessToken", "access_token").sensitive(),
    FieldSpec::string("accessTokenSecret", "access_token_secret").sensitive(),
    FieldSpec::string("apiKey", "api_key").sensitive(),
    FieldSpec::string("appToken", "app_token").sensitive(),
    FieldSpec::string("arguments", "arguments"),
    FieldSpec::string("author", "author"),
    FieldSpec::string("authUsername", "auth_username"),
    FieldSpec::string("authPassword", "auth_password").sensitive(),
    FieldSpec::string("authToken", "auth_token"),
    FieldSpec::string("authUser", "auth_user"),
    FieldSpec::string("avatar", "avatar"),
    FieldSpec::string("botToken", "bot_token").sensitive(),
    FieldSpec::string("channel", "channel"),
    FieldSpec::string("chatId", "chat_id"),
    FieldSpec::string("clickUrl", "click_url"),
    FieldSpec::string("configurationKey", "configuration_key"),
    FieldSpec::string("consumerKey", "consumer_key").sensitive(),
    FieldSpec::string("consumerSecret", "consumer_secret").sensitive(),
    FieldSpec::string("deviceNames", "device_names"),
    FieldSpec::string("displayTime", "display_time"),
    FieldSpec::string("event", "event"),
    FieldSpec::string("expires", "expires"),
    FieldSpec::string("from", "from"),
    FieldSpec::string("host", "host"),
    FieldSpec::string("icon", "icon"),
    FieldSpec::string("instanceName", "instance_name"),
    FieldSpec::string("key", "key").sensitive(),
    FieldSpec::string("mapFrom", "map_from"),
    FieldSpec::string("mapTo", "map_to"),
    FieldSpec::string("mention", "mention"),
    FieldSpec::string("password", "password").sensitive(),
    FieldSpec::string("path", "path"),
    FieldSpec::string("receiverId", "receiver_id"),
    FieldSpec::string("refreshToken", "refresh_token"),
    FieldSpec::string("senderDomain", "sender_domain"),
    FieldSpec::string("senderId", "sender_id"),
    FieldSpec::string("senderNumber", "sender_number"),
    FieldSpec::string("server", "server"),
    FieldSpec::string("signIn", "sign_in"),
    FieldSpec::string("serverUrl", "server_url"),
    FieldSpec::string("sound", "sound"),
    FieldSpec::string("statelessUrls", "stateless_urls"),
    FieldSpec::string("token", "token").sensitive(),
    FieldSpec::string("url", "url"),
    FieldSpec::string("userKey", "user_key").sensitive(),
    FieldSpec::string("username", "username"),
    FieldSpec::string("webHookUrl", "web_hook_url"),
    FieldSpec::string_set("recipients", "recipients"),
    FieldSpec::string_set("topics", "topics"),
    FieldSpec::string_set("tags", "field_tags"),
    FieldSpec::string_set("channelTags", "channel_tags"),
    FieldSpec::string_set("devices", "devices"),
    FieldSpec::string_set("deviceIds", "device_ids"),
    FieldSpec::string_set("to", "to"),
    FieldSpec::string_set("cc", "cc"),
    FieldSpec::string_set("bcc", "bcc"),
    FieldSpec::int_set("grabFields", "grab_fields"),
];

const PRIORITY_EMERGENCY: &[i64] = &[-2, -1, 0, 1, 2];

pub static KINDS: &[KindSpec] = &[
    KindSpec::new(
        "notification_apprise",
        "Apprise",
        "AppriseSettings",
        &[
            "notification_type",
            "server_url",
            "configuration_key",
            "stateless_urls",
            "auth_username",
            "auth_password",
            "field_tags",
        ],
    )
    .one_of(&[("notification_type", &[0, 1, 2, 3])]),
    KindSpec::new("notification_boxcar", "Boxcar", "BoxcarSettings", &["token"])
        .required(&["token"]),
    KindSpec::new(
        "notification_custom_script",
        "CustomScript",
        "CustomScriptSettings",
        &["path", "arguments"],
    )
    .required(&["path"]),
    KindSpec::new(
        "notification_discord",
        "Discord",
        "DiscordSettings",
        &["web_hook_url", "username", "avatar", "author", "grab_fields"],
    )
    .required(&["web_hook_url"]),
    KindSpec::new(
        "notification_email",
        "Email",
        "EmailSettings",
        &[
            "server",
            "port",
            "require_encryption",
            "username",
            "password",
            "from",
            "to",
            "cc",
            "bcc",
        ],
    )
    .required(&["server", "from", "to"]),
    KindSpec::new(
        "notification_gotify",
        "Gotify",
        "GotifySettings",
        &["server", "app_token", "priority"],
    )
    .required(&["server", "app_token"])
    .one_of(&[("priority", &[0, 2, 5, 8])]),
    KindSpec::new(
        "notification_join",
        "Join",
        "JoinSettings",
        &["api_key", "device_names", "priority"],
    )
    .required(&["api_key"])
    .one_of(&[("priority", PRIORITY_EMERGENCY)]),
    KindSpec::new(
        "notification_mailgun",
        "Mailgun",
        "MailgunSettings",
        &[
            "api_key",
            "from",
            "sender_domain",
            "use_eu_endpoint",
            "recipients",
        ],
    )
    .required(&["api_key", "from", "recipients"]),
    KindSpec::new(
        "notification_notifiarr",
        "Notifiarr",
        "NotifiarrSettings",
        &["api_key"],
    )
    .required(&["api_key"]),
    KindSpec::new(
        "notification_ntfy",
        "Ntfy",
        "NtfySettings",
        &[
            "priority",
            "server_url",
            "username",
            "password",
            "topics",
            "field_tags",
            "click_url",
        ],
    )
    .required(&["topics"])
    .one_of(&[("priority", &[1, 2, 3, 4, 5])]),
    KindSpec::new(
        "notification_prowl",
        "Prowl",
        "ProwlSettings",
        &["api_key", "priority"],
    )
    .required(&["api_key"])
    .one_of(&[("priority", PRIORITY_EMERGENCY)]),
    KindSpec::new(
        "notification_pushbullet",
        "PushBullet",
        "PushBulletSettings",
        &["api_key", "device_ids", "channel_tags", "sender_id"],
    )
    .required(&["api_key"]),
    KindSpec::new(
        "notification_pushover",
        "Pushover",
        "PushoverSettings",
        &[
            "api_key", "user_key", "devices", "priority", "retry", "expire", "sound",
        ],
    )
    .required(&["api_key", "user_key"])
    .one_of(&[("priority", &[-1, 0, 1, 2])]),
    KindSpec::new(
        "notification_sendgrid",
        "SendGrid",
        "SendGridSettings",
        &["api_key", "from", "recipients"],
    )
    .required(&["api_key", "from", "recipients"]),
    KindSpec::new(
        "notification_signal",
        "Signal",
        "SignalSettings",
        &[
            "host",
            "port",
            "use_ssl",
            "sender_number",
            "receiver_id",
            "auth_username",
            "auth_password",
        ],
    )
    .required(&["host", "port", "sender_number", "receiver_id"]),
    KindSpec::new(
        "notification_simplepush",
        "Simplepush",
        "SimplepushSettings",
        &["key", "event"],
    )
    .required(&["key"]),
    KindSpec::new(
        "notification_slack",
        "Slack",
        "SlackSettings",
        &["web_hook_url", "username", "icon", "channel"],
    )
    .required(&["web_hook_url", "username"]),
    KindSpec::new(
        "notification_telegram",
        "Telegram",
        "TelegramSettings",
        &["bot_token", "chat_id", "topic_id", "send_silently"],
    )
    .required(&["bot_token", "chat_id"]),
    KindSpec::new(
        "notification_twitter",
        "Twitter",
        "TwitterSettings",
        &[
            "access_token",
            "access_token_secret",
            "consumer_key",
            "consumer_secret",
            "mention",
            "direct_message",
        ],
    )
    .required(&[
        "access_token",
        "access_token_secret",
        "consumer_key",
        "consumer_secret",
    ]),
    KindSpec::new(
        "notification_webhook",
        "Webhook",
        "WebhookSettings",
        &["url", "method", "username", "password"],
    )
    .required(&["url"])
    .one_of(&[("method", &[1, 2])]),
];

const TRIGGERS: &[(&str, &str)] = &[
    ("on_grab", "On grab flag."),
    ("on_health_issue", "On health issue flag."),
    ("on_health_restored", "On health restored flag."),
    ("on_application_update", "On application update flag."),
    ("include_manual_grabs", "Include manual grab flag."),
    ("include_health_warnings", "Include health warnings."),
];

impl Family for Notifications {
    type Model = Notification;

    const NAME: &'static str = "notification";
    const PLURAL: &'static str = "notifications";
    const TITLE: &'static str = "Notification";
    const FIELDS: &'static [FieldSpec] = NOTIFICATION_FIELDS;
    const ONE_OF: &'static [(&'static str, &'static [i64])] = &[
        ("import_fields", &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]),
        ("method", &[1, 2]),
        ("priority", &[-2, -1, 0, 1, 2, 3, 4, 5, 7, 8]),
    ];

    fn endpoint(client: &Client) -> Endpoint<'_, Notification> {
        client.notifications()
    }

    fn attributes(_kind: Option<&KindSpec>) -> Vec<Attribute> {
        TRIGGERS
            .iter()
            .map(|(name, description)| {
                AttributeBuilder::new(name, AttributeType::Bool)
                    .description(description)
                    .optional()
                    .computed()
                    .build()
            })
            .collect()
    }

    fn write_model(state: &DynamicValue, _kind: Option<&KindSpec>, model: &mut Notification) {
        let flag = |name| bool_value(state, name).unwrap_or_default();
        model.on_grab = flag("on_grab");
        model.on_health_issue = flag("on_health_issue");
        model.on_health_restored = flag("on_health_restored");
        model.on_application_update = flag("on_application_update");
        model.include_manual_grabs = flag("include_manual_grabs");
        model.include_health_warnings = flag("include_health_warnings");
    }

    fn read_model(
        model: &Notification,
        _kind: Option<&KindSpec>,
        state: &mut DynamicValue,
    ) -> tfplug::Result<()> {
        let flags = [
            ("on_grab", model.on_grab),
            ("on_health_issue", model.on_health_issue),
            ("on_health_restored", model.on_health_restored),
            ("on_application_update", model.on_application_update),
            ("include_manual_grabs", model.include_manual_grabs),
            ("include_health_warnings", model.include_health_warnings),
        ];
        for (name, value) in flags {
            state.set_bool(&AttributePath::new(name), value)?;
        }
        Ok(())
    }
}

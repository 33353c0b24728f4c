use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use milesquote_core::config::{AppConfig, LoadOptions, CONFIG_FILE_NAME};
use secrecy::ExposeSecret;
use toml::Value;

struct ConfigSource {
    path: Option<PathBuf>,
    doc: Option<Value>,
}

impl ConfigSource {
    fn detect() -> Self {
        let path = detect_config_path();
        let doc = load_config_file_doc(path.as_deref());
        Self { path, doc }
    }

    fn line(&self, key_path: &str, env_keys: &[&str], value: &str) -> String {
        render_line(key_path, value, self.field_source(key_path, env_keys))
    }

    fn field_source(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .path
                    .as_deref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };
    let source = ConfigSource::detect();
    let messaging = &config.delivery.messaging;

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(source.line(
        "server.bind_address",
        &["MILESQUOTE_SERVER_BIND_ADDRESS"],
        &config.server.bind_address,
    ));
    lines.push(source.line(
        "server.port",
        &["MILESQUOTE_SERVER_PORT"],
        &config.server.port.to_string(),
    ));

    let rates_file = config.rates.file.as_deref().map(|path| path.display().to_string());
    lines.push(source.line("rates.file", &["MILESQUOTE_RATES_FILE"], or_unset(rates_file.as_deref())));
    let inline_rates = if config.rates.table.is_empty() {
        "<unset>".to_string()
    } else {
        format!("{} airlines", config.rates.table.len())
    };
    lines.push(source.line("rates.table", &[], &inline_rates));

    lines.push(source.line(
        "lead.phone_convention",
        &["MILESQUOTE_LEAD_PHONE_CONVENTION"],
        config.lead.phone_convention.as_str(),
    ));
    lines.push(source.line(
        "lead.country_code",
        &["MILESQUOTE_LEAD_COUNTRY_CODE"],
        &config.lead.country_code,
    ));
    lines.push(source.line(
        "lead.require_consent",
        &["MILESQUOTE_LEAD_REQUIRE_CONSENT"],
        &config.lead.require_consent.to_string(),
    ));

    lines.push(source.line(
        "delivery.strategy",
        &["MILESQUOTE_DELIVERY_STRATEGY"],
        &format!("{:?}", config.delivery.strategy),
    ));
    lines.push(source.line(
        "delivery.timeout_secs",
        &["MILESQUOTE_DELIVERY_TIMEOUT_SECS"],
        &config.delivery.timeout_secs.to_string(),
    ));
    lines.push(source.line(
        "delivery.messaging.api_base_url",
        &["MILESQUOTE_MESSAGING_API_BASE_URL"],
        &messaging.api_base_url,
    ));
    lines.push(source.line(
        "delivery.messaging.phone_number_id",
        &["MILESQUOTE_MESSAGING_PHONE_NUMBER_ID"],
        or_unset(messaging.phone_number_id.as_deref()),
    ));
    let access_token = messaging
        .access_token
        .as_ref()
        .map(|token| redact_token(token.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    lines.push(source.line(
        "delivery.messaging.access_token",
        &["MILESQUOTE_MESSAGING_ACCESS_TOKEN"],
        &access_token,
    ));
    lines.push(source.line(
        "delivery.messaging.default_recipient",
        &["MILESQUOTE_MESSAGING_DEFAULT_RECIPIENT"],
        or_unset(messaging.default_recipient.as_deref()),
    ));
    lines.push(source.line(
        "delivery.messaging.recipient",
        &["MILESQUOTE_MESSAGING_RECIPIENT"],
        &format!("{:?}", messaging.recipient),
    ));
    lines.push(source.line(
        "delivery.messaging.message_type",
        &["MILESQUOTE_MESSAGING_MESSAGE_TYPE"],
        &format!("{:?}", messaging.message_type),
    ));
    lines.push(source.line(
        "delivery.messaging.template_name",
        &["MILESQUOTE_MESSAGING_TEMPLATE_NAME"],
        &messaging.template_name,
    ));
    lines.push(source.line(
        "delivery.messaging.template_language",
        &["MILESQUOTE_MESSAGING_TEMPLATE_LANGUAGE"],
        &messaging.template_language,
    ));
    lines.push(source.line(
        "delivery.messaging.manual_send_enabled",
        &["MILESQUOTE_MESSAGING_MANUAL_SEND_ENABLED"],
        &messaging.manual_send_enabled.to_string(),
    ));
    lines.push(source.line(
        "delivery.webhook.url",
        &["MILESQUOTE_WEBHOOK_URL"],
        or_unset(config.delivery.webhook.url.as_deref()),
    ));

    lines.push(source.line(
        "public.sales_contact_number",
        &["MILESQUOTE_PUBLIC_SALES_CONTACT_NUMBER"],
        or_unset(config.public.sales_contact_number.as_deref()),
    ));
    lines.push(source.line(
        "public.continue_url",
        &["MILESQUOTE_PUBLIC_CONTINUE_URL"],
        or_unset(config.public.continue_url.as_deref()),
    ));

    lines.push(source.line(
        "logging.level",
        &["MILESQUOTE_LOGGING_LEVEL", "MILESQUOTE_LOG_LEVEL"],
        &config.logging.level,
    ));
    lines.push(source.line(
        "logging.format",
        &["MILESQUOTE_LOGGING_FORMAT", "MILESQUOTE_LOG_FORMAT"],
        &format!("{:?}", config.logging.format),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from(CONFIG_FILE_NAME);
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config").join(CONFIG_FILE_NAME);
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn or_unset(value: Option<&str>) -> &str {
    value.unwrap_or("<unset>")
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the last four characters so operators can tell tokens apart.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let count = trimmed.chars().count();
    if count <= 8 {
        return "<redacted>".to_string();
    }

    let suffix: String = trimmed.chars().skip(count - 4).collect();
    format!("***{suffix}")
}

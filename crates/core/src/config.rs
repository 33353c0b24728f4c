use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{only_digits, PhoneConvention, ValidatorSettings};

pub const CONFIG_FILE_NAME: &str = "milesquote.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub rates: RatesConfig,
    pub lead: LeadConfig,
    pub delivery: DeliveryConfig,
    pub public: PublicConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug, Default)]
pub struct RatesConfig {
    pub file: Option<PathBuf>,
    pub table: BTreeMap<String, Decimal>,
}

#[derive(Clone, Debug)]
pub struct LeadConfig {
    pub phone_convention: PhoneConvention,
    pub country_code: String,
    pub require_consent: bool,
}

#[derive(Clone, Debug)]
pub struct DeliveryConfig {
    pub strategy: DeliveryStrategy,
    pub timeout_secs: u64,
    pub messaging: MessagingConfig,
    pub webhook: WebhookConfig,
}

#[derive(Clone, Debug)]
pub struct MessagingConfig {
    pub api_base_url: String,
    pub phone_number_id: Option<String>,
    pub access_token: Option<SecretString>,
    pub default_recipient: Option<String>,
    pub recipient: RecipientMode,
    pub message_type: MessageType,
    pub template_name: String,
    pub template_language: String,
    pub text_template: Option<String>,
    /// Exposes `/api/messages` for operators to send ad-hoc messages.
    pub manual_send_enabled: bool,
}

#[derive(Clone, Debug, Default)]
pub struct WebhookConfig {
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct PublicConfig {
    pub sales_contact_number: Option<String>,
    pub continue_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStrategy {
    /// Call the messaging gateway directly.
    Messaging,
    /// POST the lead to a workflow webhook and let it route the lead.
    Webhook,
}

/// Who a lead notification is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientMode {
    Customer,
    Sales,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Template,
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub rates_file: Option<PathBuf>,
    pub phone_convention: Option<PhoneConvention>,
    pub require_consent: Option<bool>,
    pub delivery_strategy: Option<DeliveryStrategy>,
    pub delivery_timeout_secs: Option<u64>,
    pub messaging_api_base_url: Option<String>,
    pub messaging_phone_number_id: Option<String>,
    pub messaging_access_token: Option<String>,
    pub messaging_default_recipient: Option<String>,
    pub messaging_recipient: Option<RecipientMode>,
    pub messaging_message_type: Option<MessageType>,
    pub messaging_manual_send_enabled: Option<bool>,
    pub webhook_url: Option<String>,
    pub sales_contact_number: Option<String>,
    pub continue_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 3000 },
            rates: RatesConfig::default(),
            lead: LeadConfig {
                phone_convention: PhoneConvention::Local,
                country_code: "55".to_string(),
                require_consent: true,
            },
            delivery: DeliveryConfig {
                strategy: DeliveryStrategy::Webhook,
                timeout_secs: 6,
                messaging: MessagingConfig {
                    api_base_url: "https://graph.facebook.com/v20.0".to_string(),
                    phone_number_id: None,
                    access_token: None,
                    default_recipient: None,
                    recipient: RecipientMode::Customer,
                    message_type: MessageType::Template,
                    template_name: "cotacao_milhas_aba".to_string(),
                    template_language: "pt_BR".to_string(),
                    text_template: None,
                    manual_send_enabled: false,
                },
                webhook: WebhookConfig::default(),
            },
            public: PublicConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for DeliveryStrategy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "messaging" => Ok(Self::Messaging),
            "webhook" => Ok(Self::Webhook),
            other => Err(ConfigError::Validation(format!(
                "unsupported delivery strategy `{other}` (expected messaging|webhook)"
            ))),
        }
    }
}

impl std::str::FromStr for RecipientMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "sales" => Ok(Self::Sales),
            other => Err(ConfigError::Validation(format!(
                "unsupported recipient `{other}` (expected customer|sales)"
            ))),
        }
    }
}

impl std::str::FromStr for MessageType {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "template" => Ok(Self::Template),
            "text" => Ok(Self::Text),
            other => Err(ConfigError::Validation(format!(
                "unsupported message type `{other}` (expected template|text)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl MessagingConfig {
    /// True when both the access token and the sender phone id are present.
    pub fn has_credentials(&self) -> bool {
        let token = self
            .access_token
            .as_ref()
            .map(|value| !value.expose_secret().trim().is_empty())
            .unwrap_or(false);
        let phone_id =
            self.phone_number_id.as_ref().map(|value| !value.trim().is_empty()).unwrap_or(false);
        token && phone_id
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.normalize();
        config.validate()?;

        Ok(config)
    }

    pub fn validator_settings(&self) -> ValidatorSettings {
        ValidatorSettings {
            phone_convention: self.lead.phone_convention,
            require_consent: self.lead.require_consent,
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(rates) = patch.rates {
            if let Some(file) = rates.file {
                self.rates.file = Some(file);
            }
            if let Some(table) = rates.table {
                self.rates.table = table;
            }
        }

        if let Some(lead) = patch.lead {
            if let Some(phone_convention) = lead.phone_convention {
                self.lead.phone_convention = phone_convention;
            }
            if let Some(country_code) = lead.country_code {
                self.lead.country_code = country_code;
            }
            if let Some(require_consent) = lead.require_consent {
                self.lead.require_consent = require_consent;
            }
        }

        if let Some(delivery) = patch.delivery {
            if let Some(strategy) = delivery.strategy {
                self.delivery.strategy = strategy;
            }
            if let Some(timeout_secs) = delivery.timeout_secs {
                self.delivery.timeout_secs = timeout_secs;
            }

            if let Some(messaging) = delivery.messaging {
                let target = &mut self.delivery.messaging;
                if let Some(api_base_url) = messaging.api_base_url {
                    target.api_base_url = api_base_url;
                }
                if let Some(phone_number_id) = messaging.phone_number_id {
                    target.phone_number_id = Some(phone_number_id);
                }
                if let Some(access_token_value) = messaging.access_token {
                    target.access_token = Some(secret_value(access_token_value));
                }
                if let Some(default_recipient) = messaging.default_recipient {
                    target.default_recipient = Some(default_recipient);
                }
                if let Some(recipient) = messaging.recipient {
                    target.recipient = recipient;
                }
                if let Some(message_type) = messaging.message_type {
                    target.message_type = message_type;
                }
                if let Some(template_name) = messaging.template_name {
                    target.template_name = template_name;
                }
                if let Some(template_language) = messaging.template_language {
                    target.template_language = template_language;
                }
                if let Some(text_template) = messaging.text_template {
                    target.text_template = Some(text_template);
                }
                if let Some(manual_send_enabled) = messaging.manual_send_enabled {
                    target.manual_send_enabled = manual_send_enabled;
                }
            }

            if let Some(webhook) = delivery.webhook {
                if let Some(url) = webhook.url {
                    self.delivery.webhook.url = Some(url);
                }
            }
        }

        if let Some(public) = patch.public {
            if let Some(sales_contact_number) = public.sales_contact_number {
                self.public.sales_contact_number = Some(sales_contact_number);
            }
            if let Some(continue_url) = public.continue_url {
                self.public.continue_url = Some(continue_url);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("MILESQUOTE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("MILESQUOTE_SERVER_PORT") {
            self.server.port = parse_u16("MILESQUOTE_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("MILESQUOTE_RATES_FILE") {
            self.rates.file = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("MILESQUOTE_LEAD_PHONE_CONVENTION") {
            self.lead.phone_convention =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "MILESQUOTE_LEAD_PHONE_CONVENTION".to_string(),
                    value: value.clone(),
                })?;
        }
        if let Some(value) = read_env("MILESQUOTE_LEAD_COUNTRY_CODE") {
            self.lead.country_code = value;
        }
        if let Some(value) = read_env("MILESQUOTE_LEAD_REQUIRE_CONSENT") {
            self.lead.require_consent = parse_bool("MILESQUOTE_LEAD_REQUIRE_CONSENT", &value)?;
        }

        if let Some(value) = read_env("MILESQUOTE_DELIVERY_STRATEGY") {
            self.delivery.strategy = value.parse()?;
        }
        if let Some(value) = read_env("MILESQUOTE_DELIVERY_TIMEOUT_SECS") {
            self.delivery.timeout_secs = parse_u64("MILESQUOTE_DELIVERY_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("MILESQUOTE_MESSAGING_API_BASE_URL") {
            self.delivery.messaging.api_base_url = value;
        }
        if let Some(value) = read_env("MILESQUOTE_MESSAGING_PHONE_NUMBER_ID") {
            self.delivery.messaging.phone_number_id = Some(value);
        }
        if let Some(value) = read_env("MILESQUOTE_MESSAGING_ACCESS_TOKEN") {
            self.delivery.messaging.access_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("MILESQUOTE_MESSAGING_DEFAULT_RECIPIENT") {
            self.delivery.messaging.default_recipient = Some(value);
        }
        if let Some(value) = read_env("MILESQUOTE_MESSAGING_RECIPIENT") {
            self.delivery.messaging.recipient = value.parse()?;
        }
        if let Some(value) = read_env("MILESQUOTE_MESSAGING_MESSAGE_TYPE") {
            self.delivery.messaging.message_type = value.parse()?;
        }
        if let Some(value) = read_env("MILESQUOTE_MESSAGING_TEMPLATE_NAME") {
            self.delivery.messaging.template_name = value;
        }
        if let Some(value) = read_env("MILESQUOTE_MESSAGING_TEMPLATE_LANGUAGE") {
            self.delivery.messaging.template_language = value;
        }
        if let Some(value) = read_env("MILESQUOTE_MESSAGING_MANUAL_SEND_ENABLED") {
            self.delivery.messaging.manual_send_enabled =
                parse_bool("MILESQUOTE_MESSAGING_MANUAL_SEND_ENABLED", &value)?;
        }

        if let Some(value) = read_env("MILESQUOTE_WEBHOOK_URL") {
            self.delivery.webhook.url = Some(value);
        }

        if let Some(value) = read_env("MILESQUOTE_PUBLIC_SALES_CONTACT_NUMBER") {
            self.public.sales_contact_number = Some(value);
        }
        if let Some(value) = read_env("MILESQUOTE_PUBLIC_CONTINUE_URL") {
            self.public.continue_url = Some(value);
        }

        let log_level =
            read_env("MILESQUOTE_LOGGING_LEVEL").or_else(|| read_env("MILESQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("MILESQUOTE_LOGGING_FORMAT").or_else(|| read_env("MILESQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(rates_file) = overrides.rates_file {
            self.rates.file = Some(rates_file);
        }
        if let Some(phone_convention) = overrides.phone_convention {
            self.lead.phone_convention = phone_convention;
        }
        if let Some(require_consent) = overrides.require_consent {
            self.lead.require_consent = require_consent;
        }
        if let Some(strategy) = overrides.delivery_strategy {
            self.delivery.strategy = strategy;
        }
        if let Some(timeout_secs) = overrides.delivery_timeout_secs {
            self.delivery.timeout_secs = timeout_secs;
        }
        if let Some(api_base_url) = overrides.messaging_api_base_url {
            self.delivery.messaging.api_base_url = api_base_url;
        }
        if let Some(phone_number_id) = overrides.messaging_phone_number_id {
            self.delivery.messaging.phone_number_id = Some(phone_number_id);
        }
        if let Some(access_token) = overrides.messaging_access_token {
            self.delivery.messaging.access_token = Some(secret_value(access_token));
        }
        if let Some(default_recipient) = overrides.messaging_default_recipient {
            self.delivery.messaging.default_recipient = Some(default_recipient);
        }
        if let Some(recipient) = overrides.messaging_recipient {
            self.delivery.messaging.recipient = recipient;
        }
        if let Some(message_type) = overrides.messaging_message_type {
            self.delivery.messaging.message_type = message_type;
        }
        if let Some(manual_send_enabled) = overrides.messaging_manual_send_enabled {
            self.delivery.messaging.manual_send_enabled = manual_send_enabled;
        }
        if let Some(url) = overrides.webhook_url {
            self.delivery.webhook.url = Some(url);
        }
        if let Some(sales_contact_number) = overrides.sales_contact_number {
            self.public.sales_contact_number = Some(sales_contact_number);
        }
        if let Some(continue_url) = overrides.continue_url {
            self.public.continue_url = Some(continue_url);
        }
    }

    /// Phone numbers are stored as digits only; blank optional values become `None`.
    fn normalize(&mut self) {
        let messaging = &mut self.delivery.messaging;
        messaging.default_recipient = normalize_number(messaging.default_recipient.take());
        messaging.phone_number_id = blank_to_none(messaging.phone_number_id.take());
        messaging.api_base_url = messaging.api_base_url.trim().trim_end_matches('/').to_string();
        self.delivery.webhook.url = blank_to_none(self.delivery.webhook.url.take());
        self.public.sales_contact_number =
            normalize_number(self.public.sales_contact_number.take());
        self.public.continue_url = blank_to_none(self.public.continue_url.take());
        self.lead.country_code = only_digits(&self.lead.country_code);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_lead(&self.lead)?;
        validate_delivery(&self.delivery)?;
        validate_public(&self.public)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), PathBuf::from("config").join(CONFIG_FILE_NAME)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_lead(lead: &LeadConfig) -> Result<(), ConfigError> {
    if lead.country_code.is_empty() || lead.country_code.len() > 3 {
        return Err(ConfigError::Validation(
            "lead.country_code must be 1 to 3 digits (e.g. `55`)".to_string(),
        ));
    }
    Ok(())
}

fn validate_delivery(delivery: &DeliveryConfig) -> Result<(), ConfigError> {
    if delivery.timeout_secs == 0 || delivery.timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "delivery.timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    let messaging = &delivery.messaging;
    if !is_http_url(&messaging.api_base_url) {
        return Err(ConfigError::Validation(
            "delivery.messaging.api_base_url must start with http:// or https://".to_string(),
        ));
    }
    if messaging.message_type == MessageType::Template {
        if messaging.template_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "delivery.messaging.template_name is required when message_type = \"template\""
                    .to_string(),
            ));
        }
        if messaging.template_language.trim().is_empty() {
            return Err(ConfigError::Validation(
                "delivery.messaging.template_language is required when message_type = \"template\""
                    .to_string(),
            ));
        }
    }

    if let Some(url) = &delivery.webhook.url {
        if !is_http_url(url) {
            return Err(ConfigError::Validation(
                "delivery.webhook.url must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_public(public: &PublicConfig) -> Result<(), ConfigError> {
    if let Some(url) = &public.continue_url {
        if !is_http_url(url) {
            return Err(ConfigError::Validation(
                "public.continue_url must start with http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn normalize_number(value: Option<String>) -> Option<String> {
    value.map(|value| only_digits(&value)).filter(|value| !value.is_empty())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    rates: Option<RatesPatch>,
    lead: Option<LeadPatch>,
    delivery: Option<DeliveryPatch>,
    public: Option<PublicPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct RatesPatch {
    file: Option<PathBuf>,
    /// Rates as TOML numbers or decimal strings, read through their text.
    table: Option<BTreeMap<String, Decimal>>,
}

#[derive(Debug, Default, Deserialize)]
struct LeadPatch {
    phone_convention: Option<PhoneConvention>,
    country_code: Option<String>,
    require_consent: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct DeliveryPatch {
    strategy: Option<DeliveryStrategy>,
    timeout_secs: Option<u64>,
    messaging: Option<MessagingPatch>,
    webhook: Option<WebhookPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct MessagingPatch {
    api_base_url: Option<String>,
    phone_number_id: Option<String>,
    access_token: Option<String>,
    default_recipient: Option<String>,
    recipient: Option<RecipientMode>,
    message_type: Option<MessageType>,
    template_name: Option<String>,
    template_language: Option<String>,
    text_template: Option<String>,
    manual_send_enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookPatch {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PublicPatch {
    sales_contact_number: Option<String>,
    continue_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

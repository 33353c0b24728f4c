//! Free-text message rendering for leads.
//!
//! The built-in body can be replaced per deployment through
//! `delivery.messaging.text_template`; both are Tera templates rendered with
//! the same context.

use milesquote_core::quote::{format_brl, group_thousands};
use milesquote_core::validation::only_digits;
use milesquote_core::Lead;
use reqwest::Url;
use tera::{Context, Tera};

const LEAD_TEXT_TEMPLATE_NAME: &str = "lead_text.txt";

const DEFAULT_LEAD_TEXT_TEMPLATE: &str = "\
✈️ Sua cotação de milhas chegou!
• Companhia: {{ airline }}
• Pontos: {{ points }}
• E-mail: {{ email }}
• Valor estimado: {{ estimate }} (CPM {{ rate }})
{% if continue_url %}
👉 Para seguir com a negociação, acesse: {{ continue_url }}
{% endif %}
(mensagem gerada automaticamente pelo site)";

const CHAT_LINK_BASE: &str = "https://wa.me";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid message template: {0}")]
    Parse(String),
    #[error("message rendering failed: {0}")]
    Render(String),
    #[error("invalid chat link: {0}")]
    Link(String),
}

#[derive(Clone, Debug)]
pub struct MessageRenderer {
    tera: Tera,
    continue_url: Option<String>,
}

impl MessageRenderer {
    pub fn new(
        custom_template: Option<&str>,
        continue_url: Option<String>,
    ) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_template(
            LEAD_TEXT_TEMPLATE_NAME,
            custom_template.unwrap_or(DEFAULT_LEAD_TEXT_TEMPLATE),
        )
        .map_err(|error| TemplateError::Parse(error.to_string()))?;

        Ok(Self { tera, continue_url })
    }

    pub fn render_lead_text(&self, lead: &Lead) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("airline", lead.airline.as_str());
        context.insert("points", &group_thousands(&lead.points.to_string()));
        context.insert("email", &lead.email);
        context.insert("name", lead.greeting_name());
        context.insert("estimate", &format_brl(lead.estimated_value));
        context.insert("rate", &format_brl(lead.rate));
        context.insert("continue_url", &self.continue_url);

        self.tera
            .render(LEAD_TEXT_TEMPLATE_NAME, &context)
            .map(|text| text.trim().to_string())
            .map_err(|error| TemplateError::Render(error.to_string()))
    }
}

/// Click-to-chat URL that opens a conversation with `number` pre-filled with `text`.
pub fn chat_link(number: &str, text: &str) -> Result<String, TemplateError> {
    let digits = only_digits(number);
    if digits.is_empty() {
        return Err(TemplateError::Link(format!("`{number}` has no digits")));
    }
    let url = Url::parse_with_params(&format!("{CHAT_LINK_BASE}/{digits}"), &[("text", text)])
        .map_err(|error| TemplateError::Link(error.to_string()))?;
    Ok(url.to_string())
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quote::{to_cents, QuoteResult};
use crate::rates::AirlineId;
use crate::validation::ValidLeadInput;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadId(pub Uuid);

impl LeadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LeadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LeadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated, priced lead. Not persisted here; once dispatched, the
/// messaging gateway or webhook receiver owns it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub airline: AirlineId,
    pub points: u64,
    pub phone: String,
    pub email: String,
    pub consent_given: bool,
    pub estimated_value: Decimal,
    pub rate: Decimal,
    pub submitted_at: DateTime<Utc>,
    pub user_agent: Option<String>,
}

impl Lead {
    pub fn new(input: ValidLeadInput, quote: QuoteResult, user_agent: Option<String>) -> Self {
        Self {
            id: LeadId::new(),
            airline: input.airline,
            points: input.points,
            phone: input.phone,
            email: input.email,
            consent_given: input.consent_given,
            estimated_value: quote.estimated_value,
            rate: quote.rate_used,
            submitted_at: Utc::now(),
            user_agent,
        }
    }

    pub fn display_value(&self) -> Decimal {
        to_cents(self.estimated_value)
    }

    /// Name used to greet the customer: the email local part, or `Cliente`.
    pub fn greeting_name(&self) -> &str {
        self.email.split('@').next().filter(|name| !name.trim().is_empty()).unwrap_or("Cliente")
    }
}

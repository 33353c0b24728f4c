//! Lead form validation.
//!
//! Fields are checked in a fixed order (airline, points, phone, email,
//! consent) and the first failure wins, so the same input always produces the
//! same message. Validation never performs I/O.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::rates::{AirlineId, RateTable};

pub const MINIMUM_POINTS: u64 = 1_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneConvention {
    /// Area code plus subscriber number, country code implied: 10 or 11 digits.
    #[default]
    Local,
    /// Country code, area code and subscriber number: 11 to 13 digits.
    International,
}

impl PhoneConvention {
    pub fn digit_range(self) -> std::ops::RangeInclusive<usize> {
        match self {
            Self::Local => 10..=11,
            Self::International => 11..=13,
        }
    }

    pub fn accepts(self, digits: &str) -> bool {
        self.digit_range().contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::International => "international",
        }
    }
}

impl std::str::FromStr for PhoneConvention {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "international" => Ok(Self::International),
            other => Err(format!(
                "unsupported phone convention `{other}` (expected local|international)"
            )),
        }
    }
}

/// Raw lead form as submitted by the browser. Fields are untyped JSON so that
/// missing or mistyped values surface as field errors, in field order, rather
/// than as body parse failures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadDraft {
    #[serde(default)]
    pub airline: Option<Value>,
    #[serde(default)]
    pub points: Option<Value>,
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub consent: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidLeadInput {
    pub airline: AirlineId,
    pub points: u64,
    /// Digits only.
    pub phone: String,
    pub email: String,
    pub consent_given: bool,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Select an airline.")]
    MissingAirline,
    #[error("Unknown airline `{0}`.")]
    UnknownAirline(String),
    #[error("Enter the number of points.")]
    MissingPoints,
    #[error("Points must be a whole number.")]
    InvalidPoints,
    #[error("Enter at least {minimum} points.")]
    BelowMinimumPoints { minimum: u64 },
    #[error("Enter a phone number.")]
    MissingPhone,
    #[error("Phone number must have {min} to {max} digits ({convention}).")]
    InvalidPhone { convention: &'static str, min: usize, max: usize },
    #[error("Enter an email address.")]
    MissingEmail,
    #[error("Enter a valid email address.")]
    InvalidEmail,
    #[error("Consent to data processing is required.")]
    ConsentRequired,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingAirline | Self::UnknownAirline(_) => "airline",
            Self::MissingPoints | Self::InvalidPoints | Self::BelowMinimumPoints { .. } => "points",
            Self::MissingPhone | Self::InvalidPhone { .. } => "phone",
            Self::MissingEmail | Self::InvalidEmail => "email",
            Self::ConsentRequired => "consent",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidatorSettings {
    pub phone_convention: PhoneConvention,
    pub require_consent: bool,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self { phone_convention: PhoneConvention::Local, require_consent: true }
    }
}

#[derive(Clone, Debug)]
pub struct LeadValidator {
    settings: ValidatorSettings,
}

impl LeadValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> ValidatorSettings {
        self.settings
    }

    pub fn validate(
        &self,
        draft: &LeadDraft,
        rates: &RateTable,
    ) -> Result<ValidLeadInput, ValidationError> {
        let airline = validate_airline(draft.airline.as_ref(), rates)?;
        let points = validate_points(draft.points.as_ref())?;
        let phone = validate_phone(draft.phone.as_ref(), self.settings.phone_convention)?;
        let email = validate_email(draft.email.as_ref())?;
        let consent_given = matches!(draft.consent, Some(Value::Bool(true)));
        if self.settings.require_consent && !consent_given {
            return Err(ValidationError::ConsentRequired);
        }

        Ok(ValidLeadInput { airline, points, phone, email, consent_given })
    }
}

pub fn only_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn validate_airline(raw: Option<&Value>, rates: &RateTable) -> Result<AirlineId, ValidationError> {
    let airline = match raw {
        None | Some(Value::Null) => return Err(ValidationError::MissingAirline),
        Some(Value::String(text)) => text.trim().to_string(),
        Some(other) => return Err(ValidationError::UnknownAirline(other.to_string())),
    };
    if airline.is_empty() {
        return Err(ValidationError::MissingAirline);
    }
    if !rates.contains(&airline) {
        return Err(ValidationError::UnknownAirline(airline));
    }
    Ok(AirlineId(airline))
}

/// Accepts JSON integers, or digit strings grouped in threes by `.`, `,`, space
/// or `_`.
pub fn validate_points(raw: Option<&Value>) -> Result<u64, ValidationError> {
    let points = match raw {
        None | Some(Value::Null) => return Err(ValidationError::MissingPoints),
        Some(Value::Number(number)) => parse_number_points(number)?,
        Some(Value::String(text)) => parse_text_points(text)?,
        Some(_) => return Err(ValidationError::InvalidPoints),
    };

    if points < i128::from(MINIMUM_POINTS) {
        return Err(ValidationError::BelowMinimumPoints { minimum: MINIMUM_POINTS });
    }
    u64::try_from(points).map_err(|_| ValidationError::InvalidPoints)
}

fn parse_number_points(number: &serde_json::Number) -> Result<i128, ValidationError> {
    if let Some(value) = number.as_u64() {
        return Ok(i128::from(value));
    }
    if let Some(value) = number.as_i64() {
        return Ok(i128::from(value));
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e18 => Ok(value as i128),
        _ => Err(ValidationError::InvalidPoints),
    }
}

fn parse_text_points(text: &str) -> Result<i128, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingPoints);
    }

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let digits = ungroup_digits(unsigned).ok_or(ValidationError::InvalidPoints)?;

    let magnitude = digits.parse::<i128>().map_err(|_| ValidationError::InvalidPoints)?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// `"100.000"` and `"2 500"` become plain digits; `"1000.5"` and `"1.5000"` do
/// not, since a separator must split off groups of exactly three digits.
fn ungroup_digits(text: &str) -> Option<String> {
    let is_separator = |c: char| matches!(c, '.' | ',' | ' ' | '_');
    let separator = text.chars().find(|c| is_separator(*c));
    let groups: Vec<&str> = match separator {
        None => vec![text],
        Some(separator) => text.split(separator).collect(),
    };

    let (lead, rest) = groups.split_first()?;
    let lead_ok = !lead.is_empty() && (separator.is_none() || lead.len() <= 3);
    let rest_ok = rest.iter().all(|group| group.len() == 3);
    let all_digits = groups.iter().all(|group| group.chars().all(|c| c.is_ascii_digit()));
    if !(lead_ok && rest_ok && all_digits) {
        return None;
    }
    Some(groups.concat())
}

fn validate_phone(raw: Option<&Value>, convention: PhoneConvention) -> Result<String, ValidationError> {
    let invalid = || {
        let range = convention.digit_range();
        ValidationError::InvalidPhone {
            convention: convention.as_str(),
            min: *range.start(),
            max: *range.end(),
        }
    };
    let digits = match raw {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => only_digits(text),
        Some(_) => return Err(invalid()),
    };
    if digits.is_empty() {
        return Err(ValidationError::MissingPhone);
    }
    if !convention.accepts(&digits) {
        return Err(invalid());
    }
    Ok(digits)
}

fn validate_email(raw: Option<&Value>) -> Result<String, ValidationError> {
    let email = match raw {
        None | Some(Value::Null) => "",
        Some(Value::String(text)) => text.trim(),
        Some(_) => return Err(ValidationError::InvalidEmail),
    };
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::rates::RateTable;

    use super::{
        LeadDraft, LeadValidator, PhoneConvention, ValidationError, ValidatorSettings,
        MINIMUM_POINTS,
    };

    fn draft() -> LeadDraft {
        LeadDraft {
            airline: Some(json!("LATAM")),
            points: Some(json!(100_000)),
            phone: Some(json!("(11) 98765-4321")),
            email: Some(json!("ana@example.com")),
            consent: Some(json!(true)),
        }
    }

    fn validator(convention: PhoneConvention) -> LeadValidator {
        LeadValidator::new(ValidatorSettings { phone_convention: convention, require_consent: true })
    }

    fn digits(count: usize) -> String {
        "1234567890123456".chars().take(count).collect()
    }

    #[test]
    fn valid_draft_produces_normalized_input() {
        let input = validator(PhoneConvention::Local)
            .validate(&draft(), &RateTable::builtin())
            .expect("draft should validate");

        assert_eq!(input.airline.as_str(), "LATAM");
        assert_eq!(input.points, 100_000);
        assert_eq!(input.phone, "11987654321");
        assert_eq!(input.email, "ana@example.com");
        assert!(input.consent_given);
    }

    #[test]
    fn unknown_airline_is_rejected_first() {
        let mut lead = draft();
        lead.airline = Some(json!("Gol"));
        lead.points = Some(json!(10));
        lead.consent = None;

        let error = validator(PhoneConvention::Local)
            .validate(&lead, &RateTable::builtin())
            .expect_err("unknown airline");
        assert_eq!(error, ValidationError::UnknownAirline("Gol".to_string()));
        assert_eq!(error.field(), "airline");
    }

    #[test]
    fn missing_airline_is_its_own_error() {
        let mut lead = draft();
        lead.airline = Some(json!("   "));
        let error = validator(PhoneConvention::Local)
            .validate(&lead, &RateTable::builtin())
            .expect_err("blank airline");
        assert_eq!(error, ValidationError::MissingAirline);
    }

    #[test]
    fn points_below_minimum_are_rejected_regardless_of_airline() {
        let rates = RateTable::builtin();
        for airline in ["LATAM", "Smiles", "Azul", "TAP"] {
            for points in [json!(0), json!(1), json!(999), json!(-5000), json!("999")] {
                let mut lead = draft();
                lead.airline = Some(json!(airline));
                lead.points = Some(points);

                let error =
                    validator(PhoneConvention::Local).validate(&lead, &rates).expect_err("minimum");
                assert_eq!(error, ValidationError::BelowMinimumPoints { minimum: MINIMUM_POINTS });
            }
        }
    }

    #[test]
    fn points_accept_minimum_and_grouped_text() {
        let rates = RateTable::builtin();
        for (raw, expected) in [
            (json!(1000), 1_000),
            (json!("100.000"), 100_000),
            (json!("50,000"), 50_000),
            (json!(" 2 500 "), 2_500),
            (json!(1500.0), 1_500),
        ] {
            let mut lead = draft();
            lead.points = Some(raw);
            let input = validator(PhoneConvention::Local).validate(&lead, &rates).expect("points");
            assert_eq!(input.points, expected);
        }
    }

    #[test]
    fn non_integral_points_are_invalid() {
        let rates = RateTable::builtin();
        for raw in [json!(1500.5), json!("lots"), json!(true), json!([1000])] {
            let mut lead = draft();
            lead.points = Some(raw);
            let error =
                validator(PhoneConvention::Local).validate(&lead, &rates).expect_err("invalid");
            assert_eq!(error, ValidationError::InvalidPoints);
        }

        for raw in ["1000.5", "1.5000", "10,00", "1.000,000", "1__000", "-"] {
            let mut lead = draft();
            lead.points = Some(json!(raw));
            let error =
                validator(PhoneConvention::Local).validate(&lead, &rates).expect_err("grouping");
            assert_eq!(error, ValidationError::InvalidPoints, "{raw}");
        }

        let mut lead = draft();
        lead.points = None;
        let error = validator(PhoneConvention::Local).validate(&lead, &rates).expect_err("missing");
        assert_eq!(error, ValidationError::MissingPoints);
    }

    #[test]
    fn oversized_points_are_invalid_not_below_minimum() {
        let rates = RateTable::builtin();
        for raw in
            [json!("100000000000000000000"), json!("100.000.000.000.000.000.000"), json!(1e20)]
        {
            let mut lead = draft();
            lead.points = Some(raw);
            let error =
                validator(PhoneConvention::Local).validate(&lead, &rates).expect_err("overflow");
            assert_eq!(error, ValidationError::InvalidPoints);
        }
    }

    #[test]
    fn mistyped_fields_fail_in_field_order() {
        let rates = RateTable::builtin();
        let local = validator(PhoneConvention::Local);

        let mut lead = draft();
        lead.airline = Some(json!("Gol"));
        lead.phone = Some(json!(11_987_654_321_u64));
        assert_eq!(
            local.validate(&lead, &rates),
            Err(ValidationError::UnknownAirline("Gol".to_string()))
        );

        lead.airline = Some(json!(42));
        assert_eq!(
            local.validate(&lead, &rates),
            Err(ValidationError::UnknownAirline("42".to_string()))
        );

        let mut lead = draft();
        lead.phone = Some(json!(11_987_654_321_u64));
        let error = local.validate(&lead, &rates).expect_err("numeric phone");
        assert_eq!(error.field(), "phone");

        let mut lead = draft();
        lead.email = Some(json!(["ana@example.com"]));
        assert_eq!(local.validate(&lead, &rates), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn local_convention_boundaries() {
        let rates = RateTable::builtin();
        let local = validator(PhoneConvention::Local);
        for (count, accepted) in [(9, false), (10, true), (11, true), (12, false), (13, false)] {
            let mut lead = draft();
            lead.phone = Some(json!(digits(count)));
            assert_eq!(local.validate(&lead, &rates).is_ok(), accepted, "{count} digits");
        }
    }

    #[test]
    fn international_convention_boundaries() {
        let rates = RateTable::builtin();
        let international = validator(PhoneConvention::International);
        for (count, accepted) in
            [(9, false), (10, false), (11, true), (12, true), (13, true), (14, false)]
        {
            let mut lead = draft();
            lead.phone = Some(json!(digits(count)));
            assert_eq!(international.validate(&lead, &rates).is_ok(), accepted, "{count} digits");
        }
    }

    #[test]
    fn one_validator_never_accepts_both_conventions() {
        let rates = RateTable::builtin();
        let local_number = "1198765432"; // 10 digits, local only
        let international_number = "5511987654321"; // 13 digits, international only

        for convention in [PhoneConvention::Local, PhoneConvention::International] {
            let validator = validator(convention);
            let mut lead = draft();
            lead.phone = Some(json!(local_number));
            let local_ok = validator.validate(&lead, &rates).is_ok();
            lead.phone = Some(json!(international_number));
            let international_ok = validator.validate(&lead, &rates).is_ok();
            assert!(!(local_ok && international_ok), "{convention:?} accepted both");
        }
    }

    #[test]
    fn phone_formatting_characters_are_stripped() {
        let mut lead = draft();
        lead.phone = Some(json!("+55 (11) 98765-4321"));
        let input = validator(PhoneConvention::International)
            .validate(&lead, &RateTable::builtin())
            .expect("international phone");
        assert_eq!(input.phone, "5511987654321");
    }

    #[test]
    fn invalid_phone_names_the_convention() {
        let mut lead = draft();
        lead.phone = Some(json!("12345"));
        let error = validator(PhoneConvention::Local)
            .validate(&lead, &RateTable::builtin())
            .expect_err("short phone");
        assert_eq!(error.field(), "phone");
        assert_eq!(error.to_string(), "Phone number must have 10 to 11 digits (local).");

        lead.phone = Some(json!("--"));
        let error = validator(PhoneConvention::Local)
            .validate(&lead, &RateTable::builtin())
            .expect_err("no digits");
        assert_eq!(error, ValidationError::MissingPhone);
    }

    #[test]
    fn email_needs_at_sign() {
        let rates = RateTable::builtin();
        let mut lead = draft();
        lead.email = Some(json!("ana.example.com"));
        assert_eq!(
            validator(PhoneConvention::Local).validate(&lead, &rates),
            Err(ValidationError::InvalidEmail)
        );

        lead.email = None;
        assert_eq!(
            validator(PhoneConvention::Local).validate(&lead, &rates),
            Err(ValidationError::MissingEmail)
        );
    }

    #[test]
    fn missing_or_false_consent_always_rejects() {
        let rates = RateTable::builtin();
        for consent in [None, Some(json!(false)), Some(json!("true")), Some(json!(1))] {
            let mut lead = draft();
            lead.consent = consent;
            let error =
                validator(PhoneConvention::Local).validate(&lead, &rates).expect_err("consent");
            assert_eq!(error, ValidationError::ConsentRequired);
            assert_eq!(error.field(), "consent");
        }
    }

    #[test]
    fn consent_is_optional_when_flow_does_not_require_it() {
        let validator = LeadValidator::new(ValidatorSettings {
            phone_convention: PhoneConvention::Local,
            require_consent: false,
        });
        let mut lead = draft();
        lead.consent = None;

        let input = validator.validate(&lead, &RateTable::builtin()).expect("no consent needed");
        assert!(!input.consent_given);
    }

    #[test]
    fn draft_deserializes_with_missing_fields() {
        let lead: LeadDraft =
            serde_json::from_str(r#"{"airline":"TAP","points":"5000"}"#).expect("partial body");
        assert_eq!(lead.airline, Some(json!("TAP")));
        assert_eq!(lead.phone, None);
        assert_eq!(lead.consent, None);
    }
}

pub mod config;
pub mod domain;
pub mod errors;
pub mod quote;
pub mod rates;
pub mod validation;

pub use domain::lead::{Lead, LeadId};
pub use errors::{ApplicationError, InterfaceError};
pub use quote::{compute_estimate, QuoteCalculator, QuoteResult, RateTableCalculator};
pub use rates::{AirlineId, RateTable, RateTableError};
pub use validation::{
    LeadDraft, LeadValidator, PhoneConvention, ValidLeadInput, ValidationError, ValidatorSettings,
};

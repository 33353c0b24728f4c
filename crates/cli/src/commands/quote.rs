use std::path::PathBuf;

use crate::commands::CommandResult;

use milesquote_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use milesquote_core::quote::{format_brl, group_thousands};
use milesquote_core::validation::validate_points;
use milesquote_core::{QuoteCalculator, RateTable, RateTableCalculator};
use serde_json::Value;

pub fn run(airline: &str, points: &str, rates_file: Option<PathBuf>) -> CommandResult {
    let options = LoadOptions {
        overrides: ConfigOverrides { rates_file, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let rates = match RateTable::from_config(&config.rates) {
        Ok(rates) => rates,
        Err(error) => return CommandResult::failure("quote", "rate_table", error.to_string(), 3),
    };

    let airline = airline.trim();
    if !rates.contains(airline) {
        let known = rates.airlines().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        return CommandResult::failure(
            "quote",
            "invalid_input",
            format!("unknown airline `{airline}` (known: {known})"),
            4,
        );
    }
    let points = match validate_points(Some(&Value::String(points.to_string()))) {
        Ok(points) => points,
        Err(error) => return CommandResult::failure("quote", "invalid_input", error.to_string(), 4),
    };

    let quote = RateTableCalculator::new(rates).quote(points, airline);
    CommandResult::success(
        "quote",
        format!(
            "{airline}: {} points at {} per 1000 = {} (estimate {})",
            group_thousands(&points.to_string()),
            format_brl(quote.rate_used),
            format_brl(quote.estimated_value),
            quote.display_value(),
        ),
    )
}

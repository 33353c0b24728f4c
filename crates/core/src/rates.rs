//! Per-airline conversion rates, expressed as currency per 1,000 points (CPM).
//!
//! The table is loaded once at startup and never mutated afterwards. Lookups
//! are exact and case-sensitive: `LATAM` and `latam` are different airlines.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use thiserror::Error;

use crate::config::RatesConfig;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AirlineId(pub String);

impl AirlineId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AirlineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum RateTableError {
    #[error("could not read rate file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse rate file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("rate for `{airline}` is not a decimal number: `{raw}`")]
    InvalidRate { airline: String, raw: String },
    #[error("rate for `{airline}` must not be negative (got {rate})")]
    NegativeRate { airline: String, rate: Decimal },
    #[error("airline `{airline}` is listed more than once")]
    DuplicateAirline { airline: String },
    #[error("airline identifiers must not be blank")]
    BlankAirline,
    #[error("rate table must contain at least one airline")]
    Empty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<AirlineId, Decimal>,
}

impl RateTable {
    pub fn new<I, K>(entries: I) -> Result<Self, RateTableError>
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: Into<String>,
    {
        let mut rates = BTreeMap::new();
        for (airline, rate) in entries {
            let airline = airline.into();
            if airline.trim().is_empty() {
                return Err(RateTableError::BlankAirline);
            }
            if rate.is_sign_negative() && !rate.is_zero() {
                return Err(RateTableError::NegativeRate { airline, rate });
            }
            if rates.insert(AirlineId(airline.clone()), rate).is_some() {
                return Err(RateTableError::DuplicateAirline { airline });
            }
        }

        if rates.is_empty() {
            return Err(RateTableError::Empty);
        }

        Ok(Self { rates })
    }

    /// The rates the site shipped with before any deployment overrides.
    pub fn builtin() -> Self {
        let rates = [
            ("LATAM", Decimal::from(25)),
            ("Smiles", Decimal::from(21)),
            ("Azul", Decimal::from(20)),
            ("TAP", Decimal::from(18)),
        ]
        .into_iter()
        .map(|(airline, rate)| (AirlineId(airline.to_string()), rate))
        .collect();

        Self { rates }
    }

    pub fn from_config(config: &RatesConfig) -> Result<Self, RateTableError> {
        if let Some(path) = &config.file {
            return Self::from_file(path);
        }
        if !config.table.is_empty() {
            return Self::new(config.table.iter().map(|(airline, rate)| (airline.clone(), *rate)));
        }
        Ok(Self::builtin())
    }

    pub fn from_file(path: &Path) -> Result<Self, RateTableError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| RateTableError::ReadFile { path: path.to_path_buf(), source })?;
        let RateEntries(parsed) = serde_json::from_str(&raw)
            .map_err(|source| RateTableError::ParseFile { path: path.to_path_buf(), source })?;

        let mut entries = Vec::with_capacity(parsed.len());
        for (airline, number) in parsed {
            let raw = number.get().trim().to_string();
            let rate = Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .map_err(|_| RateTableError::InvalidRate { airline: airline.clone(), raw })?;
            entries.push((airline, rate));
        }

        Self::new(entries)
    }

    pub fn rate_for(&self, airline: &str) -> Option<Decimal> {
        self.rates.get(&AirlineId(airline.to_string())).copied()
    }

    pub fn contains(&self, airline: &str) -> bool {
        self.rate_for(airline).is_some()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn airlines(&self) -> impl Iterator<Item = &AirlineId> {
        self.rates.keys()
    }

}

/// Serializes as `{"<airline>": <rate>}`, writing each rate with the digits it
/// was loaded with.
impl Serialize for RateTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.rates.len()))?;
        for (airline, rate) in &self.rates {
            let number = RawValue::from_string(rate.to_string()).map_err(S::Error::custom)?;
            map.serialize_entry(airline.as_str(), &number)?;
        }
        map.end()
    }
}

/// Rate file entries in document order, duplicates included, with the number
/// text untouched.
struct RateEntries(Vec<(String, Box<RawValue>)>);

impl<'de> Deserialize<'de> for RateEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RateEntries;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object mapping airlines to rates")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Box<RawValue>>()? {
                    entries.push(entry);
                }
                Ok(RateEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use crate::config::RatesConfig;

    use super::{RateTable, RateTableError};

    #[test]
    fn builtin_table_carries_launch_rates() {
        let table = RateTable::builtin();

        assert_eq!(table.len(), 4);
        assert_eq!(table.rate_for("LATAM"), Some(Decimal::from(25)));
        assert_eq!(table.rate_for("Smiles"), Some(Decimal::from(21)));
        assert_eq!(table.rate_for("Azul"), Some(Decimal::from(20)));
        assert_eq!(table.rate_for("TAP"), Some(Decimal::from(18)));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = RateTable::builtin();
        assert!(table.contains("LATAM"));
        assert!(!table.contains("latam"));
    }

    #[test]
    fn negative_rates_are_rejected() {
        let error = RateTable::new([("Gol", Decimal::new(-150, 1))]).expect_err("negative rate");
        assert!(matches!(error, RateTableError::NegativeRate { ref airline, .. } if airline == "Gol"));
    }

    #[test]
    fn zero_rate_is_allowed() {
        let table = RateTable::new([("Promo", Decimal::ZERO)]).expect("zero rate is valid");
        assert_eq!(table.rate_for("Promo"), Some(Decimal::ZERO));
    }

    #[test]
    fn blank_airline_and_empty_table_are_rejected() {
        assert!(matches!(
            RateTable::new([("  ", Decimal::ONE)]),
            Err(RateTableError::BlankAirline)
        ));
        assert!(matches!(
            RateTable::new(Vec::<(String, Decimal)>::new()),
            Err(RateTableError::Empty)
        ));
    }

    #[test]
    fn file_rates_keep_exact_decimal_values() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("rates.json");
        fs::write(&path, r#"{"LATAM": 25, "Smiles": 21.5, "Azul": 19.75}"#).expect("write rates");

        let table = RateTable::from_file(&path).expect("rate file should load");

        assert_eq!(table.rate_for("Smiles"), Some(Decimal::new(215, 1)));
        assert_eq!(table.rate_for("Azul"), Some(Decimal::new(1975, 2)));
        assert!(!table.contains("TAP"));
    }

    #[test]
    fn unreadable_file_reports_path() {
        let error = RateTable::from_file(&PathBuf::from("/nonexistent/rates.json"))
            .expect_err("missing file");
        assert!(error.to_string().contains("/nonexistent/rates.json"));
    }

    #[test]
    fn config_prefers_file_then_inline_table_then_builtin() {
        let builtin = RateTable::from_config(&RatesConfig::default()).expect("builtin");
        assert_eq!(builtin, RateTable::builtin());

        let inline = RatesConfig {
            file: None,
            table: [("Gol".to_string(), Decimal::from(17))].into_iter().collect(),
        };
        let table = RateTable::from_config(&inline).expect("inline");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rate_for("Gol"), Some(Decimal::from(17)));

        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("rates.json");
        fs::write(&path, r#"{"TAP": 18}"#).expect("write rates");
        let with_file = RatesConfig { file: Some(path), ..inline };
        let table = RateTable::from_config(&with_file).expect("file");
        assert!(table.contains("TAP"));
        assert!(!table.contains("Gol"));
    }

    #[test]
    fn duplicate_airlines_are_rejected() {
        let error = RateTable::new([("LATAM", Decimal::from(25)), ("LATAM", Decimal::from(99))])
            .expect_err("duplicate airline");
        assert!(
            matches!(error, RateTableError::DuplicateAirline { ref airline } if airline == "LATAM")
        );
    }

    #[test]
    fn duplicate_keys_in_rate_file_are_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("rates.json");
        fs::write(&path, r#"{"LATAM": 25, "Azul": 20, "LATAM": 99}"#).expect("write rates");

        let error = RateTable::from_file(&path).expect_err("duplicate key");
        assert!(
            matches!(error, RateTableError::DuplicateAirline { ref airline } if airline == "LATAM")
        );
    }

    #[test]
    fn non_numeric_file_rates_are_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("rates.json");
        fs::write(&path, r#"{"LATAM": "25"}"#).expect("write rates");

        let error = RateTable::from_file(&path).expect_err("string rate");
        assert!(matches!(error, RateTableError::InvalidRate { ref airline, .. } if airline == "LATAM"));
    }

    #[test]
    fn json_rendering_keeps_rate_digits() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("rates.json");
        fs::write(&path, r#"{"LATAM": 25, "Smiles": 21.50, "Azul": 19.123456789012345678901}"#)
            .expect("write rates");
        let table = RateTable::from_file(&path).expect("rate file should load");

        let rendered = serde_json::to_string(&table).expect("serialize");
        assert_eq!(rendered, r#"{"Azul":19.123456789012345678901,"LATAM":25,"Smiles":21.50}"#);
    }
}

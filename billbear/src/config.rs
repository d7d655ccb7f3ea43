use std::env;
use thiserror::Error;

pub const SCALE_VAR: &str = "BILLBEAR_CURRENCY_SCALE";
pub const SYMBOL_VAR: &str = "BILLBEAR_CURRENCY_SYMBOL";
const DEFAULT_SCALE: u32 = 2;
const DEFAULT_SYMBOL: &str = "₹";
/// Largest scale whose minor-unit factor still fits comfortably in `u64`.
const MAX_SCALE: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be an integer between 0 and {max}, got '{value}'", max = MAX_SCALE)]
    InvalidScale { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub currency_scale: u32,
    pub currency_symbol: String,
}

impl AppConfig {
    /// Reads configuration from the process environment, after loading a
    /// `.env` file when one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let currency_scale = match lookup(SCALE_VAR) {
            Some(value) if !value.trim().is_empty() => parse_scale(SCALE_VAR, value.trim())?,
            _ => DEFAULT_SCALE,
        };
        let currency_symbol = lookup(SYMBOL_VAR).unwrap_or_else(|| DEFAULT_SYMBOL.to_owned());

        Ok(Self {
            currency_scale,
            currency_symbol,
        })
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(
        self,
        scale: Option<u32>,
        symbol: Option<String>,
    ) -> Result<Self, ConfigError> {
        let currency_scale = match scale {
            Some(scale) if scale > MAX_SCALE => {
                return Err(ConfigError::InvalidScale {
                    name: "--scale",
                    value: scale.to_string(),
                });
            }
            Some(scale) => scale,
            None => self.currency_scale,
        };
        Ok(Self {
            currency_scale,
            currency_symbol: symbol.unwrap_or(self.currency_symbol),
        })
    }
}

fn parse_scale(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|scale| *scale <= MAX_SCALE)
        .ok_or_else(|| ConfigError::InvalidScale {
            name,
            value: value.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[rstest]
    fn defaults_to_rupees() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("defaults are valid");
        assert_eq!(config.currency_scale, 2);
        assert_eq!(config.currency_symbol, "₹");
    }

    #[rstest]
    fn reads_environment_values() {
        let config = AppConfig::from_lookup(lookup(&[(SCALE_VAR, "0"), (SYMBOL_VAR, "¥")]))
            .expect("valid config");
        assert_eq!(config.currency_scale, 0);
        assert_eq!(config.currency_symbol, "¥");
    }

    #[rstest]
    #[case::not_a_number("two")]
    #[case::negative("-1")]
    #[case::too_large("12")]
    fn rejects_bad_scale(#[case] value: &str) {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[(SCALE_VAR, value)])),
            Err(ConfigError::InvalidScale {
                name: SCALE_VAR,
                value: value.to_owned(),
            })
        );
    }

    #[rstest]
    fn flags_override_environment() {
        let config = AppConfig::from_lookup(lookup(&[(SCALE_VAR, "3"), (SYMBOL_VAR, "$")]))
            .and_then(|config| config.with_overrides(Some(2), None))
            .expect("valid config");
        assert_eq!(config.currency_scale, 2);
        assert_eq!(config.currency_symbol, "$");

        assert!(
            AppConfig::from_lookup(lookup(&[]))
                .and_then(|config| config.with_overrides(Some(40), None))
                .is_err()
        );
    }
}

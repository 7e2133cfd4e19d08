use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use crate::domain::money::Currency;
use crate::utils::RetryPolicy;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    pub payment_timeout: Duration,
    pub checkout_retry_attempts: u32,
    pub checkout_retry_delay: Duration,

    /// Unset means no metrics server.
    pub metrics_port: Option<u16>,
    pub default_currency: Currency,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        // Loads .env if present (no crash if missing)
        dotenvy::dotenv().ok();

        Self::from_source(|name| env::var(name).ok())
    }

    /// Build settings from any key lookup. Blank values count as unset.
    pub fn from_source<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url = get("DATABASE_URL");
        let database_max_connections = parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?;

        let payment_timeout = Duration::from_millis(parse_or(&get, "PAYMENT_TIMEOUT_MS", 5000)?);
        let checkout_retry_attempts = parse_or(&get, "CHECKOUT_RETRY_ATTEMPTS", 3)?;
        let checkout_retry_delay = Duration::from_millis(parse_or(&get, "CHECKOUT_RETRY_DELAY_MS", 50)?);

        let metrics_port = get("METRICS_PORT")
            .map(|raw| raw.parse::<u16>().with_context(|| format!("METRICS_PORT is not a port: {raw}")))
            .transpose()?;

        let default_currency = match get("DEFAULT_CURRENCY") {
            Some(raw) => Currency::new(&raw).with_context(|| format!("DEFAULT_CURRENCY is invalid: {raw}"))?,
            None => Currency::default(),
        };

        Ok(Self {
            database_url,
            database_max_connections,
            payment_timeout,
            checkout_retry_attempts,
            checkout_retry_delay,
            metrics_port,
            default_currency,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.checkout_retry_attempts, self.checkout_retry_delay)
    }
}

fn parse_or<T, G>(get: &G, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_source(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]).unwrap();
        assert!(settings.database_url.is_none());
        assert_eq!(settings.database_max_connections, 5);
        assert_eq!(settings.payment_timeout, Duration::from_millis(5000));
        assert_eq!(settings.checkout_retry_attempts, 3);
        assert!(settings.metrics_port.is_none());
        assert_eq!(settings.default_currency.as_str(), "EUR");
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("PAYMENT_TIMEOUT_MS", "250"),
            ("METRICS_PORT", "9100"),
            ("DEFAULT_CURRENCY", "usd"),
            ("CHECKOUT_RETRY_ATTEMPTS", "5"),
        ])
        .unwrap();

        assert_eq!(settings.database_url.as_deref(), Some("postgres://localhost/shop"));
        assert_eq!(settings.payment_timeout, Duration::from_millis(250));
        assert_eq!(settings.metrics_port, Some(9100));
        assert_eq!(settings.default_currency.as_str(), "USD");
        assert_eq!(settings.retry_policy().max_attempts, 5);
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let settings = settings_from(&[("DATABASE_URL", "  "), ("METRICS_PORT", "")]).unwrap();
        assert!(settings.database_url.is_none());
        assert!(settings.metrics_port.is_none());
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(settings_from(&[("PAYMENT_TIMEOUT_MS", "soon")]).is_err());
        assert!(settings_from(&[("METRICS_PORT", "99999")]).is_err());
        assert!(settings_from(&[("DEFAULT_CURRENCY", "EURO")]).is_err());
    }
}

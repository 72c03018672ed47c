//! Configuration loading from environment.

use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;

use cryptopay_compliance::{InstitutionKind, JurisdictionSettings};
use cryptopay_types::CountryCode;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// SQLite archive location; payments are archived in memory when unset
    pub database_url: Option<String>,
    pub merchant_id: Option<String>,
    pub merchant_api_secret: String,
    pub webhook_secret: String,
    pub merchant_callback_url: Option<String>,
    pub poll_interval: Duration,
    pub payment_ttl: Duration,
    pub required_confirmations: u32,
    pub signature_tolerance: Duration,
    pub nonce_retention: Duration,
    pub rate_freshness: Duration,
    pub rate_limit_per_minute: u32,
    pub laos_pilot_active: bool,
    /// Tier-1 capital; when set the merchant is a regulated institution in Cambodia
    pub cambodia_cet1_capital: Option<Decimal>,
    pub unlicensed_jurisdictions: HashSet<CountryCode>,
    /// Simulated ledger confirms every address after this delay
    pub simulated_confirmation: Option<Duration>,
    pub data_encryption_key: Option<String>,
    pub otel_enabled: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `get`, which reads a variable by name.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| get(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            var(name).with_context(|| format!("{} environment variable is required", name))
        };

        Ok(Self {
            port: parse_or(&var, "PORT", 3000)?,
            database_url: var("DATABASE_URL"),
            merchant_id: var("MERCHANT_ID"),
            merchant_api_secret: required("MERCHANT_API_SECRET")?,
            webhook_secret: required("WEBHOOK_SECRET")?,
            merchant_callback_url: var("MERCHANT_CALLBACK_URL"),
            poll_interval: Duration::from_secs(parse_or(&var, "POLL_INTERVAL_SECS", 5)?),
            payment_ttl: Duration::from_secs(60 * parse_or(&var, "PAYMENT_TTL_MINUTES", 60u64)?),
            required_confirmations: parse_or(&var, "REQUIRED_CONFIRMATIONS", 1)?,
            signature_tolerance: Duration::from_secs(parse_or(
                &var,
                "SIGNATURE_TOLERANCE_SECS",
                300,
            )?),
            nonce_retention: Duration::from_secs(parse_or(&var, "NONCE_RETENTION_SECS", 600)?),
            rate_freshness: Duration::from_secs(parse_or(&var, "RATE_FRESHNESS_SECS", 60)?),
            rate_limit_per_minute: parse_or(&var, "RATE_LIMIT_PER_MINUTE", 100)?,
            laos_pilot_active: parse_or(&var, "LAOS_PILOT_ACTIVE", true)?,
            cambodia_cet1_capital: parse_opt(&var, "CAMBODIA_CET1_CAPITAL")?,
            unlicensed_jurisdictions: var("UNLICENSED_JURISDICTIONS")
                .map(|codes| {
                    codes
                        .split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(CountryCode::new)
                        .collect()
                })
                .unwrap_or_default(),
            simulated_confirmation: parse_opt(&var, "SIMULATED_CONFIRMATION_SECS")?
                .map(Duration::from_secs),
            data_encryption_key: var("DATA_ENCRYPTION_KEY"),
            otel_enabled: parse_or(&var, "OTEL_ENABLED", false)?,
        })
    }

    /// Merchant-specific inputs to the compliance modules.
    pub fn jurisdiction_settings(&self) -> JurisdictionSettings {
        JurisdictionSettings {
            laos_pilot_active: self.laos_pilot_active,
            unlicensed: self.unlicensed_jurisdictions.clone(),
            cambodia_institution: match self.cambodia_cet1_capital {
                Some(cet1_capital) => InstitutionKind::CommercialBank { cet1_capital },
                None => InstitutionKind::Merchant,
            },
        }
    }
}

fn parse_opt<T>(var: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .with_context(|| format!("invalid value for {}: {:?}", name, raw))
        })
        .transpose()
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_opt(var, name)?.unwrap_or(default))
}

//! Jurisdiction profile domain model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Two-letter ISO country code, normalised to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(from = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Creates a country code, trimming and upper-casing the input.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for CountryCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

/// Regulatory grouping of a cryptoasset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetGroup {
    /// Tokenized securities
    Group1a,
    /// Stablecoins
    Group1b,
    /// Unbacked cryptoassets
    Group2,
}

impl AssetGroup {
    /// Group 1 assets are backed by a traditional asset.
    pub fn is_group1(&self) -> bool {
        matches!(self, AssetGroup::Group1a | AssetGroup::Group1b)
    }
}

impl fmt::Display for AssetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetGroup::Group1a => write!(f, "Group 1a"),
            AssetGroup::Group1b => write!(f, "Group 1b"),
            AssetGroup::Group2 => write!(f, "Group 2"),
        }
    }
}

/// Ordered lookup tables used to classify assets into groups.
///
/// Stablecoins are checked before tokenized securities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetGroupTable {
    pub stablecoins: Vec<String>,
    pub tokenized_securities: Vec<String>,
}

/// Per-transaction and per-month ceilings, in the jurisdiction's fiat currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub daily: Decimal,
    pub monthly: Decimal,
}

/// Identity documents a regulator expects for full KYC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KycRequirements {
    pub individual: Vec<String>,
    pub business: Vec<String>,
}

/// Static, immutable parameters for one jurisdiction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionProfile {
    pub country_code: CountryCode,
    pub country_name: String,
    /// Fiat currency all thresholds are denominated in
    pub currency_code: String,
    pub regulators: Vec<String>,
    /// Amounts at or above this need customer identity fields
    pub kyc_threshold: Decimal,
    pub daily_limit: Decimal,
    pub monthly_limit: Decimal,
    pub supported_cryptocurrencies: Vec<String>,
    pub tax_rate: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_rule_threshold: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_groups: Option<AssetGroupTable>,
    pub kyc_requirements: KycRequirements,
}

impl JurisdictionProfile {
    /// Returns true if the cryptocurrency may be used in this jurisdiction.
    pub fn supports(&self, crypto: &str) -> bool {
        self.supported_cryptocurrencies
            .iter()
            .any(|c| c.eq_ignore_ascii_case(crypto))
    }

    pub fn limits(&self) -> Limits {
        Limits {
            daily: self.daily_limit,
            monthly: self.monthly_limit,
        }
    }

    /// KYC applies from the threshold upwards (inclusive).
    pub fn requires_kyc(&self, amount: Decimal) -> bool {
        amount >= self.kyc_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn profile() -> JurisdictionProfile {
        JurisdictionProfile {
            country_code: CountryCode::new("sg"),
            country_name: "Singapore".into(),
            currency_code: "SGD".into(),
            regulators: vec!["MAS".into()],
            kyc_threshold: dec!(1000),
            daily_limit: dec!(100000),
            monthly_limit: dec!(1000000),
            supported_cryptocurrencies: vec!["BTC".into(), "USDT".into()],
            tax_rate: dec!(0.08),
            travel_rule_threshold: Some(dec!(1500)),
            asset_groups: None,
            kyc_requirements: KycRequirements::default(),
        }
    }

    #[test]
    fn test_country_code_normalised() {
        assert_eq!(CountryCode::new(" sg ").as_str(), "SG");
        assert_eq!(CountryCode::from("th"), CountryCode::new("TH"));
    }

    #[test]
    fn test_kyc_threshold_is_inclusive() {
        let p = profile();
        assert!(p.requires_kyc(dec!(1000)));
        assert!(!p.requires_kyc(dec!(999)));
    }

    #[test]
    fn test_supports_is_case_insensitive() {
        let p = profile();
        assert!(p.supports("usdt"));
        assert!(!p.supports("DOGE"));
    }
}

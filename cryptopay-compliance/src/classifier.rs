//! Asset classification for jurisdictions that group cryptoassets.
//!
//! Group 1b (stablecoins) is checked before Group 1a (tokenized securities);
//! any other supported asset is Group 2 (unbacked).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use cryptopay_types::{AssetGroup, AssetGroupTable, JurisdictionProfile, ValidationError};

/// The asset table shared by the grouping regulators.
pub fn standard_groups() -> AssetGroupTable {
    AssetGroupTable {
        stablecoins: ["USDT", "USDC", "BUSD", "DAI"].map(String::from).to_vec(),
        tokenized_securities: ["LINK", "UNI", "AAVE"].map(String::from).to_vec(),
    }
}

/// Classifies `asset` using the profile's table.
///
/// An asset outside both tables must still be in the supported list to be
/// Group 2; otherwise it is rejected as unsupported.
pub fn classify(profile: &JurisdictionProfile, asset: &str) -> Result<AssetGroup, ValidationError> {
    let unsupported = || ValidationError::UnsupportedAsset {
        asset: asset.to_string(),
        country: profile.country_code.to_string(),
    };

    let table = profile.asset_groups.as_ref().ok_or_else(unsupported)?;
    let listed = |list: &[String]| list.iter().any(|a| a.eq_ignore_ascii_case(asset));

    if listed(&table.stablecoins) {
        Ok(AssetGroup::Group1b)
    } else if listed(&table.tokenized_securities) {
        Ok(AssetGroup::Group1a)
    } else if profile.supports(asset) {
        Ok(AssetGroup::Group2)
    } else {
        Err(unsupported())
    }
}

/// Share of CET1 capital a regulated custodial institution may hold per group.
pub fn exposure_ratio(group: AssetGroup) -> Decimal {
    match group {
        AssetGroup::Group1a => dec!(0.05),
        AssetGroup::Group1b => dec!(0.03),
        AssetGroup::Group2 => Decimal::ZERO,
    }
}

/// Maximum exposure to `group` for the given capital base.
pub fn exposure_limit(group: AssetGroup, capital_base: Decimal) -> Decimal {
    capital_base * exposure_ratio(group)
}

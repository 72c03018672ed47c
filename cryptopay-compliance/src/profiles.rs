//! Static jurisdiction profiles.
//!
//! All thresholds and limits are denominated in the jurisdiction's own fiat
//! currency, in major units.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use cryptopay_types::{CountryCode, JurisdictionProfile, KycRequirements};

use crate::classifier;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn profile(
    code: &str,
    name: &str,
    currency: &str,
    regulators: &[&str],
    kyc_threshold: Decimal,
    daily: Decimal,
    monthly: Decimal,
    supported: &[&str],
    tax_rate: Decimal,
) -> JurisdictionProfile {
    JurisdictionProfile {
        country_code: CountryCode::new(code),
        country_name: name.to_string(),
        currency_code: currency.to_string(),
        regulators: strings(regulators),
        kyc_threshold,
        daily_limit: daily,
        monthly_limit: monthly,
        supported_cryptocurrencies: strings(supported),
        tax_rate,
        travel_rule_threshold: None,
        asset_groups: None,
        kyc_requirements: KycRequirements::default(),
    }
}

fn checklist(individual: &[&str], business: &[&str]) -> KycRequirements {
    KycRequirements {
        individual: strings(individual),
        business: strings(business),
    }
}

pub fn brunei() -> JurisdictionProfile {
    JurisdictionProfile {
        kyc_requirements: checklist(
            &[
                "Full Name",
                "National ID or Passport",
                "Date of Birth",
                "Residential Address",
                "Contact Information",
                "Source of Funds",
            ],
            &[
                "Business Name",
                "Business Registration Number",
                "Business Address",
                "Director Information",
                "Shareholder Information",
                "Source of Funds",
            ],
        ),
        ..profile(
            "BN",
            "Brunei Darussalam",
            "BND",
            &["Autoriti Monetari Brunei Darussalam (AMBD)"],
            dec!(5000),
            dec!(50000),
            dec!(500000),
            &["BTC", "ETH", "USDT", "BNB"],
            Decimal::ZERO,
        )
    }
}

pub fn cambodia() -> JurisdictionProfile {
    JurisdictionProfile {
        asset_groups: Some(classifier::standard_groups()),
        kyc_requirements: checklist(
            &[
                "Full Name",
                "National ID or Passport",
                "Date of Birth",
                "Residential Address",
                "Contact Information",
                "Source of Funds",
                "Occupation",
            ],
            &[
                "Business Name",
                "Business Registration Number",
                "Business Address",
                "Director Information",
                "Shareholder Information",
                "Source of Funds",
                "Business Activities",
            ],
        ),
        ..profile(
            "KH",
            "Cambodia",
            "KHR",
            &["National Bank of Cambodia (NBC)"],
            dec!(4000000),
            dec!(40000000),
            dec!(400000000),
            &["BTC", "ETH", "USDT", "USDC", "BNB"],
            dec!(0.20),
        )
    }
}

pub fn indonesia() -> JurisdictionProfile {
    JurisdictionProfile {
        asset_groups: Some(classifier::standard_groups()),
        kyc_requirements: checklist(
            &[
                "Full Name",
                "National ID Number (KTP)",
                "Tax Identification Number (NPWP)",
                "Date of Birth",
                "Residential Address",
                "Contact Information",
                "Source of Funds",
                "Occupation",
            ],
            &[
                "Business Name",
                "Business Registration Number (NIB)",
                "Tax Identification Number (NPWP)",
                "Business Address",
                "Director Information",
                "Shareholder Information",
                "Source of Funds",
                "Business Activities",
            ],
        ),
        ..profile(
            "ID",
            "Indonesia",
            "IDR",
            &[
                "Commodity Futures Trading Regulatory Agency (Bappebti)",
                "Financial Services Authority (OJK)",
                "Bank Indonesia (BI)",
            ],
            dec!(2000000),
            dec!(100000000),
            dec!(1000000000),
            &[
                "BTC", "ETH", "USDT", "BNB", "ADA", "XRP", "DOGE", "DOT", "LINK", "UNI", "MATIC",
            ],
            dec!(0.001),
        )
    }
}

pub fn laos() -> JurisdictionProfile {
    JurisdictionProfile {
        kyc_requirements: checklist(
            &[
                "Full Name",
                "National ID or Passport",
                "Date of Birth",
                "Residential Address",
                "Contact Information",
                "Source of Funds",
                "Occupation",
            ],
            &[
                "Business Name",
                "Business Registration Number",
                "Business Address",
                "Director Information",
                "Shareholder Information",
                "Source of Funds",
                "Business Activities",
            ],
        ),
        ..profile(
            "LA",
            "Lao People's Democratic Republic",
            "LAK",
            &["Bank of the Lao PDR (BOL)"],
            dec!(9000000),
            dec!(50000000),
            dec!(500000000),
            &["BTC", "ETH", "USDT"],
            dec!(0.24),
        )
    }
}

pub fn malaysia() -> JurisdictionProfile {
    JurisdictionProfile {
        kyc_requirements: checklist(
            &[
                "Full Name",
                "National ID Number (MyKad)",
                "Date of Birth",
                "Residential Address",
                "Contact Information",
                "Source of Funds",
            ],
            &[
                "Business Name",
                "Business Registration Number",
                "Business Address",
                "Director Information",
                "Shareholder Information",
                "Source of Funds",
            ],
        ),
        ..profile(
            "MY",
            "Malaysia",
            "MYR",
            &[
                "Securities Commission Malaysia (SC)",
                "Bank Negara Malaysia (BNM)",
            ],
            dec!(3000),
            dec!(50000),
            dec!(500000),
            &["BTC", "ETH", "XRP", "BCH", "LTC", "BNB", "USDT"],
            dec!(0.24),
        )
    }
}

pub fn singapore() -> JurisdictionProfile {
    JurisdictionProfile {
        travel_rule_threshold: Some(dec!(1500)),
        kyc_requirements: checklist(
            &[
                "Full Name",
                "NRIC or Passport Number",
                "Date of Birth",
                "Nationality",
                "Residential Address",
                "Contact Information",
                "Source of Funds",
                "Occupation",
            ],
            &[
                "Business Name",
                "Unique Entity Number (UEN)",
                "Business Address",
                "Business Type",
                "Director Information",
                "Shareholder Information",
                "Source of Funds",
                "Business Activities",
            ],
        ),
        ..profile(
            "SG",
            "Singapore",
            "SGD",
            &["Monetary Authority of Singapore (MAS)"],
            dec!(1000),
            dec!(100000),
            dec!(1000000),
            &[
                "BTC", "ETH", "XRP", "LTC", "BCH", "USDT", "USDC", "BNB", "SOL", "ADA",
            ],
            dec!(0.08),
        )
    }
}

pub fn thailand() -> JurisdictionProfile {
    JurisdictionProfile {
        kyc_requirements: checklist(
            &[
                "Full Name",
                "National ID Card or Passport",
                "Date of Birth",
                "Residential Address",
                "Contact Information",
                "Source of Funds",
                "Occupation",
                "Facial Verification",
            ],
            &[
                "Business Name",
                "Business Registration Number",
                "Tax ID",
                "Business Address",
                "Director Information",
                "Shareholder Information",
                "Source of Funds",
                "Business Activities",
            ],
        ),
        ..profile(
            "TH",
            "Thailand",
            "THB",
            &[
                "Securities and Exchange Commission (SEC)",
                "Bank of Thailand (BOT)",
            ],
            dec!(50000),
            dec!(1000000),
            dec!(10000000),
            &["BTC", "ETH", "XRP", "USDT", "BNB", "ADA", "DOT", "SOL"],
            dec!(0.15),
        )
    }
}

pub fn vietnam() -> JurisdictionProfile {
    JurisdictionProfile {
        kyc_requirements: checklist(
            &[
                "Full Name",
                "National ID or Passport",
                "Date of Birth",
                "Residential Address",
                "Contact Information",
                "Source of Funds",
                "Occupation",
            ],
            &[
                "Business Name",
                "Business Registration Number",
                "Tax Identification Number",
                "Business Address",
                "Director Information",
                "Shareholder Information",
                "Source of Funds",
                "Business Activities",
            ],
        ),
        ..profile(
            "VN",
            "Vietnam",
            "VND",
            &["State Bank of Vietnam (SBV)", "Ministry of Finance (MOF)"],
            dec!(20000000),
            dec!(500000000),
            dec!(5000000000),
            &["BTC", "ETH", "USDT", "BNB"],
            dec!(0.20),
        )
    }
}

/// Every built-in profile, ordered by country code.
pub fn all() -> Vec<JurisdictionProfile> {
    vec![
        brunei(),
        indonesia(),
        cambodia(),
        laos(),
        malaysia(),
        singapore(),
        thailand(),
        vietnam(),
    ]
}

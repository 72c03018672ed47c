//! The per-jurisdiction compliance contract.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cryptopay_types::{
    AssetGroup, ComplianceReport, JurisdictionProfile, KycRequirements, Limits, Payment,
    ReportPeriod, ReportSpec, Transaction, ValidationError,
};

use crate::tax;

/// Regulatory rules for one jurisdiction.
///
/// Implementations are immutable after construction and shared across
/// threads by the registry.
pub trait ComplianceModule: Send + Sync + 'static {
    fn profile(&self) -> &JurisdictionProfile;

    /// Applies the jurisdiction's own rules.
    ///
    /// Generic checks (amount, supported asset, daily limit) have already
    /// passed when this is called.
    fn validate(&self, tx: &Transaction) -> Result<Clearance, ValidationError>;

    /// Asset group of `asset`, for jurisdictions that classify assets.
    fn classify(&self, _asset: &str) -> Result<Option<AssetGroup>, ValidationError> {
        Ok(None)
    }

    fn calculate_tax(&self, amount: Decimal) -> Decimal {
        tax::calculate_tax(amount, self.profile().tax_rate)
    }

    fn limits(&self) -> Limits {
        self.profile().limits()
    }

    fn kyc_requirements(&self) -> &KycRequirements {
        &self.profile().kyc_requirements
    }

    /// Regulator-mandated notice shown to customers.
    fn notice(&self) -> Option<String> {
        None
    }

    /// Reports the jurisdiction's regulators expect from the merchant.
    fn report_specs(&self) -> &'static [ReportSpec];

    /// Builds every regulatory report for `period` from this jurisdiction's
    /// archived payments.
    fn reports(&self, period: ReportPeriod, payments: &[Payment]) -> Vec<ComplianceReport> {
        self.report_specs()
            .iter()
            .map(|spec| spec.aggregate(period, payments))
            .collect()
    }
}

/// What a module attaches to an accepted transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clearance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_group: Option<AssetGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_rule: Option<TravelRuleRecord>,
}

/// Originator and beneficiary data attached to transfers above the
/// travel-rule threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelRuleRecord {
    pub originator: Party,
    pub beneficiary: Party,
    pub amount: Decimal,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
}

impl TravelRuleRecord {
    /// Names the merchant as beneficiary, receiving on `account`.
    pub fn with_beneficiary(
        mut self,
        merchant: Option<String>,
        account: impl Into<String>,
    ) -> Self {
        self.beneficiary = Party {
            name: merchant,
            email: None,
            account: Some(account.into()),
        };
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// Identity fields a jurisdiction demands once KYC applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdentityFields {
    Name,
    NameAndEmail,
}

/// Fails with `KycRequired` when the amount reaches the threshold and the
/// required identity fields are missing or blank.
pub(crate) fn require_identity(
    profile: &JurisdictionProfile,
    tx: &Transaction,
    fields: IdentityFields,
) -> Result<(), ValidationError> {
    if !profile.requires_kyc(tx.amount) {
        return Ok(());
    }

    let mut missing = Vec::new();
    if tx.customer_name().is_none() {
        missing.push("customer_name");
    }
    if fields == IdentityFields::NameAndEmail && tx.customer_email().is_none() {
        missing.push("customer_email");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::KycRequired {
            threshold: profile.kyc_threshold,
            currency: profile.currency_code.clone(),
            missing: missing.join(", "),
        })
    }
}

/// Fails with `RegulatoryBlock` when the merchant holds no licence in the
/// jurisdiction.
pub(crate) fn require_licence(
    profile: &JurisdictionProfile,
    licensed: bool,
) -> Result<(), ValidationError> {
    if licensed {
        return Ok(());
    }
    let regulator = profile
        .regulators
        .first()
        .map(String::as_str)
        .unwrap_or("the local regulator");
    Err(ValidationError::RegulatoryBlock(format!(
        "merchant is not licensed by {}",
        regulator
    )))
}

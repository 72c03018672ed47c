use rust_decimal::Decimal;

use cryptopay_types::{
    AssetGroup, JurisdictionProfile, ReportCadence, ReportSpec, Transaction, ValidationError,
};

use crate::classifier;
use crate::module::{
    Clearance, ComplianceModule, IdentityFields, require_identity, require_licence,
};
use crate::profiles;

/// Who is accepting the payment in Cambodia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstitutionKind {
    /// An ordinary merchant, no exposure caps
    #[default]
    Merchant,
    /// A regulated custodial institution with the given CET1 capital base (KHR)
    CommercialBank { cet1_capital: Decimal },
}

/// Cambodia classifies every asset and caps custodial exposures per group.
pub struct Cambodia {
    profile: JurisdictionProfile,
    licensed: bool,
    institution: InstitutionKind,
}

impl Cambodia {
    pub fn new(licensed: bool, institution: InstitutionKind) -> Self {
        Self {
            profile: profiles::cambodia(),
            licensed,
            institution,
        }
    }

    fn check_exposure(&self, group: AssetGroup, amount: Decimal) -> Result<(), ValidationError> {
        let InstitutionKind::CommercialBank { cet1_capital } = self.institution else {
            return Ok(());
        };

        if !group.is_group1() {
            return Err(ValidationError::RegulatoryBlock(format!(
                "commercial banks cannot hold {} exposures",
                group
            )));
        }

        let limit = classifier::exposure_limit(group, cet1_capital);
        if amount > limit {
            return Err(ValidationError::LimitExceeded { amount, limit });
        }
        Ok(())
    }
}

/// Reports filed with the regulators.
const REPORTS: &[ReportSpec] = &[
    ReportSpec::new("NBC_Quarterly_Report", "NBC", ReportCadence::Quarterly),
];

impl ComplianceModule for Cambodia {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }

    fn report_specs(&self) -> &'static [ReportSpec] {
        REPORTS
    }

    fn validate(&self, tx: &Transaction) -> Result<Clearance, ValidationError> {
        require_licence(&self.profile, self.licensed)?;
        let group = classifier::classify(&self.profile, &tx.crypto_currency)?;
        self.check_exposure(group, tx.amount)?;
        require_identity(&self.profile, tx, IdentityFields::Name)?;

        Ok(Clearance {
            asset_group: Some(group),
            travel_rule: None,
        })
    }

    fn classify(&self, asset: &str) -> Result<Option<AssetGroup>, ValidationError> {
        classifier::classify(&self.profile, asset).map(Some)
    }
}

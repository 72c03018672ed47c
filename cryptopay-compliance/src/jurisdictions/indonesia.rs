use cryptopay_types::{
    AssetGroup, JurisdictionProfile, ReportCadence, ReportSpec, Transaction, ValidationError,
};

use crate::classifier;
use crate::module::{
    Clearance, ComplianceModule, IdentityFields, require_identity, require_licence,
};
use crate::profiles;

pub struct Indonesia {
    profile: JurisdictionProfile,
    /// Merchant is registered with Bappebti and compliant with OJK rules
    registered: bool,
}

impl Indonesia {
    pub fn new(registered: bool) -> Self {
        Self {
            profile: profiles::indonesia(),
            registered,
        }
    }
}

/// Reports filed with the regulators.
const REPORTS: &[ReportSpec] = &[
    ReportSpec::new("Bappebti_Monthly_Report", "Bappebti", ReportCadence::Monthly),
    ReportSpec::new("OJK_Quarterly_Report", "OJK", ReportCadence::Quarterly),
];

impl ComplianceModule for Indonesia {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }

    fn report_specs(&self) -> &'static [ReportSpec] {
        REPORTS
    }

    fn validate(&self, tx: &Transaction) -> Result<Clearance, ValidationError> {
        require_licence(&self.profile, self.registered)?;
        let group = classifier::classify(&self.profile, &tx.crypto_currency)?;
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

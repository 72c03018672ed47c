use cryptopay_types::{
    JurisdictionProfile, ReportCadence, ReportSpec, Transaction, ValidationError,
};

use crate::module::{
    Clearance, ComplianceModule, IdentityFields, require_identity, require_licence,
};
use crate::profiles;

pub struct Malaysia {
    profile: JurisdictionProfile,
    /// Merchant is licensed by the Securities Commission
    licensed: bool,
}

impl Malaysia {
    pub fn new(licensed: bool) -> Self {
        Self {
            profile: profiles::malaysia(),
            licensed,
        }
    }
}

/// Reports filed with the regulators.
const REPORTS: &[ReportSpec] = &[
    ReportSpec::new("SC_Monthly_Report", "SC", ReportCadence::Monthly),
];

impl ComplianceModule for Malaysia {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }

    fn report_specs(&self) -> &'static [ReportSpec] {
        REPORTS
    }

    fn validate(&self, tx: &Transaction) -> Result<Clearance, ValidationError> {
        require_licence(&self.profile, self.licensed)?;
        require_identity(&self.profile, tx, IdentityFields::Name)?;
        Ok(Clearance::default())
    }
}

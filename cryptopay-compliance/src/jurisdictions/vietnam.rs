use chrono::{DateTime, TimeZone, Utc};

use cryptopay_types::{
    JurisdictionProfile, ReportCadence, ReportSpec, Transaction, ValidationError,
};

use crate::module::{
    Clearance, ComplianceModule, IdentityFields, require_identity, require_licence,
};
use crate::profiles;

pub struct Vietnam {
    profile: JurisdictionProfile,
    /// Merchant is registered with SBV and complies with MOF rules
    registered: bool,
}

impl Vietnam {
    pub fn new(registered: bool) -> Self {
        Self {
            profile: profiles::vietnam(),
            registered,
        }
    }
}

/// Status of the crypto regulatory framework at `at`.
pub fn regulatory_status(at: DateTime<Utc>) -> &'static str {
    let framework_start = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).single();
    match framework_start {
        Some(start) if at > start => {
            "New regulatory framework in effect. Please ensure compliance with updated SBV regulations."
        }
        _ => "Operating under transitional regulatory framework. New regulations expected in May 2025.",
    }
}

/// Reports filed with the regulators.
const REPORTS: &[ReportSpec] = &[
    ReportSpec::new("SBV_Monthly_Report", "SBV", ReportCadence::Monthly),
    ReportSpec::new("MOF_Quarterly_Report", "MOF", ReportCadence::Quarterly),
];

impl ComplianceModule for Vietnam {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }

    fn report_specs(&self) -> &'static [ReportSpec] {
        REPORTS
    }

    fn validate(&self, tx: &Transaction) -> Result<Clearance, ValidationError> {
        require_licence(&self.profile, self.registered)?;
        require_identity(&self.profile, tx, IdentityFields::Name)?;
        Ok(Clearance::default())
    }

    fn notice(&self) -> Option<String> {
        Some(regulatory_status(Utc::now()).to_string())
    }
}

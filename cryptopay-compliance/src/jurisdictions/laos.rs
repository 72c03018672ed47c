use chrono::Duration;

use cryptopay_types::{
    JurisdictionProfile, ReportCadence, ReportSpec, Transaction, ValidationError,
};

use crate::module::{
    Clearance, ComplianceModule, IdentityFields, require_identity, require_licence,
};
use crate::profiles;

/// Merchants idle for longer than this are suspended from the pilot.
pub const INACTIVITY_WINDOW_DAYS: i64 = 90;

/// Laos only accepts crypto payments from BOL-licensed pilot participants.
pub struct Laos {
    profile: JurisdictionProfile,
    licensed: bool,
    pilot_active: bool,
}

impl Laos {
    pub fn new(licensed: bool, pilot_active: bool) -> Self {
        Self {
            profile: profiles::laos(),
            licensed,
            pilot_active,
        }
    }
}

/// Reports filed with the regulators.
const REPORTS: &[ReportSpec] = &[
    ReportSpec::new("BOL_Pilot_Program_Report", "BOL", ReportCadence::Monthly),
];

impl ComplianceModule for Laos {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }

    fn report_specs(&self) -> &'static [ReportSpec] {
        REPORTS
    }

    fn validate(&self, tx: &Transaction) -> Result<Clearance, ValidationError> {
        require_licence(&self.profile, self.licensed)?;

        if !self.pilot_active {
            return Err(ValidationError::RegulatoryBlock(
                "the cryptocurrency pilot program in Laos is not active".into(),
            ));
        }

        if let Some(last_active) = tx.merchant_last_active {
            if tx.requested_at - last_active > Duration::days(INACTIVITY_WINDOW_DAYS) {
                return Err(ValidationError::RegulatoryBlock(format!(
                    "merchant inactive for more than {} days",
                    INACTIVITY_WINDOW_DAYS
                )));
            }
        }

        require_identity(&self.profile, tx, IdentityFields::Name)?;
        Ok(Clearance::default())
    }
}

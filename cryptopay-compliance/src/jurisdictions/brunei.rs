use cryptopay_types::{
    JurisdictionProfile, ReportCadence, ReportSpec, Transaction, ValidationError,
};

use crate::module::{
    Clearance, ComplianceModule, IdentityFields, require_identity, require_licence,
};
use crate::profiles;

/// Risk warning AMBD requires merchants to show before a crypto payment.
pub const WARNING_NOTICE: &str = "WARNING: Cryptocurrencies are not legal tender in Brunei \
Darussalam and are not regulated by Autoriti Monetari Brunei Darussalam (AMBD). Investments in \
cryptocurrency products involve risks including the potential loss of principal. Investors \
should be aware that cryptocurrency values can fluctuate and past performance is not indicative \
of future results.";

pub struct Brunei {
    profile: JurisdictionProfile,
    /// Merchant has notified AMBD
    notified: bool,
}

impl Brunei {
    pub fn new(notified: bool) -> Self {
        Self {
            profile: profiles::brunei(),
            notified,
        }
    }
}

/// Reports filed with the regulators.
const REPORTS: &[ReportSpec] = &[
    ReportSpec::new("AMBD_Notification", "AMBD", ReportCadence::Monthly),
];

impl ComplianceModule for Brunei {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }

    fn report_specs(&self) -> &'static [ReportSpec] {
        REPORTS
    }

    fn validate(&self, tx: &Transaction) -> Result<Clearance, ValidationError> {
        require_licence(&self.profile, self.notified)?;
        require_identity(&self.profile, tx, IdentityFields::Name)?;
        Ok(Clearance::default())
    }

    fn notice(&self) -> Option<String> {
        Some(WARNING_NOTICE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_brunei_exposes_warning() {
        let bn = Brunei::new(true);
        assert!(bn.notice().unwrap().contains("not legal tender"));
    }

    #[test]
    fn test_brunei_kyc_at_threshold() {
        let bn = Brunei::new(true);
        let tx = Transaction::new(dec!(5000), "BND", "BTC", "BN");
        assert!(matches!(
            bn.validate(&tx),
            Err(ValidationError::KycRequired { .. })
        ));
        let tx = Transaction::new(dec!(4999), "BND", "BTC", "BN");
        assert!(bn.validate(&tx).is_ok());
    }

    #[test]
    fn test_brunei_has_no_tax() {
        assert_eq!(Brunei::new(true).calculate_tax(dec!(1000)), dec!(0));
    }
}

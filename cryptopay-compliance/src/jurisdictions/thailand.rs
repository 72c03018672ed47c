use cryptopay_types::{
    JurisdictionProfile, ReportCadence, ReportSpec, Transaction, ValidationError,
};

use crate::module::{
    Clearance, ComplianceModule, IdentityFields, require_identity, require_licence,
};
use crate::profiles;

/// Declared purposes that amount to paying for goods or services with crypto.
pub const RESTRICTED_PURPOSES: [&str; 5] = ["payment", "purchase", "goods", "services", "bill"];

pub struct Thailand {
    profile: JurisdictionProfile,
    /// Merchant is licensed by the SEC and compliant with BOT rules
    licensed: bool,
}

impl Thailand {
    pub fn new(licensed: bool) -> Self {
        Self {
            profile: profiles::thailand(),
            licensed,
        }
    }
}

/// Returns true if `purpose` is a direct payment for goods or services.
pub fn is_restricted_purpose(purpose: &str) -> bool {
    let purpose = purpose.trim();
    RESTRICTED_PURPOSES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(purpose))
}

/// Reports filed with the regulators.
const REPORTS: &[ReportSpec] = &[
    ReportSpec::new("SEC_Monthly_Report", "SEC", ReportCadence::Monthly),
    ReportSpec::new("BOT_Quarterly_Report", "BOT", ReportCadence::Quarterly),
];

impl ComplianceModule for Thailand {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }

    fn report_specs(&self) -> &'static [ReportSpec] {
        REPORTS
    }

    fn validate(&self, tx: &Transaction) -> Result<Clearance, ValidationError> {
        require_licence(&self.profile, self.licensed)?;

        // Checked before KYC so the restriction holds at every amount.
        if tx.purpose.as_deref().is_some_and(is_restricted_purpose) {
            return Err(ValidationError::RegulatoryBlock(
                "using cryptocurrency as a means of payment is restricted in Thailand".into(),
            ));
        }

        require_identity(&self.profile, tx, IdentityFields::Name)?;
        Ok(Clearance::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_purpose_blocked_at_any_amount() {
        let th = Thailand::new(true);
        for amount in [dec!(1), dec!(49999), dec!(50000), dec!(999999)] {
            let tx = Transaction::new(amount, "THB", "BTC", "TH")
                .with_customer(Some("Somchai".into()), None)
                .with_purpose("payment");
            assert!(matches!(
                th.validate(&tx),
                Err(ValidationError::RegulatoryBlock(_))
            ));
        }
    }

    #[test]
    fn test_restricted_purpose_is_case_insensitive() {
        assert!(is_restricted_purpose("Purchase"));
        assert!(is_restricted_purpose(" BILL "));
        assert!(!is_restricted_purpose("investment"));
    }

    #[test]
    fn test_investment_purpose_allowed() {
        let th = Thailand::new(true);
        let tx = Transaction::new(dec!(1000), "THB", "ETH", "TH").with_purpose("investment");
        assert!(th.validate(&tx).is_ok());
    }
}

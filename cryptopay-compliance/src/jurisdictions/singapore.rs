use cryptopay_types::{
    JurisdictionProfile, ReportCadence, ReportSpec, Transaction, ValidationError,
};

use crate::module::{
    Clearance, ComplianceModule, IdentityFields, Party, TravelRuleRecord, require_identity,
    require_licence,
};
use crate::profiles;

/// Singapore requires both name and email once KYC applies, and attaches
/// travel-rule data to transfers at or above the travel-rule threshold.
pub struct Singapore {
    profile: JurisdictionProfile,
    /// Merchant is MAS licensed under the Payment Services Act
    licensed: bool,
}

impl Singapore {
    pub fn new(licensed: bool) -> Self {
        Self {
            profile: profiles::singapore(),
            licensed,
        }
    }

    /// Builds the travel-rule record, or `None` below the threshold.
    pub fn travel_rule_data(&self, tx: &Transaction) -> Option<TravelRuleRecord> {
        let threshold = self.profile.travel_rule_threshold?;
        if tx.amount < threshold {
            return None;
        }

        Some(TravelRuleRecord {
            originator: Party {
                name: tx.customer_name().map(str::to_string),
                email: tx.customer_email().map(str::to_string),
                account: tx.source_address.clone(),
            },
            beneficiary: Party {
                account: tx.destination_address.clone(),
                ..Party::default()
            },
            amount: tx.amount,
            currency: tx.currency.clone(),
            timestamp: tx.requested_at,
        })
    }
}

/// Reports filed with the regulators.
const REPORTS: &[ReportSpec] = &[
    ReportSpec::new("MAS_Quarterly_Report", "MAS", ReportCadence::Quarterly),
    ReportSpec::travel_rule("Travel_Rule_Compliance_Report", "MAS"),
];

impl ComplianceModule for Singapore {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }

    fn report_specs(&self) -> &'static [ReportSpec] {
        REPORTS
    }

    fn validate(&self, tx: &Transaction) -> Result<Clearance, ValidationError> {
        require_licence(&self.profile, self.licensed)?;
        require_identity(&self.profile, tx, IdentityFields::NameAndEmail)?;

        let travel_rule = self.travel_rule_data(tx);
        if travel_rule.is_some() {
            tracing::debug!(amount = %tx.amount, "Travel rule applies");
        }

        Ok(Clearance {
            asset_group: None,
            travel_rule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn identified(amount: rust_decimal::Decimal) -> Transaction {
        Transaction::new(amount, "SGD", "BTC", "SG")
            .with_customer(Some("Alice Tan".into()), Some("alice@example.com".into()))
    }

    #[test]
    fn test_singapore_requires_name_and_email() {
        let sg = Singapore::new(true);
        let tx = Transaction::new(dec!(1200), "SGD", "BTC", "SG")
            .with_customer(Some(String::new()), Some(String::new()));
        match sg.validate(&tx) {
            Err(ValidationError::KycRequired { missing, .. }) => {
                assert_eq!(missing, "customer_name, customer_email");
            }
            other => panic!("expected KycRequired, got {:?}", other),
        }
    }

    #[test]
    fn test_travel_rule_below_threshold() {
        let sg = Singapore::new(true);
        let clearance = sg.validate(&identified(dec!(1499.99))).unwrap();
        assert!(clearance.travel_rule.is_none());
    }

    #[test]
    fn test_travel_rule_at_threshold() {
        let sg = Singapore::new(true);
        let mut tx = identified(dec!(1500));
        tx.source_address = Some("bc1qsource".into());

        let record = sg.validate(&tx).unwrap().travel_rule.unwrap();
        assert_eq!(record.originator.name.as_deref(), Some("Alice Tan"));
        assert_eq!(record.originator.account.as_deref(), Some("bc1qsource"));
        assert_eq!(record.amount, dec!(1500));
        assert_eq!(record.currency, "SGD");
    }
}

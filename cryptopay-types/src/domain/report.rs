//! Regulatory report domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::payment::{Payment, PaymentStatus};

/// Half-open reporting window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportPeriod {
    /// Returns `None` unless `start` is strictly before `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportCadence {
    Monthly,
    Quarterly,
}

/// Which payments a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportScope {
    AllPayments,
    /// Only payments carrying a travel-rule record
    TravelRule,
}

/// A report a regulator expects from the merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSpec {
    pub report_type: &'static str,
    pub regulator: &'static str,
    pub cadence: ReportCadence,
    pub scope: ReportScope,
}

impl ReportSpec {
    pub const fn new(
        report_type: &'static str,
        regulator: &'static str,
        cadence: ReportCadence,
    ) -> Self {
        Self {
            report_type,
            regulator,
            cadence,
            scope: ReportScope::AllPayments,
        }
    }

    pub const fn travel_rule(report_type: &'static str, regulator: &'static str) -> Self {
        Self {
            report_type,
            regulator,
            cadence: ReportCadence::Monthly,
            scope: ReportScope::TravelRule,
        }
    }

    fn covers(&self, payment: &Payment) -> bool {
        match self.scope {
            ReportScope::AllPayments => true,
            ReportScope::TravelRule => payment.travel_rule.is_some(),
        }
    }

    /// Aggregates `payments` for this report over `period`.
    ///
    /// Totals only count completed payments; the status counters cover
    /// everything in scope.
    pub fn aggregate(&self, period: ReportPeriod, payments: &[Payment]) -> ComplianceReport {
        let mut report = ComplianceReport {
            report_type: self.report_type.to_string(),
            regulator: self.regulator.to_string(),
            cadence: self.cadence,
            period,
            payment_count: 0,
            completed_count: 0,
            cancelled_count: 0,
            expired_count: 0,
            completed_volume: Decimal::ZERO,
            tax_collected: Decimal::ZERO,
            travel_rule_count: 0,
        };

        for payment in payments
            .iter()
            .filter(|p| period.contains(p.created_at) && self.covers(p))
        {
            report.payment_count += 1;
            if payment.travel_rule.is_some() {
                report.travel_rule_count += 1;
            }
            match payment.status {
                PaymentStatus::Completed => {
                    report.completed_count += 1;
                    report.completed_volume += payment.amount;
                    report.tax_collected += payment.tax_amount;
                }
                PaymentStatus::Cancelled => report.cancelled_count += 1,
                PaymentStatus::Expired => report.expired_count += 1,
                PaymentStatus::Created | PaymentStatus::Pending => {}
            }
        }
        report
    }
}

/// Aggregated figures for one regulatory report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ComplianceReport {
    #[schema(example = "SEC_Monthly_Report")]
    pub report_type: String,
    pub regulator: String,
    pub cadence: ReportCadence,
    pub period: ReportPeriod,
    pub payment_count: u64,
    pub completed_count: u64,
    pub cancelled_count: u64,
    pub expired_count: u64,
    /// Fiat volume of completed payments
    #[schema(value_type = String, example = "1500.00")]
    pub completed_volume: Decimal,
    #[schema(value_type = String, example = "120.00")]
    pub tax_collected: Decimal,
    pub travel_rule_count: u64,
}

//! # Cryptopay Compliance
//!
//! Jurisdiction-pluggable transaction validation.
//!
//! - `profiles` - static parameters for each supported jurisdiction
//! - `module` - the `ComplianceModule` contract every jurisdiction implements
//! - `jurisdictions/` - one module per country
//! - `registry` - immutable country code to module lookup
//! - `classifier` - asset grouping and exposure caps
//! - `validator` - the ordered validation pipeline used by the service

pub mod classifier;
pub mod jurisdictions;
pub mod module;
pub mod profiles;
pub mod registry;
pub mod tax;
pub mod validator;

pub use jurisdictions::InstitutionKind;
pub use module::{Clearance, ComplianceModule, Party, TravelRuleRecord};
pub use registry::{ComplianceRegistry, JurisdictionSettings, RegistryBuilder};
pub use tax::calculate_tax;
pub use validator::{Accepted, TransactionValidator};

//! One compliance module per supported jurisdiction.

mod brunei;
mod cambodia;
mod indonesia;
mod laos;
mod malaysia;
mod singapore;
mod thailand;
mod vietnam;

pub use brunei::Brunei;
pub use cambodia::{Cambodia, InstitutionKind};
pub use indonesia::Indonesia;
pub use laos::Laos;
pub use malaysia::Malaysia;
pub use singapore::Singapore;
pub use thailand::{Thailand, is_restricted_purpose};
pub use vietnam::{Vietnam, regulatory_status};

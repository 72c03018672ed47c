//! Country code to compliance module lookup.

use std::collections::{HashMap, HashSet};

use cryptopay_types::{CountryCode, ValidationError};

use crate::jurisdictions::{
    Brunei, Cambodia, Indonesia, InstitutionKind, Laos, Malaysia, Singapore, Thailand, Vietnam,
};
use crate::module::ComplianceModule;

/// Merchant-specific inputs to the built-in modules.
#[derive(Debug, Clone)]
pub struct JurisdictionSettings {
    /// Whether the Laos crypto pilot program is running
    pub laos_pilot_active: bool,
    /// Jurisdictions where the merchant holds no licence or registration
    pub unlicensed: HashSet<CountryCode>,
    pub cambodia_institution: InstitutionKind,
}

impl Default for JurisdictionSettings {
    fn default() -> Self {
        Self {
            laos_pilot_active: true,
            unlicensed: HashSet::new(),
            cambodia_institution: InstitutionKind::Merchant,
        }
    }
}

impl JurisdictionSettings {
    fn licensed(&self, code: &str) -> bool {
        !self.unlicensed.contains(&CountryCode::new(code))
    }
}

/// Immutable registry of compliance modules, built once at startup.
///
/// Reads need no locking; share it behind an `Arc`.
pub struct ComplianceRegistry {
    modules: HashMap<CountryCode, Box<dyn ComplianceModule>>,
}

impl ComplianceRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry with all eight built-in jurisdictions.
    pub fn standard(settings: &JurisdictionSettings) -> Self {
        Self::builder()
            .register(Brunei::new(settings.licensed("BN")))
            .register(Cambodia::new(
                settings.licensed("KH"),
                settings.cambodia_institution,
            ))
            .register(Indonesia::new(settings.licensed("ID")))
            .register(Laos::new(
                settings.licensed("LA"),
                settings.laos_pilot_active,
            ))
            .register(Malaysia::new(settings.licensed("MY")))
            .register(Singapore::new(settings.licensed("SG")))
            .register(Thailand::new(settings.licensed("TH")))
            .register(Vietnam::new(settings.licensed("VN")))
            .build()
    }

    /// Looks up a module; the code is matched case-insensitively.
    pub fn get(&self, code: &str) -> Result<&dyn ComplianceModule, ValidationError> {
        let key = CountryCode::new(code);
        self.modules
            .get(&key)
            .map(|m| m.as_ref())
            .ok_or_else(|| ValidationError::UnknownJurisdiction(key.to_string()))
    }

    /// Registered country codes, sorted.
    pub fn codes(&self) -> Vec<CountryCode> {
        let mut codes: Vec<_> = self.modules.keys().cloned().collect();
        codes.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        codes
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    modules: HashMap<CountryCode, Box<dyn ComplianceModule>>,
}

impl RegistryBuilder {
    /// Adds a module, replacing any earlier one for the same country.
    pub fn register(mut self, module: impl ComplianceModule) -> Self {
        let code = module.profile().country_code.clone();
        self.modules.insert(code, Box::new(module));
        self
    }

    pub fn build(self) -> ComplianceRegistry {
        ComplianceRegistry {
            modules: self.modules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_has_all_jurisdictions() {
        let registry = ComplianceRegistry::standard(&JurisdictionSettings::default());
        let codes: Vec<String> = registry
            .codes()
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(codes, ["BN", "ID", "KH", "LA", "MY", "SG", "TH", "VN"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ComplianceRegistry::standard(&JurisdictionSettings::default());
        assert_eq!(registry.get("sg").unwrap().profile().currency_code, "SGD");
    }

    #[test]
    fn test_every_jurisdiction_files_reports() {
        let registry = ComplianceRegistry::standard(&JurisdictionSettings::default());
        for code in registry.codes() {
            let module = registry.get(code.as_str()).unwrap();
            assert!(!module.report_specs().is_empty(), "{} has no reports", code);
        }

        let thailand: Vec<&str> = registry
            .get("TH")
            .unwrap()
            .report_specs()
            .iter()
            .map(|spec| spec.report_type)
            .collect();
        assert_eq!(thailand, ["SEC_Monthly_Report", "BOT_Quarterly_Report"]);
    }

    #[test]
    fn test_unknown_jurisdiction() {
        let registry = ComplianceRegistry::standard(&JurisdictionSettings::default());
        assert_eq!(
            registry.get("jp").err(),
            Some(ValidationError::UnknownJurisdiction("JP".into()))
        );
    }

    #[test]
    fn test_builder_registers_subset() {
        let registry = ComplianceRegistry::builder()
            .register(Singapore::new(true))
            .build();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("TH").is_err());
    }
}

//! Device selection criteria.
//!
//! A [`Criteria`] list is an OR of [`Criterion`] objects; every predicate set
//! inside one criterion must hold (AND). An empty list, or a criterion with no
//! predicates, matches every device.

use serde::{Deserialize, Serialize};

/// Attributes a device advertises during discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAdvertisement {
    pub name: String,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub fw_version: Option<String>,
    #[serde(default)]
    pub owner_signature: Option<String>,
    #[serde(default)]
    pub product_code: Option<u16>,
    /// Device is waiting to be adopted into a network.
    #[serde(default)]
    pub adoption_mode: bool,
    /// Device speaks the legacy service layout.
    #[serde(default)]
    pub legacy: bool,
}

/// One AND-set of optional predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    /// Firmware version, e.g. `0.10.2`; a leading `!` negates the match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fw_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adoption_flag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy: Option<bool>,
}

impl Criterion {
    /// Criterion matching a device name exactly.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Criterion matching a device name prefix.
    pub fn name_prefix(prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// Add a firmware version predicate.
    pub fn with_fw_version(mut self, version: impl Into<String>) -> Self {
        self.fw_version = Some(version.into());
        self
    }

    /// Add an owner signature predicate.
    pub fn with_owner_signature(mut self, signature: impl Into<String>) -> Self {
        self.owner_signature = Some(signature.into());
        self
    }

    /// Add a product code predicate.
    pub fn with_product_code(mut self, code: u16) -> Self {
        self.product_code = Some(code);
        self
    }

    /// Add an adoption-mode predicate.
    pub fn with_adoption_flag(mut self, flag: bool) -> Self {
        self.adoption_flag = Some(flag);
        self
    }

    /// Add a legacy-device predicate.
    pub fn with_legacy(mut self, legacy: bool) -> Self {
        self.legacy = Some(legacy);
        self
    }

    /// True when the device satisfies every predicate present.
    pub fn matches(&self, device: &DeviceAdvertisement) -> bool {
        if let Some(name) = &self.name {
            if device.name != *name {
                return false;
            }
        }
        if let Some(prefix) = &self.name_prefix {
            if !device.name.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(wanted) = &self.fw_version {
            let Some(actual) = device.fw_version.as_deref() else {
                return false;
            };
            let (negated, wanted) = match wanted.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, wanted.as_str()),
            };
            if (core_version(actual) == core_version(wanted)) == negated {
                return false;
            }
        }
        if let Some(signature) = &self.owner_signature {
            match device.owner_signature.as_deref() {
                Some(actual) if actual.eq_ignore_ascii_case(signature) => {}
                _ => return false,
            }
        }
        if let Some(code) = self.product_code {
            if device.product_code != Some(code) {
                return false;
            }
        }
        if let Some(flag) = self.adoption_flag {
            if device.adoption_mode != flag {
                return false;
            }
        }
        if let Some(legacy) = self.legacy {
            if device.legacy != legacy {
                return false;
            }
        }
        true
    }
}

/// Ordered OR-list of criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(Vec<Criterion>);

impl Criteria {
    /// Criteria matching any device.
    pub fn any() -> Self {
        Self(Vec::new())
    }

    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self(criteria)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the device satisfies all predicates of at least one criterion.
    pub fn matches(&self, device: &DeviceAdvertisement) -> bool {
        self.0.is_empty() || self.0.iter().any(|criterion| criterion.matches(device))
    }
}

impl From<Vec<Criterion>> for Criteria {
    fn from(criteria: Vec<Criterion>) -> Self {
        Self(criteria)
    }
}

impl From<Criterion> for Criteria {
    fn from(criterion: Criterion) -> Self {
        Self(vec![criterion])
    }
}

/// Strip vendor prefix and build suffix: `UNKNOWN_0.10.2_20240101` -> `0.10.2`.
fn core_version(version: &str) -> &str {
    version
        .split('_')
        .find(|part| {
            part.split('.').count() == 3
                && part.split('.').all(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        })
        .unwrap_or(version)
}

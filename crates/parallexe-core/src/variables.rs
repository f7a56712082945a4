//! Layered variable resolution
//!
//! Variables come in three tiers. For a given host the global tier is applied
//! first, then the tier of each group the host belongs to (in the host's group
//! order), then the host's own tier. Later tiers override earlier ones key by
//! key; keys that are not overridden survive.

use crate::host::HostConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// A flat set of variables
pub type VariableMap = BTreeMap<String, Value>;

/// Global, per-group and per-host variable overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableTiers {
    /// Variables for every host
    #[serde(default)]
    pub global: VariableMap,
    /// Variables for hosts of a group, overriding `global`
    #[serde(default)]
    pub groups: HashMap<String, VariableMap>,
    /// Variables for one host, overriding groups and `global`
    #[serde(default)]
    pub hosts: HashMap<String, VariableMap>,
}

impl VariableTiers {
    /// Flatten the tiers for `host`
    pub fn resolve(&self, host: &HostConfig) -> VariableMap {
        let mut variables = self.global.clone();

        for group in &host.groups {
            if let Some(tier) = self.groups.get(group) {
                merge(&mut variables, tier);
            }
        }

        if let Some(tier) = self.hosts.get(&host.host) {
            merge(&mut variables, tier);
        }

        variables
    }
}

/// Flatten `tiers` for `host`; no tiers resolve to an empty map
pub fn resolve_variables(host: &HostConfig, tiers: Option<&VariableTiers>) -> VariableMap {
    tiers.map(|tiers| tiers.resolve(host)).unwrap_or_default()
}

fn merge(destination: &mut VariableMap, source: &VariableMap) {
    for (key, value) in source {
        destination.insert(key.clone(), value.clone());
    }
}

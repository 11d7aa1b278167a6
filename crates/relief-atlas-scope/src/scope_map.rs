// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::ScopeError;
use relief_atlas_model::{ScopePredicate, StateCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeGrant {
    Unrestricted,
    States(BTreeSet<StateCode>),
}

#[derive(Debug, Clone, Default)]
pub struct ScopeMap {
    entries: BTreeMap<String, ScopeGrant>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeMapConfig {
    pub selections: BTreeMap<String, Vec<String>>,
}

fn normalize_selection(token: &str) -> String {
    token.trim().to_ascii_lowercase()
}

impl ScopeMap {
    #[must_use]
    pub fn builtin_defaults() -> Self {
        let mut map = Self::default();
        map.insert_states("florida", &["FL"]);
        map.insert_states("nebraska-iowa", &["NE", "IA"]);
        map.entries
            .insert("national".to_string(), ScopeGrant::Unrestricted);
        map
    }

    fn insert_states(&mut self, token: &str, codes: &[&str]) {
        let states = codes
            .iter()
            .map(|c| StateCode::parse(c).expect("builtin state code"))
            .collect();
        self.entries
            .insert(normalize_selection(token), ScopeGrant::States(states));
    }

    pub fn from_config_file(path: &Path) -> Result<Self, ScopeError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ScopeError::Config(format!("read {}: {e}", path.display())))?;
        let config: ScopeMapConfig =
            serde_json::from_str(&raw).map_err(|e| ScopeError::Config(e.to_string()))?;
        let mut map = Self::builtin_defaults();
        for (token, codes) in config.selections {
            let normalized = normalize_selection(&token);
            if normalized.is_empty() {
                return Err(ScopeError::InvalidGrant(
                    "selection token must not be empty".to_string(),
                ));
            }
            if codes.iter().any(|c| c == "*") {
                map.entries.insert(normalized, ScopeGrant::Unrestricted);
                continue;
            }
            if codes.is_empty() {
                return Err(ScopeError::InvalidGrant(format!(
                    "selection `{token}` grants no states"
                )));
            }
            let states = codes
                .iter()
                .map(|c| {
                    StateCode::parse(c)
                        .map_err(|e| ScopeError::InvalidGrant(format!("selection `{token}`: {e}")))
                })
                .collect::<Result<BTreeSet<_>, _>>()?;
            map.entries.insert(normalized, ScopeGrant::States(states));
        }
        Ok(map)
    }

    #[must_use]
    pub fn grant(&self, selection: &str) -> Option<&ScopeGrant> {
        self.entries.get(&normalize_selection(selection))
    }

    #[must_use]
    pub fn selections(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

pub fn resolve_scope(map: &ScopeMap, selection: &str) -> Result<ScopePredicate, ScopeError> {
    match map.grant(selection) {
        Some(ScopeGrant::Unrestricted) => Ok(ScopePredicate::Unrestricted),
        Some(ScopeGrant::States(states)) => {
            if states.is_empty() {
                return Err(ScopeError::InvalidGrant(format!(
                    "selection `{selection}` grants no states"
                )));
            }
            Ok(ScopePredicate::RestrictedToStates(states.clone()))
        }
        None => Err(ScopeError::UnknownSelection(selection.trim().to_string())),
    }
}

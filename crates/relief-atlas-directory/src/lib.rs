// SPDX-License-Identifier: Apache-2.0

//! Geographic Directory: read-only lookups over a built hierarchy. The
//! directory either wraps an in-memory hierarchy or loads a published
//! artifact with full verification (lock seal, manifest strictness,
//! checksums, structural invariants) before serving a single query.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use relief_atlas_model::{
    artifact_paths, verify_expected_sha256, ArtifactManifest, Chapter, CountyRef, GeoHierarchy,
    ManifestLock, StateAggregate, StateCode,
};
use unicode_normalization::UnicodeNormalization;

pub const CRATE_NAME: &str = "relief-atlas-directory";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryError(pub String);

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DirectoryError {}

#[must_use]
pub fn normalize_name_lookup(input: &str) -> String {
    input.nfkc().collect::<String>().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionSummary {
    pub name: String,
    pub code: Option<String>,
    pub region_count: u64,
    pub state_count: u64,
    pub county_count: u64,
}

#[derive(Debug)]
pub struct GeoDirectory {
    hierarchy: GeoHierarchy,
}

impl GeoDirectory {
    pub fn from_hierarchy(hierarchy: GeoHierarchy) -> Result<Self, DirectoryError> {
        hierarchy
            .validate()
            .map_err(|e| DirectoryError(format!("hierarchy failed validation: {e}")))?;
        Ok(Self { hierarchy })
    }

    pub fn load(root: &Path) -> Result<Self, DirectoryError> {
        let paths = artifact_paths(root);
        let manifest_bytes = read(&paths.manifest)?;
        let hierarchy_bytes = read(&paths.hierarchy)?;
        let report_bytes = read(&paths.report)?;

        let lock: ManifestLock = serde_json::from_slice(&read(&paths.manifest_lock)?)
            .map_err(|e| DirectoryError(format!("decode manifest.lock: {e}")))?;
        lock.validate(&manifest_bytes, &hierarchy_bytes)
            .map_err(DirectoryError)?;

        let manifest: ArtifactManifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| DirectoryError(format!("decode manifest: {e}")))?;
        manifest
            .validate_strict()
            .map_err(|e| DirectoryError(e.to_string()))?;
        verify_expected_sha256(&hierarchy_bytes, &manifest.checksums.hierarchy_sha256)
            .map_err(DirectoryError)?;
        verify_expected_sha256(&report_bytes, &manifest.checksums.report_sha256)
            .map_err(DirectoryError)?;

        let hierarchy: GeoHierarchy = serde_json::from_slice(&hierarchy_bytes)
            .map_err(|e| DirectoryError(format!("decode hierarchy: {e}")))?;
        manifest
            .validate_against(&hierarchy)
            .map_err(|e| DirectoryError(e.to_string()))?;
        Self::from_hierarchy(hierarchy)
    }

    #[must_use]
    pub fn hierarchy(&self) -> &GeoHierarchy {
        &self.hierarchy
    }

    #[must_use]
    pub fn regions_in_state(&self, state: &StateCode) -> BTreeSet<&str> {
        self.hierarchy
            .regions
            .values()
            .filter(|region| region.states.contains(state))
            .map(|region| region.name.as_str())
            .collect()
    }

    #[must_use]
    pub fn chapters_in_state(&self, state: &StateCode) -> BTreeSet<&str> {
        self.hierarchy
            .states
            .get(state)
            .map(|aggregate| aggregate.chapters.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn counties_of(&self, chapter_name: &str) -> Option<&[CountyRef]> {
        self.hierarchy
            .chapters
            .get(chapter_name)
            .map(|chapter| chapter.counties.as_slice())
    }

    #[must_use]
    pub fn all_divisions(&self) -> Vec<DivisionSummary> {
        self.hierarchy
            .divisions
            .values()
            .map(|division| DivisionSummary {
                name: division.name.clone(),
                code: division.code.clone(),
                region_count: division.regions.len() as u64,
                state_count: division.states.len() as u64,
                county_count: division.county_count,
            })
            .collect()
    }

    #[must_use]
    pub fn state_summary(&self, state: &StateCode) -> Option<&StateAggregate> {
        self.hierarchy.states.get(state)
    }

    #[must_use]
    pub fn chapter(&self, name: &str) -> Option<&Chapter> {
        self.hierarchy.chapters.get(name)
    }

    #[must_use]
    pub fn chapter_lookup(&self, name: &str) -> Option<&Chapter> {
        if let Some(chapter) = self.hierarchy.chapters.get(name) {
            return Some(chapter);
        }
        let wanted = normalize_name_lookup(name);
        self.hierarchy
            .chapters
            .values()
            .find(|chapter| normalize_name_lookup(&chapter.name) == wanted)
    }
}

fn read(path: &Path) -> Result<Vec<u8>, DirectoryError> {
    fs::read(path).map_err(|e| DirectoryError(format!("read {}: {e}", path.display())))
}

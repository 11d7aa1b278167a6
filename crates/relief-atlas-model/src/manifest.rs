// SPDX-License-Identifier: Apache-2.0

use relief_atlas_core::sha256_hex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::county::ValidationError;
use crate::hierarchy::GeoHierarchy;

pub const HIERARCHY_FILE: &str = "hierarchy.json";
pub const REPORT_FILE: &str = "build_report.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_LOCK_FILE: &str = "manifest.lock";
pub const PUBLISH_LOCK_FILE: &str = ".publish.lock";

pub const ARTIFACT_VERSION: &str = "v1";
pub const SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub root: PathBuf,
    pub hierarchy: PathBuf,
    pub report: PathBuf,
    pub manifest: PathBuf,
    pub manifest_lock: PathBuf,
    pub publish_lock: PathBuf,
}

#[must_use]
pub fn artifact_paths(root: &Path) -> ArtifactPaths {
    ArtifactPaths {
        root: root.to_path_buf(),
        hierarchy: root.join(HIERARCHY_FILE),
        report: root.join(REPORT_FILE),
        manifest: root.join(MANIFEST_FILE),
        manifest_lock: root.join(MANIFEST_LOCK_FILE),
        publish_lock: root.join(PUBLISH_LOCK_FILE),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ArtifactChecksums {
    pub hierarchy_sha256: String,
    pub report_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ArtifactStats {
    pub county_total: u64,
    pub division_count: u64,
    pub region_count: u64,
    pub chapter_count: u64,
    pub state_count: u64,
    pub rejected_count: u64,
}

impl ArtifactStats {
    #[must_use]
    pub fn from_hierarchy(hierarchy: &GeoHierarchy, rejected_count: u64) -> Self {
        Self {
            county_total: hierarchy.county_total,
            division_count: hierarchy.divisions.len() as u64,
            region_count: hierarchy.regions.len() as u64,
            chapter_count: hierarchy.chapters.len() as u64,
            state_count: hierarchy.states.len() as u64,
            rejected_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactManifest {
    pub artifact_version: String,
    pub schema_version: String,
    pub checksums: ArtifactChecksums,
    pub stats: ArtifactStats,
    #[serde(default)]
    pub source_total: u64,
}

impl ArtifactManifest {
    #[must_use]
    pub fn new(checksums: ArtifactChecksums, stats: ArtifactStats, source_total: u64) -> Self {
        Self {
            artifact_version: ARTIFACT_VERSION.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            checksums,
            stats,
            source_total,
        }
    }

    pub fn validate_strict(&self) -> Result<(), ValidationError> {
        if self.artifact_version.trim().is_empty() {
            return Err(ValidationError(
                "artifact_version must not be empty".to_string(),
            ));
        }
        if self.schema_version.trim().is_empty() {
            return Err(ValidationError(
                "schema_version must not be empty".to_string(),
            ));
        }
        require_sha256("hierarchy_sha256", &self.checksums.hierarchy_sha256)?;
        require_sha256("report_sha256", &self.checksums.report_sha256)?;
        if self.stats.county_total == 0 {
            return Err(ValidationError(
                "manifest stats report zero counties; an empty hierarchy is not publishable"
                    .to_string(),
            ));
        }
        if self.stats.chapter_count == 0
            || self.stats.region_count == 0
            || self.stats.division_count == 0
            || self.stats.state_count == 0
        {
            return Err(ValidationError(
                "manifest stats must count at least one division, region, chapter, and state"
                    .to_string(),
            ));
        }
        if self.stats.county_total + self.stats.rejected_count != self.source_total {
            return Err(ValidationError(format!(
                "accepted {} plus rejected {} does not account for source_total {}",
                self.stats.county_total, self.stats.rejected_count, self.source_total
            )));
        }
        Ok(())
    }

    pub fn validate_against(&self, hierarchy: &GeoHierarchy) -> Result<(), ValidationError> {
        let expected = ArtifactStats::from_hierarchy(hierarchy, self.stats.rejected_count);
        if expected != self.stats {
            return Err(ValidationError(format!(
                "manifest stats {:?} disagree with hierarchy-derived stats {:?}",
                self.stats, expected
            )));
        }
        Ok(())
    }
}

fn require_sha256(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.len() != 64 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError(format!(
            "{field} must be a 64-char hex sha256, got `{value}`"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestLock {
    pub manifest_sha256: String,
    pub hierarchy_sha256: String,
}

impl ManifestLock {
    #[must_use]
    pub fn from_bytes(manifest_bytes: &[u8], hierarchy_bytes: &[u8]) -> Self {
        Self {
            manifest_sha256: sha256_hex(manifest_bytes),
            hierarchy_sha256: sha256_hex(hierarchy_bytes),
        }
    }

    pub fn validate(&self, manifest_bytes: &[u8], hierarchy_bytes: &[u8]) -> Result<(), String> {
        if sha256_hex(manifest_bytes) != self.manifest_sha256 {
            return Err("manifest.lock mismatch for manifest_sha256".to_string());
        }
        if sha256_hex(hierarchy_bytes) != self.hierarchy_sha256 {
            return Err("manifest.lock mismatch for hierarchy_sha256".to_string());
        }
        Ok(())
    }
}

pub fn verify_expected_sha256(bytes: &[u8], expected: &str) -> Result<(), String> {
    let actual = sha256_hex(bytes);
    if actual != expected {
        return Err(format!(
            "sha256 mismatch expected={expected} actual={actual}"
        ));
    }
    Ok(())
}

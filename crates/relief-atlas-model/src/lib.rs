// SPDX-License-Identifier: Apache-2.0

//! Domain model SSOT for relief-atlas: the raw county feed row, the built
//! Division → Region → Chapter → County hierarchy with its validation rules,
//! the artifact manifest/lock pair, scope predicates, and the CRM record
//! shapes the access filter consumes.

#![forbid(unsafe_code)]

mod county;
mod hierarchy;
mod manifest;
mod records;
mod scope;

pub const CRATE_NAME: &str = "relief-atlas-model";

pub use county::{
    state_display_name, CountyRecord, CountyRef, StateCode, ValidationError, GEO_ID_MAX_LEN,
    NAME_MAX_LEN,
};
pub use hierarchy::{Chapter, Division, GeoHierarchy, Region, StateAggregate};
pub use manifest::{
    artifact_paths, verify_expected_sha256, ArtifactChecksums, ArtifactManifest, ArtifactPaths,
    ArtifactStats, ManifestLock, ARTIFACT_VERSION, HIERARCHY_FILE, MANIFEST_FILE,
    MANIFEST_LOCK_FILE, PUBLISH_LOCK_FILE, REPORT_FILE, SCHEMA_VERSION,
};
pub use records::{MeetingRecord, OrganizationId, OrganizationRecord, PersonRecord};
pub use scope::ScopePredicate;

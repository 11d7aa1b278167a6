// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::BuildError;
use relief_atlas_model::{
    state_display_name, Chapter, CountyRecord, CountyRef, Division, GeoHierarchy, Region,
    StateAggregate, StateCode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    #[default]
    Fail,
    RejectRecord,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub conflict_policy: ConflictPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RejectedRecord {
    pub geo_id: String,
    pub county: String,
    pub state: StateCode,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BuildReport {
    pub source_total: u64,
    pub accepted: u64,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub hierarchy: GeoHierarchy,
    pub report: BuildReport,
}

pub fn build_hierarchy(
    records: &[CountyRecord],
    options: &BuildOptions,
) -> Result<BuildOutcome, BuildError> {
    let mut hierarchy = GeoHierarchy::default();
    let mut report = BuildReport {
        source_total: records.len() as u64,
        ..BuildReport::default()
    };
    let mut seen_geo_ids: BTreeSet<&str> = BTreeSet::new();
    // County identity to the chapter it was first assigned to.
    let mut seen_counties: BTreeMap<CountyRef, String> = BTreeMap::new();

    for record in records {
        if let Some(reason) = rejection_reason(&hierarchy, &seen_geo_ids, &seen_counties, record) {
            match options.conflict_policy {
                ConflictPolicy::Fail => {
                    return Err(BuildError(format!(
                        "geo_id `{}` ({}, {}): {reason}",
                        record.geo_id, record.county, record.state
                    )));
                }
                ConflictPolicy::RejectRecord => {
                    report.rejected.push(RejectedRecord {
                        geo_id: record.geo_id.clone(),
                        county: record.county.clone(),
                        state: record.state.clone(),
                        reason,
                    });
                    continue;
                }
            }
        }
        seen_geo_ids.insert(&record.geo_id);
        seen_counties.insert(record.county_ref(), record.chapter.clone());
        accept(&mut hierarchy, record);
        report.accepted += 1;
    }

    Ok(BuildOutcome { hierarchy, report })
}

fn rejection_reason(
    hierarchy: &GeoHierarchy,
    seen_geo_ids: &BTreeSet<&str>,
    seen_counties: &BTreeMap<CountyRef, String>,
    record: &CountyRecord,
) -> Option<String> {
    if let Err(err) = record.validate() {
        return Some(format!("malformed record: {err}"));
    }
    if seen_geo_ids.contains(record.geo_id.as_str()) {
        return Some("duplicate geo_id".to_string());
    }
    if let Some(owner) = seen_counties.get(&record.county_ref()) {
        return Some(format!(
            "county `{}` already assigned to chapter `{owner}`",
            record.county_ref()
        ));
    }
    if let Some(chapter) = hierarchy.chapters.get(&record.chapter) {
        if chapter.region != record.region {
            return Some(format!(
                "chapter `{}` already observed under region `{}`, record names `{}`",
                record.chapter, chapter.region, record.region
            ));
        }
        if chapter.division != record.division {
            return Some(format!(
                "chapter `{}` already observed under division `{}`, record names `{}`",
                record.chapter, chapter.division, record.division
            ));
        }
    }
    if let Some(region) = hierarchy.regions.get(&record.region) {
        if region.division != record.division {
            return Some(format!(
                "region `{}` already observed under division `{}`, record names `{}`",
                record.region, region.division, record.division
            ));
        }
    }
    None
}

fn accept(hierarchy: &mut GeoHierarchy, record: &CountyRecord) {
    let division = hierarchy
        .divisions
        .entry(record.division.clone())
        .or_insert_with(|| Division {
            name: record.division.clone(),
            code: record.division_code.clone(),
            regions: BTreeSet::new(),
            states: BTreeSet::new(),
            county_count: 0,
        });
    division.regions.insert(record.region.clone());
    division.states.insert(record.state.clone());
    division.county_count += 1;

    let region = hierarchy
        .regions
        .entry(record.region.clone())
        .or_insert_with(|| Region {
            name: record.region.clone(),
            code: record.region_code.clone(),
            division: record.division.clone(),
            chapters: BTreeSet::new(),
            states: BTreeSet::new(),
            county_count: 0,
        });
    region.chapters.insert(record.chapter.clone());
    region.states.insert(record.state.clone());
    region.county_count += 1;

    let chapter = hierarchy
        .chapters
        .entry(record.chapter.clone())
        .or_insert_with(|| Chapter {
            name: record.chapter.clone(),
            code: record.chapter_code.clone(),
            region: record.region.clone(),
            division: record.division.clone(),
            states: BTreeSet::new(),
            counties: Vec::new(),
            county_count: 0,
        });
    chapter.states.insert(record.state.clone());
    chapter.counties.push(record.county_ref());
    chapter.county_count += 1;

    let aggregate = hierarchy
        .states
        .entry(record.state.clone())
        .or_insert_with(|| StateAggregate {
            state: record.state.clone(),
            display_name: state_display_name(record.state.as_str())
                .unwrap_or(record.state.as_str())
                .to_string(),
            chapters: BTreeSet::new(),
            county_count: 0,
        });
    aggregate.chapters.insert(record.chapter.clone());
    aggregate.county_count += 1;

    hierarchy.county_total += 1;
}

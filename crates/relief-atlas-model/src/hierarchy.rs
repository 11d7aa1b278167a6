// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::county::{CountyRef, StateCode, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Chapter {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub region: String,
    pub division: String,
    pub states: BTreeSet<StateCode>,
    pub counties: Vec<CountyRef>,
    pub county_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Region {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub division: String,
    pub chapters: BTreeSet<String>,
    pub states: BTreeSet<StateCode>,
    pub county_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Division {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub regions: BTreeSet<String>,
    pub states: BTreeSet<StateCode>,
    pub county_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateAggregate {
    pub state: StateCode,
    pub display_name: String,
    pub chapters: BTreeSet<String>,
    pub county_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct GeoHierarchy {
    pub divisions: BTreeMap<String, Division>,
    pub regions: BTreeMap<String, Region>,
    pub chapters: BTreeMap<String, Chapter>,
    pub states: BTreeMap<StateCode, StateAggregate>,
    pub county_total: u64,
}

impl GeoHierarchy {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen: BTreeMap<&CountyRef, &str> = BTreeMap::new();
        for (name, chapter) in &self.chapters {
            if name != &chapter.name {
                return Err(ValidationError(format!(
                    "chapter map key `{name}` does not match entry name `{}`",
                    chapter.name
                )));
            }
            if chapter.county_count != chapter.counties.len() as u64 {
                return Err(ValidationError(format!(
                    "chapter `{name}` county_count {} disagrees with assignment list length {}",
                    chapter.county_count,
                    chapter.counties.len()
                )));
            }
            for county in &chapter.counties {
                if let Some(owner) = seen.insert(county, name.as_str()) {
                    return Err(ValidationError(format!(
                        "chapter `{name}` lists `{county}` already assigned to chapter `{owner}`"
                    )));
                }
                if !chapter.states.contains(&county.state) {
                    return Err(ValidationError(format!(
                        "chapter `{name}` is missing state {} touched by `{county}`",
                        county.state
                    )));
                }
            }
            let region = self.regions.get(&chapter.region).ok_or_else(|| {
                ValidationError(format!(
                    "chapter `{name}` references unknown region `{}`",
                    chapter.region
                ))
            })?;
            if !region.chapters.contains(name) {
                return Err(ValidationError(format!(
                    "region `{}` does not list chapter `{name}`",
                    region.name
                )));
            }
            if region.division != chapter.division {
                return Err(ValidationError(format!(
                    "chapter `{name}` claims division `{}` but its region belongs to `{}`",
                    chapter.division, region.division
                )));
            }
        }

        for (name, region) in &self.regions {
            if name != &region.name {
                return Err(ValidationError(format!(
                    "region map key `{name}` does not match entry name `{}`",
                    region.name
                )));
            }
            let division = self.divisions.get(&region.division).ok_or_else(|| {
                ValidationError(format!(
                    "region `{name}` references unknown division `{}`",
                    region.division
                ))
            })?;
            if !division.regions.contains(name) {
                return Err(ValidationError(format!(
                    "division `{}` does not list region `{name}`",
                    division.name
                )));
            }
            let mut chapter_sum = 0u64;
            for chapter_name in &region.chapters {
                let chapter = self.chapters.get(chapter_name).ok_or_else(|| {
                    ValidationError(format!(
                        "region `{name}` lists unknown chapter `{chapter_name}`"
                    ))
                })?;
                if chapter.region != *name {
                    return Err(ValidationError(format!(
                        "chapter `{chapter_name}` claims region `{}` but is listed under `{name}`",
                        chapter.region
                    )));
                }
                chapter_sum += chapter.county_count;
            }
            if chapter_sum != region.county_count {
                return Err(ValidationError(format!(
                    "region `{name}` county_count {} disagrees with chapter sum {chapter_sum}",
                    region.county_count
                )));
            }
        }

        let mut division_total = 0u64;
        for (name, division) in &self.divisions {
            if name != &division.name {
                return Err(ValidationError(format!(
                    "division map key `{name}` does not match entry name `{}`",
                    division.name
                )));
            }
            let mut region_sum = 0u64;
            for region_name in &division.regions {
                let region = self.regions.get(region_name).ok_or_else(|| {
                    ValidationError(format!(
                        "division `{name}` lists unknown region `{region_name}`"
                    ))
                })?;
                if region.division != *name {
                    return Err(ValidationError(format!(
                        "region `{region_name}` claims division `{}` but is listed under `{name}`",
                        region.division
                    )));
                }
                region_sum += region.county_count;
            }
            if region_sum != division.county_count {
                return Err(ValidationError(format!(
                    "division `{name}` county_count {} disagrees with region sum {region_sum}",
                    division.county_count
                )));
            }
            division_total += division.county_count;
        }
        if division_total != self.county_total {
            return Err(ValidationError(format!(
                "county_total {} disagrees with division sum {division_total}",
                self.county_total
            )));
        }

        let mut state_total = 0u64;
        for (code, aggregate) in &self.states {
            if code != &aggregate.state {
                return Err(ValidationError(format!(
                    "state map key `{code}` does not match entry state `{}`",
                    aggregate.state
                )));
            }
            let mut county_sum = 0u64;
            for chapter_name in &aggregate.chapters {
                let chapter = self.chapters.get(chapter_name).ok_or_else(|| {
                    ValidationError(format!(
                        "state `{code}` lists unknown chapter `{chapter_name}`"
                    ))
                })?;
                if !chapter.states.contains(code) {
                    return Err(ValidationError(format!(
                        "chapter `{chapter_name}` does not touch state `{code}` yet is listed there"
                    )));
                }
                county_sum += chapter
                    .counties
                    .iter()
                    .filter(|c| &c.state == code)
                    .count() as u64;
            }
            if county_sum != aggregate.county_count {
                return Err(ValidationError(format!(
                    "state `{code}` county_count {} disagrees with chapter-derived sum {county_sum}",
                    aggregate.county_count
                )));
            }
            state_total += aggregate.county_count;
        }
        if state_total != self.county_total {
            return Err(ValidationError(format!(
                "county_total {} disagrees with state sum {state_total}",
                self.county_total
            )));
        }

        for (name, chapter) in &self.chapters {
            for state in &chapter.states {
                let aggregate = self.states.get(state).ok_or_else(|| {
                    ValidationError(format!(
                        "chapter `{name}` touches state `{state}` with no aggregate entry"
                    ))
                })?;
                if !aggregate.chapters.contains(name) {
                    return Err(ValidationError(format!(
                        "state `{state}` aggregate does not list chapter `{name}`"
                    )));
                }
            }
        }

        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use relief_atlas_ingest::{build_hierarchy, BuildOptions, ConflictPolicy};
use relief_atlas_model::{CountyRecord, StateCode};
use std::collections::BTreeMap;

fn record(
    geo_id: &str,
    county: &str,
    state: &str,
    chapter: &str,
    region: &str,
    division: &str,
) -> CountyRecord {
    CountyRecord {
        geo_id: geo_id.to_string(),
        fips: format!("99{geo_id}"),
        county: county.to_string(),
        county_long: format!("{county} County"),
        state: StateCode::parse(state).expect("state code"),
        division: division.to_string(),
        region: region.to_string(),
        chapter: chapter.to_string(),
        division_code: None,
        region_code: None,
        chapter_code: None,
        attributes: BTreeMap::new(),
    }
}

// Three counties across two states, two chapters, one region, one division.
fn example_feed() -> Vec<CountyRecord> {
    vec![
        record("1", "CountyA", "TX", "ChapterA", "RegionA", "DivA"),
        record("2", "CountyB", "TX", "ChapterA", "RegionA", "DivA"),
        record("3", "CountyC", "OK", "ChapterB", "RegionA", "DivA"),
    ]
}

#[test]
fn example_feed_builds_the_expected_aggregates() {
    let outcome = build_hierarchy(&example_feed(), &BuildOptions::default()).expect("build");
    let h = &outcome.hierarchy;
    h.validate().expect("built hierarchy is consistent");

    let div = &h.divisions["DivA"];
    assert_eq!(div.regions.len(), 1);
    assert_eq!(div.county_count, 3);

    let region = &h.regions["RegionA"];
    assert_eq!(region.chapters.len(), 2);
    assert_eq!(region.county_count, 3);

    let chapter_a = &h.chapters["ChapterA"];
    assert_eq!(chapter_a.county_count, 2);
    assert_eq!(chapter_a.region, "RegionA");
    assert_eq!(chapter_a.division, "DivA");
    assert_eq!(
        chapter_a.counties.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["CountyA, TX", "CountyB, TX"]
    );

    assert_eq!(h.states[&StateCode::parse("TX").unwrap()].county_count, 2);
    assert_eq!(h.states[&StateCode::parse("OK").unwrap()].county_count, 1);
    assert_eq!(outcome.report.accepted, 3);
    assert!(outcome.report.rejected.is_empty());
}

#[test]
fn every_accepted_county_lands_where_its_record_says() {
    let feed = example_feed();
    let outcome = build_hierarchy(&feed, &BuildOptions::default()).expect("build");
    for rec in &feed {
        let chapter = &outcome.hierarchy.chapters[&rec.chapter];
        assert!(chapter.counties.contains(&rec.county_ref()));
        assert_eq!(chapter.region, rec.region);
        assert_eq!(chapter.division, rec.division);
    }
}

#[test]
fn chapter_under_conflicting_region_fails_the_build_by_default() {
    let mut feed = example_feed();
    feed.push(record("4", "CountyD", "TX", "ChapterA", "RegionZ", "DivA"));
    let err = build_hierarchy(&feed, &BuildOptions::default()).expect_err("conflict");
    assert!(err.0.contains("ChapterA"), "error names the chapter: {err}");
    assert!(err.0.contains("RegionZ"), "error names the conflicting parent: {err}");
}

#[test]
fn reject_policy_keeps_the_first_seen_parent_and_flags_the_record() {
    let mut feed = example_feed();
    feed.push(record("4", "CountyD", "TX", "ChapterA", "RegionZ", "DivA"));
    let options = BuildOptions {
        conflict_policy: ConflictPolicy::RejectRecord,
    };
    let outcome = build_hierarchy(&feed, &options).expect("reject, not fail");
    outcome.hierarchy.validate().expect("sums hold over accepted records");

    assert_eq!(outcome.report.accepted, 3);
    assert_eq!(outcome.report.rejected.len(), 1);
    assert_eq!(outcome.report.rejected[0].geo_id, "4");
    // The conflicting record must not leak into any aggregate.
    assert_eq!(outcome.hierarchy.chapters["ChapterA"].region, "RegionA");
    assert_eq!(outcome.hierarchy.chapters["ChapterA"].county_count, 2);
    assert!(!outcome.hierarchy.regions.contains_key("RegionZ"));
    assert_eq!(outcome.hierarchy.county_total, 3);
}

#[test]
fn region_under_conflicting_division_is_surfaced_too() {
    let mut feed = example_feed();
    feed.push(record("4", "CountyD", "TX", "ChapterC", "RegionA", "DivB"));
    assert!(build_hierarchy(&feed, &BuildOptions::default()).is_err());
}

#[test]
fn duplicate_geo_id_is_a_rejection_under_the_same_machinery() {
    let mut feed = example_feed();
    feed.push(record("1", "CountyA", "TX", "ChapterA", "RegionA", "DivA"));

    assert!(build_hierarchy(&feed, &BuildOptions::default()).is_err());

    let options = BuildOptions {
        conflict_policy: ConflictPolicy::RejectRecord,
    };
    let outcome = build_hierarchy(&feed, &options).expect("duplicate rejected");
    assert_eq!(outcome.report.rejected.len(), 1);
    assert_eq!(outcome.report.rejected[0].reason, "duplicate geo_id");
    assert_eq!(outcome.hierarchy.county_total, 3);
}

#[test]
fn county_claimed_by_a_second_chapter_is_a_conflict() {
    let mut feed = example_feed();
    // Fresh geo_id, but `CountyA, TX` already belongs to ChapterA.
    feed.push(record("4", "CountyA", "TX", "ChapterB", "RegionA", "DivA"));

    let err = build_hierarchy(&feed, &BuildOptions::default()).expect_err("conflict");
    assert!(err.0.contains("CountyA, TX"), "error names the county: {err}");
    assert!(err.0.contains("ChapterA"), "error names the first owner: {err}");

    let options = BuildOptions {
        conflict_policy: ConflictPolicy::RejectRecord,
    };
    let outcome = build_hierarchy(&feed, &options).expect("collision rejected");
    outcome.hierarchy.validate().expect("sums hold over accepted records");
    assert_eq!(outcome.report.rejected.len(), 1);
    assert_eq!(outcome.report.rejected[0].geo_id, "4");
    assert!(outcome.report.rejected[0].reason.contains("ChapterA"));
    assert_eq!(outcome.hierarchy.chapters["ChapterB"].county_count, 1);
    assert_eq!(outcome.hierarchy.county_total, 3);
}

#[test]
fn malformed_records_never_enter_the_hierarchy() {
    let mut bad = record("5", "CountyE", "TX", "ChapterA", "RegionA", "DivA");
    bad.county = String::new();
    let feed = vec![bad];
    let options = BuildOptions {
        conflict_policy: ConflictPolicy::RejectRecord,
    };
    let outcome = build_hierarchy(&feed, &options).expect("rejected");
    assert_eq!(outcome.report.accepted, 0);
    assert_eq!(outcome.report.rejected.len(), 1);
}

// Parent assignments are consistent by construction. Region and chapter
// names embed their parents' indices.
fn consistent_feed() -> impl Strategy<Value = Vec<CountyRecord>> {
    let row = (0usize..3, 0usize..3, 0usize..3, 0usize..4);
    proptest::collection::vec(row, 1..60).prop_map(|rows| {
        let states = ["TX", "OK", "NE", "IA"];
        rows.iter()
            .enumerate()
            .map(|(i, (d, r, c, s))| {
                record(
                    &format!("g{i}"),
                    &format!("County{i}"),
                    states[*s],
                    &format!("Chapter-{d}-{r}-{c}"),
                    &format!("Region-{d}-{r}"),
                    &format!("Div-{d}"),
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn count_sums_hold_for_any_consistent_feed(feed in consistent_feed()) {
        let outcome = build_hierarchy(&feed, &BuildOptions::default()).expect("consistent feed");
        let h = &outcome.hierarchy;
        h.validate().expect("invariants hold");

        for region in h.regions.values() {
            let chapter_sum: u64 = region
                .chapters
                .iter()
                .map(|name| h.chapters[name].county_count)
                .sum();
            prop_assert_eq!(chapter_sum, region.county_count);
        }
        for division in h.divisions.values() {
            let region_sum: u64 = division
                .regions
                .iter()
                .map(|name| h.regions[name].county_count)
                .sum();
            prop_assert_eq!(region_sum, division.county_count);
        }
        prop_assert_eq!(h.county_total, feed.len() as u64);
    }
}

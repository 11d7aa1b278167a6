// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use relief_atlas_ingest::{build_hierarchy, BuildOptions};
use relief_atlas_model::{CountyRecord, StateCode};
use std::collections::BTreeMap;

fn synthetic_feed() -> Vec<CountyRecord> {
    let states = ["TX", "OK", "NE", "IA", "FL", "GA", "CA", "NY"];
    (0..3_200)
        .map(|i| {
            let d = i % 4;
            let r = i % 12;
            let c = i % 60;
            CountyRecord {
                geo_id: format!("g{i}"),
                fips: format!("99{i:05}"),
                county: format!("County{i}"),
                county_long: format!("County{i} County"),
                state: StateCode::parse(states[i % states.len()]).expect("state"),
                division: format!("Div-{d}"),
                region: format!("Region-{d}-{}", r % 3),
                chapter: format!("Chapter-{d}-{}-{}", r % 3, c % 5),
                division_code: None,
                region_code: None,
                chapter_code: None,
                attributes: BTreeMap::new(),
            }
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let feed = synthetic_feed();
    let options = BuildOptions::default();
    c.bench_function("build_hierarchy_3200_counties", |b| {
        b.iter(|| build_hierarchy(black_box(&feed), &options).expect("build"));
    });
}

criterion_group!(benches, bench_build);
criterion_main!(benches);

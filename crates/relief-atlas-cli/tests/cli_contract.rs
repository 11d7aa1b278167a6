// SPDX-License-Identifier: Apache-2.0

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn relief_atlas() -> Command {
    Command::new(env!("CARGO_BIN_EXE_relief-atlas"))
}

const SNAPSHOT: &str = r#"[
  {"geo_id": "1", "fips": "12001", "county": "Alachua", "county_long": "Alachua County",
   "state": "FL", "division": "Southeast Division", "region": "Florida Region",
   "chapter": "North Florida"},
  {"geo_id": "2", "fips": "12003", "county": "Baker", "county_long": "Baker County",
   "state": "FL", "division": "Southeast Division", "region": "Florida Region",
   "chapter": "North Florida"},
  {"geo_id": "3", "fips": "31055", "county": "Douglas", "county_long": "Douglas County",
   "state": "NE", "division": "Central Division", "region": "Plains Region",
   "chapter": "Omaha Metro"}
]"#;

fn write_snapshot() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile");
    file.write_all(SNAPSHOT.as_bytes()).expect("write snapshot");
    file
}

#[test]
fn build_validate_and_lookup_round_trip() {
    let snapshot = write_snapshot();
    let root = tempdir().expect("tempdir");

    relief_atlas()
        .args(["build", "--snapshot"])
        .arg(snapshot.path())
        .arg("--output-root")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("counties=3"));

    relief_atlas()
        .args(["validate", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));

    relief_atlas()
        .args(["lookup", "--root"])
        .arg(root.path())
        .args(["chapters-in-state", "FL"])
        .assert()
        .success()
        .stdout(predicate::str::contains("North Florida"));

    relief_atlas()
        .args(["lookup", "--root"])
        .arg(root.path())
        .args(["counties-of", "north florida"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alachua, FL"));

    relief_atlas()
        .arg("--json")
        .args(["lookup", "--root"])
        .arg(root.path())
        .arg("divisions")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Central Division\""));
}

#[test]
fn validate_fails_on_a_tampered_artifact() {
    let snapshot = write_snapshot();
    let root = tempdir().expect("tempdir");

    relief_atlas()
        .args(["build", "--snapshot"])
        .arg(snapshot.path())
        .arg("--output-root")
        .arg(root.path())
        .assert()
        .success();

    let hierarchy = root.path().join("hierarchy.json");
    let mut bytes = std::fs::read(&hierarchy).expect("hierarchy");
    let idx = bytes.len() / 2;
    bytes[idx] = bytes[idx].wrapping_add(1);
    std::fs::write(&hierarchy, bytes).expect("tamper");

    relief_atlas()
        .args(["validate", "--root"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("mismatch"));
}

#[test]
fn conflicting_feed_fails_by_default_and_rejects_when_asked() {
    let mut file = NamedTempFile::new().expect("tempfile");
    // Second record re-parents Omaha Metro under a different region.
    file.write_all(
        br#"[
      {"geo_id": "1", "fips": "31055", "county": "Douglas", "state": "NE",
       "division": "Central Division", "region": "Plains Region", "chapter": "Omaha Metro"},
      {"geo_id": "2", "fips": "19153", "county": "Polk", "state": "IA",
       "division": "Central Division", "region": "Heartland Region", "chapter": "Omaha Metro"}
    ]"#,
    )
    .expect("write snapshot");
    let root = tempdir().expect("tempdir");

    relief_atlas()
        .args(["build", "--snapshot"])
        .arg(file.path())
        .arg("--output-root")
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Omaha Metro"));

    relief_atlas()
        .args(["build", "--snapshot"])
        .arg(file.path())
        .arg("--output-root")
        .arg(root.path())
        .args(["--conflict-policy", "reject"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected geo_id=2"));
}

#[test]
fn build_requires_exactly_one_source() {
    let root = tempdir().expect("tempdir");
    relief_atlas()
        .args(["build", "--output-root"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--base-url or --snapshot"));
}

#[test]
fn scope_resolve_prints_the_grant() {
    relief_atlas()
        .args(["scope", "resolve", "--selection", "nebraska-iowa"])
        .assert()
        .success()
        .stdout(predicate::str::contains("IA"));

    relief_atlas()
        .arg("--json")
        .args(["scope", "resolve", "--selection", "national"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"unrestricted\":true"));
}

#[test]
fn unknown_scope_selection_exits_nonzero() {
    relief_atlas()
        .args(["scope", "resolve", "--selection", "atlantis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("access denied"))
        .stderr(predicate::str::contains("available selections"))
        .stderr(predicate::str::contains("florida"));
}

#[test]
fn scope_check_reports_visibility() {
    relief_atlas()
        .args(["scope", "check", "--selection", "florida", "--state", "FL"])
        .assert()
        .success()
        .stdout(predicate::str::contains("visible"));

    relief_atlas()
        .args(["scope", "check", "--selection", "florida", "--state", "GA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hidden"));
}

#[test]
fn scope_config_file_is_honored() {
    let mut config = NamedTempFile::new().expect("tempfile");
    config
        .write_all(br#"{"selections": {"gulf-coast": ["FL", "AL", "MS"]}}"#)
        .expect("write config");

    relief_atlas()
        .args(["scope", "--scope-config"])
        .arg(config.path())
        .args(["resolve", "--selection", "gulf-coast"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AL"));
}

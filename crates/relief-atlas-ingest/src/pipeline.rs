// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::logging::{BuildLog, BuildStage};
use crate::{build_hierarchy, publish_artifact, BuildError, BuildEvent, BuildOptions, BuildReport};
use relief_atlas_feed::{fetch_all, CountyProvider, FeedOptions};
use relief_atlas_model::ArtifactManifest;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub output_root: PathBuf,
    pub feed: FeedOptions,
    pub build: BuildOptions,
}

#[derive(Debug, Clone)]
pub struct BuildResult {
    pub manifest: ArtifactManifest,
    pub report: BuildReport,
    pub events: Vec<BuildEvent>,
}

fn fields(pairs: &[(&str, String)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

pub fn run_build(
    provider: &dyn CountyProvider,
    options: &PipelineOptions,
) -> Result<BuildResult, BuildError> {
    let mut log = BuildLog::default();

    log.emit(BuildStage::Fetch, "build.fetch.begin", BTreeMap::new());
    let records = fetch_all(provider, &options.feed).map_err(|e| BuildError(e.to_string()))?;
    log.emit(
        BuildStage::Fetch,
        "build.fetch.complete",
        fields(&[("records", records.len().to_string())]),
    );

    let outcome = build_hierarchy(&records, &options.build)?;
    log.emit(
        BuildStage::Build,
        "build.fold.complete",
        fields(&[
            ("accepted", outcome.report.accepted.to_string()),
            ("rejected", outcome.report.rejected.len().to_string()),
            ("chapters", outcome.hierarchy.chapters.len().to_string()),
        ]),
    );

    outcome
        .hierarchy
        .validate()
        .map_err(|e| BuildError(format!("built hierarchy failed validation: {e}")))?;
    log.emit(BuildStage::Validate, "build.validate.complete", BTreeMap::new());

    let manifest = publish_artifact(&options.output_root, &outcome.hierarchy, &outcome.report)?;
    log.emit(
        BuildStage::Publish,
        "build.publish.complete",
        fields(&[(
            "root",
            options.output_root.to_string_lossy().into_owned(),
        )]),
    );
    tracing::info!(
        county_total = manifest.stats.county_total,
        rejected = manifest.stats.rejected_count,
        "hierarchy artifact published"
    );

    Ok(BuildResult {
        manifest,
        report: outcome.report,
        events: log.events().to_vec(),
    })
}

// SPDX-License-Identifier: Apache-2.0

//! Hierarchy build pipeline: fetch the county feed, fold it into the
//! Division → Region → Chapter aggregates under an explicit conflict policy,
//! validate the sum invariants, and publish the artifact atomically. A failed
//! build leaves the previously published artifact untouched.

#![forbid(unsafe_code)]

mod build;
mod logging;
mod pipeline;
mod publish;

use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "relief-atlas-ingest";

pub use build::{
    build_hierarchy, BuildOptions, BuildOutcome, BuildReport, ConflictPolicy, RejectedRecord,
};
pub use logging::{BuildEvent, BuildLog, BuildStage};
pub use pipeline::{run_build, BuildResult, PipelineOptions};
pub use publish::publish_artifact;

#[derive(Debug)]
pub struct BuildError(pub String);

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BuildError {}

// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use crate::{CountyProvider, FeedError, FeedErrorCode};
use relief_atlas_model::CountyRecord;

#[derive(Debug)]
pub struct SnapshotFileProvider {
    records: Vec<CountyRecord>,
}

impl SnapshotFileProvider {
    pub fn open(path: &Path) -> Result<Self, FeedError> {
        let raw = fs::read(path).map_err(|e| {
            FeedError::new(
                FeedErrorCode::Io,
                format!("read snapshot {}: {e}", path.display()),
            )
        })?;
        let records: Vec<CountyRecord> = serde_json::from_slice(&raw)
            .map_err(|e| FeedError::new(FeedErrorCode::Decode, e.to_string()))?;
        Ok(Self { records })
    }

    #[must_use]
    pub fn from_records(records: Vec<CountyRecord>) -> Self {
        Self { records }
    }
}

impl CountyProvider for SnapshotFileProvider {
    fn total_count(&self) -> Result<u64, FeedError> {
        Ok(self.records.len() as u64)
    }

    fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<CountyRecord>, FeedError> {
        let start = usize::try_from(offset)
            .map_err(|_| FeedError::new(FeedErrorCode::Provider, "offset out of range"))?;
        if start > self.records.len() {
            return Err(FeedError::new(
                FeedErrorCode::Provider,
                format!("offset {offset} beyond snapshot length {}", self.records.len()),
            ));
        }
        let end = start.saturating_add(limit as usize).min(self.records.len());
        Ok(self.records[start..end].to_vec())
    }
}

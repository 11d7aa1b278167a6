// SPDX-License-Identifier: Apache-2.0

//! County Feed Reader: pulls the flat per-county feed from an upstream
//! paginated query API (or a captured snapshot file) into one ordered
//! collection, with bounded per-page retry and total-count verification.

#![forbid(unsafe_code)]

mod http;
mod snapshot;

use relief_atlas_model::CountyRecord;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const CRATE_NAME: &str = "relief-atlas-feed";
pub const DEFAULT_PAGE_SIZE: u64 = 1_000;

pub use http::HttpCountyProvider;
pub use snapshot::SnapshotFileProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedErrorCode {
    Network,
    Provider,
    Decode,
    CountMismatch,
    Io,
}

impl FeedErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network_error",
            Self::Provider => "provider_error",
            Self::Decode => "decode_error",
            Self::CountMismatch => "count_mismatch",
            Self::Io => "io_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedError {
    pub code: FeedErrorCode,
    pub message: String,
}

impl FeedError {
    #[must_use]
    pub fn new(code: FeedErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for FeedError {}

pub trait CountyProvider {
    fn total_count(&self) -> Result<u64, FeedError>;
    fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<CountyRecord>, FeedError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRetry {
    pub attempts_per_page: u32,
    pub backoff: Duration,
}

impl Default for PageRetry {
    fn default() -> Self {
        Self {
            attempts_per_page: 4,
            backoff: Duration::from_millis(120),
        }
    }
}

impl PageRetry {
    fn delay_after(&self, failures: u32) -> Duration {
        self.backoff.saturating_mul(failures)
    }
}

#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub page_size: u64,
    pub retry: PageRetry,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            retry: PageRetry::default(),
        }
    }
}

pub fn fetch_all(
    provider: &dyn CountyProvider,
    options: &FeedOptions,
) -> Result<Vec<CountyRecord>, FeedError> {
    if options.page_size == 0 {
        return Err(FeedError::new(
            FeedErrorCode::Provider,
            "page_size must be positive",
        ));
    }
    let total = provider.total_count()?;
    let mut records = Vec::with_capacity(usize::try_from(total).unwrap_or(0));

    let mut offset = 0u64;
    while offset < total {
        let limit = options.page_size.min(total - offset);
        let page = fetch_page_with_retry(provider, offset, limit, &options.retry)?;
        records.extend(page);
        offset += limit;
    }

    if records.len() as u64 != total {
        return Err(FeedError::new(
            FeedErrorCode::CountMismatch,
            format!(
                "provider reported {total} records but returned {}",
                records.len()
            ),
        ));
    }
    Ok(records)
}

fn fetch_page_with_retry(
    provider: &dyn CountyProvider,
    offset: u64,
    limit: u64,
    retry: &PageRetry,
) -> Result<Vec<CountyRecord>, FeedError> {
    let mut last_err = None;
    for attempt in 1..=retry.attempts_per_page {
        match provider.fetch_page(offset, limit) {
            Ok(page) => return Ok(page),
            Err(err) => {
                tracing::warn!(
                    offset,
                    limit,
                    attempt,
                    attempts_per_page = retry.attempts_per_page,
                    error = %err,
                    "county feed page fetch failed"
                );
                last_err = Some(err);
                if attempt < retry.attempts_per_page {
                    std::thread::sleep(retry.delay_after(attempt));
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        FeedError::new(
            FeedErrorCode::Provider,
            "retry budget allows zero attempts",
        )
    }))
}

// SPDX-License-Identifier: Apache-2.0

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{CountyProvider, FeedError, FeedErrorCode};
use relief_atlas_model::CountyRecord;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CountResponse {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    records: Vec<CountyRecord>,
}

pub struct HttpCountyProvider {
    base_url: String,
    client: Client,
}

impl HttpCountyProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FeedError> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FeedError::new(FeedErrorCode::Network, e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FeedError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| FeedError::new(FeedErrorCode::Network, e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::new(
                FeedErrorCode::Provider,
                format!("upstream returned {status} for {url}"),
            ));
        }
        resp.json::<T>()
            .map_err(|e| FeedError::new(FeedErrorCode::Decode, e.to_string()))
    }
}

impl CountyProvider for HttpCountyProvider {
    fn total_count(&self) -> Result<u64, FeedError> {
        let url = format!("{}/records/count", self.base_url);
        let count: CountResponse = self.get_json(&url)?;
        Ok(count.total)
    }

    fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<CountyRecord>, FeedError> {
        let url = format!(
            "{}/records?offset={offset}&limit={limit}",
            self.base_url
        );
        let page: PageResponse = self.get_json(&url)?;
        Ok(page.records)
    }
}

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use shared::domain::Address;
use tracing::debug;
use url::Url;

use crate::AddressClient;

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupAddress>,
}

#[derive(Debug, Deserialize)]
struct LookupAddress {
    #[serde(default)]
    line1: String,
    #[serde(default)]
    line2: String,
    #[serde(default)]
    line3: String,
    #[serde(default)]
    town: String,
    #[serde(default)]
    postcode: String,
}

/// Postcode lookup over HTTP: `GET {base}/addresses?postcode=...`.
#[derive(Clone)]
pub struct HttpAddressClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpAddressClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: crate::base_url(base_url).context("invalid address lookup url")?,
        })
    }
}

#[async_trait]
impl AddressClient for HttpAddressClient {
    async fn lookup_postcode(&self, postcode: &str) -> anyhow::Result<Vec<Address>> {
        let mut url = self.base_url.join("addresses")?;
        url.query_pairs_mut().append_pair("postcode", postcode.trim());

        let response: LookupResponse = self
            .http
            .get(url)
            .send()
            .await
            .context("address lookup request failed")?
            .error_for_status()
            .context("address lookup returned an error")?
            .json()
            .await
            .context("address lookup returned invalid json")?;

        debug!(postcode, results = response.results.len(), "postcode looked up");
        Ok(response
            .results
            .into_iter()
            .map(|found| Address {
                line1: found.line1,
                line2: found.line2,
                line3: found.line3,
                town: found.town,
                postcode: found.postcode,
                country: "GB".into(),
            })
            .collect())
    }
}

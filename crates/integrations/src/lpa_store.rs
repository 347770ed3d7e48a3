use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use shared::{protocol::RegisteredLpa, provided::Provided};
use tracing::info;
use url::Url;

use crate::{LpaStoreClient, LpaStoreError};

/// Client for the LPA store: `GET {base}/lpas/{uid}` and `PUT {base}/lpas/{uid}`.
#[derive(Clone)]
pub struct HttpLpaStoreClient {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Serialize)]
struct SendLpaBody<'a> {
    lpa_type: Option<shared::domain::LpaType>,
    donor_full_name: String,
    signed_at: Option<chrono::DateTime<chrono::Utc>>,
    witnessed_by_certificate_provider_at: Option<chrono::DateTime<chrono::Utc>>,
    witnessed_by_independent_witness_at: Option<chrono::DateTime<chrono::Utc>>,
    certificate_provider_full_name: String,
    attorneys: Vec<String>,
    replacement_attorneys: Vec<String>,
    restrictions: &'a str,
}

impl HttpLpaStoreClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: crate::base_url(base_url).context("invalid lpa store url")?,
        })
    }

    fn lpa_url(&self, lpa_uid: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(&format!("lpas/{lpa_uid}"))
            .context("invalid lpa uid")
    }
}

#[async_trait]
impl LpaStoreClient for HttpLpaStoreClient {
    async fn lpa(&self, lpa_uid: &str) -> Result<RegisteredLpa, LpaStoreError> {
        let response = self
            .http
            .get(self.lpa_url(lpa_uid)?)
            .send()
            .await
            .context("lpa store request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(LpaStoreError::NotFound);
        }

        let lpa = response
            .error_for_status()
            .context("lpa store returned an error")?
            .json::<RegisteredLpa>()
            .await
            .context("lpa store returned invalid json")?;
        Ok(lpa)
    }

    async fn send_lpa(&self, provided: &Provided) -> anyhow::Result<()> {
        if provided.lpa_uid.is_empty() {
            anyhow::bail!("lpa {} has no uid yet", provided.lpa_id);
        }

        let names = |list: &shared::provided::Attorneys| {
            list.attorneys
                .iter()
                .map(|attorney| attorney.full_name())
                .collect::<Vec<_>>()
        };
        let body = SendLpaBody {
            lpa_type: provided.lpa_type,
            donor_full_name: provided.donor.full_name(),
            signed_at: provided.signed_at,
            witnessed_by_certificate_provider_at: provided.witnessed_by_certificate_provider_at,
            witnessed_by_independent_witness_at: provided.witnessed_by_independent_witness_at,
            certificate_provider_full_name: provided.certificate_provider.full_name(),
            attorneys: names(&provided.attorneys),
            replacement_attorneys: names(&provided.replacement_attorneys),
            restrictions: &provided.restrictions,
        };

        self.http
            .put(self.lpa_url(&provided.lpa_uid)?)
            .json(&body)
            .send()
            .await
            .context("lpa store request failed")?
            .error_for_status()
            .context("lpa store rejected the lpa")?;

        info!(lpa_uid = %provided.lpa_uid, "lpa sent to lpa store");
        Ok(())
    }
}

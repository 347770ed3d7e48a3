use integrations::LpaStoreError;
use serde::Serialize;
use shared::{error::ApiError, protocol::RegisteredLpa, provided::Provided};
use tracing::{debug, warn};

use crate::{internal, ApiContext, Outcome, PageRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressItem {
    pub label: &'static str,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressData {
    pub lpa_uid: String,
    pub donor_full_name: String,
    pub registered: bool,
    pub items: Vec<ProgressItem>,
}

/// Shows how far the LPA has got through registration. Until the LPA store
/// knows about it, the tracker is built from the local aggregate.
pub async fn progress(
    ctx: &ApiContext,
    _req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<ProgressData>, ApiError> {
    let registered = if provided.lpa_uid.is_empty() {
        local_tracker(provided)
    } else {
        match ctx.lpa_store_client.lpa(&provided.lpa_uid).await {
            Ok(registered) => registered,
            Err(LpaStoreError::NotFound) => {
                debug!(lpa_id = %provided.lpa_id, "lpa not in the lpa store yet");
                local_tracker(provided)
            }
            Err(LpaStoreError::Other(err)) => {
                warn!(lpa_id = %provided.lpa_id, error = %err, "lpa store lookup failed");
                return Err(internal(err));
            }
        }
    };

    Ok(Outcome::Render(tracker(provided, &registered)))
}

fn local_tracker(provided: &Provided) -> RegisteredLpa {
    RegisteredLpa {
        lpa_uid: provided.lpa_uid.clone(),
        status: if provided.submitted_at.is_some() {
            "submitted".to_string()
        } else {
            "in-progress".to_string()
        },
        signed_at: provided.signed_at,
        certificate_provider_signed_at: None,
        attorneys_signed: 0,
        attorneys_total: provided.attorneys.len() + provided.replacement_attorneys.len(),
        registration_date: None,
    }
}

fn tracker(provided: &Provided, registered: &RegisteredLpa) -> ProgressData {
    let attorneys_done =
        registered.attorneys_total > 0 && registered.attorneys_signed >= registered.attorneys_total;
    ProgressData {
        lpa_uid: registered.lpa_uid.clone(),
        donor_full_name: provided.donor.full_name(),
        registered: registered.registration_date.is_some(),
        items: vec![
            ProgressItem {
                label: "youSigned",
                done: registered.signed_at.is_some(),
            },
            ProgressItem {
                label: "certificateProviderHasDeclared",
                done: registered.certificate_provider_signed_at.is_some(),
            },
            ProgressItem {
                label: "attorneysHaveDeclared",
                done: attorneys_done,
            },
            ProgressItem {
                label: "lpaSubmitted",
                done: provided.submitted_at.is_some() || registered.status != "in-progress",
            },
            ProgressItem {
                label: "lpaRegistered",
                done: registered.registration_date.is_some(),
            },
        ],
    }
}

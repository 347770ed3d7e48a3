//! Services the donor wizard talks to but does not own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{ActorType, Address, FeeType, SessionId},
    protocol::{LpaEvent, RegisteredLpa},
    provided::Provided,
};
use thiserror::Error;

mod address;
mod codes;
mod events;
mod lpa_store;
mod notify;
mod session;

pub use address::HttpAddressClient;
pub use codes::RandomCodeGenerator;
pub use events::BroadcastEventClient;
pub use lpa_store::HttpLpaStoreClient;
pub use notify::LoggingNotificationSender;
pub use session::InMemorySessionStore;

#[async_trait]
pub trait AddressClient: Send + Sync {
    async fn lookup_postcode(&self, postcode: &str) -> anyhow::Result<Vec<Address>>;
}

#[async_trait]
pub trait EventClient: Send + Sync {
    async fn send(&self, event: LpaEvent) -> anyhow::Result<()>;

    async fn send_uid_requested(&self, provided: &Provided) -> anyhow::Result<()> {
        let Some(lpa_type) = provided.lpa_type else {
            anyhow::bail!("cannot request a uid before the lpa type is chosen");
        };
        self.send(LpaEvent::UidRequested {
            lpa_id: provided.lpa_id,
            donor_session_id: provided.session_id,
            lpa_type,
            donor_full_name: provided.donor.full_name(),
            donor_date_of_birth: provided.donor.date_of_birth,
            donor_postcode: provided.donor.address.postcode.clone(),
        })
        .await
    }

    async fn send_reduced_fee_requested(
        &self,
        lpa_uid: &str,
        requested_type: FeeType,
        evidence_delivery: &str,
    ) -> anyhow::Result<()> {
        self.send(LpaEvent::ReducedFeeRequested {
            lpa_uid: lpa_uid.to_string(),
            requested_type,
            evidence_delivery: evidence_delivery.to_string(),
        })
        .await
    }

    async fn send_register_with_court_of_protection(&self, lpa_uid: &str) -> anyhow::Result<()> {
        self.send(LpaEvent::RegisterWithCourtOfProtection {
            lpa_uid: lpa_uid.to_string(),
        })
        .await
    }

    async fn send_certificate_provider_started(&self, lpa_uid: &str) -> anyhow::Result<()> {
        self.send(LpaEvent::CertificateProviderStarted {
            lpa_uid: lpa_uid.to_string(),
        })
        .await
    }

    async fn send_previous_application_linked(
        &self,
        lpa_uid: &str,
        application_reference: &str,
    ) -> anyhow::Result<()> {
        self.send(LpaEvent::PreviousApplicationLinked {
            lpa_uid: lpa_uid.to_string(),
            application_reference: application_reference.to_string(),
        })
        .await
    }
}

#[derive(Debug, Error)]
pub enum LpaStoreError {
    #[error("lpa not found in the lpa store")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait LpaStoreClient: Send + Sync {
    async fn lpa(&self, lpa_uid: &str) -> Result<RegisteredLpa, LpaStoreError>;
    async fn send_lpa(&self, provided: &Provided) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessCodeRecipient {
    pub actor_type: ActorType,
    pub full_name: String,
    pub mobile: String,
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_witness_code(
        &self,
        provided: &Provided,
        recipient: &WitnessCodeRecipient,
        code: &str,
    ) -> anyhow::Result<()>;
    async fn send_certificate_provider_invite(&self, provided: &Provided) -> anyhow::Result<()>;
    async fn send_certificate_provider_prompt(&self, provided: &Provided) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    pub session_id: SessionId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn login(&self, session_id: SessionId) -> anyhow::Result<Option<LoginSession>>;
    async fn create(&self, email: &str, now: DateTime<Utc>) -> anyhow::Result<LoginSession>;
}

pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Parses a service root so relative joins append to it.
fn base_url(raw: &str) -> Result<url::Url, url::ParseError> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        url::Url::parse(raw)
    } else {
        url::Url::parse(&format!("{raw}/"))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

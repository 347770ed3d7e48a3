use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FeeType, LpaId, LpaType, SessionId};

/// Messages published to the event bus by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum LpaEvent {
    UidRequested {
        lpa_id: LpaId,
        donor_session_id: SessionId,
        lpa_type: LpaType,
        donor_full_name: String,
        donor_date_of_birth: Option<chrono::NaiveDate>,
        donor_postcode: String,
    },
    ReducedFeeRequested {
        lpa_uid: String,
        requested_type: FeeType,
        evidence_delivery: String,
    },
    RegisterWithCourtOfProtection {
        lpa_uid: String,
    },
    CertificateProviderStarted {
        lpa_uid: String,
    },
    PreviousApplicationLinked {
        lpa_uid: String,
        application_reference: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLpaResponse {
    pub lpa_id: LpaId,
}

/// What a wizard GET (or a failed POST) hands to the page renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    pub page: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpaSummary {
    pub lpa_id: LpaId,
    pub lpa_uid: String,
    pub donor_full_name: String,
    pub lpa_type: Option<LpaType>,
    pub version: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The registered view of an LPA held by the LPA store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisteredLpa {
    pub lpa_uid: String,
    pub status: String,
    pub signed_at: Option<DateTime<Utc>>,
    pub certificate_provider_signed_at: Option<DateTime<Utc>>,
    pub attorneys_signed: usize,
    pub attorneys_total: usize,
    pub registration_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = LpaEvent::CertificateProviderStarted {
            lpa_uid: "M-1234".into(),
        };
        let json = serde_json::to_value(&event).expect("json");
        assert_eq!(json["type"], "certificate_provider_started");
        assert_eq!(json["payload"]["lpa_uid"], "M-1234");
    }
}

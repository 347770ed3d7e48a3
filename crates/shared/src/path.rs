use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::{
    domain::{ActorType, ActorUid, LpaId, PaymentState},
    provided::Provided,
};

macro_rules! lpa_paths {
    ($($variant:ident => $slug:literal),+ $(,)?) => {
        /// Every page of the donor wizard, addressed as `/lpa/{id}/{slug}`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Path {
            $(
                #[serde(rename = $slug)]
                $variant,
            )+
        }

        impl Path {
            pub const ALL: &'static [Path] = &[$(Path::$variant),+];

            pub fn slug(self) -> &'static str {
                match self {
                    $(Path::$variant => $slug,)+
                }
            }

            pub fn from_slug(slug: &str) -> Option<Self> {
                match slug {
                    $($slug => Some(Path::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

lpa_paths! {
    TaskList => "task-list",
    Progress => "progress",
    Warning => "warning",

    YourName => "your-name",
    YourDateOfBirth => "your-date-of-birth",
    YouHaveToldUsYouAreUnder18 => "you-have-told-us-you-are-under-18",
    YourAddress => "your-address",
    CanYouSignYourLpa => "can-you-sign-your-lpa",
    CheckYouCanSign => "check-you-can-sign",
    YourPreferredLanguage => "your-preferred-language",
    LpaType => "lpa-type",

    EnterAttorney => "enter-attorney",
    ChooseAttorneysAddress => "choose-attorneys-address",
    ChooseAttorneysSummary => "choose-attorneys-summary",
    RemoveAttorney => "remove-attorney",
    EnterTrustCorporation => "enter-trust-corporation",
    HowShouldAttorneysMakeDecisions => "how-should-attorneys-make-decisions",

    DoYouWantReplacementAttorneys => "do-you-want-replacement-attorneys",
    EnterReplacementAttorney => "enter-replacement-attorney",
    ChooseReplacementAttorneysAddress => "choose-replacement-attorneys-address",
    HowShouldReplacementAttorneysStepIn => "how-should-replacement-attorneys-step-in",

    WhenCanTheLpaBeUsed => "when-can-the-lpa-be-used",
    LifeSustainingTreatment => "life-sustaining-treatment",
    Restrictions => "restrictions",

    CertificateProviderDetails => "certificate-provider-details",
    HowDoYouKnowYourCertificateProvider => "how-do-you-know-your-certificate-provider",
    CertificateProviderAddress => "certificate-provider-address",
    ConfirmYourCertificateProviderIsNotRelated => "confirm-your-certificate-provider-is-not-related",

    DoYouWantToNotifyPeople => "do-you-want-to-notify-people",
    EnterPersonToNotify => "enter-person-to-notify",
    EnterPersonToNotifyAddress => "enter-person-to-notify-address",
    ChoosePeopleToNotifySummary => "choose-people-to-notify-summary",
    RemovePersonToNotify => "remove-person-to-notify",

    AddCorrespondent => "add-correspondent",
    EnterCorrespondentDetails => "enter-correspondent-details",
    EnterCorrespondentAddress => "enter-correspondent-address",
    ShareCorrespondentDetails => "who-can-correspondents-details-be-shared-with",

    YourAuthorisedSignatory => "your-authorised-signatory",
    YourIndependentWitness => "your-independent-witness",
    YourIndependentWitnessMobile => "your-independent-witness-mobile",

    CheckYourLpa => "check-your-lpa",
    LpaDetailsSaved => "lpa-details-saved",
    YouCannotSignYourLpaYet => "you-cannot-sign-your-lpa-yet",
    WhichFeeTypeAreYouApplyingFor => "which-fee-type-are-you-applying-for",
    PayFee => "pay-fee",
    PaymentConfirmation => "payment-confirmation",
    EvidenceRequired => "evidence-required",

    IdentityDetails => "identity-details",
    RegisterWithCourtOfProtection => "register-with-court-of-protection",
    WhatHappensNextRegisteringWithCourtOfProtection => "what-happens-next-registering-with-court-of-protection",

    ReadYourLpa => "read-your-lpa",
    SignYourLpa => "sign-your-lpa",
    WitnessingYourSignature => "witnessing-your-signature",
    WitnessingAsCertificateProvider => "witnessing-as-certificate-provider",
    WitnessingAsIndependentWitness => "witnessing-as-independent-witness",
    ResendCertificateProviderCode => "resend-certificate-provider-code",
    ResendIndependentWitnessCode => "resend-independent-witness-code",
    YouHaveSubmittedYourLpa => "you-have-submitted-your-lpa",
}

impl Path {
    pub fn format(self, lpa_id: LpaId) -> String {
        format!("/lpa/{lpa_id}/{}", self.slug())
    }

    pub fn at(self, lpa_id: LpaId) -> Destination {
        Destination {
            path: self,
            lpa_id,
            query: Query::default(),
        }
    }

    /// Pages with nothing to submit; they only show guidance.
    pub fn is_content(self) -> bool {
        matches!(
            self,
            Path::YouHaveToldUsYouAreUnder18
                | Path::ShareCorrespondentDetails
                | Path::LpaDetailsSaved
                | Path::YouCannotSignYourLpaYet
                | Path::EvidenceRequired
                | Path::WhatHappensNextRegisteringWithCourtOfProtection
                | Path::ReadYourLpa
                | Path::YouHaveSubmittedYourLpa
        )
    }

    fn allowed_after_signing(self) -> bool {
        matches!(
            self,
            Path::TaskList
                | Path::Progress
                | Path::ReadYourLpa
                | Path::WitnessingYourSignature
                | Path::WitnessingAsCertificateProvider
                | Path::WitnessingAsIndependentWitness
                | Path::ResendCertificateProviderCode
                | Path::ResendIndependentWitnessCode
                | Path::YouHaveSubmittedYourLpa
                | Path::WhichFeeTypeAreYouApplyingFor
                | Path::PayFee
                | Path::PaymentConfirmation
                | Path::EvidenceRequired
                | Path::IdentityDetails
                | Path::RegisterWithCourtOfProtection
                | Path::WhatHappensNextRegisteringWithCourtOfProtection
        )
    }

    /// Whether the donor may visit this page given how far they have got.
    pub fn can_go_to(self, provided: &Provided) -> bool {
        if !provided.can_change() {
            return self.allowed_after_signing();
        }

        let tasks = &provided.tasks;
        let details_and_attorneys =
            tasks.your_details.is_completed() && tasks.choose_attorneys.is_completed();

        match self {
            Path::YourName | Path::YourDateOfBirth => provided.can_change_personal_details(),

            Path::HowShouldAttorneysMakeDecisions => provided.attorneys.len() > 1,

            Path::WhenCanTheLpaBeUsed
            | Path::LifeSustainingTreatment
            | Path::Restrictions
            | Path::CertificateProviderDetails
            | Path::HowDoYouKnowYourCertificateProvider
            | Path::CertificateProviderAddress
            | Path::DoYouWantToNotifyPeople
            | Path::EnterPersonToNotify
            | Path::EnterPersonToNotifyAddress
            | Path::ChoosePeopleToNotifySummary
            | Path::RemovePersonToNotify
            | Path::AddCorrespondent
            | Path::EnterCorrespondentDetails
            | Path::EnterCorrespondentAddress
            | Path::ShareCorrespondentDetails
            | Path::YourAuthorisedSignatory
            | Path::YourIndependentWitness
            | Path::YourIndependentWitnessMobile => details_and_attorneys,

            Path::CheckYourLpa
            | Path::ConfirmYourCertificateProviderIsNotRelated
            | Path::YouCannotSignYourLpaYet
            | Path::LpaDetailsSaved
            | Path::WhichFeeTypeAreYouApplyingFor
            | Path::PayFee
            | Path::PaymentConfirmation
            | Path::EvidenceRequired
            | Path::IdentityDetails
            | Path::RegisterWithCourtOfProtection
            | Path::WhatHappensNextRegisteringWithCourtOfProtection => provided.section1_completed(),

            Path::ReadYourLpa
            | Path::SignYourLpa
            | Path::WitnessingYourSignature
            | Path::WitnessingAsCertificateProvider
            | Path::WitnessingAsIndependentWitness
            | Path::ResendCertificateProviderCode
            | Path::ResendIndependentWitnessCode => {
                provided.section1_completed()
                    && tasks.check_your_lpa.is_completed()
                    && tasks.pay_for_lpa != PaymentState::NotStarted
            }

            _ => true,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Typed parameters that travel in a wizard URL's query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub actor: Option<ActorType>,
    pub from: Option<String>,
    pub id: Option<ActorUid>,
    pub next: Option<String>,
    pub pending: Option<String>,
    pub warning_from: Option<String>,
}

impl Query {
    /// Unknown keys are ignored, as are values that fail to parse.
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::default();
        for (key, value) in form_urlencoded::parse(raw.trim_start_matches('?').as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "actor" => query.actor = value.parse().ok(),
                "from" => query.from = Some(value.into_owned()),
                "id" => query.id = value.parse().ok(),
                "next" => query.next = Some(value.into_owned()),
                "pending" => query.pending = Some(value.into_owned()),
                "warningFrom" => query.warning_from = Some(value.into_owned()),
                _ => {}
            }
        }
        query
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(actor) = self.actor {
            serializer.append_pair("actor", actor.as_str());
        }
        if let Some(from) = &self.from {
            serializer.append_pair("from", from);
        }
        if let Some(id) = self.id {
            serializer.append_pair("id", &id.to_string());
        }
        if let Some(next) = &self.next {
            serializer.append_pair("next", next);
        }
        if let Some(pending) = &self.pending {
            serializer.append_pair("pending", pending);
        }
        if let Some(warning_from) = &self.warning_from {
            serializer.append_pair("warningFrom", warning_from);
        }
        serializer.finish()
    }
}

/// A redirect target: a page of one LPA plus its query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub path: Path,
    pub lpa_id: LpaId,
    pub query: Query,
}

impl Destination {
    pub fn with_id(mut self, id: ActorUid) -> Self {
        self.query.id = Some(id);
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.query.from = Some(from.into());
        self
    }

    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.query.next = Some(next.into());
        self
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn to_url(&self) -> String {
        let base = self.path.format(self.lpa_id);
        if self.query.is_empty() {
            base
        } else {
            format!("{base}?{}", self.query.encode())
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

/// Splits `/lpa/{id}/{slug}?query` back into a destination, if it is one.
pub fn parse_lpa_url(url: &str) -> Option<Destination> {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let rest = path.strip_prefix("/lpa/")?;
    let (id, slug) = rest.split_once('/')?;
    Some(Destination {
        path: Path::from_slug(slug)?,
        lpa_id: id.parse().ok()?,
        query: Query::parse(query),
    })
}

#[cfg(test)]
#[path = "tests/path_tests.rs"]
mod tests;

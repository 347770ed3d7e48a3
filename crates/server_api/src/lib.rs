//! The donor wizard: one async function per page, each taking the loaded
//! aggregate and returning either view data or a redirect.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use integrations::{
    AddressClient, CodeGenerator, EventClient, LpaStoreClient, NotificationSender, SessionStore,
};
use serde::Serialize;
use shared::{
    domain::LpaId,
    error::{ApiError, ErrorCode},
    path::{parse_lpa_url, Destination, Path},
    provided::Provided,
};
use storage::{DonorStore, StoreError};
use tracing::{debug, info};

mod forms;
mod page;
mod steps;
pub mod transitions;
pub mod warning;

pub use page::{FormValues, Method, Outcome, PageOutcome, PageRequest};
pub use steps::*;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn DonorStore>,
    pub address_client: Arc<dyn AddressClient>,
    pub event_client: Arc<dyn EventClient>,
    pub lpa_store_client: Arc<dyn LpaStoreClient>,
    pub notification_sender: Arc<dyn NotificationSender>,
    pub session_store: Arc<dyn SessionStore>,
    pub code_generator: Arc<dyn CodeGenerator>,
    pub clock: Clock,
}

impl ApiContext {
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Loads an LPA for a request, refusing LPAs owned by another session.
pub async fn load_lpa(
    ctx: &ApiContext,
    lpa_id: LpaId,
    session_id: shared::domain::SessionId,
) -> Result<Provided, ApiError> {
    let provided = ctx
        .store
        .get(lpa_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("lpa not found"))?;

    if provided.session_id != session_id {
        return Err(ApiError::new(ErrorCode::Forbidden, "lpa belongs to another session"));
    }
    Ok(provided)
}

pub async fn create_lpa(
    ctx: &ApiContext,
    session_id: shared::domain::SessionId,
) -> Result<Provided, ApiError> {
    let provided = ctx
        .store
        .create(session_id, ctx.now())
        .await
        .map_err(internal)?;
    info!(lpa_id = %provided.lpa_id, "lpa created");
    Ok(provided)
}

/// Runs the page named by `req.path` after checking the donor may visit it.
pub async fn handle(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<PageOutcome, ApiError> {
    let page = req.path;
    if !page.can_go_to(provided) {
        debug!(lpa_id = %provided.lpa_id, %page, "page not reachable yet");
        return Ok(PageOutcome::Redirect(Path::TaskList.format(provided.lpa_id)));
    }

    let outcome = match page {
        Path::TaskList => render(page, task_list(ctx, req, provided).await)?,
        Path::Progress => render(page, progress(ctx, req, provided).await)?,
        Path::Warning => render(page, warning::warning(ctx, req, provided).await)?,

        Path::YourName => render(page, your_name(ctx, req, provided).await)?,
        Path::YourDateOfBirth => render(page, your_date_of_birth(ctx, req, provided).await)?,
        Path::YourAddress => render(page, your_address(ctx, req, provided).await)?,
        Path::CanYouSignYourLpa => render(page, can_you_sign_your_lpa(ctx, req, provided).await)?,
        Path::YourPreferredLanguage => {
            render(page, your_preferred_language(ctx, req, provided).await)?
        }
        Path::LpaType => render(page, lpa_type(ctx, req, provided).await)?,

        Path::EnterAttorney => render(page, enter_attorney(ctx, req, provided).await)?,
        Path::ChooseAttorneysAddress => {
            render(page, choose_attorneys_address(ctx, req, provided).await)?
        }
        Path::ChooseAttorneysSummary => {
            render(page, choose_attorneys_summary(ctx, req, provided).await)?
        }
        Path::RemoveAttorney => render(page, remove_attorney(ctx, req, provided).await)?,
        Path::EnterTrustCorporation => {
            render(page, enter_trust_corporation(ctx, req, provided).await)?
        }
        Path::HowShouldAttorneysMakeDecisions => {
            render(page, how_should_attorneys_make_decisions(ctx, req, provided).await)?
        }

        Path::DoYouWantReplacementAttorneys => {
            render(page, do_you_want_replacement_attorneys(ctx, req, provided).await)?
        }
        Path::EnterReplacementAttorney => {
            render(page, enter_replacement_attorney(ctx, req, provided).await)?
        }
        Path::ChooseReplacementAttorneysAddress => {
            render(page, choose_replacement_attorneys_address(ctx, req, provided).await)?
        }
        Path::HowShouldReplacementAttorneysStepIn => render(
            page,
            how_should_replacement_attorneys_step_in(ctx, req, provided).await,
        )?,

        Path::WhenCanTheLpaBeUsed => {
            render(page, when_can_the_lpa_be_used(ctx, req, provided).await)?
        }
        Path::LifeSustainingTreatment => {
            render(page, life_sustaining_treatment(ctx, req, provided).await)?
        }
        Path::Restrictions => render(page, restrictions(ctx, req, provided).await)?,

        Path::CertificateProviderDetails => {
            render(page, certificate_provider_details(ctx, req, provided).await)?
        }
        Path::HowDoYouKnowYourCertificateProvider => render(
            page,
            how_do_you_know_your_certificate_provider(ctx, req, provided).await,
        )?,
        Path::CertificateProviderAddress => {
            render(page, certificate_provider_address(ctx, req, provided).await)?
        }
        Path::ConfirmYourCertificateProviderIsNotRelated => render(
            page,
            confirm_your_certificate_provider_is_not_related(ctx, req, provided).await,
        )?,

        Path::DoYouWantToNotifyPeople => {
            render(page, do_you_want_to_notify_people(ctx, req, provided).await)?
        }
        Path::EnterPersonToNotify => {
            render(page, enter_person_to_notify(ctx, req, provided).await)?
        }
        Path::EnterPersonToNotifyAddress => {
            render(page, enter_person_to_notify_address(ctx, req, provided).await)?
        }
        Path::ChoosePeopleToNotifySummary => {
            render(page, choose_people_to_notify_summary(ctx, req, provided).await)?
        }
        Path::RemovePersonToNotify => {
            render(page, remove_person_to_notify(ctx, req, provided).await)?
        }

        Path::AddCorrespondent => render(page, add_correspondent(ctx, req, provided).await)?,
        Path::EnterCorrespondentDetails => {
            render(page, enter_correspondent_details(ctx, req, provided).await)?
        }
        Path::EnterCorrespondentAddress => {
            render(page, enter_correspondent_address(ctx, req, provided).await)?
        }

        Path::YourAuthorisedSignatory => {
            render(page, your_authorised_signatory(ctx, req, provided).await)?
        }
        Path::YourIndependentWitness => {
            render(page, your_independent_witness(ctx, req, provided).await)?
        }
        Path::YourIndependentWitnessMobile => {
            render(page, your_independent_witness_mobile(ctx, req, provided).await)?
        }

        Path::CheckYourLpa => render(page, check_your_lpa(ctx, req, provided).await)?,
        Path::WhichFeeTypeAreYouApplyingFor => {
            render(page, which_fee_type_are_you_applying_for(ctx, req, provided).await)?
        }
        Path::PayFee => render(page, pay_fee(ctx, req, provided).await)?,
        Path::PaymentConfirmation => {
            render(page, payment_confirmation(ctx, req, provided).await)?
        }

        Path::IdentityDetails => render(page, identity_details(ctx, req, provided).await)?,
        Path::RegisterWithCourtOfProtection => {
            render(page, register_with_court_of_protection(ctx, req, provided).await)?
        }

        Path::SignYourLpa => render(page, sign_your_lpa(ctx, req, provided).await)?,
        Path::WitnessingYourSignature => {
            render(page, witnessing_your_signature(ctx, req, provided).await)?
        }
        Path::WitnessingAsCertificateProvider => {
            render(page, witnessing_as_certificate_provider(ctx, req, provided).await)?
        }
        Path::WitnessingAsIndependentWitness => {
            render(page, witnessing_as_independent_witness(ctx, req, provided).await)?
        }
        Path::ResendCertificateProviderCode => {
            render(page, resend_certificate_provider_code(ctx, req, provided).await)?
        }
        Path::ResendIndependentWitnessCode => {
            render(page, resend_independent_witness_code(ctx, req, provided).await)?
        }

        Path::CheckYouCanSign => render(page, check_you_can_sign(ctx, req, provided).await)?,

        Path::YouHaveToldUsYouAreUnder18
        | Path::ShareCorrespondentDetails
        | Path::LpaDetailsSaved
        | Path::YouCannotSignYourLpaYet
        | Path::EvidenceRequired
        | Path::WhatHappensNextRegisteringWithCourtOfProtection
        | Path::ReadYourLpa
        | Path::YouHaveSubmittedYourLpa => render(page, content(ctx, req, provided).await)?,
    };

    Ok(follow_from(outcome, req, provided.lpa_id))
}

fn render<V: Serialize>(
    page: Path,
    outcome: Result<Outcome<V>, ApiError>,
) -> Result<PageOutcome, ApiError> {
    page::erase(page, outcome?)
}

/// A `from` parameter pointing back into the same LPA takes priority over
/// the step's own redirect, so "change" links return to where they started.
/// Interruptions keep their own target.
fn follow_from(outcome: PageOutcome, req: &PageRequest, lpa_id: LpaId) -> PageOutcome {
    let PageOutcome::Redirect(target) = &outcome else {
        return outcome;
    };
    if !req.is_post() {
        return outcome;
    }

    let interrupted = parse_lpa_url(target).is_some_and(|destination| {
        matches!(
            destination.path,
            Path::Warning | Path::YouHaveToldUsYouAreUnder18
        )
    });
    if interrupted {
        return outcome;
    }

    match from_override(req, lpa_id) {
        Some(destination) => PageOutcome::Redirect(destination.to_url()),
        None => outcome,
    }
}

/// The `from` query or form value, when it points back into the same LPA.
pub(crate) fn from_override(req: &PageRequest, lpa_id: LpaId) -> Option<Destination> {
    let from = req
        .query
        .from
        .as_deref()
        .or_else(|| Some(req.form.get("from")).filter(|from| !from.is_empty()))?;
    parse_lpa_url(from).filter(|destination| destination.lpa_id == lpa_id)
}

/// Persists `after` only when it differs from what was loaded.
pub(crate) async fn save(
    ctx: &ApiContext,
    before: &Provided,
    mut after: Provided,
) -> Result<Provided, ApiError> {
    if &after == before {
        debug!(lpa_id = %before.lpa_id, "no changes to store");
        return Ok(after);
    }

    after.updated_at = Some(ctx.now());
    let stored = ctx.store.put(&after).await.map_err(internal)?;
    debug!(lpa_id = %stored.lpa_id, version = stored.version, "lpa stored");
    Ok(stored)
}

pub(crate) fn redirect<V>(destination: Destination) -> Result<Outcome<V>, ApiError> {
    Ok(Outcome::Redirect(destination))
}

pub(crate) fn internal(err: anyhow::Error) -> ApiError {
    if let Some(store_error @ StoreError::Conflict { .. }) = err.downcast_ref::<StoreError>() {
        return ApiError::new(ErrorCode::Conflict, store_error.to_string());
    }
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

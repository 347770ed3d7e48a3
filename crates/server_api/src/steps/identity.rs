use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    domain::{Address, YesNo},
    error::ApiError,
    provided::Provided,
    validation::ValidationList,
};
use tracing::info;

use crate::{
    forms::{read_choice, validate_choice},
    internal, redirect, save,
    transitions::{self, Transition},
    ApiContext, Outcome, PageRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityDetailsData {
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Address,
    pub details_match: Option<YesNo>,
    pub errors: ValidationList,
}

/// The donor compares the details on their LPA with the ones their identity
/// was confirmed against.
pub async fn identity_details(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<IdentityDetailsData>, ApiError> {
    let mut data = IdentityDetailsData {
        full_name: provided.donor.full_name(),
        date_of_birth: provided.donor.date_of_birth,
        address: provided.donor.address.clone(),
        details_match: None,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.details_match = read_choice(&req.form, "details-match");
    validate_choice(
        &mut data.errors,
        "details-match",
        "yesIfTheDetailsMatch",
        data.details_match,
    );
    let Some(details_match) = data.details_match else {
        return Ok(Outcome::Render(data));
    };

    let mut after = provided.clone();
    if details_match == YesNo::Yes && after.identity_confirmed_at.is_none() {
        after.identity_confirmed_at = Some(ctx.now());
    }
    let Transition { tasks, next } = transitions::identity_details(&after.tasks, details_match);
    after.tasks = tasks;
    save(ctx, provided, after).await?;
    info!(lpa_id = %provided.lpa_id, %details_match, "identity details answered");
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterWithCourtData {
    pub answer: Option<YesNo>,
    pub errors: ValidationList,
}

pub async fn register_with_court_of_protection(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<RegisterWithCourtData>, ApiError> {
    let mut data = RegisterWithCourtData {
        answer: None,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.answer = read_choice(&req.form, "yes-no");
    validate_choice(
        &mut data.errors,
        "yes-no",
        "yesToRegisterWithCourtOfProtection",
        data.answer,
    );
    let Some(answer) = data.answer else {
        return Ok(Outcome::Render(data));
    };

    let mut after = provided.clone();
    after.registering_with_court_of_protection = answer == YesNo::Yes;
    let Transition { tasks, next } =
        transitions::register_with_court_of_protection(&after.tasks, answer);
    after.tasks = tasks;
    let saved = save(ctx, provided, after).await?;

    if answer == YesNo::Yes
        && !provided.registering_with_court_of_protection
        && !saved.lpa_uid.is_empty()
    {
        ctx.event_client
            .send_register_with_court_of_protection(&saved.lpa_uid)
            .await
            .map_err(internal)?;
        info!(lpa_id = %saved.lpa_id, "registering with court of protection");
    }

    redirect(next.at(provided.lpa_id))
}

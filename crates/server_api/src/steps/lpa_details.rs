use serde::Serialize;
use shared::{
    domain::{CanBeUsedWhen, LifeSustainingTreatment, LpaType},
    error::ApiError,
    path::Path,
    provided::Provided,
    validation::{Check, ValidationList},
};

use crate::{
    forms::{read_choice, validate_choice, RESTRICTIONS_MAX},
    redirect, save,
    transitions::{self, Transition},
    ApiContext, Outcome, PageRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhenCanTheLpaBeUsedData {
    pub when: Option<CanBeUsedWhen>,
    pub options: &'static [&'static str],
    pub errors: ValidationList,
}

pub async fn when_can_the_lpa_be_used(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<WhenCanTheLpaBeUsedData>, ApiError> {
    if provided.lpa_type == Some(LpaType::PersonalWelfare) {
        return redirect(Path::TaskList.at(provided.lpa_id));
    }

    let mut data = WhenCanTheLpaBeUsedData {
        when: provided.when_can_the_lpa_be_used,
        options: CanBeUsedWhen::VALUES,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.when = read_choice(&req.form, "when");
    validate_choice(&mut data.errors, "when", "whenYourAttorneysCanUseYourLpa", data.when);
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.when_can_the_lpa_be_used = data.when;
    let Transition { tasks, next } =
        transitions::lpa_detail_answered(&after.tasks, Path::WhenCanTheLpaBeUsed);
    after.tasks = tasks;
    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifeSustainingTreatmentData {
    pub option: Option<LifeSustainingTreatment>,
    pub options: &'static [&'static str],
    pub errors: ValidationList,
}

pub async fn life_sustaining_treatment(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<LifeSustainingTreatmentData>, ApiError> {
    if provided.lpa_type != Some(LpaType::PersonalWelfare) {
        return redirect(Path::TaskList.at(provided.lpa_id));
    }

    let mut data = LifeSustainingTreatmentData {
        option: provided.life_sustaining_treatment_option,
        options: LifeSustainingTreatment::VALUES,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.option = read_choice(&req.form, "option");
    validate_choice(&mut data.errors, "option", "ifTheDonorGivesConsentToLifeSustainingTreatment", data.option);
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.life_sustaining_treatment_option = data.option;
    let Transition { tasks, next } =
        transitions::lpa_detail_answered(&after.tasks, Path::LifeSustainingTreatment);
    after.tasks = tasks;
    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestrictionsData {
    pub restrictions: String,
    pub max_length: usize,
    pub errors: ValidationList,
}

/// Restrictions are optional; submitting an empty box still completes the
/// task.
pub async fn restrictions(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<RestrictionsData>, ApiError> {
    let mut data = RestrictionsData {
        restrictions: provided.restrictions.clone(),
        max_length: RESTRICTIONS_MAX,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.restrictions = req.form.get("restrictions").to_string();
    data.errors.string(
        "restrictions",
        "restrictions",
        &data.restrictions,
        &[Check::StringTooLong(RESTRICTIONS_MAX)],
    );
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.restrictions = data.restrictions;
    let Transition { tasks, next } =
        transitions::lpa_detail_answered(&after.tasks, Path::Restrictions);
    after.tasks = tasks;
    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

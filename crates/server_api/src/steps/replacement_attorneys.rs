use serde::Serialize;
use shared::{
    domain::{ActorUid, ReplacementAttorneysStepIn, YesNo},
    error::ApiError,
    path::Path,
    provided::{Attorney, Attorneys, Provided},
    validation::{Check, ValidationList},
};

use super::{
    address::{address_step, AddressData, AddressStep},
    attorneys::{attorney_for, AttorneyForm},
};
use crate::{
    forms::{read_choice, validate_choice},
    redirect, save,
    transitions::{self, Transition},
    warning::{commit_or_warn, replacement_state, PendingChange},
    ApiContext, Outcome, PageRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WantReplacementAttorneysData {
    pub want: Option<YesNo>,
    pub replacement_attorneys: Attorneys,
    pub errors: ValidationList,
}

/// Answering "no" drops any replacements already entered.
pub async fn do_you_want_replacement_attorneys(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<WantReplacementAttorneysData>, ApiError> {
    let mut data = WantReplacementAttorneysData {
        want: provided.want_replacement_attorneys,
        replacement_attorneys: provided.replacement_attorneys.clone(),
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.want = read_choice(&req.form, "yes-no");
    validate_choice(&mut data.errors, "yes-no", "yesToAddReplacementAttorneys", data.want);
    let Some(want) = data.want else {
        return Ok(Outcome::Render(data));
    };

    let mut after = provided.clone();
    after.want_replacement_attorneys = Some(want);
    if want == YesNo::No {
        after.replacement_attorneys = Attorneys::default();
    }
    after.update_decisions();

    let Transition { mut tasks, next } = transitions::want_replacement_attorneys(&after.tasks, want);
    let has_replacements = !after.replacement_attorneys.is_empty();
    if has_replacements {
        tasks.choose_replacement_attorneys = replacement_state(&after);
    }
    after.tasks = tasks;
    save(ctx, provided, after).await?;

    let destination = match next {
        Path::EnterReplacementAttorney if has_replacements => Path::TaskList.at(provided.lpa_id),
        Path::EnterReplacementAttorney => next.at(provided.lpa_id).with_id(ActorUid::new()),
        _ => next.at(provided.lpa_id),
    };
    redirect(destination)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnterReplacementAttorneyData {
    pub form: AttorneyForm,
    pub id: ActorUid,
    pub errors: ValidationList,
}

pub async fn enter_replacement_attorney(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<EnterReplacementAttorneyData>, ApiError> {
    let attorney = attorney_for(&provided.replacement_attorneys, req.query.id);
    let mut data = EnterReplacementAttorneyData {
        form: AttorneyForm::from_attorney(&attorney),
        id: attorney.uid,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.form = AttorneyForm::read(req);
    data.errors = data.form.validate(ctx);
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let attorney: Attorney = data.form.apply_to(attorney);
    commit_or_warn(
        ctx,
        req,
        provided,
        PendingChange::ReplacementAttorney { attorney },
    )
    .await
}

pub async fn choose_replacement_attorneys_address(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<AddressData>, ApiError> {
    let Some(attorney) = req
        .query
        .id
        .and_then(|uid| provided.replacement_attorneys.get(uid))
    else {
        return redirect(Path::TaskList.at(provided.lpa_id));
    };

    let step = address_step(
        ctx,
        req,
        attorney.full_name(),
        Some(attorney.uid),
        &attorney.address,
    )
    .await?;

    match step {
        AddressStep::Show(data) => Ok(Outcome::Render(data)),
        AddressStep::Chosen(address) => {
            let mut after = provided.clone();
            after.replacement_attorneys.put(Attorney {
                address,
                ..attorney.clone()
            });
            let state = replacement_state(&after);
            let Transition { tasks, next } = transitions::replacement_address_entered(
                &after.tasks,
                &after.attorney_decisions,
                after.how_should_replacement_attorneys_step_in.is_some(),
                state,
            );
            after.tasks = tasks;
            save(ctx, provided, after).await?;
            redirect(next.at(provided.lpa_id))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepInData {
    pub when: Option<ReplacementAttorneysStepIn>,
    pub other_details: String,
    pub options: &'static [&'static str],
    pub errors: ValidationList,
}

pub async fn how_should_replacement_attorneys_step_in(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<StepInData>, ApiError> {
    let mut data = StepInData {
        when: provided.how_should_replacement_attorneys_step_in,
        other_details: provided
            .how_should_replacement_attorneys_step_in_details
            .clone(),
        options: ReplacementAttorneysStepIn::VALUES,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.when = read_choice(&req.form, "when-to-step-in");
    data.other_details = req.form.get("other-details").to_string();
    validate_choice(
        &mut data.errors,
        "when-to-step-in",
        "whenYourReplacementAttorneysStepIn",
        data.when,
    );
    if data.when == Some(ReplacementAttorneysStepIn::AnotherWay) {
        data.errors
            .string("other-details", "details", &data.other_details, &[Check::Empty]);
    } else {
        data.other_details.clear();
    }
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.how_should_replacement_attorneys_step_in = data.when;
    after.how_should_replacement_attorneys_step_in_details = data.other_details;
    let state = replacement_state(&after);
    let Transition { tasks, next } = transitions::replacement_step_in_chosen(&after.tasks, state);
    after.tasks = tasks;
    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

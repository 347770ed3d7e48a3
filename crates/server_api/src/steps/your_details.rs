use serde::Serialize;
use shared::{
    domain::{Lang, LpaType, YesNo, YesNoMaybe},
    error::ApiError,
    path::Path,
    provided::Provided,
    validation::{Check, DateCheck, DateInput, FieldError, ValidationList},
};
use tracing::info;

use super::address::{address_step, AddressData, AddressStep};
use crate::{
    forms::{read_choice, read_date, validate_choice, NameForm, OTHER_NAMES_MAX},
    internal, redirect, save,
    transitions::{self, Transition},
    warning::{commit_or_warn, PendingChange},
    ApiContext, Outcome, PageRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YourNameData {
    pub form: NameForm,
    pub other_names: String,
    pub errors: ValidationList,
}

pub async fn your_name(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<YourNameData>, ApiError> {
    let mut data = YourNameData {
        form: NameForm {
            first_names: provided.donor.first_names.clone(),
            last_name: provided.donor.last_name.clone(),
        },
        other_names: provided.donor.other_names.clone(),
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.form = NameForm::read(&req.form);
    data.other_names = req.form.get("other-names").to_string();
    data.errors = data.form.validate();
    data.errors.string(
        "other-names",
        "otherNamesLabel",
        &data.other_names,
        &[Check::StringTooLong(OTHER_NAMES_MAX)],
    );
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let change = PendingChange::DonorName {
        first_names: data.form.first_names,
        last_name: data.form.last_name,
        other_names: data.other_names,
    };
    commit_or_warn(ctx, req, provided, change).await
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YourDateOfBirthData {
    pub date_of_birth: DateInput,
    pub errors: ValidationList,
}

pub async fn your_date_of_birth(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<YourDateOfBirthData>, ApiError> {
    let mut data = YourDateOfBirthData {
        date_of_birth: DateInput::from_date(provided.donor.date_of_birth),
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.date_of_birth = read_date(&req.form, "date-of-birth");
    data.errors.date(
        "date-of-birth",
        "dateOfBirth",
        &data.date_of_birth,
        &[
            DateCheck::Missing,
            DateCheck::MustBeReal,
            DateCheck::MustBePast(ctx.today()),
        ],
    );

    let Some(date_of_birth) = data.date_of_birth.date().filter(|_| data.errors.is_empty()) else {
        return Ok(Outcome::Render(data));
    };

    commit_or_warn(
        ctx,
        req,
        provided,
        PendingChange::DonorDateOfBirth { date_of_birth },
    )
    .await
}

pub async fn your_address(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<AddressData>, ApiError> {
    let step = address_step(
        ctx,
        req,
        provided.donor.full_name(),
        None,
        &provided.donor.address,
    )
    .await?;

    match step {
        AddressStep::Show(data) => Ok(Outcome::Render(data)),
        AddressStep::Chosen(address) => {
            let mut after = provided.clone();
            after.donor.address = address;
            let Transition { tasks, next } =
                transitions::your_details(&after.tasks, Path::YourAddress);
            after.tasks = tasks;
            save(ctx, provided, after).await?;
            redirect(next.at(provided.lpa_id))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanYouSignData {
    pub can_sign: Option<YesNoMaybe>,
    pub options: &'static [&'static str],
    pub errors: ValidationList,
}

pub async fn can_you_sign_your_lpa(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<CanYouSignData>, ApiError> {
    let mut data = CanYouSignData {
        can_sign: provided.donor.thinks_can_sign,
        options: YesNoMaybe::VALUES,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.can_sign = read_choice(&req.form, "can-sign");
    validate_choice(&mut data.errors, "can-sign", "yesIfCanSign", data.can_sign);
    let Some(answer) = data.can_sign else {
        return Ok(Outcome::Render(data));
    };

    let mut after = provided.clone();
    after.donor.thinks_can_sign = Some(answer);
    after.donor.can_sign = (answer == YesNoMaybe::Yes).then_some(YesNo::Yes);
    let Transition { tasks, next } = transitions::can_you_sign(&after.tasks, answer);
    after.tasks = tasks;

    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckYouCanSignData {
    pub can_sign: Option<YesNo>,
    pub errors: ValidationList,
}

pub async fn check_you_can_sign(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<CheckYouCanSignData>, ApiError> {
    let mut data = CheckYouCanSignData {
        can_sign: provided.donor.can_sign,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.can_sign = read_choice(&req.form, "can-sign");
    validate_choice(&mut data.errors, "can-sign", "yesIfCanSign", data.can_sign);
    let Some(answer) = data.can_sign else {
        return Ok(Outcome::Render(data));
    };

    let mut after = provided.clone();
    after.donor.can_sign = Some(answer);
    if answer == YesNo::Yes {
        after.authorised_signatory = Default::default();
        after.independent_witness = Default::default();
        after.tasks.choose_your_signatory = Default::default();
    }
    let Transition { tasks, next } = transitions::check_you_can_sign(&after.tasks);
    after.tasks = tasks;

    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferredLanguageData {
    pub contact_language: Option<Lang>,
    pub lpa_language: Option<Lang>,
    pub errors: ValidationList,
}

pub async fn your_preferred_language(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<PreferredLanguageData>, ApiError> {
    let mut data = PreferredLanguageData {
        contact_language: provided.donor.contact_language_preference,
        lpa_language: provided.donor.lpa_language_preference,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.contact_language = read_choice(&req.form, "contact-language");
    data.lpa_language = read_choice(&req.form, "lpa-language");
    validate_choice(
        &mut data.errors,
        "contact-language",
        "whichLanguageYouWouldLikeUsToUseWhenWeContactYou",
        data.contact_language,
    );
    validate_choice(
        &mut data.errors,
        "lpa-language",
        "whichLanguageYouWouldLikeYourLpaToBeRegisteredIn",
        data.lpa_language,
    );
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.donor.contact_language_preference = data.contact_language;
    after.donor.lpa_language_preference = data.lpa_language;
    let Transition { tasks, next } =
        transitions::your_preferred_language(&after.tasks, after.lpa_type);
    after.tasks = tasks;

    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LpaTypeData {
    pub lpa_type: Option<LpaType>,
    pub options: &'static [&'static str],
    pub can_change: bool,
    pub errors: ValidationList,
}

/// Choosing the type is what allows a uid to be requested, so the first
/// answer also asks the uid service for one. Only property and affairs LPAs
/// can appoint a trust corporation, so one must be removed before switching.
pub async fn lpa_type(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<LpaTypeData>, ApiError> {
    let mut data = LpaTypeData {
        lpa_type: provided.lpa_type,
        options: LpaType::VALUES,
        can_change: provided.lpa_uid.is_empty(),
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.lpa_type = read_choice(&req.form, "lpa-type");
    validate_choice(&mut data.errors, "lpa-type", "theTypeOfLpaToMake", data.lpa_type);
    let Some(chosen) = data.lpa_type else {
        return Ok(Outcome::Render(data));
    };
    if chosen == LpaType::PersonalWelfare
        && (provided.attorneys.trust_corporation.is_some()
            || provided.replacement_attorneys.trust_corporation.is_some())
    {
        data.errors.add(
            "lpa-type",
            FieldError::custom("youMustDeleteTrustCorporationToChangeLpaType"),
        );
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.lpa_type = Some(chosen);
    let Transition { tasks, next } = transitions::lpa_type(&after.tasks, provided.lpa_type, chosen);
    after.tasks = tasks;

    let saved = save(ctx, provided, after).await?;
    if saved.lpa_uid.is_empty() {
        ctx.event_client
            .send_uid_requested(&saved)
            .await
            .map_err(internal)?;
        info!(lpa_id = %saved.lpa_id, lpa_type = %chosen, "uid requested");
    }

    redirect(next.at(provided.lpa_id))
}

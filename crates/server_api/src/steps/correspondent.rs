use serde::Serialize;
use shared::{
    domain::{ActorUid, YesNo},
    error::ApiError,
    provided::{Correspondent, Provided},
    validation::{Check, ValidationList},
};

use super::address::{address_step, AddressData, AddressStep};
use crate::{
    forms::{read_choice, validate_choice, NameForm},
    redirect, save,
    transitions::{self, Transition},
    warning::{commit_or_warn, PendingChange},
    ApiContext, Outcome, PageRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddCorrespondentData {
    pub add_correspondent: Option<YesNo>,
    pub errors: ValidationList,
}

/// Answering "no" forgets any correspondent entered earlier.
pub async fn add_correspondent(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<AddCorrespondentData>, ApiError> {
    let mut data = AddCorrespondentData {
        add_correspondent: provided.add_correspondent,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.add_correspondent = read_choice(&req.form, "add-correspondent");
    validate_choice(
        &mut data.errors,
        "add-correspondent",
        "yesToAddCorrespondent",
        data.add_correspondent,
    );
    let Some(answer) = data.add_correspondent else {
        return Ok(Outcome::Render(data));
    };

    let mut after = provided.clone();
    after.add_correspondent = Some(answer);
    if answer == YesNo::No {
        after.correspondent = Correspondent::default();
    }
    let Transition { tasks, next } = transitions::add_correspondent(&after.tasks, answer);
    after.tasks = tasks;
    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrespondentForm {
    pub name: NameForm,
    pub email: String,
    pub organisation: String,
    pub telephone: String,
    pub want_address: Option<YesNo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrespondentDetailsData {
    pub form: CorrespondentForm,
    pub errors: ValidationList,
}

pub async fn enter_correspondent_details(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<CorrespondentDetailsData>, ApiError> {
    let current = &provided.correspondent;
    let mut data = CorrespondentDetailsData {
        form: CorrespondentForm {
            name: NameForm {
                first_names: current.first_names.clone(),
                last_name: current.last_name.clone(),
            },
            email: current.email.clone(),
            organisation: current.organisation.clone(),
            telephone: current.telephone.clone(),
            want_address: current.want_address,
        },
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.form = CorrespondentForm {
        name: NameForm::read(&req.form),
        email: req.form.get("email").to_string(),
        organisation: req.form.get("organisation").to_string(),
        telephone: req.form.get("telephone").to_string(),
        want_address: read_choice(&req.form, "want-address"),
    };
    data.errors = data.form.name.validate();
    data.errors
        .string("email", "email", &data.form.email, &[Check::Empty, Check::Email]);
    validate_choice(
        &mut data.errors,
        "want-address",
        "yesToAddAnAddressForYourCorrespondent",
        data.form.want_address,
    );
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let correspondent = Correspondent {
        uid: if current.uid.is_nil() {
            ActorUid::new()
        } else {
            current.uid
        },
        first_names: data.form.name.first_names,
        last_name: data.form.name.last_name,
        email: data.form.email,
        organisation: data.form.organisation,
        telephone: data.form.telephone,
        want_address: data.form.want_address,
        address: current.address.clone(),
    };
    commit_or_warn(
        ctx,
        req,
        provided,
        PendingChange::Correspondent { correspondent },
    )
    .await
}

pub async fn enter_correspondent_address(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<AddressData>, ApiError> {
    let correspondent = &provided.correspondent;
    let step = address_step(
        ctx,
        req,
        correspondent.full_name(),
        None,
        &correspondent.address,
    )
    .await?;

    match step {
        AddressStep::Show(data) => Ok(Outcome::Render(data)),
        AddressStep::Chosen(address) => {
            let mut after = provided.clone();
            after.correspondent.address = address;
            let Transition { tasks, next } = transitions::correspondent_address(&after.tasks);
            after.tasks = tasks;
            save(ctx, provided, after).await?;
            redirect(next.at(provided.lpa_id))
        }
    }
}

use serde::Serialize;
use shared::{
    domain::ActorUid,
    error::ApiError,
    path::Path,
    provided::{AuthorisedSignatory, Provided},
    validation::{Check, ValidationList},
};

use crate::{
    forms::NameForm,
    redirect, save,
    transitions::{self, Transition},
    warning::{commit_or_warn, PendingChange},
    ApiContext, Outcome, PageRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningHelpNameData {
    pub form: NameForm,
    pub errors: ValidationList,
}

pub async fn your_authorised_signatory(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<SigningHelpNameData>, ApiError> {
    if !provided.donor_cannot_sign() {
        return redirect(Path::TaskList.at(provided.lpa_id));
    }

    let current = &provided.authorised_signatory;
    let mut data = SigningHelpNameData {
        form: NameForm {
            first_names: current.first_names.clone(),
            last_name: current.last_name.clone(),
        },
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.form = NameForm::read(&req.form);
    data.errors = data.form.validate();
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let signatory = AuthorisedSignatory {
        uid: if current.uid.is_nil() {
            ActorUid::new()
        } else {
            current.uid
        },
        first_names: data.form.first_names,
        last_name: data.form.last_name,
    };
    commit_or_warn(
        ctx,
        req,
        provided,
        PendingChange::AuthorisedSignatory { signatory },
    )
    .await
}

pub async fn your_independent_witness(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<SigningHelpNameData>, ApiError> {
    if !provided.donor_cannot_sign() {
        return redirect(Path::TaskList.at(provided.lpa_id));
    }

    let mut data = SigningHelpNameData {
        form: NameForm {
            first_names: provided.independent_witness.first_names.clone(),
            last_name: provided.independent_witness.last_name.clone(),
        },
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.form = NameForm::read(&req.form);
    data.errors = data.form.validate();
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let change = PendingChange::IndependentWitness {
        first_names: data.form.first_names,
        last_name: data.form.last_name,
    };
    commit_or_warn(ctx, req, provided, change).await
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WitnessMobileData {
    pub full_name: String,
    pub mobile: String,
    pub has_non_uk_mobile: bool,
    pub errors: ValidationList,
}

/// The witness code is sent by text, so a mobile is required.
pub async fn your_independent_witness_mobile(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<WitnessMobileData>, ApiError> {
    if !provided.donor_cannot_sign() {
        return redirect(Path::TaskList.at(provided.lpa_id));
    }

    let witness = &provided.independent_witness;
    let mut data = WitnessMobileData {
        full_name: witness.full_name(),
        mobile: witness.mobile.clone(),
        has_non_uk_mobile: witness.has_non_uk_mobile,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.has_non_uk_mobile = req.form.get("has-non-uk-mobile") == "1";
    if data.has_non_uk_mobile {
        data.mobile = req.form.get("non-uk-mobile").to_string();
        data.errors.string(
            "non-uk-mobile",
            "mobile",
            &data.mobile,
            &[Check::Empty, Check::NonUkMobile],
        );
    } else {
        data.mobile = req.form.get("mobile").to_string();
        data.errors
            .string("mobile", "mobile", &data.mobile, &[Check::Empty, Check::Mobile]);
    }
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.independent_witness.mobile = data.mobile;
    after.independent_witness.has_non_uk_mobile = data.has_non_uk_mobile;
    let Transition { tasks, next } =
        transitions::signing_help(&after.tasks, Path::YourIndependentWitnessMobile);
    after.tasks = tasks;
    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

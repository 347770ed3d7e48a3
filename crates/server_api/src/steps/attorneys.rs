use serde::Serialize;
use shared::{
    domain::{ActorUid, AttorneysAct, LpaType, YesNo},
    error::ApiError,
    path::Path,
    provided::{Attorney, Attorneys, Provided, TrustCorporation},
    validation::{Check, DateCheck, DateInput, ValidationList},
};
use tracing::info;

use super::address::{address_step, AddressData, AddressStep};
use crate::{
    forms::{read_choice, read_date, validate_choice, AddressAction, AddressForm, NameForm},
    redirect, save,
    transitions::{self, Transition},
    warning::{commit_or_warn, replacement_state, PendingChange},
    ApiContext, Outcome, PageRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttorneyForm {
    pub name: NameForm,
    pub email: String,
    pub date_of_birth: DateInput,
}

impl AttorneyForm {
    pub(crate) fn from_attorney(attorney: &Attorney) -> Self {
        Self {
            name: NameForm {
                first_names: attorney.first_names.clone(),
                last_name: attorney.last_name.clone(),
            },
            email: attorney.email.clone(),
            date_of_birth: DateInput::from_date(attorney.date_of_birth),
        }
    }

    pub(crate) fn read(req: &PageRequest) -> Self {
        Self {
            name: NameForm::read(&req.form),
            email: req.form.get("email").to_string(),
            date_of_birth: read_date(&req.form, "date-of-birth"),
        }
    }

    pub(crate) fn validate(&self, ctx: &ApiContext) -> ValidationList {
        let mut errors = self.name.validate();
        errors.string("email", "email", &self.email, &[Check::Email]);
        errors.date(
            "date-of-birth",
            "dateOfBirth",
            &self.date_of_birth,
            &[
                DateCheck::Missing,
                DateCheck::MustBeReal,
                DateCheck::MustBePast(ctx.today()),
            ],
        );
        errors
    }

    /// Merges the answers into the attorney being edited, keeping its address.
    pub(crate) fn apply_to(&self, mut attorney: Attorney) -> Attorney {
        attorney.first_names = self.name.first_names.clone();
        attorney.last_name = self.name.last_name.clone();
        attorney.email = self.email.clone();
        attorney.date_of_birth = self.date_of_birth.date();
        attorney
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnterAttorneyData {
    pub form: AttorneyForm,
    pub id: ActorUid,
    pub show_trust_corporation_link: bool,
    pub errors: ValidationList,
}

/// The attorney named by `?id=`, or a fresh one with a new uid.
pub(crate) fn attorney_for(list: &Attorneys, id: Option<ActorUid>) -> Attorney {
    id.and_then(|uid| list.get(uid).cloned())
        .unwrap_or_else(|| Attorney {
            uid: id.unwrap_or_else(ActorUid::new),
            ..Attorney::default()
        })
}

pub async fn enter_attorney(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<EnterAttorneyData>, ApiError> {
    let attorney = attorney_for(&provided.attorneys, req.query.id);
    let mut data = EnterAttorneyData {
        form: AttorneyForm::from_attorney(&attorney),
        id: attorney.uid,
        show_trust_corporation_link: provided.lpa_type == Some(LpaType::PropertyAndAffairs)
            && provided.attorneys.trust_corporation.is_none()
            && provided.replacement_attorneys.trust_corporation.is_none(),
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

    let attorney = data.form.apply_to(attorney);
    commit_or_warn(ctx, req, provided, PendingChange::Attorney { attorney }).await
}

pub async fn choose_attorneys_address(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<AddressData>, ApiError> {
    let Some(attorney) = req.query.id.and_then(|uid| provided.attorneys.get(uid)) else {
        return redirect(Path::ChooseAttorneysSummary.at(provided.lpa_id));
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
            after.attorneys.put(Attorney {
                address,
                ..attorney.clone()
            });
            let Transition { tasks, next } = transitions::attorney_address_entered(
                &after.tasks,
                &after.attorneys,
                &after.attorney_decisions,
            );
            after.tasks = tasks;
            save(ctx, provided, after).await?;
            redirect(next.at(provided.lpa_id))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttorneySummaryData {
    pub attorneys: Attorneys,
    pub add_more: Option<YesNo>,
    pub errors: ValidationList,
}

pub async fn choose_attorneys_summary(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<AttorneySummaryData>, ApiError> {
    if provided.attorneys.is_empty() {
        return redirect(Path::EnterAttorney.at(provided.lpa_id));
    }

    let mut data = AttorneySummaryData {
        attorneys: provided.attorneys.clone(),
        add_more: None,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.add_more = read_choice(&req.form, "add-attorney");
    validate_choice(&mut data.errors, "add-attorney", "yesToAddAnotherAttorney", data.add_more);
    let Some(add_more) = data.add_more else {
        return Ok(Outcome::Render(data));
    };

    let mut after = provided.clone();
    let Transition { tasks, next } = transitions::attorneys_summary(
        &after.tasks,
        add_more == YesNo::Yes,
        &after.attorneys,
        &after.attorney_decisions,
    );
    after.tasks = tasks;
    save(ctx, provided, after).await?;

    let mut destination = next.at(provided.lpa_id);
    if next == Path::EnterAttorney {
        destination = destination.with_id(ActorUid::new());
    }
    redirect(destination)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveAttorneyData {
    pub id: ActorUid,
    pub full_name: String,
    pub errors: ValidationList,
}

pub async fn remove_attorney(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<RemoveAttorneyData>, ApiError> {
    let Some(attorney) = req.query.id.and_then(|uid| provided.attorneys.get(uid)) else {
        return redirect(Path::ChooseAttorneysSummary.at(provided.lpa_id));
    };

    let mut data = RemoveAttorneyData {
        id: attorney.uid,
        full_name: attorney.full_name(),
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    let answer: Option<YesNo> = read_choice(&req.form, "yes-no");
    validate_choice(&mut data.errors, "yes-no", "yesToRemoveAttorney", answer);
    match answer {
        None => Ok(Outcome::Render(data)),
        Some(YesNo::No) => redirect(Path::ChooseAttorneysSummary.at(provided.lpa_id)),
        Some(YesNo::Yes) => {
            let mut after = provided.clone();
            after.attorneys.remove(attorney.uid);
            after.update_decisions();
            let Transition { tasks, next } = transitions::attorney_removed(
                &after.tasks,
                &after.attorneys,
                &after.attorney_decisions,
            );
            after.tasks = tasks;
            if after.want_replacement_attorneys.is_some() {
                after.tasks.choose_replacement_attorneys = replacement_state(&after);
            }
            save(ctx, provided, after).await?;
            info!(lpa_id = %provided.lpa_id, uid = %attorney.uid, "attorney removed");
            redirect(next.at(provided.lpa_id))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustCorporationForm {
    pub name: String,
    pub company_number: String,
    pub email: String,
    pub address: AddressForm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnterTrustCorporationData {
    pub form: TrustCorporationForm,
    pub errors: ValidationList,
}

/// Only property and affairs LPAs can appoint a trust corporation, and the
/// address is entered on the same page.
pub async fn enter_trust_corporation(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<EnterTrustCorporationData>, ApiError> {
    if provided.lpa_type != Some(LpaType::PropertyAndAffairs) {
        return redirect(Path::EnterAttorney.at(provided.lpa_id));
    }

    let current = provided
        .attorneys
        .trust_corporation
        .clone()
        .unwrap_or_else(|| TrustCorporation {
            uid: ActorUid::new(),
            ..TrustCorporation::default()
        });
    let mut data = EnterTrustCorporationData {
        form: TrustCorporationForm {
            name: current.name.clone(),
            company_number: current.company_number.clone(),
            email: current.email.clone(),
            address: AddressForm::from_address(&current.address),
        },
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    let mut address = AddressForm::read(&req.form);
    address.action = Some(AddressAction::Manual);
    data.form = TrustCorporationForm {
        name: req.form.get("name").to_string(),
        company_number: req.form.get("company-number").to_string(),
        email: req.form.get("email").to_string(),
        address,
    };
    data.errors
        .string("name", "companyName", &data.form.name, &[Check::Empty]);
    data.errors.string(
        "company-number",
        "companyNumber",
        &data.form.company_number,
        &[Check::Empty],
    );
    data.errors
        .string("email", "companyEmailAddress", &data.form.email, &[Check::Email]);
    data.errors.append(data.form.address.validate());
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.attorneys.trust_corporation = Some(TrustCorporation {
        uid: current.uid,
        name: data.form.name,
        company_number: data.form.company_number,
        email: data.form.email,
        address: data.form.address.address,
    });
    after.update_decisions();
    let Transition { tasks, next } =
        transitions::attorney_address_entered(&after.tasks, &after.attorneys, &after.attorney_decisions);
    after.tasks = tasks;
    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionsData {
    pub how: Option<AttorneysAct>,
    pub details: String,
    pub options: &'static [&'static str],
    pub errors: ValidationList,
}

pub(crate) fn read_decisions(req: &PageRequest, data: &mut DecisionsData) {
    data.how = read_choice(&req.form, "decision-type");
    data.details = req.form.get("mixed-details").to_string();
    validate_choice(&mut data.errors, "decision-type", "howAttorneysShouldMakeDecisions", data.how);
    if data.how == Some(AttorneysAct::JointlyForSomeSeverallyForOthers) {
        data.errors
            .string("mixed-details", "details", &data.details, &[Check::Empty]);
    } else {
        data.details.clear();
    }
}

pub async fn how_should_attorneys_make_decisions(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<DecisionsData>, ApiError> {
    let mut data = DecisionsData {
        how: provided.attorney_decisions.how,
        details: provided.attorney_decisions.details.clone(),
        options: AttorneysAct::VALUES,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    read_decisions(req, &mut data);
    if !data.errors.is_empty() {
        return Ok(Outcome::Render(data));
    }

    let mut after = provided.clone();
    after.attorney_decisions.how = data.how;
    after.attorney_decisions.details = data.details;
    let Transition { tasks, next } = transitions::attorney_decisions_chosen(
        &after.tasks,
        &after.attorneys,
        &after.attorney_decisions,
    );
    after.tasks = tasks;
    if after.want_replacement_attorneys.is_some() {
        after.tasks.choose_replacement_attorneys = replacement_state(&after);
    }
    save(ctx, provided, after).await?;
    redirect(next.at(provided.lpa_id))
}

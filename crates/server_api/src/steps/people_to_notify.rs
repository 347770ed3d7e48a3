use serde::Serialize;
use shared::{
    domain::{ActorUid, YesNo},
    error::ApiError,
    path::Path,
    provided::{PersonToNotify, Provided, MAX_PEOPLE_TO_NOTIFY},
    validation::ValidationList,
};
use tracing::info;

use super::address::{address_step, AddressData, AddressStep};
use crate::{
    forms::{read_choice, validate_choice, NameForm},
    redirect, save,
    transitions::{self, Transition},
    warning::{commit_or_warn, PendingChange},
    ApiContext, Outcome, PageRequest,
};

fn person_for(provided: &Provided, id: Option<ActorUid>) -> Option<&PersonToNotify> {
    let id = id?;
    provided.people_to_notify.iter().find(|person| person.uid == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WantToNotifyData {
    pub want_to_notify: Option<YesNo>,
    pub errors: ValidationList,
}

pub async fn do_you_want_to_notify_people(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<WantToNotifyData>, ApiError> {
    let has_people = !provided.people_to_notify.is_empty();
    if !req.is_post() && has_people {
        return redirect(Path::ChoosePeopleToNotifySummary.at(provided.lpa_id));
    }

    let mut data = WantToNotifyData {
        want_to_notify: provided.do_you_want_to_notify_people,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    data.want_to_notify = read_choice(&req.form, "want-to-notify");
    validate_choice(&mut data.errors, "want-to-notify", "yesToNotifySomeoneAboutYourLpa", data.want_to_notify);
    let Some(answer) = data.want_to_notify else {
        return Ok(Outcome::Render(data));
    };

    let mut after = provided.clone();
    after.do_you_want_to_notify_people = Some(answer);
    let Transition { tasks, next } = transitions::want_to_notify(&after.tasks, answer, has_people);
    after.tasks = tasks;
    save(ctx, provided, after).await?;

    let mut destination = next.at(provided.lpa_id);
    if next == Path::EnterPersonToNotify {
        destination = destination.with_id(ActorUid::new());
    }
    redirect(destination)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnterPersonToNotifyData {
    pub form: NameForm,
    pub id: ActorUid,
    pub errors: ValidationList,
}

/// Creates or edits one person to notify. The list is capped, so adding a
/// new person once it is full sends the donor back to the summary.
pub async fn enter_person_to_notify(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<EnterPersonToNotifyData>, ApiError> {
    let existing = person_for(provided, req.query.id).cloned();
    if existing.is_none() && provided.people_to_notify.len() >= MAX_PEOPLE_TO_NOTIFY {
        return redirect(Path::ChoosePeopleToNotifySummary.at(provided.lpa_id));
    }

    let person = existing.unwrap_or_else(|| PersonToNotify {
        uid: req.query.id.unwrap_or_else(ActorUid::new),
        ..PersonToNotify::default()
    });
    let mut data = EnterPersonToNotifyData {
        form: NameForm {
            first_names: person.first_names.clone(),
            last_name: person.last_name.clone(),
        },
        id: person.uid,
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

    let person = PersonToNotify {
        first_names: data.form.first_names,
        last_name: data.form.last_name,
        ..person
    };
    commit_or_warn(ctx, req, provided, PendingChange::PersonToNotify { person }).await
}

pub async fn enter_person_to_notify_address(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<AddressData>, ApiError> {
    let Some(person) = person_for(provided, req.query.id) else {
        return redirect(Path::ChoosePeopleToNotifySummary.at(provided.lpa_id));
    };

    let step = address_step(ctx, req, person.full_name(), Some(person.uid), &person.address).await?;
    match step {
        AddressStep::Show(data) => Ok(Outcome::Render(data)),
        AddressStep::Chosen(address) => {
            let mut after = provided.clone();
            if let Some(stored) = after
                .people_to_notify
                .iter_mut()
                .find(|stored| stored.uid == person.uid)
            {
                stored.address = address;
            }
            let Transition { tasks, next } = transitions::person_to_notify_address_entered(&after.tasks);
            after.tasks = tasks;
            save(ctx, provided, after).await?;
            redirect(next.at(provided.lpa_id))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeopleSummaryData {
    pub people_to_notify: Vec<PersonToNotify>,
    pub can_add_more: bool,
    pub add_more: Option<YesNo>,
    pub errors: ValidationList,
}

pub async fn choose_people_to_notify_summary(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<PeopleSummaryData>, ApiError> {
    if provided.people_to_notify.is_empty() {
        return redirect(Path::DoYouWantToNotifyPeople.at(provided.lpa_id));
    }

    let count = provided.people_to_notify.len();
    let mut data = PeopleSummaryData {
        people_to_notify: provided.people_to_notify.clone(),
        can_add_more: count < MAX_PEOPLE_TO_NOTIFY,
        add_more: None,
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    // A full list has no question to answer.
    let add_more = if data.can_add_more {
        data.add_more = read_choice(&req.form, "add-person-to-notify");
        validate_choice(
            &mut data.errors,
            "add-person-to-notify",
            "yesToAddAnotherPersonToNotify",
            data.add_more,
        );
        match data.add_more {
            Some(answer) => answer == YesNo::Yes,
            None => return Ok(Outcome::Render(data)),
        }
    } else {
        false
    };

    let mut after = provided.clone();
    let Transition { tasks, next } = transitions::people_summary(&after.tasks, add_more, count);
    after.tasks = tasks;
    save(ctx, provided, after).await?;

    let mut destination = next.at(provided.lpa_id);
    if next == Path::EnterPersonToNotify {
        destination = destination.with_id(ActorUid::new());
    }
    redirect(destination)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovePersonToNotifyData {
    pub id: ActorUid,
    pub full_name: String,
    pub errors: ValidationList,
}

pub async fn remove_person_to_notify(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<RemovePersonToNotifyData>, ApiError> {
    let Some(person) = person_for(provided, req.query.id) else {
        return redirect(Path::ChoosePeopleToNotifySummary.at(provided.lpa_id));
    };

    let mut data = RemovePersonToNotifyData {
        id: person.uid,
        full_name: person.full_name(),
        errors: ValidationList::new(),
    };

    if !req.is_post() {
        return Ok(Outcome::Render(data));
    }

    let answer: Option<YesNo> = read_choice(&req.form, "yes-no");
    validate_choice(&mut data.errors, "yes-no", "yesToRemovePersonToNotify", answer);
    match answer {
        None => Ok(Outcome::Render(data)),
        Some(YesNo::No) => redirect(Path::ChoosePeopleToNotifySummary.at(provided.lpa_id)),
        Some(YesNo::Yes) => {
            let mut after = provided.clone();
            after.people_to_notify.retain(|stored| stored.uid != person.uid);
            let remaining = after.people_to_notify.len();
            if remaining == 0 {
                after.do_you_want_to_notify_people = None;
            }
            let Transition { tasks, next } =
                transitions::person_to_notify_removed(&after.tasks, remaining);
            after.tasks = tasks;
            save(ctx, provided, after).await?;
            info!(lpa_id = %provided.lpa_id, uid = %person.uid, "person to notify removed");
            redirect(next.at(provided.lpa_id))
        }
    }
}

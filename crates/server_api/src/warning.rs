//! Two-phase confirmation for answers that look like a mistake.
//!
//! A step that detects a possible duplicate person or an unlikely date of
//! birth does not store anything. It encodes the change it wanted to make
//! into the warning URL instead; the warning page shows what matched and only
//! applies the change when the donor confirms.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{ActorType, ActorUid, YesNo},
    error::{ApiError, ErrorCode},
    names::same_person,
    path::{parse_lpa_url, Destination, Path, Query},
    provided::{
        Attorney, AuthorisedSignatory, Correspondent, PersonToNotify, Provided,
        MAX_PEOPLE_TO_NOTIFY,
    },
    validation::{is_over_100, is_under_18, Check, DateCheck, DateInput, ValidationList},
};
use tracing::{info, warn};

use crate::{
    forms::{validate_choice, FIRST_NAMES_MAX, LAST_NAME_MAX, OTHER_NAMES_MAX},
    redirect, save,
    transitions::{self, Transition},
    ApiContext, Outcome, PageRequest,
};

/// A change held back until the donor confirms it on the warning page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingChange {
    DonorName {
        first_names: String,
        last_name: String,
        other_names: String,
    },
    DonorDateOfBirth {
        date_of_birth: NaiveDate,
    },
    Attorney {
        attorney: Attorney,
    },
    ReplacementAttorney {
        attorney: Attorney,
    },
    CertificateProvider {
        first_names: String,
        last_name: String,
        mobile: String,
        has_non_uk_mobile: bool,
    },
    Correspondent {
        correspondent: Correspondent,
    },
    PersonToNotify {
        person: PersonToNotify,
    },
    AuthorisedSignatory {
        signatory: AuthorisedSignatory,
    },
    IndependentWitness {
        first_names: String,
        last_name: String,
    },
}

impl PendingChange {
    pub fn actor(&self) -> ActorType {
        match self {
            Self::DonorName { .. } | Self::DonorDateOfBirth { .. } => ActorType::Donor,
            Self::Attorney { .. } => ActorType::Attorney,
            Self::ReplacementAttorney { .. } => ActorType::ReplacementAttorney,
            Self::CertificateProvider { .. } => ActorType::CertificateProvider,
            Self::Correspondent { .. } => ActorType::Correspondent,
            Self::PersonToNotify { .. } => ActorType::PersonToNotify,
            Self::AuthorisedSignatory { .. } => ActorType::AuthorisedSignatory,
            Self::IndependentWitness { .. } => ActorType::IndependentWitness,
        }
    }

    /// The uid of the actor being changed, for actors that come in lists.
    pub fn actor_uid(&self) -> Option<ActorUid> {
        match self {
            Self::Attorney { attorney } | Self::ReplacementAttorney { attorney } => {
                Some(attorney.uid)
            }
            Self::PersonToNotify { person } => Some(person.uid),
            _ => None,
        }
    }

    /// The page that asked for this change.
    pub fn origin(&self) -> Path {
        match self {
            Self::DonorName { .. } => Path::YourName,
            Self::DonorDateOfBirth { .. } => Path::YourDateOfBirth,
            Self::Attorney { .. } => Path::EnterAttorney,
            Self::ReplacementAttorney { .. } => Path::EnterReplacementAttorney,
            Self::CertificateProvider { .. } => Path::CertificateProviderDetails,
            Self::Correspondent { .. } => Path::EnterCorrespondentDetails,
            Self::PersonToNotify { .. } => Path::EnterPersonToNotify,
            Self::AuthorisedSignatory { .. } => Path::YourAuthorisedSignatory,
            Self::IndependentWitness { .. } => Path::YourIndependentWitness,
        }
    }

    /// Where the donor goes instead when the origin page would no longer
    /// take this change: the task list once the page is closed, the summary
    /// once the people to notify list is full.
    pub fn refused(&self, provided: &Provided) -> Option<Destination> {
        if !self.origin().can_go_to(provided) {
            return Some(Path::TaskList.at(provided.lpa_id));
        }

        match self {
            Self::PersonToNotify { person }
                if provided.people_to_notify.len() >= MAX_PEOPLE_TO_NOTIFY
                    && !provided.people_to_notify.iter().any(|p| p.uid == person.uid) =>
            {
                Some(Path::ChoosePeopleToNotifySummary.at(provided.lpa_id))
            }
            _ => None,
        }
    }

    /// Produces the updated LPA and where the step would have gone next.
    pub fn apply(&self, provided: &Provided) -> (Provided, Destination) {
        let mut after = provided.clone();
        let lpa_id = provided.lpa_id;

        let destination = match self {
            Self::DonorName {
                first_names,
                last_name,
                other_names,
            } => {
                after.donor.first_names = first_names.clone();
                after.donor.last_name = last_name.clone();
                after.donor.other_names = other_names.clone();
                let Transition { tasks, next } =
                    transitions::your_details(&after.tasks, Path::YourName);
                after.tasks = tasks;
                next.at(lpa_id)
            }
            Self::DonorDateOfBirth { date_of_birth } => {
                after.donor.date_of_birth = Some(*date_of_birth);
                let Transition { tasks, next } =
                    transitions::your_details(&after.tasks, Path::YourDateOfBirth);
                after.tasks = tasks;
                next.at(lpa_id)
            }
            Self::Attorney { attorney } => {
                after.attorneys.put(attorney.clone());
                after.update_decisions();
                let Transition { tasks, next } = transitions::attorney_entered(
                    &after.tasks,
                    &after.attorneys,
                    &after.attorney_decisions,
                    !attorney.address.line1.is_empty(),
                );
                after.tasks = tasks;
                with_uid(next.at(lpa_id), next, attorney.uid)
            }
            Self::ReplacementAttorney { attorney } => {
                after.want_replacement_attorneys = Some(YesNo::Yes);
                after.replacement_attorneys.put(attorney.clone());
                after.update_decisions();
                let state = replacement_state(&after);
                let Transition { tasks, next } = transitions::replacement_attorney_entered(
                    &after.tasks,
                    !attorney.address.line1.is_empty(),
                    state,
                );
                after.tasks = tasks;
                with_uid(next.at(lpa_id), next, attorney.uid)
            }
            Self::CertificateProvider {
                first_names,
                last_name,
                mobile,
                has_non_uk_mobile,
            } => {
                let provider = &mut after.certificate_provider;
                if provider.uid.is_nil() {
                    provider.uid = ActorUid::new();
                }
                provider.first_names = first_names.clone();
                provider.last_name = last_name.clone();
                provider.mobile = mobile.clone();
                provider.has_non_uk_mobile = *has_non_uk_mobile;
                let Transition { tasks, next } =
                    transitions::certificate_provider(&after.tasks, Path::CertificateProviderDetails);
                after.tasks = tasks;
                next.at(lpa_id)
            }
            Self::Correspondent { correspondent } => {
                let mut correspondent = correspondent.clone();
                let want_address = correspondent.want_address.unwrap_or(YesNo::No);
                if want_address == YesNo::No {
                    correspondent.address = Default::default();
                }
                after.correspondent = correspondent;
                let Transition { tasks, next } =
                    transitions::correspondent_details(&after.tasks, want_address);
                after.tasks = tasks;
                next.at(lpa_id)
            }
            Self::PersonToNotify { person } => {
                after.do_you_want_to_notify_people = Some(YesNo::Yes);
                match after.people_to_notify.iter_mut().find(|p| p.uid == person.uid) {
                    Some(existing) => *existing = person.clone(),
                    None => after.people_to_notify.push(person.clone()),
                }
                let Transition { tasks, next } = transitions::person_to_notify_entered(
                    &after.tasks,
                    !person.address.line1.is_empty(),
                );
                after.tasks = tasks;
                with_uid(next.at(lpa_id), next, person.uid)
            }
            Self::AuthorisedSignatory { signatory } => {
                after.authorised_signatory = signatory.clone();
                let Transition { tasks, next } =
                    transitions::signing_help(&after.tasks, Path::YourAuthorisedSignatory);
                after.tasks = tasks;
                next.at(lpa_id)
            }
            Self::IndependentWitness {
                first_names,
                last_name,
            } => {
                let witness = &mut after.independent_witness;
                if witness.uid.is_nil() {
                    witness.uid = ActorUid::new();
                }
                witness.first_names = first_names.clone();
                witness.last_name = last_name.clone();
                let Transition { tasks, next } =
                    transitions::signing_help(&after.tasks, Path::YourIndependentWitness);
                after.tasks = tasks;
                next.at(lpa_id)
            }
        };

        (after, destination)
    }

    /// Re-runs the checks of the origin page, since the held change comes
    /// back in the URL.
    pub fn validate(&self, today: NaiveDate) -> ValidationList {
        let mut errors = ValidationList::new();
        let past = [
            DateCheck::Missing,
            DateCheck::MustBeReal,
            DateCheck::MustBePast(today),
        ];

        let (first_names, last_name) = match self {
            Self::DonorDateOfBirth { date_of_birth } => {
                errors.date(
                    "date-of-birth",
                    "dateOfBirth",
                    &DateInput::from_date(Some(*date_of_birth)),
                    &past,
                );
                return errors;
            }
            Self::DonorName {
                first_names,
                last_name,
                ..
            } => (first_names, last_name),
            Self::Attorney { attorney } | Self::ReplacementAttorney { attorney } => {
                (&attorney.first_names, &attorney.last_name)
            }
            Self::CertificateProvider {
                first_names,
                last_name,
                ..
            }
            | Self::IndependentWitness {
                first_names,
                last_name,
            } => (first_names, last_name),
            Self::Correspondent { correspondent } => {
                (&correspondent.first_names, &correspondent.last_name)
            }
            Self::PersonToNotify { person } => (&person.first_names, &person.last_name),
            Self::AuthorisedSignatory { signatory } => {
                (&signatory.first_names, &signatory.last_name)
            }
        };

        errors.string(
            "first-names",
            "firstNames",
            first_names,
            &[Check::Empty, Check::StringTooLong(FIRST_NAMES_MAX)],
        );
        errors.string(
            "last-name",
            "lastName",
            last_name,
            &[Check::Empty, Check::StringTooLong(LAST_NAME_MAX)],
        );

        match self {
            Self::DonorName { other_names, .. } => errors.string(
                "other-names",
                "otherNamesLabel",
                other_names,
                &[Check::StringTooLong(OTHER_NAMES_MAX)],
            ),
            Self::Attorney { attorney } | Self::ReplacementAttorney { attorney } => {
                errors.string("email", "email", &attorney.email, &[Check::Email]);
                errors.date(
                    "date-of-birth",
                    "dateOfBirth",
                    &DateInput::from_date(attorney.date_of_birth),
                    &past,
                );
            }
            Self::CertificateProvider {
                mobile,
                has_non_uk_mobile: true,
                ..
            } => errors.string(
                "non-uk-mobile",
                "mobile",
                mobile,
                &[Check::Empty, Check::NonUkMobile],
            ),
            Self::CertificateProvider { mobile, .. } => {
                errors.string("mobile", "mobile", mobile, &[Check::Empty, Check::Mobile]);
            }
            Self::Correspondent { correspondent } => {
                errors.string(
                    "email",
                    "email",
                    &correspondent.email,
                    &[Check::Empty, Check::Email],
                );
                validate_choice(
                    &mut errors,
                    "want-address",
                    "yesToAddAnAddressForYourCorrespondent",
                    correspondent.want_address,
                );
            }
            _ => {}
        }
        errors
    }

    /// Whether this change alters a name or date of birth already on the LPA.
    /// Warnings are only raised for answers the donor just changed.
    pub fn changes_identity(&self, provided: &Provided) -> bool {
        let differs = |first: &str, last: &str, current_first: &str, current_last: &str| {
            first != current_first || last != current_last
        };

        match self {
            Self::DonorName {
                first_names,
                last_name,
                ..
            } => differs(
                first_names,
                last_name,
                &provided.donor.first_names,
                &provided.donor.last_name,
            ),
            Self::DonorDateOfBirth { date_of_birth } => {
                provided.donor.date_of_birth != Some(*date_of_birth)
            }
            Self::Attorney { attorney } => {
                provided.attorneys.get(attorney.uid).map_or(true, |current| {
                    differs(
                        &attorney.first_names,
                        &attorney.last_name,
                        &current.first_names,
                        &current.last_name,
                    ) || current.date_of_birth != attorney.date_of_birth
                })
            }
            Self::ReplacementAttorney { attorney } => provided
                .replacement_attorneys
                .get(attorney.uid)
                .map_or(true, |current| {
                    differs(
                        &attorney.first_names,
                        &attorney.last_name,
                        &current.first_names,
                        &current.last_name,
                    ) || current.date_of_birth != attorney.date_of_birth
                }),
            Self::CertificateProvider {
                first_names,
                last_name,
                ..
            } => differs(
                first_names,
                last_name,
                &provided.certificate_provider.first_names,
                &provided.certificate_provider.last_name,
            ),
            Self::Correspondent { correspondent } => differs(
                &correspondent.first_names,
                &correspondent.last_name,
                &provided.correspondent.first_names,
                &provided.correspondent.last_name,
            ),
            Self::PersonToNotify { person } => provided
                .people_to_notify
                .iter()
                .find(|current| current.uid == person.uid)
                .map_or(true, |current| {
                    differs(
                        &person.first_names,
                        &person.last_name,
                        &current.first_names,
                        &current.last_name,
                    )
                }),
            Self::AuthorisedSignatory { signatory } => differs(
                &signatory.first_names,
                &signatory.last_name,
                &provided.authorised_signatory.first_names,
                &provided.authorised_signatory.last_name,
            ),
            Self::IndependentWitness {
                first_names,
                last_name,
            } => differs(
                first_names,
                last_name,
                &provided.independent_witness.first_names,
                &provided.independent_witness.last_name,
            ),
        }
    }

    pub fn encode(&self) -> String {
        // A plain data enum always serialises.
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(self).unwrap_or_default())
    }

    pub fn decode(token: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

fn with_uid(destination: Destination, next: Path, uid: ActorUid) -> Destination {
    match next {
        Path::TaskList | Path::ChooseAttorneysSummary | Path::ChoosePeopleToNotifySummary => {
            destination
        }
        _ => destination.with_id(uid),
    }
}

pub(crate) fn replacement_state(provided: &Provided) -> shared::domain::TaskState {
    transitions::choose_replacement_attorneys_state(
        provided.want_replacement_attorneys,
        &provided.replacement_attorneys,
        &provided.attorney_decisions,
        provided.how_should_replacement_attorneys_step_in.is_some(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Someone else on the LPA has the same name.
    NameMatch {
        actor_type: ActorType,
        full_name: String,
    },
    /// The donor or attorney is older than 100.
    Over100,
    /// An attorney is younger than 18.
    Under18,
}

/// Everything the warning page should show for `actor` on `provided`.
pub fn notifications(
    provided: &Provided,
    actor: ActorType,
    uid: Option<ActorUid>,
    today: NaiveDate,
) -> Vec<Notification> {
    let (first_names, last_name, date_of_birth) = match actor_names(provided, actor, uid) {
        Some(found) => found,
        None => return Vec::new(),
    };

    let compares_with = |other: ActorType| -> bool {
        match actor {
            ActorType::Donor => other != ActorType::Donor,
            ActorType::Correspondent => other == ActorType::Donor,
            ActorType::CertificateProvider => other != ActorType::PersonToNotify,
            ActorType::PersonToNotify => !matches!(
                other,
                ActorType::CertificateProvider
                    | ActorType::AuthorisedSignatory
                    | ActorType::IndependentWitness
            ),
            ActorType::AuthorisedSignatory | ActorType::IndependentWitness => {
                other != ActorType::PersonToNotify
            }
            _ => true,
        }
    };

    let mut found: Vec<Notification> = provided
        .actors()
        .into_iter()
        .filter(|other| !(other.actor_type == actor && Some(other.uid) == uid))
        .filter(|other| other.actor_type != actor || uid.is_some())
        .filter(|other| compares_with(other.actor_type))
        .filter(|other| {
            same_person(
                &first_names,
                &last_name,
                &other.first_names,
                &other.last_name,
            )
        })
        .map(|other| Notification::NameMatch {
            actor_type: other.actor_type,
            full_name: shared::names::full_name(&other.first_names, &other.last_name),
        })
        .collect();

    if actor == ActorType::Donor
        && !provided.correspondent.first_names.is_empty()
        && same_person(
            &first_names,
            &last_name,
            &provided.correspondent.first_names,
            &provided.correspondent.last_name,
        )
    {
        found.push(Notification::NameMatch {
            actor_type: ActorType::Correspondent,
            full_name: provided.correspondent.full_name(),
        });
    }

    if let Some(date_of_birth) = date_of_birth {
        if is_over_100(date_of_birth, today) {
            found.push(Notification::Over100);
        } else if actor.is_attorney_like() && is_under_18(date_of_birth, today) {
            found.push(Notification::Under18);
        }
    }

    found
}

fn actor_names(
    provided: &Provided,
    actor: ActorType,
    uid: Option<ActorUid>,
) -> Option<(String, String, Option<NaiveDate>)> {
    let attorney = |list: &shared::provided::Attorneys| {
        uid.and_then(|uid| list.get(uid)).map(|attorney| {
            (
                attorney.first_names.clone(),
                attorney.last_name.clone(),
                attorney.date_of_birth,
            )
        })
    };

    match actor {
        ActorType::Donor => Some((
            provided.donor.first_names.clone(),
            provided.donor.last_name.clone(),
            provided.donor.date_of_birth,
        )),
        ActorType::Attorney => attorney(&provided.attorneys),
        ActorType::ReplacementAttorney => attorney(&provided.replacement_attorneys),
        ActorType::CertificateProvider => Some((
            provided.certificate_provider.first_names.clone(),
            provided.certificate_provider.last_name.clone(),
            None,
        )),
        ActorType::Correspondent => Some((
            provided.correspondent.first_names.clone(),
            provided.correspondent.last_name.clone(),
            None,
        )),
        ActorType::PersonToNotify => uid
            .and_then(|uid| provided.people_to_notify.iter().find(|p| p.uid == uid))
            .map(|person| (person.first_names.clone(), person.last_name.clone(), None)),
        ActorType::AuthorisedSignatory => Some((
            provided.authorised_signatory.first_names.clone(),
            provided.authorised_signatory.last_name.clone(),
            None,
        )),
        ActorType::IndependentWitness => Some((
            provided.independent_witness.first_names.clone(),
            provided.independent_witness.last_name.clone(),
            None,
        )),
        _ => None,
    }
}

/// The page a confirmed change should continue to: the carried `next` when
/// it stays within this LPA, otherwise the task list.
fn continue_to(next: Option<&str>, provided: &Provided) -> Destination {
    next.and_then(parse_lpa_url)
        .filter(|destination| destination.lpa_id == provided.lpa_id)
        .unwrap_or_else(|| Path::TaskList.at(provided.lpa_id))
}

/// A donor who says they are under 18 keeps the date of birth but is shown
/// guidance before carrying on to `next`.
fn under_age_guidance(
    ctx: &ApiContext,
    change: &PendingChange,
    provided: &Provided,
    next: &Destination,
) -> Option<Destination> {
    let PendingChange::DonorDateOfBirth { date_of_birth } = change else {
        return None;
    };
    if !is_under_18(*date_of_birth, ctx.today()) {
        return None;
    }

    info!(lpa_id = %provided.lpa_id, "donor date of birth is under 18");
    Some(
        Path::YouHaveToldUsYouAreUnder18
            .at(provided.lpa_id)
            .with_next(next.to_url()),
    )
}

/// Phase one. Stores the change straight away when nothing looks wrong;
/// otherwise sends the donor to the warning page without storing anything.
pub(crate) async fn commit_or_warn<V>(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
    change: PendingChange,
) -> Result<Outcome<V>, ApiError> {
    let (after, mut next) = change.apply(provided);
    if let Some(from) = crate::from_override(req, provided.lpa_id) {
        next = from;
    }

    if &after == provided {
        return redirect(next);
    }

    if let Some(guidance) = under_age_guidance(ctx, &change, provided, &next) {
        save(ctx, provided, after).await?;
        return redirect(guidance);
    }

    let found = if change.changes_identity(provided) {
        notifications(&after, change.actor(), change.actor_uid(), ctx.today())
    } else {
        Vec::new()
    };

    if found.is_empty() {
        save(ctx, provided, after).await?;
        return redirect(next);
    }

    info!(
        lpa_id = %provided.lpa_id,
        actor = %change.actor(),
        matches = found.len(),
        "answer needs confirming"
    );
    let mut warning_from = req.path.at(provided.lpa_id);
    if let Some(uid) = change.actor_uid() {
        warning_from = warning_from.with_id(uid);
    }
    let query = Query {
        actor: Some(change.actor()),
        from: None,
        id: change.actor_uid(),
        next: Some(next.to_url()),
        pending: Some(change.encode()),
        warning_from: Some(warning_from.to_url()),
    };
    redirect(Path::Warning.at(provided.lpa_id).with_query(query))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarningData {
    pub actor: ActorType,
    pub notifications: Vec<Notification>,
    pub next: String,
    pub warning_from: String,
    pub errors: ValidationList,
}

/// Phase two. GET shows what matched; POST applies the held change.
pub async fn warning(
    ctx: &ApiContext,
    req: &PageRequest,
    provided: &Provided,
) -> Result<Outcome<WarningData>, ApiError> {
    let next = continue_to(req.query.next.as_deref(), provided);
    let Some(change) = req.query.pending.as_deref().and_then(PendingChange::decode) else {
        return redirect(next);
    };

    if req.query.actor != Some(change.actor()) || req.query.id != change.actor_uid() {
        warn!(
            lpa_id = %provided.lpa_id,
            actor = %change.actor(),
            "held answer does not match warning"
        );
        return Err(ApiError::new(
            ErrorCode::Validation,
            "held answer does not match the warning",
        ));
    }
    if let Some(destination) = change.refused(provided) {
        info!(
            lpa_id = %provided.lpa_id,
            page = %change.origin(),
            "held answer no longer accepted"
        );
        return redirect(destination);
    }

    let (after, _) = change.apply(provided);

    if req.is_post() {
        let errors = change.validate(ctx.today());
        if !errors.is_empty() {
            return Ok(Outcome::Render(WarningData {
                actor: change.actor(),
                notifications: Vec::new(),
                next: next.to_url(),
                warning_from: req.query.warning_from.clone().unwrap_or_default(),
                errors,
            }));
        }

        let guidance = under_age_guidance(ctx, &change, provided, &next);
        save(ctx, provided, after).await?;
        info!(lpa_id = %provided.lpa_id, actor = %change.actor(), "confirmed answer after warning");
        return redirect(guidance.unwrap_or(next));
    }

    let found = notifications(&after, change.actor(), change.actor_uid(), ctx.today());
    if found.is_empty() {
        return redirect(next);
    }

    Ok(Outcome::Render(WarningData {
        actor: change.actor(),
        notifications: found,
        next: next.to_url(),
        warning_from: req.query.warning_from.clone().unwrap_or_default(),
        errors: ValidationList::new(),
    }))
}

#[cfg(test)]
#[path = "tests/warning_tests.rs"]
mod tests;

//! Task-state and next-page rules, one pure function per wizard section.
//!
//! Steps hand in the current task states plus the answer that was just
//! submitted and get back the new task states and where to go next. Nothing
//! in here touches the store or collaborators.

use shared::{
    domain::{
        AttorneysAct, FeeType, IdentityState, LpaType, PaymentState, TaskState, YesNo, YesNoMaybe,
    },
    path::Path,
    provided::{AttorneyDecisions, Attorneys, Tasks, MAX_PEOPLE_TO_NOTIFY},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub tasks: Tasks,
    pub next: Path,
}

impl Transition {
    fn new(tasks: Tasks, next: Path) -> Self {
        Self { tasks, next }
    }
}

// your details

/// your-name → your-date-of-birth → your-address → can-you-sign-your-lpa.
pub fn your_details(tasks: &Tasks, answered: Path) -> Transition {
    let next = match answered {
        Path::YourName => Path::YourDateOfBirth,
        Path::YourDateOfBirth => Path::YourAddress,
        Path::YourAddress => Path::CanYouSignYourLpa,
        _ => Path::TaskList,
    };
    let mut tasks = tasks.clone();
    tasks.your_details = tasks.your_details.started();
    Transition::new(tasks, next)
}

pub fn can_you_sign(tasks: &Tasks, answer: YesNoMaybe) -> Transition {
    let mut tasks = tasks.clone();
    tasks.your_details = tasks.your_details.started();
    let next = match answer {
        YesNoMaybe::Yes => Path::YourPreferredLanguage,
        YesNoMaybe::No | YesNoMaybe::Maybe => Path::CheckYouCanSign,
    };
    Transition::new(tasks, next)
}

/// Donors unsure about signing are asked again; either answer moves on,
/// and a "no" brings in the signing-help section later.
pub fn check_you_can_sign(tasks: &Tasks) -> Transition {
    let mut tasks = tasks.clone();
    tasks.your_details = tasks.your_details.started();
    Transition::new(tasks, Path::YourPreferredLanguage)
}

pub fn your_preferred_language(tasks: &Tasks, lpa_type: Option<LpaType>) -> Transition {
    let mut tasks = tasks.clone();
    tasks.your_details = TaskState::Completed;
    let next = match lpa_type {
        Some(_) => Path::TaskList,
        None => Path::LpaType,
    };
    Transition::new(tasks, next)
}

/// Switching type invalidates whichever type-specific answer was given.
pub fn lpa_type(tasks: &Tasks, previous: Option<LpaType>, chosen: LpaType) -> Transition {
    let mut tasks = tasks.clone();
    if previous.is_some_and(|previous| previous != chosen) {
        tasks.when_can_the_lpa_be_used = TaskState::NotStarted;
        tasks.life_sustaining_treatment = TaskState::NotStarted;
    }
    Transition::new(tasks, Path::TaskList)
}

// attorneys

pub fn choose_attorneys_state(attorneys: &Attorneys, decisions: &AttorneyDecisions) -> TaskState {
    if attorneys.is_empty() {
        return TaskState::NotStarted;
    }
    if !attorneys.addresses_complete() || (attorneys.len() > 1 && !decisions.is_chosen()) {
        return TaskState::InProgress;
    }
    TaskState::Completed
}

/// After an attorney's name: their address, unless one is already known.
pub fn attorney_entered(
    tasks: &Tasks,
    attorneys: &Attorneys,
    decisions: &AttorneyDecisions,
    has_address: bool,
) -> Transition {
    let mut tasks = tasks.clone();
    tasks.choose_attorneys = choose_attorneys_state(attorneys, decisions);
    let next = if has_address {
        Path::ChooseAttorneysSummary
    } else {
        Path::ChooseAttorneysAddress
    };
    Transition::new(tasks, next)
}

pub fn attorney_address_entered(
    tasks: &Tasks,
    attorneys: &Attorneys,
    decisions: &AttorneyDecisions,
) -> Transition {
    let mut tasks = tasks.clone();
    tasks.choose_attorneys = choose_attorneys_state(attorneys, decisions);
    Transition::new(tasks, Path::ChooseAttorneysSummary)
}

pub fn attorneys_summary(
    tasks: &Tasks,
    add_more: bool,
    attorneys: &Attorneys,
    decisions: &AttorneyDecisions,
) -> Transition {
    let mut tasks = tasks.clone();
    tasks.choose_attorneys = choose_attorneys_state(attorneys, decisions);
    let next = if add_more {
        Path::EnterAttorney
    } else if attorneys.len() > 1 && !decisions.is_chosen() {
        Path::HowShouldAttorneysMakeDecisions
    } else {
        Path::TaskList
    };
    Transition::new(tasks, next)
}

/// Removing the last attorney sends the donor back to enter a new one.
pub fn attorney_removed(
    tasks: &Tasks,
    attorneys: &Attorneys,
    decisions: &AttorneyDecisions,
) -> Transition {
    let mut tasks = tasks.clone();
    tasks.choose_attorneys = choose_attorneys_state(attorneys, decisions);
    let next = if attorneys.is_empty() {
        Path::EnterAttorney
    } else {
        Path::ChooseAttorneysSummary
    };
    Transition::new(tasks, next)
}

pub fn attorney_decisions_chosen(
    tasks: &Tasks,
    attorneys: &Attorneys,
    decisions: &AttorneyDecisions,
) -> Transition {
    let mut tasks = tasks.clone();
    tasks.choose_attorneys = choose_attorneys_state(attorneys, decisions);
    Transition::new(tasks, Path::TaskList)
}

// replacement attorneys

/// The step-in question only applies when attorneys act jointly and severally.
pub fn needs_step_in(decisions: &AttorneyDecisions) -> bool {
    decisions.how == Some(AttorneysAct::JointlyAndSeverally)
}

pub fn choose_replacement_attorneys_state(
    want: Option<YesNo>,
    replacements: &Attorneys,
    attorney_decisions: &AttorneyDecisions,
    step_in_chosen: bool,
) -> TaskState {
    match want {
        None => TaskState::NotStarted,
        Some(YesNo::No) => TaskState::Completed,
        Some(YesNo::Yes) => {
            if replacements.is_empty()
                || !replacements.addresses_complete()
                || (needs_step_in(attorney_decisions) && !step_in_chosen)
            {
                TaskState::InProgress
            } else {
                TaskState::Completed
            }
        }
    }
}

pub fn want_replacement_attorneys(tasks: &Tasks, answer: YesNo) -> Transition {
    let mut tasks = tasks.clone();
    match answer {
        YesNo::No => {
            tasks.choose_replacement_attorneys = TaskState::Completed;
            Transition::new(tasks, Path::TaskList)
        }
        YesNo::Yes => {
            tasks.choose_replacement_attorneys = tasks.choose_replacement_attorneys.started();
            Transition::new(tasks, Path::EnterReplacementAttorney)
        }
    }
}

pub fn replacement_attorney_entered(tasks: &Tasks, has_address: bool, state: TaskState) -> Transition {
    let mut tasks = tasks.clone();
    tasks.choose_replacement_attorneys = state;
    let next = if has_address {
        Path::TaskList
    } else {
        Path::ChooseReplacementAttorneysAddress
    };
    Transition::new(tasks, next)
}

pub fn replacement_address_entered(
    tasks: &Tasks,
    attorney_decisions: &AttorneyDecisions,
    step_in_chosen: bool,
    state: TaskState,
) -> Transition {
    let mut tasks = tasks.clone();
    tasks.choose_replacement_attorneys = state;
    let next = if needs_step_in(attorney_decisions) && !step_in_chosen {
        Path::HowShouldReplacementAttorneysStepIn
    } else {
        Path::TaskList
    };
    Transition::new(tasks, next)
}

pub fn replacement_step_in_chosen(tasks: &Tasks, state: TaskState) -> Transition {
    let mut tasks = tasks.clone();
    tasks.choose_replacement_attorneys = state;
    Transition::new(tasks, Path::TaskList)
}

// lpa details

/// when-can-the-lpa-be-used, life-sustaining-treatment and restrictions each
/// complete their own task.
pub fn lpa_detail_answered(tasks: &Tasks, answered: Path) -> Transition {
    let mut tasks = tasks.clone();
    match answered {
        Path::WhenCanTheLpaBeUsed => tasks.when_can_the_lpa_be_used = TaskState::Completed,
        Path::LifeSustainingTreatment => tasks.life_sustaining_treatment = TaskState::Completed,
        Path::Restrictions => tasks.restrictions = TaskState::Completed,
        _ => {}
    }
    Transition::new(tasks, Path::TaskList)
}

// certificate provider

/// details → how-do-you-know → address, completing on the address.
pub fn certificate_provider(tasks: &Tasks, answered: Path) -> Transition {
    let mut tasks = tasks.clone();
    let next = match answered {
        Path::CertificateProviderDetails => Path::HowDoYouKnowYourCertificateProvider,
        Path::HowDoYouKnowYourCertificateProvider => Path::CertificateProviderAddress,
        _ => Path::TaskList,
    };
    tasks.certificate_provider = if next == Path::TaskList {
        TaskState::Completed
    } else {
        tasks.certificate_provider.started()
    };
    Transition::new(tasks, next)
}

// people to notify

pub fn want_to_notify(tasks: &Tasks, answer: YesNo, has_people: bool) -> Transition {
    let mut tasks = tasks.clone();
    match answer {
        YesNo::No => {
            tasks.people_to_notify = TaskState::Completed;
            Transition::new(tasks, Path::TaskList)
        }
        YesNo::Yes if has_people => {
            tasks.people_to_notify = tasks.people_to_notify.started();
            Transition::new(tasks, Path::ChoosePeopleToNotifySummary)
        }
        YesNo::Yes => {
            tasks.people_to_notify = tasks.people_to_notify.started();
            Transition::new(tasks, Path::EnterPersonToNotify)
        }
    }
}

pub fn person_to_notify_entered(tasks: &Tasks, has_address: bool) -> Transition {
    let mut tasks = tasks.clone();
    let next = if has_address {
        tasks.people_to_notify = TaskState::Completed;
        Path::ChoosePeopleToNotifySummary
    } else {
        tasks.people_to_notify = TaskState::InProgress;
        Path::EnterPersonToNotifyAddress
    };
    Transition::new(tasks, next)
}

pub fn person_to_notify_address_entered(tasks: &Tasks) -> Transition {
    let mut tasks = tasks.clone();
    tasks.people_to_notify = TaskState::Completed;
    Transition::new(tasks, Path::ChoosePeopleToNotifySummary)
}

/// Adding is refused once the maximum is reached.
pub fn people_summary(tasks: &Tasks, add_more: bool, count: usize) -> Transition {
    let mut tasks = tasks.clone();
    if add_more && count < MAX_PEOPLE_TO_NOTIFY {
        return Transition::new(tasks, Path::EnterPersonToNotify);
    }
    tasks.people_to_notify = TaskState::Completed;
    Transition::new(tasks, Path::TaskList)
}

pub fn person_to_notify_removed(tasks: &Tasks, remaining: usize) -> Transition {
    let mut tasks = tasks.clone();
    if remaining == 0 {
        tasks.people_to_notify = TaskState::InProgress;
        return Transition::new(tasks, Path::DoYouWantToNotifyPeople);
    }
    Transition::new(tasks, Path::ChoosePeopleToNotifySummary)
}

// correspondent

pub fn add_correspondent(tasks: &Tasks, answer: YesNo) -> Transition {
    let mut tasks = tasks.clone();
    match answer {
        YesNo::No => {
            tasks.add_correspondent = TaskState::Completed;
            Transition::new(tasks, Path::TaskList)
        }
        YesNo::Yes => {
            tasks.add_correspondent = tasks.add_correspondent.started();
            Transition::new(tasks, Path::EnterCorrespondentDetails)
        }
    }
}

pub fn correspondent_details(tasks: &Tasks, want_address: YesNo) -> Transition {
    let mut tasks = tasks.clone();
    match want_address {
        YesNo::No => {
            tasks.add_correspondent = TaskState::Completed;
            Transition::new(tasks, Path::ShareCorrespondentDetails)
        }
        YesNo::Yes => {
            tasks.add_correspondent = tasks.add_correspondent.started();
            Transition::new(tasks, Path::EnterCorrespondentAddress)
        }
    }
}

pub fn correspondent_address(tasks: &Tasks) -> Transition {
    let mut tasks = tasks.clone();
    tasks.add_correspondent = TaskState::Completed;
    Transition::new(tasks, Path::ShareCorrespondentDetails)
}

// signing help

/// signatory → independent witness → witness mobile.
pub fn signing_help(tasks: &Tasks, answered: Path) -> Transition {
    let mut tasks = tasks.clone();
    let next = match answered {
        Path::YourAuthorisedSignatory => Path::YourIndependentWitness,
        Path::YourIndependentWitness => Path::YourIndependentWitnessMobile,
        _ => Path::TaskList,
    };
    tasks.choose_your_signatory = if next == Path::TaskList {
        TaskState::Completed
    } else {
        tasks.choose_your_signatory.started()
    };
    Transition::new(tasks, next)
}

// check and pay

pub fn check_your_lpa(tasks: &Tasks) -> Transition {
    let mut tasks = tasks.clone();
    tasks.check_your_lpa = TaskState::Completed;
    Transition::new(tasks, Path::LpaDetailsSaved)
}

/// Anything still owed goes to payment. A reduced fee with nothing left to
/// pay waits for its evidence to be assessed.
pub fn fee_type_chosen(tasks: &Tasks, fee_type: FeeType, amount_due: i64) -> Transition {
    let mut tasks = tasks.clone();
    if amount_due > 0 {
        tasks.pay_for_lpa = PaymentState::InProgress;
        Transition::new(tasks, Path::PayFee)
    } else if is_reduced_fee(Some(fee_type)) {
        tasks.pay_for_lpa = PaymentState::Pending;
        Transition::new(tasks, Path::EvidenceRequired)
    } else {
        tasks.pay_for_lpa = PaymentState::Completed;
        Transition::new(tasks, Path::TaskList)
    }
}

pub fn payment_taken(tasks: &Tasks) -> Transition {
    let mut tasks = tasks.clone();
    tasks.pay_for_lpa = PaymentState::InProgress;
    Transition::new(tasks, Path::PaymentConfirmation)
}

pub fn payment_confirmed(tasks: &Tasks, fee_type: Option<FeeType>) -> Transition {
    let mut tasks = tasks.clone();
    if is_reduced_fee(fee_type) {
        tasks.pay_for_lpa = PaymentState::Pending;
        Transition::new(tasks, Path::EvidenceRequired)
    } else {
        tasks.pay_for_lpa = PaymentState::Completed;
        Transition::new(tasks, Path::TaskList)
    }
}

pub fn is_reduced_fee(fee_type: Option<FeeType>) -> bool {
    matches!(
        fee_type,
        Some(FeeType::HalfFee | FeeType::NoFee | FeeType::HardshipFee)
    )
}

// identity

pub fn identity_details(tasks: &Tasks, details_match: YesNo) -> Transition {
    let mut tasks = tasks.clone();
    match details_match {
        YesNo::Yes => {
            tasks.confirm_your_identity = IdentityState::Completed;
            Transition::new(tasks, Path::ReadYourLpa)
        }
        YesNo::No => {
            tasks.confirm_your_identity = IdentityState::ProblemWithIdentity;
            Transition::new(tasks, Path::RegisterWithCourtOfProtection)
        }
    }
}

pub fn register_with_court_of_protection(tasks: &Tasks, answer: YesNo) -> Transition {
    let next = match answer {
        YesNo::Yes => Path::WhatHappensNextRegisteringWithCourtOfProtection,
        YesNo::No => Path::TaskList,
    };
    Transition::new(tasks.clone(), next)
}

// signing

pub fn signed(tasks: &Tasks) -> Transition {
    let mut tasks = tasks.clone();
    tasks.sign_the_lpa = tasks.sign_the_lpa.started();
    Transition::new(tasks, Path::WitnessingYourSignature)
}

pub fn witness_codes_sent(tasks: &Tasks) -> Transition {
    Transition::new(tasks.clone(), Path::WitnessingAsCertificateProvider)
}

/// When the donor could not sign, the independent witness confirms next.
pub fn certificate_provider_witnessed(tasks: &Tasks, donor_cannot_sign: bool) -> Transition {
    let mut tasks = tasks.clone();
    if donor_cannot_sign {
        tasks.sign_the_lpa = TaskState::InProgress;
        return Transition::new(tasks, Path::WitnessingAsIndependentWitness);
    }
    tasks.sign_the_lpa = TaskState::Completed;
    Transition::new(tasks, Path::YouHaveSubmittedYourLpa)
}

pub fn independent_witness_witnessed(tasks: &Tasks) -> Transition {
    let mut tasks = tasks.clone();
    tasks.sign_the_lpa = TaskState::Completed;
    Transition::new(tasks, Path::YouHaveSubmittedYourLpa)
}

#[cfg(test)]
#[path = "tests/transitions_tests.rs"]
mod tests;

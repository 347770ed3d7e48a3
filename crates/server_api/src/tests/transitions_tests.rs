use super::*;
use shared::provided::Attorney;
use shared::domain::{ActorUid, Address};

fn attorney(first: &str, with_address: bool) -> Attorney {
    Attorney {
        uid: ActorUid::new(),
        first_names: first.into(),
        last_name: "Smith".into(),
        address: if with_address {
            Address {
                line1: "1 Road".into(),
                postcode: "B14 7ED".into(),
                ..Address::default()
            }
        } else {
            Address::default()
        },
        ..Attorney::default()
    }
}

#[test]
fn can_sign_answers_pick_different_pages() {
    let tasks = Tasks::default();

    let yes = can_you_sign(&tasks, YesNoMaybe::Yes);
    assert_eq!(yes.next, Path::YourPreferredLanguage);
    assert_eq!(yes.tasks.your_details, TaskState::InProgress);

    assert_eq!(can_you_sign(&tasks, YesNoMaybe::No).next, Path::CheckYouCanSign);
    assert_eq!(can_you_sign(&tasks, YesNoMaybe::Maybe).next, Path::CheckYouCanSign);
}

#[test]
fn preferred_language_completes_your_details() {
    let transition = your_preferred_language(&Tasks::default(), None);
    assert_eq!(transition.tasks.your_details, TaskState::Completed);
    assert_eq!(transition.next, Path::LpaType);

    let chosen = your_preferred_language(&Tasks::default(), Some(LpaType::PersonalWelfare));
    assert_eq!(chosen.next, Path::TaskList);
}

#[test]
fn changing_lpa_type_resets_type_specific_tasks() {
    let tasks = Tasks {
        when_can_the_lpa_be_used: TaskState::Completed,
        ..Tasks::default()
    };

    let same = lpa_type(
        &tasks,
        Some(LpaType::PropertyAndAffairs),
        LpaType::PropertyAndAffairs,
    );
    assert_eq!(same.tasks.when_can_the_lpa_be_used, TaskState::Completed);

    let changed = lpa_type(
        &tasks,
        Some(LpaType::PropertyAndAffairs),
        LpaType::PersonalWelfare,
    );
    assert_eq!(changed.tasks.when_can_the_lpa_be_used, TaskState::NotStarted);
    assert_eq!(changed.next, Path::TaskList);
}

#[test]
fn attorneys_summary_asks_for_decisions_with_more_than_one() {
    let mut attorneys = Attorneys::default();
    attorneys.put(attorney("Amy", true));
    let decisions = AttorneyDecisions::default();

    let single = attorneys_summary(&Tasks::default(), false, &attorneys, &decisions);
    assert_eq!(single.next, Path::TaskList);
    assert_eq!(single.tasks.choose_attorneys, TaskState::Completed);

    attorneys.put(attorney("Bob", true));
    let pair = attorneys_summary(&Tasks::default(), false, &attorneys, &decisions);
    assert_eq!(pair.next, Path::HowShouldAttorneysMakeDecisions);
    assert_eq!(pair.tasks.choose_attorneys, TaskState::InProgress);

    let more = attorneys_summary(&Tasks::default(), true, &attorneys, &decisions);
    assert_eq!(more.next, Path::EnterAttorney);
}

#[test]
fn attorney_without_address_is_in_progress() {
    let mut attorneys = Attorneys::default();
    attorneys.put(attorney("Amy", false));

    assert_eq!(
        choose_attorneys_state(&attorneys, &AttorneyDecisions::default()),
        TaskState::InProgress
    );
    assert_eq!(
        choose_attorneys_state(&Attorneys::default(), &AttorneyDecisions::default()),
        TaskState::NotStarted
    );
}

#[test]
fn replacement_answers_follow_the_table() {
    let no = want_replacement_attorneys(&Tasks::default(), YesNo::No);
    assert_eq!(no.tasks.choose_replacement_attorneys, TaskState::Completed);
    assert_eq!(no.next, Path::TaskList);

    let completed = Tasks {
        choose_replacement_attorneys: TaskState::Completed,
        ..Tasks::default()
    };
    let yes = want_replacement_attorneys(&completed, YesNo::Yes);
    assert_eq!(yes.tasks.choose_replacement_attorneys, TaskState::Completed);
    assert_eq!(yes.next, Path::EnterReplacementAttorney);
}

#[test]
fn step_in_is_asked_for_jointly_and_severally() {
    let decisions = AttorneyDecisions {
        how: Some(AttorneysAct::JointlyAndSeverally),
        details: String::new(),
    };
    let transition =
        replacement_address_entered(&Tasks::default(), &decisions, false, TaskState::InProgress);
    assert_eq!(transition.next, Path::HowShouldReplacementAttorneysStepIn);

    let jointly = AttorneyDecisions {
        how: Some(AttorneysAct::Jointly),
        details: String::new(),
    };
    let transition =
        replacement_address_entered(&Tasks::default(), &jointly, false, TaskState::Completed);
    assert_eq!(transition.next, Path::TaskList);
}

#[test]
fn correspondent_address_answer_decides_next_page() {
    let no = correspondent_details(&Tasks::default(), YesNo::No);
    assert_eq!(no.tasks.add_correspondent, TaskState::Completed);
    assert_eq!(no.next, Path::ShareCorrespondentDetails);

    let yes = correspondent_details(&Tasks::default(), YesNo::Yes);
    assert_eq!(yes.tasks.add_correspondent, TaskState::InProgress);
    assert_eq!(yes.next, Path::EnterCorrespondentAddress);

    let already = Tasks {
        add_correspondent: TaskState::Completed,
        ..Tasks::default()
    };
    assert_eq!(
        correspondent_details(&already, YesNo::Yes).tasks.add_correspondent,
        TaskState::Completed
    );
}

#[test]
fn people_to_notify_stop_at_the_maximum() {
    let tasks = Tasks::default();
    assert_eq!(people_summary(&tasks, true, 4).next, Path::EnterPersonToNotify);

    let full = people_summary(&tasks, true, MAX_PEOPLE_TO_NOTIFY);
    assert_eq!(full.next, Path::TaskList);
    assert_eq!(full.tasks.people_to_notify, TaskState::Completed);

    assert_eq!(
        want_to_notify(&tasks, YesNo::Yes, true).next,
        Path::ChoosePeopleToNotifySummary
    );
    assert_eq!(
        want_to_notify(&tasks, YesNo::Yes, false).next,
        Path::EnterPersonToNotify
    );
}

#[test]
fn fee_type_routes_by_amount_due() {
    let pay = fee_type_chosen(&Tasks::default(), FeeType::HalfFee, 4100);
    assert_eq!(pay.tasks.pay_for_lpa, PaymentState::InProgress);
    assert_eq!(pay.next, Path::PayFee);

    let nothing_due = fee_type_chosen(&Tasks::default(), FeeType::NoFee, 0);
    assert_eq!(nothing_due.tasks.pay_for_lpa, PaymentState::Pending);
    assert_eq!(nothing_due.next, Path::EvidenceRequired);

    let already_paid = fee_type_chosen(&Tasks::default(), FeeType::FullFee, 0);
    assert_eq!(already_paid.tasks.pay_for_lpa, PaymentState::Completed);

    let full = payment_confirmed(&Tasks::default(), Some(FeeType::FullFee));
    assert_eq!(full.tasks.pay_for_lpa, PaymentState::Completed);
    let half = payment_confirmed(&Tasks::default(), Some(FeeType::HalfFee));
    assert_eq!(half.tasks.pay_for_lpa, PaymentState::Pending);
}

#[test]
fn witnessing_depends_on_whether_the_donor_can_sign() {
    let direct = certificate_provider_witnessed(&Tasks::default(), false);
    assert_eq!(direct.next, Path::YouHaveSubmittedYourLpa);
    assert_eq!(direct.tasks.sign_the_lpa, TaskState::Completed);

    let assisted = certificate_provider_witnessed(&Tasks::default(), true);
    assert_eq!(assisted.next, Path::WitnessingAsIndependentWitness);
    assert_eq!(assisted.tasks.sign_the_lpa, TaskState::InProgress);
}

#[test]
fn identity_mismatch_offers_court_of_protection() {
    let mismatch = identity_details(&Tasks::default(), YesNo::No);
    assert_eq!(
        mismatch.tasks.confirm_your_identity,
        IdentityState::ProblemWithIdentity
    );
    assert_eq!(mismatch.next, Path::RegisterWithCourtOfProtection);
}

use super::*;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("date")
}

fn attorney(first: &str, last: &str) -> Attorney {
    Attorney {
        uid: ActorUid::new(),
        first_names: first.into(),
        last_name: last.into(),
        ..Attorney::default()
    }
}

fn completed_section1() -> Provided {
    let mut provided = Provided::default();
    let tasks = &mut provided.tasks;
    tasks.your_details = TaskState::Completed;
    tasks.choose_attorneys = TaskState::Completed;
    tasks.choose_replacement_attorneys = TaskState::Completed;
    tasks.when_can_the_lpa_be_used = TaskState::Completed;
    tasks.restrictions = TaskState::Completed;
    tasks.certificate_provider = TaskState::Completed;
    tasks.people_to_notify = TaskState::Completed;
    tasks.add_correspondent = TaskState::Completed;
    provided
}

#[test]
fn section1_uses_the_type_specific_task() {
    let mut provided = completed_section1();
    assert!(provided.section1_completed());

    provided.lpa_type = Some(LpaType::PersonalWelfare);
    assert!(!provided.section1_completed());

    provided.tasks.life_sustaining_treatment = TaskState::Completed;
    assert!(provided.section1_completed());
}

#[test]
fn section1_needs_a_signatory_only_when_donor_cannot_sign() {
    let mut provided = completed_section1();
    provided.donor.can_sign = Some(YesNo::No);
    assert!(!provided.section1_completed());

    provided.tasks.choose_your_signatory = TaskState::Completed;
    assert!(provided.section1_completed());
}

#[test]
fn attorneys_put_replaces_by_uid() {
    let mut attorneys = Attorneys::default();
    let mut first = attorney("Sam", "Smith");
    attorneys.put(first.clone());
    first.last_name = "Jones".into();
    attorneys.put(first.clone());
    attorneys.put(attorney("Alex", "Smith"));

    assert_eq!(attorneys.len(), 2);
    assert_eq!(attorneys.get(first.uid).map(|a| a.last_name.as_str()), Some("Jones"));
    assert!(attorneys.remove(first.uid));
    assert!(!attorneys.remove(first.uid));
}

#[test]
fn actors_lists_every_named_person() {
    let mut provided = Provided::default();
    provided.donor.first_names = "Dana".into();
    provided.attorneys.put(attorney("Sam", "Smith"));
    provided.replacement_attorneys.put(attorney("Alex", "Smith"));
    provided.certificate_provider.first_names = "Chris".into();
    provided.people_to_notify.push(PersonToNotify {
        first_names: "Pat".into(),
        ..PersonToNotify::default()
    });

    let types: Vec<ActorType> = provided.actors().iter().map(|a| a.actor_type).collect();
    assert_eq!(
        types,
        vec![
            ActorType::Donor,
            ActorType::CertificateProvider,
            ActorType::Attorney,
            ActorType::ReplacementAttorney,
            ActorType::PersonToNotify,
        ]
    );
}

#[test]
fn under18_attorneys_are_reported() {
    let mut provided = Provided::default();
    let mut young = attorney("Kid", "Smith");
    young.date_of_birth = NaiveDate::from_ymd_opt(2010, 1, 1);
    let mut adult = attorney("Grown", "Smith");
    adult.date_of_birth = NaiveDate::from_ymd_opt(1980, 1, 1);
    provided.attorneys.put(young.clone());
    provided.attorneys.put(adult);

    let under18 = provided.under18_actor_details(today());
    assert_eq!(under18.len(), 1);
    assert_eq!(under18[0].uid, young.uid);
    assert_eq!(under18[0].full_name, "Kid Smith");
}

#[test]
fn certificate_provider_sharing_a_last_name_part_or_address() {
    let mut provided = Provided::default();
    provided.donor.last_name = "Smith-Jones".into();
    provided.certificate_provider.last_name = "jones".into();
    assert!(provided.certificate_provider_shares_details());

    provided.certificate_provider.last_name = "Brown".into();
    assert!(!provided.certificate_provider_shares_details());

    let home = Address {
        line1: "1 Road".into(),
        postcode: "AB1 2CD".into(),
        ..Address::default()
    };
    let mut attorney = attorney("Sam", "White");
    attorney.address = home.clone();
    provided.attorneys.put(attorney);
    provided.certificate_provider.address = home;
    assert!(provided.certificate_provider_shares_details());
}

#[test]
fn fee_amount_accounts_for_reductions_and_payments() {
    let mut provided = Provided::default();
    assert_eq!(provided.fee_amount(), 8200);

    provided.fee_type = Some(FeeType::HalfFee);
    assert_eq!(provided.fee_amount(), 4100);

    provided.payment_details.push(PaymentDetail {
        payment_reference: "ref".into(),
        payment_id: "id".into(),
        amount: 4100,
    });
    assert_eq!(provided.fee_amount(), 0);
}

#[test]
fn update_decisions_clears_stale_choices() {
    let mut provided = Provided::default();
    provided.attorneys.put(attorney("Sam", "Smith"));
    provided.attorney_decisions.how = Some(AttorneysAct::Jointly);
    provided.how_should_replacement_attorneys_step_in =
        Some(ReplacementAttorneysStepIn::WhenAllCanNoLongerAct);

    provided.update_decisions();

    assert_eq!(provided.attorney_decisions, AttorneyDecisions::default());
    assert_eq!(provided.how_should_replacement_attorneys_step_in, None);
}

#[test]
fn checked_hash_tracks_lpa_content_only() {
    let mut provided = Provided::default();
    provided.donor.first_names = "Dana".into();
    provided.checked_hash = Some(provided.lpa_hash());
    assert!(!provided.checked_hash_changed());

    provided.tasks.pay_for_lpa = PaymentState::Completed;
    assert!(!provided.checked_hash_changed());

    provided.restrictions = "none".into();
    assert!(provided.checked_hash_changed());
}

#[test]
fn aggregate_round_trips_through_json() {
    let mut provided = Provided::new(LpaId::new(), SessionId::new(), Utc::now());
    provided.lpa_type = Some(LpaType::PropertyAndAffairs);
    provided.attorneys.put(attorney("Sam", "Smith"));

    let json = serde_json::to_string(&provided).expect("json");
    assert!(json.contains("\"type\":\"property-and-affairs\""));
    let back: Provided = serde_json::from_str(&json).expect("parse");
    assert_eq!(back, provided);
}

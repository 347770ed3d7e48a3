use super::*;
use crate::domain::{SessionId, TaskState};
use chrono::Utc;

#[test]
fn slugs_are_unique_and_parse_back() {
    for path in Path::ALL {
        assert_eq!(Path::from_slug(path.slug()), Some(*path));
    }
    assert_eq!(Path::from_slug("no-such-page"), None);
}

#[test]
fn destination_formats_query_in_key_order() {
    let lpa_id = LpaId::new();
    let destination = Path::Warning.at(lpa_id).with_query(Query {
        actor: Some(ActorType::Attorney),
        next: Some(format!("/lpa/{lpa_id}/choose-attorneys-address")),
        warning_from: Some(format!("/lpa/{lpa_id}/enter-attorney")),
        ..Query::default()
    });

    assert_eq!(
        destination.to_url(),
        format!(
            "/lpa/{lpa_id}/warning?actor=attorney&next=%2Flpa%2F{lpa_id}%2Fchoose-attorneys-address&warningFrom=%2Flpa%2F{lpa_id}%2Fenter-attorney"
        )
    );
}

#[test]
fn query_parse_round_trips_and_ignores_junk() {
    let id = ActorUid::new();
    let query = Query {
        actor: Some(ActorType::PersonToNotify),
        id: Some(id),
        from: Some("/lpa/x/task-list".into()),
        ..Query::default()
    };

    assert_eq!(Query::parse(&query.encode()), query);
    assert_eq!(
        Query::parse("?actor=nobody&id=not-a-uid&other=1"),
        Query::default()
    );
}

#[test]
fn parses_lpa_urls() {
    let lpa_id = LpaId::new();
    let url = Path::EnterAttorney.at(lpa_id).with_from("somewhere").to_url();
    let destination = parse_lpa_url(&url).expect("destination");

    assert_eq!(destination.path, Path::EnterAttorney);
    assert_eq!(destination.lpa_id, lpa_id);
    assert_eq!(destination.query.from.as_deref(), Some("somewhere"));
    assert!(parse_lpa_url("https://example.com/lpa").is_none());
}

#[test]
fn later_sections_need_details_and_attorneys() {
    let mut provided = Provided::new(LpaId::new(), SessionId::new(), Utc::now());
    assert!(Path::YourName.can_go_to(&provided));
    assert!(Path::EnterAttorney.can_go_to(&provided));
    assert!(!Path::AddCorrespondent.can_go_to(&provided));
    assert!(!Path::CheckYourLpa.can_go_to(&provided));

    provided.tasks.your_details = TaskState::Completed;
    provided.tasks.choose_attorneys = TaskState::Completed;
    assert!(Path::AddCorrespondent.can_go_to(&provided));
    assert!(!Path::CheckYourLpa.can_go_to(&provided));
}

#[test]
fn signed_lpas_only_reach_post_signing_pages() {
    let mut provided = Provided::new(LpaId::new(), SessionId::new(), Utc::now());
    provided.signed_at = Some(Utc::now());

    assert!(Path::TaskList.can_go_to(&provided));
    assert!(Path::WitnessingAsCertificateProvider.can_go_to(&provided));
    assert!(!Path::YourName.can_go_to(&provided));
    assert!(!Path::EnterAttorney.can_go_to(&provided));
}

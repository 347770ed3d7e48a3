use super::*;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("date")
}

#[test]
fn empty_required_fields_are_reported_in_declaration_order() {
    let mut errors = ValidationList::new();
    errors.string("first-names", "firstNames", "", &[Check::Empty]);
    errors.string("last-name", "lastName", "  ", &[Check::Empty]);
    errors.date(
        "date-of-birth",
        "dateOfBirth",
        &DateInput::default(),
        &[DateCheck::Missing, DateCheck::MustBeReal],
    );

    assert_eq!(errors.names(), vec!["first-names", "last-name", "date-of-birth"]);
    assert_eq!(
        errors.get("date-of-birth"),
        Some(&FieldError::Enter {
            label: "dateOfBirth".into()
        })
    );
}

#[test]
fn only_first_failing_check_is_kept_per_field() {
    let mut errors = ValidationList::new();
    errors.string(
        "first-names",
        "firstNames",
        "",
        &[Check::Empty, Check::StringTooLong(53)],
    );
    errors.add("first-names", FieldError::custom("other"));

    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors.get("first-names"),
        Some(FieldError::Enter { .. })
    ));
}

#[test]
fn string_length_checks_count_characters() {
    let mut errors = ValidationList::new();
    errors.string("a", "a", &"x".repeat(54), &[Check::StringTooLong(53)]);
    errors.string("b", "b", "12345", &[Check::StringLength(4)]);
    errors.string("c", "c", "1234", &[Check::StringLength(4)]);

    assert_eq!(
        errors.get("a"),
        Some(&FieldError::TooLong {
            label: "a".into(),
            length: 53
        })
    );
    assert!(errors.has("b"));
    assert!(!errors.has("c"));
}

#[test]
fn select_requires_a_known_option() {
    let mut errors = ValidationList::new();
    errors.string("yes-no", "yesNo", "perhaps", &[Check::Select(&["yes", "no"])]);
    errors.string("other", "other", "yes", &[Check::Select(&["yes", "no"])]);

    assert_eq!(errors.names(), vec!["yes-no"]);
}

#[test]
fn email_and_mobile_shapes() {
    let mut errors = ValidationList::new();
    errors.string("email-ok", "email", "a@example.com", &[Check::Email]);
    errors.string("email-bad", "email", "not-an-email", &[Check::Email]);
    errors.string("email-empty", "email", "", &[Check::Email]);
    errors.string("mobile-ok", "mobile", "07700 900 000", &[Check::Mobile]);
    errors.string("mobile-intl", "mobile", "+447700900000", &[Check::Mobile]);
    errors.string("mobile-bad", "mobile", "0121 496 0000", &[Check::Mobile]);
    errors.string("non-uk-ok", "mobile", "+33 6 12 34 56 78", &[Check::NonUkMobile]);
    errors.string("non-uk-bad", "mobile", "0033612345678", &[Check::NonUkMobile]);

    assert_eq!(errors.names(), vec!["email-bad", "mobile-bad", "non-uk-bad"]);
}

#[test]
fn partially_missing_dates_name_the_missing_parts() {
    let mut errors = ValidationList::new();
    errors.date(
        "dob",
        "dateOfBirth",
        &DateInput::new("1", "", ""),
        &[DateCheck::Missing],
    );

    assert_eq!(
        errors.get("dob"),
        Some(&FieldError::DateMissing {
            label: "dateOfBirth".into(),
            missing_day: false,
            missing_month: true,
            missing_year: true,
        })
    );
}

#[test]
fn dates_must_be_real_and_past() {
    let checks = [
        DateCheck::Missing,
        DateCheck::MustBeReal,
        DateCheck::MustBePast(today()),
    ];
    let mut errors = ValidationList::new();
    errors.date("unreal", "d", &DateInput::new("31", "2", "2000"), &checks);
    errors.date("future", "d", &DateInput::new("1", "1", "2030"), &checks);
    errors.date("short-year", "d", &DateInput::new("1", "1", "99"), &checks);
    errors.date("ok", "d", &DateInput::new("1", "1", "1980"), &checks);

    assert!(matches!(
        errors.get("unreal"),
        Some(FieldError::DateMustBeReal { .. })
    ));
    assert!(matches!(
        errors.get("future"),
        Some(FieldError::DateMustBePast { .. })
    ));
    assert!(matches!(
        errors.get("short-year"),
        Some(FieldError::DateMustBeReal { .. })
    ));
    assert!(!errors.has("ok"));
}

#[test]
fn age_boundaries() {
    let today = today();
    let seventeen = NaiveDate::from_ymd_opt(2007, 1, 1).expect("date");
    let exactly_eighteen = NaiveDate::from_ymd_opt(2006, 6, 15).expect("date");
    let very_old = NaiveDate::from_ymd_opt(1920, 1, 1).expect("date");

    assert!(is_under_18(seventeen, today));
    assert!(!is_under_18(exactly_eighteen, today));
    assert!(is_over_100(very_old, today));
    assert!(!is_over_100(seventeen, today));
}

#[test]
fn date_input_round_trips_a_stored_date() {
    let date = NaiveDate::from_ymd_opt(1980, 3, 9).expect("date");
    let input = DateInput::from_date(Some(date));
    assert_eq!(input, DateInput::new("9", "3", "1980"));
    assert_eq!(input.date(), Some(date));
}

use super::*;
use chrono::TimeZone;

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
        .single()
        .expect("time")
        + Duration::minutes(minutes)
}

fn issued(code: &str, minutes: i64) -> WitnessCodes {
    let mut codes = WitnessCodes::default();
    codes.push(code.to_string(), at(minutes));
    codes
}

#[test]
fn fresh_matching_code_is_accepted() {
    let codes = issued("1234", 0);
    let mut limiter = Limiter::for_witness_codes(at(0));

    assert_eq!(verify(&codes, &mut limiter, "1234", at(29)), Ok(()));
    assert_eq!(limiter.tokens, 5);
}

#[test]
fn code_match_ignores_case_and_padding() {
    let codes = issued("ab12", 0);
    let mut limiter = Limiter::for_witness_codes(at(0));

    assert_eq!(verify(&codes, &mut limiter, " AB12 ", at(1)), Ok(()));
}

#[test]
fn stale_code_is_expired_whatever_the_remaining_attempts() {
    let codes = issued("1234", 0);
    let mut limiter = Limiter::for_witness_codes(at(0));

    assert_eq!(
        verify(&codes, &mut limiter, "1234", at(31)),
        Err(WitnessCodeError::CodeExpired)
    );
    assert_eq!(limiter.tokens, 4);
}

#[test]
fn unknown_code_is_a_mismatch_and_costs_a_token() {
    let codes = issued("1234", 0);
    let mut limiter = Limiter::for_witness_codes(at(0));

    assert_eq!(
        verify(&codes, &mut limiter, "9999", at(1)),
        Err(WitnessCodeError::CodeMismatch)
    );
    assert_eq!(limiter.tokens, 4);
}

#[test]
fn exhausted_limiter_refuses_even_the_right_code() {
    let codes = issued("1234", 0);
    let mut limiter = Limiter::for_witness_codes(at(0));

    for _ in 0..5 {
        assert_eq!(
            verify(&codes, &mut limiter, "0000", at(0)),
            Err(WitnessCodeError::CodeMismatch)
        );
    }

    for _ in 0..3 {
        assert_eq!(
            verify(&codes, &mut limiter, "1234", at(0)),
            Err(WitnessCodeError::TooManyAttempts)
        );
    }
}

#[test]
fn limiter_refills_one_token_per_minute_up_to_the_cap() {
    let mut limiter = Limiter::for_witness_codes(at(0));
    for _ in 0..5 {
        limiter.consume(at(0));
    }
    assert!(limiter.is_exhausted(at(0)));
    assert!(!limiter.is_exhausted(at(1)));
    assert_eq!(limiter.tokens, 1);

    assert!(!limiter.is_exhausted(at(60)));
    assert_eq!(limiter.tokens, 10);
}

#[test]
fn latest_code_wins_when_codes_repeat() {
    let mut codes = issued("1234", 0);
    codes.push("1234".to_string(), at(40));
    let mut limiter = Limiter::for_witness_codes(at(0));

    assert_eq!(verify(&codes, &mut limiter, "1234", at(45)), Ok(()));
}

#[test]
fn resend_waits_a_minute() {
    let codes = issued("1234", 0);
    assert!(!codes.can_request(at(0)));
    assert!(codes.can_request(at(1)));
    assert!(WitnessCodes::default().can_request(at(0)));
}

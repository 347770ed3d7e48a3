use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long an issued witness code stays usable.
pub const CODE_FRESHNESS_MINUTES: i64 = 30;
/// Minimum gap between two codes issued for the same witness.
pub const RESEND_INTERVAL_MINUTES: i64 = 1;

pub const WITNESS_CODE_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WitnessCodeError {
    #[error("too many witness code attempts")]
    TooManyAttempts,
    #[error("witness code does not match")]
    CodeMismatch,
    #[error("witness code has expired")]
    CodeExpired,
}

impl WitnessCodeError {
    pub fn label(self) -> &'static str {
        match self {
            Self::TooManyAttempts => "tooManyWitnessCodeAttempts",
            Self::CodeMismatch => "witnessCodeDoesNotMatch",
            Self::CodeExpired => "witnessCodeExpired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessCode {
    pub code: String,
    pub created: DateTime<Utc>,
}

impl WitnessCode {
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created > Duration::minutes(CODE_FRESHNESS_MINUTES)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WitnessCodes(pub Vec<WitnessCode>);

impl WitnessCodes {
    pub fn find(&self, candidate: &str) -> Option<&WitnessCode> {
        let candidate = candidate.trim();
        self.0
            .iter()
            .rev()
            .find(|issued| issued.code.eq_ignore_ascii_case(candidate))
    }

    pub fn can_request(&self, now: DateTime<Utc>) -> bool {
        self.0
            .last()
            .map_or(true, |latest| now - latest.created >= Duration::minutes(RESEND_INTERVAL_MINUTES))
    }

    pub fn push(&mut self, code: String, created: DateTime<Utc>) {
        self.0.push(WitnessCode { code, created });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Token bucket guarding code entry. Tokens refill at one per `token_per`
/// up to `max_tokens`; the bucket is stored with the LPA so it carries over
/// between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limiter {
    pub token_per_seconds: i64,
    pub max_tokens: u32,
    pub tokens: u32,
    pub tokens_at: DateTime<Utc>,
}

impl Limiter {
    pub fn new(token_per: Duration, initial_tokens: u32, max_tokens: u32, now: DateTime<Utc>) -> Self {
        Self {
            token_per_seconds: token_per.num_seconds().max(1),
            max_tokens,
            tokens: initial_tokens.min(max_tokens),
            tokens_at: now,
        }
    }

    /// Five attempts straight away, then one more each minute up to ten.
    pub fn for_witness_codes(now: DateTime<Utc>) -> Self {
        Self::new(Duration::minutes(1), 5, 10, now)
    }

    fn refill(&mut self, now: DateTime<Utc>) {
        if self.tokens >= self.max_tokens {
            self.tokens_at = now;
            return;
        }

        let elapsed = (now - self.tokens_at).num_seconds();
        if elapsed < self.token_per_seconds {
            return;
        }

        let earned = elapsed / self.token_per_seconds;
        let room = i64::from(self.max_tokens - self.tokens);
        let added = earned.min(room);
        self.tokens += u32::try_from(added).unwrap_or(0);
        self.tokens_at += Duration::seconds(earned * self.token_per_seconds);
    }

    pub fn is_exhausted(&mut self, now: DateTime<Utc>) -> bool {
        self.refill(now);
        self.tokens == 0
    }

    pub fn consume(&mut self, now: DateTime<Utc>) {
        self.refill(now);
        self.tokens = self.tokens.saturating_sub(1);
    }
}

/// Checks a candidate against the issued codes.
///
/// The limiter is consulted before the code so a correct code is still
/// refused once attempts run out. Every failure takes one token.
pub fn verify(
    codes: &WitnessCodes,
    limiter: &mut Limiter,
    candidate: &str,
    now: DateTime<Utc>,
) -> Result<(), WitnessCodeError> {
    if limiter.is_exhausted(now) {
        return Err(WitnessCodeError::TooManyAttempts);
    }

    let Some(issued) = codes.find(candidate) else {
        limiter.consume(now);
        return Err(WitnessCodeError::CodeMismatch);
    };

    if issued.has_expired(now) {
        limiter.consume(now);
        return Err(WitnessCodeError::CodeExpired);
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/witness_tests.rs"]
mod tests;

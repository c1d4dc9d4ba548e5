//! OTP decision rules, kept free of I/O so they can be checked in isolation.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::models::OtpCode;
use crate::config::OtpPolicy;

/// Outcome of checking a submitted code against the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NotRequested,
    Expired,
    TooManyAttempts,
    Mismatch,
    Match,
}

/// Judge a verification attempt. Order matters: a missing record, then
/// expiry, then the attempt ceiling are checked before the code itself.
pub fn judge(
    record: Option<&OtpCode>,
    submitted: &str,
    now: DateTime<Utc>,
    policy: &OtpPolicy,
) -> Verdict {
    let Some(record) = record else {
        return Verdict::NotRequested;
    };

    if record.is_expired(now) {
        return Verdict::Expired;
    }

    if record.attempts >= policy.max_attempts {
        return Verdict::TooManyAttempts;
    }

    if record.code == submitted.trim() {
        Verdict::Match
    } else {
        Verdict::Mismatch
    }
}

/// Seconds left before a new code may be issued, rounded up.
/// `None` once the cooldown has elapsed.
pub fn resend_wait(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Option<u64> {
    let remaining = created_at + cooldown - now;
    let millis = remaining.num_milliseconds();
    if millis <= 0 {
        return None;
    }
    Some(((millis + 999) / 1000) as u64)
}

/// Six digits drawn uniformly from 100000..=999999.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

pub fn render_message(code: &str, ttl: Duration) -> String {
    format!(
        "Your verification code is {}. It expires in {} minutes.",
        code,
        ttl.num_minutes()
    )
}

//! Subscription calculator
//!
//! Derives a client's expiration date from its billing cycle and classifies
//! how close that expiration is relative to a reference instant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Billing cycle of a tracked client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientPlan {
    Monthly,
    Annual,
}

impl ClientPlan {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "MONTHLY",
            Self::Annual => "ANNUAL",
        }
    }

    fn term(self) -> Months {
        match self {
            Self::Monthly => Months::new(1),
            Self::Annual => Months::new(12),
        }
    }
}

impl fmt::Display for ClientPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientPlan {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MONTHLY" => Ok(Self::Monthly),
            "ANNUAL" => Ok(Self::Annual),
            _ => Err(Error::Validation(format!("Unsupported plan '{}'", value))),
        }
    }
}

/// How urgently a client's renewal needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyBucket {
    Critical,
    Warning,
    Good,
    Excellent,
}

impl UrgencyBucket {
    /// Buckets a day count. Upper bounds are inclusive and overdue counts
    /// (negative) stay `Critical`.
    pub fn from_days_remaining(days: i64) -> Self {
        if days <= 7 {
            Self::Critical
        } else if days <= 30 {
            Self::Warning
        } else if days <= 90 {
            Self::Good
        } else {
            Self::Excellent
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

impl fmt::Display for UrgencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advance `start_date` by one billing term of `plan`.
///
/// Month arithmetic clamps to the last day of the target month, so
/// Jan 31 + 1 month is Feb 28 (or Feb 29 in a leap year).
///
/// Callers validate with [`checked_expiration`] first; an out-of-range result
/// saturates at `NaiveDate::MAX`.
pub fn compute_expiration(start_date: NaiveDate, plan: ClientPlan) -> NaiveDate {
    checked_expiration(start_date, plan).unwrap_or(NaiveDate::MAX)
}

/// Like [`compute_expiration`], but `None` when the result leaves chrono's
/// supported date range.
pub fn checked_expiration(start_date: NaiveDate, plan: ClientPlan) -> Option<NaiveDate> {
    start_date.checked_add_months(plan.term())
}

/// Whole days from `now` until the start (UTC midnight) of `expiration_date`,
/// rounded up. Negative once the date has passed.
pub fn days_remaining(expiration_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let expires_at = expiration_date.and_time(chrono::NaiveTime::MIN).and_utc();
    let millis = (expires_at - now).num_milliseconds();
    let days = millis / MILLIS_PER_DAY;
    if millis % MILLIS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

pub fn classify_urgency(expiration_date: NaiveDate, now: DateTime<Utc>) -> UrgencyBucket {
    UrgencyBucket::from_days_remaining(days_remaining(expiration_date, now))
}

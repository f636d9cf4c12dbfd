//! Time helpers
//!
//! Timestamps are stored as fixed-width RFC3339 strings (sortable) except
//! where queries compare them numerically, in which case epoch millis are
//! used (guest-cart expiry).

use chrono::{SecondsFormat, Utc};

/// Current time as a fixed-width RFC3339 string, e.g. `2026-08-06T10:15:30.123Z`
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

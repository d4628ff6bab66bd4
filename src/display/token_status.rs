//! Human-readable annotations for the registered time claims.
//!
//! Shows `iat`, `nbf` and `exp` as UTC dates with a relative offset.
//! This is display only: nothing here decides whether a token is valid.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::codec::Claims;

const TIME_CLAIMS: [(&str, &str); 3] = [
    ("iat", "Issued at"),
    ("nbf", "Not before"),
    ("exp", "Expires"),
];

/// One line per time claim present in `claims`, relative to `now`.
///
/// Claims that are not integral Unix timestamps are reported as such.
pub fn timestamp_lines(claims: &Claims, now: DateTime<Utc>) -> Vec<String> {
    TIME_CLAIMS
        .iter()
        .filter_map(|(claim, label)| {
            let value = claims.fields().get(*claim)?;
            Some(format!("{label:<11} {}", describe(value, now)))
        })
        .collect()
}

fn describe(value: &Value, now: DateTime<Utc>) -> String {
    let Some(when) = value.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)) else {
        return format!("{value} (not a Unix timestamp)");
    };
    format!(
        "{} ({})",
        when.format("%Y-%m-%d %H:%M:%S UTC"),
        relative(when, now)
    )
}

fn relative(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = when.signed_duration_since(now);
    let secs = delta.num_seconds().unsigned_abs();
    let amount = match secs {
        0..60 => format!("{secs}s"),
        60..3_600 => format!("{}m", secs / 60),
        3_600..86_400 => format!("{}h", secs / 3_600),
        _ => format!("{}d", secs / 86_400),
    };
    if delta.num_seconds() >= 0 {
        format!("in {amount}")
    } else {
        format!("{amount} ago")
    }
}

//! Millisecond-epoch timestamp helpers
//!
//! Internally every timestamp is a [`jiff::Timestamp`] so period-boundary
//! arithmetic (calendar day/week/month) in `cf-budget` can use `jiff`'s
//! zoned-datetime support. At the wire/storage edge, timestamps serialize
//! as plain millisecond-epoch integers (`epochMs` in the spec).

use jiff::Timestamp;

/// Current wall-clock time
#[must_use]
pub fn now() -> Timestamp {
    Timestamp::now()
}

/// Convert a timestamp to milliseconds since the Unix epoch
#[must_use]
pub fn to_epoch_millis(ts: Timestamp) -> i64 {
    ts.as_millisecond()
}

/// Convert milliseconds since the Unix epoch to a timestamp
///
/// # Panics
///
/// Panics if `millis` is outside the range representable by `jiff::Timestamp`.
#[must_use]
pub fn from_epoch_millis(millis: i64) -> Timestamp {
    Timestamp::from_millisecond(millis).expect("epoch millis out of representable range")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_millis() {
        let ts = now();
        let millis = to_epoch_millis(ts);
        let back = from_epoch_millis(millis);
        assert_eq!(to_epoch_millis(back), millis);
    }
}

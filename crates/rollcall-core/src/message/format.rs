use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;

use crate::schedule::Shift;

const STAMP: &str = "%b %-d, %Y %H:%M %Z";
const DAY_AND_TIME: &str = "%b %-d, %H:%M";
const CLOCK_12H: &str = "%b %-d, %-I:%M %p %Z";
const LONG_DATE: &str = "%A, %B %-d, %Y";

// Without a configured zone, times are rendered in the host's local zone.
fn render(at: DateTime<Utc>, zone: Option<&Tz>, pattern: &str) -> String {
    match zone {
        Some(tz) => at.with_timezone(tz).format(pattern).to_string(),
        None => at.with_timezone(&Local).format(pattern).to_string(),
    }
}

pub(super) fn timestamp(at: DateTime<Utc>, zone: Option<&Tz>) -> String {
    render(at, zone, STAMP)
}

pub(super) fn long_date(at: DateTime<Utc>, zone: Option<&Tz>) -> String {
    render(at, zone, LONG_DATE)
}

pub(super) fn until(end: DateTime<Utc>, zone: Option<&Tz>) -> String {
    render(end, zone, CLOCK_12H)
}

/// `Jan 15, 09:00 - 17:00 EST`; the end date is repeated only when the shift
/// crosses midnight in `zone`.
pub fn shift_range(shift: &Shift, zone: Option<&Tz>) -> String {
    let same_day = render(shift.start(), zone, "%F") == render(shift.end(), zone, "%F");
    let start = render(shift.start(), zone, DAY_AND_TIME);
    let end = if same_day {
        render(shift.end(), zone, "%H:%M")
    } else {
        render(shift.end(), zone, DAY_AND_TIME)
    };
    let abbreviation = render(shift.end(), zone, "%Z");
    format!("{start} - {end} {abbreviation}")
}

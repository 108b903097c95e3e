//! Turns the listing's date labels into absolute timestamps.
//!
//! Recent reviews carry a coarse relative label ("3 weeks ago", "2 месяца назад"),
//! older ones an absolute `DD.MM.YYYY` date. Months count as 30 days and years
//! as 365; only the relative order of reviews depends on the result.
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use tracing::debug;

const ABSOLUTE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    /// Seconds, minutes, hours: counted as "now".
    Recent,
    Days,
    Weeks,
    Months,
    Years,
}

/// Checked in order; the first unit whose stem occurs in the label wins.
const UNIT_STEMS: &[(Unit, &[&str])] = &[
    (Unit::Recent, &["second", "minute", "hour", "секунд", "минут", "час"]),
    (Unit::Days, &["day", "день", "дн"]),
    (Unit::Weeks, &["week", "недел"]),
    (Unit::Months, &["month", "месяц"]),
    (Unit::Years, &["year", "год", "лет"]),
];

fn unit_of(label: &str) -> Option<Unit> {
    UNIT_STEMS
        .iter()
        .find(|(_, stems)| stems.iter().any(|stem| label.contains(stem)))
        .map(|(unit, _)| *unit)
}

fn leading_count(label: &str) -> Option<i64> {
    label
        .split_whitespace()
        .next()?
        .parse::<u32>()
        .ok()
        .map(i64::from)
}

fn offset(unit: Unit, count: i64) -> Option<TimeDelta> {
    match unit {
        Unit::Recent => Some(TimeDelta::zero()),
        Unit::Days => TimeDelta::try_days(count),
        Unit::Weeks => TimeDelta::try_weeks(count),
        Unit::Months => TimeDelta::try_days(count.checked_mul(30)?),
        Unit::Years => TimeDelta::try_days(count.checked_mul(365)?),
    }
}

/// Resolve `date_text` against `now`.
///
/// Returns `None` when the label matches no known unit and is not an absolute
/// `DD.MM.YYYY` date, or when a relative label has no leading number.
pub fn normalize(date_text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let label = date_text.trim().to_lowercase();

    let resolved = match unit_of(&label) {
        Some(Unit::Recent) => Some(now),
        Some(unit) => leading_count(&label)
            .and_then(|count| offset(unit, count))
            .and_then(|delta| now.checked_sub_signed(delta)),
        None => NaiveDate::parse_from_str(&label, ABSOLUTE_FORMAT)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc()),
    };

    if resolved.is_none() {
        debug!(target: "harvest.dates", raw = %date_text, "unrecognised review date");
    }
    resolved
}

//! Human-readable travel times.
//!
//! Costs on the network are fractional hours. For display they are broken
//! into days, hours and minutes, keeping at most the two largest non-zero
//! units and rounding the smallest shown unit (carrying into the next unit
//! up when rounding fills it).

const MINUTE_MS: f64 = 60_000.0;
const HOUR_MS: f64 = 60.0 * MINUTE_MS;
const DAY_MS: f64 = 24.0 * HOUR_MS;

/// Units in descending size, with their length in milliseconds.
const UNITS: [(Unit, f64); 3] = [
    (Unit::Day, DAY_MS),
    (Unit::Hour, HOUR_MS),
    (Unit::Minute, MINUTE_MS),
];

/// Maximum number of units shown.
const LARGEST: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Hour,
    Minute,
}

impl Unit {
    fn label(self, count: f64) -> &'static str {
        let singular = count == 1.0;
        match (self, singular) {
            (Unit::Day, true) => "day",
            (Unit::Day, false) => "days",
            (Unit::Hour, true) => "hour",
            (Unit::Hour, false) => "hours",
            (Unit::Minute, true) => "minute",
            (Unit::Minute, false) => "minutes",
        }
    }
}

/// Format a travel time given in hours.
///
/// # Examples
///
/// ```
/// use route_server::domain::trip_time;
///
/// assert_eq!(trip_time(1.5), "1 hour, 30 minutes");
/// assert_eq!(trip_time(26.0), "1 day, 2 hours");
/// assert_eq!(trip_time(0.0), "0 minutes");
/// // 1 day, 2 hours and 40 minutes: only the two largest units are kept
/// assert_eq!(trip_time(26.0 + 40.0 / 60.0), "1 day, 3 hours");
/// ```
pub fn trip_time(hours: f64) -> String {
    let mut ms = hours.max(0.0) * HOUR_MS;

    // Whole counts for every unit but the last, which keeps the remainder.
    let mut counts = [0.0f64; UNITS.len()];
    for (i, (_, unit_ms)) in UNITS.iter().enumerate() {
        let count = if i + 1 == UNITS.len() {
            ms / unit_ms
        } else {
            (ms / unit_ms).floor()
        };
        counts[i] = count;
        ms -= count * unit_ms;
    }

    let first_occupied = counts.iter().position(|c| *c != 0.0).unwrap_or(0);

    // Round from the smallest unit up, folding a unit into its parent when it
    // divides evenly or when it falls outside the units that will be shown.
    for i in (0..counts.len()).rev() {
        counts[i] = counts[i].round();
        if i == 0 {
            break;
        }
        let ratio = UNITS[i - 1].1 / UNITS[i].1;
        let beyond_largest = LARGEST - 1 < i.saturating_sub(first_occupied);
        if counts[i] % ratio == 0.0 || beyond_largest {
            counts[i - 1] += counts[i] / ratio;
            counts[i] = 0.0;
        }
    }

    let parts: Vec<String> = UNITS
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count != 0.0)
        .take(LARGEST)
        .map(|((unit, _), count)| format!("{} {}", count, unit.label(count)))
        .collect();

    if parts.is_empty() {
        return format!("0 {}", Unit::Minute.label(0.0));
    }
    parts.join(", ")
}

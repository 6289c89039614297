use chrono::{Duration, NaiveDate, NaiveTime};

/// The appointment card always renders a 30-minute range; the booked package
/// duration does not change it.
pub const DISPLAY_SLOT_MINUTES: i64 = 30;

pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Long-form date: full month name, two-digit day, four-digit year.
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Relabel dates near `today` for the appointment list.
pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        format!("Today, {}", long_date(date))
    } else if date == today + Duration::days(1) {
        format!("Tomorrow, {}", long_date(date))
    } else {
        long_date(date)
    }
}

/// Display range for an appointment start, e.g. "02:00 PM – 02:30 PM".
pub fn time_range_label(start: NaiveTime) -> String {
    let end = start + Duration::minutes(DISPLAY_SLOT_MINUTES);
    format!("{} – {}", start.format("%I:%M %p"), end.format("%I:%M %p"))
}

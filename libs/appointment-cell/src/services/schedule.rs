use std::fmt;

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};

/// Call duration assumed when an appointment carries none.
pub const DEFAULT_CALL_DURATION_MINUTES: i64 = 30;

/// Slack on both window edges so the action doesn't flicker at the exact
/// boundary between two ticks.
const BOUNDARY_SLACK_MINUTES: i64 = 1;

/// Parse a 12-hour wall-clock time such as "2:00 PM".
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(&raw.trim().to_uppercase(), "%I:%M %p").ok()
}

/// Where "now" falls relative to an appointment's call window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallWindow {
    NotYetOpen { minutes_until_start: i64 },
    Open,
    Closed,
    InvalidTime,
}

impl CallWindow {
    pub fn is_open(&self) -> bool {
        matches!(self, CallWindow::Open)
    }
}

impl fmt::Display for CallWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallWindow::NotYetOpen { minutes_until_start } => {
                write!(f, "Call available in {}min", minutes_until_start)
            }
            CallWindow::Open => write!(f, "Call now"),
            CallWindow::Closed => write!(f, "Call window closed"),
            CallWindow::InvalidTime => write!(f, "Invalid time"),
        }
    }
}

/// Evaluate the call window for a start time on today's date.
///
/// The window is the closed interval [start - 1min, start + duration + 1min].
/// An unparsable time yields `InvalidTime` rather than an error; the caller
/// is typically a render loop and must never be torn down by bad data.
pub fn evaluate_call_window(time: &str, duration_minutes: i64, now: NaiveDateTime) -> CallWindow {
    let Some(start_time) = parse_clock_time(time) else {
        return CallWindow::InvalidTime;
    };

    let start = now.date().and_time(start_time);
    let end = start + Duration::minutes(duration_minutes);
    let opens = start - Duration::minutes(BOUNDARY_SLACK_MINUTES);
    let closes = end + Duration::minutes(BOUNDARY_SLACK_MINUTES);

    if now < opens {
        CallWindow::NotYetOpen {
            minutes_until_start: (start - now).num_minutes(),
        }
    } else if now > closes {
        CallWindow::Closed
    } else {
        CallWindow::Open
    }
}

pub fn is_within_call_window_at(time: &str, duration_minutes: i64, now: NaiveDateTime) -> bool {
    evaluate_call_window(time, duration_minutes, now).is_open()
}

/// Live variant evaluated against the local clock. The date display side
/// uses the same clock source, so the card label and the call action can
/// never disagree about what "now" means.
pub fn is_within_call_window(time: &str, duration_minutes: i64) -> bool {
    is_within_call_window_at(time, duration_minutes, Local::now().naive_local())
}

pub fn time_status(time: &str, duration_minutes: i64) -> String {
    evaluate_call_window(time, duration_minutes, Local::now().naive_local()).to_string()
}

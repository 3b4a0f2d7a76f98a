//! Stream scheduling rules and attendance status.

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{string_enum, RequestToJoinStatus};

/// Longest accepted timezone identifier.
pub const MAX_TIMEZONE_LENGTH: usize = 64;

/// Reasons a proposed schedule is rejected, as message codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleViolation {
    StartNotBeforeEnd,
    StartInPast,
    InvalidTimezone,
}

impl ScheduleViolation {
    pub fn message_key(&self) -> &'static str {
        match self {
            ScheduleViolation::StartNotBeforeEnd => "stream.start.must.precede.end",
            ScheduleViolation::StartInPast => "stream.start.in.past",
            ScheduleViolation::InvalidTimezone => "stream.invalid.timezone",
        }
    }
}

/// Check a schedule proposed for creation or rescheduling.
pub fn validate_schedule(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<(), ScheduleViolation> {
    let tz = timezone.trim();
    if tz.is_empty() || tz.len() > MAX_TIMEZONE_LENGTH || tz.contains(char::is_whitespace) {
        return Err(ScheduleViolation::InvalidTimezone);
    }
    if start >= end {
        return Err(ScheduleViolation::StartNotBeforeEnd);
    }
    if start <= now {
        return Err(ScheduleViolation::StartInPast);
    }
    Ok(())
}

string_enum! {
    /// Attendance state of a viewer relative to a stream.
    pub enum AttendanceStatus {
        NotAttending = "NOT_ATTENDING",
        Pending = "PENDING",
        Approved = "APPROVED",
        Disapproved = "DISAPPROVED",
    }
}

/// Attendance status from the viewer's attendee row, if any.
pub fn resolve_attendance(attendee: Option<(RequestToJoinStatus, bool)>) -> AttendanceStatus {
    match attendee {
        None => AttendanceStatus::NotAttending,
        Some((RequestToJoinStatus::Pending, _)) => AttendanceStatus::Pending,
        Some((RequestToJoinStatus::Disapproved, _)) => AttendanceStatus::Disapproved,
        Some((RequestToJoinStatus::Approved, true)) => AttendanceStatus::Approved,
        Some((RequestToJoinStatus::Approved, false)) => AttendanceStatus::NotAttending,
    }
}

//! # Domain Services
//!
//! Pure business rules that don't belong to a single entity.
//!
//! - **join_status**: resolves a viewer's chat space membership state
//! - **schedule**: stream schedule validation and attendance status

pub mod join_status;
pub mod schedule;

pub use join_status::{resolve_join_status, JoinStatus, MembershipSnapshot};
pub use schedule::{resolve_attendance, validate_schedule, AttendanceStatus, ScheduleViolation};

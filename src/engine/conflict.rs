use crate::model::{DayState, TimeInterval, MINUTES_PER_DAY};

use super::EngineError;

pub(crate) fn validate_interval(interval: &TimeInterval) -> Result<(), EngineError> {
    if interval.start >= interval.end {
        return Err(EngineError::Validation(
            "start time must be before end time",
        ));
    }
    if interval.end > MINUTES_PER_DAY {
        return Err(EngineError::Validation("end time is past midnight"));
    }
    Ok(())
}

/// Scan the day's active bookings for an overlap with `candidate`.
/// Linear — a day holds at most a business day's worth of bookings.
pub(crate) fn check_no_conflict(
    day: &DayState,
    candidate: &TimeInterval,
) -> Result<(), EngineError> {
    for booking in &day.bookings {
        if booking.status.occupies_time() && booking.interval.overlaps(candidate) {
            return Err(EngineError::Conflict(booking.id));
        }
    }
    Ok(())
}

use ulid::Ulid;

use crate::model::BookingStatus;

#[derive(Debug)]
pub enum EngineError {
    /// Malformed input: bad interval bounds, bad date, oversized field.
    Validation(&'static str),
    NotFound(Ulid),
    /// The requested interval overlaps the identified active booking.
    Conflict(Ulid),
    /// The caller's role/ownership does not allow the operation.
    Permission(&'static str),
    /// No role may make this transition (terminal source, self-transition,
    /// or a move back to pending).
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    AlreadyExists(Ulid),
    /// Venue still has pending or confirmed bookings.
    HasActiveBookings(Ulid),
    LimitExceeded(&'static str),
    WalError(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(msg) => write!(f, "invalid request: {msg}"),
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::Conflict(id) => {
                write!(f, "time slot not available: conflicts with booking {id}")
            }
            EngineError::Permission(msg) => write!(f, "permission denied: {msg}"),
            EngineError::InvalidTransition { from, to } => {
                write!(f, "invalid status transition: {from} -> {to}")
            }
            EngineError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            EngineError::HasActiveBookings(id) => {
                write!(f, "cannot delete venue {id}: has active bookings")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::WalError(e) => write!(f, "WAL error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

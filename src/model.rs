use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Minutes since midnight — the only time-of-day type.
pub type Minute = u16;

/// 24:00, legal only as an interval end.
pub const MINUTES_PER_DAY: Minute = 24 * 60;

/// System-wide business hours: availability is reported against this window.
pub const OPEN_MINUTE: Minute = 8 * 60;
pub const CLOSE_MINUTE: Minute = 22 * 60;

/// Granularity of reported availability slots.
pub const SLOT_MINUTES: Minute = 60;

pub fn business_hours() -> TimeInterval {
    TimeInterval::new(OPEN_MINUTE, CLOSE_MINUTE)
}

/// Parse a clock time like "08:30" (or unpadded "8:30") into minutes since
/// midnight. "24:00" is accepted so an interval can end at close of day.
pub fn parse_hhmm(s: &str) -> Option<Minute> {
    let (h, m) = s.split_once(':')?;
    let h: u16 = h.trim().parse().ok()?;
    let m: u16 = m.trim().parse().ok()?;
    if m >= 60 {
        return None;
    }
    let total = h.checked_mul(60)?.checked_add(m)?;
    if total > MINUTES_PER_DAY {
        return None;
    }
    Some(total)
}

pub fn fmt_hhmm(minute: Minute) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Half-open interval `[start, end)` in minutes-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: Minute,
    pub end: Minute,
}

impl TimeInterval {
    pub fn new(start: Minute, end: Minute) -> Self {
        debug_assert!(start < end, "TimeInterval start must be before end");
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> Minute {
        self.end - self.start
    }

    /// Half-open overlap test. Touching intervals do not overlap, so
    /// back-to-back bookings are legal.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", fmt_hhmm(self.start), fmt_hhmm(self.end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    /// Pending and confirmed bookings occupy their interval; rejected and
    /// cancelled ones free it.
    pub fn occupies_time(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::Cancelled)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "rejected" => Some(BookingStatus::Rejected),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Identity of the session issuing an operation. Authentication happens at
/// connection startup; the engine only authorizes against this.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn owns(&self, booking: &Booking) -> bool {
        self.user_id == booking.user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venue {
    pub id: Ulid,
    pub name: String,
    /// Room size, informational only.
    pub capacity: u32,
    pub description: Option<String>,
    /// Inactive venues are hidden from listings but keep their bookings.
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Ulid,
    pub venue_id: Ulid,
    /// Login name of the session that created the booking.
    pub user_id: String,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub status: BookingStatus,
}

/// All bookings for one (venue, date), sorted by interval start. The unit of
/// locking: conflict checks and inserts happen under this day's write lock.
#[derive(Debug, Clone)]
pub struct DayState {
    pub venue_id: Ulid,
    pub date: NaiveDate,
    pub bookings: Vec<Booking>,
}

impl DayState {
    pub fn new(venue_id: Ulid, date: NaiveDate) -> Self {
        Self {
            venue_id,
            date,
            bookings: Vec::new(),
        }
    }

    /// Insert keeping sort order by interval start.
    pub fn insert_booking(&mut self, booking: Booking) {
        let pos = self
            .bookings
            .binary_search_by_key(&booking.interval.start, |b| b.interval.start)
            .unwrap_or_else(|e| e);
        self.bookings.insert(pos, booking);
    }

    pub fn remove_booking(&mut self, id: Ulid) -> Option<Booking> {
        if let Some(pos) = self.bookings.iter().position(|b| b.id == id) {
            Some(self.bookings.remove(pos))
        } else {
            None
        }
    }

    pub fn find_booking(&self, id: Ulid) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    /// Intervals of bookings that currently occupy time.
    pub fn busy_intervals(&self) -> Vec<TimeInterval> {
        self.bookings
            .iter()
            .filter(|b| b.status.occupies_time())
            .map(|b| b.interval)
            .collect()
    }
}

/// The event types — flat, no nesting. This is the WAL record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    VenueCreated {
        id: Ulid,
        name: String,
        capacity: u32,
        description: Option<String>,
    },
    VenueUpdated {
        id: Ulid,
        name: String,
        capacity: u32,
        description: Option<String>,
        is_active: bool,
    },
    VenueDeleted {
        id: Ulid,
    },
    BookingCreated {
        id: Ulid,
        venue_id: Ulid,
        user_id: String,
        date: NaiveDate,
        interval: TimeInterval,
    },
    BookingStatusSet {
        id: Ulid,
        venue_id: Ulid,
        date: NaiveDate,
        status: BookingStatus,
    },
    BookingDeleted {
        id: Ulid,
        venue_id: Ulid,
        date: NaiveDate,
    },
}

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::model::{Booking, BookingStatus, DayState, Event, Venue};

/// A venue's bookings are partitioned by calendar date; the pair is the unit
/// of locking and lookup.
pub type DayKey = (Ulid, NaiveDate);

pub type SharedDayState = Arc<RwLock<DayState>>;

/// In-memory booking store. Handed to the engine at construction — components
/// never reach into ambient state.
pub struct BookingStore {
    venues: DashMap<Ulid, Venue>,
    days: DashMap<DayKey, SharedDayState>,
    /// Reverse lookup: booking id → (venue, date).
    booking_days: DashMap<Ulid, DayKey>,
    /// Venue → dates that have a day state, for venue-wide scans and deletes.
    venue_dates: DashMap<Ulid, Vec<NaiveDate>>,
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingStore {
    pub fn new() -> Self {
        Self {
            venues: DashMap::new(),
            days: DashMap::new(),
            booking_days: DashMap::new(),
            venue_dates: DashMap::new(),
        }
    }

    // ── Venues ───────────────────────────────────────────────

    pub fn venue_count(&self) -> usize {
        self.venues.len()
    }

    pub fn contains_venue(&self, id: &Ulid) -> bool {
        self.venues.contains_key(id)
    }

    pub fn get_venue(&self, id: &Ulid) -> Option<Venue> {
        self.venues.get(id).map(|e| e.value().clone())
    }

    pub fn insert_venue(&self, venue: Venue) {
        self.venues.insert(venue.id, venue);
    }

    /// Update-if-exists; false means the venue vanished.
    pub fn update_venue(
        &self,
        id: &Ulid,
        name: String,
        capacity: u32,
        description: Option<String>,
        is_active: bool,
    ) -> bool {
        match self.venues.get_mut(id) {
            Some(mut entry) => {
                let venue = entry.value_mut();
                venue.name = name;
                venue.capacity = capacity;
                venue.description = description;
                venue.is_active = is_active;
                true
            }
            None => false,
        }
    }

    pub fn remove_venue(&self, id: &Ulid) -> Option<Venue> {
        self.venues.remove(id).map(|(_, v)| v)
    }

    pub fn list_venues(&self) -> Vec<Venue> {
        self.venues.iter().map(|e| e.value().clone()).collect()
    }

    // ── Day states ───────────────────────────────────────────

    pub fn day(&self, venue_id: Ulid, date: NaiveDate) -> Option<SharedDayState> {
        self.days.get(&(venue_id, date)).map(|e| e.value().clone())
    }

    /// Get or lazily create the day state for (venue, date).
    pub fn day_or_create(&self, venue_id: Ulid, date: NaiveDate) -> SharedDayState {
        let key = (venue_id, date);
        if let Some(existing) = self.days.get(&key) {
            return existing.value().clone();
        }
        let created = self
            .days
            .entry(key)
            .or_insert_with(|| {
                self.venue_dates.entry(venue_id).or_default().push(date);
                Arc::new(RwLock::new(DayState::new(venue_id, date)))
            })
            .value()
            .clone();
        created
    }

    pub fn dates_for_venue(&self, venue_id: &Ulid) -> Vec<NaiveDate> {
        self.venue_dates
            .get(venue_id)
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }

    /// Drop every day state for a venue, unindexing its bookings.
    /// Caller must already have established that none of them are active.
    pub fn remove_venue_days(&self, venue_id: &Ulid) {
        let dates = self
            .venue_dates
            .remove(venue_id)
            .map(|(_, d)| d)
            .unwrap_or_default();
        for date in dates {
            self.days.remove(&(*venue_id, date));
        }
        self.booking_days.retain(|_, key| key.0 != *venue_id);
    }

    pub fn all_days(&self) -> Vec<SharedDayState> {
        self.days.iter().map(|e| e.value().clone()).collect()
    }

    // ── Booking index ────────────────────────────────────────

    pub fn contains_booking(&self, id: &Ulid) -> bool {
        self.booking_days.contains_key(id)
    }

    pub fn booking_day(&self, id: &Ulid) -> Option<DayKey> {
        self.booking_days.get(id).map(|e| *e.value())
    }

    // ── Event application ────────────────────────────────────

    /// Apply a booking event to a locked day state (caller holds the lock).
    /// Venue events are handled at the map level, not here.
    pub fn apply_event(&self, day: &mut DayState, event: &Event) {
        match event {
            Event::BookingCreated {
                id,
                venue_id,
                user_id,
                date,
                interval,
            } => {
                day.insert_booking(Booking {
                    id: *id,
                    venue_id: *venue_id,
                    user_id: user_id.clone(),
                    date: *date,
                    interval: *interval,
                    status: BookingStatus::Pending,
                });
                self.booking_days.insert(*id, (*venue_id, *date));
            }
            Event::BookingStatusSet { id, status, .. } => {
                if let Some(booking) = day.bookings.iter_mut().find(|b| b.id == *id) {
                    booking.status = *status;
                }
            }
            Event::BookingDeleted { id, .. } => {
                day.remove_booking(*id);
                self.booking_days.remove(id);
            }
            Event::VenueCreated { .. } | Event::VenueUpdated { .. } | Event::VenueDeleted { .. } => {
            }
        }
    }
}

use chrono::NaiveDate;
use ulid::Ulid;

use crate::model::{
    business_hours, Booking, Caller, Minute, TimeInterval, Venue, MINUTES_PER_DAY, SLOT_MINUTES,
};

use super::availability::{free_slots, is_available};
use super::{Engine, EngineError};

impl Engine {
    /// Active venues only, oldest first. Inactive venues keep their bookings
    /// but are hidden from listings.
    pub fn list_venues(&self) -> Vec<Venue> {
        let mut venues: Vec<Venue> = self
            .store
            .list_venues()
            .into_iter()
            .filter(|v| v.is_active)
            .collect();
        venues.sort_by_key(|v| v.id);
        venues
    }

    pub fn get_venue(&self, id: Ulid) -> Result<Venue, EngineError> {
        self.store.get_venue(&id).ok_or(EngineError::NotFound(id))
    }

    /// Admins see every booking; users see their own. Optional venue and date
    /// filters narrow the scan.
    pub async fn list_bookings(
        &self,
        caller: &Caller,
        venue_id: Option<Ulid>,
        date: Option<NaiveDate>,
    ) -> Vec<Booking> {
        let days = match (venue_id, date) {
            (Some(vid), Some(d)) => self.store.day(vid, d).into_iter().collect(),
            (Some(vid), None) => self
                .store
                .dates_for_venue(&vid)
                .into_iter()
                .filter_map(|d| self.store.day(vid, d))
                .collect(),
            _ => self.store.all_days(),
        };

        let mut bookings = Vec::new();
        for day in days {
            let guard = day.read().await;
            for booking in &guard.bookings {
                if let Some(d) = date
                    && booking.date != d {
                        continue;
                    }
                if !caller.role.is_admin() && !caller.owns(booking) {
                    continue;
                }
                bookings.push(booking.clone());
            }
        }
        bookings.sort_by(|a, b| {
            (a.date, a.interval.start, a.id).cmp(&(b.date, b.interval.start, b.id))
        });
        bookings
    }

    /// Owner or admin; anyone else gets a permission error, not a 404, since
    /// the booking does exist.
    pub async fn get_booking(&self, id: Ulid, caller: &Caller) -> Result<Booking, EngineError> {
        let (venue_id, date) = self
            .store
            .booking_day(&id)
            .ok_or(EngineError::NotFound(id))?;
        let day = self
            .store
            .day(venue_id, date)
            .ok_or(EngineError::NotFound(id))?;
        let guard = day.read().await;
        let booking = guard.find_booking(id).ok_or(EngineError::NotFound(id))?;
        if !caller.role.is_admin() && !caller.owns(booking) {
            return Err(EngineError::Permission(
                "you do not have permission to access this booking",
            ));
        }
        Ok(booking.clone())
    }

    /// Ordered free slots for a venue-day, over system business hours.
    pub async fn free_slots_for(
        &self,
        venue_id: Ulid,
        date: NaiveDate,
    ) -> Result<Vec<TimeInterval>, EngineError> {
        if !self.store.contains_venue(&venue_id) {
            return Err(EngineError::NotFound(venue_id));
        }
        let busy = match self.store.day(venue_id, date) {
            Some(day) => day.read().await.busy_intervals(),
            None => Vec::new(),
        };
        Ok(free_slots(&business_hours(), SLOT_MINUTES, &busy))
    }

    /// Availability of the single slot starting at `start`. Returns the slot
    /// interval when free, None when taken.
    pub async fn check_slot(
        &self,
        venue_id: Ulid,
        date: NaiveDate,
        start: Minute,
    ) -> Result<Option<TimeInterval>, EngineError> {
        if !self.store.contains_venue(&venue_id) {
            return Err(EngineError::NotFound(venue_id));
        }
        let Some(end) = start.checked_add(SLOT_MINUTES).filter(|e| *e <= MINUTES_PER_DAY) else {
            return Err(EngineError::Validation("time slot extends past midnight"));
        };
        let candidate = TimeInterval::new(start, end);
        let busy = match self.store.day(venue_id, date) {
            Some(day) => day.read().await.busy_intervals(),
            None => Vec::new(),
        };
        Ok(if is_available(&candidate, &busy) {
            Some(candidate)
        } else {
            None
        })
    }
}

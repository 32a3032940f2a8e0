use chrono::NaiveDate;
use ulid::Ulid;

use crate::limits::*;
use crate::model::{Booking, BookingStatus, Caller, Event, TimeInterval, Venue};

use super::conflict::{check_no_conflict, validate_interval};
use super::lifecycle;
use super::{Engine, EngineError};

fn require_admin(caller: &Caller) -> Result<(), EngineError> {
    if caller.role.is_admin() {
        Ok(())
    } else {
        Err(EngineError::Permission("only an admin can manage venues"))
    }
}

impl Engine {
    pub async fn create_venue(
        &self,
        id: Ulid,
        name: String,
        capacity: u32,
        description: Option<String>,
        caller: &Caller,
    ) -> Result<(), EngineError> {
        require_admin(caller)?;
        if self.store.venue_count() >= MAX_VENUES {
            return Err(EngineError::LimitExceeded("too many venues"));
        }
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("venue name length"));
        }
        if let Some(ref d) = description
            && d.len() > MAX_DESCRIPTION_LEN {
                return Err(EngineError::LimitExceeded("venue description too long"));
            }
        if self.store.contains_venue(&id) {
            return Err(EngineError::AlreadyExists(id));
        }

        let event = Event::VenueCreated {
            id,
            name: name.clone(),
            capacity,
            description: description.clone(),
        };
        self.wal_append(&event).await?;
        self.store.insert_venue(Venue {
            id,
            name,
            capacity,
            description,
            is_active: true,
        });
        Ok(())
    }

    pub async fn update_venue(
        &self,
        id: Ulid,
        name: String,
        capacity: u32,
        description: Option<String>,
        is_active: bool,
        caller: &Caller,
    ) -> Result<(), EngineError> {
        require_admin(caller)?;
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("venue name length"));
        }
        if let Some(ref d) = description
            && d.len() > MAX_DESCRIPTION_LEN {
                return Err(EngineError::LimitExceeded("venue description too long"));
            }
        if !self.store.contains_venue(&id) {
            return Err(EngineError::NotFound(id));
        }

        let event = Event::VenueUpdated {
            id,
            name: name.clone(),
            capacity,
            description: description.clone(),
            is_active,
        };
        self.wal_append(&event).await?;
        // Update-if-exists: a venue deleted in the meantime surfaces as
        // not-found rather than silently reappearing.
        if self
            .store
            .update_venue(&id, name, capacity, description, is_active)
        {
            Ok(())
        } else {
            Err(EngineError::NotFound(id))
        }
    }

    /// Venues with pending or confirmed bookings cannot be deleted; terminal
    /// bookings are dropped along with the venue.
    pub async fn delete_venue(&self, id: Ulid, caller: &Caller) -> Result<(), EngineError> {
        require_admin(caller)?;
        if !self.store.contains_venue(&id) {
            return Err(EngineError::NotFound(id));
        }

        for date in self.store.dates_for_venue(&id) {
            if let Some(day) = self.store.day(id, date) {
                let guard = day.read().await;
                if guard.bookings.iter().any(|b| b.status.occupies_time()) {
                    return Err(EngineError::HasActiveBookings(id));
                }
            }
        }

        let event = Event::VenueDeleted { id };
        self.wal_append(&event).await?;
        self.store.remove_venue_days(&id);
        self.store.remove_venue(&id);
        Ok(())
    }

    /// Create a booking in pending status. The conflict check and the insert
    /// run under the (venue, date) write lock, so of N concurrent overlapping
    /// requests exactly one commits and the rest fail with Conflict.
    pub async fn create_booking(
        &self,
        id: Ulid,
        venue_id: Ulid,
        date: NaiveDate,
        interval: TimeInterval,
        caller: &Caller,
    ) -> Result<(), EngineError> {
        validate_interval(&interval)?;
        if caller.user_id.is_empty() || caller.user_id.len() > MAX_USER_ID_LEN {
            return Err(EngineError::LimitExceeded("user id length"));
        }
        if !self.store.contains_venue(&venue_id) {
            return Err(EngineError::NotFound(venue_id));
        }
        if self.store.contains_booking(&id) {
            return Err(EngineError::AlreadyExists(id));
        }

        let day = self.store.day_or_create(venue_id, date);
        let mut guard = day.write().await;
        if guard.bookings.len() >= MAX_BOOKINGS_PER_DAY {
            return Err(EngineError::LimitExceeded("too many bookings on this day"));
        }

        if let Err(e) = check_no_conflict(&guard, &interval) {
            metrics::counter!(crate::observability::BOOKING_CONFLICTS_TOTAL).increment(1);
            return Err(e);
        }

        let event = Event::BookingCreated {
            id,
            venue_id,
            user_id: caller.user_id.clone(),
            date,
            interval,
        };
        self.persist_and_apply(&mut guard, &event).await?;
        metrics::counter!(crate::observability::BOOKINGS_CREATED_TOTAL).increment(1);
        Ok(())
    }

    /// Apply a status transition, enforcing the lifecycle table.
    pub async fn set_booking_status(
        &self,
        id: Ulid,
        status: BookingStatus,
        caller: &Caller,
    ) -> Result<Booking, EngineError> {
        let ((venue_id, date), mut guard) = self.resolve_booking_write(&id).await?;
        let booking = guard.find_booking(id).ok_or(EngineError::NotFound(id))?;
        lifecycle::authorize_transition(booking.status, status, caller.role, caller.owns(booking))?;

        let event = Event::BookingStatusSet {
            id,
            venue_id,
            date,
            status,
        };
        self.persist_and_apply(&mut guard, &event).await?;
        guard
            .find_booking(id)
            .cloned()
            .ok_or(EngineError::NotFound(id))
    }

    /// Physically remove a booking (owner or admin; confirmed is admin-only).
    pub async fn remove_booking(&self, id: Ulid, caller: &Caller) -> Result<Booking, EngineError> {
        let ((venue_id, date), mut guard) = self.resolve_booking_write(&id).await?;
        let booking = guard
            .find_booking(id)
            .cloned()
            .ok_or(EngineError::NotFound(id))?;
        lifecycle::authorize_removal(booking.status, caller.role, caller.owns(&booking))?;

        let event = Event::BookingDeleted {
            id,
            venue_id,
            date,
        };
        self.persist_and_apply(&mut guard, &event).await?;
        Ok(booking)
    }
}

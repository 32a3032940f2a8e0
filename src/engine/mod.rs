mod availability;
mod conflict;
mod error;
pub mod lifecycle;
mod mutations;
mod queries;
mod store;

pub use availability::{free_slots, has_conflict, is_available};
pub use error::EngineError;
pub use store::{BookingStore, DayKey, SharedDayState};

use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use tokio::sync::{mpsc, oneshot};
use ulid::Ulid;

use crate::model::{DayState, Event, Venue};
use crate::wal::Wal;

// ── Group-commit WAL channel ─────────────────────────────

pub(super) enum WalCommand {
    Append {
        event: Event,
        response: oneshot::Sender<io::Result<()>>,
    },
    Compact {
        events: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    AppendsSinceCompact {
        response: oneshot::Sender<u64>,
    },
}

/// Background task that owns the WAL and batches appends for group commit.
/// 1. Block until the first Append arrives.
/// 2. Buffer it (no fsync).
/// 3. Drain all immediately available Appends (the batch window).
/// 4. Single flush_sync for the whole batch.
/// 5. Respond Ok to all senders.
async fn wal_writer_loop(mut wal: Wal, mut rx: mpsc::Receiver<WalCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            WalCommand::Append { event, response } => {
                let mut batch = vec![(event, response)];

                // Drain all immediately available appends
                loop {
                    match rx.try_recv() {
                        Ok(WalCommand::Append { event, response }) => {
                            batch.push((event, response));
                        }
                        Ok(other) => {
                            // Flush current batch first, then handle the non-append command
                            metrics::histogram!(crate::observability::WAL_FLUSH_BATCH_SIZE)
                                .record(batch.len() as f64);
                            let flush_start = std::time::Instant::now();
                            let result = flush_batch(&mut wal, &mut batch);
                            metrics::histogram!(crate::observability::WAL_FLUSH_DURATION_SECONDS)
                                .record(flush_start.elapsed().as_secs_f64());
                            respond_batch(&mut batch, &result);
                            handle_non_append(&mut wal, other);
                            break;
                        }
                        Err(_) => break, // channel empty — flush batch
                    }
                }

                if !batch.is_empty() {
                    metrics::histogram!(crate::observability::WAL_FLUSH_BATCH_SIZE)
                        .record(batch.len() as f64);
                    let flush_start = std::time::Instant::now();
                    let result = flush_batch(&mut wal, &mut batch);
                    metrics::histogram!(crate::observability::WAL_FLUSH_DURATION_SECONDS)
                        .record(flush_start.elapsed().as_secs_f64());
                    respond_batch(&mut batch, &result);
                }
            }
            other => handle_non_append(&mut wal, other),
        }
    }
}

fn flush_batch(
    wal: &mut Wal,
    batch: &mut [(Event, oneshot::Sender<io::Result<()>>)],
) -> io::Result<()> {
    let mut append_err: Option<io::Error> = None;
    for (event, _) in batch.iter() {
        if let Err(e) = wal.append_buffered(event) {
            append_err = Some(e);
            break;
        }
    }
    // Always flush — even on append error — so partially buffered bytes
    // don't leak into the next batch (callers were told this batch failed).
    let flush_err = wal.flush_sync().err();
    if let Some(e) = append_err {
        return Err(e);
    }
    if let Some(e) = flush_err {
        return Err(e);
    }
    Ok(())
}

fn respond_batch(batch: &mut Vec<(Event, oneshot::Sender<io::Result<()>>)>, result: &io::Result<()>) {
    for (_, tx) in batch.drain(..) {
        let r = match result {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        };
        let _ = tx.send(r);
    }
}

fn handle_non_append(wal: &mut Wal, cmd: WalCommand) {
    match cmd {
        WalCommand::Compact { events, response } => {
            let result = Wal::write_compact_file(wal.path(), &events)
                .and_then(|()| wal.swap_compact_file());
            let _ = response.send(result);
        }
        WalCommand::AppendsSinceCompact { response } => {
            let _ = response.send(wal.appends_since_compact());
        }
        WalCommand::Append { .. } => unreachable!(),
    }
}

pub struct Engine {
    pub(super) store: BookingStore,
    pub(super) wal_tx: mpsc::Sender<WalCommand>,
}

impl Engine {
    pub fn new(wal_path: PathBuf) -> io::Result<Self> {
        let events = Wal::replay(&wal_path)?;
        let wal = Wal::open(&wal_path)?;
        let (wal_tx, wal_rx) = mpsc::channel(4096);
        tokio::spawn(wal_writer_loop(wal, wal_rx));

        let engine = Self {
            store: BookingStore::new(),
            wal_tx,
        };

        // Replay events — we're the sole owner of the day Arcs here, so
        // try_write always succeeds instantly (no contention). Never use
        // blocking_write: this may run inside an async context.
        for event in &events {
            match event {
                Event::VenueCreated {
                    id,
                    name,
                    capacity,
                    description,
                } => {
                    engine.store.insert_venue(Venue {
                        id: *id,
                        name: name.clone(),
                        capacity: *capacity,
                        description: description.clone(),
                        is_active: true,
                    });
                }
                Event::VenueUpdated {
                    id,
                    name,
                    capacity,
                    description,
                    is_active,
                } => {
                    engine.store.update_venue(
                        id,
                        name.clone(),
                        *capacity,
                        description.clone(),
                        *is_active,
                    );
                }
                Event::VenueDeleted { id } => {
                    engine.store.remove_venue_days(id);
                    engine.store.remove_venue(id);
                }
                other => {
                    if let Some((venue_id, date)) = event_day_key(other) {
                        let day = engine.store.day_or_create(venue_id, date);
                        let mut guard = day.try_write().expect("replay: uncontended write");
                        engine.store.apply_event(&mut guard, other);
                    }
                }
            }
        }

        Ok(engine)
    }

    /// Write an event to the WAL via the background group-commit writer.
    pub(super) async fn wal_append(&self, event: &Event) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Append {
                event: event.clone(),
                response: tx,
            })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    /// WAL-append + apply in one call, under the caller's day write lock.
    pub(super) async fn persist_and_apply(
        &self,
        day: &mut DayState,
        event: &Event,
    ) -> Result<(), EngineError> {
        self.wal_append(event).await?;
        self.store.apply_event(day, event);
        Ok(())
    }

    /// Lookup booking → day, acquire the day write lock.
    pub(super) async fn resolve_booking_write(
        &self,
        booking_id: &Ulid,
    ) -> Result<(DayKey, tokio::sync::OwnedRwLockWriteGuard<DayState>), EngineError> {
        let key = self
            .store
            .booking_day(booking_id)
            .ok_or(EngineError::NotFound(*booking_id))?;
        let day = self
            .store
            .day(key.0, key.1)
            .ok_or(EngineError::NotFound(*booking_id))?;
        let guard = day.write_owned().await;
        Ok((key, guard))
    }

    /// Compact the WAL by rewriting it with only the events needed to
    /// recreate the current state. Terminal bookings are preserved — they no
    /// longer occupy time but stay listable.
    pub async fn compact_wal(&self) -> Result<(), EngineError> {
        let mut events = Vec::new();

        for venue in self.store.list_venues() {
            events.push(Event::VenueCreated {
                id: venue.id,
                name: venue.name.clone(),
                capacity: venue.capacity,
                description: venue.description.clone(),
            });
            if !venue.is_active {
                events.push(Event::VenueUpdated {
                    id: venue.id,
                    name: venue.name,
                    capacity: venue.capacity,
                    description: venue.description,
                    is_active: false,
                });
            }
        }

        for day in self.store.all_days() {
            let guard = day.read().await;
            for booking in &guard.bookings {
                events.push(Event::BookingCreated {
                    id: booking.id,
                    venue_id: booking.venue_id,
                    user_id: booking.user_id.clone(),
                    date: booking.date,
                    interval: booking.interval,
                });
                if booking.status != crate::model::BookingStatus::Pending {
                    events.push(Event::BookingStatusSet {
                        id: booking.id,
                        venue_id: booking.venue_id,
                        date: booking.date,
                        status: booking.status,
                    });
                }
            }
        }

        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Compact {
                events,
                response: tx,
            })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    pub async fn wal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .wal_tx
            .send(WalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

/// Extract the (venue, date) routing key from a booking event.
fn event_day_key(event: &Event) -> Option<(Ulid, NaiveDate)> {
    match event {
        Event::BookingCreated { venue_id, date, .. }
        | Event::BookingStatusSet { venue_id, date, .. }
        | Event::BookingDeleted { venue_id, date, .. } => Some((*venue_id, *date)),
        Event::VenueCreated { .. } | Event::VenueUpdated { .. } | Event::VenueDeleted { .. } => {
            None
        }
    }
}

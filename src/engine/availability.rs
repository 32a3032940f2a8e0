use crate::model::{Minute, TimeInterval};

// ── Availability Algorithm ────────────────────────────────────────

/// True iff `candidate` overlaps any interval in `busy`. Order-independent.
pub fn has_conflict(candidate: &TimeInterval, busy: &[TimeInterval]) -> bool {
    busy.iter().any(|b| b.overlaps(candidate))
}

/// Whether an arbitrary candidate interval is free. Booking requests are not
/// required to align to the slot grid; only the availability report is slotted.
pub fn is_available(candidate: &TimeInterval, busy: &[TimeInterval]) -> bool {
    !has_conflict(candidate, busy)
}

/// Partition `hours` into consecutive `granularity`-sized slots starting at
/// `hours.start` and return the free ones in chronological order. A final slot
/// that would cross `hours.end` is dropped, not shortened.
pub fn free_slots(
    hours: &TimeInterval,
    granularity: Minute,
    busy: &[TimeInterval],
) -> Vec<TimeInterval> {
    let mut slots = Vec::new();
    if granularity == 0 {
        return slots;
    }
    let mut start = hours.start;
    while start + granularity <= hours.end {
        let slot = TimeInterval::new(start, start + granularity);
        if is_available(&slot, busy) {
            slots.push(slot);
        }
        start += granularity;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{business_hours, parse_hhmm, SLOT_MINUTES};

    fn at(s: &str) -> Minute {
        parse_hhmm(s).unwrap()
    }

    fn iv(start: &str, end: &str) -> TimeInterval {
        TimeInterval::new(at(start), at(end))
    }

    // ── has_conflict / is_available ───────────────────────

    #[test]
    fn no_busy_intervals_means_available() {
        assert!(is_available(&iv("09:00", "10:00"), &[]));
    }

    #[test]
    fn conflict_found_regardless_of_order() {
        let candidate = iv("09:30", "10:30");
        let busy_a = vec![iv("08:00", "09:00"), iv("10:00", "11:00")];
        let busy_b = vec![iv("10:00", "11:00"), iv("08:00", "09:00")];
        assert!(has_conflict(&candidate, &busy_a));
        assert!(has_conflict(&candidate, &busy_b));
    }

    #[test]
    fn back_to_back_is_available() {
        let busy = vec![iv("09:00", "10:00")];
        assert!(is_available(&iv("08:00", "09:00"), &busy));
        assert!(is_available(&iv("10:00", "11:00"), &busy));
    }

    #[test]
    fn unaligned_candidate_checked_against_grid_free_day() {
        // Requests need not align to the slot grid.
        let busy = vec![iv("09:00", "10:00")];
        assert!(is_available(&iv("10:15", "11:45"), &busy));
        assert!(!is_available(&iv("09:45", "10:05"), &busy));
    }

    // ── free_slots ────────────────────────────────────────

    #[test]
    fn full_business_day_has_fourteen_slots() {
        let slots = free_slots(&business_hours(), SLOT_MINUTES, &[]);
        assert_eq!(slots.len(), 14);
        assert_eq!(slots[0], iv("08:00", "09:00"));
        assert_eq!(slots[13], iv("21:00", "22:00"));
    }

    #[test]
    fn busy_block_removes_exactly_its_slots() {
        let busy = vec![iv("09:00", "11:00")];
        let slots = free_slots(&business_hours(), SLOT_MINUTES, &busy);
        assert_eq!(slots.len(), 12);
        assert!(!slots.contains(&iv("09:00", "10:00")));
        assert!(!slots.contains(&iv("10:00", "11:00")));
        assert!(slots.contains(&iv("08:00", "09:00")));
        assert!(slots.contains(&iv("11:00", "12:00")));
    }

    #[test]
    fn unaligned_busy_interval_blocks_both_touched_slots() {
        let busy = vec![iv("09:30", "10:30")];
        let slots = free_slots(&business_hours(), SLOT_MINUTES, &busy);
        assert!(!slots.contains(&iv("09:00", "10:00")));
        assert!(!slots.contains(&iv("10:00", "11:00")));
        assert!(slots.contains(&iv("08:00", "09:00")));
        assert!(slots.contains(&iv("11:00", "12:00")));
    }

    #[test]
    fn truncated_final_slot_is_dropped() {
        // 90-minute window, 60-minute slots: only one slot fits.
        let hours = iv("08:00", "09:30");
        let slots = free_slots(&hours, SLOT_MINUTES, &[]);
        assert_eq!(slots, vec![iv("08:00", "09:00")]);
    }

    #[test]
    fn empty_window_yields_no_slots() {
        let hours = TimeInterval {
            start: at("08:00"),
            end: at("08:00"),
        };
        assert!(free_slots(&hours, SLOT_MINUTES, &[]).is_empty());
    }

    #[test]
    fn zero_granularity_yields_no_slots() {
        assert!(free_slots(&business_hours(), 0, &[]).is_empty());
    }

    #[test]
    fn output_is_chronological() {
        let busy = vec![iv("12:00", "13:00")];
        let slots = free_slots(&business_hours(), SLOT_MINUTES, &busy);
        for pair in slots.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn recomputation_is_idempotent() {
        let busy = vec![iv("09:00", "11:00"), iv("14:00", "15:00")];
        let first = free_slots(&business_hours(), SLOT_MINUTES, &busy);
        let second = free_slots(&business_hours(), SLOT_MINUTES, &busy);
        assert_eq!(first, second);
    }

    #[test]
    fn fully_booked_day_has_no_slots() {
        let busy = vec![iv("08:00", "22:00")];
        assert!(free_slots(&business_hours(), SLOT_MINUTES, &busy).is_empty());
    }
}

use std::net::SocketAddr;

use crate::sql::Command;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total queries executed. Labels: command, status.
pub const QUERIES_TOTAL: &str = "venued_queries_total";

/// Histogram: query latency in seconds. Labels: command.
pub const QUERY_DURATION_SECONDS: &str = "venued_query_duration_seconds";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: active TCP connections.
pub const CONNECTIONS_ACTIVE: &str = "venued_connections_active";

/// Counter: total connections accepted.
pub const CONNECTIONS_TOTAL: &str = "venued_connections_total";

/// Counter: connections rejected due to limit.
pub const CONNECTIONS_REJECTED_TOTAL: &str = "venued_connections_rejected_total";

/// Counter: sessions closed for exceeding the token TTL.
pub const SESSIONS_EXPIRED_TOTAL: &str = "venued_sessions_expired_total";

/// Histogram: WAL group-commit flush duration in seconds.
pub const WAL_FLUSH_DURATION_SECONDS: &str = "venued_wal_flush_duration_seconds";

/// Histogram: WAL group-commit batch size (events per flush).
pub const WAL_FLUSH_BATCH_SIZE: &str = "venued_wal_flush_batch_size";

// ── Domain metrics ──────────────────────────────────────────────

/// Counter: bookings successfully created.
pub const BOOKINGS_CREATED_TOTAL: &str = "venued_bookings_created_total";

/// Counter: booking creations refused because the interval was taken.
pub const BOOKING_CONFLICTS_TOTAL: &str = "venued_booking_conflicts_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Map a Command variant to a short label for metrics.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::InsertVenue { .. } => "insert_venue",
        Command::UpdateVenue { .. } => "update_venue",
        Command::DeleteVenue { .. } => "delete_venue",
        Command::SelectVenues => "select_venues",
        Command::InsertBooking { .. } => "insert_booking",
        Command::UpdateBookingStatus { .. } => "update_booking_status",
        Command::DeleteBooking { .. } => "delete_booking",
        Command::SelectBookings { .. } => "select_bookings",
        Command::SelectAvailability { .. } => "select_availability",
    }
}

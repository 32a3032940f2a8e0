//! Latency bench against a running venued instance.
//!
//! Start the server, then:
//!   VENUED_SECRET=... cargo bench --bench stress

use std::time::{Duration, Instant};

use tokio_postgres::{Config, NoTls};
use ulid::Ulid;

async fn connect(host: &str, port: u16, user: &str, secret: &str) -> tokio_postgres::Client {
    let mut config = Config::new();
    config
        .host(host)
        .port(port)
        .dbname("venued")
        .user(user)
        .password(secret);

    let (client, conn) = config.connect(NoTls).await.expect("connect failed");
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            eprintln!("connection error: {e}");
        }
    });
    client
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies.last().unwrap().as_secs_f64() * 1000.0,
    );
}

/// Distinct bookable (date, slot) pairs: one business day has 14 hour slots.
fn slot(i: usize) -> (String, String, String) {
    let date = format!("2025-{:02}-{:02}", 1 + (i / 14 / 28) % 12, 1 + (i / 14) % 28);
    let hour = 8 + (i % 14);
    (date, format!("{hour:02}:00"), format!("{:02}:00", hour + 1))
}

#[tokio::main]
async fn main() {
    let host = std::env::var("VENUED_BENCH_HOST").unwrap_or_else(|_| "127.0.0.1".into());
    let port: u16 = std::env::var("VENUED_BENCH_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5433);
    let secret = std::env::var("VENUED_SECRET").expect("set VENUED_SECRET to the server secret");
    let iterations: usize = std::env::var("VENUED_BENCH_N")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);

    println!("venued stress bench against {host}:{port}, n={iterations}");

    let admin = connect(&host, port, "admin", &secret).await;
    let alice = connect(&host, port, "alice", &secret).await;

    let venue = Ulid::new();
    admin
        .simple_query(&format!(
            "INSERT INTO venues (id, name, capacity) VALUES ('{venue}', 'Bench Room', 8)"
        ))
        .await
        .expect("venue create failed");

    // ── Booking inserts on disjoint slots ───────────────────────
    let mut insert_lat = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let (date, start, end) = slot(i);
        let sql = format!(
            "INSERT INTO bookings (id, venue_id, date, start_time, end_time) \
             VALUES ('{}', '{venue}', '{date}', '{start}', '{end}')",
            Ulid::new()
        );
        let t = Instant::now();
        alice.simple_query(&sql).await.expect("insert failed");
        insert_lat.push(t.elapsed());
    }
    print_latency("booking insert", &mut insert_lat);

    // ── Conflicting inserts (all refused) ───────────────────────
    let mut conflict_lat = Vec::with_capacity(iterations.min(200));
    for i in 0..iterations.min(200) {
        let (date, start, end) = slot(i);
        let sql = format!(
            "INSERT INTO bookings (id, venue_id, date, start_time, end_time) \
             VALUES ('{}', '{venue}', '{date}', '{start}', '{end}')",
            Ulid::new()
        );
        let t = Instant::now();
        let result = alice.simple_query(&sql).await;
        conflict_lat.push(t.elapsed());
        assert!(result.is_err(), "expected conflict");
    }
    print_latency("booking conflict", &mut conflict_lat);

    // ── Availability queries ────────────────────────────────────
    let mut avail_lat = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let (date, _, _) = slot(i);
        let sql = format!(
            "SELECT * FROM availability WHERE venue_id = '{venue}' AND date = '{date}'"
        );
        let t = Instant::now();
        alice.simple_query(&sql).await.expect("availability failed");
        avail_lat.push(t.elapsed());
    }
    print_latency("availability", &mut avail_lat);

    // ── Booking listings (admin sees everything) ────────────────
    let mut list_lat = Vec::with_capacity(200);
    for _ in 0..200 {
        let t = Instant::now();
        admin
            .simple_query("SELECT * FROM bookings")
            .await
            .expect("list failed");
        list_lat.push(t.elapsed());
    }
    print_latency("list bookings", &mut list_lat);
}

//! Thin CLI benchmark over the `shmbus` facade (§2.1 Adapters).
//!
//! Publishes fixed-size payloads as fast as possible on one topic and
//! reports throughput until Ctrl-C. Not part of the core: it only calls
//! through `Bus`, never touches a `Ring` directly.

use clap::Parser;
use shmbus::region::{RingType, TopicConfig};
use shmbus::Bus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "shmbus-bench", about = "Throughput benchmark for a shmbus topic")]
struct Args {
    /// Shared-memory path, e.g. /shmbus-bench
    #[arg(long, default_value = "/shmbus-bench")]
    path: String,

    /// Total region size in bytes.
    #[arg(long, default_value_t = 64 * 1024 * 1024)]
    region_size: u64,

    /// Ring slot count (rounded up to a power of two).
    #[arg(long, default_value_t = 4096)]
    slot_count: usize,

    /// Payload size in bytes.
    #[arg(long, default_value_t = 64)]
    payload_size: usize,

    /// Use MWMR instead of SWMR.
    #[arg(long)]
    mwmr: bool,
}

fn main() -> shmbus::Result<()> {
    tracing_subscriber::fmt::try_init().ok();
    let args = Args::parse();

    let ring_type = if args.mwmr { RingType::Mwmr } else { RingType::Swmr };
    let topics = [TopicConfig::new("bench", args.slot_count, args.payload_size, ring_type)];
    let (bus, outcome) = Bus::create(&args.path, args.region_size, &topics)?;
    tracing::info!(?outcome, path = %args.path, "region ready");

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::Relaxed))
            .expect("failed to install Ctrl-C handler");
    }

    let producer = bus.publisher("bench")?;
    let mut subscriber = bus.subscriber("bench")?;
    let payload = vec![0xAB_u8; args.payload_size];
    let mut buf = vec![0u8; args.payload_size];

    let start = Instant::now();
    let mut sent: u64 = 0;
    let mut received: u64 = 0;
    let mut last_report = start;

    while running.load(Ordering::Relaxed) {
        if producer.publish(&payload).is_ok() {
            sent += 1;
        }
        if subscriber.next(&mut buf).is_ok() {
            received += 1;
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            let health = bus.health();
            tracing::info!(sent, received, skips = health.skip_count, "progress");
            last_report = Instant::now();
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    println!(
        "sent={sent} received={received} elapsed={elapsed:.2}s throughput={:.0} msgs/s",
        sent as f64 / elapsed.max(1e-9)
    );
    Ok(())
}

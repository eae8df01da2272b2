// Polls channel 0 of the shared region created by `producer`, printing each
// message's sequence number alongside its embedded hash.
use shmbus::{Bus, BusError};
use std::env;

const REGION_PATH: &str = "/shmbus-demo";

fn main() -> shmbus::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <expected_messages>", args[0]);
        std::process::exit(1);
    }

    let expected_messages: usize = args[1].parse().expect("Invalid number of messages");
    let mut received = 0;

    println!("Consumer: Waiting for channel 0...");

    let bus = match Bus::open(REGION_PATH) {
        Ok(bus) => {
            println!("Consumer: Found region at {}", REGION_PATH);
            bus
        }
        Err(e) => {
            eprintln!("Failed to attach to region: {}", e);
            return Ok(());
        }
    };

    let mut subscriber = match bus.subscriber("ch0") {
        Ok(subscriber) => {
            println!("Consumer: Found channel 0");
            subscriber
        }
        Err(e) => {
            eprintln!("Failed to create subscriber: {}", e);
            return Ok(());
        }
    };

    let mut buffer = vec![0u8; 4096];
    let start = std::time::Instant::now();
    println!("\n{:<10} {}", "Msg #", "Hash");
    println!("{}", "=".repeat(80));

    while received < expected_messages {
        match subscriber.next(&mut buffer) {
            Ok(len) => {
                if let Ok(message) = std::str::from_utf8(&buffer[..len]) {
                    if let Some((_, rest)) = message.split_once(':') {
                        if let Some((num_str, hash)) = rest.split_once(':') {
                            println!("{:<10} {}", num_str, hash);
                        }
                    }
                }
                received += 1;
                if received % 100 == 0 {
                    println!("--- Received {} messages ---", received);
                }
            }
            Err(BusError::Empty) => {
                if start.elapsed() > std::time::Duration::from_secs(5) {
                    eprintln!("Timeout waiting for messages");
                    break;
                }
                std::thread::yield_now();
            }
            Err(e) => {
                eprintln!("Error receiving message: {}", e);
                break;
            }
        }
    }

    let elapsed = start.elapsed();
    println!("\n{}", "=".repeat(80));
    println!("Consumer: Received {} messages in {:.2?}", received, elapsed);
    println!(
        "Average: {:.2} messages/second",
        received as f64 / elapsed.as_secs_f64()
    );

    if received == expected_messages {
        println!("All messages received successfully");
    }

    let health = bus.health();
    println!(
        "Health: skipped={} torn_reads={} truncated={}",
        health.skip_count, health.torn_read_count, health.truncated_count
    );

    std::thread::sleep(std::time::Duration::from_secs(1));

    Ok(())
}

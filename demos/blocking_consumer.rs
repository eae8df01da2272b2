// Spin-polls a single channel until a message arrives, printing it as it
// comes in. There is no blocking-receive primitive in the core subscriber
// algorithm (§4.5 is poll-based); this loop is the adapter-level equivalent.
use shmbus::BusError;
use std::env;

const REGION_PATH: &str = "/shmbus-demo";

fn main() -> shmbus::Result<()> {
    let args: Vec<String> = env::args().collect();
    let channel_id: usize = if args.len() > 1 {
        args[1].parse().unwrap_or(0)
    } else {
        0
    };

    println!("Blocking Consumer: Connecting to channel {}", channel_id);

    let bus = shmbus::Bus::open(REGION_PATH)?;
    let mut subscriber = bus.subscriber(&format!("ch{channel_id}"))?;

    println!("Blocking Consumer: Waiting for messages...");

    let mut buffer = vec![0u8; 4096];
    loop {
        match subscriber.next(&mut buffer) {
            Ok(len) => {
                let msg = String::from_utf8_lossy(&buffer[..len]);
                println!("Received: {}", msg);
            }
            Err(BusError::Empty) => {
                std::thread::yield_now();
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

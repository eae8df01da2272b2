// Hot-path allocation tracking: publish/subscribe must not allocate once the
// region is mapped and buffers are pre-sized.
//
// Run: cargo test --test allocation_test -- --nocapture
use shmbus::region::{RingType, TopicConfig};
use shmbus::Bus;

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[test]
#[serial_test::serial]
fn publish_and_next_do_not_allocate() {
    let path = "/shmbus-test-dhat";
    let _ = shmbus::shm::unlink(path);

    let topics = [TopicConfig::new("t1", 1024, 64, RingType::Swmr)];
    let (bus, _) = Bus::create(path, 4 * 1024 * 1024, &topics).unwrap();
    let producer = bus.publisher("t1").unwrap();
    let mut subscriber = bus.subscriber("t1").unwrap();
    let payload = vec![7u8; 64];
    let mut buf = vec![0u8; 64];

    // Pre-allocate and warm up before measuring.
    for _ in 0..100 {
        producer.publish(&payload).unwrap();
        subscriber.next(&mut buf).unwrap();
    }

    let profiler = dhat::Profiler::new_heap();
    for _ in 0..1000 {
        producer.publish(&payload).unwrap();
        subscriber.next(&mut buf).unwrap();
    }
    drop(profiler);

    println!("check dhat output above for hot-path allocations");

    let _ = shmbus::shm::unlink(path);
}

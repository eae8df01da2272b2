// S6: region build/attach, including the "pre-existing region" race outcome.
use shmbus::region::{BuildOutcome, Region, RingType, TopicConfig};

const REGION_SIZE: u64 = 1024 * 1024;

#[test]
fn build_then_attach_exposes_both_topics() {
    let path = "/shmbus-test-build-attach";
    let _ = shmbus::shm::unlink(path);

    let topics = vec![
        TopicConfig::new("a", 16, 32, RingType::Swmr),
        TopicConfig::new("b", 4, 128, RingType::Mwmr),
    ];
    let outcome = shmbus::region::builder::build(path, REGION_SIZE, &topics).unwrap();
    assert_eq!(outcome, BuildOutcome::Created);

    let region = Region::attach(path).unwrap();
    let mut names = region.topic_names();
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);

    let ring_a = region.lookup("a").unwrap();
    assert_eq!(ring_a.ring_type(), RingType::Swmr);
    assert_eq!(ring_a.slot_count(), 16);

    let ring_b = region.lookup("b").unwrap();
    assert_eq!(ring_b.ring_type(), RingType::Mwmr);
    assert_eq!(ring_b.slot_count(), 4);

    // A second build call against the same path does not re-initialize the
    // region or error out — it recognizes the winner and reports `Exists`.
    let second = shmbus::region::builder::build(path, REGION_SIZE, &topics).unwrap();
    assert_eq!(second, BuildOutcome::Exists);

    let _ = shmbus::shm::unlink(path);
}

#[test]
fn lookup_of_unknown_topic_is_invalid_args() {
    let path = "/shmbus-test-unknown-topic";
    let _ = shmbus::shm::unlink(path);

    let topics = vec![TopicConfig::new("only", 8, 16, RingType::Swmr)];
    shmbus::region::builder::build(path, REGION_SIZE, &topics).unwrap();

    let region = Region::attach(path).unwrap();
    let err = region.lookup("missing").unwrap_err();
    assert!(matches!(err, shmbus::BusError::InvalidArgs(_)));

    let _ = shmbus::shm::unlink(path);
}

#[test]
fn build_rejects_region_too_small_for_topics() {
    let path = "/shmbus-test-out-of-space";
    let _ = shmbus::shm::unlink(path);

    let topics = vec![TopicConfig::new("huge", 1 << 20, 4096, RingType::Swmr)];
    let err = shmbus::region::builder::build(path, 4096, &topics).unwrap_err();
    assert!(matches!(err, shmbus::BusError::OutOfSpace { .. }));

    // The builder must not leave a half-built object behind at this path.
    assert!(Region::attach(path).is_err());
}

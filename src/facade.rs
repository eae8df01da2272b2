//! The unified facade (§2.1, §4.8): owns one region per `Bus`, and exposes
//! `send`/`recv`/`health` to application code without callers needing to
//! know about ring descriptors or slot offsets.
//!
//! This is explicitly an adapter, not core: it does not retry, rate-limit,
//! or speak a wire protocol. A TCP bridge or backpressure policy would sit
//! in front of this facade, not inside it.

use crate::error::Result;
use crate::publisher::{MwmrPublisher, Publisher, SwmrPublisher};
use crate::region::{BuildOutcome, Region, Ring, RingType, TopicConfig};
use crate::subscriber::{Subscriber, SubscriberCounters};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

/// Aggregate health counters across every subscriber this `Bus` created.
#[derive(Clone, Copy, Debug, Default)]
pub struct HealthSnapshot {
    pub skip_count: u64,
    pub torn_read_count: u64,
    pub truncated_count: u64,
}

struct Inner {
    region: Region,
    next_pub_id: AtomicU16,
    subscriber_counters: Mutex<Vec<SubscriberCounters>>,
    // Caches the topic-table scan `Region::lookup` performs, so repeated
    // `Bus::publisher`/`Bus::subscriber` calls for a topic this process has
    // already resolved don't re-derive its ring-descriptor pointer.
    ring_cache: Mutex<HashMap<String, Ring>>,
}

/// A facade over one shared-memory region.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<Inner>,
}

impl Bus {
    /// Create the region at `path` if it doesn't exist, then attach to it.
    /// A losing race to create (`BuildOutcome::Exists`) is not an error —
    /// this call always returns a usable `Bus` either way.
    pub fn create(path: &str, size: u64, topics: &[TopicConfig]) -> Result<(Self, BuildOutcome)> {
        let outcome = crate::region::builder::build(path, size, topics)?;
        let bus = Self::open(path)?;
        Ok((bus, outcome))
    }

    /// Attach to an already-built region.
    pub fn open(path: &str) -> Result<Self> {
        let region = Region::attach(path)?;
        Ok(Self {
            inner: Arc::new(Inner {
                region,
                next_pub_id: AtomicU16::new(1),
                subscriber_counters: Mutex::new(Vec::new()),
                ring_cache: Mutex::new(HashMap::new()),
            }),
        })
    }

    pub fn topic_names(&self) -> Vec<String> {
        self.inner.region.topic_names()
    }

    fn resolve_ring(&self, topic: &str) -> Result<Ring> {
        if let Some(ring) = self.inner.ring_cache.lock().get(topic) {
            return Ok(ring.clone());
        }
        let ring = self.inner.region.lookup(topic)?;
        self.inner.ring_cache.lock().insert(topic.to_string(), ring.clone());
        Ok(ring)
    }

    /// Build a producer for `topic`, auto-assigning it a publisher id unique
    /// within this `Bus` instance (not across processes — pass an explicit
    /// id via [`Self::publisher_with_id`] when cross-process stability
    /// matters).
    pub fn publisher(&self, topic: &str) -> Result<Box<dyn Publisher + Send + Sync>> {
        let id = self.inner.next_pub_id.fetch_add(1, Ordering::Relaxed);
        self.publisher_with_id(topic, id)
    }

    pub fn publisher_with_id(&self, topic: &str, pub_id: u16) -> Result<Box<dyn Publisher + Send + Sync>> {
        let ring = self.resolve_ring(topic)?;
        Ok(match ring.ring_type() {
            RingType::Swmr => Box::new(SwmrPublisher::new(ring, pub_id)),
            RingType::Mwmr => Box::new(MwmrPublisher::new(ring, pub_id)),
        })
    }

    /// Build a subscriber for `topic`, registering its health counters with
    /// this `Bus` so [`Self::health`] includes them.
    pub fn subscriber(&self, topic: &str) -> Result<Subscriber> {
        let ring = self.resolve_ring(topic)?;
        let counters = SubscriberCounters::new();
        self.inner.subscriber_counters.lock().push(counters.clone());
        Ok(Subscriber::with_counters(ring, counters))
    }

    /// Aggregate skip/torn-read/truncated counts across every subscriber
    /// this `Bus` has built. Touches no shared memory.
    pub fn health(&self) -> HealthSnapshot {
        let guard = self.inner.subscriber_counters.lock();
        guard.iter().fold(HealthSnapshot::default(), |mut acc, c| {
            acc.skip_count += c.skip_count();
            acc.torn_read_count += c.torn_read_count();
            acc.truncated_count += c.truncated_count();
            acc
        })
    }
}

//! Subscriber algorithm (§4.5): cursor tracking, overrun catch-up, and
//! torn-read detection.

use crate::error::{BusError, Result};
use crate::region::Ring;
use std::sync::atomic::{fence, AtomicU64, Ordering};
use std::sync::Arc;

/// A received message's metadata, alongside the payload copied into the
/// caller's buffer.
#[derive(Clone, Copy, Debug)]
pub struct Received {
    pub len: usize,
    pub seq: u64,
    pub pub_id: u16,
    pub timestamp_ns: u64,
}

/// Health counters for one subscriber, shareable so a facade can aggregate
/// them into a [`crate::facade::HealthSnapshot`] without owning the
/// `Subscriber` itself.
#[derive(Clone, Default)]
pub struct SubscriberCounters {
    skip: Arc<AtomicU64>,
    torn_read: Arc<AtomicU64>,
    truncated: Arc<AtomicU64>,
}

impl SubscriberCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_count(&self) -> u64 {
        self.skip.load(Ordering::Relaxed)
    }

    pub fn torn_read_count(&self) -> u64 {
        self.torn_read.load(Ordering::Relaxed)
    }

    pub fn truncated_count(&self) -> u64 {
        self.truncated.load(Ordering::Relaxed)
    }
}

/// Per-process subscriber cursor (§3: "Subscriber cursor"). Never shared
/// between processes or threads — each reader owns its own `last_seq`.
pub struct Subscriber {
    ring: Ring,
    last_seq: u64,
    counters: SubscriberCounters,
}

impl Subscriber {
    pub fn new(ring: Ring) -> Self {
        Self::with_counters(ring, SubscriberCounters::new())
    }

    /// Build a subscriber whose health counters are shared with a facade's
    /// aggregate view (§2.1 Adapters: "health ... aggregated from
    /// subscriber-local counters").
    pub fn with_counters(ring: Ring, counters: SubscriberCounters) -> Self {
        Self {
            ring,
            last_seq: 0,
            counters,
        }
    }

    pub fn counters(&self) -> &SubscriberCounters {
        &self.counters
    }

    pub fn topic(&self) -> &str {
        self.ring.name()
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    pub fn skip_count(&self) -> u64 {
        self.counters.skip_count()
    }

    pub fn torn_read_count(&self) -> u64 {
        self.counters.torn_read_count()
    }

    pub fn truncated_count(&self) -> u64 {
        self.counters.truncated_count()
    }

    /// Read the next message's payload into `buffer`. See [`Self::next_with_meta`]
    /// for a variant that also returns sequence/publisher metadata.
    pub fn next(&mut self, buffer: &mut [u8]) -> Result<usize> {
        self.next_with_meta(buffer).map(|r| r.len)
    }

    /// §4.5, steps 1-9.
    pub fn next_with_meta(&mut self, buffer: &mut [u8]) -> Result<Received> {
        let descriptor = self.ring.descriptor();
        let mut head = descriptor.w_head.load(Ordering::Acquire);
        let mut next = self.last_seq + 1;
        if next > head {
            return Err(BusError::Empty);
        }

        let slot_count = self.ring.slot_count();

        // Overrun catch-up: the writer has lapped us.
        if head - next >= slot_count {
            self.last_seq = head - slot_count;
            next = self.last_seq + 1;
            self.counters.skip.fetch_add(1, Ordering::Relaxed);
            head = descriptor.w_head.load(Ordering::Acquire);
            if next > head {
                return Err(BusError::Empty);
            }
        }

        let index = (next - 1) & self.ring.mask();
        // Safety: `index < slot_count` by masking.
        let slot = unsafe { self.ring.slot(index) };
        let observed_seq = slot.header().seq.load(Ordering::Acquire);

        if observed_seq == 0 || observed_seq < next {
            // Not yet committed. Common during tight polling; no state change.
            return Err(BusError::Empty);
        }
        if observed_seq > next {
            // We fell behind between loading `head` and reading this slot's
            // `seq`. Advance once and let the caller re-enter — retrying in
            // a loop here could starve under adversarial scheduling.
            self.last_seq = observed_seq - 1;
            return Err(BusError::Empty);
        }

        let header = slot.header();
        let payload_len = header.payload_len as usize;
        let pub_id = header.pub_id;
        let timestamp_ns = header.timestamp_ns;

        if buffer.len() < payload_len {
            self.last_seq = next;
            self.counters.truncated.fetch_add(1, Ordering::Relaxed);
            return Err(BusError::Truncated {
                needed: payload_len,
                have: buffer.len(),
            });
        }

        // Safety: `payload_len <= buffer.len()` just checked, and
        // `payload_len` cannot exceed this ring's slot payload capacity
        // because no publisher could have committed a larger one.
        unsafe { slot.read_payload(buffer, payload_len) };

        // Torn-read check: did a writer lap this slot while we were copying?
        fence(Ordering::Acquire);
        let reloaded = slot.header().seq.load(Ordering::Relaxed);
        if reloaded != observed_seq {
            self.counters.torn_read.fetch_add(1, Ordering::Relaxed);
            self.last_seq = descriptor.w_head.load(Ordering::Acquire);
            return Err(BusError::Empty);
        }

        self.last_seq = next;
        Ok(Received {
            len: payload_len,
            seq: next,
            pub_id,
            timestamp_ns,
        })
    }
}

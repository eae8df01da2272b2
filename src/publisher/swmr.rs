use super::{check_payload_fits, Publisher};
use crate::error::Result;
use crate::layout::monotonic_now_ns;
use crate::region::{Ring, RingType};
use std::sync::atomic::{fence, Ordering};

/// Single-writer/multi-reader publisher (§4.3).
///
/// Binding more than one `SwmrPublisher` to the same topic is a logic error
/// the type system does not prevent (the ring itself doesn't know how many
/// producers exist) — callers are expected to enforce "at most one writer"
/// at the topology level, same as the spec's SWMR contract.
pub struct SwmrPublisher {
    ring: Ring,
    pub_id: u16,
}

impl SwmrPublisher {
    pub fn new(ring: Ring, pub_id: u16) -> Self {
        debug_assert_eq!(ring.ring_type(), RingType::Swmr, "SwmrPublisher bound to a non-SWMR topic");
        Self { ring, pub_id }
    }
}

impl Publisher for SwmrPublisher {
    /// Reserve the next sequence and commit a message into its slot.
    ///
    /// The reservation itself (`fetch_add`) uses acquire-release ordering
    /// even though a single writer only needs monotonicity from it — the
    /// spec keeps this so a SWMR topic can coexist with out-of-band readers
    /// (debuggers, future multi-writer variants) without a memory-model
    /// surprise.
    fn publish(&self, payload: &[u8]) -> Result<u64> {
        check_payload_fits(payload, self.ring.payload_capacity())?;

        let descriptor = self.ring.descriptor();
        let old = descriptor.w_head.fetch_add(1, Ordering::AcqRel);
        let commit = old + 1;
        let index = (commit - 1) & self.ring.mask();

        let now = monotonic_now_ns();
        // Safety: `index < slot_count` by masking, `payload` was validated
        // against this ring's payload capacity above.
        unsafe {
            let slot = self.ring.slot(index);
            slot.write_payload(payload.len() as u32, self.pub_id, now, payload);
            fence(Ordering::Release);
            slot.header().seq.store(commit, Ordering::Release);
        }

        Ok(commit)
    }

    fn channel_id(&self) -> u16 {
        self.pub_id
    }

    fn topic(&self) -> &str {
        self.ring.name()
    }
}

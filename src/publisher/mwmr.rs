use super::{check_payload_fits, Publisher};
use crate::error::{BusError, Result};
use crate::layout::monotonic_now_ns;
use crate::region::{Ring, RingType};
use std::sync::atomic::{fence, Ordering};

/// Iterations of a cheap CPU-relax hint before falling back to an OS yield.
const SPIN_ITERATIONS: u32 = 10;

/// Upper bound on total safety-check retries before giving up with
/// `Timeout`. Exists solely to stop a livelock if a lagging writer died
/// mid-write (§4.4 step 3); healthy load never approaches it.
pub const DEFAULT_MAX_RETRIES: u32 = 100_000;

/// Multi-writer/multi-reader publisher (§4.4).
pub struct MwmrPublisher {
    ring: Ring,
    pub_id: u16,
    max_retries: u32,
}

impl MwmrPublisher {
    pub fn new(ring: Ring, pub_id: u16) -> Self {
        Self::with_max_retries(ring, pub_id, DEFAULT_MAX_RETRIES)
    }

    pub fn with_max_retries(ring: Ring, pub_id: u16, max_retries: u32) -> Self {
        debug_assert_eq!(ring.ring_type(), RingType::Mwmr, "MwmrPublisher bound to a non-MWMR topic");
        Self {
            ring,
            pub_id,
            max_retries,
        }
    }
}

impl Publisher for MwmrPublisher {
    fn publish(&self, payload: &[u8]) -> Result<u64> {
        check_payload_fits(payload, self.ring.payload_capacity())?;

        let descriptor = self.ring.descriptor();
        let commit = descriptor.w_head.fetch_add(1, Ordering::AcqRel) + 1;
        let index = (commit - 1) & self.ring.mask();
        let slot_count = self.ring.slot_count();

        // Safety: `index < slot_count` by masking.
        let slot = unsafe { self.ring.slot(index) };

        let mut iterations: u32 = 0;
        loop {
            let current = slot.header().seq.load(Ordering::Acquire);
            // Wrap-safe generation comparison (§4.4): a slot is safe to
            // overwrite if it has never been written, or if it belongs to a
            // strictly earlier lap through the ring than our reservation.
            // A naive `current >= commit - slot_count` check wraps
            // incorrectly near u64::MAX; comparing generations does not.
            let safe = current == 0 || current / slot_count < commit / slot_count;
            if safe {
                break;
            }

            if iterations >= self.max_retries {
                return Err(BusError::Timeout {
                    iterations: self.max_retries,
                });
            }
            if iterations < SPIN_ITERATIONS {
                std::hint::spin_loop();
            } else {
                std::thread::yield_now();
            }
            iterations += 1;
        }

        let now = monotonic_now_ns();
        // Safety: the safety-gate loop above established this slot carries
        // no data from our own or a later generation.
        unsafe {
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

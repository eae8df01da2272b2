//! Publish-side algorithms: SWMR (§4.3) and MWMR (§4.4).

mod mwmr;
mod swmr;

pub use mwmr::MwmrPublisher;
pub use swmr::SwmrPublisher;

use crate::error::{BusError, Result};

/// Shared surface both publisher kinds expose. The facade uses this to hand
/// callers a producer without caring which ring discipline backs the topic.
pub trait Publisher {
    /// Publish one message. Returns `Ok(commit_sequence)` on success.
    fn publish(&self, payload: &[u8]) -> Result<u64>;

    fn channel_id(&self) -> u16;

    fn topic(&self) -> &str;
}

/// Shared precondition for both publishers: validate *before* reserving a
/// sequence. §4.7: "the fetch-add must therefore occur AFTER size
/// validation" — the naive order (validate after reserving) leaks a
/// sequence on every oversized publish.
#[inline]
fn check_payload_fits(payload: &[u8], capacity: usize) -> Result<()> {
    if payload.len() > capacity {
        return Err(BusError::PayloadTooLarge {
            len: payload.len(),
            capacity,
        });
    }
    Ok(())
}

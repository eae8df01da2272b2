use std::sync::atomic::AtomicU64;

/// One per topic, cache-line aligned to keep `w_head` off any cache line a
/// reader's or neighbouring topic's writes could bounce.
///
/// `w_head` is the single point of contention for publishers: every publish
/// (SWMR and MWMR alike) reserves its sequence with one `fetch_add` against
/// this field before it ever touches a slot.
#[repr(C, align(64))]
pub struct RingDescriptor {
    pub slot_count: u32,
    pub slot_size: u32,
    pub base_offset: u64,
    /// Next-sequence-to-assign. Monotonically increasing; never decreases.
    pub w_head: AtomicU64,
    pub reserved: [u8; 32],
}

const _: () = assert!(std::mem::size_of::<RingDescriptor>() == 64);
const _: () = assert!(std::mem::align_of::<RingDescriptor>() == 64);

impl RingDescriptor {
    pub fn mask(&self) -> u64 {
        self.slot_count as u64 - 1
    }
}

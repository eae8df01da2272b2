//! Region layout: header, topic table, ring descriptors, slot arrays.
//!
//! This module (together with [`slot::SlotView`]) is the only place in the
//! crate that turns shared-memory offsets into typed pointers. Everything
//! else — publishers, subscribers, the facade — works through [`Ring`].

pub mod attach;
pub mod builder;
pub mod descriptor;
pub mod header;
pub mod slot;
pub mod topic;

pub use attach::Region;
pub use builder::BuildOutcome;
pub use descriptor::RingDescriptor;
pub use header::{RegionHeader, MAGIC, VERSION};
pub use slot::{SlotHeader, SlotView};
pub use topic::{RingType, TopicConfig, TopicEntry, MAX_TOPIC_NAME};

use crate::shm::SharedMemoryBackend;
use std::sync::Arc;

/// Owns the mapping itself. Dropped (and the mapping unmapped) only once
/// every `Ring`/`Region` clone referencing it has gone away.
pub(crate) struct MappedRegion {
    pub(crate) backend: Box<dyn SharedMemoryBackend>,
}

impl MappedRegion {
    #[inline]
    pub(crate) fn base(&self) -> *mut u8 {
        self.backend.as_ptr()
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.backend.size()
    }
}

// The mapping is read through atomics/typed views only; the raw pointer
// inside carries no thread-affinity of its own.
unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

/// A typed handle to one topic's ring inside a mapped region.
///
/// Cloning a `Ring` is cheap (an `Arc` bump) and keeps the mapping alive for
/// as long as any publisher or subscriber built from it is alive, even after
/// the `Region` handle that produced it is dropped.
#[derive(Clone)]
pub struct Ring {
    pub(crate) mapping: Arc<MappedRegion>,
    pub(crate) descriptor_offset: u64,
    pub(crate) slots_offset: u64,
    pub(crate) slot_count: u64,
    pub(crate) slot_size: u64,
    pub(crate) mask: u64,
    pub(crate) ring_type: RingType,
    pub(crate) name: String,
}

impl Ring {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ring_type(&self) -> RingType {
        self.ring_type
    }

    #[inline]
    pub fn slot_count(&self) -> u64 {
        self.slot_count
    }

    #[inline]
    pub(crate) fn mask(&self) -> u64 {
        self.mask
    }

    /// Usable payload bytes per slot.
    #[inline]
    pub fn payload_capacity(&self) -> usize {
        self.slot_size as usize - std::mem::size_of::<SlotHeader>()
    }

    #[inline]
    pub(crate) fn descriptor(&self) -> &RingDescriptor {
        // Safety: `descriptor_offset` was computed by `builder`/`attach`
        // against this same mapping and points at a live, cache-aligned
        // `RingDescriptor`.
        unsafe { &*(self.mapping.base().add(self.descriptor_offset as usize) as *const RingDescriptor) }
    }

    /// # Safety
    /// `index` must be `< slot_count`.
    #[inline]
    pub(crate) unsafe fn slot(&self, index: u64) -> SlotView {
        let offset = self.slots_offset + index * self.slot_size;
        SlotView::new(self.mapping.base().add(offset as usize))
    }
}

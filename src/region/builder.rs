use super::descriptor::RingDescriptor;
use super::header::{RegionHeader, MAGIC, VERSION};
use super::slot::SlotHeader;
use super::topic::{write_name, TopicConfig, TopicEntry};
use crate::error::{BusError, Result};
use crate::layout::align_up;
use crate::shm;
use std::collections::HashSet;

/// Minimum region size accepted by [`build`].
pub const MIN_REGION_SIZE: u64 = 4096;

/// Outcome of a [`build`] call.
#[derive(Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The region was freshly created and initialized by this call.
    Created,
    /// A region already existed at this path. Per the spec's Open Questions
    /// resolution, this is informational, not an error — concurrent
    /// attachers racing to create the same region rely on it.
    Exists,
}

/// Create (or recognize an existing) shared-memory region at `path`, laid
/// out for `topics` in a single pass (§4.1).
///
/// Never unlinks a pre-existing region: the builder that loses a create race
/// simply validates the winner's header and returns `Exists`.
pub fn build(path: &str, size: u64, topics: &[TopicConfig]) -> Result<BuildOutcome> {
    if path.is_empty() || size < MIN_REGION_SIZE || topics.is_empty() {
        return Err(BusError::InvalidArgs(format!(
            "path must be non-empty, size >= {MIN_REGION_SIZE}, and at least one topic must be configured"
        )));
    }
    validate_topics(topics)?;

    let (backend, created) = shm::create(path, size as usize)?;
    if !created {
        // Someone else won the race. Validate their header and bow out.
        let base = backend.as_ptr();
        let header = unsafe { &*(base as *const RegionHeader) };
        if !header.is_valid_magic() {
            return Err(BusError::InvalidArgs(
                "existing region at this path has an invalid header".into(),
            ));
        }
        if header.version != VERSION {
            return Err(BusError::InvalidArgs(format!(
                "existing region has unsupported version {}",
                header.version
            )));
        }
        return Ok(BuildOutcome::Exists);
    }

    let base = backend.as_ptr();
    let header_size = std::mem::size_of::<RegionHeader>() as u64;
    let entry_size = std::mem::size_of::<TopicEntry>() as u64;
    let desc_size = std::mem::size_of::<RingDescriptor>() as u64;

    let topic_table_offset = align_up(header_size, 64);
    let desc_array_offset = align_up(topic_table_offset + topics.len() as u64 * entry_size, 64);
    let mut cursor = align_up(desc_array_offset + topics.len() as u64 * desc_size, 64);

    for (i, cfg) in topics.iter().enumerate() {
        let slot_count = crate::layout::next_power_of_two(cfg.slot_count as u64);
        let slot_size = align_up(std::mem::size_of::<SlotHeader>() as u64 + cfg.payload_size as u64, 8);
        let footprint = slot_count * slot_size;
        let slots_offset = cursor;

        if slots_offset + footprint > size {
            drop_and_unlink(path);
            return Err(BusError::OutOfSpace {
                needed: slots_offset + footprint,
                have: size,
            });
        }

        // Write this topic's table entry.
        let entry_ptr = unsafe { base.add((topic_table_offset + i as u64 * entry_size) as usize) } as *mut TopicEntry;
        let ring_desc_offset = desc_array_offset + i as u64 * desc_size;
        unsafe {
            std::ptr::write(
                entry_ptr,
                TopicEntry {
                    name: write_name(&cfg.name),
                    ring_desc_offset,
                    slot_count: slot_count as u32,
                    slot_size: slot_size as u32,
                    ring_type: cfg.ring_type as u32,
                    _pad: [0; 12],
                },
            );
        }

        // Initialize this topic's ring descriptor.
        let desc_ptr = unsafe { base.add(ring_desc_offset as usize) } as *mut RingDescriptor;
        unsafe {
            std::ptr::write(
                desc_ptr,
                RingDescriptor {
                    slot_count: slot_count as u32,
                    slot_size: slot_size as u32,
                    base_offset: slots_offset,
                    w_head: std::sync::atomic::AtomicU64::new(0),
                    reserved: [0; 32],
                },
            );
        }

        // Zero every slot header's seq: "never written" until a publisher
        // commits a sequence into it.
        for k in 0..slot_count {
            let slot_ptr = unsafe { base.add((slots_offset + k * slot_size) as usize) };
            unsafe { super::slot::SlotView::new(slot_ptr).init() };
        }

        cursor = align_up(slots_offset + footprint, 64);
    }

    // Region header is written last: it is the single field `attach`
    // checks, so nothing below it may be observed as "ready" before this.
    let header_ptr = base as *mut RegionHeader;
    unsafe {
        std::ptr::write(
            header_ptr,
            RegionHeader {
                magic: MAGIC,
                version: VERSION,
                mmap_size: size,
                topic_table_offset,
                topic_count: topics.len() as u32,
                _pad: 0,
            },
        );
    }

    Ok(BuildOutcome::Created)
}

fn validate_topics(topics: &[TopicConfig]) -> Result<()> {
    let mut seen = HashSet::new();
    for cfg in topics {
        if cfg.slot_count < 1 {
            return Err(BusError::InvalidConfig(format!(
                "topic '{}': slot_count must be >= 1",
                cfg.name
            )));
        }
        if !seen.insert(cfg.name.as_str()) {
            return Err(BusError::InvalidConfig(format!(
                "duplicate topic name '{}'",
                cfg.name
            )));
        }
    }
    Ok(())
}

/// Best-effort cleanup when a partially-sized region can't fit its topics.
/// We created the object in this call, so it's ours to remove rather than
/// leave a permanently under-sized region at this path for the next caller.
fn drop_and_unlink(path: &str) {
    let _ = shm::unlink(path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::topic::RingType;

    #[test]
    fn rejects_empty_topic_list() {
        let err = build("/shmbus-test-empty", MIN_REGION_SIZE, &[]).unwrap_err();
        assert!(matches!(err, BusError::InvalidArgs(_)));
    }

    #[test]
    fn rejects_tiny_size() {
        let topics = vec![TopicConfig::new("t1", 8, 16, RingType::Swmr)];
        let err = build("/shmbus-test-tiny", 100, &topics).unwrap_err();
        assert!(matches!(err, BusError::InvalidArgs(_)));
    }

    #[test]
    fn rejects_duplicate_names() {
        let topics = vec![
            TopicConfig::new("t1", 8, 16, RingType::Swmr),
            TopicConfig::new("t1", 8, 16, RingType::Mwmr),
        ];
        let err = build("/shmbus-test-dup", MIN_REGION_SIZE, &topics).unwrap_err();
        assert!(matches!(err, BusError::InvalidConfig(_)));
    }
}

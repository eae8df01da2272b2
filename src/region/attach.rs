use super::header::{RegionHeader, MAGIC, VERSION};
use super::topic::{RingType, TopicEntry};
use super::{MappedRegion, Ring};
use crate::error::{BusError, Result};
use crate::shm;
use std::sync::Arc;

/// A handle to an attached region, good for looking up topics by name.
///
/// Attaching never mutates the region; `build` is the only writer of the
/// header, topic table, and (at creation time) ring descriptors.
#[derive(Clone)]
pub struct Region {
    mapping: Arc<MappedRegion>,
}

impl Region {
    /// Open an existing shared-memory region at `path` (§4.2).
    pub fn attach(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(BusError::InvalidArgs("path must be non-empty".into()));
        }
        let backend = shm::attach(path)?;
        let region = Self {
            mapping: Arc::new(MappedRegion { backend }),
        };
        region.validate_header()?;
        Ok(region)
    }

    fn validate_header(&self) -> Result<()> {
        let header = self.header();
        if !header.is_valid_magic() {
            return Err(BusError::InvalidArgs("region header magic mismatch".into()));
        }
        if header.version != VERSION {
            return Err(BusError::InvalidArgs(format!(
                "unsupported region layout version {}",
                header.version
            )));
        }
        if header.mmap_size as usize > self.mapping.size() {
            return Err(BusError::InvalidArgs(
                "region header claims more bytes than the mapped object has".into(),
            ));
        }
        Ok(())
    }

    fn header(&self) -> &RegionHeader {
        // Safety: the mapping is at least `size_of::<RegionHeader>()` bytes
        // (enforced by `build`'s MIN_REGION_SIZE) and the header is written
        // before any attacher can observe a valid magic.
        unsafe { &*(self.mapping.base() as *const RegionHeader) }
    }

    fn topic_table(&self) -> &[TopicEntry] {
        let header = self.header();
        let ptr = unsafe { self.mapping.base().add(header.topic_table_offset as usize) } as *const TopicEntry;
        // Safety: `build` wrote exactly `topic_count` contiguous entries
        // starting at `topic_table_offset`.
        unsafe { std::slice::from_raw_parts(ptr, header.topic_count as usize) }
    }

    /// Linear scan of the topic table — O(topic_count), which is small by
    /// construction (§4.2).
    pub fn lookup(&self, topic_name: &str) -> Result<Ring> {
        let entry = self
            .topic_table()
            .iter()
            .find(|e| e.name_str() == topic_name)
            .ok_or_else(|| BusError::InvalidArgs(format!("unknown topic '{topic_name}'")))?;

        let ring_type = entry
            .ring_type()
            .ok_or_else(|| BusError::InvalidArgs("topic entry has an unknown ring type".into()))?;

        Ok(self.ring_from_entry(entry, ring_type))
    }

    /// All configured topic names, in table order.
    pub fn topic_names(&self) -> Vec<String> {
        self.topic_table().iter().map(|e| e.name_str().to_string()).collect()
    }

    fn ring_from_entry(&self, entry: &TopicEntry, ring_type: RingType) -> Ring {
        let descriptor_offset = entry.ring_desc_offset;
        let descriptor = unsafe {
            &*(self.mapping.base().add(descriptor_offset as usize) as *const super::RingDescriptor)
        };
        Ring {
            mapping: self.mapping.clone(),
            descriptor_offset,
            slots_offset: descriptor.base_offset,
            slot_count: entry.slot_count as u64,
            slot_size: entry.slot_size as u64,
            mask: entry.mask(),
            ring_type,
            name: entry.name_str().to_string(),
        }
    }
}

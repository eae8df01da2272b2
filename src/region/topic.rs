use std::ffi::CStr;

/// Ring discipline for a topic: single-writer/multi-reader or
/// multi-writer/multi-reader.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RingType {
    Swmr = 0,
    Mwmr = 1,
}

impl RingType {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(RingType::Swmr),
            1 => Some(RingType::Mwmr),
            _ => None,
        }
    }
}

/// Longest topic name, excluding the NUL terminator.
pub const MAX_TOPIC_NAME: usize = 63;

/// One per configured topic, stored contiguously after the region header.
///
/// `name` is fixed-width so the table can be scanned by `attach` without any
/// indirection through a separate string heap — there is no allocator on the
/// shared-memory side.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct TopicEntry {
    pub name: [u8; 64],
    pub ring_desc_offset: u64,
    pub slot_count: u32,
    pub slot_size: u32,
    pub ring_type: u32,
    pub _pad: [u8; 12],
}

const _: () = assert!(std::mem::size_of::<TopicEntry>() == 96);

impl TopicEntry {
    pub fn name_str(&self) -> &str {
        // name is always NUL-terminated by construction (write_name truncates
        // and terminates); fall back to the full 64 bytes only if that
        // invariant was somehow violated by a foreign writer.
        CStr::from_bytes_until_nul(&self.name)
            .ok()
            .and_then(|c| c.to_str().ok())
            .unwrap_or("")
    }

    pub fn mask(&self) -> u64 {
        self.slot_count as u64 - 1
    }

    pub fn ring_type(&self) -> Option<RingType> {
        RingType::from_u32(self.ring_type)
    }
}

/// Truncate `name` to [`MAX_TOPIC_NAME`] bytes and NUL-terminate it into a
/// fixed 64-byte array, per §4.1's tie-break rule.
pub fn write_name(name: &str) -> [u8; 64] {
    let mut buf = [0u8; 64];
    let bytes = name.as_bytes();
    let len = bytes.len().min(MAX_TOPIC_NAME);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

/// Caller-supplied configuration for one topic, consumed by `region::build`.
#[derive(Clone, Debug)]
pub struct TopicConfig {
    pub name: String,
    pub slot_count: usize,
    pub payload_size: usize,
    pub ring_type: RingType,
}

impl TopicConfig {
    pub fn new(name: impl Into<String>, slot_count: usize, payload_size: usize, ring_type: RingType) -> Self {
        Self {
            name: name.into(),
            slot_count,
            payload_size,
            ring_type,
        }
    }
}

/// ASCII "USRL", little-endian: `0x5553524C`.
pub const MAGIC: u32 = 0x5553_524C;

/// Current region layout version. Bumped whenever the byte layout in this
/// module changes in a way that breaks existing attachers.
pub const VERSION: u32 = 1;

/// Fixed record at offset 0 of the mapped region.
///
/// Written exactly once, by the builder, as the last step of region
/// construction (§4.1 step 4) — everything before this point is invisible to
/// an attacher racing the builder, because `magic` is the field `attach`
/// validates first.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RegionHeader {
    pub magic: u32,
    pub version: u32,
    pub mmap_size: u64,
    pub topic_table_offset: u64,
    pub topic_count: u32,
    pub _pad: u32,
}

const _: () = assert!(std::mem::size_of::<RegionHeader>() == 32);

impl RegionHeader {
    pub fn is_valid_magic(&self) -> bool {
        self.magic == MAGIC
    }
}

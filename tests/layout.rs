// Layout conformance tests for ABI stability across languages attaching to
// the same region.
use memoffset::offset_of;
use shmbus::region::{RegionHeader, RingDescriptor, SlotHeader, TopicEntry};
use std::mem::{align_of, size_of};

#[test]
fn region_header_layout() {
    let size = size_of::<RegionHeader>();
    let align = align_of::<RegionHeader>();
    let off_magic = offset_of!(RegionHeader, magic);
    let off_version = offset_of!(RegionHeader, version);
    let off_mmap_size = offset_of!(RegionHeader, mmap_size);
    let off_topic_table_offset = offset_of!(RegionHeader, topic_table_offset);
    let off_topic_count = offset_of!(RegionHeader, topic_count);

    println!(
        "RegionHeader => size: {size}, align: {align}, offsets: [magic:{off_magic}, version:{off_version}, mmap_size:{off_mmap_size}, topic_table_offset:{off_topic_table_offset}, topic_count:{off_topic_count}]"
    );

    assert_eq!(size, 32);
    assert_eq!(align, align_of::<u64>());
    assert_eq!(off_magic, 0);
    assert_eq!(off_version, 4);
    assert_eq!(off_mmap_size, 8);
    assert_eq!(off_topic_table_offset, 16);
    assert_eq!(off_topic_count, 24);
}

#[test]
fn topic_entry_layout() {
    let size = size_of::<TopicEntry>();
    let off_name = offset_of!(TopicEntry, name);
    let off_ring_desc_offset = offset_of!(TopicEntry, ring_desc_offset);
    let off_slot_count = offset_of!(TopicEntry, slot_count);
    let off_slot_size = offset_of!(TopicEntry, slot_size);
    let off_ring_type = offset_of!(TopicEntry, ring_type);

    println!(
        "TopicEntry => size: {size}, offsets: [name:{off_name}, ring_desc_offset:{off_ring_desc_offset}, slot_count:{off_slot_count}, slot_size:{off_slot_size}, ring_type:{off_ring_type}]"
    );

    assert_eq!(size, 96);
    assert_eq!(off_name, 0);
    assert_eq!(off_ring_desc_offset, 64);
    assert_eq!(off_slot_count, 72);
    assert_eq!(off_slot_size, 76);
    assert_eq!(off_ring_type, 80);
}

#[test]
fn ring_descriptor_layout() {
    let size = size_of::<RingDescriptor>();
    let align = align_of::<RingDescriptor>();
    let off_slot_count = offset_of!(RingDescriptor, slot_count);
    let off_slot_size = offset_of!(RingDescriptor, slot_size);
    let off_base_offset = offset_of!(RingDescriptor, base_offset);
    let off_w_head = offset_of!(RingDescriptor, w_head);

    println!(
        "RingDescriptor => size: {size}, align: {align}, offsets: [slot_count:{off_slot_count}, slot_size:{off_slot_size}, base_offset:{off_base_offset}, w_head:{off_w_head}]"
    );

    assert_eq!(size, 64);
    assert_eq!(align, 64);
    assert_eq!(off_slot_count, 0);
    assert_eq!(off_slot_size, 4);
    assert_eq!(off_base_offset, 8);
    assert_eq!(off_w_head, 16);
}

#[test]
fn slot_header_layout() {
    let size = size_of::<SlotHeader>();
    let off_seq = offset_of!(SlotHeader, seq);
    let off_timestamp_ns = offset_of!(SlotHeader, timestamp_ns);
    let off_payload_len = offset_of!(SlotHeader, payload_len);
    let off_pub_id = offset_of!(SlotHeader, pub_id);

    println!(
        "SlotHeader => size: {size}, offsets: [seq:{off_seq}, timestamp_ns:{off_timestamp_ns}, payload_len:{off_payload_len}, pub_id:{off_pub_id}]"
    );

    assert_eq!(size, 24);
    assert_eq!(off_seq, 0);
    assert_eq!(off_timestamp_ns, 8);
    assert_eq!(off_payload_len, 16);
    assert_eq!(off_pub_id, 20);
}

//! Deterministic header statistics.
//!
//! Headers are modelled as a prefix plus one message per piece of
//! metadata. Link and attribute messages live in the header while a group
//! or object stays compact; past [`DENSE_THRESHOLD`] entries they move to a
//! dense index with a backing heap, which is what `meta_size` reports.

use vol_types::{
    AddressWidth, HeaderInfo, HeaderMessages, HeaderSpace, IndexHeapInfo, InfoFields, MetaSize,
    NativeInfo,
};

use crate::container::{LinkRecord, ObjectBody, ObjectHeader, StoredLink};

pub const HEADER_VERSION: u32 = 2;
pub const PREFIX_SIZE: u64 = 16;
pub const MESSAGE_OVERHEAD: u64 = 6;
pub const CHUNK_ALIGN: u64 = 64;
pub const DENSE_THRESHOLD: usize = 8;

/// Header flag: access/modification/change/birth times are stored.
pub const FLAG_STORE_TIMES: u32 = 0x20;
/// Header flag: link creation order is tracked.
pub const FLAG_TRACK_CORDER: u32 = 0x04;

const MSG_DATASPACE: u32 = 0x01;
const MSG_LINK_INFO: u32 = 0x02;
const MSG_DATATYPE: u32 = 0x03;
const MSG_LINK: u32 = 0x06;
const MSG_LAYOUT: u32 = 0x08;
const MSG_GROUP_INFO: u32 = 0x0a;
const MSG_ATTRIBUTE: u32 = 0x0c;
const MSG_COMMENT: u32 = 0x0d;
const MSG_MTIME: u32 = 0x12;
const MSG_ATTR_INFO: u32 = 0x15;

const INDEX_BASE: u64 = 16;
const INDEX_RECORD: u64 = 8;

fn width_bytes(width: AddressWidth) -> u64 {
    width.bytes() as u64
}

fn link_size(link: &LinkRecord, width: AddressWidth) -> u64 {
    let name = link.name.len() as u64;
    let target = match &link.target {
        StoredLink::Hard(_) => width_bytes(width),
        StoredLink::Soft(path) => 2 + path.len() as u64,
        StoredLink::External { file, path } => 3 + file.len() as u64 + path.len() as u64 + 2,
    };
    2 + name + target
}

fn messages(header: &ObjectHeader, width: AddressWidth) -> Vec<(u32, u64)> {
    let w = width_bytes(width);
    let mut msgs = Vec::new();
    match &header.body {
        ObjectBody::Group(group) => {
            msgs.push((MSG_LINK_INFO, 2 + 2 * w));
            msgs.push((MSG_GROUP_INFO, 2));
            if group.len() <= DENSE_THRESHOLD {
                msgs.extend(group.links().map(|l| (MSG_LINK, link_size(l, width))));
            }
        }
        ObjectBody::Dataset(_) => {
            msgs.push((MSG_DATASPACE, 16));
            msgs.push((MSG_DATATYPE, 8));
            msgs.push((MSG_LAYOUT, 4 + w + 8));
        }
        ObjectBody::Datatype(description) => {
            msgs.push((MSG_DATATYPE, 8 + description.len() as u64));
        }
    }
    if header.attrs.len() <= DENSE_THRESHOLD {
        msgs.extend(
            header
                .attrs
                .iter()
                .map(|a| (MSG_ATTRIBUTE, 8 + a.name.len() as u64 + 1 + a.data.len() as u64)),
        );
    } else {
        msgs.push((MSG_ATTR_INFO, 2 + 2 * w));
    }
    if let Some(comment) = &header.comment {
        msgs.push((MSG_COMMENT, comment.len() as u64 + 1));
    }
    msgs.push((MSG_MTIME, 8));
    msgs
}

/// Layout statistics of one object header.
pub fn header_info(header: &ObjectHeader, width: AddressWidth) -> HeaderInfo {
    let msgs = messages(header, width);
    let nmesgs = msgs.len() as u64;
    let mesg: u64 = msgs.iter().map(|&(_, size)| size).sum();
    let meta = PREFIX_SIZE + MESSAGE_OVERHEAD * nmesgs;
    let used = meta + mesg;
    let total = used.div_ceil(CHUNK_ALIGN) * CHUNK_ALIGN;
    let present = msgs.iter().fold(0u64, |acc, &(ty, _)| acc | (1 << ty));

    let mut flags = FLAG_STORE_TIMES;
    if header.as_group().is_some_and(|g| g.tracks_order()) {
        flags |= FLAG_TRACK_CORDER;
    }

    HeaderInfo {
        version: HEADER_VERSION,
        nmesgs: msgs.len() as u32,
        nchunks: 1,
        flags,
        space: HeaderSpace {
            total,
            meta,
            mesg,
            free: total - used,
        },
        mesg: HeaderMessages { present, shared: 0 },
    }
}

fn dense_index(entries: usize, heap_bytes: u64) -> IndexHeapInfo {
    if entries <= DENSE_THRESHOLD {
        return IndexHeapInfo::default();
    }
    IndexHeapInfo {
        index_size: INDEX_BASE + INDEX_RECORD * entries as u64,
        heap_size: heap_bytes,
    }
}

/// Storage used by dense link and attribute indexes.
pub fn meta_size(header: &ObjectHeader, width: AddressWidth) -> MetaSize {
    let obj = match header.as_group() {
        Some(group) => {
            let heap = group.links().map(|l| link_size(l, width)).sum();
            let mut info = dense_index(group.len(), heap);
            if group.tracks_order() && info.index_size > 0 {
                info.index_size += INDEX_BASE + INDEX_RECORD * group.len() as u64;
            }
            info
        }
        None => IndexHeapInfo::default(),
    };
    let attr_heap = header
        .attrs
        .iter()
        .map(|a| a.name.len() as u64 + a.data.len() as u64)
        .sum();
    MetaSize {
        obj,
        attr: dense_index(header.attrs.len(), attr_heap),
    }
}

/// Native info restricted to `fields`. Unselected parts stay zeroed.
pub fn native_info(header: &ObjectHeader, width: AddressWidth, fields: InfoFields) -> NativeInfo {
    let mut info = NativeInfo::default();
    if fields.contains(InfoFields::HDR) {
        info.hdr = header_info(header, width);
    }
    if fields.contains(InfoFields::META_SIZE) {
        info.meta_size = meta_size(header, width);
    }
    info
}

/// Bytes to reserve for a header and its raw data.
pub fn storage_size(header: &ObjectHeader, width: AddressWidth) -> u64 {
    let data = match &header.body {
        ObjectBody::Dataset(bytes) => bytes.len() as u64,
        _ => 0,
    };
    header_info(header, width).space.total + data
}

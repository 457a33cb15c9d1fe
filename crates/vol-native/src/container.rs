//! In-memory storage containers.
//!
//! A [`Container`] owns a flat map of object headers keyed by address, an
//! address allocator, and a blob heap. Groups hold their links in a name
//! index; creation order is recorded on every link but only reported for
//! groups that track it.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use vol_connector::{LinkKind, VolError, VolResult};
use vol_types::{Address, AddressWidth, HandleKind, IndexType, IterOrder, ObjectType};

use crate::header;

/// Shared reference to an open container.
pub type FileRef = Arc<RwLock<Container>>;

pub(crate) fn read(file: &FileRef) -> VolResult<RwLockReadGuard<'_, Container>> {
    file.read()
        .map_err(|e| VolError::Backend(format!("container lock poisoned: {e}")))
}

pub(crate) fn write(file: &FileRef) -> VolResult<RwLockWriteGuard<'_, Container>> {
    file.write()
        .map_err(|e| VolError::Backend(format!("container lock poisoned: {e}")))
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Where a link points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoredLink {
    Hard(Address),
    Soft(String),
    External { file: String, path: String },
}

impl StoredLink {
    pub fn kind(&self) -> LinkKind {
        match self {
            Self::Hard(_) => LinkKind::Hard,
            Self::Soft(_) => LinkKind::Soft,
            Self::External { .. } => LinkKind::External,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRecord {
    pub name: String,
    pub corder: i64,
    pub target: StoredLink,
}

/// Links of one group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupBody {
    links: BTreeMap<String, LinkRecord>,
    track_order: bool,
    next_corder: i64,
}

impl GroupBody {
    pub fn new(track_order: bool) -> Self {
        Self {
            links: BTreeMap::new(),
            track_order,
            next_corder: 0,
        }
    }

    pub fn tracks_order(&self) -> bool {
        self.track_order
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&LinkRecord> {
        self.links.get(name)
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkRecord> {
        self.links.values()
    }

    /// Links in traversal order.
    ///
    /// A creation-order request on a group that does not track creation
    /// order falls back to the name index. `Native` order is increasing.
    pub fn ordered(&self, idx_type: IndexType, order: IterOrder) -> Vec<&LinkRecord> {
        let mut links: Vec<&LinkRecord> = self.links.values().collect();
        if idx_type == IndexType::CreationOrder && self.track_order {
            links.sort_by_key(|l| l.corder);
        }
        if order == IterOrder::Decreasing {
            links.reverse();
        }
        links
    }

    /// The creation order reported for a link, if tracked.
    pub fn reported_corder(&self, record: &LinkRecord) -> Option<i64> {
        self.track_order.then_some(record.corder)
    }

    /// Addresses of every hard-link target, in name order.
    pub fn hard_targets(&self) -> Vec<Address> {
        self.links
            .values()
            .filter_map(|l| match l.target {
                StoredLink::Hard(addr) => Some(addr),
                _ => None,
            })
            .collect()
    }

    /// Rewrite hard-link targets found in `map`. Others are left alone.
    pub(crate) fn remap_hard(&mut self, map: &HashMap<Address, Address>) {
        for link in self.links.values_mut() {
            if let StoredLink::Hard(addr) = &mut link.target {
                if let Some(&new) = map.get(addr) {
                    *addr = new;
                }
            }
        }
    }

    fn insert(&mut self, name: &str, target: StoredLink) -> VolResult<()> {
        if self.links.contains_key(name) {
            return Err(VolError::AlreadyExists(format!("link '{name}'")));
        }
        let record = LinkRecord {
            name: name.to_string(),
            corder: self.next_corder,
            target,
        };
        self.next_corder += 1;
        self.links.insert(name.to_string(), record);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Option<LinkRecord> {
        self.links.remove(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectBody {
    Group(GroupBody),
    Dataset(Vec<u8>),
    Datatype(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeRecord {
    pub name: String,
    pub data: Vec<u8>,
}

/// One stored object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectHeader {
    pub body: ObjectBody,
    /// Hard links pointing here.
    pub rc: u32,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
    pub btime: i64,
    /// Attributes in creation order.
    pub attrs: Vec<AttributeRecord>,
    pub comment: Option<String>,
}

impl ObjectHeader {
    pub fn new(body: ObjectBody) -> Self {
        let t = now();
        Self {
            body,
            rc: 0,
            atime: t,
            mtime: t,
            ctime: t,
            btime: t,
            attrs: Vec::new(),
            comment: None,
        }
    }

    pub fn group(track_order: bool) -> Self {
        Self::new(ObjectBody::Group(GroupBody::new(track_order)))
    }

    pub fn obj_type(&self) -> ObjectType {
        match self.body {
            ObjectBody::Group(_) => ObjectType::Group,
            ObjectBody::Dataset(_) => ObjectType::Dataset,
            ObjectBody::Datatype(_) => ObjectType::NamedDatatype,
        }
    }

    pub fn handle_kind(&self) -> HandleKind {
        match self.body {
            ObjectBody::Group(_) => HandleKind::Group,
            ObjectBody::Dataset(_) => HandleKind::Dataset,
            ObjectBody::Datatype(_) => HandleKind::Datatype,
        }
    }

    pub fn as_group(&self) -> Option<&GroupBody> {
        match &self.body {
            ObjectBody::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&AttributeRecord> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// Record a modification.
    pub fn touch(&mut self) {
        let t = now();
        self.mtime = t;
        self.ctime = t;
    }
}

/// One storage container.
#[derive(Debug)]
pub struct Container {
    name: String,
    fileno: u64,
    width: AddressWidth,
    eoa: u64,
    root: Address,
    headers: BTreeMap<Address, ObjectHeader>,
    blobs: BTreeMap<Address, Vec<u8>>,
}

impl Container {
    /// Create a container with an empty root group at `base`.
    pub fn new(
        name: &str,
        fileno: u64,
        width: AddressWidth,
        base: u64,
        track_order: bool,
    ) -> VolResult<Self> {
        let mut container = Self {
            name: name.to_string(),
            fileno,
            width,
            eoa: base,
            root: Address::UNDEFINED,
            headers: BTreeMap::new(),
            blobs: BTreeMap::new(),
        };
        let mut root = ObjectHeader::group(track_order);
        // The root is reachable through the container itself.
        root.rc = 1;
        container.root = container.insert(root)?;
        Ok(container)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fileno(&self) -> u64 {
        self.fileno
    }

    pub fn width(&self) -> AddressWidth {
        self.width
    }

    /// End of allocated address space.
    pub fn eoa(&self) -> u64 {
        self.eoa
    }

    pub fn root(&self) -> Address {
        self.root
    }

    pub fn object_count(&self) -> usize {
        self.headers.len()
    }

    /// Reserve `size` bytes and return their start address.
    pub fn allocate(&mut self, size: u64) -> VolResult<Address> {
        let start = self.eoa;
        let last = start
            .checked_add(size.max(1) - 1)
            .filter(|&last| last <= self.width.max_address() && last != u64::MAX)
            .ok_or_else(|| {
                VolError::Backend(format!(
                    "container '{}' is full: {size} bytes at {start} exceed {}-byte addresses",
                    self.name, self.width
                ))
            })?;
        self.eoa = last + 1;
        Ok(Address::new(start))
    }

    /// Store a header at a freshly allocated address.
    pub fn insert(&mut self, header: ObjectHeader) -> VolResult<Address> {
        let addr = self.allocate(header::storage_size(&header, self.width))?;
        self.headers.insert(addr, header);
        Ok(addr)
    }

    /// Drop a header that never got linked.
    pub(crate) fn discard(&mut self, addr: Address) {
        self.headers.remove(&addr);
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.headers.contains_key(&addr)
    }

    pub fn header(&self, addr: Address) -> VolResult<&ObjectHeader> {
        self.headers
            .get(&addr)
            .ok_or_else(|| VolError::NotFound(format!("no object at address {addr} in '{}'", self.name)))
    }

    pub fn header_mut(&mut self, addr: Address) -> VolResult<&mut ObjectHeader> {
        let name = &self.name;
        self.headers
            .get_mut(&addr)
            .ok_or_else(|| VolError::NotFound(format!("no object at address {addr} in '{name}'")))
    }

    pub fn group(&self, addr: Address) -> VolResult<&GroupBody> {
        self.header(addr)?
            .as_group()
            .ok_or_else(|| VolError::bad_argument(format!("object at {addr} is not a group")))
    }

    pub(crate) fn group_mut(&mut self, addr: Address) -> VolResult<&mut GroupBody> {
        match &mut self.header_mut(addr)?.body {
            ObjectBody::Group(g) => Ok(g),
            _ => Err(VolError::bad_argument(format!("object at {addr} is not a group"))),
        }
    }

    /// Add a link named `name` to the group at `group`.
    pub fn link(&mut self, group: Address, name: &str, target: StoredLink) -> VolResult<()> {
        validate_link_name(name)?;
        if let StoredLink::Hard(addr) = target {
            // Fail before mutating anything if the target is missing.
            self.header(addr)?;
        }
        self.group_mut(group)?.insert(name, target.clone())?;
        if let StoredLink::Hard(addr) = target {
            self.header_mut(addr)?.rc += 1;
        }
        self.header_mut(group)?.touch();
        Ok(())
    }

    /// Remove a link. An object whose last hard link goes away is freed.
    pub fn unlink(&mut self, group: Address, name: &str) -> VolResult<LinkRecord> {
        let record = self
            .group_mut(group)?
            .remove(name)
            .ok_or_else(|| VolError::NotFound(format!("link '{name}'")))?;
        self.header_mut(group)?.touch();
        if let StoredLink::Hard(addr) = record.target {
            self.header(addr)?;
            self.release(addr);
        }
        Ok(record)
    }

    /// Drop one hard reference to `addr`. Freeing a group releases the
    /// objects its hard links point at in turn.
    fn release(&mut self, addr: Address) {
        let mut pending = vec![addr];
        while let Some(addr) = pending.pop() {
            let Some(header) = self.headers.get_mut(&addr) else {
                continue;
            };
            header.rc = header.rc.saturating_sub(1);
            if header.rc > 0 {
                continue;
            }
            if let Some(freed) = self.headers.remove(&addr) {
                if let Some(group) = freed.as_group() {
                    pending.extend(group.hard_targets());
                }
                tracing::trace!(container = %self.name, %addr, "freed object header");
            }
        }
    }

    pub fn blob_put(&mut self, data: &[u8]) -> VolResult<Address> {
        let addr = self.allocate(data.len() as u64)?;
        self.blobs.insert(addr, data.to_vec());
        Ok(addr)
    }

    pub fn blob_get(&self, addr: Address) -> VolResult<&[u8]> {
        self.blobs
            .get(&addr)
            .map(Vec::as_slice)
            .ok_or_else(|| VolError::NotFound(format!("no blob at address {addr}")))
    }

    pub fn blob_delete(&mut self, addr: Address) -> VolResult<()> {
        self.blobs
            .remove(&addr)
            .map(|_| ())
            .ok_or_else(|| VolError::NotFound(format!("no blob at address {addr}")))
    }
}

/// Link names are single path components.
pub fn validate_link_name(name: &str) -> VolResult<()> {
    if name.is_empty() || name == "." || name.contains('/') {
        return Err(VolError::bad_argument(format!("invalid link name '{name}'")));
    }
    Ok(())
}

//! Slot implementations for the native connector.
//!
//! Each method here backs one capability slot; `connector.rs` wires them
//! into the table. Methods take the connector object and location the
//! dispatcher resolved and never see handles.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use vol_connector::request::LinkTarget;
use vol_connector::{
    BlobId, BlobSpecific, GetRequest, GetResponse, LinkValue, Location, LocationParams, Opcode,
    OptionalArgs, OptionalRequest, OptionalResponse, PropertyList, SpecificRequest,
    SpecificResponse, VolError, VolResult,
};
use vol_token::{compare, TokenCodec};
use vol_types::{Address, AddressWidth, HandleKind, Token, TOKEN_SIZE};

use crate::container::{
    read, write, Container, FileRef, ObjectBody, ObjectHeader, StoredLink,
};
use crate::info::{native_info, object_info};
use crate::object::NativeObject;
use crate::opcode;
use crate::store::{split_parent, NativeStore};
use crate::visit::{iterate_links, link_info, visit};

fn unanswered_get(subsystem: &str, request: GetRequest) -> VolError {
    VolError::bad_argument(format!("{subsystem} get cannot answer {request:?}"))
}

fn unanswered_specific<O>(subsystem: &str, request: &SpecificRequest<'_, O>) -> VolError {
    VolError::bad_argument(format!(
        "{subsystem} specific cannot handle {}",
        request.name()
    ))
}

fn unknown_opcode(subsystem: &str, opcode: Opcode) -> VolError {
    VolError::bad_argument(format!("unknown {subsystem} {opcode}"))
}

/// Container and address of a stored (linked) object.
fn stored(obj: &NativeObject) -> VolResult<(&FileRef, Address)> {
    match obj {
        NativeObject::Object { file, addr } => Ok((file, *addr)),
        NativeObject::Transient { .. } => Err(VolError::NoContainer),
        other => Err(VolError::bad_argument(format!(
            "{other:?} is not a stored object"
        ))),
    }
}

fn attribute(obj: &NativeObject) -> VolResult<(&FileRef, Address, &str)> {
    match obj {
        NativeObject::Attribute { file, owner, name } => Ok((file, *owner, name.as_str())),
        other => Err(VolError::bad_argument(format!("{other:?} is not an attribute"))),
    }
}

fn new_link_name(params: &LocationParams) -> VolResult<(&str, &PropertyList)> {
    match &params.location {
        Location::ByName { name, lapl } => Ok((name.as_str(), lapl)),
        _ => Err(VolError::bad_argument("the new link must be given by name")),
    }
}

fn blob_id(width: AddressWidth, addr: Address, len: usize) -> BlobId {
    let token = TokenCodec::new(width).encode(addr);
    let mut bytes = token.as_bytes()[..width.bytes()].to_vec();
    bytes.extend_from_slice(&(len as u64).to_le_bytes());
    BlobId(bytes)
}

fn blob_addr(width: AddressWidth, id: &BlobId) -> VolResult<Address> {
    let w = width.bytes();
    if id.0.len() != w + 8 {
        return Err(VolError::bad_argument(format!(
            "blob id is {} bytes, expected {}",
            id.0.len(),
            w + 8
        )));
    }
    let mut raw = [0u8; TOKEN_SIZE];
    raw[..w].copy_from_slice(&id.0[..w]);
    Ok(TokenCodec::new(width).decode(&Token::from_bytes(raw)))
}

/// Headers reachable from `root` by hard links, root first.
fn collect_subtree(c: &Container, root: Address) -> VolResult<Vec<(Address, ObjectHeader)>> {
    let mut seen = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    let mut out = Vec::new();
    while let Some(addr) = queue.pop_front() {
        let header = c.header(addr)?.clone();
        if let Some(group) = header.as_group() {
            for child in group.hard_targets() {
                if seen.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        out.push((addr, header));
    }
    Ok(out)
}

/// Insert copies of `headers` and relink them among themselves.
fn insert_copies(
    c: &mut Container,
    headers: Vec<(Address, ObjectHeader)>,
) -> VolResult<HashMap<Address, Address>> {
    let mut map = HashMap::with_capacity(headers.len());
    for (old, mut header) in headers {
        header.rc = 0;
        match c.insert(header) {
            Ok(new) => {
                map.insert(old, new);
            }
            Err(err) => {
                for new in map.values() {
                    c.discard(*new);
                }
                return Err(err);
            }
        }
    }
    let mut targets = Vec::new();
    for &new in map.values() {
        if let ObjectBody::Group(group) = &mut c.header_mut(new)?.body {
            group.remap_hard(&map);
            targets.extend(group.hard_targets());
        }
    }
    for target in targets {
        c.header_mut(target)?.rc += 1;
    }
    Ok(map)
}

impl NativeStore {
    // ----------------------------------------------------------------
    // Shared helpers
    // ----------------------------------------------------------------

    fn create_object(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        name: &str,
        header: ObjectHeader,
    ) -> VolResult<NativeObject> {
        let (file, start) = self.locate(obj, params)?;
        let mut budget = self.link_budget(params.location.lapl());
        let (pfile, paddr, leaf) = self.resolve_parent(&file, start, name, &mut budget)?;
        let mut c = write(&pfile)?;
        let addr = c.insert(header)?;
        if let Err(err) = c.link(paddr, leaf, StoredLink::Hard(addr)) {
            c.discard(addr);
            return Err(err);
        }
        tracing::debug!(container = c.name(), name, %addr, "created object");
        drop(c);
        Ok(NativeObject::Object { file: pfile, addr })
    }

    fn open_object(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        name: &str,
        lapl: &PropertyList,
        expected: HandleKind,
    ) -> VolResult<NativeObject> {
        let (file, start) = self.locate(obj, params)?;
        let mut budget = self.link_budget(Some(lapl));
        let (tfile, addr) = self.resolve_path(&file, start, name, &mut budget)?;
        let kind = read(&tfile)?.header(addr)?.handle_kind();
        if kind != expected {
            return Err(VolError::bad_argument(format!(
                "'{name}' is a {kind}, not a {expected}"
            )));
        }
        Ok(NativeObject::Object { file: tfile, addr })
    }

    fn get_at(&self, file: &FileRef, addr: Address, request: GetRequest) -> VolResult<GetResponse> {
        let c = read(file)?;
        let header = c.header(addr)?;
        match request {
            GetRequest::Info(fields) => Ok(GetResponse::Info(object_info(&c, addr, fields)?)),
            GetRequest::ObjectType => Ok(GetResponse::ObjectType(header.obj_type())),
            GetRequest::Count => Ok(GetResponse::Count(match header.as_group() {
                Some(group) => group.len() as u64,
                None => header.attrs.len() as u64,
            })),
            GetRequest::FileNo => Ok(GetResponse::FileNo(c.fileno())),
            GetRequest::AddressWidth => Ok(GetResponse::AddressWidth(c.width())),
            GetRequest::Description => match &header.body {
                ObjectBody::Datatype(description) => {
                    Ok(GetResponse::Description(description.clone()))
                }
                _ => Err(unanswered_get("object", request)),
            },
            other => Err(unanswered_get("object", other)),
        }
    }

    fn link_exists(&self, file: &FileRef, start: Address, name: &str) -> VolResult<bool> {
        let (parent, leaf) = split_parent(name)?;
        let mut budget = self.link_budget(None);
        match self.resolve_path(file, start, parent, &mut budget) {
            Ok((pfile, paddr)) => {
                let c = read(&pfile)?;
                Ok(c.group(paddr).map(|g| g.get(leaf).is_some()).unwrap_or(false))
            }
            Err(VolError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn delete_link(&self, file: &FileRef, start: Address, name: &str) -> VolResult<()> {
        let mut budget = self.link_budget(None);
        let (pfile, paddr, leaf) = self.resolve_parent(file, start, name, &mut budget)?;
        write(&pfile)?.unlink(paddr, leaf)?;
        Ok(())
    }

    // ----------------------------------------------------------------
    // Files
    // ----------------------------------------------------------------

    pub(crate) fn file_create(
        &self,
        name: &str,
        fcpl: &PropertyList,
        _fapl: &PropertyList,
    ) -> VolResult<NativeObject> {
        let file = self.create(name, fcpl.address_width(), fcpl.track_creation_order())?;
        Ok(NativeObject::File(file))
    }

    pub(crate) fn file_open(&self, name: &str, _fapl: &PropertyList) -> VolResult<NativeObject> {
        Ok(NativeObject::File(self.open(name)?))
    }

    pub(crate) fn file_get(
        &self,
        obj: &NativeObject,
        _params: &LocationParams,
        request: GetRequest,
    ) -> VolResult<GetResponse> {
        let file = obj.require_file()?;
        match request {
            GetRequest::Name => Ok(GetResponse::Name(read(file)?.name().to_string())),
            GetRequest::FileNo | GetRequest::AddressWidth | GetRequest::Info(_) => {
                let root = read(file)?.root();
                self.get_at(file, root, request)
            }
            other => Err(unanswered_get("file", other)),
        }
    }

    pub(crate) fn file_specific(
        &self,
        obj: &NativeObject,
        _params: &LocationParams,
        request: SpecificRequest<'_, NativeObject>,
    ) -> VolResult<SpecificResponse> {
        match request {
            SpecificRequest::Flush => {
                obj.require_file()?;
                Ok(SpecificResponse::Done)
            }
            SpecificRequest::Exists { name } => Ok(SpecificResponse::Exists(self.exists(name)?)),
            other => Err(unanswered_specific("file", &other)),
        }
    }

    pub(crate) fn file_optional(
        &self,
        obj: &NativeObject,
        _params: &LocationParams,
        request: &OptionalRequest,
    ) -> VolResult<OptionalResponse> {
        let c = read(obj.require_file()?)?;
        match request.opcode {
            opcode::FILE_GET_EOA => Ok(OptionalResponse::Value(c.eoa())),
            opcode::FILE_GET_FILENO => Ok(OptionalResponse::Value(c.fileno())),
            other => Err(unknown_opcode("file", other)),
        }
    }

    pub(crate) fn file_close(&self, obj: &NativeObject) -> VolResult<()> {
        let c = read(obj.require_file()?)?;
        tracing::debug!(container = c.name(), "closed native container handle");
        Ok(())
    }

    // ----------------------------------------------------------------
    // Groups
    // ----------------------------------------------------------------

    pub(crate) fn group_create(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        name: &str,
        gcpl: &PropertyList,
    ) -> VolResult<NativeObject> {
        let track = gcpl
            .track_creation_order()
            .unwrap_or(self.config().track_creation_order);
        self.create_object(obj, params, name, ObjectHeader::group(track))
    }

    pub(crate) fn group_open(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        name: &str,
        lapl: &PropertyList,
    ) -> VolResult<NativeObject> {
        self.open_object(obj, params, name, lapl, HandleKind::Group)
    }

    pub(crate) fn group_get(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        request: GetRequest,
    ) -> VolResult<GetResponse> {
        let (file, addr) = self.locate(obj, params)?;
        self.get_at(&file, addr, request)
    }

    pub(crate) fn group_specific(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        request: SpecificRequest<'_, NativeObject>,
    ) -> VolResult<SpecificResponse> {
        let (file, addr) = self.locate(obj, params)?;
        match request {
            SpecificRequest::IterateLinks {
                idx_type,
                order,
                op,
            } => Ok(SpecificResponse::Status(iterate_links(
                &file, addr, idx_type, order, op,
            )?)),
            SpecificRequest::Exists { name } => {
                Ok(SpecificResponse::Exists(self.link_exists(&file, addr, name)?))
            }
            SpecificRequest::Delete { name } => {
                self.delete_link(&file, addr, name)?;
                Ok(SpecificResponse::Done)
            }
            SpecificRequest::Flush => Ok(SpecificResponse::Done),
            other => Err(unanswered_specific("group", &other)),
        }
    }

    pub(crate) fn group_optional(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        request: &OptionalRequest,
    ) -> VolResult<OptionalResponse> {
        let (file, addr) = self.locate(obj, params)?;
        match request.opcode {
            opcode::GROUP_GET_LINK_COUNT => {
                let count = read(&file)?.group(addr)?.len();
                Ok(OptionalResponse::Value(count as u64))
            }
            other => Err(unknown_opcode("group", other)),
        }
    }

    // ----------------------------------------------------------------
    // Datasets
    // ----------------------------------------------------------------

    pub(crate) fn dataset_create(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        name: &str,
        _lapl: &PropertyList,
    ) -> VolResult<NativeObject> {
        let header = ObjectHeader::new(ObjectBody::Dataset(Vec::new()));
        self.create_object(obj, params, name, header)
    }

    pub(crate) fn dataset_open(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        name: &str,
        lapl: &PropertyList,
    ) -> VolResult<NativeObject> {
        self.open_object(obj, params, name, lapl, HandleKind::Dataset)
    }

    pub(crate) fn dataset_read(&self, obj: &NativeObject) -> VolResult<Vec<u8>> {
        let (file, addr) = stored(obj)?;
        let c = read(file)?;
        match &c.header(addr)?.body {
            ObjectBody::Dataset(data) => Ok(data.clone()),
            _ => Err(VolError::bad_argument(format!("object at {addr} is not a dataset"))),
        }
    }

    pub(crate) fn dataset_write(&self, obj: &NativeObject, data: &[u8]) -> VolResult<()> {
        let (file, addr) = stored(obj)?;
        let mut c = write(file)?;
        let old_len = match &c.header(addr)?.body {
            ObjectBody::Dataset(old) => old.len(),
            _ => {
                return Err(VolError::bad_argument(format!(
                    "object at {addr} is not a dataset"
                )))
            }
        };
        if data.len() > old_len {
            c.allocate((data.len() - old_len) as u64)?;
        }
        let header = c.header_mut(addr)?;
        header.body = ObjectBody::Dataset(data.to_vec());
        header.touch();
        Ok(())
    }

    pub(crate) fn dataset_get(
        &self,
        obj: &NativeObject,
        _params: &LocationParams,
        request: GetRequest,
    ) -> VolResult<GetResponse> {
        let (file, addr) = stored(obj)?;
        self.get_at(file, addr, request)
    }

    pub(crate) fn dataset_specific(
        &self,
        obj: &NativeObject,
        _params: &LocationParams,
        request: SpecificRequest<'_, NativeObject>,
    ) -> VolResult<SpecificResponse> {
        stored(obj)?;
        match request {
            SpecificRequest::Flush => Ok(SpecificResponse::Done),
            other => Err(unanswered_specific("dataset", &other)),
        }
    }

    pub(crate) fn dataset_optional(
        &self,
        obj: &NativeObject,
        _params: &LocationParams,
        request: &OptionalRequest,
    ) -> VolResult<OptionalResponse> {
        match request.opcode {
            opcode::DATASET_GET_STORAGE_SIZE => {
                let size = self.dataset_read(obj)?.len();
                Ok(OptionalResponse::Value(size as u64))
            }
            other => Err(unknown_opcode("dataset", other)),
        }
    }

    // ----------------------------------------------------------------
    // Datatypes
    // ----------------------------------------------------------------

    pub(crate) fn datatype_commit(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        name: &str,
        transient: &NativeObject,
    ) -> VolResult<NativeObject> {
        let NativeObject::Transient { description } = transient else {
            return Err(VolError::bad_argument("datatype is already committed"));
        };
        let header = ObjectHeader::new(ObjectBody::Datatype(description.clone()));
        self.create_object(obj, params, name, header)
    }

    pub(crate) fn datatype_open(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        name: &str,
        lapl: &PropertyList,
    ) -> VolResult<NativeObject> {
        self.open_object(obj, params, name, lapl, HandleKind::Datatype)
    }

    pub(crate) fn datatype_get(
        &self,
        obj: &NativeObject,
        _params: &LocationParams,
        request: GetRequest,
    ) -> VolResult<GetResponse> {
        if let NativeObject::Transient { description } = obj {
            return match request {
                GetRequest::Description => Ok(GetResponse::Description(description.clone())),
                _ => Err(VolError::NoContainer),
            };
        }
        let (file, addr) = stored(obj)?;
        self.get_at(file, addr, request)
    }

    pub(crate) fn datatype_specific(
        &self,
        _obj: &NativeObject,
        _params: &LocationParams,
        request: SpecificRequest<'_, NativeObject>,
    ) -> VolResult<SpecificResponse> {
        match request {
            SpecificRequest::Flush => Ok(SpecificResponse::Done),
            other => Err(unanswered_specific("datatype", &other)),
        }
    }

    // ----------------------------------------------------------------
    // Attributes
    // ----------------------------------------------------------------

    pub(crate) fn attr_create(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        name: &str,
        _props: &PropertyList,
    ) -> VolResult<NativeObject> {
        let (file, owner) = self.locate(obj, params)?;
        {
            let mut c = write(&file)?;
            let header = c.header_mut(owner)?;
            if header.attr(name).is_some() {
                return Err(VolError::AlreadyExists(format!("attribute '{name}'")));
            }
            header.attrs.push(crate::container::AttributeRecord {
                name: name.to_string(),
                data: Vec::new(),
            });
            header.touch();
        }
        Ok(NativeObject::Attribute {
            file,
            owner,
            name: name.to_string(),
        })
    }

    pub(crate) fn attr_open(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        name: &str,
        _props: &PropertyList,
    ) -> VolResult<NativeObject> {
        let (file, owner) = self.locate(obj, params)?;
        if read(&file)?.header(owner)?.attr(name).is_none() {
            return Err(VolError::NotFound(format!("attribute '{name}'")));
        }
        Ok(NativeObject::Attribute {
            file,
            owner,
            name: name.to_string(),
        })
    }

    pub(crate) fn attr_read(&self, obj: &NativeObject) -> VolResult<Vec<u8>> {
        let (file, owner, name) = attribute(obj)?;
        let c = read(file)?;
        c.header(owner)?
            .attr(name)
            .map(|a| a.data.clone())
            .ok_or_else(|| VolError::NotFound(format!("attribute '{name}'")))
    }

    pub(crate) fn attr_write(&self, obj: &NativeObject, data: &[u8]) -> VolResult<()> {
        let (file, owner, name) = attribute(obj)?;
        let mut c = write(file)?;
        let header = c.header_mut(owner)?;
        let attr = header
            .attrs
            .iter_mut()
            .find(|a| a.name == name)
            .ok_or_else(|| VolError::NotFound(format!("attribute '{name}'")))?;
        attr.data = data.to_vec();
        header.touch();
        Ok(())
    }

    pub(crate) fn attr_get(
        &self,
        obj: &NativeObject,
        _params: &LocationParams,
        request: GetRequest,
    ) -> VolResult<GetResponse> {
        let (file, owner, name) = attribute(obj)?;
        match request {
            GetRequest::Name => Ok(GetResponse::Name(name.to_string())),
            other => self.get_at(file, owner, other),
        }
    }

    pub(crate) fn attr_specific(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        request: SpecificRequest<'_, NativeObject>,
    ) -> VolResult<SpecificResponse> {
        let (file, owner) = self.locate(obj, params)?;
        match request {
            SpecificRequest::Exists { name } => {
                let exists = read(&file)?.header(owner)?.attr(name).is_some();
                Ok(SpecificResponse::Exists(exists))
            }
            SpecificRequest::Delete { name } => {
                let mut c = write(&file)?;
                let header = c.header_mut(owner)?;
                let before = header.attrs.len();
                header.attrs.retain(|a| a.name != name);
                if header.attrs.len() == before {
                    return Err(VolError::NotFound(format!("attribute '{name}'")));
                }
                header.touch();
                Ok(SpecificResponse::Done)
            }
            other => Err(unanswered_specific("attribute", &other)),
        }
    }

    pub(crate) fn attr_optional(
        &self,
        obj: &NativeObject,
        _params: &LocationParams,
        request: &OptionalRequest,
    ) -> VolResult<OptionalResponse> {
        match request.opcode {
            opcode::ATTR_GET_DATA_SIZE => {
                let size = self.attr_read(obj)?.len();
                Ok(OptionalResponse::Value(size as u64))
            }
            other => Err(unknown_opcode("attribute", other)),
        }
    }

    // ----------------------------------------------------------------
    // Links
    // ----------------------------------------------------------------

    pub(crate) fn link_create(
        &self,
        target: LinkTarget<'_, NativeObject>,
        obj: &NativeObject,
        params: &LocationParams,
        _lcpl: &PropertyList,
    ) -> VolResult<()> {
        let (name, lapl) = new_link_name(params)?;
        let (file, start) = obj.position()?;
        let mut budget = self.link_budget(Some(lapl));
        let (pfile, paddr, leaf) = self.resolve_parent(&file, start, name, &mut budget)?;
        let stored = match target {
            LinkTarget::Hard { object, location } => {
                let (tfile, taddr) = self.locate(object, location)?;
                if !Arc::ptr_eq(&tfile, &pfile) {
                    return Err(VolError::bad_argument("hard links cannot span containers"));
                }
                StoredLink::Hard(taddr)
            }
            LinkTarget::Soft { path } => StoredLink::Soft(path.to_string()),
            LinkTarget::External { file, path } => StoredLink::External {
                file: file.to_string(),
                path: path.to_string(),
            },
        };
        let mut c = write(&pfile)?;
        c.link(paddr, leaf, stored)
    }

    pub(crate) fn link_copy(
        &self,
        src: &NativeObject,
        src_params: &LocationParams,
        dst: &NativeObject,
        dst_params: &LocationParams,
        _props: &PropertyList,
    ) -> VolResult<()> {
        self.transfer_link(src, src_params, dst, dst_params, false)
    }

    pub(crate) fn link_move(
        &self,
        src: &NativeObject,
        src_params: &LocationParams,
        dst: &NativeObject,
        dst_params: &LocationParams,
        _props: &PropertyList,
    ) -> VolResult<()> {
        self.transfer_link(src, src_params, dst, dst_params, true)
    }

    fn transfer_link(
        &self,
        src: &NativeObject,
        src_params: &LocationParams,
        dst: &NativeObject,
        dst_params: &LocationParams,
        remove_source: bool,
    ) -> VolResult<()> {
        let (sfile, sgroup, record) = self.locate_link(src, src_params)?;
        let (name, lapl) = new_link_name(dst_params)?;
        let (dfile, dstart) = dst.position()?;
        let mut budget = self.link_budget(Some(lapl));
        let (pfile, paddr, leaf) = self.resolve_parent(&dfile, dstart, name, &mut budget)?;
        if matches!(record.target, StoredLink::Hard(_)) && !Arc::ptr_eq(&sfile, &pfile) {
            return Err(VolError::bad_argument("hard links cannot span containers"));
        }
        write(&pfile)?.link(paddr, leaf, record.target.clone())?;
        if remove_source {
            write(&sfile)?.unlink(sgroup, &record.name)?;
        }
        Ok(())
    }

    pub(crate) fn link_get(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        request: GetRequest,
    ) -> VolResult<GetResponse> {
        let (file, group, record) = self.locate_link(obj, params)?;
        match request {
            GetRequest::LinkInfo => {
                let c = read(&file)?;
                let codec = TokenCodec::new(c.width());
                let corder = c.group(group)?.reported_corder(&record);
                Ok(GetResponse::LinkInfo(link_info(&record, &codec, corder)))
            }
            GetRequest::LinkValue => match record.target {
                StoredLink::Soft(path) => Ok(GetResponse::LinkValue(LinkValue::Soft(path))),
                StoredLink::External { file, path } => {
                    Ok(GetResponse::LinkValue(LinkValue::External { file, path }))
                }
                StoredLink::Hard(_) => Err(VolError::bad_argument(format!(
                    "hard link '{}' has no stored value",
                    record.name
                ))),
            },
            GetRequest::Name => Ok(GetResponse::Name(record.name)),
            other => Err(unanswered_get("link", other)),
        }
    }

    pub(crate) fn link_specific(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        request: SpecificRequest<'_, NativeObject>,
    ) -> VolResult<SpecificResponse> {
        let (file, start) = self.locate(obj, params)?;
        match request {
            SpecificRequest::Exists { name } => {
                Ok(SpecificResponse::Exists(self.link_exists(&file, start, name)?))
            }
            SpecificRequest::Delete { name } => {
                self.delete_link(&file, start, name)?;
                Ok(SpecificResponse::Done)
            }
            SpecificRequest::IterateLinks {
                idx_type,
                order,
                op,
            } => Ok(SpecificResponse::Status(iterate_links(
                &file, start, idx_type, order, op,
            )?)),
            other => Err(unanswered_specific("link", &other)),
        }
    }

    // ----------------------------------------------------------------
    // Generic objects
    // ----------------------------------------------------------------

    pub(crate) fn object_open(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
    ) -> VolResult<(NativeObject, HandleKind)> {
        let (file, addr) = self.locate(obj, params)?;
        let kind = read(&file)?.header(addr)?.handle_kind();
        Ok((NativeObject::Object { file, addr }, kind))
    }

    /// Close slot for groups, datasets, datatypes and attributes. Nothing
    /// is held open per handle.
    pub(crate) fn object_close(&self, obj: &NativeObject) -> VolResult<()> {
        tracing::trace!(?obj, "closed native object handle");
        Ok(())
    }

    pub(crate) fn object_copy(
        &self,
        src: &NativeObject,
        src_params: &LocationParams,
        dst: &NativeObject,
        dst_params: &LocationParams,
        _ocpypl: &PropertyList,
    ) -> VolResult<()> {
        let (sfile, saddr) = self.locate(src, src_params)?;
        let (name, lapl) = new_link_name(dst_params)?;
        let (dfile, dstart) = dst.position()?;
        let mut budget = self.link_budget(Some(lapl));
        let (pfile, paddr, leaf) = self.resolve_parent(&dfile, dstart, name, &mut budget)?;

        let snapshot = {
            let src = read(&sfile)?;
            collect_subtree(&src, saddr)?
        };
        let mut c = write(&pfile)?;
        if c.group(paddr)?.get(leaf).is_some() {
            return Err(VolError::AlreadyExists(format!("link '{leaf}'")));
        }
        let copied = snapshot.len();
        let map = insert_copies(&mut c, snapshot)?;
        let new_root = map
            .get(&saddr)
            .copied()
            .ok_or_else(|| VolError::backend("copied subtree lost its root"))?;
        c.link(paddr, leaf, StoredLink::Hard(new_root))?;
        tracing::debug!(container = c.name(), name, copied, "copied object");
        Ok(())
    }

    pub(crate) fn object_get(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        request: GetRequest,
    ) -> VolResult<GetResponse> {
        let (file, addr) = self.locate(obj, params)?;
        self.get_at(&file, addr, request)
    }

    pub(crate) fn object_specific(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        request: SpecificRequest<'_, NativeObject>,
    ) -> VolResult<SpecificResponse> {
        match request {
            SpecificRequest::Visit {
                idx_type,
                order,
                fields,
                op,
            } => {
                let (file, addr) = self.locate(obj, params)?;
                let status = visit(&file, addr, idx_type, order, fields, op)?;
                Ok(SpecificResponse::Status(status))
            }
            SpecificRequest::Exists { name } => {
                let (file, start) = self.locate(obj, params)?;
                let mut budget = self.link_budget(None);
                match self.resolve_path(&file, start, name, &mut budget) {
                    Ok(_) => Ok(SpecificResponse::Exists(true)),
                    Err(VolError::NotFound(_)) => Ok(SpecificResponse::Exists(false)),
                    Err(err) => Err(err),
                }
            }
            SpecificRequest::Flush => {
                self.locate(obj, params)?;
                Ok(SpecificResponse::Done)
            }
            other => Err(unanswered_specific("object", &other)),
        }
    }

    pub(crate) fn object_optional(
        &self,
        obj: &NativeObject,
        params: &LocationParams,
        request: &OptionalRequest,
    ) -> VolResult<OptionalResponse> {
        let (file, addr) = self.locate(obj, params)?;
        match (request.opcode, &request.args) {
            (opcode::OBJECT_GET_NATIVE_INFO, OptionalArgs::Fields(fields)) => {
                let c = read(&file)?;
                Ok(OptionalResponse::NativeInfo(native_info(&c, addr, *fields)?))
            }
            (opcode::OBJECT_GET_NATIVE_INFO, _) => Err(VolError::bad_argument(
                "native info query needs a field mask",
            )),
            (opcode::OBJECT_GET_COMMENT, _) => {
                let comment = read(&file)?.header(addr)?.comment.clone();
                Ok(OptionalResponse::Text(comment))
            }
            (opcode::OBJECT_SET_COMMENT, OptionalArgs::Text(text)) => {
                let mut c = write(&file)?;
                let header = c.header_mut(addr)?;
                header.comment = (!text.is_empty()).then(|| text.clone());
                header.touch();
                Ok(OptionalResponse::Done)
            }
            (opcode::OBJECT_SET_COMMENT, OptionalArgs::None) => {
                write(&file)?.header_mut(addr)?.comment = None;
                Ok(OptionalResponse::Done)
            }
            (other, _) => Err(unknown_opcode("object", other)),
        }
    }

    // ----------------------------------------------------------------
    // Blobs
    // ----------------------------------------------------------------

    pub(crate) fn blob_put(&self, obj: &NativeObject, data: &[u8]) -> VolResult<BlobId> {
        let mut c = write(obj.require_file()?)?;
        let addr = c.blob_put(data)?;
        Ok(blob_id(c.width(), addr, data.len()))
    }

    pub(crate) fn blob_get(&self, obj: &NativeObject, id: &BlobId) -> VolResult<Vec<u8>> {
        let c = read(obj.require_file()?)?;
        let addr = blob_addr(c.width(), id)?;
        Ok(c.blob_get(addr)?.to_vec())
    }

    pub(crate) fn blob_specific(
        &self,
        obj: &NativeObject,
        id: &BlobId,
        request: BlobSpecific,
    ) -> VolResult<SpecificResponse> {
        match request {
            BlobSpecific::IsNull => Ok(SpecificResponse::Exists(id.is_null())),
            BlobSpecific::Delete => {
                if !id.is_null() {
                    let mut c = write(obj.require_file()?)?;
                    let addr = blob_addr(c.width(), id)?;
                    c.blob_delete(addr)?;
                }
                Ok(SpecificResponse::Done)
            }
        }
    }

    // ----------------------------------------------------------------
    // Tokens
    // ----------------------------------------------------------------

    pub(crate) fn token_cmp(&self, _obj: &NativeObject, a: &Token, b: &Token) -> VolResult<Ordering> {
        Ok(compare(a, b))
    }

    pub(crate) fn token_to_str(
        &self,
        obj: &NativeObject,
        kind: HandleKind,
        token: &Token,
    ) -> VolResult<String> {
        let width = read(obj.require_file()?)?.width();
        tracing::trace!(%kind, %width, "token to string");
        Ok(TokenCodec::new(width).to_text(token))
    }

    pub(crate) fn token_from_str(
        &self,
        obj: &NativeObject,
        kind: HandleKind,
        text: &str,
    ) -> VolResult<Token> {
        let width = read(obj.require_file()?)?.width();
        tracing::trace!(%kind, %width, "token from string");
        Ok(TokenCodec::new(width).from_text(text)?)
    }
}

#[cfg(test)]
mod tests {
    use vol_types::{IndexType, InfoFields, IterOrder, ObjectType};

    use super::*;
    use crate::config::NativeConfig;

    fn store() -> NativeStore {
        NativeStore::new(NativeConfig::default())
    }

    fn file(s: &NativeStore, name: &str) -> NativeObject {
        s.file_create(name, &PropertyList::file_create(), &PropertyList::file_access())
            .unwrap()
    }

    fn here() -> LocationParams {
        LocationParams::by_self(HandleKind::File)
    }

    fn named(name: &str) -> LocationParams {
        LocationParams::new(Location::by_name(name), HandleKind::File)
    }

    fn lapl() -> PropertyList {
        PropertyList::link_access()
    }

    // ----------------------------------------------------------------
    // Object creation
    // ----------------------------------------------------------------

    #[test]
    fn nested_create_and_open() {
        let s = store();
        let f = file(&s, "a.h5");
        let g = s
            .group_create(&f, &here(), "g", &PropertyList::group_create())
            .unwrap();
        s.dataset_create(&g, &LocationParams::by_self(HandleKind::Group), "d", &lapl())
            .unwrap();
        let d = s.dataset_open(&f, &here(), "g/d", &lapl()).unwrap();
        s.dataset_write(&d, b"abc").unwrap();
        assert_eq!(s.dataset_read(&d).unwrap(), b"abc");
        assert!(s.group_open(&f, &here(), "g/d", &lapl()).is_err());
    }

    #[test]
    fn create_under_missing_parent_fails() {
        let s = store();
        let f = file(&s, "a.h5");
        let err = s
            .group_create(&f, &here(), "nope/g", &PropertyList::group_create())
            .unwrap_err();
        assert!(matches!(err, VolError::NotFound(_)));
    }

    #[test]
    fn commit_needs_transient_type() {
        let s = store();
        let f = file(&s, "t.h5");
        let t = NativeObject::transient("uint8");
        let committed = s.datatype_commit(&f, &here(), "byte", &t).unwrap();
        let desc = s
            .datatype_get(&committed, &here(), GetRequest::Description)
            .unwrap()
            .into_description()
            .unwrap();
        assert_eq!(desc, "uint8");
        assert!(s.datatype_commit(&f, &here(), "again", &committed).is_err());
    }

    // ----------------------------------------------------------------
    // Attributes and comments
    // ----------------------------------------------------------------

    #[test]
    fn attribute_lifecycle() {
        let s = store();
        let f = file(&s, "attr.h5");
        let a = s.attr_create(&f, &here(), "units", &lapl()).unwrap();
        s.attr_write(&a, b"metres").unwrap();
        assert_eq!(s.attr_read(&a).unwrap(), b"metres");
        assert!(s.attr_create(&f, &here(), "units", &lapl()).is_err());

        let exists = s
            .attr_specific(&f, &here(), SpecificRequest::Exists { name: "units" })
            .unwrap();
        assert_eq!(exists, SpecificResponse::Exists(true));
        s.attr_specific(&f, &here(), SpecificRequest::Delete { name: "units" })
            .unwrap();
        assert!(s.attr_read(&a).is_err());
    }

    #[test]
    fn comment_roundtrip() {
        let s = store();
        let f = file(&s, "c.h5");
        let set = OptionalRequest::new(
            opcode::OBJECT_SET_COMMENT,
            OptionalArgs::Text("root group".into()),
        );
        s.object_optional(&f, &here(), &set).unwrap();
        let got = s
            .object_optional(&f, &here(), &OptionalRequest::bare(opcode::OBJECT_GET_COMMENT))
            .unwrap();
        assert_eq!(got, OptionalResponse::Text(Some("root group".into())));
    }

    // ----------------------------------------------------------------
    // Links
    // ----------------------------------------------------------------

    #[test]
    fn soft_link_value_and_info() {
        let s = store();
        let f = file(&s, "l.h5");
        s.link_create(LinkTarget::Soft { path: "/x" }, &f, &named("s"), &lapl())
            .unwrap();
        let value = s
            .link_get(&f, &named("s"), GetRequest::LinkValue)
            .unwrap()
            .into_link_value()
            .unwrap();
        assert_eq!(value, LinkValue::Soft("/x".into()));
        let info = s
            .link_get(&f, &named("s"), GetRequest::LinkInfo)
            .unwrap()
            .into_link_info()
            .unwrap();
        assert_eq!(info.token, None);
        assert_eq!(info.value_size, 3);
    }

    #[test]
    fn hard_link_shares_object() {
        let s = store();
        let f = file(&s, "h.h5");
        s.group_create(&f, &here(), "g", &PropertyList::group_create())
            .unwrap();
        let target = named("g");
        s.link_create(
            LinkTarget::Hard {
                object: &f,
                location: &target,
            },
            &f,
            &named("alias"),
            &lapl(),
        )
        .unwrap();
        let info = s
            .object_get(&f, &named("alias"), GetRequest::Info(InfoFields::BASIC))
            .unwrap()
            .into_info()
            .unwrap();
        assert_eq!(info.rc, 2);
    }

    #[test]
    fn hard_link_across_containers_is_rejected() {
        let s = store();
        let a = file(&s, "a.h5");
        let b = file(&s, "b.h5");
        s.group_create(&a, &here(), "g", &PropertyList::group_create())
            .unwrap();
        let target = named("g");
        let err = s
            .link_create(
                LinkTarget::Hard {
                    object: &a,
                    location: &target,
                },
                &b,
                &named("g2"),
                &lapl(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("span containers"));
    }

    #[test]
    fn move_keeps_reference_count() {
        let s = store();
        let f = file(&s, "m.h5");
        s.group_create(&f, &here(), "g", &PropertyList::group_create())
            .unwrap();
        s.link_move(&f, &named("g"), &f, &named("h"), &lapl()).unwrap();
        let exists = |name| {
            s.link_specific(&f, &here(), SpecificRequest::Exists { name })
                .unwrap()
                .into_exists()
                .unwrap()
        };
        assert!(!exists("g"));
        assert!(exists("h"));
        let info = s
            .object_get(&f, &named("h"), GetRequest::Info(InfoFields::BASIC))
            .unwrap()
            .into_info()
            .unwrap();
        assert_eq!(info.rc, 1);
    }

    #[test]
    fn link_exists_with_missing_parent_is_false() {
        let s = store();
        let f = file(&s, "e.h5");
        let resp = s
            .link_specific(&f, &here(), SpecificRequest::Exists { name: "a/b/c" })
            .unwrap();
        assert_eq!(resp, SpecificResponse::Exists(false));
    }

    // ----------------------------------------------------------------
    // Object copy
    // ----------------------------------------------------------------

    #[test]
    fn copy_duplicates_subtree() {
        let s = store();
        let f = file(&s, "cp.h5");
        let g = s
            .group_create(&f, &here(), "g", &PropertyList::group_create())
            .unwrap();
        let d = s
            .dataset_create(&g, &LocationParams::by_self(HandleKind::Group), "d", &lapl())
            .unwrap();
        s.dataset_write(&d, b"xyz").unwrap();

        s.object_copy(&f, &named("g"), &f, &named("g_copy"), &PropertyList::object_copy())
            .unwrap();
        let copy = s.dataset_open(&f, &here(), "g_copy/d", &lapl()).unwrap();
        assert_eq!(s.dataset_read(&copy).unwrap(), b"xyz");

        s.dataset_write(&copy, b"changed").unwrap();
        assert_eq!(s.dataset_read(&d).unwrap(), b"xyz");

        let info = s
            .object_get(&f, &named("g_copy/d"), GetRequest::Info(InfoFields::BASIC))
            .unwrap()
            .into_info()
            .unwrap();
        assert_eq!(info.rc, 1);
        assert_eq!(info.obj_type, ObjectType::Dataset);
    }

    // ----------------------------------------------------------------
    // Optional opcodes, blobs, tokens
    // ----------------------------------------------------------------

    #[test]
    fn native_info_requires_fields() {
        let s = store();
        let f = file(&s, "n.h5");
        let bare = OptionalRequest::bare(opcode::OBJECT_GET_NATIVE_INFO);
        assert!(s.object_optional(&f, &here(), &bare).is_err());
        let req = OptionalRequest::new(
            opcode::OBJECT_GET_NATIVE_INFO,
            OptionalArgs::Fields(InfoFields::HDR),
        );
        let info = s
            .object_optional(&f, &here(), &req)
            .unwrap()
            .into_native_info()
            .unwrap();
        assert!(info.hdr.space.total > 0);
    }

    #[test]
    fn file_opcodes() {
        let s = store();
        let f = file(&s, "o.h5");
        let eoa = s
            .file_optional(&f, &here(), &OptionalRequest::bare(opcode::FILE_GET_EOA))
            .unwrap()
            .into_value()
            .unwrap();
        assert!(eoa > 96);
        assert!(s
            .file_optional(&f, &here(), &OptionalRequest::bare(Opcode(42)))
            .is_err());
    }

    #[test]
    fn blob_roundtrip() {
        let s = store();
        let f = file(&s, "b.h5");
        let id = s.blob_put(&f, b"blob").unwrap();
        assert_eq!(id.0.len(), 8 + 8);
        assert_eq!(s.blob_get(&f, &id).unwrap(), b"blob");
        s.blob_specific(&f, &id, BlobSpecific::Delete).unwrap();
        assert!(s.blob_get(&f, &id).is_err());
        assert_eq!(
            s.blob_specific(&f, &BlobId::default(), BlobSpecific::IsNull)
                .unwrap(),
            SpecificResponse::Exists(true)
        );
    }

    #[test]
    fn token_text_uses_container_width() {
        let s = store();
        let f = file(&s, "tok.h5");
        let token = s.token_from_str(&f, HandleKind::File, "4096").unwrap();
        assert_eq!(token.leading_address(), Address::new(4096));
        assert_eq!(s.token_to_str(&f, HandleKind::File, &token).unwrap(), "4096");
        assert!(s.token_from_str(&f, HandleKind::File, "12ab").is_err());
    }

    #[test]
    fn transient_tokens_have_no_container() {
        let s = store();
        let t = NativeObject::transient("u8");
        let err = s
            .token_to_str(&t, HandleKind::Datatype, &Token::zeroed())
            .unwrap_err();
        assert!(matches!(err, VolError::NoContainer));
    }

    #[test]
    fn iterate_through_group_specific() {
        let s = store();
        let f = file(&s, "it.h5");
        for name in ["b", "a"] {
            s.group_create(&f, &here(), name, &PropertyList::group_create())
                .unwrap();
        }
        let mut names = Vec::new();
        let mut op = |name: &str, _: &vol_connector::LinkInfo| {
            names.push(name.to_string());
            Ok::<_, VolError>(0)
        };
        s.group_specific(
            &f,
            &here(),
            SpecificRequest::IterateLinks {
                idx_type: IndexType::Name,
                order: IterOrder::Increasing,
                op: &mut op,
            },
        )
        .unwrap();
        assert_eq!(names, ["a", "b"]);
    }
}

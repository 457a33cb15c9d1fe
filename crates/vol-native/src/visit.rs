//! Recursive visitation and single-group link iteration.
//!
//! Visitation reports the starting object as `"."`, then walks hard links
//! depth-first in the requested index order. Each object is reported once,
//! under the first path that reaches it. Soft and external links are never
//! followed. No container lock is held while a callback runs.

use std::collections::HashSet;
use std::sync::Arc;

use vol_connector::request::{LinkIterFn, VisitFn};
use vol_connector::{LinkInfo, VolResult};
use vol_token::TokenCodec;
use vol_types::{Address, HandleKind, IndexType, InfoFields, IterOrder, ObjectInfo};

use crate::container::{read, FileRef, LinkRecord, StoredLink};
use crate::info::object_info;
use crate::object::NativeObject;

struct Walk<'f> {
    file: &'f FileRef,
    idx_type: IndexType,
    order: IterOrder,
    fields: InfoFields,
    visited: HashSet<Address>,
}

impl Walk<'_> {
    fn describe(&self, addr: Address) -> VolResult<(HandleKind, bool, ObjectInfo)> {
        let c = read(self.file)?;
        let h = c.header(addr)?;
        let info = object_info(&c, addr, self.fields)?;
        Ok((h.handle_kind(), h.as_group().is_some(), info))
    }

    fn report(
        &self,
        addr: Address,
        path: &str,
        op: &mut VisitFn<'_, NativeObject>,
    ) -> VolResult<(i32, bool)> {
        let (kind, is_group, info) = self.describe(addr)?;
        let obj = NativeObject::Object {
            file: Arc::clone(self.file),
            addr,
        };
        Ok((op(&obj, kind, path, &info)?, is_group))
    }

    fn group(
        &mut self,
        group: Address,
        prefix: &str,
        op: &mut VisitFn<'_, NativeObject>,
    ) -> VolResult<i32> {
        let children: Vec<(String, Address)> = {
            let c = read(self.file)?;
            c.group(group)?
                .ordered(self.idx_type, self.order)
                .into_iter()
                .filter_map(|l| match l.target {
                    StoredLink::Hard(addr) => Some((l.name.clone(), addr)),
                    _ => None,
                })
                .collect()
        };
        for (name, addr) in children {
            if !self.visited.insert(addr) {
                continue;
            }
            let path = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };
            let (status, is_group) = self.report(addr, &path, op)?;
            if status != 0 {
                return Ok(status);
            }
            if is_group {
                let status = self.group(addr, &path, op)?;
                if status != 0 {
                    return Ok(status);
                }
            }
        }
        Ok(0)
    }
}

/// Visit every object reachable from `start` by hard links.
///
/// Returns the first non-zero callback status, or zero when the walk
/// completes. Negative statuses are returned as-is for the caller to
/// classify; callback errors abort the walk.
pub fn visit(
    file: &FileRef,
    start: Address,
    idx_type: IndexType,
    order: IterOrder,
    fields: InfoFields,
    op: &mut VisitFn<'_, NativeObject>,
) -> VolResult<i32> {
    let fileno = read(file)?.fileno();
    tracing::debug!(fileno, %start, ?idx_type, ?order, "visit started");
    let mut walk = Walk {
        file,
        idx_type,
        order,
        fields,
        visited: HashSet::from([start]),
    };
    let (status, is_group) = walk.report(start, ".", op)?;
    let status = if status == 0 && is_group {
        walk.group(start, "", op)?
    } else {
        status
    };
    tracing::debug!(fileno, status, visited = walk.visited.len(), "visit finished");
    Ok(status)
}

/// Metadata for one stored link.
pub fn link_info(record: &LinkRecord, codec: &TokenCodec, corder: Option<i64>) -> LinkInfo {
    let (token, value_size) = match &record.target {
        StoredLink::Hard(addr) => (Some(codec.encode(*addr)), 0),
        StoredLink::Soft(path) => (None, path.len() + 1),
        StoredLink::External { file, path } => (None, file.len() + path.len() + 3),
    };
    LinkInfo {
        kind: record.target.kind(),
        token,
        corder,
        value_size,
    }
}

/// Call `op` for each link of one group, in order, without recursing.
pub fn iterate_links(
    file: &FileRef,
    group: Address,
    idx_type: IndexType,
    order: IterOrder,
    op: &mut LinkIterFn<'_>,
) -> VolResult<i32> {
    let links: Vec<(String, LinkInfo)> = {
        let c = read(file)?;
        let codec = TokenCodec::new(c.width());
        let g = c.group(group)?;
        g.ordered(idx_type, order)
            .into_iter()
            .map(|l| (l.name.clone(), link_info(l, &codec, g.reported_corder(l))))
            .collect()
    };
    for (name, info) in links {
        let status = op(&name, &info)?;
        if status != 0 {
            return Ok(status);
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use std::sync::RwLock;

    use vol_connector::LinkKind;
    use vol_types::AddressWidth;

    use super::*;
    use crate::container::{write, Container, ObjectBody, ObjectHeader};

    fn file(track: bool) -> FileRef {
        Arc::new(RwLock::new(
            Container::new("v.h5", 1, AddressWidth::EIGHT, 96, track).unwrap(),
        ))
    }

    fn add(file: &FileRef, parent: Address, name: &str, body: ObjectBody) -> Address {
        let mut c = write(file).unwrap();
        let addr = c.insert(ObjectHeader::new(body)).unwrap();
        c.link(parent, name, StoredLink::Hard(addr)).unwrap();
        addr
    }

    fn group(file: &FileRef, parent: Address, name: &str) -> Address {
        add(file, parent, name, ObjectBody::Group(Default::default()))
    }

    fn dataset(file: &FileRef, parent: Address, name: &str) -> Address {
        add(file, parent, name, ObjectBody::Dataset(Vec::new()))
    }

    fn root(file: &FileRef) -> Address {
        read(file).unwrap().root()
    }

    fn paths(file: &FileRef, idx: IndexType, order: IterOrder) -> Vec<String> {
        let mut seen = Vec::new();
        let mut op = |_: &NativeObject, _: HandleKind, path: &str, _: &ObjectInfo| {
            seen.push(path.to_string());
            Ok(0)
        };
        let status = visit(file, root(file), idx, order, InfoFields::BASIC, &mut op).unwrap();
        assert_eq!(status, 0);
        seen
    }

    // ----------------------------------------------------------------
    // Visitation
    // ----------------------------------------------------------------

    #[test]
    fn visits_depth_first_by_name() {
        let f = file(false);
        let r = root(&f);
        let b = group(&f, r, "b");
        dataset(&f, b, "x");
        dataset(&f, r, "a");
        assert_eq!(
            paths(&f, IndexType::Name, IterOrder::Increasing),
            [".", "a", "b", "b/x"]
        );
        assert_eq!(
            paths(&f, IndexType::Name, IterOrder::Decreasing),
            [".", "b", "b/x", "a"]
        );
    }

    #[test]
    fn shared_object_reported_once_under_first_path() {
        let f = file(false);
        let r = root(&f);
        let a = dataset(&f, r, "a");
        write(&f)
            .unwrap()
            .link(r, "b", StoredLink::Hard(a))
            .unwrap();
        write(&f)
            .unwrap()
            .link(r, "c", StoredLink::Soft("/a".into()))
            .unwrap();
        assert_eq!(paths(&f, IndexType::Name, IterOrder::Increasing), [".", "a"]);
        assert_eq!(paths(&f, IndexType::Name, IterOrder::Decreasing), [".", "b"]);
    }

    #[test]
    fn creation_order_falls_back_without_tracking() {
        let f = file(false);
        let r = root(&f);
        dataset(&f, r, "z");
        dataset(&f, r, "y");
        assert_eq!(
            paths(&f, IndexType::CreationOrder, IterOrder::Increasing),
            paths(&f, IndexType::Name, IterOrder::Increasing)
        );
    }

    #[test]
    fn creation_order_when_tracked() {
        let f = file(true);
        let r = root(&f);
        dataset(&f, r, "z");
        dataset(&f, r, "y");
        assert_eq!(
            paths(&f, IndexType::CreationOrder, IterOrder::Increasing),
            [".", "z", "y"]
        );
    }

    #[test]
    fn cycles_terminate() {
        let f = file(false);
        let r = root(&f);
        let g = group(&f, r, "g");
        write(&f)
            .unwrap()
            .link(g, "up", StoredLink::Hard(r))
            .unwrap();
        assert_eq!(paths(&f, IndexType::Name, IterOrder::Increasing), [".", "g"]);
    }

    #[test]
    fn positive_status_stops_early() {
        let f = file(false);
        let r = root(&f);
        dataset(&f, r, "a");
        dataset(&f, r, "b");
        let mut calls = 0;
        let mut op = |_: &NativeObject, _: HandleKind, path: &str, _: &ObjectInfo| {
            calls += 1;
            Ok(if path == "a" { 7 } else { 0 })
        };
        let status = visit(&f, r, IndexType::Name, IterOrder::Increasing, InfoFields::NONE, &mut op)
            .unwrap();
        assert_eq!(status, 7);
        assert_eq!(calls, 2);
    }

    #[test]
    fn negative_status_is_returned() {
        let f = file(false);
        let r = root(&f);
        let mut op = |_: &NativeObject, _: HandleKind, _: &str, _: &ObjectInfo| Ok(-1);
        let status = visit(&f, r, IndexType::Name, IterOrder::Native, InfoFields::NONE, &mut op)
            .unwrap();
        assert_eq!(status, -1);
    }

    #[test]
    fn only_requested_fields_are_filled() {
        let f = file(false);
        let r = root(&f);
        dataset(&f, r, "a");
        let mut infos = Vec::new();
        let mut op = |_: &NativeObject, _: HandleKind, _: &str, info: &ObjectInfo| {
            infos.push(*info);
            Ok(0)
        };
        visit(&f, r, IndexType::Name, IterOrder::Increasing, InfoFields::TIME, &mut op).unwrap();
        assert!(infos.iter().all(|i| i.rc == 0 && i.btime > 0));
    }

    // ----------------------------------------------------------------
    // Link iteration
    // ----------------------------------------------------------------

    #[test]
    fn iterate_reports_each_link() {
        let f = file(true);
        let r = root(&f);
        dataset(&f, r, "d");
        write(&f)
            .unwrap()
            .link(r, "s", StoredLink::Soft("/d".into()))
            .unwrap();
        let mut seen = Vec::new();
        let mut op = |name: &str, info: &LinkInfo| {
            seen.push((name.to_string(), info.kind, info.corder));
            Ok(0)
        };
        iterate_links(&f, r, IndexType::CreationOrder, IterOrder::Increasing, &mut op).unwrap();
        assert_eq!(
            seen,
            vec![
                ("d".to_string(), LinkKind::Hard, Some(0)),
                ("s".to_string(), LinkKind::Soft, Some(1)),
            ]
        );
    }
}

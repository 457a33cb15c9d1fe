//! Recursive visitation for both info generations.
//!
//! The connector's visit engine always runs in the current generation and
//! reports each object with its common info. [`VisitShim`] sits between the
//! engine and the caller: it issues a short-lived handle for the visited
//! object, fetches native info when the caller's mask asks for it, and
//! hands the caller whichever record shape it expects.
//!
//! Callbacks return `0` to continue, a positive value to stop with that
//! value as the result, or a negative value to fail the visit.

use vol_connector::location::{validate_common_fields, validate_name};
use vol_connector::{
    ConnectorId, Location, OptionalRequest, PropertyList, Resolved,
    SpecificRequest, Vol, VolError, VolResult,
};
use vol_types::{Handle, HandleKind, InfoFields, LegacyObjectInfo, NativeInfo, ObjectInfo};

use crate::api::{by_name, ObjectApi, Traversal};
use crate::objects::native_info_request;

/// Wraps a caller's callback for the visit engine.
struct VisitShim<'v, O, F> {
    vol: &'v Vol<O>,
    connector: ConnectorId,
    /// Native fields to fetch per object; empty for none.
    native: InfoFields,
    op: F,
}

impl<O, F> VisitShim<'_, O, F>
where
    O: Clone + Send + Sync + 'static,
    F: FnMut(Handle, &str, &ObjectInfo, Option<&NativeInfo>) -> i32,
{
    fn call(&mut self, object: &O, kind: HandleKind, name: &str, info: &ObjectInfo) -> VolResult<i32> {
        let guard = self
            .vol
            .handles()
            .register_scoped(kind, self.connector, object.clone())?;
        let native = if self.native.is_empty() {
            None
        } else {
            Some(self.native_info(guard.handle(), name)?)
        };
        Ok((self.op)(guard.handle(), name, info, native.as_ref()))
    }

    fn native_info(&self, handle: Handle, name: &str) -> VolResult<NativeInfo> {
        let request: OptionalRequest = native_info_request(self.native);
        self.vol
            .object_optional(handle, Location::BySelf, &request)
            .and_then(|reply| reply.into_native_info())
            .inspect_err(|err| {
                tracing::warn!(%handle, name, error = %err, "native info query failed during visit");
            })
    }
}

/// Run the engine from `resolved` and classify its terminating status.
fn run<O, F>(
    vol: &Vol<O>,
    resolved: &Resolved<'_, O>,
    traversal: Traversal,
    fields: InfoFields,
    op: F,
) -> VolResult<i32>
where
    O: Clone + Send + Sync + 'static,
    F: FnMut(Handle, &str, &ObjectInfo, Option<&NativeInfo>) -> i32,
{
    let mut shim = VisitShim {
        vol,
        connector: resolved.connector,
        native: fields.native(),
        op,
    };
    let mut engine =
        |object: &O, kind: HandleKind, name: &str, info: &ObjectInfo| shim.call(object, kind, name, info);
    let status = vol
        .object_specific_resolved(
            resolved,
            SpecificRequest::Visit {
                idx_type: traversal.idx_type,
                order: traversal.order,
                fields: fields.common(),
                op: &mut engine,
            },
        )?
        .into_status()?;
    if status < 0 {
        return Err(VolError::CallbackFailed(status));
    }
    Ok(status)
}

fn legacy<F>(mut op: F) -> impl FnMut(Handle, &str, &ObjectInfo, Option<&NativeInfo>) -> i32
where
    F: FnMut(Handle, &str, &LegacyObjectInfo) -> i32,
{
    move |handle, name, info, native| op(handle, name, &LegacyObjectInfo::from_parts(info, native))
}

fn current<F>(mut op: F) -> impl FnMut(Handle, &str, &ObjectInfo, Option<&NativeInfo>) -> i32
where
    F: FnMut(Handle, &str, &ObjectInfo) -> i32,
{
    move |handle, name, info, _| op(handle, name, info)
}

impl<O: Clone + Send + Sync + 'static> ObjectApi<'_, O> {
    fn visit_at<F>(
        &self,
        handle: Handle,
        location: Location,
        traversal: Traversal,
        fields: InfoFields,
        op: F,
    ) -> VolResult<i32>
    where
        F: FnMut(Handle, &str, &ObjectInfo, Option<&NativeInfo>) -> i32,
    {
        let resolved = self.vol.resolve(handle, location)?;
        tracing::debug!(
            %handle,
            location = ?resolved.params.location.kind(),
            ?traversal,
            fields = fields.bits(),
            "visit requested"
        );
        run(self.vol, &resolved, traversal, fields, op)
    }

    // ---- Current generation ----

    /// Visit every object reachable from `handle` by hard links.
    ///
    /// `fields` selects common fields only.
    pub fn visit<F>(
        &self,
        handle: Handle,
        traversal: Traversal,
        fields: InfoFields,
        op: F,
    ) -> VolResult<i32>
    where
        F: FnMut(Handle, &str, &ObjectInfo) -> i32,
    {
        traversal.validate()?;
        validate_common_fields(fields)?;
        self.visit_at(handle, Location::BySelf, traversal, fields, current(op))
    }

    pub fn visit_by_name<F>(
        &self,
        handle: Handle,
        name: &str,
        traversal: Traversal,
        fields: InfoFields,
        lapl: Option<&PropertyList>,
        op: F,
    ) -> VolResult<i32>
    where
        F: FnMut(Handle, &str, &ObjectInfo) -> i32,
    {
        validate_name(name, "name")?;
        traversal.validate()?;
        validate_common_fields(fields)?;
        self.visit_at(handle, by_name(name, lapl), traversal, fields, current(op))
    }

    // ---- Legacy generation ----

    /// Legacy visit with every field filled in.
    pub fn visit1<F>(&self, handle: Handle, traversal: Traversal, op: F) -> VolResult<i32>
    where
        F: FnMut(Handle, &str, &LegacyObjectInfo) -> i32,
    {
        traversal.validate()?;
        self.visit_at(handle, Location::BySelf, traversal, InfoFields::ALL, legacy(op))
    }

    pub fn visit_by_name1<F>(
        &self,
        handle: Handle,
        name: &str,
        traversal: Traversal,
        lapl: Option<&PropertyList>,
        op: F,
    ) -> VolResult<i32>
    where
        F: FnMut(Handle, &str, &LegacyObjectInfo) -> i32,
    {
        validate_name(name, "name")?;
        traversal.validate()?;
        self.visit_at(handle, by_name(name, lapl), traversal, InfoFields::ALL, legacy(op))
    }

    /// Legacy visit filling only the fields `fields` selects.
    ///
    /// Native sub-records are fetched only when `fields` includes a native
    /// field, and then with exactly those fields.
    pub fn visit2<F>(
        &self,
        handle: Handle,
        traversal: Traversal,
        fields: InfoFields,
        op: F,
    ) -> VolResult<i32>
    where
        F: FnMut(Handle, &str, &LegacyObjectInfo) -> i32,
    {
        traversal.validate()?;
        self.visit_at(handle, Location::BySelf, traversal, fields, legacy(op))
    }

    pub fn visit_by_name2<F>(
        &self,
        handle: Handle,
        name: &str,
        traversal: Traversal,
        fields: InfoFields,
        lapl: Option<&PropertyList>,
        op: F,
    ) -> VolResult<i32>
    where
        F: FnMut(Handle, &str, &LegacyObjectInfo) -> i32,
    {
        validate_name(name, "name")?;
        traversal.validate()?;
        self.visit_at(handle, by_name(name, lapl), traversal, fields, legacy(op))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vol_connector::{ConnectorValue, OptionalResponse};
    use vol_native::{NativeConfig, NativeConnector, NativeObject};
    use vol_types::{IndexType, IterOrder, ObjectType};

    use super::*;
    use crate::session::Session;

    fn session() -> (Session, Handle) {
        let session = Session::new(NativeConfig::default()).unwrap();
        let file = session
            .vol()
            .file_create(session.native(), "visit.h5", None, None)
            .unwrap();
        (session, file)
    }

    /// Root with a dataset `a`, a second hard link `b` to it, a soft link
    /// `c` to it, and a group `g` holding dataset `x`.
    fn shared_tree(session: &Session, file: Handle) {
        let vol = session.vol();
        vol.dataset_create(file, "a", None).unwrap();
        vol.link_create_hard(file, Location::by_name("a"), file, Location::by_name("b"))
            .unwrap();
        vol.link_create_soft("/a", file, Location::by_name("c"))
            .unwrap();
        let g = vol.group_create(file, "g", None).unwrap();
        vol.dataset_create(g, "x", None).unwrap();
    }

    fn legacy_paths(session: &Session, file: Handle, traversal: Traversal) -> Vec<String> {
        let mut paths = Vec::new();
        let status = session
            .api()
            .visit1(file, traversal, |_, name, _| {
                paths.push(name.to_string());
                0
            })
            .unwrap();
        assert_eq!(status, 0);
        paths
    }

    // ---- Traversal order ----

    #[test]
    fn shared_object_visited_once_via_first_hard_link() {
        let (session, file) = session();
        shared_tree(&session, file);
        assert_eq!(
            legacy_paths(&session, file, Traversal::by_name()),
            [".", "a", "g", "g/x"]
        );
        assert_eq!(
            legacy_paths(
                &session,
                file,
                Traversal::new(IndexType::Name, IterOrder::Decreasing)
            ),
            [".", "g", "g/x", "b"]
        );
    }

    #[test]
    fn creation_order_falls_back_to_name() {
        let (session, file) = session();
        let vol = session.vol();
        vol.group_create(file, "z", None).unwrap();
        vol.group_create(file, "m", None).unwrap();
        let by_corder = legacy_paths(
            &session,
            file,
            Traversal::new(IndexType::CreationOrder, IterOrder::Increasing),
        );
        assert_eq!(by_corder, legacy_paths(&session, file, Traversal::by_name()));
    }

    #[test]
    fn creation_order_used_when_tracked() {
        let session = Session::new(NativeConfig {
            track_creation_order: true,
            ..NativeConfig::default()
        })
        .unwrap();
        let file = session
            .vol()
            .file_create(session.native(), "corder.h5", None, None)
            .unwrap();
        session.vol().group_create(file, "z", None).unwrap();
        session.vol().group_create(file, "m", None).unwrap();
        let paths = legacy_paths(
            &session,
            file,
            Traversal::new(IndexType::CreationOrder, IterOrder::Increasing),
        );
        assert_eq!(paths, [".", "z", "m"]);
    }

    // ---- Status handling ----

    #[test]
    fn positive_status_stops_early() {
        let (session, file) = session();
        shared_tree(&session, file);
        let mut seen = 0;
        let status = session
            .api()
            .visit(file, Traversal::by_name(), InfoFields::BASIC, |_, _, _| {
                seen += 1;
                if seen == 2 {
                    7
                } else {
                    0
                }
            })
            .unwrap();
        assert_eq!(status, 7);
        assert_eq!(seen, 2);
    }

    #[test]
    fn negative_status_is_failure() {
        let (session, file) = session();
        let err = session
            .api()
            .visit(file, Traversal::by_name(), InfoFields::BASIC, |_, _, _| -1)
            .unwrap_err();
        assert!(matches!(err, VolError::CallbackFailed(-1)));
        assert_eq!(err.class(), vol_connector::ErrorClass::Traversal);
    }

    #[test]
    fn visit_handles_are_released() {
        let (session, file) = session();
        shared_tree(&session, file);
        let before = session.vol().handles().len();
        let mut kinds = Vec::new();
        session
            .api()
            .visit(file, Traversal::by_name(), InfoFields::BASIC, |h, _, info| {
                kinds.push((session.vol().handles().kind(h).unwrap(), info.obj_type));
                0
            })
            .unwrap();
        assert_eq!(session.vol().handles().len(), before);
        assert!(kinds.contains(&(HandleKind::Dataset, ObjectType::Dataset)));
        assert!(kinds.contains(&(HandleKind::Group, ObjectType::Group)));
    }

    // ---- Argument checks ----

    #[test]
    fn current_visit_rejects_native_fields() {
        let (session, file) = session();
        let err = session
            .api()
            .visit(file, Traversal::by_name(), InfoFields::HDR, |_, _, _| 0)
            .unwrap_err();
        assert!(matches!(err, VolError::BadArgument(_)));
    }

    #[test]
    fn visit_by_name_rejects_empty_name() {
        let (session, _) = session();
        let mut called = false;
        let err = session
            .api()
            .visit_by_name1(Handle::INVALID, "", Traversal::by_name(), None, |_, _, _| {
                called = true;
                0
            })
            .unwrap_err();
        assert!(matches!(err, VolError::BadArgument(_)));
        assert!(!called);
    }

    #[test]
    fn visit_by_name_starts_below_root() {
        let (session, file) = session();
        shared_tree(&session, file);
        let mut paths = Vec::new();
        session
            .api()
            .visit_by_name(file, "g", Traversal::by_name(), InfoFields::BASIC, None, |_, name, _| {
                paths.push(name.to_string());
                0
            })
            .unwrap();
        assert_eq!(paths, [".", "x"]);
    }

    // ---- Legacy translation ----

    #[test]
    fn native_section_filled_only_when_requested() {
        let (session, file) = session();
        shared_tree(&session, file);
        let api = session.api();

        let mut common_only = Vec::new();
        api.visit2(file, Traversal::by_name(), InfoFields::COMMON, |_, _, info| {
            common_only.push(*info);
            0
        })
        .unwrap();
        assert!(common_only
            .iter()
            .all(|info| info.native() == NativeInfo::default()));

        let mut full = Vec::new();
        api.visit_by_name2(file, ".", Traversal::by_name(), InfoFields::ALL, None, |_, _, info| {
            full.push(*info);
            0
        })
        .unwrap();
        assert!(full.iter().all(|info| info.hdr.version > 0));
        assert_eq!(full.len(), common_only.len());
    }

    #[test]
    fn legacy_address_matches_token() {
        let (session, file) = session();
        shared_tree(&session, file);
        let a = session
            .api()
            .get_info_by_name(file, "a", InfoFields::BASIC, None)
            .unwrap();
        let mut addr = None;
        session
            .api()
            .visit1(file, Traversal::by_name(), |_, name, info| {
                if name == "a" {
                    addr = Some(info.addr);
                }
                0
            })
            .unwrap();
        assert_eq!(addr, Some(a.token.leading_address()));
    }

    #[test]
    fn failed_native_query_aborts_before_callback() {
        let mut vol: Vol<NativeObject> = Vol::new();
        let mut class = NativeConnector::default().class();
        class.name = "flaky".into();
        class.value = ConnectorValue(42);
        class.table.object.optional = Some(Arc::new(
            |_: &NativeObject, _: &vol_connector::LocationParams, _: &OptionalRequest| {
                Err::<OptionalResponse, _>(VolError::backend("header unreadable"))
            },
        ));
        let id = vol.registry_mut().register(class).unwrap();
        let file = vol.file_create(id, "flaky.h5", None, None).unwrap();
        vol.group_create(file, "g", None).unwrap();

        let api = ObjectApi::new(&vol);
        let mut calls = 0;
        let err = api
            .visit1(file, Traversal::by_name(), |_, _, _| {
                calls += 1;
                0
            })
            .unwrap_err();
        assert!(matches!(err, VolError::Backend(_)));
        assert_eq!(calls, 0);

        let status = api
            .visit2(file, Traversal::by_name(), InfoFields::BASIC, |_, _, _| {
                calls += 1;
                0
            })
            .unwrap();
        assert_eq!(status, 0);
        assert_eq!(calls, 2);
    }
}

//! Current-generation object info queries.

use vol_connector::location::{validate_common_fields, validate_name};
use vol_connector::{
    GetRequest, Location, OptionalArgs, OptionalRequest, PropertyList, VolError, VolResult,
};
use vol_native::opcode;
use vol_types::{Handle, InfoFields, NativeInfo, ObjectInfo};

use crate::api::{by_index, by_name, ObjectApi, Traversal};

/// Reject masks that select anything but native-only fields.
fn validate_native_fields(fields: InfoFields) -> VolResult<()> {
    if !InfoFields::NATIVE.contains(fields) {
        return Err(VolError::bad_argument("invalid fields"));
    }
    Ok(())
}

pub(crate) fn native_info_request(fields: InfoFields) -> OptionalRequest {
    OptionalRequest::new(opcode::OBJECT_GET_NATIVE_INFO, OptionalArgs::Fields(fields))
}

impl<O: Clone + Send + Sync + 'static> ObjectApi<'_, O> {
    // ---- Common info ----

    /// Common info for the object behind `handle`.
    pub fn get_info(&self, handle: Handle, fields: InfoFields) -> VolResult<ObjectInfo> {
        validate_common_fields(fields)?;
        self.info_at(handle, Location::BySelf, fields)
    }

    /// Common info for the object `name` reaches from `handle`.
    pub fn get_info_by_name(
        &self,
        handle: Handle,
        name: &str,
        fields: InfoFields,
        lapl: Option<&PropertyList>,
    ) -> VolResult<ObjectInfo> {
        validate_name(name, "name")?;
        validate_common_fields(fields)?;
        self.info_at(handle, by_name(name, lapl), fields)
    }

    /// Common info for the `n`-th object linked from `group`.
    pub fn get_info_by_idx(
        &self,
        handle: Handle,
        group: &str,
        traversal: Traversal,
        n: u64,
        fields: InfoFields,
        lapl: Option<&PropertyList>,
    ) -> VolResult<ObjectInfo> {
        validate_name(group, "group name")?;
        traversal.validate()?;
        validate_common_fields(fields)?;
        self.info_at(handle, by_index(group, traversal, n, lapl), fields)
    }

    // ---- Native info ----

    pub fn get_native_info(&self, handle: Handle, fields: InfoFields) -> VolResult<NativeInfo> {
        validate_native_fields(fields)?;
        self.native_at(handle, Location::BySelf, fields)
    }

    pub fn get_native_info_by_name(
        &self,
        handle: Handle,
        name: &str,
        fields: InfoFields,
        lapl: Option<&PropertyList>,
    ) -> VolResult<NativeInfo> {
        validate_name(name, "name")?;
        validate_native_fields(fields)?;
        self.native_at(handle, by_name(name, lapl), fields)
    }

    pub fn get_native_info_by_idx(
        &self,
        handle: Handle,
        group: &str,
        traversal: Traversal,
        n: u64,
        fields: InfoFields,
        lapl: Option<&PropertyList>,
    ) -> VolResult<NativeInfo> {
        validate_name(group, "group name")?;
        traversal.validate()?;
        validate_native_fields(fields)?;
        self.native_at(handle, by_index(group, traversal, n, lapl), fields)
    }

    fn info_at(&self, handle: Handle, location: Location, fields: InfoFields) -> VolResult<ObjectInfo> {
        self.vol
            .object_get(handle, location, GetRequest::Info(fields))?
            .into_info()
    }

    fn native_at(
        &self,
        handle: Handle,
        location: Location,
        fields: InfoFields,
    ) -> VolResult<NativeInfo> {
        self.vol
            .object_optional(handle, location, &native_info_request(fields))?
            .into_native_info()
    }
}

#[cfg(test)]
mod tests {
    use vol_native::NativeConfig;
    use vol_types::{IndexType, IterOrder, ObjectType};

    use super::*;
    use crate::session::Session;

    fn session() -> (Session, Handle) {
        let session = Session::new(NativeConfig::default()).unwrap();
        let file = session
            .vol()
            .file_create(session.native(), "info.h5", None, None)
            .unwrap();
        (session, file)
    }

    // ---- Argument checks ----

    #[test]
    fn empty_name_fails_before_dispatch() {
        let (session, _) = session();
        let err = session
            .api()
            .get_info_by_name(Handle::INVALID, "", InfoFields::BASIC, None)
            .unwrap_err();
        assert!(matches!(err, VolError::BadArgument(_)));
    }

    #[test]
    fn native_fields_rejected_for_common_query() {
        let (session, file) = session();
        let err = session.api().get_info(file, InfoFields::ALL).unwrap_err();
        assert!(matches!(err, VolError::BadArgument(_)));
        let err = session
            .api()
            .get_native_info(file, InfoFields::BASIC)
            .unwrap_err();
        assert!(matches!(err, VolError::BadArgument(_)));
    }

    #[test]
    fn unknown_order_fails_before_identity_check() {
        let (session, _) = session();
        let err = session
            .api()
            .get_info_by_idx(
                Handle::INVALID,
                ".",
                Traversal::new(IndexType::Name, IterOrder::Unknown),
                0,
                InfoFields::BASIC,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, VolError::BadArgument(_)));
    }

    #[test]
    fn wrong_property_list_class_is_distinct() {
        let (session, file) = session();
        let fapl = PropertyList::file_access();
        let err = session
            .api()
            .get_info_by_name(file, "x", InfoFields::BASIC, Some(&fapl))
            .unwrap_err();
        assert!(matches!(err, VolError::PropertyList(_)));
    }

    // ---- Lookups ----

    #[test]
    fn by_idx_follows_index_order() {
        let (session, file) = session();
        let vol = session.vol();
        vol.group_create(file, "b", None).unwrap();
        vol.dataset_create(file, "a", None).unwrap();
        let api = session.api();
        let first = api
            .get_info_by_idx(file, ".", Traversal::by_name(), 0, InfoFields::BASIC, None)
            .unwrap();
        assert_eq!(first.obj_type, ObjectType::Dataset);
        let last = api
            .get_info_by_idx(
                file,
                ".",
                Traversal::new(IndexType::Name, IterOrder::Decreasing),
                1,
                InfoFields::BASIC,
                None,
            )
            .unwrap();
        assert_eq!(last.obj_type, ObjectType::Dataset);
    }

    #[test]
    fn fields_limit_what_is_filled() {
        let (session, file) = session();
        let info = session.api().get_info(file, InfoFields::NUM_ATTRS).unwrap();
        assert_eq!(info.rc, 0);
        assert_eq!(info.obj_type, ObjectType::Unknown);
        let info = session.api().get_info(file, InfoFields::BASIC).unwrap();
        assert_eq!(info.rc, 1);
        assert_eq!(info.obj_type, ObjectType::Group);
    }

    #[test]
    fn native_info_by_name() {
        let (session, file) = session();
        session.vol().group_create(file, "g", None).unwrap();
        let native = session
            .api()
            .get_native_info_by_name(file, "g", InfoFields::HDR, None)
            .unwrap();
        assert!(native.hdr.version > 0);
        assert_eq!(native.meta_size, Default::default());
    }
}

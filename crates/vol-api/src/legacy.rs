//! Legacy-generation object info.
//!
//! A legacy record is assembled from two queries: the common info, then the
//! native info when the mask asks for any native field. Both native
//! sub-records come from the same reply, so a record either has both or
//! neither.

use vol_connector::location::validate_name;
use vol_connector::{GetRequest, Location, PropertyList, Resolved, Vol, VolResult};
use vol_types::{Handle, InfoFields, LegacyObjectInfo, NativeInfo};

use crate::api::{by_index, by_name, ObjectApi, Traversal};
use crate::objects::native_info_request;

/// Native info for a resolved object, or `None` when `fields` selects no
/// native field.
pub(crate) fn native_part<O: Clone + Send + Sync + 'static>(
    vol: &Vol<O>,
    resolved: &Resolved<'_, O>,
    fields: InfoFields,
) -> VolResult<Option<NativeInfo>> {
    let native = fields.native();
    if native.is_empty() {
        return Ok(None);
    }
    let info = vol
        .object_optional_resolved(resolved, &native_info_request(native))
        .and_then(|reply| reply.into_native_info())
        .inspect_err(|err| {
            tracing::warn!(handle = %resolved.handle, error = %err, "native info query failed");
        })?;
    Ok(Some(info))
}

impl<O: Clone + Send + Sync + 'static> ObjectApi<'_, O> {
    pub fn get_info1(&self, handle: Handle) -> VolResult<LegacyObjectInfo> {
        self.legacy_info_at(handle, Location::BySelf, InfoFields::ALL)
    }

    pub fn get_info_by_name1(
        &self,
        handle: Handle,
        name: &str,
        lapl: Option<&PropertyList>,
    ) -> VolResult<LegacyObjectInfo> {
        validate_name(name, "name")?;
        self.legacy_info_at(handle, by_name(name, lapl), InfoFields::ALL)
    }

    pub fn get_info_by_idx1(
        &self,
        handle: Handle,
        group: &str,
        traversal: Traversal,
        n: u64,
        lapl: Option<&PropertyList>,
    ) -> VolResult<LegacyObjectInfo> {
        validate_name(group, "group name")?;
        traversal.validate()?;
        self.legacy_info_at(handle, by_index(group, traversal, n, lapl), InfoFields::ALL)
    }

    fn legacy_info_at(
        &self,
        handle: Handle,
        location: Location,
        fields: InfoFields,
    ) -> VolResult<LegacyObjectInfo> {
        let resolved = self.vol.resolve(handle, location)?;
        let info = self
            .vol
            .object_get_resolved(&resolved, GetRequest::Info(fields.common()))?
            .into_info()?;
        let native = native_part(self.vol, &resolved, fields)?;
        Ok(LegacyObjectInfo::from_parts(&info, native.as_ref()))
    }
}

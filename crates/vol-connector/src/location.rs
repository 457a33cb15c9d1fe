//! Location descriptors and the argument checks that precede resolution.
//!
//! A [`Location`] says how to reach the target object from a starting
//! handle: the handle itself, a path name, the n-th link of a group under
//! some index and order, or a token. Every check here runs before any
//! connector is asked to do anything, so a malformed request never costs a
//! backend call.

use vol_types::{HandleKind, IndexType, InfoFields, IterOrder, Token};

use crate::error::{VolError, VolResult};
use crate::props::PropertyList;

/// How to reach an object relative to a starting handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// The starting object itself.
    BySelf,
    /// Follow a path from the starting object.
    ByName { name: String, lapl: PropertyList },
    /// The `n`-th link of the group at `group`, under the given index and
    /// order.
    ByIndex {
        group: String,
        idx_type: IndexType,
        order: IterOrder,
        n: u64,
        lapl: PropertyList,
    },
    /// The object a token identifies within the starting object's container.
    ByToken { token: Token, lapl: PropertyList },
}

/// Discriminant of a [`Location`], for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocationKind {
    BySelf,
    ByName,
    ByIndex,
    ByToken,
}

impl Location {
    /// A by-name location with a default link-access list.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self::ByName {
            name: name.into(),
            lapl: PropertyList::link_access(),
        }
    }

    pub fn kind(&self) -> LocationKind {
        match self {
            Self::BySelf => LocationKind::BySelf,
            Self::ByName { .. } => LocationKind::ByName,
            Self::ByIndex { .. } => LocationKind::ByIndex,
            Self::ByToken { .. } => LocationKind::ByToken,
        }
    }

    /// The link-access list carried by the location, if any.
    pub fn lapl(&self) -> Option<&PropertyList> {
        match self {
            Self::BySelf => None,
            Self::ByName { lapl, .. } | Self::ByIndex { lapl, .. } | Self::ByToken { lapl, .. } => {
                Some(lapl)
            }
        }
    }

    /// Run the argument checks that do not need a handle.
    pub fn validate(&self) -> VolResult<()> {
        match self {
            Self::BySelf | Self::ByToken { .. } => Ok(()),
            Self::ByName { name, .. } => validate_name(name, "name"),
            Self::ByIndex {
                group,
                idx_type,
                order,
                ..
            } => {
                validate_name(group, "group name")?;
                validate_index(*idx_type, *order)
            }
        }
    }
}

/// A location bound to the kind of its starting object.
///
/// This is what connector slots receive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationParams {
    pub location: Location,
    pub obj_kind: HandleKind,
}

impl LocationParams {
    pub fn new(location: Location, obj_kind: HandleKind) -> Self {
        Self { location, obj_kind }
    }

    pub fn by_self(obj_kind: HandleKind) -> Self {
        Self::new(Location::BySelf, obj_kind)
    }
}

/// Reject an empty path or name.
pub fn validate_name(name: &str, what: &str) -> VolResult<()> {
    if name.is_empty() {
        return Err(VolError::BadArgument(format!("{what} parameter cannot be an empty string")));
    }
    Ok(())
}

/// Reject unknown or out-of-range index types and iteration orders.
pub fn validate_index(idx_type: IndexType, order: IterOrder) -> VolResult<()> {
    if !idx_type.is_known() {
        return Err(VolError::bad_argument("invalid index type specified"));
    }
    if !order.is_known() {
        return Err(VolError::bad_argument("invalid iteration order specified"));
    }
    Ok(())
}

/// Parse a raw field mask, rejecting bits outside [`InfoFields::ALL`].
pub fn validate_fields(bits: u32) -> VolResult<InfoFields> {
    InfoFields::from_bits(bits).map_err(|_| VolError::bad_argument("invalid fields"))
}

/// Check that `fields` selects only common fields.
///
/// Current-generation info queries never carry native fields; those have
/// their own query.
pub fn validate_common_fields(fields: InfoFields) -> VolResult<()> {
    if !InfoFields::COMMON.contains(fields) {
        return Err(VolError::bad_argument("invalid fields"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_bad_argument() {
        let err = Location::by_name("").validate().unwrap_err();
        assert!(matches!(err, VolError::BadArgument(_)));
        assert!(err.to_string().contains("empty string"));
    }

    #[test]
    fn unknown_index_type_is_bad_argument() {
        let loc = Location::ByIndex {
            group: "/".into(),
            idx_type: IndexType::Unknown,
            order: IterOrder::Increasing,
            n: 0,
            lapl: PropertyList::link_access(),
        };
        let err = loc.validate().unwrap_err();
        assert!(err.to_string().contains("index type"));
    }

    #[test]
    fn unknown_order_is_bad_argument() {
        let err = validate_index(IndexType::Name, IterOrder::Unknown).unwrap_err();
        assert!(err.to_string().contains("iteration order"));
    }

    #[test]
    fn fields_outside_all_are_rejected() {
        assert!(validate_fields(0x1f).is_ok());
        assert!(validate_fields(0x20).is_err());
    }

    #[test]
    fn common_fields_exclude_native() {
        assert!(validate_common_fields(InfoFields::COMMON).is_ok());
        assert!(validate_common_fields(InfoFields::BASIC | InfoFields::TIME).is_ok());
        assert!(validate_common_fields(InfoFields::HDR).is_err());
    }

    #[test]
    fn by_self_has_no_lapl() {
        assert!(Location::BySelf.lapl().is_none());
        assert!(Location::by_name("a").lapl().is_some());
        assert_eq!(Location::by_name("a").kind(), LocationKind::ByName);
    }
}

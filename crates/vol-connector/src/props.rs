//! Property lists passed to create, open, and access operations.

use serde::{Deserialize, Serialize};
use vol_types::AddressWidth;

use crate::error::{VolError, VolResult};

/// The class a property list was created for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyClass {
    LinkAccess,
    FileAccess,
    FileCreate,
    GroupCreate,
    ObjectCopy,
}

impl PropertyClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinkAccess => "link access",
            Self::FileAccess => "file access",
            Self::FileCreate => "file create",
            Self::GroupCreate => "group create",
            Self::ObjectCopy => "object copy",
        }
    }
}

/// A typed bag of optional settings.
///
/// Settings that do not apply to the list's class are ignored by
/// connectors. `None` means "use the connector default".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyList {
    class: PropertyClass,
    collective_metadata_reads: bool,
    max_soft_links: Option<usize>,
    address_width: Option<AddressWidth>,
    track_creation_order: Option<bool>,
}

impl PropertyList {
    pub fn new(class: PropertyClass) -> Self {
        Self {
            class,
            collective_metadata_reads: false,
            max_soft_links: None,
            address_width: None,
            track_creation_order: None,
        }
    }

    pub fn link_access() -> Self {
        Self::new(PropertyClass::LinkAccess)
    }

    pub fn file_access() -> Self {
        Self::new(PropertyClass::FileAccess)
    }

    pub fn file_create() -> Self {
        Self::new(PropertyClass::FileCreate)
    }

    pub fn group_create() -> Self {
        Self::new(PropertyClass::GroupCreate)
    }

    pub fn object_copy() -> Self {
        Self::new(PropertyClass::ObjectCopy)
    }

    /// Request collective metadata reads. Connectors without a parallel
    /// backend accept and ignore it.
    pub fn with_collective_metadata_reads(mut self, enabled: bool) -> Self {
        self.collective_metadata_reads = enabled;
        self
    }

    /// Limit on soft and external link hops during path resolution.
    pub fn with_max_soft_links(mut self, limit: usize) -> Self {
        self.max_soft_links = Some(limit);
        self
    }

    /// Address width of a new container.
    pub fn with_address_width(mut self, width: AddressWidth) -> Self {
        self.address_width = Some(width);
        self
    }

    /// Whether a new group keeps a creation-order link index.
    pub fn with_creation_order(mut self, track: bool) -> Self {
        self.track_creation_order = Some(track);
        self
    }

    pub fn class(&self) -> PropertyClass {
        self.class
    }

    pub fn collective_metadata_reads(&self) -> bool {
        self.collective_metadata_reads
    }

    pub fn max_soft_links(&self) -> Option<usize> {
        self.max_soft_links
    }

    pub fn address_width(&self) -> Option<AddressWidth> {
        self.address_width
    }

    pub fn track_creation_order(&self) -> Option<bool> {
        self.track_creation_order
    }

    /// Check that the list was created for `expected`.
    pub fn verify(&self, expected: PropertyClass) -> VolResult<()> {
        if self.class != expected {
            return Err(VolError::PropertyList(format!(
                "expected a {} property list, got {}",
                expected.as_str(),
                self.class.as_str()
            )));
        }
        Ok(())
    }

    /// Resolve an optional caller-supplied list into the one an operation
    /// runs with.
    ///
    /// A missing list becomes the default list of the expected class. A
    /// supplied list must be of that class.
    pub fn resolve(supplied: Option<&PropertyList>, expected: PropertyClass) -> VolResult<Self> {
        match supplied {
            None => Ok(Self::new(expected)),
            Some(list) => {
                list.verify(expected)?;
                Ok(list.clone())
            }
        }
    }
}

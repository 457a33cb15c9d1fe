use serde::{Deserialize, Serialize};
use vol_connector::location::validate_index;
use vol_connector::{Location, PropertyList, Vol, VolResult};
use vol_types::{IndexType, IterOrder};

/// Index and direction for by-index lookups and traversals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traversal {
    pub idx_type: IndexType,
    pub order: IterOrder,
}

impl Traversal {
    pub fn new(idx_type: IndexType, order: IterOrder) -> Self {
        Self { idx_type, order }
    }

    /// Increasing name order.
    pub fn by_name() -> Self {
        Self::new(IndexType::Name, IterOrder::Increasing)
    }

    pub fn validate(&self) -> VolResult<()> {
        validate_index(self.idx_type, self.order)
    }
}

impl Default for Traversal {
    fn default() -> Self {
        Self::by_name()
    }
}

/// Object-level entry points over a dispatcher.
///
/// Every entry point checks its own arguments before touching the
/// dispatcher, so a malformed call never reaches a connector.
pub struct ObjectApi<'v, O> {
    pub(crate) vol: &'v Vol<O>,
}

impl<'v, O: Clone + Send + Sync + 'static> ObjectApi<'v, O> {
    pub fn new(vol: &'v Vol<O>) -> Self {
        Self { vol }
    }

    pub fn vol(&self) -> &'v Vol<O> {
        self.vol
    }
}

pub(crate) fn by_name(name: &str, lapl: Option<&PropertyList>) -> Location {
    Location::ByName {
        name: name.to_string(),
        lapl: lapl.cloned().unwrap_or_else(PropertyList::link_access),
    }
}

pub(crate) fn by_index(
    group: &str,
    traversal: Traversal,
    n: u64,
    lapl: Option<&PropertyList>,
) -> Location {
    Location::ByIndex {
        group: group.to_string(),
        idx_type: traversal.idx_type,
        order: traversal.order,
        n,
        lapl: lapl.cloned().unwrap_or_else(PropertyList::link_access),
    }
}

#[cfg(test)]
mod tests {
    use vol_connector::VolError;

    use super::*;

    #[test]
    fn default_traversal_is_increasing_name() {
        let t = Traversal::default();
        assert_eq!(t.idx_type, IndexType::Name);
        assert_eq!(t.order, IterOrder::Increasing);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn unknown_index_or_order_is_rejected() {
        let bad_index = Traversal::new(IndexType::Unknown, IterOrder::Increasing);
        assert!(matches!(bad_index.validate(), Err(VolError::BadArgument(_))));
        let bad_order = Traversal::new(IndexType::Name, IterOrder::Unknown);
        assert!(matches!(bad_order.validate(), Err(VolError::BadArgument(_))));
    }

    #[test]
    fn missing_lapl_gets_default() {
        let loc = by_name("a/b", None);
        assert_eq!(loc.lapl(), Some(&PropertyList::link_access()));
    }
}

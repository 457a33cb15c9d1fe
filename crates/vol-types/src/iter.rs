//! Link index selection for iteration and visitation.

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Which link index a group is traversed by.
///
/// `Unknown` exists so raw values coming from callers can be represented and
/// rejected explicitly; it is never a valid traversal index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    Unknown,
    /// Lexical order of link names.
    Name,
    /// Order in which links were created. Only available on groups that
    /// track creation order; other groups fall back to [`IndexType::Name`].
    CreationOrder,
}

impl IndexType {
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Raw value: -1 for unknown, then 0, 1.
    pub fn raw(self) -> i32 {
        match self {
            Self::Unknown => -1,
            Self::Name => 0,
            Self::CreationOrder => 1,
        }
    }
}

impl TryFrom<i32> for IndexType {
    type Error = TypeError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(Self::Unknown),
            0 => Ok(Self::Name),
            1 => Ok(Self::CreationOrder),
            other => Err(TypeError::InvalidIndexType(other)),
        }
    }
}

/// Direction of traversal over an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IterOrder {
    Unknown,
    Increasing,
    Decreasing,
    /// Whatever order is cheapest for the backend.
    Native,
}

impl IterOrder {
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Raw value: -1 for unknown, then 0, 1, 2.
    pub fn raw(self) -> i32 {
        match self {
            Self::Unknown => -1,
            Self::Increasing => 0,
            Self::Decreasing => 1,
            Self::Native => 2,
        }
    }
}

impl TryFrom<i32> for IterOrder {
    type Error = TypeError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(Self::Unknown),
            0 => Ok(Self::Increasing),
            1 => Ok(Self::Decreasing),
            2 => Ok(Self::Native),
            other => Err(TypeError::InvalidIterOrder(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        for idx in [IndexType::Unknown, IndexType::Name, IndexType::CreationOrder] {
            assert_eq!(IndexType::try_from(idx.raw()).unwrap(), idx);
        }
        for order in [
            IterOrder::Unknown,
            IterOrder::Increasing,
            IterOrder::Decreasing,
            IterOrder::Native,
        ] {
            assert_eq!(IterOrder::try_from(order.raw()).unwrap(), order);
        }
    }

    #[test]
    fn out_of_range_values_rejected() {
        assert_eq!(IndexType::try_from(2), Err(TypeError::InvalidIndexType(2)));
        assert_eq!(IterOrder::try_from(-2), Err(TypeError::InvalidIterOrder(-2)));
    }

    #[test]
    fn unknown_is_not_known() {
        assert!(!IndexType::Unknown.is_known());
        assert!(!IterOrder::Unknown.is_known());
        assert!(IndexType::Name.is_known());
        assert!(IterOrder::Native.is_known());
    }
}

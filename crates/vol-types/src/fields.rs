use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Field-selection mask for object info queries.
///
/// The low three bits select the common fields that any connector can
/// report cheaply; `HDR` and `META_SIZE` select native-only fields that
/// need a dedicated backend query.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct InfoFields(u32);

impl InfoFields {
    pub const NONE: InfoFields = InfoFields(0);
    /// File number, token, object type, reference count.
    pub const BASIC: InfoFields = InfoFields(0x0001);
    /// Access, modification, change, and birth times.
    pub const TIME: InfoFields = InfoFields(0x0002);
    /// Number of attributes.
    pub const NUM_ATTRS: InfoFields = InfoFields(0x0004);
    /// Object header layout statistics.
    pub const HDR: InfoFields = InfoFields(0x0008);
    /// Index and heap sizes for links and attributes.
    pub const META_SIZE: InfoFields = InfoFields(0x0010);

    /// Every common field.
    pub const COMMON: InfoFields = InfoFields(0x0007);
    /// Every native-only field.
    pub const NATIVE: InfoFields = InfoFields(0x0018);
    /// Every defined field.
    pub const ALL: InfoFields = InfoFields(0x001f);

    /// Build a mask from raw bits, rejecting bits outside [`InfoFields::ALL`].
    pub fn from_bits(bits: u32) -> Result<Self, TypeError> {
        if bits & !Self::ALL.0 != 0 {
            return Err(TypeError::InvalidFields(bits));
        }
        Ok(Self(bits))
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub fn contains(self, other: InfoFields) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any bit of `other` is set in `self`.
    pub fn intersects(self, other: InfoFields) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The common-field subset of this mask.
    pub fn common(self) -> InfoFields {
        InfoFields(self.0 & Self::COMMON.0)
    }

    /// The native-only subset of this mask.
    pub fn native(self) -> InfoFields {
        InfoFields(self.0 & Self::NATIVE.0)
    }
}

impl BitOr for InfoFields {
    type Output = InfoFields;

    fn bitor(self, rhs: Self) -> Self::Output {
        InfoFields(self.0 | rhs.0)
    }
}

impl fmt::Debug for InfoFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(InfoFields, &str); 5] = [
            (InfoFields::BASIC, "BASIC"),
            (InfoFields::TIME, "TIME"),
            (InfoFields::NUM_ATTRS, "NUM_ATTRS"),
            (InfoFields::HDR, "HDR"),
            (InfoFields::META_SIZE, "META_SIZE"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "InfoFields({})", set.join("|"))
    }
}

impl TryFrom<u32> for InfoFields {
    type Error = TypeError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::from_bits(bits)
    }
}

impl From<InfoFields> for u32 {
    fn from(fields: InfoFields) -> Self {
        fields.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn all_is_union_of_parts() {
        assert_eq!(InfoFields::COMMON | InfoFields::NATIVE, InfoFields::ALL);
        assert_eq!(
            InfoFields::BASIC | InfoFields::TIME | InfoFields::NUM_ATTRS,
            InfoFields::COMMON
        );
    }

    #[test]
    fn from_bits_rejects_undefined_bits() {
        assert!(InfoFields::from_bits(0x1f).is_ok());
        assert_eq!(
            InfoFields::from_bits(0x20),
            Err(TypeError::InvalidFields(0x20))
        );
    }

    #[test]
    fn split_common_and_native() {
        let mask = InfoFields::BASIC | InfoFields::HDR;
        assert_eq!(mask.common(), InfoFields::BASIC);
        assert_eq!(mask.native(), InfoFields::HDR);
        assert!(mask.intersects(InfoFields::NATIVE));
        assert!(!mask.contains(InfoFields::NATIVE));
    }

    #[test]
    fn debug_lists_flags() {
        let mask = InfoFields::BASIC | InfoFields::META_SIZE;
        assert_eq!(format!("{mask:?}"), "InfoFields(BASIC|META_SIZE)");
    }

    proptest! {
        #[test]
        fn from_bits_accepts_exactly_subsets_of_all(bits in any::<u32>()) {
            let parsed = InfoFields::from_bits(bits);
            prop_assert_eq!(parsed.is_ok(), bits & !InfoFields::ALL.bits() == 0);
            if let Ok(mask) = parsed {
                prop_assert_eq!(mask.common() | mask.native(), mask);
            }
        }
    }
}

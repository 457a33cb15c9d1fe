use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A byte offset inside one storage container.
///
/// Addresses are only meaningful relative to the container that issued them.
/// [`Address::UNDEFINED`] (all ones) marks "no address".
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(u64);

impl Address {
    /// The undefined address.
    pub const UNDEFINED: Address = Address(u64::MAX);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `true` unless this is [`Address::UNDEFINED`].
    pub fn is_defined(self) -> bool {
        self != Self::UNDEFINED
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_defined() {
            write!(f, "Address({})", self.0)
        } else {
            f.write_str("Address(UNDEFINED)")
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Address {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// The number of bytes used to encode an [`Address`] inside a container.
///
/// Chosen once per container when it is created (its "size class") and
/// fixed for the container's lifetime. Common values are 4 and 8.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct AddressWidth(u8);

impl AddressWidth {
    /// Four-byte addresses (containers up to 4 GiB).
    pub const FOUR: AddressWidth = AddressWidth(4);
    /// Eight-byte addresses.
    pub const EIGHT: AddressWidth = AddressWidth(8);

    /// Smallest supported width in bytes.
    pub const MIN_BYTES: usize = 2;
    /// Largest supported width in bytes (the size of an in-memory address).
    pub const MAX_BYTES: usize = 8;

    /// Create a width, rejecting anything outside `2..=8` bytes.
    pub fn new(bytes: usize) -> Result<Self, TypeError> {
        if !(Self::MIN_BYTES..=Self::MAX_BYTES).contains(&bytes) {
            return Err(TypeError::InvalidAddressWidth(bytes));
        }
        Ok(Self(bytes as u8))
    }

    /// Width in bytes.
    pub fn bytes(self) -> usize {
        self.0 as usize
    }

    /// Largest address representable in this width.
    pub fn max_address(self) -> u64 {
        if self.bytes() >= Self::MAX_BYTES {
            u64::MAX
        } else {
            (1u64 << (8 * self.bytes())) - 1
        }
    }

    /// Returns `true` if `addr` survives encoding at this width unchanged.
    pub fn fits(self, addr: Address) -> bool {
        addr.get() <= self.max_address()
    }
}

impl fmt::Debug for AddressWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddressWidth({})", self.0)
    }
}

impl fmt::Display for AddressWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for AddressWidth {
    type Error = TypeError;

    fn try_from(bytes: usize) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl From<AddressWidth> for usize {
    fn from(width: AddressWidth) -> Self {
        width.bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_bounds() {
        assert!(AddressWidth::new(1).is_err());
        assert!(AddressWidth::new(9).is_err());
        assert_eq!(AddressWidth::new(4).unwrap(), AddressWidth::FOUR);
        assert_eq!(AddressWidth::new(8).unwrap().bytes(), 8);
    }

    #[test]
    fn max_address_per_width() {
        assert_eq!(AddressWidth::new(2).unwrap().max_address(), 0xffff);
        assert_eq!(AddressWidth::FOUR.max_address(), 0xffff_ffff);
        assert_eq!(AddressWidth::EIGHT.max_address(), u64::MAX);
    }

    #[test]
    fn fits_checks_range() {
        assert!(AddressWidth::FOUR.fits(Address::new(0xffff_ffff)));
        assert!(!AddressWidth::FOUR.fits(Address::new(0x1_0000_0000)));
        assert!(AddressWidth::EIGHT.fits(Address::UNDEFINED));
    }

    #[test]
    fn undefined_address() {
        assert!(!Address::UNDEFINED.is_defined());
        assert!(Address::new(0).is_defined());
        assert_eq!(format!("{:?}", Address::UNDEFINED), "Address(UNDEFINED)");
    }

    #[test]
    fn width_serde_rejects_out_of_range() {
        let w: AddressWidth = serde_json::from_str("4").unwrap();
        assert_eq!(w, AddressWidth::FOUR);
        assert!(serde_json::from_str::<AddressWidth>("12").is_err());
        assert_eq!(serde_json::to_string(&AddressWidth::EIGHT).unwrap(), "8");
    }
}

//! Optional opcodes the native connector understands.
//!
//! Opcodes are scoped by subsystem, so the same number can mean different
//! things for files and objects.

use vol_connector::{Opcode, Subsystem};

/// Native info for an object, restricted to a field mask.
pub const OBJECT_GET_NATIVE_INFO: Opcode = Opcode(0);
pub const OBJECT_GET_COMMENT: Opcode = Opcode(1);
pub const OBJECT_SET_COMMENT: Opcode = Opcode(2);

/// End of allocated address space.
pub const FILE_GET_EOA: Opcode = Opcode(0);
pub const FILE_GET_FILENO: Opcode = Opcode(1);

pub const DATASET_GET_STORAGE_SIZE: Opcode = Opcode(0);

pub const GROUP_GET_LINK_COUNT: Opcode = Opcode(0);

pub const ATTR_GET_DATA_SIZE: Opcode = Opcode(0);

/// Whether the native connector implements `opcode` for `subsystem`.
pub fn supports(subsystem: Subsystem, opcode: Opcode) -> bool {
    match subsystem {
        Subsystem::Object => matches!(
            opcode,
            OBJECT_GET_NATIVE_INFO | OBJECT_GET_COMMENT | OBJECT_SET_COMMENT
        ),
        Subsystem::File => matches!(opcode, FILE_GET_EOA | FILE_GET_FILENO),
        Subsystem::Dataset => opcode == DATASET_GET_STORAGE_SIZE,
        Subsystem::Group => opcode == GROUP_GET_LINK_COUNT,
        Subsystem::Attribute => opcode == ATTR_GET_DATA_SIZE,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_info_is_an_object_opcode() {
        assert!(supports(Subsystem::Object, OBJECT_GET_NATIVE_INFO));
        assert!(!supports(Subsystem::Object, Opcode(99)));
    }

    #[test]
    fn unset_subsystems_support_nothing() {
        assert!(!supports(Subsystem::Link, Opcode(0)));
        assert!(!supports(Subsystem::Datatype, Opcode(0)));
        assert!(!supports(Subsystem::Blob, Opcode(0)));
    }
}

//! Object info derivation.

use vol_connector::VolResult;
use vol_token::TokenCodec;
use vol_types::{Address, InfoFields, NativeInfo, ObjectInfo};

use crate::container::Container;
use crate::header;

/// Common info for the object at `addr`, filling only the selected fields.
pub fn object_info(c: &Container, addr: Address, fields: InfoFields) -> VolResult<ObjectInfo> {
    let h = c.header(addr)?;
    let mut info = ObjectInfo::default();
    if fields.contains(InfoFields::BASIC) {
        info.fileno = c.fileno();
        info.token = TokenCodec::new(c.width()).encode(addr);
        info.obj_type = h.obj_type();
        info.rc = h.rc;
    }
    if fields.contains(InfoFields::TIME) {
        info.atime = h.atime;
        info.mtime = h.mtime;
        info.ctime = h.ctime;
        info.btime = h.btime;
    }
    if fields.contains(InfoFields::NUM_ATTRS) {
        info.num_attrs = h.attrs.len() as u64;
    }
    Ok(info)
}

/// Native info for the object at `addr`, filling only the selected fields.
pub fn native_info(c: &Container, addr: Address, fields: InfoFields) -> VolResult<NativeInfo> {
    let h = c.header(addr)?;
    Ok(header::native_info(h, c.width(), fields))
}

#[cfg(test)]
mod tests {
    use vol_types::{AddressWidth, ObjectType};

    use super::*;
    use crate::container::{AttributeRecord, ObjectBody, ObjectHeader, StoredLink};

    fn setup() -> (Container, Address) {
        let mut c = Container::new("i.h5", 7, AddressWidth::FOUR, 96, false).unwrap();
        let mut h = ObjectHeader::new(ObjectBody::Dataset(vec![9; 4]));
        h.attrs.push(AttributeRecord {
            name: "units".into(),
            data: b"m".to_vec(),
        });
        let addr = c.insert(h).unwrap();
        let root = c.root();
        c.link(root, "d", StoredLink::Hard(addr)).unwrap();
        (c, addr)
    }

    #[test]
    fn basic_fields() {
        let (c, addr) = setup();
        let info = object_info(&c, addr, InfoFields::BASIC).unwrap();
        assert_eq!(info.fileno, 7);
        assert_eq!(info.obj_type, ObjectType::Dataset);
        assert_eq!(info.rc, 1);
        assert_eq!(info.token.leading_address(), addr);
        assert_eq!(info.num_attrs, 0);
        assert_eq!(info.btime, 0);
    }

    #[test]
    fn all_common_fields() {
        let (c, addr) = setup();
        let info = object_info(&c, addr, InfoFields::COMMON).unwrap();
        assert_eq!(info.num_attrs, 1);
        assert!(info.btime > 0);
    }

    #[test]
    fn missing_object_fails() {
        let (c, _) = setup();
        assert!(object_info(&c, Address::new(3), InfoFields::BASIC).is_err());
        assert!(native_info(&c, Address::new(3), InfoFields::HDR).is_err());
    }
}

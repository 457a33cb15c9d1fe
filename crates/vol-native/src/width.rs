//! Address width lookup and address/token conversion for any handle.

use vol_connector::{Vol, VolError, VolResult};
use vol_token::TokenCodec;
use vol_types::{Address, AddressWidth, Handle, HandleKind, Token};

use crate::container::read;
use crate::object::NativeObject;

/// Address width of the container a handle belongs to.
///
/// Works for the container handle itself and for any object inside it.
/// Map handles are rejected as unsupported; transient datatypes have no
/// container.
pub fn file_address_width(vol: &Vol<NativeObject>, handle: Handle) -> VolResult<AddressWidth> {
    let (entry, class) = vol.entry(handle)?;
    match entry.kind {
        HandleKind::Map => {
            return Err(VolError::UnsupportedKind {
                kind: entry.kind,
                connector: class.name.clone(),
            })
        }
        kind if !kind.is_location() => {
            return Err(VolError::WrongKind {
                handle,
                expected: "file or file object",
                actual: kind,
            })
        }
        _ => {}
    }
    let file = entry.object.require_file()?;
    let width = read(file)?.width();
    Ok(width)
}

fn codec(vol: &Vol<NativeObject>, handle: Handle) -> VolResult<TokenCodec> {
    Ok(TokenCodec::new(file_address_width(vol, handle)?))
}

/// Encode `addr` with the width of the handle's container.
pub fn addr_to_token(vol: &Vol<NativeObject>, handle: Handle, addr: Address) -> VolResult<Token> {
    Ok(codec(vol, handle)?.encode(addr))
}

/// Decode `token` with the width of the handle's container.
pub fn token_to_addr(vol: &Vol<NativeObject>, handle: Handle, token: &Token) -> VolResult<Address> {
    Ok(codec(vol, handle)?.decode(token))
}

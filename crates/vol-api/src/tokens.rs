//! Token text conversion and comparison.
//!
//! Each call is answered by the token slots of the handle's connector, so
//! the text form is whatever that connector defines. For the native
//! connector it is the decimal address.

use std::cmp::Ordering;

use vol_connector::location::validate_name;
use vol_connector::VolResult;
use vol_types::{Handle, Token};

use crate::api::ObjectApi;

impl<O: Clone + Send + Sync + 'static> ObjectApi<'_, O> {
    /// Render `token` as text.
    pub fn token_to_str(&self, handle: Handle, token: &Token) -> VolResult<String> {
        self.vol.token_to_str(handle, token)
    }

    /// Parse text produced by [`token_to_str`](Self::token_to_str).
    pub fn token_from_str(&self, handle: Handle, text: &str) -> VolResult<Token> {
        validate_name(text, "token string")?;
        self.vol.token_from_str(handle, text)
    }

    /// Compare two tokens from the container `handle` belongs to.
    ///
    /// Only [`Ordering::Equal`] carries meaning: both tokens name the same
    /// object.
    pub fn token_cmp(&self, handle: Handle, a: &Token, b: &Token) -> VolResult<Ordering> {
        self.vol.token_cmp(handle, a, b)
    }
}

#[cfg(test)]
mod tests {
    use vol_connector::{PropertyList, VolError};
    use vol_native::{addr_to_token, NativeConfig};
    use vol_types::{Address, AddressWidth, InfoFields};

    use super::*;
    use crate::session::Session;

    fn session_with(width: AddressWidth) -> (Session, Handle) {
        let session = Session::new(NativeConfig::default()).unwrap();
        let fcpl = PropertyList::file_create().with_address_width(width);
        let file = session
            .vol()
            .file_create(session.native(), "tokens.h5", Some(&fcpl), None)
            .unwrap();
        (session, file)
    }

    #[test]
    fn object_token_round_trips_through_text() {
        let (session, file) = session_with(AddressWidth::FOUR);
        let g = session.vol().group_create(file, "g", None).unwrap();
        let api = session.api();
        let token = api.get_info(g, InfoFields::BASIC).unwrap().token;
        let text = api.token_to_str(g, &token).unwrap();
        assert!(text.bytes().all(|b| b.is_ascii_digit()));
        let back = api.token_from_str(file, &text).unwrap();
        assert_eq!(back, token);
        assert_eq!(api.token_cmp(file, &token, &back).unwrap(), Ordering::Equal);
    }

    #[test]
    fn zero_address_is_one_digit() {
        let (session, file) = session_with(AddressWidth::EIGHT);
        let zero = addr_to_token(session.vol(), file, Address::new(0)).unwrap();
        assert_eq!(session.api().token_to_str(file, &zero).unwrap(), "0");
    }

    #[test]
    fn empty_text_is_bad_argument() {
        let (session, file) = session_with(AddressWidth::EIGHT);
        let err = session.api().token_from_str(file, "").unwrap_err();
        assert!(matches!(err, VolError::BadArgument(_)));
    }

    #[test]
    fn non_decimal_text_is_rejected() {
        let (session, file) = session_with(AddressWidth::EIGHT);
        let err = session.api().token_from_str(file, "0x10").unwrap_err();
        assert!(matches!(err, VolError::Token(_)));
    }

    #[test]
    fn different_objects_compare_unequal() {
        let (session, file) = session_with(AddressWidth::EIGHT);
        let vol = session.vol();
        vol.group_create(file, "a", None).unwrap();
        vol.group_create(file, "b", None).unwrap();
        let api = session.api();
        let a = api.get_info_by_name(file, "a", InfoFields::BASIC, None).unwrap();
        let b = api.get_info_by_name(file, "b", InfoFields::BASIC, None).unwrap();
        assert_ne!(api.token_cmp(file, &a.token, &b.token).unwrap(), Ordering::Equal);
    }
}

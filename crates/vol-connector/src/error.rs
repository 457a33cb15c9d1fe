use vol_token::TokenError;
use vol_types::{Handle, HandleKind, TypeError};

use crate::registry::ConnectorId;
use crate::subsystem::{Operation, Subsystem};

/// Coarse classification of a [`VolError`].
///
/// Every failure in the layer maps to exactly one class so callers can
/// tell bad input apart from missing capabilities or backend trouble.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Null, empty, or out-of-range input, caught before any backend call.
    Argument,
    /// A handle or connector that does not resolve to something live of
    /// the expected kind.
    Identity,
    /// An unset capability slot, or an object kind the connector rejects.
    Unsupported,
    /// Property-list verification or setup failed.
    PropertyList,
    /// The connector's backend failed (lookup, allocation, native query).
    Backend,
    /// A traversal callback failed, or the adapter failed mid-traversal.
    Traversal,
}

/// Errors from dispatch and connector operations.
#[derive(Debug, thiserror::Error)]
pub enum VolError {
    /// An argument failed validation.
    #[error("bad argument: {0}")]
    BadArgument(String),

    /// The handle is not registered.
    #[error("invalid handle {0}")]
    InvalidHandle(Handle),

    /// The handle refers to the wrong kind of object for this operation.
    #[error("handle {handle} is a {actual}, expected {expected}")]
    WrongKind {
        handle: Handle,
        expected: &'static str,
        actual: HandleKind,
    },

    /// The connector is not registered (or has been terminated).
    #[error("connector {0} is not registered")]
    InvalidConnector(ConnectorId),

    /// The object is not associated with any storage container.
    #[error("object is not associated with a container")]
    NoContainer,

    /// The capability slot for this operation is unset.
    #[error("connector '{connector}' does not support {subsystem} {operation}")]
    Unsupported {
        connector: String,
        subsystem: Subsystem,
        operation: Operation,
    },

    /// The connector cannot operate on this kind of object at all.
    #[error("{kind} objects are not supported by connector '{connector}'")]
    UnsupportedKind { kind: HandleKind, connector: String },

    /// An access property list could not be verified or applied.
    #[error("can't set access property list info: {0}")]
    PropertyList(String),

    /// A path, link, or object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// A link or attribute with this name already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The backend failed to complete a query or update.
    #[error("backend error: {0}")]
    Backend(String),

    /// Visitation or iteration aborted.
    #[error("object visitation failed: {0}")]
    Traversal(String),

    /// A caller-supplied callback returned a negative status.
    #[error("callback returned failure status {0}")]
    CallbackFailed(i32),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl VolError {
    /// Create a bad-argument error.
    pub fn bad_argument(message: impl Into<String>) -> Self {
        Self::BadArgument(message.into())
    }

    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// The taxonomy class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::BadArgument(_) | Self::Token(_) | Self::Type(_) => ErrorClass::Argument,
            Self::InvalidHandle(_)
            | Self::WrongKind { .. }
            | Self::InvalidConnector(_)
            | Self::NoContainer => ErrorClass::Identity,
            Self::Unsupported { .. } | Self::UnsupportedKind { .. } => ErrorClass::Unsupported,
            Self::PropertyList(_) => ErrorClass::PropertyList,
            Self::NotFound(_) | Self::AlreadyExists(_) | Self::Backend(_) => ErrorClass::Backend,
            Self::Traversal(_) | Self::CallbackFailed(_) => ErrorClass::Traversal,
        }
    }

    /// Returns `true` for unset-slot and unsupported-kind failures.
    pub fn is_unsupported(&self) -> bool {
        self.class() == ErrorClass::Unsupported
    }
}

/// Result alias for dispatch operations.
pub type VolResult<T> = Result<T, VolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_are_distinct_per_family() {
        assert_eq!(VolError::bad_argument("x").class(), ErrorClass::Argument);
        assert_eq!(
            VolError::InvalidHandle(Handle::from_raw(9)).class(),
            ErrorClass::Identity
        );
        assert_eq!(VolError::NoContainer.class(), ErrorClass::Identity);
        assert_eq!(
            VolError::Unsupported {
                connector: "native".into(),
                subsystem: Subsystem::Request,
                operation: Operation::Wait,
            }
            .class(),
            ErrorClass::Unsupported
        );
        assert_eq!(
            VolError::PropertyList("wrong class".into()).class(),
            ErrorClass::PropertyList
        );
        assert_eq!(VolError::backend("io").class(), ErrorClass::Backend);
        assert_eq!(VolError::CallbackFailed(-1).class(), ErrorClass::Traversal);
    }

    #[test]
    fn token_errors_are_argument_errors() {
        let err: VolError = TokenError::EmptyText.into();
        assert_eq!(err.class(), ErrorClass::Argument);
    }

    #[test]
    fn unsupported_message_names_slot() {
        let err = VolError::Unsupported {
            connector: "native".into(),
            subsystem: Subsystem::Link,
            operation: Operation::Optional,
        };
        assert_eq!(
            err.to_string(),
            "connector 'native' does not support link optional"
        );
        assert!(err.is_unsupported());
    }
}

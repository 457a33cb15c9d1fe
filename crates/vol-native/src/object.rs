use std::fmt;
use std::sync::Arc;

use vol_connector::{VolError, VolResult};
use vol_types::Address;

use crate::container::{read, FileRef};

/// The connector object behind a native handle.
#[derive(Clone)]
pub enum NativeObject {
    File(FileRef),
    /// A group, dataset, or committed datatype.
    Object { file: FileRef, addr: Address },
    Attribute {
        file: FileRef,
        owner: Address,
        name: String,
    },
    /// A datatype that has not been committed to any container.
    Transient { description: String },
}

impl NativeObject {
    pub fn transient(description: impl Into<String>) -> Self {
        Self::Transient {
            description: description.into(),
        }
    }

    /// The container this object lives in, if any.
    pub fn file(&self) -> Option<&FileRef> {
        match self {
            Self::File(file) | Self::Object { file, .. } | Self::Attribute { file, .. } => {
                Some(file)
            }
            Self::Transient { .. } => None,
        }
    }

    /// Like [`file`](Self::file), failing for transient objects.
    pub fn require_file(&self) -> VolResult<&FileRef> {
        self.file().ok_or(VolError::NoContainer)
    }

    /// Container and address where path resolution starts from this
    /// object. Files start at their root group; attributes at their owner.
    pub fn position(&self) -> VolResult<(FileRef, Address)> {
        match self {
            Self::File(file) => {
                let root = read(file)?.root();
                Ok((Arc::clone(file), root))
            }
            Self::Object { file, addr } => Ok((Arc::clone(file), *addr)),
            Self::Attribute { file, owner, .. } => Ok((Arc::clone(file), *owner)),
            Self::Transient { .. } => Err(VolError::NoContainer),
        }
    }
}

impl fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let container = |file: &FileRef| {
            read(file)
                .map(|c| c.name().to_string())
                .unwrap_or_else(|_| "<poisoned>".into())
        };
        match self {
            Self::File(file) => write!(f, "File({})", container(file)),
            Self::Object { file, addr } => write!(f, "Object({}@{addr})", container(file)),
            Self::Attribute { file, owner, name } => {
                write!(f, "Attribute({}@{owner}:{name})", container(file))
            }
            Self::Transient { description } => write!(f, "Transient({description})"),
        }
    }
}

//! Error types for image-salt operations.

use std::fmt;

use thiserror::Error;

/// Where a malformed attribute fragment was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOrigin {
    /// A fragment decoded on its own, outside any extractor.
    Fragment,
    /// A `{...}` fragment inside an `alt` value.
    Alt,
    /// A `{...}` block in the text following an image.
    Block,
    /// The configured base attributes.
    BaseAttrs,
}

impl fmt::Display for AttrOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrOrigin::Fragment => f.write_str("attribute fragment"),
            AttrOrigin::Alt => f.write_str("alt text"),
            AttrOrigin::Block => f.write_str("attribute block"),
            AttrOrigin::BaseAttrs => f.write_str("base attributes"),
        }
    }
}

/// Errors that can occur while salting or rebuilding images.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid attributes injected in {origin}: {fragment:?}")]
    InvalidAttrs {
        origin: AttrOrigin,
        fragment: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Re-tag an attribute decode error with the extractor that raised it.
    pub(crate) fn with_origin(self, origin: AttrOrigin) -> Self {
        match self {
            Error::InvalidAttrs { fragment, .. } => Error::InvalidAttrs { origin, fragment },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

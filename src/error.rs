use thiserror::Error;

/// Errors raised by the sequence containers of this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A scalar index has no backing element.
    #[error("index {index} out of range for sequence of length {len}")]
    OutOfRange { index: isize, len: usize },

    /// The number of supplied values does not match the number of
    /// addressed positions (or bytes of a packed record).
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// An argument is invalid on its own, independent of any sequence state.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// A construction parameter was changed after construction.
    #[error("`{name}` can't be changed after construction")]
    ImmutableParameter { name: &'static str },

    /// The container does not support the operation at all.
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: &'static str },

    /// A node handle refers to a node that has been removed.
    #[error("handle refers to a node that is no longer alive")]
    StaleHandle,

    /// An internal invariant does not hold. This is a logic defect.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn out_of_range(index: isize, len: usize) -> Error {
        Error::OutOfRange { index, len }
    }

    pub(crate) fn unsupported(operation: &'static str) -> Error {
        Error::Unsupported { operation }
    }

    pub(crate) fn invalid_arg(name: &'static str, reason: impl Into<String>) -> Error {
        Error::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Resolves a possibly negative scalar index against `len`.
pub(crate) fn normalize_index(index: isize, len: usize) -> Result<usize> {
    let resolved = if index < 0 {
        len as isize + index
    } else {
        index
    };
    if resolved < 0 || resolved as usize >= len {
        return Err(Error::out_of_range(index, len));
    }
    Ok(resolved as usize)
}

/// Resolves an insertion index, clamping it to `0..=len`.
pub(crate) fn clamp_insert_index(index: isize, len: usize) -> usize {
    if index < 0 {
        (len as isize + index).max(0) as usize
    } else {
        (index as usize).min(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_positive_and_negative() {
        assert_eq!(normalize_index(0, 3), Ok(0));
        assert_eq!(normalize_index(2, 3), Ok(2));
        assert_eq!(normalize_index(-1, 3), Ok(2));
        assert_eq!(normalize_index(-3, 3), Ok(0));
        assert_eq!(
            normalize_index(3, 3),
            Err(Error::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            normalize_index(-4, 3),
            Err(Error::OutOfRange { index: -4, len: 3 })
        );
        assert!(normalize_index(0, 0).is_err());
    }

    #[test]
    fn insert_index_clamps() {
        assert_eq!(clamp_insert_index(0, 0), 0);
        assert_eq!(clamp_insert_index(5, 3), 3);
        assert_eq!(clamp_insert_index(-1, 3), 2);
        assert_eq!(clamp_insert_index(-10, 3), 0);
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::out_of_range(7, 2).to_string(),
            "index 7 out of range for sequence of length 2"
        );
        assert_eq!(
            Error::ImmutableParameter { name: "page_size" }.to_string(),
            "`page_size` can't be changed after construction"
        );
    }
}

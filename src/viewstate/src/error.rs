//! Error types for object decoding and ViewState envelopes

/// Why an object stream could not be decoded.
///
/// Every variant carries the byte offset where decoding stopped. A failed
/// decode never yields a partial fragment.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Truncated input at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Unknown type tag 0x{tag:02x} at offset {offset}")]
    UnknownTypeTag { tag: u8, offset: usize },

    #[error("Invalid boolean tag 0x{byte:02x} at offset {offset}")]
    InvalidBoolean { byte: u8, offset: usize },

    #[error("Variable-length integer longer than 5 bytes at offset {offset}")]
    VarintOverflow { offset: usize },

    #[error("Nesting deeper than {limit} levels at offset {offset}")]
    TooDeep { limit: usize, offset: usize },
}

impl DecodeError {
    /// Byte offset where decoding stopped
    pub fn offset(&self) -> usize {
        match self {
            Self::Truncated { offset, .. }
            | Self::UnknownTypeTag { offset, .. }
            | Self::InvalidBoolean { offset, .. }
            | Self::VarintOverflow { offset }
            | Self::TooDeep { offset, .. } => *offset,
        }
    }
}

/// Errors from decoding a complete ViewState value
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid Base64 data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Data too short: need {needed} bytes, got {actual}")]
    DataTooShort { needed: usize, actual: usize },

    #[error("Invalid ViewState preamble: expected ff 01, got {0:02x} {1:02x}")]
    InvalidPreamble(u8, u8),

    #[error("Object decode failed: {0}")]
    Decode(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_offset() {
        let err = DecodeError::UnknownTypeTag { tag: 0x31, offset: 7 };
        assert_eq!(err.offset(), 7);
        assert_eq!(DecodeError::VarintOverflow { offset: 3 }.offset(), 3);
    }

    #[test]
    fn test_error_display() {
        let err = DecodeError::UnknownTypeTag { tag: 0x31, offset: 7 };
        assert_eq!(err.to_string(), "Unknown type tag 0x31 at offset 7");

        let err = DecodeError::InvalidBoolean { byte: 0x31, offset: 0 };
        assert!(err.to_string().contains("Invalid boolean tag 0x31"));

        let err = Error::InvalidPreamble(0x00, 0x01);
        assert!(err.to_string().contains("expected ff 01, got 00 01"));

        let err = Error::DataTooShort {
            needed: 2,
            actual: 1,
        };
        assert!(err.to_string().contains("Data too short"));

        let err = Error::from(DecodeError::TooDeep {
            limit: 64,
            offset: 130,
        });
        assert!(err.to_string().contains("Object decode failed"));
    }
}

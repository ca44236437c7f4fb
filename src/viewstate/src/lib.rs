//! Tolerant decoder for ASP.NET ViewState object streams
//!
//! Decodes untrusted, possibly malformed byte streams into an XML-like
//! tree for inspection. Decoding never panics: truncated input, unknown
//! type tags and invalid primitives all surface as [`DecodeError`].
//!
//! # Format Overview
//!
//! - Every value starts with a one-byte type tag, looked up in a [`Registry`]
//! - Counts and string lengths are 7-bit groups, least significant first,
//!   with the high bit meaning "another byte follows"
//! - Composite values (arrays, pairs, triples, control state) contain
//!   further tagged values
//! - A complete ViewState is Base64 of `ff 01 <root object> [MAC]`
//!
//! ## Example
//!
//! ```
//! use viewstate::{decode, decode_with, decoders, standard_registry};
//!
//! let registry = standard_registry();
//!
//! let decoded = decode(registry, &[0x03, 0x02, 0x67, 0x68]).unwrap();
//! assert_eq!(
//!     decoded.fragment.render(),
//!     r#"<booleanarray size="2"><boolean>true</boolean><boolean>false</boolean></booleanarray>"#
//! );
//!
//! let decoded = decode_with(decoders::uint32, registry, &[0x80 | 94, 0x00]).unwrap();
//! assert_eq!(decoded.fragment.render(), "<uint32>94</uint32>");
//! assert_eq!(decoded.consumed, 2);
//! ```

mod cursor;
pub mod decoders;
mod envelope;
mod error;
mod fragment;
pub mod registry;

pub use cursor::{Cursor, DEFAULT_MAX_DEPTH};
pub use decoders::Decoder;
pub use envelope::{join_split, Mac, MacAlgorithm, Version, ViewState, PREAMBLE};
pub use error::{DecodeError, Error, Result};
pub use fragment::{escape_text, Body, Fragment};
pub use registry::{standard_registry, tags, Registry};

/// A successfully decoded value and how many bytes it used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub fragment: Fragment,
    pub consumed: usize,
}

/// Outcome of a single decode attempt
pub type DecodeResult = std::result::Result<Decoded, DecodeError>;

/// Decode one tagged value from the start of `data`
pub fn decode(registry: &Registry, data: &[u8]) -> DecodeResult {
    decode_cursor(registry, &mut Cursor::new(data))
}

/// Decode one tagged value at the cursor's position
pub fn decode_cursor(registry: &Registry, cursor: &mut Cursor<'_>) -> DecodeResult {
    let start = cursor.position();
    let fragment = registry.dispatch(cursor)?;
    Ok(Decoded {
        fragment,
        consumed: cursor.position() - start,
    })
}

/// Run a specific decoder over an untagged payload
pub fn decode_with(decoder: Decoder, registry: &Registry, data: &[u8]) -> DecodeResult {
    let mut cursor = Cursor::new(data);
    let fragment = decoder(&mut cursor, registry)?;
    Ok(Decoded {
        fragment,
        consumed: cursor.position(),
    })
}

//! Type tag → decoder lookup table

use crate::cursor::Cursor;
use crate::decoders::{self, Decoder};
use crate::error::DecodeError;
use crate::fragment::Fragment;
use once_cell::sync::Lazy;
use std::fmt;

/// Type tags understood by the standard registry
pub mod tags {
    pub const UINT32: u8 = 0x02;
    pub const BOOLEAN_ARRAY: u8 = 0x03;
    pub const STRING: u8 = 0x05;
    pub const RGBA: u8 = 0x09;
    pub const STRING_NULL_TERMINATED: u8 = 0x0B;
    pub const PAIR: u8 = 0x0F;
    pub const TRIPLE: u8 = 0x10;
    pub const STRING_ARRAY: u8 = 0x15;
    pub const OBJECT_ARRAY: u8 = 0x16;
    pub const CONTROL_STATE: u8 = 0x18;
    pub const UNIT: u8 = 0x1B;
    /// Alternate string tag (formatted string in ASP.NET)
    pub const STRING_FORMATTED: u8 = 0x1E;
    pub const STRING_REFERENCE: u8 = 0x1F;
    pub const UUID: u8 = 0x24;
    pub const EMPTY_NODE: u8 = 0x64;
    pub const EMPTY_STRING: u8 = 0x65;
    pub const ZERO: u8 = 0x66;
    pub const TRUE: u8 = 0x67;
    pub const FALSE: u8 = 0x68;
}

static STANDARD: Lazy<Registry> = Lazy::new(Registry::standard);

/// Shared instance of [`Registry::standard`], built on first use
pub fn standard_registry() -> &'static Registry {
    &STANDARD
}

/// Immutable table of decoders indexed by type tag
#[derive(Clone)]
pub struct Registry {
    decoders: [Option<Decoder>; 256],
}

impl Registry {
    /// A table with nothing registered
    pub fn empty() -> Self {
        Self {
            decoders: [None; 256],
        }
    }

    /// Every type tag in [`tags`]
    pub fn standard() -> Self {
        Self::empty()
            .with(tags::UINT32, decoders::uint32)
            .with(tags::BOOLEAN_ARRAY, decoders::boolean_array)
            .with(tags::STRING, decoders::string)
            .with(tags::STRING_FORMATTED, decoders::string)
            .with(tags::RGBA, decoders::rgba)
            .with(tags::STRING_NULL_TERMINATED, decoders::string_null_terminated)
            .with(tags::PAIR, decoders::pair)
            .with(tags::TRIPLE, decoders::triple)
            .with(tags::STRING_ARRAY, decoders::string_array)
            .with(tags::OBJECT_ARRAY, decoders::object_array)
            .with(tags::CONTROL_STATE, decoders::control_state)
            .with(tags::UNIT, decoders::unit)
            .with(tags::STRING_REFERENCE, decoders::string_reference)
            .with(tags::UUID, decoders::uuid)
            .with(tags::EMPTY_NODE, decoders::empty_node)
            .with(tags::EMPTY_STRING, decoders::empty_string)
            .with(tags::ZERO, decoders::zero)
            .with(tags::TRUE, decoders::literal_true)
            .with(tags::FALSE, decoders::literal_false)
    }

    /// Register `decoder` under `tag`, replacing any previous entry
    pub fn with(mut self, tag: u8, decoder: Decoder) -> Self {
        self.decoders[tag as usize] = Some(decoder);
        self
    }

    pub fn get(&self, tag: u8) -> Option<Decoder> {
        self.decoders[tag as usize]
    }

    pub fn contains(&self, tag: u8) -> bool {
        self.get(tag).is_some()
    }

    /// Registered tags in ascending order
    pub fn tags(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&tag| self.contains(tag))
    }

    /// Read one type tag and decode the value behind it
    pub fn dispatch(&self, cursor: &mut Cursor<'_>) -> Result<Fragment, DecodeError> {
        let offset = cursor.position();
        let tag = cursor.read_u8()?;

        let decoder = self.get(tag).ok_or_else(|| {
            tracing::debug!(tag, offset, "no decoder registered for type tag");
            DecodeError::UnknownTypeTag { tag, offset }
        })?;

        tracing::trace!(tag, offset, depth = cursor.depth(), "dispatch");
        decoder(cursor, self)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field(
                "tags",
                &self.tags().map(|t| format!("0x{:02x}", t)).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tags() {
        let registry = Registry::standard();
        let registered: Vec<u8> = registry.tags().collect();
        assert_eq!(
            registered,
            vec![
                0x02, 0x03, 0x05, 0x09, 0x0B, 0x0F, 0x10, 0x15, 0x16, 0x18, 0x1B, 0x1E, 0x1F,
                0x24, 0x64, 0x65, 0x66, 0x67, 0x68
            ]
        );
        assert!(!registry.contains(0x00));
        assert!(!registry.contains(0xFF));
    }

    #[test]
    fn test_dispatch_unknown_tag() {
        let registry = Registry::standard();
        let data = [0x31];
        let mut cursor = Cursor::new(&data);
        assert_eq!(
            registry.dispatch(&mut cursor),
            Err(DecodeError::UnknownTypeTag { tag: 0x31, offset: 0 })
        );
    }

    #[test]
    fn test_dispatch_empty_input() {
        let registry = Registry::standard();
        let mut cursor = Cursor::new(&[]);
        assert!(matches!(
            registry.dispatch(&mut cursor),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_custom_registry() {
        let registry = Registry::empty().with(0x42, decoders::zero);
        let data = [0x42, 0x67];
        let mut cursor = Cursor::new(&data);
        assert_eq!(registry.dispatch(&mut cursor).unwrap().render(), "<zero></zero>");
        // 0x67 is not registered here
        assert!(registry.dispatch(&mut cursor).is_err());
    }

    #[test]
    fn test_both_string_tags_decode_alike() {
        let registry = standard_registry();
        for tag in [tags::STRING, tags::STRING_FORMATTED] {
            let data = [tag, 0x02, b'o', b'k'];
            let mut cursor = Cursor::new(&data);
            assert_eq!(registry.dispatch(&mut cursor).unwrap().render(), "<string>ok</string>");
        }
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        // 200 nested pairs, far beyond the default limit
        let mut data = vec![tags::PAIR; 200];
        data.extend_from_slice(&[tags::TRUE; 201]);
        let mut cursor = Cursor::new(&data);
        assert!(matches!(
            standard_registry().dispatch(&mut cursor),
            Err(DecodeError::TooDeep { limit: 64, .. })
        ));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }

    #[test]
    fn test_debug_lists_tags() {
        let debug = format!("{:?}", Registry::empty().with(0x02, decoders::uint32));
        assert!(debug.contains("0x02"));
    }
}

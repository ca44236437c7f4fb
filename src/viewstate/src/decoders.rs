//! Primitive and composite object decoders
//!
//! Each decoder consumes the payload that follows its type tag. Primitive
//! decoders ignore the registry; composite decoders hand every child back
//! to [`Registry::dispatch`] and fail as soon as any child fails.

use crate::cursor::Cursor;
use crate::error::DecodeError;
use crate::fragment::Fragment;
use crate::registry::{tags, Registry};

/// A decoder registered under a one-byte type tag
pub type Decoder = fn(&mut Cursor<'_>, &Registry) -> Result<Fragment, DecodeError>;

/// Byte widths of the fixed-size primitives
pub const RGBA_LEN: usize = 4;
pub const UNIT_LEN: usize = 12;
pub const UUID_LEN: usize = 36;

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn hex_blob(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

// -----------------------------------------------------------------------------
// Primitives
// -----------------------------------------------------------------------------

/// Variable-length unsigned integer
pub fn uint32(cursor: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    let value = cursor.read_varint()?;
    Ok(Fragment::value("uint32", value.to_string()))
}

/// Varint byte length followed by that many bytes of text
pub fn string(cursor: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    let len = cursor.read_len()?;
    let bytes = cursor.read_bytes(len)?;
    Ok(Fragment::text("string", lossy(bytes)))
}

/// Text up to and including a 0x00 terminator
pub fn string_null_terminated(
    cursor: &mut Cursor<'_>,
    _: &Registry,
) -> Result<Fragment, DecodeError> {
    let bytes = cursor.read_until_nul()?;
    Ok(Fragment::text("stringnullterminated", lossy(bytes)))
}

pub fn rgba(cursor: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    let bytes = cursor.read_bytes(RGBA_LEN)?;
    Ok(Fragment::value("rgba", hex_blob(bytes)))
}

/// Opaque 12-byte blob
pub fn unit(cursor: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    let bytes = cursor.read_bytes(UNIT_LEN)?;
    Ok(Fragment::value("unit", hex_blob(bytes)))
}

pub fn uuid(cursor: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    let bytes = cursor.read_bytes(UUID_LEN)?;
    Ok(Fragment::value("uuid", hex_blob(bytes)))
}

/// 4-byte big-endian id followed by one terminator byte
pub fn string_reference(cursor: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    cursor.ensure(5)?;
    let id = cursor.read_u32_be()?;
    cursor.read_u8()?;
    Ok(Fragment::value("stringreference", id.to_string()))
}

/// A single boolean type tag read as data
pub fn boolean(cursor: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    let offset = cursor.position();
    let value = match cursor.read_u8()? {
        tags::TRUE => true,
        tags::FALSE => false,
        byte => return Err(DecodeError::InvalidBoolean { byte, offset }),
    };
    Ok(boolean_fragment(value))
}

fn boolean_fragment(value: bool) -> Fragment {
    Fragment::value("boolean", if value { "true" } else { "false" })
}

/// The `true` tag carries its value; nothing follows it
pub fn literal_true(_: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    Ok(boolean_fragment(true))
}

pub fn literal_false(_: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    Ok(boolean_fragment(false))
}

pub fn empty_node(_: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    Ok(Fragment::empty("emptynode"))
}

pub fn empty_string(_: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    Ok(Fragment::empty("emptystring"))
}

pub fn zero(_: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    Ok(Fragment::empty("zero"))
}

// -----------------------------------------------------------------------------
// Composites
// -----------------------------------------------------------------------------

/// Read an element count; every element takes at least one byte
fn read_count(cursor: &mut Cursor<'_>) -> Result<usize, DecodeError> {
    let count = cursor.read_len()?;
    cursor.ensure(count)?;
    Ok(count)
}

/// Run `element` `count` times one level deeper, stopping at the first failure
fn collect_nested<F>(
    cursor: &mut Cursor<'_>,
    count: usize,
    mut element: F,
) -> Result<Vec<Fragment>, DecodeError>
where
    F: FnMut(&mut Cursor<'_>) -> Result<Fragment, DecodeError>,
{
    cursor.descend()?;
    let children = (0..count).map(|_| element(cursor)).collect();
    cursor.ascend();
    children
}

fn sized(name: &'static str, count: usize, children: Vec<Fragment>) -> Fragment {
    Fragment::node(name, children).with_attribute("size", count)
}

/// Count followed by that many single-byte boolean tags
pub fn boolean_array(
    cursor: &mut Cursor<'_>,
    registry: &Registry,
) -> Result<Fragment, DecodeError> {
    let count = read_count(cursor)?;
    let children = collect_nested(cursor, count, |c| boolean(c, registry))?;
    Ok(sized("booleanarray", count, children))
}

/// Count followed by strings with a one-byte length prefix
pub fn string_array(cursor: &mut Cursor<'_>, _: &Registry) -> Result<Fragment, DecodeError> {
    let count = read_count(cursor)?;
    let children = collect_nested(cursor, count, |c| {
        let len = c.read_u8()? as usize;
        let bytes = c.read_bytes(len)?;
        Ok(Fragment::text("stringwithlength", lossy(bytes)).with_attribute("length", len))
    })?;
    Ok(sized("stringarray", count, children))
}

/// Count followed by arbitrary tagged values
pub fn object_array(cursor: &mut Cursor<'_>, registry: &Registry) -> Result<Fragment, DecodeError> {
    let count = read_count(cursor)?;
    let children = collect_nested(cursor, count, |c| registry.dispatch(c))?;
    Ok(sized("objectarray", count, children))
}

pub fn control_state(
    cursor: &mut Cursor<'_>,
    registry: &Registry,
) -> Result<Fragment, DecodeError> {
    let count = read_count(cursor)?;
    let children = collect_nested(cursor, count, |c| registry.dispatch(c))?;
    Ok(sized("controlstate", count, children))
}

pub fn pair(cursor: &mut Cursor<'_>, registry: &Registry) -> Result<Fragment, DecodeError> {
    let children = collect_nested(cursor, 2, |c| registry.dispatch(c))?;
    Ok(Fragment::node("pair", children))
}

pub fn triple(cursor: &mut Cursor<'_>, registry: &Registry) -> Result<Fragment, DecodeError> {
    let children = collect_nested(cursor, 3, |c| registry.dispatch(c))?;
    Ok(Fragment::node("triple", children))
}

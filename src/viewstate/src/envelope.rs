//! ViewState envelope: Base64 transport, preamble, object tree and MAC trailer
//!
//! A serialized ViewState is `ff 01 <root object> [MAC]`. Whatever the root
//! object does not consume is treated as the MAC; its length hints at the
//! HMAC algorithm. The encoded prefix hints at the ASP.NET generation.

use crate::cursor::{Cursor, DEFAULT_MAX_DEPTH};
use crate::error::{Error, Result};
use crate::fragment::{push_indent, Fragment};
use crate::registry::{standard_registry, Registry};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::fmt;

/// Leading bytes of every decodable ViewState
pub const PREAMBLE: [u8; 2] = [0xFF, 0x01];

/// ASP.NET generation guessed from the Base64 prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Version {
    /// ASP.NET 1.0 / 1.1 (`dD…`)
    AspNet1,
    /// ASP.NET 2.0 and later (`/w…`)
    AspNet2,
    Unknown,
}

impl Version {
    pub fn detect(encoded: &str) -> Self {
        if encoded.starts_with("/w") {
            Self::AspNet2
        } else if encoded.starts_with("dD") {
            Self::AspNet1
        } else {
            Self::Unknown
        }
    }

    /// Whether this is the current serialization format
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::AspNet2)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AspNet1 => write!(f, "ASP.NET 1.x"),
            Self::AspNet2 => write!(f, "ASP.NET 2.0+"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// HMAC algorithm guessed from the trailer length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MacAlgorithm {
    HmacMd5,
    HmacSha1,
    HmacSha256,
    HmacSha384,
    HmacSha512,
    Unknown,
}

impl MacAlgorithm {
    pub fn from_len(len: usize) -> Self {
        match len {
            16 => Self::HmacMd5,
            20 => Self::HmacSha1,
            32 => Self::HmacSha256,
            48 => Self::HmacSha384,
            64 => Self::HmacSha512,
            _ => Self::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HmacMd5 => "HMAC-MD5",
            Self::HmacSha1 => "HMAC-SHA0/HMAC-SHA1",
            Self::HmacSha256 => "HMAC-SHA256",
            Self::HmacSha384 => "HMAC-SHA384",
            Self::HmacSha512 => "HMAC-SHA512",
            Self::Unknown => "HMAC-UNKNOWN",
        }
    }
}

/// Bytes left over after the root object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mac {
    pub algorithm: MacAlgorithm,
    #[serde(serialize_with = "serialize_hex")]
    pub value: Vec<u8>,
}

fn serialize_hex<S: serde::Serializer>(bytes: &[u8], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(bytes))
}

impl Mac {
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// A fully decoded ViewState
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub version: Version,
    pub root: Fragment,
    pub mac: Option<Mac>,
}

impl ViewState {
    /// Decode a Base64 ViewState with the standard registry
    pub fn decode(encoded: &str) -> Result<Self> {
        Self::decode_with(encoded, standard_registry(), DEFAULT_MAX_DEPTH)
    }

    /// Decode a Base64 ViewState with a specific registry and nesting limit
    pub fn decode_with(encoded: &str, registry: &Registry, max_depth: usize) -> Result<Self> {
        let encoded = encoded.trim();
        let data = STANDARD.decode(encoded)?;
        let version = Version::detect(encoded);
        let mut state = Self::from_bytes(&data, registry, max_depth)?;
        state.version = version;
        Ok(state)
    }

    /// Decode already Base64-decoded bytes
    pub fn from_bytes(data: &[u8], registry: &Registry, max_depth: usize) -> Result<Self> {
        if data.len() < PREAMBLE.len() {
            return Err(Error::DataTooShort {
                needed: PREAMBLE.len(),
                actual: data.len(),
            });
        }
        if data[..2] != PREAMBLE {
            return Err(Error::InvalidPreamble(data[0], data[1]));
        }

        let mut cursor = Cursor::new(&data[2..]).with_max_depth(max_depth);
        let root = registry.dispatch(&mut cursor).map_err(|err| {
            tracing::debug!(
                offset = err.offset() + 2,
                %err,
                "ViewState root object failed to decode"
            );
            err
        })?;

        let trailer = cursor.rest();
        let mac = (!trailer.is_empty()).then(|| Mac {
            algorithm: MacAlgorithm::from_len(trailer.len()),
            value: trailer.to_vec(),
        });

        tracing::debug!(
            consumed = cursor.position() + 2,
            mac_len = trailer.len(),
            "decoded ViewState"
        );

        Ok(Self {
            version: Version::Unknown,
            root,
            mac,
        })
    }

    pub fn has_mac(&self) -> bool {
        self.mac.is_some()
    }

    /// XML document with the object tree and MAC details
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" ?>\n<viewstate>\n");

        push_line(&mut out, "<encrypted>false</encrypted>");
        self.root.write_pretty(&mut out, 1);

        match &self.mac {
            Some(mac) => {
                push_line(&mut out, "<hmac>true</hmac>");
                push_line(&mut out, &format!("<hmactype>{}</hmactype>", mac.algorithm.name()));
                push_line(&mut out, &format!("<hmaclength>{}</hmaclength>", mac.len()));
                push_line(
                    &mut out,
                    &format!("<hmacvalue>0x{}</hmacvalue>", hex::encode(&mac.value)),
                );
            }
            None => push_line(&mut out, "<hmac>false</hmac>"),
        }

        out.push_str("</viewstate>\n");
        out
    }
}

fn push_line(out: &mut String, line: &str) {
    push_indent(out, 1);
    out.push_str(line);
    out.push('\n');
}

/// Join the parts of a ViewState split across numbered hidden fields
pub fn join_split<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|p| p.as_ref().trim().to_string())
        .collect()
}

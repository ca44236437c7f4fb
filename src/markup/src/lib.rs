//! Lenient HTML tag and attribute tokenizer
//!
//! Extracts start tags and their attributes from arbitrary, possibly broken
//! markup without building a DOM. Every function here is total: malformed
//! input yields a partial result, never an error or a panic.
//!
//! ```
//! let tags = markup::extract_tags("<html> <body> <span>></span> <a href=x></a> </body> </html>");
//! assert_eq!(tags.len(), 4);
//! assert_eq!(tags["a"]["href"], "x");
//!
//! let found = markup::contexts("<input value='abc123'>", "abc");
//! assert_eq!(found[0].tag_attribute.as_deref(), Some("value"));
//! assert_eq!(found[0].surrounding_quote, Some('\''));
//! ```

mod attributes;
mod context;
mod scanner;

pub use attributes::parse_attributes;
pub use context::{contexts, HtmlContext, Location};
pub use scanner::{extract_tags, scan_tags};

use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Range;

/// Attribute name → value; names are case sensitive
pub type Attributes = BTreeMap<String, String>;

/// Tag name → attributes of its last occurrence
pub type TagMap = BTreeMap<String, Attributes>;

/// A start tag as it appears in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    /// Case preserved
    pub name: String,
    pub attributes: Attributes,
    /// Byte range from `<` through `>`, or up to the synthesized boundary
    pub span: Range<usize>,
    /// Ended by `>` rather than by a following `<` or end of input
    pub closed: bool,
    pub self_closing: bool,
}

impl Tag {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Case-insensitive name comparison
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

//! Decoded object tree and its XML-like rendering
//!
//! A [`Fragment`] owns its children outright. Rendering is either compact
//! (no whitespace between elements, the canonical form) or pretty (three
//! spaces of indentation per level, one element per line).

use serde::Serialize;
use std::fmt::{self, Write};

const INDENT: &str = "   ";
const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Content of a decoded element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    /// Renders as an open tag immediately followed by its close tag
    Empty,
    /// Numbers, hex blobs and booleans; rendered verbatim
    Value(String),
    /// Decoded string data; CDATA wrapped when it contains `&`
    Text(String),
    Children(Vec<Fragment>),
}

/// One decoded element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(&'static str, String)>,
    pub body: Body,
}

impl Fragment {
    pub fn empty(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn value(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            body: Body::Value(value.into()),
        }
    }

    pub fn text(name: &'static str, text: impl Into<String>) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            body: Body::Text(text.into()),
        }
    }

    pub fn node(name: &'static str, children: Vec<Fragment>) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            body: Body::Children(children),
        }
    }

    pub fn with_attribute(mut self, key: &'static str, value: impl ToString) -> Self {
        self.attributes.push((key, value.to_string()));
        self
    }

    /// Child fragments, empty for leaves
    pub fn children(&self) -> &[Fragment] {
        match &self.body {
            Body::Children(children) => children,
            _ => &[],
        }
    }

    /// Value or text content of a leaf
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            Body::Value(s) | Body::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Look up an attribute by name
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Compact rendering
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Indented rendering starting at `level`
    pub fn render_pretty(&self, level: usize) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, level);
        out
    }

    pub(crate) fn write_pretty(&self, out: &mut String, level: usize) {
        push_indent(out, level);
        self.write_open(out);
        match &self.body {
            Body::Children(children) => {
                out.push('\n');
                for child in children {
                    child.write_pretty(out, level + 1);
                }
                push_indent(out, level);
            }
            body => write_leaf(out, body),
        }
        self.write_close(out);
        out.push('\n');
    }

    fn write_open(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.name);
        for (key, value) in &self.attributes {
            // Attribute values are decoder generated numbers, never input text
            let _ = write!(out, " {}=\"{}\"", key, value);
        }
        out.push('>');
    }

    fn write_close(&self, out: &mut String) {
        out.push_str("</");
        out.push_str(self.name);
        out.push('>');
    }

    fn write_compact(&self, out: &mut String) {
        self.write_open(out);
        match &self.body {
            Body::Children(children) => {
                for child in children {
                    child.write_compact(out);
                }
            }
            body => write_leaf(out, body),
        }
        self.write_close(out);
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_compact(&mut out);
        f.write_str(&out)
    }
}

fn write_leaf(out: &mut String, body: &Body) {
    match body {
        Body::Value(value) => out.push_str(value),
        Body::Text(text) => out.push_str(&escape_text(text)),
        Body::Empty | Body::Children(_) => {}
    }
}

pub(crate) fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

/// Wrap text containing `&` in a CDATA section; leave anything else raw.
///
/// A literal `]]>` inside wrapped text is split across two sections.
pub fn escape_text(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let inner = text.replace(CDATA_CLOSE, "]]]]><![CDATA[>");
    format!("{}{}{}", CDATA_OPEN, inner, CDATA_CLOSE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Fragment {
        Fragment::node(
            "pair",
            vec![
                Fragment::value("uint32", "7"),
                Fragment::node("booleanarray", vec![Fragment::value("boolean", "true")])
                    .with_attribute("size", 1),
            ],
        )
    }

    #[test]
    fn test_compact_render() {
        assert_eq!(
            sample().render(),
            "<pair><uint32>7</uint32><booleanarray size=\"1\"><boolean>true</boolean></booleanarray></pair>"
        );
        assert_eq!(Fragment::empty("zero").render(), "<zero></zero>");
    }

    #[test]
    fn test_pretty_render() {
        let expected = "\
<pair>
   <uint32>7</uint32>
   <booleanarray size=\"1\">
      <boolean>true</boolean>
   </booleanarray>
</pair>
";
        assert_eq!(sample().render_pretty(0), expected);
        assert!(Fragment::empty("zero").render_pretty(1).starts_with("   <zero>"));
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(escape_text("plain"), "plain");
        assert_eq!(escape_text("a&b"), "<![CDATA[a&b]]>");
        assert_eq!(
            escape_text("x&]]>y"),
            "<![CDATA[x&]]]]><![CDATA[>y]]>"
        );
        // Only the ampersand triggers wrapping
        assert_eq!(escape_text("<b>"), "<b>");
    }

    #[test]
    fn test_value_is_never_escaped() {
        let frag = Fragment::value("rgba", "0x&&");
        assert_eq!(frag.render(), "<rgba>0x&&</rgba>");
        let frag = Fragment::text("string", "a&b");
        assert_eq!(frag.render(), "<string><![CDATA[a&b]]></string>");
    }

    #[test]
    fn test_accessors() {
        let frag = sample();
        assert_eq!(frag.children().len(), 2);
        assert_eq!(frag.children()[0].content(), Some("7"));
        assert_eq!(frag.children()[1].attribute("size"), Some("1"));
        assert_eq!(frag.attribute("size"), None);
        assert!(frag.content().is_none());
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(Fragment::value("uint32", "94")).unwrap();
        assert_eq!(json["name"], "uint32");
        assert_eq!(json["body"]["value"], "94");
        assert!(json.get("attributes").is_none());
    }
}

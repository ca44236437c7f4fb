//! Locate a substring in a document and describe where it landed
//!
//! Built on the scanner's token stream, so it shares its leniency: the
//! element stack is a best-effort reconstruction, not a DOM.

use crate::attributes::RawAttribute;
use crate::scanner::{tokenize, StartTag, Token};
use crate::Attributes;
use serde::Serialize;

/// Which part of the markup an occurrence starts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Text between tags, including script and style bodies
    ElementContent,
    Comment,
    TagName,
    AttributeName,
    AttributeValue,
    /// Inside a start tag but outside its name and attributes
    TagBody,
    EndTag,
}

/// One occurrence of the target string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlContext {
    pub target: String,
    pub start: usize,
    pub end: usize,
    pub location: Location,
    /// The tag the occurrence sits in, or the innermost open element
    pub parent_tag: Option<String>,
    /// Attributes of `parent_tag`
    pub tag_attributes: Attributes,
    pub tag_attribute: Option<String>,
    pub tag_attribute_value: Option<String>,
    /// Quote around the attribute value; `None` when unquoted
    pub surrounding_quote: Option<char>,
    /// Event handler (`on*`) or `javascript:` URL
    pub in_script_attribute: bool,
}

impl HtmlContext {
    pub fn in_element_content(&self) -> bool {
        self.location == Location::ElementContent
    }

    pub fn in_comment(&self) -> bool {
        self.location == Location::Comment
    }

    pub fn in_attribute_name(&self) -> bool {
        self.location == Location::AttributeName
    }

    pub fn in_attribute_value(&self) -> bool {
        self.location == Location::AttributeValue
    }

    /// Whether the occurrence is inside a start tag
    pub fn in_tag(&self) -> bool {
        matches!(
            self.location,
            Location::TagName
                | Location::AttributeName
                | Location::AttributeValue
                | Location::TagBody
        )
    }
}

fn is_void_element(name: &str) -> bool {
    const VOID: [&str; 14] = [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ];
    VOID.iter().any(|v| name.eq_ignore_ascii_case(v))
}

fn is_script_attribute(attr: &RawAttribute<'_>) -> bool {
    let name = attr.name.as_bytes();
    let handler = name.len() > 2 && name[..2].eq_ignore_ascii_case(b"on");
    let url = attr.value.is_some_and(|v| {
        v.trim_start()
            .get(..11)
            .is_some_and(|p| p.eq_ignore_ascii_case("javascript:"))
    });
    handler || url
}

fn apply<'t>(token: &'t Token<'_>, open: &mut Vec<&'t StartTag<'t>>) {
    match token {
        Token::Start(start) => {
            if !start.tag.self_closing && !is_void_element(&start.tag.name) {
                open.push(start);
            }
        }
        Token::End { name, .. } => {
            if let Some(idx) = open
                .iter()
                .rposition(|s| s.tag.name.eq_ignore_ascii_case(name))
            {
                open.truncate(idx);
            }
        }
        Token::Comment { .. } => {}
    }
}

struct Occurrence<'a> {
    target: &'a str,
    start: usize,
}

impl Occurrence<'_> {
    fn context(&self, location: Location, parent: Option<&StartTag<'_>>) -> HtmlContext {
        HtmlContext {
            target: self.target.to_string(),
            start: self.start,
            end: self.start + self.target.len(),
            location,
            parent_tag: parent.map(|p| p.tag.name.clone()),
            tag_attributes: parent.map(|p| p.tag.attributes.clone()).unwrap_or_default(),
            tag_attribute: None,
            tag_attribute_value: None,
            surrounding_quote: None,
            in_script_attribute: false,
        }
    }

    fn in_start_tag(&self, tag: &StartTag<'_>) -> HtmlContext {
        let pos = self.start;
        let Some(attr) = tag.attributes.iter().find(|a| a.span.contains(&pos)) else {
            let location = if tag.name_span.contains(&pos) {
                Location::TagName
            } else {
                Location::TagBody
            };
            return self.context(location, Some(tag));
        };

        let in_value = attr.value_span.as_ref().is_some_and(|v| v.contains(&pos));
        let location = if in_value {
            Location::AttributeValue
        } else {
            Location::AttributeName
        };

        HtmlContext {
            tag_attribute: Some(attr.name.to_string()),
            tag_attribute_value: attr.value.map(str::to_string),
            surrounding_quote: if in_value { attr.quote } else { None },
            in_script_attribute: is_script_attribute(attr),
            ..self.context(location, Some(tag))
        }
    }
}

/// Every non-overlapping occurrence of `target` with its surroundings
pub fn contexts(text: &str, target: &str) -> Vec<HtmlContext> {
    if target.is_empty() {
        return Vec::new();
    }

    let tokens = tokenize(text);
    let mut open: Vec<&StartTag<'_>> = Vec::new();
    let mut next = 0;
    let mut found = Vec::new();

    for (start, _) in text.match_indices(target) {
        while next < tokens.len() && tokens[next].span().end <= start {
            apply(&tokens[next], &mut open);
            next += 1;
        }

        let occurrence = Occurrence { target, start };
        let parent = open.last().copied();
        let context = match tokens.get(next).filter(|t| t.span().start <= start) {
            Some(Token::Start(tag)) => occurrence.in_start_tag(tag),
            Some(Token::Comment { .. }) => occurrence.context(Location::Comment, parent),
            Some(Token::End { .. }) => occurrence.context(Location::EndTag, parent),
            None => occurrence.context(Location::ElementContent, parent),
        };
        tracing::trace!(start, location = ?context.location, "occurrence");
        found.push(context);
    }

    tracing::debug!(needle = target, count = found.len(), "located occurrences");
    found
}

//! Linear tag scanner
//!
//! Known limitations (intentional):
//! - A `>` inside a quoted attribute value ends the tag.
//! - A `<` before the closing `>` ends the tag there; the tag is kept but
//!   marked as not closed.
//! - Only `script` and `style` are treated as raw text.

use crate::attributes::{to_map, tokenize_attributes, RawAttribute};
use crate::{Tag, TagMap};
use memchr::{memchr, memchr2};
use std::ops::Range;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// A start tag with the positions the context locator needs
#[derive(Debug, Clone)]
pub(crate) struct StartTag<'a> {
    pub tag: Tag,
    pub name_span: Range<usize>,
    pub attributes: Vec<RawAttribute<'a>>,
}

#[derive(Debug, Clone)]
pub(crate) enum Token<'a> {
    Start(StartTag<'a>),
    End { name: &'a str, span: Range<usize> },
    Comment { span: Range<usize> },
}

impl Token<'_> {
    pub fn span(&self) -> &Range<usize> {
        match self {
            Token::Start(start) => &start.tag.span,
            Token::End { span, .. } | Token::Comment { span } => span,
        }
    }
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

/// Position of `</name` at or after `from`, ignoring ASCII case
fn find_close_tag(bytes: &[u8], from: usize, name: &str) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        i += memchr(b'<', &bytes[i..])?;
        if bytes.get(i + 1) == Some(&b'/')
            && starts_with_ignore_ascii_case_at(bytes, i + 2, name.as_bytes())
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn find_str(text: &str, from: usize, needle: &str) -> Option<usize> {
    text[from..].find(needle).map(|p| from + p)
}

fn is_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/'
}

/// Tokenize start tags, end tags and comments in document order
pub(crate) fn tokenize(text: &str) -> Vec<Token<'_>> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while let Some(rel) = memchr(b'<', &bytes[i..]) {
        let start = i + rel;

        if text[start..].starts_with(COMMENT_START) {
            let end = find_str(text, start + COMMENT_START.len(), COMMENT_END)
                .map(|p| p + COMMENT_END.len())
                .unwrap_or(len);
            tokens.push(Token::Comment { span: start..end });
            i = end;
            continue;
        }

        let body_start = start + 1;
        let (body_end, closed) = match memchr2(b'>', b'<', &bytes[body_start..]) {
            Some(rel) => {
                let p = body_start + rel;
                (p, bytes[p] == b'>')
            }
            None => (len, false),
        };
        let next = if closed { body_end + 1 } else { body_end };
        i = next;

        let body = &text[body_start..body_end];
        let Some(&first) = body.as_bytes().first() else {
            continue;
        };

        if first == b'/' {
            let name = body[1..]
                .split(|c: char| c.is_ascii_whitespace())
                .next()
                .unwrap_or_default();
            if !name.is_empty() {
                tokens.push(Token::End {
                    name,
                    span: start..next,
                });
            }
            continue;
        }

        // Declarations, processing instructions and stray `<`
        if !first.is_ascii_alphanumeric() {
            continue;
        }

        let start_tag = parse_start_tag(body, body_start, start..next, closed);
        tracing::trace!(name = %start_tag.tag.name, closed, "start tag");

        if closed && !start_tag.tag.self_closing {
            if let Some(raw) = RAW_TEXT_ELEMENTS
                .iter()
                .find(|n| start_tag.tag.name.eq_ignore_ascii_case(n))
            {
                i = find_close_tag(bytes, i, raw).unwrap_or(len);
            }
        }

        tokens.push(Token::Start(start_tag));
    }

    tokens
}

fn parse_start_tag(
    body: &str,
    body_start: usize,
    span: Range<usize>,
    closed: bool,
) -> StartTag<'_> {
    let name_end = body
        .bytes()
        .position(is_name_end)
        .unwrap_or(body.len());
    let name = &body[..name_end];

    let rest = &body[name_end..];
    let trimmed = rest.trim_end();
    let self_closing = closed && trimmed.ends_with('/');
    let attr_text = if self_closing {
        &trimmed[..trimmed.len() - 1]
    } else {
        rest
    };

    let mut attributes = tokenize_attributes(attr_text, body_start + name_end);
    if !closed {
        // Bare words in an unterminated tag are most likely spilled text
        attributes.retain(|a| a.value.is_some());
    }

    StartTag {
        tag: Tag {
            name: name.to_string(),
            attributes: to_map(&attributes),
            span,
            closed,
            self_closing,
        },
        name_span: body_start..body_start + name_end,
        attributes,
    }
}

/// Every start tag in document order
pub fn scan_tags(text: &str) -> Vec<Tag> {
    tokenize(text)
        .into_iter()
        .filter_map(|token| match token {
            Token::Start(start) => Some(start.tag),
            _ => None,
        })
        .collect()
}

/// Tag name → attributes for every start tag; a repeated name keeps the
/// attributes of its last occurrence
pub fn extract_tags(text: &str) -> TagMap {
    let tags: TagMap = scan_tags(text)
        .into_iter()
        .map(|tag| (tag.name, tag.attributes))
        .collect();
    tracing::debug!(distinct = tags.len(), "extracted tags");
    tags
}

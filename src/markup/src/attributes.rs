//! Attribute string parsing
//!
//! Accepts `name=value` pairs separated by whitespace, where the value is
//! double quoted, single quoted or bare. Whitespace around `=` is allowed.
//! A name without `=` is a presence-only attribute. Nothing here fails:
//! a dangling `=` yields an empty value and an unterminated quote runs to
//! the end of the input.

use crate::Attributes;
use memchr::memchr;
use std::ops::Range;

/// One attribute with byte positions relative to the scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawAttribute<'a> {
    pub name: &'a str,
    /// `None` for presence-only attributes
    pub value: Option<&'a str>,
    pub quote: Option<char>,
    /// From the first byte of the name to the end of the value
    pub span: Range<usize>,
    pub value_span: Option<Range<usize>>,
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Split `text` into attributes; spans are offset by `base`
pub(crate) fn tokenize_attributes(text: &str, base: usize) -> Vec<RawAttribute<'_>> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut i = 0;

    loop {
        i = skip_whitespace(bytes, i);
        if i >= len {
            break;
        }
        if bytes[i] == b'=' {
            // Stray `=` with no name in front of it
            i += 1;
            continue;
        }

        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        let name = &text[name_start..i];

        let mut j = skip_whitespace(bytes, i);
        if j >= len || bytes[j] != b'=' {
            out.push(RawAttribute {
                name,
                value: None,
                quote: None,
                span: base + name_start..base + i,
                value_span: None,
            });
            continue;
        }

        j = skip_whitespace(bytes, j + 1);
        let (value_start, value_end, end, quote) = match bytes.get(j) {
            None => (j, j, j, None),
            Some(&q) if q == b'"' || q == b'\'' => {
                let start = j + 1;
                match memchr(q, &bytes[start..]) {
                    Some(rel) => (start, start + rel, start + rel + 1, Some(q as char)),
                    None => (start, len, len, Some(q as char)),
                }
            }
            Some(_) => {
                let start = j;
                while j < len && !bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                (start, j, j, None)
            }
        };

        out.push(RawAttribute {
            name,
            value: Some(&text[value_start..value_end]),
            quote,
            span: base + name_start..base + end,
            value_span: Some(base + value_start..base + value_end),
        });
        i = end;
    }

    out
}

/// Collect attributes into a map; a repeated name keeps its last value
pub(crate) fn to_map<'a, I>(attrs: I) -> Attributes
where
    I: IntoIterator<Item = &'a RawAttribute<'a>>,
{
    attrs
        .into_iter()
        .map(|a| (a.name.to_string(), a.value.unwrap_or_default().to_string()))
        .collect()
}

/// Parse an isolated attribute string such as ` onclick = "x" n=''`
pub fn parse_attributes(text: &str) -> Attributes {
    to_map(&tokenize_attributes(text, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_values() {
        let attrs = parse_attributes(" onclick = \"alert(100)\" accesskey = \"x\" n=\"\"");
        assert_eq!(attrs.get("onclick").map(String::as_str), Some("alert(100)"));
        assert_eq!(attrs.get("accesskey").map(String::as_str), Some("x"));
        assert_eq!(attrs.get("n").map(String::as_str), Some(""));
        assert_eq!(attrs.len(), 3);
    }

    #[test]
    fn test_unquoted_and_empty_values() {
        let attrs = parse_attributes(" onclick = alert(100) accesskey = x n=\"\" bac = ''");
        assert_eq!(attrs.get("onclick").map(String::as_str), Some("alert(100)"));
        assert_eq!(attrs.get("accesskey").map(String::as_str), Some("x"));
        assert_eq!(attrs.get("n").map(String::as_str), Some(""));
        assert_eq!(attrs.get("bac").map(String::as_str), Some(""));
        assert_eq!(attrs.len(), 4);
    }

    #[test]
    fn test_presence_only_attribute() {
        let attrs = parse_attributes("disabled class=\"btn\" hidden");
        assert_eq!(attrs.get("disabled").map(String::as_str), Some(""));
        assert_eq!(attrs.get("hidden").map(String::as_str), Some(""));
        assert_eq!(attrs.get("class").map(String::as_str), Some("btn"));
    }

    #[test]
    fn test_nested_quotes_of_other_style() {
        let attrs = parse_attributes("onclick=\"alert('1')\" data='{\"k\": \"v\"}'");
        assert_eq!(attrs.get("onclick").map(String::as_str), Some("alert('1')"));
        assert_eq!(attrs.get("data").map(String::as_str), Some("{\"k\": \"v\"}"));
    }

    #[test]
    fn test_malformed_input_does_not_fail() {
        let attrs = parse_attributes("a=");
        assert_eq!(attrs.get("a").map(String::as_str), Some(""));

        let attrs = parse_attributes("a = \"unterminated value");
        assert_eq!(attrs.get("a").map(String::as_str), Some("unterminated value"));

        let attrs = parse_attributes(" = = x");
        assert_eq!(attrs.get("x").map(String::as_str), Some(""));

        assert!(parse_attributes("").is_empty());
        assert!(parse_attributes("   \t\n").is_empty());
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let attrs = parse_attributes("ID=a id=b");
        assert_eq!(attrs.get("ID").map(String::as_str), Some("a"));
        assert_eq!(attrs.get("id").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_repeated_name_keeps_last() {
        let attrs = parse_attributes("a=1 a=2");
        assert_eq!(attrs.get("a").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_spans() {
        let attrs = tokenize_attributes(" id='x' on", 10);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].span, 11..17);
        assert_eq!(attrs[0].value_span, Some(15..16));
        assert_eq!(attrs[0].quote, Some('\''));
        assert_eq!(attrs[1].span, 18..20);
        assert_eq!(attrs[1].value, None);
    }

    #[test]
    fn test_non_ascii_values() {
        let attrs = parse_attributes("title=\"héllo wörld\" alt=日本");
        assert_eq!(attrs.get("title").map(String::as_str), Some("héllo wörld"));
        assert_eq!(attrs.get("alt").map(String::as_str), Some("日本"));
    }
}

//! ViewState command handlers
//!
//! Handles the `viewstate`, `object` and `page` subcommands.

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::file_io;
use anyhow::{bail, Context, Result};
use markup::scan_tags;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use viewstate::{decode_cursor, join_split, standard_registry, Cursor, ViewState};

const VIEWSTATE_FIELD: &str = "__VIEWSTATE";
const FIELD_COUNT: &str = "__VIEWSTATEFIELDCOUNT";

/// Handle `viewstate` command
pub fn value(
    value: Option<String>,
    file: Option<&Path>,
    format: Option<OutputFormat>,
    max_depth: Option<usize>,
) -> Result<()> {
    let config = Config::load()?;
    let encoded = match value {
        Some(value) => value,
        None => file_io::read_text(file)?,
    };

    let state = decode_value(&encoded, config.max_depth(max_depth))?;
    print!("{}", render(&state, config.format(format))?);
    Ok(())
}

fn decode_value(encoded: &str, max_depth: usize) -> Result<ViewState> {
    ViewState::decode_with(encoded, standard_registry(), max_depth)
        .context("Failed to decode ViewState")
}

fn render(state: &ViewState, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Xml => Ok(state.to_xml()),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(state).context("Failed to serialize ViewState")?;
            Ok(json + "\n")
        }
    }
}

/// Handle `object` command
pub fn object(hex: &str, pretty: Option<bool>, max_depth: Option<usize>) -> Result<()> {
    let config = Config::load()?;
    let bytes = file_io::parse_hex(hex)?;
    print!(
        "{}",
        render_object(&bytes, config.pretty(pretty), config.max_depth(max_depth))?
    );
    Ok(())
}

fn render_object(bytes: &[u8], pretty: bool, max_depth: usize) -> Result<String> {
    let mut cursor = Cursor::new(bytes).with_max_depth(max_depth);
    let decoded =
        decode_cursor(standard_registry(), &mut cursor).context("Failed to decode object")?;

    if decoded.consumed < bytes.len() {
        tracing::warn!(
            consumed = decoded.consumed,
            trailing = bytes.len() - decoded.consumed,
            "bytes left after object"
        );
    }

    Ok(if pretty {
        decoded.fragment.render_pretty(0)
    } else {
        decoded.fragment.render() + "\n"
    })
}

/// A ViewState found in the hidden fields of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageViewState {
    pub value: String,
    pub split: bool,
    /// Number of fields the value was spread across
    pub fields: usize,
}

/// Hidden fields keyed by `id`, falling back to `name`
fn hidden_fields(html: &str) -> BTreeMap<String, String> {
    scan_tags(html)
        .into_iter()
        .filter(|tag| {
            tag.is("input")
                || tag
                    .attribute("name")
                    .is_some_and(|n| n.starts_with(VIEWSTATE_FIELD))
        })
        .filter_map(|tag| {
            let key = tag.attribute("id").or_else(|| tag.attribute("name"))?;
            let value = tag.attribute("value").unwrap_or_default();
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Locate the ViewState in a page, joining split fields when needed
pub fn find_viewstate(html: &str) -> Result<Option<PageViewState>> {
    let fields = hidden_fields(html);

    let Some(first) = fields.get(VIEWSTATE_FIELD) else {
        return Ok(None);
    };

    let Some(count) = fields.get(FIELD_COUNT) else {
        return Ok(Some(PageViewState {
            value: first.clone(),
            split: false,
            fields: 1,
        }));
    };

    let count: usize = count
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} value: {:?}", FIELD_COUNT, count))?;

    let mut parts = vec![first.as_str()];
    for i in 1..count {
        let key = format!("{}{}", VIEWSTATE_FIELD, i);
        let part = fields
            .get(&key)
            .with_context(|| format!("Split ViewState is missing field {}", key))?;
        parts.push(part);
    }

    tracing::debug!(fields = parts.len(), "reassembled split ViewState");

    Ok(Some(PageViewState {
        fields: parts.len(),
        value: join_split(parts),
        split: true,
    }))
}

#[derive(Serialize)]
struct PageReport<'a> {
    split: bool,
    fields: usize,
    viewstate: &'a ViewState,
}

/// Handle `page` command
pub fn page(
    input: Option<&Path>,
    format: Option<OutputFormat>,
    max_depth: Option<usize>,
) -> Result<()> {
    let config = Config::load()?;
    let html = file_io::read_text(input)?;

    let Some(found) = find_viewstate(&html)? else {
        bail!("No {} field found", VIEWSTATE_FIELD);
    };

    let state = decode_value(&found.value, config.max_depth(max_depth))?;

    match config.format(format) {
        OutputFormat::Xml => {
            if found.split {
                eprintln!("ViewState split across {} fields", found.fields);
            }
            print!("{}", state.to_xml());
        }
        OutputFormat::Json => {
            let report = PageReport {
                split: found.split,
                fields: found.fields,
                viewstate: &state,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ff 01, pair(uint32 5, "hi")
    const ENCODED: &str = "/wEPAgUFAmhp";

    #[test]
    fn test_decode_and_render() {
        let state = decode_value(ENCODED, 64).unwrap();
        let xml = render(&state, OutputFormat::Xml).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" ?>\n<viewstate>\n"));
        assert!(xml.contains("      <uint32>5</uint32>\n"));

        let json = render(&state, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "AspNet2");
        assert!(value["mac"].is_null());
    }

    #[test]
    fn test_decode_error_has_context() {
        let err = decode_value("!!!", 64).unwrap_err();
        assert!(format!("{:#}", err).starts_with("Failed to decode ViewState"));
    }

    #[test]
    fn test_render_object() {
        let bytes = [0x03, 0x02, 0x67, 0x68];
        assert_eq!(
            render_object(&bytes, false, 64).unwrap(),
            "<booleanarray size=\"2\"><boolean>true</boolean><boolean>false</boolean></booleanarray>\n"
        );
        let pretty = render_object(&bytes, true, 64).unwrap();
        assert!(pretty.starts_with("<booleanarray size=\"2\">\n"));
        assert!(pretty.contains("   <boolean>true</boolean>\n"));
    }

    #[test]
    fn test_render_object_depth_limit() {
        let bytes = [0x0F, 0x0F, 0x67, 0x68, 0x67];
        assert!(render_object(&bytes, false, 64).is_ok());
        assert!(render_object(&bytes, false, 1).is_err());
    }

    #[test]
    fn test_find_single_viewstate() {
        let html = format!(
            "<form><input type=\"hidden\" name=\"__VIEWSTATE\" id=\"__VIEWSTATE\" value=\"{}\" /></form>",
            ENCODED
        );
        let found = find_viewstate(&html).unwrap().unwrap();
        assert_eq!(found.value, ENCODED);
        assert!(!found.split);
        assert_eq!(found.fields, 1);
    }

    #[test]
    fn test_find_split_viewstate() {
        let (a, rest) = ENCODED.split_at(4);
        let (b, c) = rest.split_at(4);
        let html = format!(
            "<input type=hidden name=__VIEWSTATEFIELDCOUNT value=3>\
             <input type=hidden name=__VIEWSTATE value='{}'>\
             <input type=hidden id=__VIEWSTATE1 value='{}'>\
             <input type=hidden name=__VIEWSTATE2 value='{}'>",
            a, b, c
        );
        let found = find_viewstate(&html).unwrap().unwrap();
        assert!(found.split);
        assert_eq!(found.fields, 3);
        assert_eq!(found.value, ENCODED);
        assert!(decode_value(&found.value, 64).is_ok());
    }

    #[test]
    fn test_missing_split_part() {
        let html = "<input name=__VIEWSTATEFIELDCOUNT value=2><input name=__VIEWSTATE value=abcd>";
        let err = find_viewstate(html).unwrap_err();
        assert!(err.to_string().contains("__VIEWSTATE1"));

        let html =
            "<input name=__VIEWSTATEFIELDCOUNT value=many><input name=__VIEWSTATE value=abcd>";
        assert!(find_viewstate(html).is_err());
    }

    #[test]
    fn test_page_without_viewstate() {
        assert_eq!(find_viewstate("<input name=q value=x>").unwrap(), None);
        assert_eq!(find_viewstate("").unwrap(), None);
    }
}

//! Markup inspection command handlers
//!
//! Handles the `tags`, `attrs` and `context` subcommands. All output is JSON.

use crate::file_io;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

fn tags_json(html: &str, all: bool) -> Result<String> {
    if all {
        to_json(&markup::scan_tags(html))
    } else {
        to_json(&markup::extract_tags(html))
    }
}

/// Handle `tags` command
pub fn tags(input: Option<&Path>, all: bool) -> Result<()> {
    let html = file_io::read_text(input)?;
    println!("{}", tags_json(&html, all)?);
    Ok(())
}

/// Handle `attrs` command
pub fn attrs(text: &str) -> Result<()> {
    println!("{}", to_json(&markup::parse_attributes(text))?);
    Ok(())
}

/// Handle `context` command
pub fn context(target: &str, input: Option<&Path>) -> Result<()> {
    let html = file_io::read_text(input)?;
    let found = markup::contexts(&html, target);
    if found.is_empty() {
        eprintln!("No occurrences of {:?}", target);
    }
    println!("{}", to_json(&found)?);
    Ok(())
}

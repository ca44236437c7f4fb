//! Core CLI definitions

use clap::{ArgAction, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for decoded ViewStates
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
}

#[derive(Parser)]
#[command(name = "pscan")]
#[command(about = "ViewState decoder and lenient markup inspector", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a Base64 ViewState value
    #[command(visible_alias = "vs")]
    Viewstate {
        /// Encoded value (reads --file or stdin if not provided)
        value: Option<String>,

        /// Read the encoded value from a file
        #[arg(short, long, conflicts_with = "value")]
        file: Option<PathBuf>,

        /// Output format (uses configured default if not provided)
        #[arg(short = 'o', long, value_enum)]
        format: Option<OutputFormat>,

        /// Maximum nesting depth
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Decode a single tagged object from hex bytes
    #[command(visible_alias = "obj")]
    Object {
        /// Hex bytes, whitespace allowed (e.g. "03 02 67 68")
        hex: String,

        /// Indent the output (uses configured default if not provided)
        #[arg(long)]
        pretty: Option<bool>,

        /// Maximum nesting depth
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Find and decode the ViewState in an HTML page
    #[command(visible_alias = "p")]
    Page {
        /// HTML file (reads stdin if not provided)
        input: Option<PathBuf>,

        /// Output format (uses configured default if not provided)
        #[arg(short = 'o', long, value_enum)]
        format: Option<OutputFormat>,

        /// Maximum nesting depth
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// List start tags and their attributes as JSON
    #[command(visible_alias = "t")]
    Tags {
        /// HTML file (reads stdin if not provided)
        input: Option<PathBuf>,

        /// Every occurrence in document order instead of a name map
        #[arg(short, long)]
        all: bool,
    },

    /// Parse an attribute string as JSON
    #[command(visible_alias = "a")]
    Attrs {
        /// Attribute text (e.g. "onclick = \"x\" n=''")
        text: String,
    },

    /// Show where a string appears in an HTML document
    #[command(visible_alias = "ctx")]
    Context {
        /// String to look for
        target: String,

        /// HTML file (reads stdin if not provided)
        input: Option<PathBuf>,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default nesting limit
        #[arg(long)]
        max_depth: Option<usize>,

        /// Set default output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Set whether objects are indented by default
        #[arg(long)]
        pretty: Option<bool>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_viewstate() {
        let cli =
            Cli::try_parse_from(["pscan", "-v", "viewstate", "/wEPDw==", "-o", "json"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Viewstate { value, format, .. } => {
                assert_eq!(value.as_deref(), Some("/wEPDw=="));
                assert_eq!(format, Some(OutputFormat::Json));
            }
            _ => panic!("expected viewstate command"),
        }
    }

    #[test]
    fn test_parse_object_alias() {
        let cli =
            Cli::try_parse_from(["pscan", "obj", "03 02 67 68", "--pretty", "false"]).unwrap();
        match cli.command {
            Commands::Object { hex, pretty, .. } => {
                assert_eq!(hex, "03 02 67 68");
                assert_eq!(pretty, Some(false));
            }
            _ => panic!("expected object command"),
        }
    }

    #[test]
    fn test_value_and_file_conflict() {
        assert!(Cli::try_parse_from(["pscan", "viewstate", "abc", "--file", "x"]).is_err());
    }
}

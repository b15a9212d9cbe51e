use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

use crate::loader::TranscriptMode;

#[derive(Parser)]
#[command(
    name = "supadata-loader",
    about = "Supadata Loader - Fetch transcripts and metadata for social media videos as documents",
    version,
    long_about = "Fetch transcripts or structured metadata for YouTube, TikTok, Instagram, Facebook and Twitter/X video/post URLs through the Supadata API, and print them as documents ready for indexing."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a config file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Supadata API key (falls back to the config file, then SUPADATA_API_KEY)
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the transcript of a video/post
    Transcript {
        /// Video or post URL
        #[arg(value_name = "URL")]
        url: String,

        /// Preferred transcript language (ISO 639-1)
        #[arg(short, long, value_name = "LANG")]
        lang: Option<String>,

        /// Transcript mode
        #[arg(short, long, value_enum)]
        mode: Option<TranscriptMode>,

        /// Request a plain text transcript, overriding the config file
        #[arg(long, conflicts_with = "no_text")]
        text: bool,

        /// Request timestamped chunks instead of plain text
        #[arg(long)]
        no_text: bool,

        /// Extra request parameter, e.g. --param chunkSize=500
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, Value)>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Fetch structured metadata of a video/post
    Metadata {
        /// Video or post URL
        #[arg(value_name = "URL")]
        url: String,

        /// Extra request parameter, e.g. --param key=value
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, Value)>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },

    /// List supported platforms
    Platforms,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Document content only
    Text,
    /// Documents with metadata as JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Plain-text setting from the `--text`/`--no-text` flags, falling back to the configured default
pub fn resolve_text(text: bool, no_text: bool, default: bool) -> bool {
    match (text, no_text) {
        (true, _) => true,
        (_, true) => false,
        _ => default,
    }
}

/// Parse `key=value`; the value is read as JSON when possible, else as a string
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", raw))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in `{}`", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

//! Supadata Loader - turn social media video/post URLs into documents
//!
//! This library fetches transcripts or structured metadata for YouTube, TikTok,
//! Instagram, Facebook and Twitter/X URLs through the Supadata extraction service
//! and normalizes the response into a [`Document`] for retrieval pipelines.

pub mod cli;
pub mod client;
pub mod config;
pub mod credentials;
pub mod document;
pub mod loader;
pub mod output;
pub mod platform;

pub use cli::{Cli, Commands, OutputFormat};
pub use client::{
    ClientCapabilities, ClientFactory, ExtractionClient, HttpClientFactory, MetadataRoute,
    Payload, RemoteError, TranscriptChunk, TranscriptContent, TranscriptResponse,
};
pub use config::Config;
pub use credentials::{ConfigProvider, CredentialResolver, EnvConfigProvider, API_KEY_ENV_VAR};
pub use document::{Document, SupadataOperation};
pub use loader::{LoadRequest, LoaderConfig, Operation, SupadataLoader, TranscriptMode};
pub use platform::{classify, Classification, Platform};

/// Result type used by the application plumbing (config, output, CLI)
pub type Result<T> = anyhow::Result<T>;

/// Result type returned by [`SupadataLoader::load`]
pub type LoadResult<T> = std::result::Result<T, LoaderError>;

/// Error types surfaced by the loader
#[derive(thiserror::Error, Debug)]
pub enum LoaderError {
    #[error("Invalid load request: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

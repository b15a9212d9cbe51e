use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::platform::Classification;

pub mod http;

pub use http::{HttpClientFactory, HttpExtractionClient};

/// Request payload sent to the extraction service
pub type Payload = Map<String, Value>;

/// Failures raised by the extraction service or its transport
#[derive(thiserror::Error, Debug)]
pub enum RemoteError {
    #[error("Supadata request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Supadata API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode Supadata response: {0}")]
    Decode(String),

    #[error("Invalid Supadata base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Timestamped transcript segment, returned when plain text is not requested
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptChunk {
    pub text: String,

    /// Start offset in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,

    /// Duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl TranscriptChunk {
    fn to_value(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("text".to_string(), Value::String(self.text.clone()));
        if let Some(offset) = self.offset.and_then(serde_json::Number::from_f64) {
            fields.insert("offset".to_string(), Value::Number(offset));
        }
        if let Some(duration) = self.duration.and_then(serde_json::Number::from_f64) {
            fields.insert("duration".to_string(), Value::Number(duration));
        }
        if let Some(lang) = &self.lang {
            fields.insert("lang".to_string(), Value::String(lang.clone()));
        }
        Value::Object(fields)
    }
}

/// Transcript body: plain text, or chunks when `text` is false
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptContent {
    Text(String),
    Chunks(Vec<TranscriptChunk>),
}

impl TranscriptContent {
    /// Text for a document body. Chunks are rendered as indented JSON so their
    /// timestamps survive.
    pub fn into_page_content(self) -> String {
        match self {
            TranscriptContent::Text(text) => text,
            TranscriptContent::Chunks(chunks) => {
                let chunks = chunks.iter().map(TranscriptChunk::to_value).collect();
                format!("{:#}", Value::Array(chunks))
            }
        }
    }
}

impl From<&str> for TranscriptContent {
    fn from(text: &str) -> Self {
        TranscriptContent::Text(text.to_string())
    }
}

/// Response of the transcript endpoint
///
/// Either carries the transcript directly or a job id when the service is
/// still generating it asynchronously.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResponse {
    #[serde(default)]
    pub content: Option<TranscriptContent>,

    #[serde(default)]
    pub lang: Option<String>,

    #[serde(default)]
    pub job_id: Option<String>,

    #[serde(default)]
    pub available_langs: Vec<String>,
}

impl TranscriptResponse {
    /// Job id of a pending extraction, ignoring empty ids
    pub fn pending_job(&self) -> Option<&str> {
        self.job_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Metadata operations a client is able to serve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientCapabilities {
    pub generic_metadata: bool,
    pub youtube_video: bool,
}

/// Which client operation answers a metadata request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataRoute {
    GenericMetadata,
    YoutubeVideo,
    None,
}

impl MetadataRoute {
    /// Pick the route for a URL. Generic metadata wins; the YouTube video
    /// endpoint is only a fallback for YouTube URLs.
    pub fn resolve(capabilities: ClientCapabilities, classification: &Classification) -> Self {
        if capabilities.generic_metadata {
            MetadataRoute::GenericMetadata
        } else if classification.is_youtube() && capabilities.youtube_video {
            MetadataRoute::YoutubeVideo
        } else {
            MetadataRoute::None
        }
    }
}

/// Client for the extraction service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Fetch a transcript, or a job id if extraction runs asynchronously
    async fn transcript(&self, payload: &Payload) -> Result<TranscriptResponse, RemoteError>;

    /// Metadata operations this client exposes
    fn capabilities(&self) -> ClientCapabilities;

    /// Fetch platform-agnostic metadata for a post or video
    async fn metadata(&self, payload: &Payload) -> Result<Value, RemoteError>;

    /// Fetch YouTube video information
    async fn youtube_video(&self, payload: &Payload) -> Result<Value, RemoteError>;
}

/// Creates clients bound to an API key
#[cfg_attr(test, mockall::automock)]
pub trait ClientFactory: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<Box<dyn ExtractionClient>, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::classify;

    #[test]
    fn test_route_prefers_generic_metadata() {
        let caps = ClientCapabilities {
            generic_metadata: true,
            youtube_video: true,
        };
        let route = MetadataRoute::resolve(caps, &classify("https://youtu.be/abc"));
        assert_eq!(route, MetadataRoute::GenericMetadata);
    }

    #[test]
    fn test_route_youtube_fallback() {
        let caps = ClientCapabilities {
            generic_metadata: false,
            youtube_video: true,
        };
        assert_eq!(
            MetadataRoute::resolve(caps, &classify("https://www.youtube.com/watch?v=1")),
            MetadataRoute::YoutubeVideo
        );
        assert_eq!(
            MetadataRoute::resolve(caps, &classify("https://www.tiktok.com/@a/video/1")),
            MetadataRoute::None
        );
    }

    #[test]
    fn test_route_without_capabilities() {
        let route = MetadataRoute::resolve(
            ClientCapabilities::default(),
            &classify("https://www.youtube.com/watch?v=1"),
        );
        assert_eq!(route, MetadataRoute::None);
    }

    #[test]
    fn test_transcript_response_shapes() {
        let content: TranscriptResponse =
            serde_json::from_str(r#"{"content":"Hello world","lang":"en","availableLangs":["en","de"]}"#)
                .unwrap();
        assert_eq!(content.content, Some(TranscriptContent::from("Hello world")));
        assert_eq!(content.available_langs, vec!["en", "de"]);
        assert_eq!(content.pending_job(), None);

        let job: TranscriptResponse = serde_json::from_str(r#"{"jobId":"abc123"}"#).unwrap();
        assert_eq!(job.pending_job(), Some("abc123"));

        let chunks: TranscriptResponse = serde_json::from_str(
            r#"{"content":[{"text":"Hello","offset":0,"duration":1000,"lang":"en"}],"lang":"en"}"#,
        )
        .unwrap();
        assert_eq!(
            chunks.content,
            Some(TranscriptContent::Chunks(vec![TranscriptChunk {
                text: "Hello".to_string(),
                offset: Some(0.0),
                duration: Some(1000.0),
                lang: Some("en".to_string()),
            }]))
        );

        let empty_job: TranscriptResponse = serde_json::from_str(r#"{"jobId":""}"#).unwrap();
        assert_eq!(empty_job.pending_job(), None);
    }

    #[test]
    fn test_chunks_render_as_json() {
        let content = TranscriptContent::Chunks(vec![
            TranscriptChunk {
                text: "Hello".to_string(),
                offset: Some(0.0),
                duration: Some(1000.0),
                lang: None,
            },
            TranscriptChunk {
                text: "world".to_string(),
                ..Default::default()
            },
        ]);

        let rendered = content.into_page_content();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0]["text"], "Hello");
        assert_eq!(parsed[0]["duration"], 1000.0);
        assert_eq!(parsed[1], serde_json::json!({"text": "world"}));
        assert!(rendered.contains('\n'));
    }
}

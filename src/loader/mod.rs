use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::Arc;

use crate::client::{
    ClientFactory, ExtractionClient, HttpClientFactory, MetadataRoute, Payload, TranscriptContent,
};
use crate::credentials::{ConfigProvider, CredentialResolver, EnvConfigProvider};
use crate::document::{Document, SupadataOperation};
use crate::platform::{self, Classification};
use crate::{LoadResult, LoaderError};

/// What to fetch for a URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Metadata,
    #[default]
    Transcript,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Metadata => "metadata",
            Operation::Transcript => "transcript",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metadata" => Ok(Operation::Metadata),
            "transcript" => Ok(Operation::Transcript),
            other => Err(LoaderError::Validation(format!(
                "unsupported operation \"{}\". Use \"metadata\" or \"transcript\".",
                other
            ))),
        }
    }
}

/// How the service obtains a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptMode {
    /// Only use captions already published with the video
    Native,
    /// Use native captions, generate one if none exist
    Auto,
    /// Always generate a transcript
    Generate,
}

impl TranscriptMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptMode::Native => "native",
            TranscriptMode::Auto => "auto",
            TranscriptMode::Generate => "generate",
        }
    }
}

/// Loader settings fixed at construction
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    pub api_key: Option<String>,
}

impl LoaderConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }
}

/// Parameters of a single `load` call
#[derive(Debug, Clone, Default)]
pub struct LoadRequest {
    pub url: String,

    /// Defaults to [`Operation::Transcript`]
    pub operation: Option<Operation>,

    /// Preferred transcript language
    pub lang: Option<String>,

    /// Return plain text instead of timestamped chunks (defaults to true)
    pub text: Option<bool>,

    pub mode: Option<TranscriptMode>,

    /// Extra request parameters passed through to the service
    pub params: Map<String, Value>,
}

impl LoadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_text(mut self, text: bool) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_mode(mut self, mode: TranscriptMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Payload for the transcript endpoint. Extra params override `url`/`text`,
    /// explicit `lang` and `mode` override extra params.
    fn transcript_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("url".to_string(), Value::String(self.url.clone()));
        payload.insert("text".to_string(), Value::Bool(self.text.unwrap_or(true)));
        payload.extend(self.params.clone());

        if let Some(lang) = self.lang.as_deref().filter(|lang| !lang.is_empty()) {
            payload.insert("lang".to_string(), Value::String(lang.to_string()));
        }
        if let Some(mode) = self.mode {
            payload.insert("mode".to_string(), Value::String(mode.as_str().to_string()));
        }

        payload
    }

    fn metadata_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("url".to_string(), Value::String(self.url.clone()));
        payload.extend(self.params.clone());
        payload
    }
}

/// Loads transcripts and metadata for social media URLs as [`Document`]s.
///
/// The loader holds no per-call state: every `load` resolves credentials and
/// connects a fresh client, so one instance can serve concurrent calls.
#[derive(Clone)]
pub struct SupadataLoader {
    config: LoaderConfig,
    resolver: CredentialResolver,
    factory: Arc<dyn ClientFactory>,
}

impl SupadataLoader {
    /// Loader backed by the Supadata REST API and the process environment
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(EnvConfigProvider),
            Arc::new(HttpClientFactory::default()),
        )
    }

    pub fn with_parts(
        config: LoaderConfig,
        provider: Arc<dyn ConfigProvider>,
        factory: Arc<dyn ClientFactory>,
    ) -> Self {
        Self {
            config,
            resolver: CredentialResolver::new(provider),
            factory,
        }
    }

    /// Replace the client factory, e.g. to point at another endpoint
    pub fn with_client_factory(mut self, factory: Arc<dyn ClientFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Load one URL. Returns exactly one document on success; any failure
    /// aborts the call.
    pub async fn load(&self, request: &LoadRequest) -> LoadResult<Vec<Document>> {
        if request.url.trim().is_empty() {
            return Err(LoaderError::Validation("`url` is required.".to_string()));
        }

        let classification = platform::classify(&request.url);
        if !classification.supported {
            return Err(LoaderError::Validation(format!(
                "only social media video/post URLs are supported ({}), got: {}",
                platform::supported_platforms_label(),
                request.url
            )));
        }

        let operation = request.operation.unwrap_or_default();
        tracing::info!(
            url = %request.url,
            platform = ?classification.platform,
            %operation,
            "Loading document"
        );

        let api_key = self.resolver.resolve(self.config.api_key.as_deref())?;
        let client = self.factory.connect(&api_key)?;

        let document = match operation {
            Operation::Transcript => load_transcript(client.as_ref(), request).await?,
            Operation::Metadata => load_metadata(client.as_ref(), request, &classification).await?,
        };

        Ok(vec![document])
    }
}

async fn load_transcript(client: &dyn ExtractionClient, request: &LoadRequest) -> LoadResult<Document> {
    let payload = request.transcript_payload();
    tracing::debug!(?payload, "Requesting transcript");

    let response = client.transcript(&payload).await?;

    if let Some(job_id) = response.pending_job() {
        tracing::warn!(url = %request.url, job_id, "Transcript is still processing");
        return Ok(Document::new(
            format!("Transcript processing. Job ID: {}", job_id),
            &request.url,
            SupadataOperation::TranscriptJob,
        )
        .with_metadata("jobId", job_id));
    }

    let content = response
        .content
        .map(TranscriptContent::into_page_content)
        .unwrap_or_default();
    let mut document = Document::new(
        content,
        &request.url,
        SupadataOperation::Transcript,
    );
    if let Some(lang) = response.lang.or_else(|| request.lang.clone()) {
        document = document.with_metadata("lang", lang);
    }

    Ok(document)
}

async fn load_metadata(
    client: &dyn ExtractionClient,
    request: &LoadRequest,
    classification: &Classification,
) -> LoadResult<Document> {
    let payload = request.metadata_payload();
    let route = MetadataRoute::resolve(client.capabilities(), classification);
    tracing::debug!(?route, "Requesting metadata");

    let result = match route {
        MetadataRoute::GenericMetadata => client.metadata(&payload).await?,
        MetadataRoute::YoutubeVideo => client.youtube_video(&payload).await?,
        MetadataRoute::None => {
            return Err(LoaderError::UnsupportedOperation(format!(
                "the extraction client exposes no metadata operation for {}",
                request.url
            )))
        }
    };

    // Alternate Display of a Value is the infallible pretty printer
    let content = format!("{:#}", result);

    Ok(Document::new(content, &request.url, SupadataOperation::Metadata))
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tag written to `metadata.supadataOperation`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupadataOperation {
    Metadata,
    Transcript,
    TranscriptJob,
}

impl SupadataOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupadataOperation::Metadata => "metadata",
            SupadataOperation::Transcript => "transcript",
            SupadataOperation::TranscriptJob => "transcript_job",
        }
    }
}

impl std::fmt::Display for SupadataOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text content plus metadata, the unit handed to indexing pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub page_content: String,
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Create a document for `source` tagged with the operation that produced it
    pub fn new(page_content: impl Into<String>, source: &str, operation: SupadataOperation) -> Self {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::String(source.to_string()));
        metadata.insert(
            "supadataOperation".to_string(),
            Value::String(operation.as_str().to_string()),
        );

        Self {
            page_content: page_content.into(),
            metadata,
        }
    }

    /// Add a metadata field
    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }

    pub fn operation(&self) -> Option<&str> {
        self.metadata.get("supadataOperation").and_then(Value::as_str)
    }
}

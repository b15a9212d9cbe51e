use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::{ClientCapabilities, ClientFactory, ExtractionClient, Payload, RemoteError, TranscriptResponse};

/// Public Supadata REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.supadata.ai/v1";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const API_KEY_HEADER: &str = "x-api-key";

/// Supadata REST client
pub struct HttpExtractionClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpExtractionClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, RemoteError> {
        Url::parse(base_url).map_err(|e| RemoteError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("supadata-loader/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get(&self, path: &str, payload: &Payload) -> Result<Response, RemoteError> {
        let endpoint = format!("{}/{}", self.base_url, path);
        tracing::debug!("GET {}", endpoint);

        let response = self
            .client
            .get(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&query_pairs(payload))
            .send()
            .await?;

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, payload: &Payload) -> Result<T, RemoteError> {
        let response = self.get(path, payload).await?;
        decode(check_status(response).await?).await
    }
}

#[async_trait]
impl ExtractionClient for HttpExtractionClient {
    async fn transcript(&self, payload: &Payload) -> Result<TranscriptResponse, RemoteError> {
        let response = self.get("transcript", payload).await?;

        // 202 Accepted carries a job id instead of the transcript
        if response.status() == StatusCode::ACCEPTED {
            return decode(response).await;
        }

        decode(check_status(response).await?).await
    }

    fn capabilities(&self) -> ClientCapabilities {
        ClientCapabilities {
            generic_metadata: true,
            youtube_video: true,
        }
    }

    async fn metadata(&self, payload: &Payload) -> Result<Value, RemoteError> {
        self.get_json("metadata", payload).await
    }

    async fn youtube_video(&self, payload: &Payload) -> Result<Value, RemoteError> {
        // The video endpoint identifies the video by `id`, which accepts a full URL
        let mut payload = payload.clone();
        if !payload.contains_key("id") {
            if let Some(url) = payload.remove("url") {
                payload.insert("id".to_string(), url);
            }
        }

        self.get_json("youtube/video", &payload).await
    }
}

/// Builds [`HttpExtractionClient`]s for a fixed endpoint
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    base_url: String,
    timeout: Duration,
}

impl HttpClientFactory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }
}

impl ClientFactory for HttpClientFactory {
    fn connect(&self, api_key: &str) -> Result<Box<dyn ExtractionClient>, RemoteError> {
        Ok(Box::new(HttpExtractionClient::new(&self.base_url, api_key, self.timeout)?))
    }
}

/// Flatten a payload into query parameters
fn query_pairs(payload: &Payload) -> Vec<(String, String)> {
    payload
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => other.to_string(),
            };
            Some((key.clone(), value))
        })
        .collect()
}

async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
}

/// Pull the most useful message out of an error body
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "details"] {
            if let Some(message) = fields.get(key).and_then(Value::as_str) {
                if !message.is_empty() {
                    return message.to_string();
                }
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TranscriptContent;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    fn client_for(server: &MockServer) -> HttpExtractionClient {
        HttpExtractionClient::new(&server.uri(), "test-key", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_query_pairs() {
        let pairs = query_pairs(&payload(json!({
            "url": "https://youtu.be/abc",
            "text": true,
            "chunkSize": 500,
            "skip": null,
            "tags": ["a", "b"],
        })));

        assert!(pairs.contains(&("url".to_string(), "https://youtu.be/abc".to_string())));
        assert!(pairs.contains(&("text".to_string(), "true".to_string())));
        assert!(pairs.contains(&("chunkSize".to_string(), "500".to_string())));
        assert!(pairs.contains(&("tags".to_string(), r#"["a","b"]"#.to_string())));
        assert!(!pairs.iter().any(|(key, _)| key == "skip"));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, r#"{"error":"unauthorized","message":"Invalid API key"}"#),
            "Invalid API key"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpExtractionClient::new("not a url", "key", DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(RemoteError::InvalidBaseUrl(_))));
    }

    #[tokio::test]
    async fn test_transcript_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transcript"))
            .and(header("x-api-key", "test-key"))
            .and(query_param("url", "https://www.youtube.com/watch?v=123"))
            .and(query_param("text", "true"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"content": "Hello world", "lang": "en"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .transcript(&payload(json!({"url": "https://www.youtube.com/watch?v=123", "text": true})))
            .await
            .unwrap();

        assert_eq!(response.content, Some(TranscriptContent::from("Hello world")));
        assert_eq!(response.lang.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_transcript_chunks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transcript"))
            .and(query_param("text", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"text": "Hello", "offset": 0, "duration": 1000, "lang": "en"}],
                "lang": "en",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .transcript(&payload(json!({"url": "https://www.youtube.com/watch?v=123", "text": false})))
            .await
            .unwrap();

        match response.content {
            Some(TranscriptContent::Chunks(chunks)) => {
                assert_eq!(chunks.len(), 1);
                assert_eq!(chunks[0].text, "Hello");
                assert_eq!(chunks[0].duration, Some(1000.0));
            }
            other => panic!("unexpected content: {other:?}"),
        }
        assert_eq!(response.lang.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_transcript_job_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transcript"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"jobId": "abc123"})))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .transcript(&payload(json!({"url": "https://www.tiktok.com/@a/video/1"})))
            .await
            .unwrap();

        assert_eq!(response.pending_job(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized", "message": "Invalid API key"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .metadata(&payload(json!({"url": "https://x.com/a/status/1"})))
            .await
            .unwrap_err();

        match err {
            RemoteError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_youtube_video_sends_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/video"))
            .and(query_param("id", "https://youtu.be/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Awesome Video"})))
            .expect(1)
            .mount(&server)
            .await;

        let value = client_for(&server)
            .youtube_video(&payload(json!({"url": "https://youtu.be/abc"})))
            .await
            .unwrap();

        assert_eq!(value["title"], "Awesome Video");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .metadata(&payload(json!({"url": "https://x.com/a/status/1"})))
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Decode(_)));
    }
}

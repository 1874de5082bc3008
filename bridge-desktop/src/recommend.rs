//! Remote recommendation provider using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    recommend::{RecommendationProvider, Suggestion},
};
use core_async::time::Duration;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

const DEFAULT_SUGGESTION_COUNT: usize = 3;

#[derive(Serialize)]
struct SuggestRequest<'a> {
    prompt: &'a str,
    count: usize,
}

/// HTTP-backed suggestion service.
///
/// Posts `{"prompt": ..., "count": n}` to a configured endpoint. The endpoint
/// may answer with a JSON array of `{title, artist}` objects, or with a JSON
/// string holding that array (typical for text-generation backends).
pub struct HttpRecommendationProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    count: usize,
}

impl HttpRecommendationProvider {
    /// Create a provider with a 15 second request timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, Duration::from_secs(15))
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("svaram/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
            count: DEFAULT_SUGGESTION_COUNT,
        }
    }

    /// Send `Authorization: Bearer <key>` with each request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count.max(1);
        self
    }
}

#[async_trait]
impl RecommendationProvider for HttpRecommendationProvider {
    async fn suggest(&self, prompt: &str) -> Result<Vec<Suggestion>> {
        debug!(endpoint = %self.endpoint, "Requesting suggestions");

        let mut request = self.client.post(&self.endpoint).json(&SuggestRequest {
            prompt,
            count: self.count,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Suggestion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Suggestion endpoint returned an error");
            return Err(BridgeError::OperationFailed(format!(
                "HTTP {} from suggestion endpoint",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::OperationFailed(e.to_string()))?;

        parse_suggestions(&body, self.count)
    }
}

/// Decode a suggestion payload, keeping at most `limit` entries.
pub fn parse_suggestions(body: &str, limit: usize) -> Result<Vec<Suggestion>> {
    let mut suggestions = match serde_json::from_str::<Vec<Suggestion>>(body) {
        Ok(list) => list,
        Err(_) => {
            let embedded: String = serde_json::from_str(body)?;
            serde_json::from_str::<Vec<Suggestion>>(embedded.trim())?
        }
    };

    suggestions.retain(|s| !s.title.trim().is_empty());
    suggestions.truncate(limit);
    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let body = r#"[{"title":"Tum Hi Ho","artist":"Arijit Singh"},{"title":"Kesariya","artist":"Arijit Singh"}]"#;
        let parsed = parse_suggestions(body, 3).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], Suggestion::new("Tum Hi Ho", "Arijit Singh"));
    }

    #[test]
    fn test_parse_embedded_array_and_truncate() {
        let inner = r#"[{"title":"A","artist":"x"},{"title":"B","artist":"y"},{"title":"C","artist":"z"},{"title":"D","artist":"w"}]"#;
        let body = serde_json::to_string(inner).unwrap();
        let parsed = parse_suggestions(&body, 3).unwrap();
        assert_eq!(
            parsed.iter().map(|s| s.title.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
    }

    #[test]
    fn test_parse_drops_blank_titles() {
        let body = r#"[{"title":" ","artist":"x"},{"title":"B","artist":"y"}]"#;
        let parsed = parse_suggestions(body, 3).unwrap();
        assert_eq!(parsed, vec![Suggestion::new("B", "y")]);
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(parse_suggestions("not json", 3).is_err());
        assert!(parse_suggestions(r#"{"title":"A"}"#, 3).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        let provider =
            HttpRecommendationProvider::with_timeout("http://127.0.0.1:9/suggest", Duration::from_millis(500))
                .unwrap();
        assert!(provider.suggest("evening melodies").await.is_err());
    }
}

use crate::config::ClientConfig;
use crate::Result;
use std::env;
use std::time::Duration;

/// HTTP transport for the chat-completion endpoint.
///
/// Owns a pooled `reqwest::Client` with the config's bounded timeout.
/// One instance per client; cheap to share.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(
                env::var("CODEGEN_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(
                env::var("CODEGEN_HTTP_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            )));

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// POST a JSON body to `{base_url}{path}` with bearer authorization.
    ///
    /// Returns the raw response so the caller can classify by status and
    /// read either the completion or the upstream error body.
    pub async fn post_json(
        &self,
        path: &str,
        request_body: &serde_json::Value,
        client_request_id: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);

        let mut req = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(request_body);

        if let Some(id) = client_request_id {
            // Correlation id. Providers may ignore it, but applications can use it for linkage.
            req = req.header("x-request-id", id);
        }

        req.send()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

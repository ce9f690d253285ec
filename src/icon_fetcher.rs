use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// A favicon one provider returned, ready to embed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FetchResult {
    pub source: String,
    /// `data:<mime>;base64,<payload>`
    pub icon: String,
}

impl FetchResult {
    pub fn from_bytes(source: &str, content_type: &str, bytes: &[u8]) -> Self {
        Self {
            source: source.to_string(),
            icon: to_data_uri(content_type, bytes),
        }
    }
}

pub fn to_data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

/// Why a single provider produced nothing. Never leaves the fetcher.
#[derive(Debug)]
pub(crate) enum FetchError {
    Timeout,
    Transport(String),
    Status(u16),
    NotAnImage(Option<String>),
    Body(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout => write!(f, "Request timed out"),
            FetchError::Transport(msg) => write!(f, "Transport error: {msg}"),
            FetchError::Status(code) => write!(f, "Upstream returned HTTP {code}"),
            FetchError::NotAnImage(Some(content_type)) => {
                write!(f, "Non-image content type: {content_type}")
            }
            FetchError::NotAnImage(None) => write!(f, "Missing content type"),
            FetchError::Body(msg) => write!(f, "Failed to read body: {msg}"),
        }
    }
}

impl Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Fetches one candidate favicon URL.
///
/// Implementations must not fail: every failure is reported as `None`.
#[async_trait]
pub trait IconFetcher: Send + Sync {
    async fn fetch_icon(&self, url: &str, source: &str) -> Option<FetchResult>;
}

pub struct ReqwestIconFetcher {
    client: Client,
}

impl ReqwestIconFetcher {
    /// Build the shared outbound client.
    ///
    /// Certificate validation is off for this client only. Third-party icon
    /// hosts are trusted for image bytes and nothing else.
    pub fn new(
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { client })
    }

    pub(crate) async fn try_fetch(
        &self,
        url: &str,
        source: &str,
    ) -> Result<FetchResult, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "image/*,*/*;q=0.8")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let content_type = match content_type {
            Some(ct) if ct.starts_with("image/") => ct,
            other => return Err(FetchError::NotAnImage(other)),
        };

        let bytes = response.bytes().await?;
        debug!("{} returned {} bytes of {}", source, bytes.len(), content_type);

        Ok(FetchResult::from_bytes(source, &content_type, &bytes))
    }
}

#[async_trait]
impl IconFetcher for ReqwestIconFetcher {
    async fn fetch_icon(&self, url: &str, source: &str) -> Option<FetchResult> {
        match self.try_fetch(url, source).await {
            Ok(result) => Some(result),
            Err(FetchError::NotAnImage(content_type)) => {
                warn!(
                    "Received non-image content type from {}: {}",
                    source,
                    content_type.as_deref().unwrap_or("<none>")
                );
                None
            }
            Err(e) => {
                warn!("Error fetching from {} ({}): {}", url, source, e);
                None
            }
        }
    }
}

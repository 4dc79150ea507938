use reqwest::Client;
use std::time::{Duration, Instant};

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;
const REQUEST_TIMEOUT_SECS: u64 = 8;

/// A fetched page plus the wall-clock duration of the whole request,
/// body download included. The scoring side calls this duration "TTFB".
pub struct FetchedPage {
    pub body: String,
    pub status: u16,
    pub elapsed: Duration,
}

pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("Mozilla/5.0 (compatible; sitegrade/0.1)")
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();

        // Non-2xx pages are still graded; only refuse bodies we cannot
        // treat as HTML at all.
        if let Some(content_type) = response.headers().get("content-type") {
            let content_type_str = content_type.to_str().unwrap_or("");
            if !content_type_str.is_empty()
                && !content_type_str.contains("text/")
                && !content_type_str.contains("xhtml")
            {
                return Err(FetchError::InvalidContentType(content_type_str.to_string()));
            }
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_RESPONSE_SIZE as u64 {
                return Err(FetchError::TooLarge(content_length));
            }
        }

        let body = response.text().await?;
        let elapsed = start.elapsed();

        if body.len() > MAX_RESPONSE_SIZE {
            return Err(FetchError::TooLarge(body.len() as u64));
        }

        Ok(FetchedPage {
            body,
            status,
            elapsed,
        })
    }
}

#[derive(Debug)]
pub enum FetchError {
    InvalidContentType(String),
    TooLarge(u64),
    RequestError(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::RequestError(err)
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidContentType(ct) => write!(f, "not an HTML page: {}", ct),
            FetchError::TooLarge(size) => write!(f, "response too large: {} bytes", size),
            FetchError::RequestError(e) => write!(f, "request failed: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

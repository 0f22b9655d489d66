//! HTTP request execution for a single input URL
//!
//! The `RequestExecutor` turns one URL plus the shared `RequestConfig` into
//! the raw response body. Every failure is local to that request.

use crate::{error_chain, FetchError, RequestConfig};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use std::sync::Arc;
use tracing::{debug, warn};

/// Redirect hops followed when redirects are enabled.
const MAX_REDIRECTS: usize = 10;

/// Anything that can turn an input URL into a response body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetches pages over HTTP according to a shared [`RequestConfig`].
///
/// The client is built once. If that fails (typically a malformed proxy URL)
/// the error is kept and returned for every request instead of aborting the
/// run.
///
/// # Examples
///
/// ```rust,no_run
/// use param_miner::{Fetcher, RequestConfig, RequestExecutor};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let executor = RequestExecutor::new(Arc::new(RequestConfig::default()));
///     let body = executor.fetch("https://example.com").await?;
///     println!("Fetched {} bytes", body.len());
///     Ok(())
/// }
/// ```
pub struct RequestExecutor {
    config: Arc<RequestConfig>,
    client: Result<Client, FetchError>,
}

impl RequestExecutor {
    pub fn new(config: Arc<RequestConfig>) -> Self {
        let client = build_client(&config);
        if let Err(e) = &client {
            warn!("Every request will fail: {}", e);
        }

        Self { config, client }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    pub async fn execute(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let client = self.client.as_ref().map_err(Clone::clone)?;

        let method = Method::from_bytes(self.config.method.as_bytes())
            .map_err(|_| FetchError::InvalidMethod(self.config.method.clone()))?;
        let headers = self.header_map()?;
        let target = self.config.target(url);

        debug!("{} {}", method, target);

        let response = client
            .request(method, &target)
            .headers(headers)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = response.status();
        debug!("{} answered {}", target, status);

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.config.timeout)
            } else {
                FetchError::BodyRead(error_chain(&e))
            }
        })?;

        Ok(body.to_vec())
    }

    /// Headers in configured order; repeated names are appended, not replaced.
    fn header_map(&self) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();

        let parsed = self.config.parsed_headers()?;
        for (raw, (key, value)) in self.config.headers.iter().zip(parsed) {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| FetchError::InvalidHeader(raw.clone()))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|_| FetchError::InvalidHeader(raw.clone()))?;
            headers.append(name, value);
        }

        Ok(headers)
    }

    fn classify_send_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.config.timeout)
        } else if err.is_builder() {
            FetchError::InvalidRequest(error_chain(&err))
        } else {
            FetchError::Network(error_chain(&err))
        }
    }
}

#[async_trait]
impl Fetcher for RequestExecutor {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.execute(url).await
    }
}

fn build_client(config: &RequestConfig) -> Result<Client, FetchError> {
    let redirect_policy = if config.follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    let mut builder = Client::builder()
        .redirect(redirect_policy)
        .timeout(config.timeout);

    if let Some(proxy) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|e| FetchError::InvalidProxy {
            proxy: proxy.clone(),
            reason: error_chain(&e),
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| FetchError::Client(error_chain(&e)))
}

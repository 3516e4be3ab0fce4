//! HTTP transport for the growth API
//!
//! [`ReqwestProvider`] turns a browser header set plus an optional proxy into a
//! [`ReqwestTransport`], a reqwest client that implements
//! [`core_logic::HttpTransport`]. The session driver only ever sees the trait,
//! so tests swap in a recording mock.

use core_logic::{HttpTransport, NetworkError, ProxyConfig};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// The browser impersonation header set sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserHeaders {
    pub user_agent: String,
}

impl BrowserHeaders {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Accept", "*/*"),
            ("Accept-Encoding", "gzip, deflate, br"),
            ("Accept-Language", "en-US;q=0.6,en;q=0.5"),
            ("Content-Type", "application/json"),
            ("Origin", "https://www.binance.com"),
            ("Referer", "https://www.binance.com/vi/game/tg/moon-bix"),
            ("User-Agent", self.user_agent.as_str()),
        ]
    }

    pub fn to_header_map(&self) -> Result<HeaderMap, NetworkError> {
        to_header_map(&self.pairs())
    }
}

fn to_header_map(pairs: &[(&str, &str)]) -> Result<HeaderMap, NetworkError> {
    let mut map = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| NetworkError::ClientBuild {
            reason: format!("invalid header name '{}': {}", name, e),
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| NetworkError::ClientBuild {
            reason: format!("invalid value for header '{}': {}", name, e),
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Produces configured HTTP clients.
pub trait TransportProvider: Send + Sync {
    fn provide(
        &self,
        headers: &BrowserHeaders,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Arc<dyn HttpTransport>, NetworkError>;
}

/// Builds reqwest-backed transports with a fixed request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestProvider {
    timeout: Duration,
}

impl ReqwestProvider {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl TransportProvider for ReqwestProvider {
    fn provide(
        &self,
        headers: &BrowserHeaders,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Arc<dyn HttpTransport>, NetworkError> {
        let transport = ReqwestTransport::new(headers, proxy, self.timeout)?;
        Ok(Arc::new(transport))
    }
}

pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(
        headers: &BrowserHeaders,
        proxy: Option<&ProxyConfig>,
        timeout: Duration,
    ) -> Result<Self, NetworkError> {
        let mut client_builder = Client::builder()
            .default_headers(headers.to_header_map()?)
            .timeout(timeout)
            .connect_timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30)); // Reuse connections across steps

        // Credentials ride in the URL userinfo; reqwest turns them into proxy auth
        if let Some(proxy_config) = proxy {
            let proxy = Proxy::all(proxy_config.proxy_url()).map_err(|e| NetworkError::ClientBuild {
                reason: format!("invalid proxy {}: {}", proxy_config.base_url(), e),
            })?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder
            .build()
            .map_err(|e| NetworkError::ClientBuild {
                reason: e.to_string(),
            })?;

        Ok(Self { client, timeout })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<Value, NetworkError> {
        let response = self
            .client
            .post(url)
            .headers(to_header_map(headers)?)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NetworkError::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                        endpoint: url.to_string(),
                    }
                } else {
                    NetworkError::RequestFailed {
                        endpoint: url.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status_code: status.as_u16(),
                endpoint: url.to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| NetworkError::InvalidResponse {
                endpoint: url.to_string(),
                reason: e.to_string(),
            })
    }
}

use crate::core::config::SessionConfig;
use crate::core::errors::ClientError;
use crate::core::kernel::endpoint::{EndpointRequest, HttpResponseData};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Proxy};
use secrecy::ExposeSecret;
use std::time::{Duration, Instant};
use tracing::{instrument, trace};

/// Sends one fully resolved request and returns the raw response.
///
/// Implementations never retry; a call reaches the network at most once.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &EndpointRequest) -> Result<HttpResponseData, ClientError>;
}

/// Builder for [`ReqwestTransport`] from a [`SessionConfig`].
pub struct ReqwestTransportBuilder {
    config: SessionConfig,
}

impl ReqwestTransportBuilder {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<ReqwestTransport, ClientError> {
        let config = &self.config;
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_connections_per_host)
            .user_agent(&config.user_agent);

        if !config.http2_enabled {
            builder = builder.http1_only();
        }

        if let Some(proxy_config) = &config.proxy {
            let mut proxy = Proxy::all(&proxy_config.url).map_err(|e| {
                ClientError::Configuration(format!("Invalid proxy URL: {}", e))
            })?;
            if let (Some(username), Some(password)) =
                (&proxy_config.username, &proxy_config.password)
            {
                proxy = proxy.basic_auth(username, password.expose_secret());
            }
            builder = builder.proxy(proxy);
        } else if !config.trust_env {
            builder = builder.no_proxy();
        }

        let client = builder.build().map_err(|e| {
            ClientError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(ReqwestTransport { client })
    }
}

/// [`Transport`] over a pooled `reqwest::Client`. Cheap to clone; clones
/// share the connection pool.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    pub fn new(config: SessionConfig) -> Result<Self, ClientError> {
        ReqwestTransportBuilder::new(config).build()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(
        skip(self, request),
        fields(method = %request.method, url = %request.masked_url())
    )]
    async fn send(&self, request: &EndpointRequest) -> Result<HttpResponseData, ClientError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            if let Some(content_type) = &request.content_type {
                builder = builder.header(CONTENT_TYPE, content_type.as_str());
            }
            builder = builder.body(body.clone());
        }

        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("Request failed: {}", e.without_url())))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            ClientError::Network(format!("Failed to read response body: {}", e.without_url()))
        })?;
        let elapsed = started.elapsed();

        trace!(
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Response body: {}",
            String::from_utf8_lossy(&body)
        );

        Ok(HttpResponseData {
            status,
            headers,
            body: body.to_vec(),
            elapsed,
            url: request.url.clone(),
            method: request.method.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ProxyConfig;

    #[test]
    fn test_builder_accepts_proxy_with_credentials() {
        let config = SessionConfig::default()
            .with_proxy(ProxyConfig::new("http://127.0.0.1:8080").with_basic_auth("user", "pass"))
            .with_http2(false);
        assert!(ReqwestTransport::new(config).is_ok());
    }

    #[test]
    fn test_builder_rejects_bad_proxy_url() {
        let config = SessionConfig::default().with_proxy(ProxyConfig::new("::not a url::"));
        assert!(matches!(
            ReqwestTransport::new(config),
            Err(ClientError::Configuration(_))
        ));
    }
}

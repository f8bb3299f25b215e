use crate::core::config::{Credentials, SessionConfig};
use crate::core::errors::{CallError, ClientError};
use crate::core::exchange::Exchange;
use crate::core::kernel::{
    CallbackRegistry, NativeRequest, PostRequestCallback, PreRequestCallback, RequestPipeline,
    ReqwestTransport, ResponseValidator, Transport,
};
use crate::core::masking::SecretMasker;
use crate::core::rate_limit::RateLimiter;
use crate::exchanges;
use std::sync::Arc;
use tracing::debug;

/// One configured connection to one exchange.
///
/// Holds the transport (and its connection pool), the signer derived from
/// the credentials, the rate limiter and the callback lists. Concurrent
/// `execute` calls share all of it.
#[derive(Debug)]
pub struct ExchangeSession {
    pipeline: RequestPipeline,
    authenticated: bool,
}

impl ExchangeSession {
    pub fn builder(exchange: Exchange) -> ExchangeSessionBuilder {
        ExchangeSessionBuilder::new(exchange)
    }

    pub fn exchange(&self) -> Exchange {
        self.pipeline.exchange()
    }

    /// Whether private endpoints can be signed.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub async fn execute<R: NativeRequest>(&self, request: &R) -> Result<R::Output, CallError> {
        self.pipeline.execute(request).await
    }
}

pub struct ExchangeSessionBuilder {
    exchange: Exchange,
    credentials: Option<Credentials>,
    config: SessionConfig,
    transport: Option<Arc<dyn Transport>>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    callbacks: CallbackRegistry,
    default_validator: bool,
}

impl ExchangeSessionBuilder {
    pub fn new(exchange: Exchange) -> Self {
        Self {
            exchange,
            credentials: None,
            config: SessionConfig::default(),
            transport: None,
            rate_limiter: None,
            callbacks: CallbackRegistry::default(),
            default_validator: false,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the HTTP transport, e.g. with a recording stub in tests.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    #[must_use]
    pub fn with_callbacks(mut self, callbacks: CallbackRegistry) -> Self {
        self.callbacks = callbacks;
        self
    }

    #[must_use]
    pub fn pre_request(mut self, callback: impl PreRequestCallback + 'static) -> Self {
        self.callbacks = self.callbacks.pre_request(callback);
        self
    }

    #[must_use]
    pub fn response_validator(mut self, validator: impl ResponseValidator + 'static) -> Self {
        self.callbacks = self.callbacks.response_validator(validator);
        self
    }

    #[must_use]
    pub fn post_request(mut self, callback: impl PostRequestCallback + 'static) -> Self {
        self.callbacks = self.callbacks.post_request(callback);
        self
    }

    /// Run the exchange's own error-envelope check before any user validator.
    #[must_use]
    pub fn with_default_validator(mut self) -> Self {
        self.default_validator = true;
        self
    }

    pub fn build(self) -> Result<ExchangeSession, ClientError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.config.clone())?),
        };

        let mut callbacks = self.callbacks;
        if self.default_validator {
            callbacks.prepend_response_validator(exchanges::response_validator(self.exchange));
        }

        let mut masker = SecretMasker::new();
        let mut pipeline = RequestPipeline::new(self.exchange, transport)
            .with_acquire_timeout(self.config.acquire_timeout());

        let mut authenticated = false;
        if let Some(credentials) = self.credentials.filter(Credentials::has_credentials) {
            masker.add(credentials.api_key());
            masker.add(credentials.api_secret());
            if let Some(signer) = exchanges::auth_signer(self.exchange, &credentials)? {
                pipeline = pipeline.with_signer(signer);
                authenticated = true;
            }
        }

        if let Some(rate_limiter) = self.rate_limiter {
            pipeline = pipeline.with_rate_limiter(rate_limiter);
        }

        debug!(
            exchange = %self.exchange,
            authenticated,
            validators = callbacks.validator_count(),
            "session built"
        );

        Ok(ExchangeSession {
            pipeline: pipeline.with_callbacks(callbacks).with_masker(masker),
            authenticated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_credentials_leave_session_unauthenticated() {
        let session = ExchangeSession::builder(Exchange::BitFlyer)
            .with_credentials(Credentials::read_only())
            .build()
            .unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_credentials_install_signer() {
        let session = ExchangeSession::builder(Exchange::Binance)
            .with_credentials(Credentials::new("key", "secret"))
            .with_default_validator()
            .build()
            .unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.exchange(), Exchange::Binance);
    }
}

use crate::core::errors::{CallError, ClientError, Stage};
use crate::core::exchange::{Exchange, Visibility};
use crate::core::kernel::callbacks::{CallContext, CallbackRegistry};
use crate::core::kernel::endpoint::{EndpointRequest, NativeRequest};
use crate::core::kernel::signer::{timestamp_millis, AuthSigner, SigningInput};
use crate::core::kernel::transport::Transport;
use crate::core::masking::{is_sensitive_name, SecretMasker};
use crate::core::message::NativeMessage;
use crate::core::rate_limit::{RateLimitKey, RateLimiter};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, trace};

/// Drives one call through `Built → RateGated → Sent → Validated → Decoded`.
///
/// Every failure is returned as a [`CallError`] tagged with the stage that
/// was being attempted. The transport is invoked at most once per call.
pub struct RequestPipeline {
    exchange: Exchange,
    transport: Arc<dyn Transport>,
    signer: Option<Arc<dyn AuthSigner>>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    callbacks: CallbackRegistry,
    masker: SecretMasker,
    acquire_timeout: Duration,
    next_call_id: AtomicU64,
}

impl fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("exchange", &self.exchange)
            .field("has_signer", &self.signer.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .field("callbacks", &self.callbacks)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish_non_exhaustive()
    }
}

impl RequestPipeline {
    pub fn new(exchange: Exchange, transport: Arc<dyn Transport>) -> Self {
        Self {
            exchange,
            transport,
            signer: None,
            rate_limiter: None,
            callbacks: CallbackRegistry::default(),
            masker: SecretMasker::new(),
            acquire_timeout: Duration::from_secs(30),
            next_call_id: AtomicU64::new(1),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn AuthSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    pub fn with_callbacks(mut self, callbacks: CallbackRegistry) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_masker(mut self, masker: SecretMasker) -> Self {
        self.masker = masker;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    #[instrument(
        skip(self, request),
        fields(exchange = %self.exchange, endpoint = %request.endpoint_class())
    )]
    pub async fn execute<R: NativeRequest>(&self, request: &R) -> Result<R::Output, CallError> {
        let ctx = CallContext {
            call_id: self.next_call_id.fetch_add(1, Ordering::Relaxed),
            exchange: request.exchange(),
            visibility: request.visibility(),
            endpoint_class: request.endpoint_class(),
        };

        // Built
        let (mut endpoint_request, masker) =
            self.build(request).map_err(CallError::at(Stage::Built))?;
        self.callbacks
            .run_pre_request(&ctx, &mut endpoint_request)
            .map_err(CallError::at(Stage::Built))?;
        debug!(
            call_id = ctx.call_id,
            method = %endpoint_request.method,
            url = %masker.mask(&endpoint_request.masked_url()),
            headers = ?endpoint_request.headers,
            "request built"
        );

        // RateGated
        if let Some(limiter) = &self.rate_limiter {
            let key = RateLimitKey::new(ctx.exchange, ctx.endpoint_class.clone());
            let acquire = limiter.acquire(&key, request.weight());
            let permit = tokio::time::timeout(self.acquire_timeout, acquire)
                .await
                .map_err(|_| {
                    CallError::new(
                        Stage::RateGated,
                        ClientError::RateLimitTimeout {
                            key: key.to_string(),
                            waited: self.acquire_timeout,
                        },
                    )
                })?
                .map_err(CallError::at(Stage::RateGated))?;
            trace!(
                call_id = ctx.call_id,
                remaining = ?permit.remaining,
                "rate limit permit granted"
            );
        }

        // Sent
        let response = self
            .transport
            .send(&endpoint_request)
            .await
            .map_err(CallError::at(Stage::Sent))?;
        debug!(
            call_id = ctx.call_id,
            status = response.status,
            elapsed_ms = response.elapsed.as_millis() as u64,
            "response received"
        );

        // Validated
        let message = NativeMessage::new(ctx.exchange, response.text().into_owned());
        self.callbacks
            .run_validators(&ctx, &response, &message)
            .map_err(CallError::at(Stage::Validated))?;

        // Decoded
        let output = Self::decode(request, &message).map_err(CallError::at(Stage::Decoded))?;
        self.callbacks
            .run_post_request(&ctx, &response, &output)
            .map_err(CallError::at(Stage::Decoded))?;

        Ok(output)
    }

    /// Resolve the URL, attach the body and sign. Returns the request together
    /// with a masker that also knows this call's signature values.
    fn build<R: NativeRequest>(
        &self,
        request: &R,
    ) -> Result<(EndpointRequest, SecretMasker), ClientError> {
        if request.exchange() != self.exchange {
            return Err(ClientError::Configuration(format!(
                "{} request sent through a {} pipeline",
                request.exchange(),
                self.exchange
            )));
        }

        let url = request.endpoint().compose(&request.api_root())?;
        let mut endpoint_request = EndpointRequest::new(request.method(), url);
        endpoint_request.append_query(request.query());
        if let Some(body) = request.body()? {
            endpoint_request = endpoint_request.with_json_body(body);
        }

        let mut masker = self.masker.clone();
        if request.visibility() == Visibility::Private {
            let signer = self.signer.as_ref().ok_or_else(|| {
                ClientError::Configuration(format!(
                    "{} endpoint `{}` requires credentials",
                    self.exchange,
                    request.endpoint()
                ))
            })?;

            let input = SigningInput {
                method: &endpoint_request.method,
                url: &endpoint_request.url,
                path: endpoint_request.url.path(),
                query_string: endpoint_request.query_string(),
                body: endpoint_request.body.as_deref().unwrap_or(""),
                timestamp: timestamp_millis()?,
            };
            let (headers, query_additions) = signer.sign_request(&input)?;

            for (name, value) in headers {
                endpoint_request.headers.insert(name, value);
            }
            for value in endpoint_request.headers.sensitive_values() {
                masker.add(value);
            }
            for (_, value) in query_additions.iter().filter(|(name, _)| is_sensitive_name(name)) {
                masker.add(value.as_str());
            }
            endpoint_request.append_query(query_additions);
        }

        Ok((endpoint_request, masker))
    }

    fn decode<R: NativeRequest>(
        request: &R,
        message: &NativeMessage,
    ) -> Result<R::Output, ClientError> {
        let payload = message.payload()?;
        let content = payload.content_at(request.content_path())?;
        request.decode(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::endpoint::HttpResponseData;
    use crate::core::kernel::signer::SignatureResult;
    use crate::exchanges::bitflyer::requests::GetBalance;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _request: &EndpointRequest) -> Result<HttpResponseData, ClientError> {
            Err(ClientError::Network("offline".to_string()))
        }
    }

    struct FixedSigner;

    impl AuthSigner for FixedSigner {
        fn sign_request(&self, _input: &SigningInput<'_>) -> SignatureResult {
            let headers = HashMap::from([
                ("ACCESS-SIGN".to_string(), "hdr-sig-123".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]);
            let query = vec![
                ("timestamp".to_string(), "1700".to_string()),
                ("signature".to_string(), "qs-sig-456".to_string()),
            ];
            Ok((headers, query))
        }
    }

    #[test]
    fn test_build_masks_signed_values_only() {
        let pipeline = RequestPipeline::new(Exchange::BitFlyer, Arc::new(Unreachable))
            .with_signer(Arc::new(FixedSigner));

        let (request, masker) = pipeline.build(&GetBalance).unwrap();

        assert_eq!(request.headers.get("access-sign"), Some("hdr-sig-123"));
        assert!(request.query_string().ends_with("timestamp=1700&signature=qs-sig-456"));
        assert_eq!(
            masker.mask("sign=hdr-sig-123 sig=qs-sig-456 ts=1700 type=application/json"),
            "sign=******** sig=******** ts=1700 type=application/json"
        );
    }
}

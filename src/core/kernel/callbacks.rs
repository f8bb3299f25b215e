use crate::core::errors::ClientError;
use crate::core::exchange::{Exchange, Visibility};
use crate::core::kernel::endpoint::{EndpointRequest, HttpResponseData};
use crate::core::message::NativeMessage;
use std::fmt;
use std::sync::Arc;

/// Control signal returned by a pre-request callback.
#[derive(Debug)]
pub enum Flow<T> {
    Continue,
    /// Swap the value wholesale and keep going.
    Replace(T),
    /// Stop the call; the reason is surfaced as `CallbackAbort`.
    Abort(String),
}

/// What a callback knows about the call it is observing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub call_id: u64,
    pub exchange: Exchange,
    pub visibility: Visibility,
    pub endpoint_class: String,
}

/// Runs after the request is built and signed, before rate gating.
pub trait PreRequestCallback: Send + Sync {
    fn before_request(
        &self,
        ctx: &CallContext,
        request: &mut EndpointRequest,
    ) -> Flow<EndpointRequest>;
}

impl<F> PreRequestCallback for F
where
    F: Fn(&CallContext, &mut EndpointRequest) -> Flow<EndpointRequest> + Send + Sync,
{
    fn before_request(
        &self,
        ctx: &CallContext,
        request: &mut EndpointRequest,
    ) -> Flow<EndpointRequest> {
        self(ctx, request)
    }
}

/// Inspects a response before decoding and may reject it, typically with
/// `ClientError::Exchange`.
pub trait ResponseValidator: Send + Sync {
    fn validate(
        &self,
        ctx: &CallContext,
        response: &HttpResponseData,
        message: &NativeMessage,
    ) -> Result<(), ClientError>;
}

impl<F> ResponseValidator for F
where
    F: Fn(&CallContext, &HttpResponseData, &NativeMessage) -> Result<(), ClientError> + Send + Sync,
{
    fn validate(
        &self,
        ctx: &CallContext,
        response: &HttpResponseData,
        message: &NativeMessage,
    ) -> Result<(), ClientError> {
        self(ctx, response, message)
    }
}

/// Observes the decoded result before it is returned. Read-only; an error
/// fails the call.
pub trait PostRequestCallback: Send + Sync {
    fn after_request(
        &self,
        ctx: &CallContext,
        response: &HttpResponseData,
        result: &dyn fmt::Debug,
    ) -> Result<(), ClientError>;
}

impl<F> PostRequestCallback for F
where
    F: Fn(&CallContext, &HttpResponseData, &dyn fmt::Debug) -> Result<(), ClientError>
        + Send
        + Sync,
{
    fn after_request(
        &self,
        ctx: &CallContext,
        response: &HttpResponseData,
        result: &dyn fmt::Debug,
    ) -> Result<(), ClientError> {
        self(ctx, response, result)
    }
}

/// Ordered hook lists, run in registration order.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    pre_request: Vec<Arc<dyn PreRequestCallback>>,
    response_validation: Vec<Arc<dyn ResponseValidator>>,
    post_request: Vec<Arc<dyn PostRequestCallback>>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("pre_request", &self.pre_request.len())
            .field("response_validation", &self.response_validation.len())
            .field("post_request", &self.post_request.len())
            .finish()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pre_request(mut self, callback: impl PreRequestCallback + 'static) -> Self {
        self.pre_request.push(Arc::new(callback));
        self
    }

    pub fn response_validator(mut self, validator: impl ResponseValidator + 'static) -> Self {
        self.response_validation.push(Arc::new(validator));
        self
    }

    pub fn post_request(mut self, callback: impl PostRequestCallback + 'static) -> Self {
        self.post_request.push(Arc::new(callback));
        self
    }

    pub fn push_pre_request(&mut self, callback: Arc<dyn PreRequestCallback>) {
        self.pre_request.push(callback);
    }

    pub fn push_response_validator(&mut self, validator: Arc<dyn ResponseValidator>) {
        self.response_validation.push(validator);
    }

    /// Put a validator ahead of all others.
    pub fn prepend_response_validator(&mut self, validator: Arc<dyn ResponseValidator>) {
        self.response_validation.insert(0, validator);
    }

    pub fn push_post_request(&mut self, callback: Arc<dyn PostRequestCallback>) {
        self.post_request.push(callback);
    }

    pub fn validator_count(&self) -> usize {
        self.response_validation.len()
    }

    pub(crate) fn run_pre_request(
        &self,
        ctx: &CallContext,
        request: &mut EndpointRequest,
    ) -> Result<(), ClientError> {
        for callback in &self.pre_request {
            match callback.before_request(ctx, request) {
                Flow::Continue => {}
                Flow::Replace(replacement) => *request = replacement,
                Flow::Abort(reason) => return Err(ClientError::CallbackAbort(reason)),
            }
        }
        Ok(())
    }

    pub(crate) fn run_validators(
        &self,
        ctx: &CallContext,
        response: &HttpResponseData,
        message: &NativeMessage,
    ) -> Result<(), ClientError> {
        self.response_validation
            .iter()
            .try_for_each(|validator| validator.validate(ctx, response, message))
    }

    pub(crate) fn run_post_request(
        &self,
        ctx: &CallContext,
        response: &HttpResponseData,
        result: &dyn fmt::Debug,
    ) -> Result<(), ClientError> {
        self.post_request
            .iter()
            .try_for_each(|callback| callback.after_request(ctx, response, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, Url};

    fn ctx() -> CallContext {
        CallContext {
            call_id: 1,
            exchange: Exchange::BitFlyer,
            visibility: Visibility::Public,
            endpoint_class: "ticker".to_string(),
        }
    }

    fn request() -> EndpointRequest {
        EndpointRequest::new(
            Method::GET,
            Url::parse("https://api.bitflyer.com/v1/ticker").unwrap(),
        )
    }

    #[test]
    fn test_pre_request_runs_in_order_and_replaces() {
        let registry = CallbackRegistry::new()
            .pre_request(|_: &CallContext, req: &mut EndpointRequest| {
                req.headers.insert("X-Trace", "first");
                Flow::Continue
            })
            .pre_request(|_: &CallContext, req: &mut EndpointRequest| {
                let mut replacement = req.clone();
                replacement.headers.insert("X-Trace", "second");
                Flow::Replace(replacement)
            });

        let mut req = request();
        registry.run_pre_request(&ctx(), &mut req).unwrap();
        assert_eq!(req.headers.get("x-trace"), Some("second"));
    }

    #[test]
    fn test_abort_short_circuits() {
        let registry = CallbackRegistry::new()
            .pre_request(|_: &CallContext, _: &mut EndpointRequest| {
                Flow::Abort("maintenance".into())
            })
            .pre_request(|_: &CallContext, _: &mut EndpointRequest| -> Flow<EndpointRequest> {
                panic!("must not run after abort")
            });

        let err = registry.run_pre_request(&ctx(), &mut request()).unwrap_err();
        assert!(matches!(err, ClientError::CallbackAbort(reason) if reason == "maintenance"));
    }
}

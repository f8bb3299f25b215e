use crate::core::errors::{ClientError, MessageFormatError};
use crate::core::exchange::{ApiRoot, Exchange, Visibility};
use crate::core::masking::{is_sensitive_name, RequestHeaders};
use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// Resource identifier path plus action name, e.g. `me` / `getbalance`.
///
/// Joined as `base_url / stub / resource.. / action`. Segments are validated
/// when composed so no component can smuggle in a separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPath {
    resource: Vec<String>,
    action: String,
}

impl EndpointPath {
    /// An action directly under the stub, e.g. `/v1/ticker`.
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            resource: Vec::new(),
            action: action.into(),
        }
    }

    pub fn resource<I, S>(resource: I, action: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resource: resource.into_iter().map(Into::into).collect(),
            action: action.into(),
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.resource
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.action.as_str()))
    }

    /// Absolute URL under `root`.
    pub fn compose(&self, root: &ApiRoot) -> Result<Url, ClientError> {
        for segment in root.stub.iter().copied().chain(self.segments()) {
            validate_segment(segment)?;
        }

        let mut url = Url::parse(root.base_url).map_err(|e| {
            ClientError::Configuration(format!("invalid base URL {}: {}", root.base_url, e))
        })?;
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                ClientError::Configuration(format!("base URL {} cannot hold a path", root.base_url))
            })?;
            path.pop_if_empty();
            path.extend(root.stub.iter().copied());
            path.extend(self.segments());
        }
        Ok(url)
    }
}

impl fmt::Display for EndpointPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.segments().collect();
        f.write_str(&joined.join("/"))
    }
}

fn validate_segment(segment: &str) -> Result<(), ClientError> {
    if segment.is_empty() {
        return Err(ClientError::Configuration(
            "endpoint path segment must not be empty".to_string(),
        ));
    }
    if let Some(c) = segment.chars().find(|c| matches!(c, '/' | '?' | '#')) {
        return Err(ClientError::Configuration(format!(
            "endpoint path segment `{}` contains reserved character `{}`",
            segment, c
        )));
    }
    Ok(())
}

/// Exchange-specific parameters for one call, before signing.
///
/// Implementations are plain immutable values created per call. `decode`
/// turns payload content into the domain model.
pub trait NativeRequest: Send + Sync {
    type Output: fmt::Debug + Send + 'static;

    fn exchange(&self) -> Exchange;

    fn endpoint(&self) -> EndpointPath;

    fn decode(&self, content: &str) -> Result<Self::Output, ClientError>;

    fn method(&self) -> Method {
        Method::GET
    }

    fn visibility(&self) -> Visibility {
        Visibility::Public
    }

    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// JSON request body, if any.
    fn body(&self) -> Result<Option<String>, ClientError> {
        Ok(None)
    }

    fn api_root(&self) -> ApiRoot {
        self.exchange().api_root(self.visibility())
    }

    /// Rate-limit bucket name; endpoints sharing an exchange quota override this.
    fn endpoint_class(&self) -> String {
        self.endpoint().to_string()
    }

    fn weight(&self) -> u32 {
        1
    }

    /// Keys to descend through inside the payload before decoding.
    fn content_path(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Decode payload content, reporting failures as message-format errors.
pub fn decode_json<T: DeserializeOwned>(
    exchange: Exchange,
    content: &str,
) -> Result<T, ClientError> {
    serde_json::from_str(content).map_err(|e| {
        MessageFormatError::new(exchange, std::any::type_name::<T>(), e.to_string()).into()
    })
}

/// Fully resolved request ready for the transport.
#[derive(Clone)]
pub struct EndpointRequest {
    pub method: Method,
    pub url: Url,
    pub headers: RequestHeaders,
    pub body: Option<String>,
    pub content_type: Option<String>,
}

impl EndpointRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: RequestHeaders::new(),
            body: None,
            content_type: None,
        }
    }

    pub fn with_json_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self.content_type = Some("application/json".to_string());
        self
    }

    pub fn query_string(&self) -> &str {
        self.url.query().unwrap_or("")
    }

    pub fn append_query<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pairs = pairs.into_iter().peekable();
        if pairs.peek().is_some() {
            let mut query = self.url.query_pairs_mut();
            for (name, value) in pairs {
                query.append_pair(name.as_ref(), value.as_ref());
            }
        }
    }

    /// URL with sensitive query values replaced.
    pub fn masked_url(&self) -> String {
        if !self
            .url
            .query_pairs()
            .any(|(name, _)| is_sensitive_name(&name))
        {
            return self.url.to_string();
        }
        let mut masked = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(name, value)| {
                let value = if is_sensitive_name(&name) {
                    Cow::Borrowed("********")
                } else {
                    value
                };
                (name.into_owned(), value.into_owned())
            })
            .collect();
        masked.query_pairs_mut().clear().extend_pairs(pairs);
        masked.to_string()
    }
}

impl fmt::Debug for EndpointRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRequest")
            .field("method", &self.method)
            .field("url", &self.masked_url())
            .field("headers", &self.headers)
            .field("body_len", &self.body.as_ref().map(String::len))
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// What came back from the transport.
#[derive(Debug, Clone)]
pub struct HttpResponseData {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub elapsed: Duration,
    pub url: Url,
    pub method: Method,
}

impl HttpResponseData {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_joins_root_stub_resource_action() {
        let root = Exchange::BitFlyer.api_root(Visibility::Private);
        let url = EndpointPath::resource(["me"], "getbalance")
            .compose(&root)
            .unwrap();
        assert_eq!(url.as_str(), "https://api.bitflyer.com/v1/me/getbalance");

        let root = Exchange::Bitbank.api_root(Visibility::Public);
        let url = EndpointPath::resource(["btc_jpy"], "ticker")
            .compose(&root)
            .unwrap();
        assert_eq!(url.as_str(), "https://public.bitbank.cc/btc_jpy/ticker");
    }

    #[test]
    fn test_compose_rejects_separators() {
        let root = Exchange::Binance.api_root(Visibility::Public);
        for bad in ["ticker/24hr", "", "a?b", "a#b"] {
            let result = EndpointPath::action(bad).compose(&root);
            assert!(matches!(result, Err(ClientError::Configuration(_))), "{bad}");
        }
    }

    #[test]
    fn test_endpoint_display_is_relative_path() {
        assert_eq!(
            EndpointPath::resource(["ticker"], "24hr").to_string(),
            "ticker/24hr"
        );
    }

    #[test]
    fn test_masked_url_hides_signature() {
        let url = Url::parse("https://api.binance.com/api/v3/account").unwrap();
        let mut request = EndpointRequest::new(Method::GET, url);
        request.append_query([("timestamp", "1"), ("signature", "abcdef")]);
        assert_eq!(request.query_string(), "timestamp=1&signature=abcdef");
        assert!(!request.masked_url().contains("abcdef"));
        assert!(!format!("{:?}", request).contains("abcdef"));

        request.append_query(Vec::<(String, String)>::new());
        assert_eq!(request.query_string(), "timestamp=1&signature=abcdef");
    }
}

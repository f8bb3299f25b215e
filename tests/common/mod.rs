#![allow(dead_code)]

use async_trait::async_trait;
use coinbridge::core::kernel::{EndpointRequest, HttpResponseData, Transport};
use coinbridge::ClientError;
use reqwest::header::HeaderMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Transport that answers every call with one canned response and keeps
/// the requests it was handed.
pub struct MockTransport {
    status: u16,
    body: String,
    calls: AtomicUsize,
    requests: Mutex<Vec<EndpointRequest>>,
}

impl MockTransport {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<EndpointRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &EndpointRequest) -> Result<HttpResponseData, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        Ok(HttpResponseData {
            status: self.status,
            headers: HeaderMap::new(),
            body: self.body.as_bytes().to_vec(),
            elapsed: Duration::from_millis(1),
            url: request.url.clone(),
            method: request.method.clone(),
        })
    }
}

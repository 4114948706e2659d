//! Response capture: an in-memory response sink finalized into an ALB
//! response document.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::StatusCode;
use lambda_runtime::tracing::{debug, warn};
use tokio::sync::oneshot;

use crate::models::{AdapterError, AlbTargetGroupResponse, Headers};
use crate::sniff::detect_content_type;

const CONTENT_TYPE_HEADER_KEY: &str = "Content-Type";

/// Receiver resolved once the response has been finalized.
///
/// Resolves with an error instead if the capture is dropped without a
/// successful finalize.
pub type CloseNotification = oneshot::Receiver<()>;

/// The write contract handlers use to produce a response.
pub trait ResponseWriter: Send {
    /// Mutable access to the response headers.
    fn headers_mut(&mut self) -> &mut Headers;

    /// Replaces every value of a header.
    fn set_header(&mut self, key: &str, values: Vec<String>) {
        self.headers_mut().set_all(key, values);
    }

    /// Appends body bytes and returns how many were written.
    ///
    /// The first write establishes status 200 if none was set and fills in
    /// `Content-Type` from the written bytes if the header is absent.
    fn append(&mut self, body: &[u8]) -> usize;

    /// Assigns the status code. Only the first status assignment, explicit or
    /// implied by [`Self::append`], takes effect.
    fn set_status(&mut self, status: u16);

    /// Registers an observer signaled when the response is finalized.
    fn register_close_observer(&mut self) -> CloseNotification;
}

/// Accumulates what a handler writes for a single invocation.
#[derive(Debug, Default)]
pub struct ResponseCapture {
    headers: Headers,
    body: Vec<u8>,
    status: Option<u16>,
    observers: Vec<oneshot::Sender<()>>,
}

impl ResponseCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status code, once established.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Finalizes the captured state into the response sent to the load balancer.
    ///
    /// Observers are signaled on the first successful call only; later calls
    /// return the same document without signaling again.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::IncompleteResponse` if no status was ever set.
    pub fn get_response(&mut self) -> Result<AlbTargetGroupResponse, AdapterError> {
        let Some(status) = self.status else {
            return Err(AdapterError::IncompleteResponse);
        };

        self.notify_closed();

        let (body, is_base64_encoded) = match std::str::from_utf8(&self.body) {
            Ok(text) => (text.to_string(), false),
            Err(_) => (STANDARD.encode(&self.body), true),
        };

        Ok(AlbTargetGroupResponse {
            status_code: status,
            status_description: status_description(status),
            headers: self.headers.to_single_value_map(),
            multi_value_headers: self.headers.clone().into_multi_value_map(),
            body,
            is_base64_encoded,
        })
    }

    fn notify_closed(&mut self) {
        for observer in self.observers.drain(..) {
            if observer.send(()).is_err() {
                debug!("Close observer dropped before notification");
            }
        }
    }
}

impl ResponseWriter for ResponseCapture {
    fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    fn append(&mut self, body: &[u8]) -> usize {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK.as_u16());
        }

        if !self.headers.contains_key(CONTENT_TYPE_HEADER_KEY) {
            self.headers
                .set(CONTENT_TYPE_HEADER_KEY, detect_content_type(body));
        }

        self.body.extend_from_slice(body);
        body.len()
    }

    fn set_status(&mut self, status: u16) {
        match self.status {
            None => self.status = Some(status),
            Some(current) => {
                warn!(current, ignored = status, "Status code already set");
            }
        }
    }

    fn register_close_observer(&mut self) -> CloseNotification {
        let (tx, rx) = oneshot::channel();
        self.observers.push(tx);
        rx
    }
}

/// `"404 Not Found"` style description expected by the load balancer.
fn status_description(status: u16) -> Option<String> {
    let code = StatusCode::from_u16(status).ok()?;
    Some(code.canonical_reason().map_or_else(
        || status.to_string(),
        |reason| format!("{status} {reason}"),
    ))
}

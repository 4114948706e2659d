//! Translation of ALB target-group events into `http::Request` values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use http::Request;
use lambda_runtime::Context;
use lambda_runtime::tracing::{debug, error};
use std::collections::BTreeMap;

use crate::models::{AdapterError, AlbTargetGroupRequest, AlbTargetGroupRequestContext};
use crate::utils::{BasePath, normalize_base_path, query_unescape};

/// Environment variable overriding the host of translated request URLs.
pub const CUSTOM_HOST_VARIABLE: &str = "ALB_API_HOST";

/// Host used when [`CUSTOM_HOST_VARIABLE`] is not set.
pub const DEFAULT_SERVER_ADDRESS: &str = "https://aws-serverless-alb-api.com";

/// Invocation metadata carried in the extensions of a translated request.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub lambda_context: Context,
    pub request_context: AlbTargetGroupRequestContext,
}

/// Access to the [`InvocationContext`] from handler code.
pub trait InvocationContextExt {
    /// Metadata attached by [`RequestAccessor::event_to_request_with_context`].
    fn invocation_context(&self) -> Option<&InvocationContext>;
}

impl<B> InvocationContextExt for Request<B> {
    fn invocation_context(&self) -> Option<&InvocationContext> {
        self.extensions().get::<InvocationContext>()
    }
}

/// Converts load-balancer events into HTTP requests.
///
/// The base path is fixed at construction; build a new accessor to change it.
/// A single accessor can be shared by concurrent invocations.
#[derive(Debug, Clone, Default)]
pub struct RequestAccessor {
    base_path: BasePath,
}

impl RequestAccessor {
    /// An accessor that leaves inbound paths untouched.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An accessor that strips `base_path` from the front of inbound paths.
    #[must_use]
    pub fn with_base_path(base_path: &str) -> Self {
        Self {
            base_path: normalize_base_path(base_path),
        }
    }

    #[must_use]
    pub const fn base_path(&self) -> &BasePath {
        &self.base_path
    }

    /// Translates an event without invocation metadata.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::event_to_request`].
    pub fn proxy_event_to_request(
        &self,
        event: &AlbTargetGroupRequest,
    ) -> Result<Request<Bytes>, AdapterError> {
        let request = self.event_to_request(event)?;
        Ok(add_to_header(request, event))
    }

    /// Translates an event and attaches an [`InvocationContext`] to the
    /// request extensions.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::event_to_request`].
    pub fn event_to_request_with_context(
        &self,
        context: &Context,
        event: &AlbTargetGroupRequest,
    ) -> Result<Request<Bytes>, AdapterError> {
        let mut request = self.event_to_request(event)?;
        request.extensions_mut().insert(InvocationContext {
            lambda_context: context.clone(),
            request_context: event.request_context.clone(),
        });
        Ok(request)
    }

    /// Builds the HTTP request described by `event`.
    ///
    /// # Errors
    ///
    /// - `AdapterError::Decode` if the body is flagged as base64 but is not.
    /// - `AdapterError::RequestConstruction` if the method, URL or a header
    ///   is not valid HTTP.
    pub fn event_to_request(
        &self,
        event: &AlbTargetGroupRequest,
    ) -> Result<Request<Bytes>, AdapterError> {
        let raw_body = event.body.as_deref().unwrap_or_default();
        let body = if event.is_base64_encoded {
            Bytes::from(STANDARD.decode(raw_body).map_err(|e| {
                error!(error = %e, "Failed to decode base64 request body");
                AdapterError::Decode(e)
            })?)
        } else {
            Bytes::copy_from_slice(raw_body.as_bytes())
        };

        let path = self.base_path.strip(&event.path);
        let mut url = server_address();
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);

        let query = build_query_string(event);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        debug!(method = %event.http_method, url = %url, "Translating ALB event");

        let mut builder = Request::builder()
            .method(event.http_method.to_uppercase().as_str())
            .uri(url.as_str());

        for (name, value) in &event.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        for (name, values) in &event.multi_value_headers {
            builder = builder.header(name.as_str(), values.join(","));
        }

        builder.body(body).map_err(|e| {
            error!(
                error = %e,
                method = %event.http_method,
                path = %event.path,
                "Could not convert ALB event to http::Request"
            );
            AdapterError::from(e)
        })
    }
}

/// Hook run on context-free translations before callers add their own headers.
fn add_to_header(
    request: Request<Bytes>,
    _event: &AlbTargetGroupRequest,
) -> Request<Bytes> {
    request
}

fn server_address() -> String {
    resolve_server_address(std::env::var(CUSTOM_HOST_VARIABLE).ok())
}

fn resolve_server_address(custom: Option<String>) -> String {
    custom.unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Rebuilds the query string from both parameter maps.
///
/// Every multi-value pair is kept; single-value entries are added for keys
/// the multi-value map does not carry. Keys and values are unescaped once and
/// then percent-encoded. Keys are emitted in sorted order and values keep
/// their original order.
fn build_query_string(event: &AlbTargetGroupRequest) -> String {
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (key, values) in &event.multi_value_query_string_parameters {
        params
            .entry(query_unescape(key).into_owned())
            .or_default()
            .extend(values.iter().map(|v| query_unescape(v).into_owned()));
    }

    for (key, value) in &event.query_string_parameters {
        if event.multi_value_query_string_parameters.contains_key(key) {
            continue;
        }
        params
            .entry(query_unescape(key).into_owned())
            .or_default()
            .push(query_unescape(value).into_owned());
    }

    params
        .iter()
        .flat_map(|(key, values)| {
            let key = urlencoding::encode(key);
            values
                .iter()
                .map(move |value| format!("{key}={}", urlencoding::encode(value)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn event(path: &str, method: &str) -> AlbTargetGroupRequest {
        AlbTargetGroupRequest {
            path: path.to_string(),
            http_method: method.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_server_address() {
        assert_eq!(resolve_server_address(None), DEFAULT_SERVER_ADDRESS);
        assert_eq!(
            resolve_server_address(Some("http://localhost:3000".to_string())),
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_query_from_multi_value() {
        let mut e = event("/", "GET");
        e.multi_value_query_string_parameters =
            HashMap::from([("color".to_string(), vec!["red".to_string(), "blue".to_string()])]);
        assert_eq!(build_query_string(&e), "color=red&color=blue");
    }

    #[test]
    fn test_query_merges_single_value_keys() {
        let mut e = event("/", "GET");
        e.multi_value_query_string_parameters =
            HashMap::from([("a".to_string(), vec!["1".to_string(), "2".to_string()])]);
        e.query_string_parameters = HashMap::from([
            ("a".to_string(), "2".to_string()),
            ("b".to_string(), "3".to_string()),
        ]);
        assert_eq!(build_query_string(&e), "a=1&a=2&b=3");
    }

    #[test]
    fn test_query_reencodes_components() {
        let mut e = event("/", "GET");
        e.query_string_parameters = HashMap::from([
            ("q".to_string(), "hello%20world".to_string()),
            ("tag name".to_string(), "a&b=c".to_string()),
        ]);
        assert_eq!(build_query_string(&e), "q=hello%20world&tag%20name=a%26b%3Dc");
    }

    #[test]
    fn test_query_empty() {
        assert_eq!(build_query_string(&event("/", "GET")), "");
    }

    #[test]
    fn test_add_to_header_is_pass_through() {
        let e = event("/x", "GET");
        let request = RequestAccessor::new().event_to_request(&e).unwrap();
        let uri = request.uri().clone();
        let passed = add_to_header(request, &e);
        assert_eq!(passed.uri(), &uri);
        assert!(passed.headers().is_empty());
    }
}

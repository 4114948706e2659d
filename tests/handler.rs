// Adapter tests: translate, serve and finalize through custom handlers
#![allow(clippy::unwrap_used)]

use alb_lambda_adapter::handler::{Adapter, gateway_timeout};
use alb_lambda_adapter::models::{AdapterError, AlbTargetGroupRequest};
use alb_lambda_adapter::request::InvocationContextExt;
use alb_lambda_adapter::response::ResponseWriter;
use alb_lambda_adapter::service::HttpHandler;
use async_trait::async_trait;
use bytes::Bytes;
use http::Request;
use lambda_runtime::{Context, Diagnostic};
use std::sync::Mutex;

/// Writes the request path as plain text.
struct PathHandler;

#[async_trait]
impl HttpHandler for PathHandler {
    async fn serve(&self, request: Request<Bytes>, response: &mut dyn ResponseWriter) {
        response.set_header("Content-Type", vec!["text/plain".to_string()]);
        response.append(request.uri().path().as_bytes());
    }
}

/// Records the target-group ARN seen by the handler.
#[derive(Default)]
struct ContextRecorder {
    seen: Mutex<Option<String>>,
}

#[async_trait]
impl HttpHandler for ContextRecorder {
    async fn serve(&self, request: Request<Bytes>, response: &mut dyn ResponseWriter) {
        let arn = request
            .invocation_context()
            .map(|ctx| ctx.request_context.elb.target_group_arn.clone());
        *self.seen.lock().unwrap() = arn;
        response.set_status(204);
    }
}

/// Never writes anything.
struct Silent;

#[async_trait]
impl HttpHandler for Silent {
    async fn serve(&self, _request: Request<Bytes>, _response: &mut dyn ResponseWriter) {}
}

fn get_request(path: &str) -> AlbTargetGroupRequest {
    AlbTargetGroupRequest {
        path: path.to_string(),
        http_method: "GET".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_proxy_strips_base_path() {
    let adapter = Adapter::new(PathHandler).with_base_path("/api/v1");
    let response = adapter.proxy(get_request("/api/v1/widgets/42")).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "/widgets/42");
    assert_eq!(response.headers["Content-Type"], "text/plain");
}

#[tokio::test]
async fn test_proxy_with_context_exposes_target_group() {
    let mut event = get_request("/");
    event.request_context.elb.target_group_arn = "arn:test".to_string();

    let adapter = Adapter::new(ContextRecorder::default());
    let response = adapter.proxy_with_context(&Context::default(), event).await;

    assert_eq!(response.status_code, 204);
    assert_eq!(
        adapter.handler().seen.lock().unwrap().as_deref(),
        Some("arn:test")
    );
}

#[tokio::test]
async fn test_decode_failure_yields_gateway_timeout() {
    let mut event = get_request("/");
    event.body = Some("%%%".to_string());
    event.is_base64_encoded = true;

    let adapter = Adapter::new(PathHandler);
    assert!(matches!(
        adapter.try_proxy(event.clone()).await,
        Err(AdapterError::Decode(_))
    ));
    assert_eq!(adapter.proxy(event).await, gateway_timeout());
}

#[tokio::test]
async fn test_incomplete_response_yields_gateway_timeout() {
    let adapter = Adapter::new(Silent);
    let response = adapter
        .proxy_with_context(&Context::default(), get_request("/"))
        .await;
    assert_eq!(response.status_code, 504);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_try_proxy_error_maps_to_diagnostic() {
    let adapter = Adapter::new(Silent);
    let err = adapter.try_proxy(get_request("/")).await.unwrap_err();
    let diagnostic = Diagnostic::from(err);
    assert_eq!(diagnostic.error_type, "IncompleteResponseError");
}

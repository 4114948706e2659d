use async_trait::async_trait;
use bytes::Bytes;
use http::Request;
use lambda_runtime::tracing::{error, info};
use serde::Serialize;

use super::HttpHandler;
use crate::request::InvocationContextExt;
use crate::response::ResponseWriter;

/// Reflects the translated request back as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EchoBody<'a> {
    method: &'a str,
    path: &'a str,
    query: Option<&'a str>,
    headers: Vec<(&'a str, &'a str)>,
    body: String,
    target_group_arn: Option<&'a str>,
}

#[async_trait]
impl HttpHandler for EchoHandler {
    async fn serve(&self, request: Request<Bytes>, response: &mut dyn ResponseWriter) {
        info!(method = %request.method(), path = %request.uri().path(), "Echoing request");

        let echo = EchoBody {
            method: request.method().as_str(),
            path: request.uri().path(),
            query: request.uri().query(),
            headers: request
                .headers()
                .iter()
                .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)))
                .collect(),
            body: String::from_utf8_lossy(request.body()).into_owned(),
            target_group_arn: request
                .invocation_context()
                .map(|ctx| ctx.request_context.elb.target_group_arn.as_str()),
        };

        match serde_json::to_vec(&echo) {
            Ok(payload) => {
                response.set_header("Content-Type", vec!["application/json".to_string()]);
                response.set_status(200);
                response.append(&payload);
            }
            Err(e) => {
                error!(error = %e, "Failed to serialize echo body");
                response.set_status(500);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::response::ResponseCapture;
    use serde_json::Value;

    #[tokio::test]
    async fn test_echo_reflects_request() {
        let request = Request::builder()
            .method("POST")
            .uri("https://example.com/items?id=7")
            .header("x-test", "1")
            .body(Bytes::from_static(b"payload"))
            .unwrap();

        let mut capture = ResponseCapture::new();
        EchoHandler.serve(request, &mut capture).await;
        let response = capture.get_response().unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers["Content-Type"], "application/json");

        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["method"], "POST");
        assert_eq!(body["path"], "/items");
        assert_eq!(body["query"], "id=7");
        assert_eq!(body["body"], "payload");
        assert_eq!(body["headers"][0][0], "x-test");
        assert!(body["targetGroupArn"].is_null());
    }
}

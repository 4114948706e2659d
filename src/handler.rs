use bytes::Bytes;
use http::{Request, StatusCode};
use lambda_runtime::tracing::{debug, error};
use lambda_runtime::{Context, Diagnostic, LambdaEvent};

use crate::models::{AdapterError, AlbTargetGroupRequest, AlbTargetGroupResponse};
use crate::request::RequestAccessor;
use crate::response::ResponseCapture;
use crate::service::HttpHandler;

/// Fallback response sent when an event cannot be served.
#[must_use]
pub fn gateway_timeout() -> AlbTargetGroupResponse {
    AlbTargetGroupResponse {
        status_code: StatusCode::GATEWAY_TIMEOUT.as_u16(),
        ..Default::default()
    }
}

/// Runs an [`HttpHandler`] for every load-balancer event.
#[derive(Debug, Clone, Default)]
pub struct Adapter<H> {
    accessor: RequestAccessor,
    handler: H,
}

impl<H: HttpHandler> Adapter<H> {
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self {
            accessor: RequestAccessor::new(),
            handler,
        }
    }

    /// Rebuilds the adapter so it strips `base_path` from inbound paths.
    #[must_use]
    pub fn with_base_path(self, base_path: &str) -> Self {
        Self {
            accessor: RequestAccessor::with_base_path(base_path),
            handler: self.handler,
        }
    }

    #[must_use]
    pub const fn accessor(&self) -> &RequestAccessor {
        &self.accessor
    }

    #[must_use]
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Serves an event, answering with [`gateway_timeout`] on any failure.
    pub async fn proxy(&self, event: AlbTargetGroupRequest) -> AlbTargetGroupResponse {
        or_gateway_timeout(self.try_proxy(event).await)
    }

    /// Serves an event with invocation metadata attached to the request,
    /// answering with [`gateway_timeout`] on any failure.
    pub async fn proxy_with_context(
        &self,
        context: &Context,
        event: AlbTargetGroupRequest,
    ) -> AlbTargetGroupResponse {
        or_gateway_timeout(self.try_proxy_with_context(context, event).await)
    }

    /// Serves an event and reports failures instead of substituting a response.
    ///
    /// # Errors
    ///
    /// Returns the `AdapterError` raised while translating the event or
    /// finalizing the response.
    pub async fn try_proxy(
        &self,
        event: AlbTargetGroupRequest,
    ) -> Result<AlbTargetGroupResponse, AdapterError> {
        let request = self.accessor.proxy_event_to_request(&event)?;
        self.serve(request).await
    }

    /// Context-carrying variant of [`Self::try_proxy`].
    ///
    /// # Errors
    ///
    /// Returns the `AdapterError` raised while translating the event or
    /// finalizing the response.
    pub async fn try_proxy_with_context(
        &self,
        context: &Context,
        event: AlbTargetGroupRequest,
    ) -> Result<AlbTargetGroupResponse, AdapterError> {
        let request = self.accessor.event_to_request_with_context(context, &event)?;
        self.serve(request).await
    }

    /// Lambda entry point. Failures are logged and answered with a gateway
    /// timeout so the load balancer always receives a response document.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` matches the runtime's service signature.
    pub async fn function_handler(
        &self,
        event: LambdaEvent<AlbTargetGroupRequest>,
    ) -> Result<AlbTargetGroupResponse, Diagnostic> {
        let (payload, context) = event.into_parts();
        debug!(request_id = %context.request_id, path = %payload.path, "Handling ALB event");
        Ok(self.proxy_with_context(&context, payload).await)
    }

    async fn serve(&self, request: Request<Bytes>) -> Result<AlbTargetGroupResponse, AdapterError> {
        let mut capture = ResponseCapture::new();
        self.handler.serve(request, &mut capture).await;
        capture.get_response()
    }
}

fn or_gateway_timeout(result: Result<AlbTargetGroupResponse, AdapterError>) -> AlbTargetGroupResponse {
    result.unwrap_or_else(|e| {
        match e {
            AdapterError::IncompleteResponse => {
                error!(error = %e, "Error while generating ALB target group response");
            }
            AdapterError::Decode(_) | AdapterError::RequestConstruction(_) => {
                error!(error = %e, "Could not convert ALB target group request to request");
            }
        }
        gateway_timeout()
    })
}

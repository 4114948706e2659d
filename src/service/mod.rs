//! The seam between the adapter and application HTTP logic.

mod echo;

use async_trait::async_trait;
use bytes::Bytes;
use http::Request;

use crate::response::ResponseWriter;

pub use echo::EchoHandler;

/// Application logic served behind the load balancer.
///
/// Implementations receive the translated request and write their response
/// through the [`ResponseWriter`] contract. Routers and middleware chains plug
/// in here.
#[async_trait]
pub trait HttpHandler: Send + Sync {
    async fn serve(&self, request: Request<Bytes>, response: &mut dyn ResponseWriter);
}

//! Serve ordinary HTTP handlers from a Lambda function behind an Application
//! Load Balancer.
//!
//! [`request::RequestAccessor`] turns a target-group event into an
//! `http::Request`, the [`service::HttpHandler`] writes into a
//! [`response::ResponseCapture`], and the capture is finalized into the
//! response document the load balancer expects. [`handler::Adapter`] wires
//! the three together.

pub mod config;
pub mod handler;
pub mod models;
pub mod request;
pub mod response;
pub mod service;
pub mod sniff;
pub mod utils;

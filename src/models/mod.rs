pub mod alb;
pub mod error;
pub mod headers;

pub use alb::*;
pub use error::AdapterError;
pub use headers::Headers;

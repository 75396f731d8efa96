//! Sink implementations
//!
//! Contains HttpSink and LogSink.

mod http;
mod log;

pub use self::http::{HttpSink, LINE_PROTOCOL_CONTENT_TYPE};
pub use self::log::LogSink;

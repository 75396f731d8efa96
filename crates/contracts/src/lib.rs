//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Data model
//! - [`FieldValue`]: closed scalar type used for both tags and fields
//! - [`Point`]: one logical measurement before encoding
//! - [`EncodedPoint`]: one serialized line, the only unit crossing the dispatcher channel
//! - [`LineSink`]: destination of flushed batches

mod config;
mod error;
mod point;
mod sink;
mod value;

pub use config::*;
pub use error::*;
pub use point::*;
pub use sink::*;
pub use value::FieldValue;

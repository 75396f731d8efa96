//! # Line Protocol
//!
//! Point encoder for the line-oriented text wire format.
//!
//! Responsibilities:
//! - Encode a [`Point`](contracts::Point) into one `EncodedPoint` line
//! - Escape reserved characters, reject what cannot be represented
//! - Parse a line back (used to verify lossless encoding)
//!
//! Line layout:
//!
//! ```text
//! <name>[,<tag_k>=<tag_v>...] <field_k>=<field_v>[,<field_k>=<field_v>...] <timestamp_ns>
//! ```
//!
//! # Example
//!
//! ```
//! use contracts::Point;
//!
//! let point = Point::new("cpu").tag("hostname", "h1").field("usage", 0.42);
//! let line = line_protocol::encode_at(&point, 1_700_000_000_000_000_000).unwrap();
//! assert_eq!(line.as_str(), "cpu,hostname=h1 usage=0.42 1700000000000000000");
//! ```

mod encode;
mod error;
mod escape;
mod json;
mod parse;

pub use encode::{encode, encode_at, now_nanos};
pub use error::{EncodeError, ParseError};
pub use json::{map_from_json, value_from_json};
pub use parse::{parse_line, ParsedLine};

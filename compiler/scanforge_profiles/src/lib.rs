//! Ready-made scanforge profiles.
//!
//! - [`c_like`]: C and C++ sources.
//! - [`diagram`]: text diagram descriptions.
//! - [`literals`]: the literal sub-parsers both profiles use, also usable
//!   in custom profiles.
//!
//! Each profile module exposes `options()`, `builder()` (for extending the
//! profile), `profile()` and `filters(sink)`, plus the kind constants its
//! tokens carry.

pub mod c_like;
pub mod diagram;
pub mod literals;

pub use literals::{QuotedLiteralParser, RawStringParser};

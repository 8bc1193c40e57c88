//! Byte sources for decoding
//!
//! The decoder reads through the [`ByteSource`] trait, implemented for
//! in-memory `&[u8]` cursors and for any `io::Read` via [`ReadSource`].

mod reader;
mod traits;

pub use reader::ReadSource;
pub use traits::ByteSource;

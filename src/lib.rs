//! Negotiated HTTP response compression for Tower.
//!
//! This crate provides a Tower layer that picks one of Zstd, Brotli or Gzip
//! from the client's `Accept-Encoding` header and compresses the response
//! body, either in one go for buffered bodies or chunk by chunk for
//! streaming ones.
//!
//! # Example
//!
//! ```ignore
//! use negotiated_compression::{CompressionLayer, Payload};
//! use tower::ServiceBuilder;
//!
//! let service = ServiceBuilder::new()
//!     .layer(CompressionLayer::new().min_size(1024))
//!     .service(my_service); // returns http::Response<Payload<B>>
//! ```
//!
//! # Negotiation
//!
//! Client quality values are ignored except for `q=0`, which excludes an
//! encoding. The server's codec order (default: zstd, br, gzip) decides
//! between acceptable encodings, and `*` always resolves to the first codec.
//! Only the first 200 characters of the header are considered.
//!
//! # Compression Rules
//!
//! The middleware will **not** compress responses when:
//! - `Content-Encoding` header is already set
//! - A buffered body is shorter than the minimum size (default: 500 bytes)
//! - No supported encoding is accepted by the client
//! - Compressing a buffered body would save 100 bytes or less
//!
//! # Response Modifications
//!
//! `Vary` gains `Accept-Encoding` for every response that passed the first two
//! checks. When compression is applied:
//! - `Content-Encoding` header is set to the codec used
//! - `Content-Length` is set to the compressed size for buffered bodies and
//!   removed for streaming ones
//! - A strong `ETag` is made weak (`W/"..."`)
//!
//! Compressed streaming bodies start with an empty data frame, emitted before
//! the inner body is polled.

#![deny(missing_docs)]

mod accept;
mod body;
mod codec;
mod compressor;
mod config;
mod error;
mod future;
mod layer;
mod registry;
mod service;

#[cfg(test)]
mod test_util;

pub use accept::{Capabilities, WILDCARD, parse_accept_encoding};
pub use body::{CompressionBody, Payload};
pub use codec::Codec;
pub use compressor::Compressor;
pub use config::{
    CompressionConfig, DEFAULT_MAX_ACCEPT_ENCODING_LEN, DEFAULT_MIN_IMPROVEMENT, DEFAULT_MIN_SIZE,
    Levels,
};
pub use error::{BoxError, CompressionError};
pub use future::ResponseFuture;
pub use layer::CompressionLayer;
pub use registry::Registry;
pub use service::CompressionService;

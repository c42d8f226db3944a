use std::io;

/// Boxed error type returned by [`CompressionService`](crate::CompressionService).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while compressing a response.
#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    /// The codec failed to encode a buffered body.
    #[error("{codec} encoder failed")]
    Encode {
        /// `Content-Encoding` token of the failing codec.
        codec: &'static str,
        /// Underlying codec error.
        #[source]
        source: io::Error,
    },
}

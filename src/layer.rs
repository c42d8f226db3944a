use crate::codec::Codec;
use crate::compressor::Compressor;
use crate::config::CompressionConfig;
use crate::service::CompressionService;
use tower::Layer;

/// A Tower layer that compresses HTTP response bodies.
///
/// This layer wraps services and compresses their responses with the best
/// codec the client's `Accept-Encoding` header allows.
#[derive(Debug, Clone, Default)]
pub struct CompressionLayer {
    config: CompressionConfig,
}

impl CompressionLayer {
    /// Creates a new compression layer with default settings.
    ///
    /// Buffered bodies under 500 bytes are left alone, compression must save
    /// more than 100 bytes, and codecs are preferred in the order zstd, br, gzip.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a layer from a complete configuration.
    pub fn with_config(config: CompressionConfig) -> Self {
        Self { config }
    }

    /// Sets the minimum buffered body size required for compression.
    pub fn min_size(mut self, size: usize) -> Self {
        self.config = self.config.min_size(size);
        self
    }

    /// Sets how many bytes compression must save before it is applied.
    pub fn min_improvement(mut self, bytes: usize) -> Self {
        self.config = self.config.min_improvement(bytes);
        self
    }

    /// Sets how many characters of `Accept-Encoding` are parsed.
    pub fn max_accept_encoding_len(mut self, len: usize) -> Self {
        self.config = self.config.max_accept_encoding_len(len);
        self
    }

    /// Sets the codecs to offer, most preferred first.
    pub fn codecs<I>(mut self, codecs: I) -> Self
    where
        I: IntoIterator<Item = Codec>,
    {
        self.config = self.config.codecs(codecs);
        self
    }

    /// Sets the zstd level.
    pub fn zstd_level(mut self, level: i32) -> Self {
        self.config = self.config.zstd_level(level);
        self
    }

    /// Sets the brotli quality.
    pub fn brotli_level(mut self, level: u32) -> Self {
        self.config = self.config.brotli_level(level);
        self
    }

    /// Sets the gzip level.
    pub fn gzip_level(mut self, level: u32) -> Self {
        self.config = self.config.gzip_level(level);
        self
    }
}

impl<S> Layer<S> for CompressionLayer {
    type Service = CompressionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CompressionService::new(inner, Compressor::new(self.config.clone()))
    }
}

use crate::codec::Codec;
use crate::registry::Registry;

/// Default minimum buffered body size for compression.
///
/// Bodies below this likely fit in one MTU together with their headers, so
/// compressing them does not change the number of packets sent.
pub const DEFAULT_MIN_SIZE: usize = 500;

/// Default number of bytes compression has to save to be applied.
///
/// Must cover at least `Content-Encoding: gzip\r\n`; larger values also pay
/// for the client's decompression time.
pub const DEFAULT_MIN_IMPROVEMENT: usize = 100;

/// Default cap on how much of `Accept-Encoding` is parsed.
pub const DEFAULT_MAX_ACCEPT_ENCODING_LEN: usize = 200;

/// Per-codec compression levels.
///
/// Levels are fixed for the lifetime of a [`CompressionConfig`]; the same
/// input always compresses to the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Levels {
    /// Zstd level, 1 to 22.
    pub zstd: i32,
    /// Brotli quality, 0 to 11.
    pub brotli: u32,
    /// Gzip level, 0 to 9.
    pub gzip: u32,
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            zstd: 7,
            brotli: 4,
            gzip: 6,
        }
    }
}

/// Process-wide compression settings.
///
/// Built once at startup and shared read-only by every request through
/// [`Compressor`](crate::Compressor).
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    pub(crate) min_size: usize,
    pub(crate) min_improvement: usize,
    pub(crate) max_accept_encoding_len: usize,
    pub(crate) levels: Levels,
    pub(crate) registry: Registry,
}

impl CompressionConfig {
    /// Creates a configuration with the default thresholds, levels and codec order.
    pub fn new() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            min_improvement: DEFAULT_MIN_IMPROVEMENT,
            max_accept_encoding_len: DEFAULT_MAX_ACCEPT_ENCODING_LEN,
            levels: Levels::default(),
            registry: Registry::default(),
        }
    }

    /// Sets the minimum buffered body size required for compression.
    ///
    /// Streaming bodies are not subject to this check.
    pub fn min_size(mut self, size: usize) -> Self {
        self.min_size = size;
        self
    }

    /// Sets how many bytes compression must save before it is applied.
    pub fn min_improvement(mut self, bytes: usize) -> Self {
        self.min_improvement = bytes;
        self
    }

    /// Sets how many characters of `Accept-Encoding` are looked at.
    pub fn max_accept_encoding_len(mut self, len: usize) -> Self {
        self.max_accept_encoding_len = len;
        self
    }

    /// Sets the codecs to offer, most preferred first.
    pub fn codecs<I>(mut self, codecs: I) -> Self
    where
        I: IntoIterator<Item = Codec>,
    {
        self.registry = Registry::new(codecs);
        self
    }

    /// Sets the zstd level, clamped to 1..=22.
    pub fn zstd_level(mut self, level: i32) -> Self {
        self.levels.zstd = level.clamp(1, 22);
        self
    }

    /// Sets the brotli quality, clamped to 0..=11.
    pub fn brotli_level(mut self, level: u32) -> Self {
        self.levels.brotli = level.min(11);
        self
    }

    /// Sets the gzip level, clamped to 0..=9.
    pub fn gzip_level(mut self, level: u32) -> Self {
        self.levels.gzip = level.min(9);
        self
    }

    /// Returns the configured codec registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the configured compression levels.
    pub fn levels(&self) -> Levels {
        self.levels
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self::new()
    }
}

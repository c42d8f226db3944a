use crate::accept::parse_accept_encoding;
use crate::body::{CompressionBody, Payload};
use crate::codec::Codec;
use crate::config::CompressionConfig;
use crate::error::CompressionError;
use http::{HeaderMap, HeaderValue, Response, header};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, trace};

const ACCEPT_ENCODING: &str = "Accept-Encoding";

/// Applies negotiated compression to responses.
///
/// Cloning is cheap; every clone shares the same read-only configuration.
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    config: Arc<CompressionConfig>,
}

impl Compressor {
    /// Creates a compressor with the given configuration.
    pub fn new(config: CompressionConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Picks a codec for a raw `Accept-Encoding` value, or `None` if the
    /// client and server have no encoding in common.
    pub fn negotiate(&self, accept_encoding: &str) -> Option<Codec> {
        let capabilities =
            parse_accept_encoding(accept_encoding, self.config.max_accept_encoding_len);
        let codec = self.config.registry.select(&capabilities);
        trace!(
            accept_encoding,
            codec = codec.map(|c| c.content_encoding()),
            "negotiated content encoding"
        );
        codec
    }

    /// Compresses `response` for a request with the given headers.
    ///
    /// Codec failures on a buffered body are returned as errors; the
    /// response is lost in that case.
    pub fn process<B>(
        &self,
        request_headers: &HeaderMap,
        response: Response<Payload<B>>,
    ) -> Result<Response<Payload<CompressionBody<B>>>, CompressionError> {
        let codec = self.negotiate(&accept_encoding(request_headers));
        self.apply(codec, response)
    }

    /// Compresses `response` with an already negotiated codec.
    ///
    /// Responses that already carry `Content-Encoding`, and buffered bodies
    /// below the minimum size, are returned untouched. Otherwise `Vary`
    /// gains `Accept-Encoding`, whether or not compression follows.
    pub fn apply<B>(
        &self,
        codec: Option<Codec>,
        response: Response<Payload<B>>,
    ) -> Result<Response<Payload<CompressionBody<B>>>, CompressionError> {
        let (mut parts, body) = response.into_parts();

        if parts.headers.contains_key(header::CONTENT_ENCODING) {
            debug!("response already encoded, skipping compression");
            return Ok(Response::from_parts(parts, passthrough(body)));
        }
        if let Some(len) = body.as_bytes().map(|data| data.len()) {
            if len < self.config.min_size {
                debug!(len, "response too small to compress");
                return Ok(Response::from_parts(parts, passthrough(body)));
            }
        }

        add_vary_accept_encoding(&mut parts.headers);

        let Some(codec) = codec else {
            debug!("no encoding in common with client");
            return Ok(Response::from_parts(parts, passthrough(body)));
        };

        let body = match body {
            Payload::Streaming { inner } => {
                // Compressed length is unknown until the stream ends
                parts.headers.remove(header::CONTENT_LENGTH);
                let encoder = codec.encoder(&self.config.levels);
                debug!(codec = codec.content_encoding(), "compressing streaming response");
                Payload::streaming(CompressionBody::compressed(inner, encoder))
            }
            Payload::Buffered { data } => {
                let compressed = codec.compress(&data, &self.config.levels)?;
                if !is_worthwhile(data.len(), compressed.len(), self.config.min_improvement) {
                    debug!(
                        codec = codec.content_encoding(),
                        original_len = data.len(),
                        compressed_len = compressed.len(),
                        "compression not worthwhile"
                    );
                    return Ok(Response::from_parts(parts, Payload::buffered(data)));
                }
                debug!(
                    codec = codec.content_encoding(),
                    original_len = data.len(),
                    compressed_len = compressed.len(),
                    "compressed buffered response"
                );
                parts
                    .headers
                    .insert(header::CONTENT_LENGTH, HeaderValue::from(compressed.len()));
                Payload::buffered(compressed)
            }
        };

        weaken_etag(&mut parts.headers);
        parts.headers.insert(
            header::CONTENT_ENCODING,
            HeaderValue::from_static(codec.content_encoding()),
        );

        Ok(Response::from_parts(parts, body))
    }
}

/// Reads the request's `Accept-Encoding`, joining repeated header lines.
///
/// Missing or non-text values read as the empty string.
pub(crate) fn accept_encoding(headers: &HeaderMap) -> Cow<'_, str> {
    let mut values = headers
        .get_all(header::ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok());

    let Some(first) = values.next() else {
        return Cow::Borrowed("");
    };
    let mut joined = match values.next() {
        None => return Cow::Borrowed(first),
        Some(second) => format!("{first}, {second}"),
    };
    for value in values {
        joined.push_str(", ");
        joined.push_str(value);
    }
    Cow::Owned(joined)
}

/// Returns true if compression saves more than `min_improvement` bytes.
fn is_worthwhile(original_len: usize, compressed_len: usize, min_improvement: usize) -> bool {
    compressed_len.saturating_add(min_improvement) < original_len
}

fn passthrough<B>(body: Payload<B>) -> Payload<CompressionBody<B>> {
    match body {
        Payload::Buffered { data } => Payload::buffered(data),
        Payload::Streaming { inner } => Payload::streaming(CompressionBody::passthrough(inner)),
    }
}

/// Adds Accept-Encoding to the Vary header if not already present.
///
/// Existing entries are merged into a single comma-separated value.
fn add_vary_accept_encoding(headers: &mut HeaderMap) {
    let mut entries: Vec<&str> = Vec::new();
    let mut opaque = false;

    for vary in headers.get_all(header::VARY) {
        let Ok(vary_str) = vary.to_str() else {
            opaque = true;
            continue;
        };
        for entry in vary_str.split(',').map(str::trim) {
            if entry == "*" || entry.eq_ignore_ascii_case(ACCEPT_ENCODING) {
                return;
            }
            if !entry.is_empty() {
                entries.push(entry);
            }
        }
    }

    if !opaque {
        entries.push(ACCEPT_ENCODING);
        if let Ok(merged) = HeaderValue::from_str(&entries.join(", ")) {
            headers.insert(header::VARY, merged);
            return;
        }
    }

    headers.append(header::VARY, HeaderValue::from_static(ACCEPT_ENCODING));
}

/// Turns a strong ETag into a weak one.
///
/// Compressed bytes differ from the original representation, so only
/// semantic equivalence can be claimed (RFC 9110 section 8.8.1).
fn weaken_etag(headers: &mut HeaderMap) {
    let Some(etag) = headers.get(header::ETAG) else {
        return;
    };
    if !etag.as_bytes().starts_with(b"\"") {
        return;
    }

    let mut weak = Vec::with_capacity(etag.len() + 2);
    weak.extend_from_slice(b"W/");
    weak.extend_from_slice(etag.as_bytes());
    if let Ok(value) = HeaderValue::from_bytes(&weak) {
        headers.insert(header::ETAG, value);
    }
}

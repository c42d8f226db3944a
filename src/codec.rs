use crate::config::Levels;
use crate::error::CompressionError;
use bytes::{Bytes, BytesMut};
use compression_codecs::EncodeV2;
#[cfg(feature = "brotli")]
use compression_codecs::brotli::{BrotliEncoder, params::EncoderParams as BrotliParams};
#[cfg(feature = "gzip")]
use compression_codecs::gzip::GzipEncoder;
#[cfg(feature = "zstd")]
use compression_codecs::zstd::ZstdEncoder;
#[cfg(any(feature = "brotli", feature = "gzip"))]
use compression_core::Level;
use compression_core::util::{PartialBuffer, WriteBuffer};
use std::io;

const OUTPUT_BUFFER_SIZE: usize = 8 * 1024; // 8KB output buffer

/// Supported compression codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Zstd compression.
    #[cfg(feature = "zstd")]
    Zstd,
    /// Brotli compression.
    #[cfg(feature = "brotli")]
    Brotli,
    /// Gzip compression.
    #[cfg(feature = "gzip")]
    Gzip,
}

impl Codec {
    /// Returns the Content-Encoding header value for this codec.
    pub fn content_encoding(&self) -> &'static str {
        match self {
            #[cfg(feature = "zstd")]
            Codec::Zstd => "zstd",
            #[cfg(feature = "brotli")]
            Codec::Brotli => "br",
            #[cfg(feature = "gzip")]
            Codec::Gzip => "gzip",
        }
    }

    /// Compresses a complete buffer in one go.
    ///
    /// Output is deterministic for a given input and level: the gzip header
    /// carries no modification time.
    pub fn compress(&self, data: &[u8], levels: &Levels) -> Result<Bytes, CompressionError> {
        self.compress_all(data, levels)
            .map_err(|source| CompressionError::Encode {
                codec: self.content_encoding(),
                source,
            })
    }

    fn compress_all(&self, data: &[u8], levels: &Levels) -> io::Result<Bytes> {
        let mut encoder = self.encoder(levels);
        let head = encoder.encode(data)?;
        let tail = encoder.finish()?;

        let mut out = BytesMut::with_capacity(head.len() + tail.len());
        out.extend_from_slice(&head);
        out.extend_from_slice(&tail);
        Ok(out.freeze())
    }

    /// Creates a fresh streaming encoder for this codec.
    pub(crate) fn encoder(&self, levels: &Levels) -> Encoder {
        let inner: Box<dyn EncodeV2 + Send> = match self {
            #[cfg(feature = "zstd")]
            Codec::Zstd => Box::new(ZstdEncoder::new(levels.zstd)),
            #[cfg(feature = "brotli")]
            Codec::Brotli => Box::new(BrotliEncoder::new(
                BrotliParams::default().quality(Level::Precise(levels.brotli as i32)),
            )),
            #[cfg(feature = "gzip")]
            Codec::Gzip => Box::new(GzipEncoder::new(Level::Precise(levels.gzip as i32).into())),
        };
        Encoder {
            inner,
            output_buffer: vec![0u8; OUTPUT_BUFFER_SIZE],
        }
    }
}

/// Drives an [`EncodeV2`] codec state over whole input slices.
///
/// Dropping an `Encoder` releases the codec state whether or not
/// [`finish`](Encoder::finish) was reached.
pub(crate) struct Encoder {
    inner: Box<dyn EncodeV2 + Send>,
    output_buffer: Vec<u8>,
}

impl Encoder {
    /// Feeds `input` to the codec and returns whatever output it produced.
    ///
    /// The result is empty when the codec is still buffering internally.
    pub(crate) fn encode(&mut self, input: &[u8]) -> io::Result<Bytes> {
        let mut input_buf = PartialBuffer::new(input);
        let mut all_output = BytesMut::new();

        // Keep encoding until all input is consumed
        while input_buf.written_len() < input.len() {
            let consumed = input_buf.written_len();
            let mut output = WriteBuffer::new_initialized(self.output_buffer.as_mut_slice());

            self.inner.encode(&mut input_buf, &mut output)?;

            let written = output.written_len();
            if written > 0 {
                all_output.extend_from_slice(&self.output_buffer[..written]);
            } else if input_buf.written_len() == consumed {
                return Err(io::Error::other("encoder made no progress"));
            }
        }

        Ok(all_output.freeze())
    }

    /// Finishes the codec stream and returns the trailing output.
    pub(crate) fn finish(&mut self) -> io::Result<Bytes> {
        let mut all_output = BytesMut::new();

        loop {
            let mut output = WriteBuffer::new_initialized(self.output_buffer.as_mut_slice());

            let done = self.inner.finish(&mut output)?;

            let written = output.written_len();
            if written > 0 {
                all_output.extend_from_slice(&self.output_buffer[..written]);
            }
            if done {
                return Ok(all_output.freeze());
            }
        }
    }
}

use crate::codec::Encoder;
use bytes::{Buf, Bytes};
use http_body::{Body, Frame, SizeHint};
use pin_project_lite::pin_project;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// A response body as seen by the compression layer.
    ///
    /// A buffered payload is fully materialized with a known length and is
    /// compressed in one go. A streaming payload is a lazy, single-pass
    /// body whose length is unknown until it has been read to the end.
    #[project = PayloadProj]
    #[allow(missing_docs)]
    pub enum Payload<B> {
        /// Fixed in-memory body.
        Buffered {
            data: Bytes,
        },
        /// Lazily produced body.
        Streaming {
            #[pin]
            inner: B,
        },
    }
}

impl<B> Payload<B> {
    /// Creates a buffered payload.
    pub fn buffered(data: impl Into<Bytes>) -> Self {
        Self::Buffered { data: data.into() }
    }

    /// Creates a streaming payload.
    pub fn streaming(inner: B) -> Self {
        Self::Streaming { inner }
    }

    /// Returns true for a streaming payload.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Payload::Streaming { .. })
    }

    /// Returns the bytes of a buffered payload.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Payload::Buffered { data } => Some(data),
            Payload::Streaming { .. } => None,
        }
    }
}

impl<B> Body for Payload<B>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.project() {
            PayloadProj::Buffered { data } => {
                if data.is_empty() {
                    Poll::Ready(None)
                } else {
                    Poll::Ready(Some(Ok(Frame::data(std::mem::take(data)))))
                }
            }
            PayloadProj::Streaming { inner } => poll_bytes(inner, cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Payload::Buffered { data } => data.is_empty(),
            Payload::Streaming { inner } => inner.is_end_stream(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            Payload::Buffered { data } => SizeHint::with_exact(data.len() as u64),
            Payload::Streaming { inner } => inner.size_hint(),
        }
    }
}

pin_project! {
    /// A streaming response body that may be compressed.
    ///
    /// This type wraps an inner body and either compresses it using the
    /// chosen codec or passes it through unchanged.
    #[project = CompressionBodyProj]
    #[allow(missing_docs)]
    pub enum CompressionBody<B> {
        /// Compressed body with encoder.
        Compressed {
            #[pin]
            inner: B,
            state: CompressedBody,
        },
        /// Passthrough body without compression.
        Passthrough {
            #[pin]
            inner: B,
        },
    }
}

/// Encoder and progress of an actively compressed body.
pub struct CompressedBody {
    encoder: Option<Encoder>,
    state: CompressState,
    pending_trailers: Option<http::HeaderMap>,
}

impl std::fmt::Debug for CompressedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressedBody")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// State machine for compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompressState {
    /// Nothing emitted yet; the next frame is the empty leading frame.
    Start,
    /// Reading data from inner body and compressing.
    Reading,
    /// Finishing compression after inner body is done.
    Finishing,
    /// Emitting buffered trailers.
    Trailers,
    /// Compression is complete.
    Done,
}

impl CompressedBody {
    fn new(encoder: Encoder) -> Self {
        Self {
            encoder: Some(encoder),
            state: CompressState::Start,
            pending_trailers: None,
        }
    }

    pub(crate) fn state(&self) -> CompressState {
        self.state
    }

    fn fail(&mut self, error: io::Error) -> Poll<Option<Result<Frame<Bytes>, io::Error>>> {
        self.state = CompressState::Done;
        self.encoder = None;
        Poll::Ready(Some(Err(error)))
    }

    /// Polls the inner body and compresses data.
    fn poll_compressed<B>(
        &mut self,
        cx: &mut Context<'_>,
        mut inner: Pin<&mut B>,
    ) -> Poll<Option<Result<Frame<Bytes>, io::Error>>>
    where
        B: Body,
        B::Data: Buf,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        loop {
            match self.state {
                CompressState::Done => return Poll::Ready(None),

                CompressState::Start => {
                    // Lets consumers commit headers before any input is read.
                    self.state = CompressState::Reading;
                    return Poll::Ready(Some(Ok(Frame::data(Bytes::new()))));
                }

                CompressState::Trailers => {
                    self.state = CompressState::Done;
                    return match self.pending_trailers.take() {
                        Some(trailers) => Poll::Ready(Some(Ok(Frame::trailers(trailers)))),
                        None => Poll::Ready(None),
                    };
                }

                CompressState::Finishing => {
                    self.state = if self.pending_trailers.is_some() {
                        CompressState::Trailers
                    } else {
                        CompressState::Done
                    };

                    let Some(mut encoder) = self.encoder.take() else {
                        continue;
                    };
                    match encoder.finish() {
                        Ok(tail) if !tail.is_empty() => {
                            return Poll::Ready(Some(Ok(Frame::data(tail))));
                        }
                        Ok(_) => continue,
                        Err(e) => return self.fail(e),
                    }
                }

                CompressState::Reading => match inner.as_mut().poll_frame(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(None) => {
                        self.state = CompressState::Finishing;
                    }
                    Poll::Ready(Some(Err(e))) => {
                        return self.fail(io::Error::other(e.into()));
                    }
                    Poll::Ready(Some(Ok(frame))) => match frame.into_data() {
                        Ok(mut data) => {
                            let chunk = data.copy_to_bytes(data.remaining());
                            let Some(encoder) = self.encoder.as_mut() else {
                                return self.fail(io::Error::other("encoder already finished"));
                            };
                            match encoder.encode(&chunk) {
                                Ok(out) if !out.is_empty() => {
                                    return Poll::Ready(Some(Ok(Frame::data(out))));
                                }
                                // Encoder is still buffering, pull the next chunk.
                                Ok(_) => {}
                                Err(e) => return self.fail(e),
                            }
                        }
                        Err(frame) => {
                            if let Ok(trailers) = frame.into_trailers() {
                                // Buffer trailers and finish compression first
                                self.pending_trailers = Some(trailers);
                                self.state = CompressState::Finishing;
                            }
                        }
                    },
                },
            }
        }
    }
}

impl<B> CompressionBody<B> {
    /// Creates a compressed body driving the given encoder.
    pub(crate) fn compressed(inner: B, encoder: Encoder) -> Self {
        Self::Compressed {
            inner,
            state: CompressedBody::new(encoder),
        }
    }

    /// Creates a passthrough body without compression.
    pub fn passthrough(inner: B) -> Self {
        Self::Passthrough { inner }
    }
}

impl<B> Body for CompressionBody<B>
where
    B: Body,
    B::Data: Buf,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.project() {
            CompressionBodyProj::Passthrough { inner } => poll_bytes(inner, cx),
            CompressionBodyProj::Compressed { inner, state } => state.poll_compressed(cx, inner),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            CompressionBody::Passthrough { inner } => inner.is_end_stream(),
            CompressionBody::Compressed { state, .. } => state.state() == CompressState::Done,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            CompressionBody::Passthrough { inner } => inner.size_hint(),
            // Compressed size is unknown
            CompressionBody::Compressed { .. } => SizeHint::default(),
        }
    }
}

/// Polls `inner` unchanged, converting data to `Bytes` and errors to `io::Error`.
fn poll_bytes<B>(
    inner: Pin<&mut B>,
    cx: &mut Context<'_>,
) -> Poll<Option<Result<Frame<Bytes>, io::Error>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match inner.poll_frame(cx) {
        Poll::Pending => Poll::Pending,
        Poll::Ready(None) => Poll::Ready(None),
        Poll::Ready(Some(Ok(frame))) => Poll::Ready(Some(Ok(
            frame.map_data(|mut data| data.copy_to_bytes(data.remaining()))
        ))),
        Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(io::Error::other(e.into())))),
    }
}

use crate::codec::Codec;
use bytes::Bytes;
use http_body::{Body, Frame};
use std::collections::VecDeque;
use std::io::{self, Read};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

/// Compressible UTF-8 text, `repeat` paragraphs long.
pub(crate) fn lorem(repeat: usize) -> Vec<u8> {
    "Příliš žluťoučký kůň úpěl ďábelské ódy. Lorem ipsum dolor sit amet, \
     consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore.\n"
        .repeat(repeat)
        .into_bytes()
}

/// Bytes that no codec can shrink.
pub(crate) fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

/// Decodes `data` with the reference decoder for `codec`.
pub(crate) fn decompress(codec: Codec, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    match codec {
        #[cfg(feature = "zstd")]
        Codec::Zstd => {
            out = zstd::stream::decode_all(data).unwrap();
        }
        #[cfg(feature = "brotli")]
        Codec::Brotli => {
            brotli::Decompressor::new(data, 4096)
                .read_to_end(&mut out)
                .unwrap();
        }
        #[cfg(feature = "gzip")]
        Codec::Gzip => {
            flate2::read::GzDecoder::new(data)
                .read_to_end(&mut out)
                .unwrap();
        }
    }
    out
}

/// A test body that yields predefined frames.
pub(crate) struct TestBody {
    frames: VecDeque<Result<Frame<Bytes>, io::Error>>,
    dropped: Arc<AtomicBool>,
}

impl TestBody {
    pub(crate) fn new(frames: Vec<Frame<Bytes>>) -> Self {
        Self {
            frames: frames.into_iter().map(Ok).collect(),
            dropped: Arc::default(),
        }
    }

    pub(crate) fn chunks<I, T>(chunks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        Self::new(chunks.into_iter().map(|c| Frame::data(c.into())).collect())
    }

    /// Yields `frames`, then an error.
    pub(crate) fn failing_after(frames: Vec<Frame<Bytes>>) -> Self {
        let mut body = Self::new(frames);
        body.frames
            .push_back(Err(io::Error::other("upstream broke")));
        body
    }

    /// Flag set once this body is dropped.
    pub(crate) fn drop_flag(&self) -> Arc<AtomicBool> {
        self.dropped.clone()
    }
}

impl Drop for TestBody {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

impl Body for TestBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.frames.pop_front())
    }
}

pub(crate) fn poll_body<B: Body + Unpin>(body: &mut B) -> Option<Result<Frame<B::Data>, B::Error>> {
    let waker = std::task::Waker::noop();
    let mut cx = Context::from_waker(waker);
    match Pin::new(body).poll_frame(&mut cx) {
        Poll::Ready(result) => result,
        Poll::Pending => None,
    }
}

/// Collects every data frame of `body`, panicking on errors.
pub(crate) fn data_frames<B>(body: &mut B) -> Vec<Bytes>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: std::fmt::Debug,
{
    let mut frames = Vec::new();
    while let Some(frame) = poll_body(body) {
        if let Ok(data) = frame.unwrap().into_data() {
            frames.push(data);
        }
    }
    frames
}

use crate::body::{CompressionBody, Payload};
use crate::codec::Codec;
use crate::compressor::Compressor;
use crate::error::BoxError;
use http::Response;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// Future for compression service responses.
    pub struct ResponseFuture<F> {
        #[pin]
        inner: F,
        accepted_codec: Option<Codec>,
        compressor: Compressor,
    }
}

impl<F> ResponseFuture<F> {
    pub(crate) fn new(inner: F, accepted_codec: Option<Codec>, compressor: Compressor) -> Self {
        Self {
            inner,
            accepted_codec,
            compressor,
        }
    }
}

impl<F, B, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<Payload<B>>, E>>,
    E: Into<BoxError>,
{
    type Output = Result<Response<Payload<CompressionBody<B>>>, BoxError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.inner.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => Poll::Ready(Err(e.into())),
            Poll::Ready(Ok(response)) => Poll::Ready(
                this.compressor
                    .apply(*this.accepted_codec, response)
                    .map_err(Into::into),
            ),
        }
    }
}

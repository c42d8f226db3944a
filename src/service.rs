use crate::body::{CompressionBody, Payload};
use crate::compressor::{Compressor, accept_encoding};
use crate::error::BoxError;
use crate::future::ResponseFuture;
use http::{Request, Response};
use std::task::{Context, Poll};
use tower::Service;

/// A Tower service that compresses HTTP response bodies.
#[derive(Debug, Clone)]
pub struct CompressionService<S> {
    inner: S,
    compressor: Compressor,
}

impl<S> CompressionService<S> {
    /// Creates a new compression service wrapping the given inner service.
    pub fn new(inner: S, compressor: Compressor) -> Self {
        Self { inner, compressor }
    }

    /// Returns a reference to the inner service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner service.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consumes this service, returning the inner service.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CompressionService<S>
where
    S: Service<Request<ReqBody>, Response = Response<Payload<ResBody>>>,
    S::Error: Into<BoxError>,
{
    type Response = Response<Payload<CompressionBody<ResBody>>>;
    type Error = BoxError;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // Negotiate up front; the request is moved into the inner service.
        let accepted_codec = self.compressor.negotiate(&accept_encoding(req.headers()));

        let inner = self.inner.call(req);

        ResponseFuture::new(inner, accepted_codec, self.compressor.clone())
    }
}

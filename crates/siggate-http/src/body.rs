//! Response body type for the signature gate.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::Full;

pin_project_lite::pin_project! {
    /// Response body for gated responses.
    ///
    /// Successful requests stream the inner service's body unchanged;
    /// denials carry a small buffered JSON body produced by the gate
    /// itself.
    #[project = GateBodyProj]
    pub enum GateBody<B> {
        /// Body produced by the protected inner service.
        Inner { #[pin] inner: B },
        /// Buffered denial body produced by the gate.
        Denial { #[pin] denial: Full<Bytes> },
    }
}

impl<B> GateBody<B> {
    /// Wrap a body produced by the inner service.
    #[must_use]
    pub fn inner(inner: B) -> Self {
        Self::Inner { inner }
    }

    /// Create a buffered denial body from JSON bytes.
    #[must_use]
    pub fn denial(json: Vec<u8>) -> Self {
        Self::Denial {
            denial: Full::new(Bytes::from(json)),
        }
    }
}

impl<B> fmt::Debug for GateBody<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner { .. } => f.write_str("GateBody::Inner"),
            Self::Denial { .. } => f.write_str("GateBody::Denial"),
        }
    }
}

impl<B> http_body::Body for GateBody<B>
where
    B: http_body::Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        match self.project() {
            GateBodyProj::Inner { inner } => inner.poll_frame(cx),
            GateBodyProj::Denial { denial } => denial
                .poll_frame(cx)
                .map_err(|never| match never {}),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Inner { inner } => inner.is_end_stream(),
            Self::Denial { denial } => denial.is_end_stream(),
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Inner { inner } => inner.size_hint(),
            Self::Denial { denial } => denial.size_hint(),
        }
    }
}

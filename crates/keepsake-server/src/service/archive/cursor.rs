//! Byte-counting output cursor.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use pin_project_lite::pin_project;
use tokio::io::AsyncWrite;

pin_project! {
    /// Append-only view of the archive output.
    ///
    /// Counts every byte accepted by the inner sink. The counter can be read
    /// through a [`BytesEmitted`] handle while the writer owns the cursor.
    pub struct StreamCursor<W> {
        #[pin]
        inner: W,
        emitted: Arc<AtomicU64>,
    }
}

impl<W> StreamCursor<W> {
    /// Wraps `inner`, starting the count at zero.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            emitted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns a handle that observes the byte count.
    pub fn bytes_emitted(&self) -> BytesEmitted {
        BytesEmitted(self.emitted.clone())
    }

    /// Returns the inner sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite> AsyncWrite for StreamCursor<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();
        let poll = this.inner.poll_write(cx, buf);
        if let Poll::Ready(Ok(written)) = poll {
            this.emitted.fetch_add(written as u64, Ordering::Relaxed);
        }
        poll
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_shutdown(cx)
    }
}

/// Shared reader of a [`StreamCursor`] byte count.
#[derive(Debug, Clone, Default)]
pub struct BytesEmitted(Arc<AtomicU64>);

impl BytesEmitted {
    /// Returns the number of bytes written so far.
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;

    use super::*;

    #[tokio::test]
    async fn counts_written_bytes() -> anyhow::Result<()> {
        let mut cursor = StreamCursor::new(Vec::new());
        let emitted = cursor.bytes_emitted();

        cursor.write_all(b"PK\x03\x04").await?;
        cursor.write_all(b"rest").await?;
        cursor.flush().await?;

        assert_eq!(emitted.get(), 8);
        assert_eq!(cursor.into_inner(), b"PK\x03\x04rest");
        Ok(())
    }
}

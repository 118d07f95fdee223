use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::codec::{FrameCodec, RpcType};
use crate::protocol::SendError;

/// Buffers framed replies and flushes them to the gateway.
#[derive(Debug)]
pub struct DeltaWriter<W> {
    writer: W,
    buffer: BytesMut,
}

impl<W> DeltaWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(buffer_size) }
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn clear_buf(&mut self) {
        self.buffer.clear();
    }

    /// Buffers one frame of type `ty`.
    #[inline]
    pub fn write(&mut self, ty: RpcType, body: &[u8]) -> Result<(), SendError> {
        FrameCodec::encode_parts(ty, body, &mut self.buffer)
    }

    /// Buffers a rewrite delta as an HTTPReqCall reply.
    ///
    /// `None` means the call changed nothing, and nothing is buffered.
    /// Returns whether a frame was buffered.
    pub fn write_delta(&mut self, delta: Option<&[u8]>) -> Result<bool, SendError> {
        match delta {
            Some(delta) => {
                self.write(RpcType::HttpReqCall, delta)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn flush(&mut self) -> Result<(), SendError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        trace!(size = self.buffer.len(), "flush frames");
        self.writer.write_all(self.buffer.as_ref()).await?;
        self.buffer.clear();
        Ok(self.writer.flush().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_delta_writes_nothing() {
        let mut writer = DeltaWriter::with_capacity(Vec::new(), 64);

        assert!(!writer.write_delta(None).unwrap());
        writer.flush().await.unwrap();

        assert!(writer.into_inner().is_empty());
    }

    #[tokio::test]
    async fn delta_is_framed() {
        let mut writer = DeltaWriter::with_capacity(Vec::new(), 64);

        assert!(writer.write_delta(Some(&b"abc"[..])).unwrap());
        writer.flush().await.unwrap();
        writer.flush().await.unwrap();

        assert_eq!(writer.into_inner(), vec![2, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[tokio::test]
    async fn cleared_buffer_is_not_sent() {
        let mut writer = DeltaWriter::with_capacity(Vec::new(), 64);

        writer.write(RpcType::HttpReqCall, b"abc").unwrap();
        writer.clear_buf();
        writer.flush().await.unwrap();

        assert!(writer.get_mut().is_empty());
    }
}

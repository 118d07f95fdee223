use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info, warn};

use crate::codec::{DeltaEncoder, FrameCodec, RpcType};
use crate::connection::DeltaWriter;
use crate::handler::RequestFilter;
use crate::protocol::{HttpError, Request};

/// Read buffer capacity of a connection
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Write buffer capacity of a connection
const WRITE_BUFFER_SIZE: usize = 4 * 1024;

/// A runner connection that answers HTTPReqCall frames with rewrite deltas.
///
/// For every request frame the connection:
/// - decodes the request from the frame body
/// - runs the filter on it
/// - encodes the changes and writes them back, or writes nothing if there are none
///
/// A request that can't be decoded or encoded only fails its own call; I/O
/// errors end the connection.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct ReqCallConnection<R, W> {
    framed_read: FramedRead<R, FrameCodec>,
    writer: DeltaWriter<W>,
    encoder: DeltaEncoder,
}

impl<R, W> ReqCallConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, FrameCodec::new(), READ_BUFFER_SIZE),
            writer: DeltaWriter::with_capacity(writer, WRITE_BUFFER_SIZE),
            encoder: DeltaEncoder::new(),
        }
    }

    pub async fn process<F>(mut self, filter: &F) -> Result<(), HttpError>
    where
        F: RequestFilter + ?Sized,
    {
        loop {
            match self.framed_read.next().await {
                Some(Ok(frame)) => match frame.ty {
                    RpcType::HttpReqCall => self.do_process(&frame.body, filter).await?,
                    ty => warn!(frame_type = ?ty, "unsupported frame type, skip it"),
                },

                Some(Err(e)) => {
                    error!(cause = %e, "can't receive next frame");
                    return Err(e.into());
                }

                None => {
                    info!("cant read more frames, break this connection down");
                    return Ok(());
                }
            }
        }
    }

    async fn do_process<F>(&mut self, buf: &[u8], filter: &F) -> Result<(), HttpError>
    where
        F: RequestFilter + ?Sized,
    {
        let mut request = match Request::decode(buf) {
            Ok(request) => request,
            Err(e) => {
                error!(cause = %e, "can't decode request, skip this call");
                return Ok(());
            }
        };

        filter.request_filter(&mut request);

        let delta = match self.encoder.encode(&request) {
            Ok(delta) => delta,
            Err(e) => {
                error!(id = request.id(), cause = %e, "can't encode rewrite, skip this call");
                return Ok(());
            }
        };

        if !self.writer.write_delta(delta)? {
            debug!(id = request.id(), "request unchanged, nothing to send");
            return Ok(());
        }

        if let Err(e) = self.writer.flush().await {
            error!(id = request.id(), cause = %e, "failed to write rewrite");
            return Err(e.into());
        }
        Ok(())
    }
}

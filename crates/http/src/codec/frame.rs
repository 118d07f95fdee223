//! RPC frame codec
//!
//! Every message between the gateway and the runner is prefixed by a 4 byte
//! header: one byte of message type followed by the body length as a 24 bit
//! big-endian integer.
//!
//! ```text
//! +--------+------------------+-----------------+
//! | type:1 | length:3 (BE)    | body:length     |
//! +--------+------------------+-----------------+
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, SendError};

/// Size of the frame header
const HEADER_SIZE: usize = 4;

/// Largest body a 24 bit length can describe
pub const MAX_FRAME_BODY: usize = (1 << 24) - 1;

/// Message types of the runner protocol.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RpcType {
    Error,
    PrepareConf,
    HttpReqCall,
    ExtraInfo,
    HttpRespCall,
}

impl TryFrom<u8> for RpcType {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, ParseError> {
        match value {
            0 => Ok(RpcType::Error),
            1 => Ok(RpcType::PrepareConf),
            2 => Ok(RpcType::HttpReqCall),
            3 => Ok(RpcType::ExtraInfo),
            4 => Ok(RpcType::HttpRespCall),
            other => Err(ParseError::InvalidFrameType(other)),
        }
    }
}

impl From<RpcType> for u8 {
    fn from(value: RpcType) -> Self {
        match value {
            RpcType::Error => 0,
            RpcType::PrepareConf => 1,
            RpcType::HttpReqCall => 2,
            RpcType::ExtraInfo => 3,
            RpcType::HttpRespCall => 4,
        }
    }
}

/// One complete message: its type and its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub ty: RpcType,
    pub body: Bytes,
}

impl Frame {
    pub fn new(ty: RpcType, body: impl Into<Bytes>) -> Self {
        Self { ty, body: body.into() }
    }
}

/// Splits a byte stream into [`Frame`]s and writes frames back.
#[derive(Debug, Default, Copy, Clone)]
pub struct FrameCodec;

impl FrameCodec {
    pub fn new() -> Self {
        FrameCodec
    }

    /// Writes a frame header and `body` into `dst`.
    pub fn encode_parts(ty: RpcType, body: &[u8], dst: &mut BytesMut) -> Result<(), SendError> {
        ensure!(body.len() <= MAX_FRAME_BODY, SendError::too_large_frame(body.len(), MAX_FRAME_BODY));

        dst.reserve(HEADER_SIZE + body.len());
        dst.put_u8(ty.into());
        dst.put_uint(body.len() as u64, 3);
        dst.put_slice(body);
        Ok(())
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = ParseError;

    /// Attempts to decode one frame from `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(frame))`: a complete frame was split off the buffer
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the type byte is unknown
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let ty = RpcType::try_from(src[0])?;
        let length = usize::from(src[1]) << 16 | usize::from(src[2]) << 8 | usize::from(src[3]);

        if src.len() < HEADER_SIZE + length {
            src.reserve(HEADER_SIZE + length - src.len());
            return Ok(None);
        }

        src.advance(HEADER_SIZE);
        let body = src.split_to(length).freeze();
        trace!(frame_type = ?ty, body_size = length, "decoded frame");

        Ok(Some(Frame { ty, body }))
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = SendError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Self::encode_parts(item.ty, &item.body, dst)
    }
}

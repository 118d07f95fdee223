use std::io;

use flatbuffers::InvalidFlatbuffer;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("encode error: {source}")]
    EncodeError {
        #[from]
        source: EncodeError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request buffer: {source}")]
    InvalidBuffer {
        #[from]
        source: InvalidFlatbuffer,
    },

    #[error("invalid http method code: {0}")]
    InvalidMethod(u8),

    #[error("invalid frame type: {0}")]
    InvalidFrameType(u8),

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("rewrite size {current_size} exceed the frame limit {max_size}")]
    TooLargeMessage { current_size: usize, max_size: usize },
}

impl EncodeError {
    pub fn too_large_message(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeMessage { current_size, max_size }
    }
}

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("invalid header: {source}")]
    Invalid {
        #[from]
        source: http::Error,
    },
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("frame body size {current_size} exceed the limit {max_size}")]
    TooLargeFrame { current_size: usize, max_size: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn too_large_frame(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeFrame { current_size, max_size }
    }
}

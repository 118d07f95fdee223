//! Codec module for the runner's wire traffic
//!
//! Two layers are covered here:
//!
//! - Framing: [`FrameCodec`] splits the gateway byte stream into typed
//!   [`Frame`]s and writes frames back, as a `tokio_util` codec
//! - Rewrite deltas: [`DeltaEncoder`] turns the changes recorded on a
//!   [`Request`](crate::protocol::Request) into a finished `Resp` buffer
//!
//! Inbound request bodies are decoded with
//! [`Request::decode`](crate::protocol::Request::decode).
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use ext_plugin_http::codec::{DeltaEncoder, FrameCodec, RpcType};
//! use ext_plugin_http::protocol::Request;
//! use ext_plugin_http::wire::ReqBuilder;
//!
//! let buf = ReqBuilder::new(1, "/old").build();
//! let mut request = Request::decode(&buf).unwrap();
//! request.set_path("/new");
//!
//! let mut encoder = DeltaEncoder::new();
//! let mut out = BytesMut::new();
//! if let Some(delta) = encoder.encode(&request).unwrap() {
//!     FrameCodec::encode_parts(RpcType::HttpReqCall, delta, &mut out).unwrap();
//! }
//! assert_eq!(out[0], 2);
//! ```

mod delta_encoder;
mod frame;

pub use delta_encoder::DeltaEncoder;
pub use frame::Frame;
pub use frame::FrameCodec;
pub use frame::MAX_FRAME_BODY;
pub use frame::RpcType;

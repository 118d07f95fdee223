//! Runner connection handling module
//!
//! This module drives the request side of a runner connection: it reads
//! frames from the gateway, lets plugin filters work on each HTTPReqCall and
//! writes back a rewrite when one is needed.
//!
//! # Components
//!
//! - [`ReqCallConnection`]: the per-connection loop over incoming frames
//! - [`DeltaWriter`]: buffers framed replies and flushes them to the transport
//!
//! Accepting connections and the process lifecycle belong to the embedding
//! runner; anything implementing `AsyncRead`/`AsyncWrite` can be driven here.

mod delta_writer;
mod req_call_connection;

pub use delta_writer::DeltaWriter;
pub use req_call_connection::ReqCallConnection;

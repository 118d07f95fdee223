//! Request mutation layer for gateway external plugin runners
//!
//! A gateway that delegates request processing to an external runner sends
//! each request as a FlatBuffers `Req` message. Plugins running in the runner
//! may change the request path and headers; the runner must then answer with
//! a rewrite that carries only what changed, never the whole request.
//!
//! This crate implements that layer:
//!
//! - a zero-copy view over the received buffer with lazily parsed headers
//! - a header overlay that remembers the decoded headers for diffing
//! - change tracking, so untouched requests cost nothing to answer
//! - a delta encoder producing the `Resp { Rewrite }` message
//!
//! # Example
//!
//! ```
//! use ext_plugin_http::codec::DeltaEncoder;
//! use ext_plugin_http::handler::{RequestFilter, make_filter};
//! use ext_plugin_http::protocol::Request;
//! use ext_plugin_http::wire::{ReqBuilder, Resp};
//!
//! // what the gateway sends
//! let buf = ReqBuilder::new(7, "/foo").header("X-Trace", "abc").build();
//!
//! let filter = make_filter(|req: &mut Request<'_>| {
//!     req.set_path("/bar");
//!     req.header().set("X-Trace", "xyz").unwrap();
//! });
//!
//! let mut request = Request::decode(&buf).unwrap();
//! filter.request_filter(&mut request);
//!
//! let mut encoder = DeltaEncoder::new();
//! let delta = encoder.encode(&request).unwrap().expect("request was changed");
//!
//! let resp = Resp::root(delta).unwrap();
//! assert_eq!(resp.id(), 7);
//! let rewrite = resp.action_as_rewrite().unwrap();
//! assert_eq!(rewrite.path(), Some(&b"/bar"[..]));
//! assert_eq!(rewrite.headers().unwrap().len(), 1);
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`protocol`]: the request view, header overlay, change tracking and errors
//! - [`codec`]: the delta encoder and the runner frame codec
//! - [`wire`]: FlatBuffers bindings and the builder adapter
//! - [`handler`]: the filter trait plugins implement
//! - [`connection`]: a frame loop tying the pieces to an async transport
//!
//! # Lifecycle
//!
//! One [`protocol::Request`] is created per call and dropped once the delta is
//! encoded. Nothing is shared between calls, so independent calls can run on
//! independent workers, each with its own [`codec::DeltaEncoder`].
//!
//! # Limitations
//!
//! - Only the first value of each header name is diffed
//! - Header names are sent in canonical form (`X-Trace`), whatever spelling
//!   the plugin used
//! - A rewrite must fit in one frame; a larger one fails its call

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod wire;

mod utils;
pub(crate) use utils::ensure;

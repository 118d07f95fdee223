//! Rewrite delta encoder
//!
//! Turns the changes recorded on a [`Request`] into the `Resp { Rewrite }`
//! message the gateway applies. Only what changed is sent: an optional new
//! path and the header operations between the snapshot and the current headers.
//!
//! # Example
//!
//! ```
//! use ext_plugin_http::codec::DeltaEncoder;
//! use ext_plugin_http::protocol::Request;
//! use ext_plugin_http::wire::{ReqBuilder, Resp};
//!
//! let buf = ReqBuilder::new(7, "/foo").header("X-Trace", "abc").build();
//! let mut request = Request::decode(&buf).unwrap();
//! request.set_path("/bar");
//!
//! let mut encoder = DeltaEncoder::new();
//! let delta = encoder.encode(&request).unwrap().expect("path was changed");
//!
//! let rewrite = Resp::root(delta).unwrap().action_as_rewrite().unwrap();
//! assert_eq!(rewrite.path(), Some(&b"/bar"[..]));
//! assert!(rewrite.headers().is_none());
//! ```

use std::fmt;

use flatbuffers::FlatBufferBuilder;
use tracing::{debug, trace};

use crate::codec::MAX_FRAME_BODY;
use crate::ensure;
use crate::protocol::{EncodeError, HeaderDiff, MutationTracker, Request, canonical_name};
use crate::wire::{self, HeaderEntry};

/// Initial buffer size allocated for a rewrite message
const INIT_BUILDER_SIZE: usize = 1024;

/// Encodes request changes as a finished rewrite buffer.
///
/// The encoder owns one builder that is reset for every call, so a single
/// instance can serve all calls of one worker.
pub struct DeltaEncoder {
    builder: FlatBufferBuilder<'static>,
}

impl DeltaEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { builder: FlatBufferBuilder::with_capacity(capacity) }
    }

    /// Encodes the changes made to `request`, correlated by its id.
    ///
    /// See [`DeltaEncoder::encode_mutation`].
    pub fn encode(&mut self, request: &Request<'_>) -> Result<Option<&[u8]>, EncodeError> {
        self.encode_mutation(request.id(), request.mutation())
    }

    /// Encodes `mutation` as a rewrite for call `id`.
    ///
    /// The path and header values are written as raw bytes. Header names are
    /// written in [canonical form](canonical_name).
    ///
    /// # Returns
    ///
    /// - `Ok(Some(buf))`: the finished message, valid until the next call
    /// - `Ok(None)`: nothing changed; no message must be sent
    ///
    /// # Errors
    ///
    /// Returns `EncodeError` if the finished message doesn't fit in one frame.
    /// No message is produced for the call in that case.
    pub fn encode_mutation(&mut self, id: u32, mutation: &MutationTracker) -> Result<Option<&[u8]>, EncodeError> {
        if !mutation.is_touched() {
            return Ok(None);
        }

        let diff = mutation.header().map(|header| header.diff());
        let path = mutation.path();

        if path.is_none() && diff.as_ref().is_none_or(HeaderDiff::is_empty) {
            debug!(id, "headers accessed without change, skip rewrite");
            return Ok(None);
        }

        let names: Vec<String> = diff.iter().flatten().map(|op| canonical_name(op.name())).collect();
        let entries = diff.as_ref().map(|diff| header_entries(diff, &names));

        self.builder.reset();
        wire::finish_rewrite_response(&mut self.builder, id, path, entries.as_deref());

        let data = self.builder.finished_data();
        ensure!(data.len() <= MAX_FRAME_BODY, EncodeError::too_large_message(data.len(), MAX_FRAME_BODY));

        debug!(id, rewrite_path = path.is_some(), header_ops = names.len(), size = data.len(), "encoded rewrite");
        Ok(Some(data))
    }
}

impl Default for DeltaEncoder {
    fn default() -> Self {
        Self::with_capacity(INIT_BUILDER_SIZE)
    }
}

impl fmt::Debug for DeltaEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeltaEncoder").finish_non_exhaustive()
    }
}

/// Pairs each operation of `diff` with its wire name, in diff order.
fn header_entries<'a>(diff: &'a HeaderDiff, names: &'a [String]) -> Vec<HeaderEntry<'a>> {
    diff.iter()
        .zip(names)
        .map(|(op, name)| {
            let value = op.value().map(http::HeaderValue::as_bytes);
            trace!(header_name = %name, header_value = ?value.map(String::from_utf8_lossy), "header operation");
            HeaderEntry { name: name.as_str(), value }
        })
        .collect()
}

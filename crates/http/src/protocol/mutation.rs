//! Per-request record of what plugin code changed.

use bytes::Bytes;

use crate::protocol::HeaderOverlay;

/// Holds the optional path override and the optional header overlay of one request.
///
/// Both start empty. A request whose tracker is still empty after the filters
/// ran is unmodified and never produces a rewrite.
#[derive(Debug, Clone, Default)]
pub struct MutationTracker {
    path: Option<Bytes>,
    header: Option<HeaderOverlay>,
}

impl MutationTracker {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn path(&self) -> Option<&[u8]> {
        self.path.as_deref()
    }

    /// Records a path override; the last call wins.
    pub fn set_path(&mut self, path: Bytes) {
        self.path = Some(path);
    }

    pub fn header(&self) -> Option<&HeaderOverlay> {
        self.header.as_ref()
    }

    /// Returns the overlay, building it with `init` on first use.
    pub fn header_or_insert_with<F>(&mut self, init: F) -> &mut HeaderOverlay
    where
        F: FnOnce() -> HeaderOverlay,
    {
        self.header.get_or_insert_with(init)
    }

    /// True once a path was set or the header overlay was materialized.
    ///
    /// A materialized overlay counts even if nothing in it changed; the empty
    /// diff is dropped later by the encoder.
    #[inline]
    pub fn is_touched(&self) -> bool {
        self.path.is_some() || self.header.is_some()
    }
}

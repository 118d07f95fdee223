//! Core request mutation abstractions.
//!
//! This module holds the types plugin code works with while a gateway call is
//! being processed, and the errors of the whole crate.
//!
//! # Architecture
//!
//! - **Request view** (`request`): [`Request`] wraps the received buffer,
//!   exposes its scalar fields and lets plugins override the path and headers
//!
//! - **Header overlay** (`header`): [`HeaderOverlay`] keeps the current
//!   headers next to a snapshot of the decoded ones
//!   - [`HeaderDiff`] / [`HeaderOp`]: the set/delete operations between the two
//!
//! - **Mutation tracking** (`mutation`): [`MutationTracker`] records whether
//!   anything was touched, so untouched requests skip encoding entirely
//!
//! - **Error Handling** (`error`):
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: malformed request buffers and frames
//!   - [`EncodeError`]: changes that can't be written as a rewrite
//!   - [`HeaderError`]: invalid header names or values from plugin code
//!   - [`SendError`]: transport write errors
//!
//! Nothing here touches the binary builder; serialization lives in
//! [`crate::codec`] and [`crate::wire`].

mod error;
pub use error::EncodeError;
pub use error::HeaderError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

mod header;
pub use header::HeaderDiff;
pub use header::HeaderOp;
pub use header::HeaderOverlay;
pub use header::canonical_name;
pub use header::diff;

mod mutation;
pub use mutation::MutationTracker;

mod request;
pub use request::Request;

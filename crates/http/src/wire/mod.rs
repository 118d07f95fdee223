//! FlatBuffers bindings for the HTTPReqCall messages exchanged with the gateway.
//!
//! Only the tables this crate reads or writes are bound here:
//!
//! - [`Req`]: the inbound request (`id`, `conf_token`, `src_ip`, `method`, `path`, `headers`)
//! - [`TextEntry`]: a header name with an optional value
//! - [`Resp`] / [`Rewrite`]: the outbound reply carrying a rewrite action
//!
//! The builder-facing side is [`finish_rewrite_response`], which owns every detail
//! of the builder's back-to-front append order so that the diff logic in
//! [`crate::protocol`] never sees it. [`ReqBuilder`] plays the gateway when a
//! request buffer is needed outside of a real connection.

mod req;
mod resp;
mod text_entry;

pub use req::Req;
pub use req::ReqBuilder;
pub use resp::HeaderEntry;
pub use resp::Resp;
pub use resp::Rewrite;
pub use resp::finish_rewrite_response;
pub use text_entry::TextEntry;

/// `Action` union tag for a rewrite. `0` is no action and `1` is stop, neither
/// of which this crate produces.
pub const ACTION_REWRITE: u8 = 2;

/// Method names indexed by their wire code.
const METHODS: [&str; 15] = [
    "GET",
    "HEAD",
    "POST",
    "PUT",
    "DELETE",
    "MKCOL",
    "COPY",
    "MOVE",
    "OPTIONS",
    "PROPFIND",
    "PROPPATCH",
    "LOCK",
    "UNLOCK",
    "PATCH",
    "TRACE",
];

/// Returns the method name for a wire method code.
pub fn method_name(code: u8) -> Option<&'static str> {
    METHODS.get(usize::from(code)).copied()
}

/// Returns the wire method code for a method name.
pub fn method_code(name: &str) -> Option<u8> {
    METHODS.iter().position(|method| *method == name).and_then(|index| u8::try_from(index).ok())
}

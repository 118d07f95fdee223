//! The decoded HTTPReqCall request handed to plugin code.
//!
//! [`Request`] borrows the buffer received from the gateway. Scalars are copied
//! out at decode time; the path and source address are read straight from the
//! buffer, and headers are parsed only when a plugin first asks for them.
//! Everything a plugin changes is recorded in a [`MutationTracker`] and never
//! written back into the buffer.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::Bytes;
use http::Method;

use crate::protocol::{HeaderOverlay, MutationTracker, ParseError};
use crate::wire::{self, Req};

/// A request decoded from a gateway buffer, plus the changes made to it.
#[derive(Debug)]
pub struct Request<'buf> {
    req: Req<'buf>,
    id: u32,
    conf_token: u32,
    method: Method,
    path: &'buf [u8],
    mutation: MutationTracker,
}

impl<'buf> Request<'buf> {
    /// Decodes a request from a raw HTTPReqCall buffer.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if:
    /// - the buffer is not a well-formed `Req` table
    /// - the method code is unknown
    ///
    /// A request without a path is read as having an empty one.
    pub fn decode(buf: &'buf [u8]) -> Result<Self, ParseError> {
        let req = Req::root(buf)?;

        let code = req.method();
        let method = wire::method_name(code)
            .and_then(|name| Method::from_bytes(name.as_bytes()).ok())
            .ok_or(ParseError::InvalidMethod(code))?;
        let path = req.path().unwrap_or_default();

        Ok(Self { req, id: req.id(), conf_token: req.conf_token(), method, path, mutation: MutationTracker::new() })
    }

    /// Correlation id of the call; echoed in the rewrite response.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Token of the plugin configuration this request runs with.
    pub fn conf_token(&self) -> u32 {
        self.conf_token
    }

    /// Raw client address in network byte order.
    pub fn src_ip(&self) -> &'buf [u8] {
        self.req.src_ip().map(|ip| ip.bytes()).unwrap_or_default()
    }

    /// Client address, if the raw bytes are an IPv4 or IPv6 address.
    pub fn src_addr(&self) -> Option<IpAddr> {
        let ip = self.src_ip();
        if let Ok(octets) = <[u8; 4]>::try_from(ip) {
            return Some(IpAddr::V4(Ipv4Addr::from(octets)));
        }
        if let Ok(octets) = <[u8; 16]>::try_from(ip) {
            return Some(IpAddr::V6(Ipv6Addr::from(octets)));
        }
        None
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The overridden path if one was set, else the path from the wire.
    pub fn path(&self) -> &[u8] {
        self.mutation.path().unwrap_or(self.path)
    }

    /// Overrides the path sent upstream. The buffer is left untouched.
    pub fn set_path(&mut self, path: impl Into<Bytes>) {
        self.mutation.set_path(path.into());
    }

    /// Returns the header overlay, parsing the wire headers on first call.
    ///
    /// Materializing the overlay marks the headers as touched even when nothing
    /// is changed afterwards; such a request still produces no header operation.
    pub fn header(&mut self) -> &mut HeaderOverlay {
        let req = self.req;
        self.mutation.header_or_insert_with(|| {
            let entries = req.headers().into_iter().flatten().filter_map(|entry| Some((entry.name()?, entry.value().unwrap_or_default())));
            HeaderOverlay::from_entries(entries)
        })
    }

    pub fn mutation(&self) -> &MutationTracker {
        &self.mutation
    }

    /// True once the path was overridden or the headers were accessed.
    pub fn is_touched(&self) -> bool {
        self.mutation.is_touched()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::ReqBuilder;

    #[test]
    fn decode_scalars() {
        let buf = ReqBuilder::new(7, "/foo").conf_token(11).method(2).src_ip([10, 0, 0, 1]).build();
        let request = Request::decode(&buf).unwrap();

        assert_eq!(request.id(), 7);
        assert_eq!(request.conf_token(), 11);
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.path(), b"/foo");
        assert_eq!(request.src_ip(), &[10, 0, 0, 1]);
        assert_eq!(request.src_addr(), Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
        assert!(!request.is_touched());
    }

    #[test]
    fn decode_extension_method() {
        let buf = ReqBuilder::new(1, "/dav").method(5).build();
        let request = Request::decode(&buf).unwrap();
        assert_eq!(request.method().as_str(), "MKCOL");
    }

    #[test]
    fn decode_ipv6_source() {
        let ip = Ipv6Addr::LOCALHOST;
        let buf = ReqBuilder::new(1, "/").src_ip(ip.octets()).build();
        let request = Request::decode(&buf).unwrap();
        assert_eq!(request.src_addr(), Some(IpAddr::V6(ip)));
    }

    #[test]
    fn missing_source_is_empty() {
        let buf = ReqBuilder::new(1, "/").build();
        let request = Request::decode(&buf).unwrap();
        assert!(request.src_ip().is_empty());
        assert_eq!(request.src_addr(), None);
    }

    #[test]
    fn reject_unknown_method() {
        let buf = ReqBuilder::new(1, "/").method(200).build();
        assert!(matches!(Request::decode(&buf), Err(ParseError::InvalidMethod(200))));
    }

    #[test]
    fn reject_malformed_buffer() {
        assert!(matches!(Request::decode(b"not a flatbuffer"), Err(ParseError::InvalidBuffer { .. })));
    }

    #[test]
    fn set_path_overrides_wire_path() {
        let buf = ReqBuilder::new(1, "/foo").build();
        let mut request = Request::decode(&buf).unwrap();

        request.set_path("/bar");
        assert_eq!(request.path(), b"/bar");

        request.set_path(b"/baz".to_vec());
        assert_eq!(request.path(), b"/baz");
        assert!(request.is_touched());
        assert_eq!(Req::root(&buf).unwrap().path(), Some(&b"/foo"[..]));
    }

    #[test]
    fn path_round_trips_raw_bytes() {
        let buf = ReqBuilder::new(1, &b"/caf\xe9"[..]).build();
        let mut request = Request::decode(&buf).unwrap();
        assert_eq!(request.path(), b"/caf\xe9");

        request.set_path(&b"/\xff\xfe"[..]);
        assert_eq!(request.path(), b"/\xff\xfe");
    }

    #[test]
    fn absent_path_reads_empty() {
        let buf = ReqBuilder::default().build();
        let request = Request::decode(&buf).unwrap();

        assert_eq!(request.id(), 0);
        assert!(request.path().is_empty());
        assert!(!request.is_touched());
    }

    #[test]
    fn header_parsed_once() {
        let buf = ReqBuilder::new(1, "/").header("X-Trace", "abc").header("Accept", "*/*").header("accept", "text/html").build();
        let mut request = Request::decode(&buf).unwrap();

        assert!(!request.is_touched());
        assert_eq!(request.header().get("x-trace").unwrap(), "abc");
        assert_eq!(request.header().get_all("Accept").iter().count(), 2);
        assert!(request.is_touched());

        request.header().set("X-Trace", "xyz").unwrap();
        assert_eq!(request.header().get("X-Trace").unwrap(), "xyz");
        assert_eq!(request.header().snapshot().get("x-trace").unwrap(), "abc");
    }

    #[test]
    fn zero_headers_still_materialize() {
        let buf = ReqBuilder::new(1, "/").build();
        let mut request = Request::decode(&buf).unwrap();

        assert!(request.header().is_empty());
        assert!(request.is_touched());
        assert!(request.mutation().header().unwrap().diff().is_empty());
    }
}

//! `Req`: the HTTPReqCall request table sent by the gateway.

use std::fmt;

use flatbuffers::{FlatBufferBuilder, Follow, ForwardsUOffset, InvalidFlatbuffer, Table, VOffsetT, Vector, Verifiable, Verifier, WIPOffset};

use crate::wire::TextEntry;

#[derive(Copy, Clone, PartialEq)]
pub struct Req<'a> {
    tab: Table<'a>,
}

impl<'a> Follow<'a> for Req<'a> {
    type Inner = Req<'a>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        // SAFETY: the caller guarantees `loc` points at a table inside `buf`
        Self { tab: unsafe { Table::new(buf, loc) } }
    }
}

impl<'a> Req<'a> {
    pub const VT_ID: VOffsetT = 4;
    pub const VT_CONF_TOKEN: VOffsetT = 6;
    pub const VT_SRC_IP: VOffsetT = 8;
    pub const VT_METHOD: VOffsetT = 10;
    pub const VT_PATH: VOffsetT = 12;
    pub const VT_ARGS: VOffsetT = 14;
    pub const VT_HEADERS: VOffsetT = 16;

    /// Verifies `buf` and returns its root `Req` table.
    pub fn root(buf: &'a [u8]) -> Result<Req<'a>, InvalidFlatbuffer> {
        flatbuffers::root::<Req>(buf)
    }

    pub fn id(&self) -> u32 {
        // SAFETY: the table was verified by `Req::root`
        unsafe { self.tab.get::<u32>(Self::VT_ID, Some(0)) }.unwrap_or_default()
    }

    pub fn conf_token(&self) -> u32 {
        // SAFETY: the table was verified by `Req::root`
        unsafe { self.tab.get::<u32>(Self::VT_CONF_TOKEN, Some(0)) }.unwrap_or_default()
    }

    pub fn src_ip(&self) -> Option<Vector<'a, u8>> {
        // SAFETY: the table was verified by `Req::root`
        unsafe { self.tab.get::<ForwardsUOffset<Vector<'a, u8>>>(Self::VT_SRC_IP, None) }
    }

    /// Raw method code, see [`crate::wire::method_name`].
    pub fn method(&self) -> u8 {
        // SAFETY: the table was verified by `Req::root`
        unsafe { self.tab.get::<u8>(Self::VT_METHOD, Some(0)) }.unwrap_or_default()
    }

    /// Raw path bytes; the gateway does not guarantee UTF-8.
    pub fn path(&self) -> Option<&'a [u8]> {
        // SAFETY: the table was verified by `Req::root`
        unsafe { self.tab.get::<ForwardsUOffset<Vector<'a, u8>>>(Self::VT_PATH, None) }.map(|path| path.bytes())
    }

    pub fn headers(&self) -> Option<Vector<'a, ForwardsUOffset<TextEntry<'a>>>> {
        // SAFETY: the table was verified by `Req::root`
        unsafe { self.tab.get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<TextEntry<'a>>>>>(Self::VT_HEADERS, None) }
    }
}

impl Verifiable for Req<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u32>("id", Self::VT_ID, false)?
            .visit_field::<u32>("conf_token", Self::VT_CONF_TOKEN, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, u8>>>("src_ip", Self::VT_SRC_IP, false)?
            .visit_field::<u8>("method", Self::VT_METHOD, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, u8>>>("path", Self::VT_PATH, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<TextEntry>>>>("args", Self::VT_ARGS, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<TextEntry>>>>("headers", Self::VT_HEADERS, false)?
            .finish();
        Ok(())
    }
}

impl fmt::Debug for Req<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Req")
            .field("id", &self.id())
            .field("conf_token", &self.conf_token())
            .field("src_ip", &self.src_ip().map(|ip| ip.bytes()))
            .field("method", &self.method())
            .field("path", &self.path().map(String::from_utf8_lossy))
            .field("headers", &self.headers().map(|headers| headers.len()))
            .finish()
    }
}

/// Builds the request buffer a gateway would send for one HTTPReqCall.
///
/// Used by tests, benchmarks and the demo runner to stand in for the gateway side.
///
/// ```
/// use ext_plugin_http::wire::{Req, ReqBuilder};
///
/// let buf = ReqBuilder::new(7, "/foo").header("X-Trace", "abc").build();
/// let req = Req::root(&buf).unwrap();
/// assert_eq!(req.id(), 7);
/// assert_eq!(req.path(), Some(&b"/foo"[..]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReqBuilder {
    id: u32,
    conf_token: u32,
    src_ip: Vec<u8>,
    method: u8,
    path: Option<Vec<u8>>,
    headers: Vec<(Vec<u8>, Vec<u8>)>,
}

impl ReqBuilder {
    /// Starts a request with a path. `ReqBuilder::default()` leaves the path out.
    pub fn new(id: u32, path: impl Into<Vec<u8>>) -> Self {
        Self { id, path: Some(path.into()), ..Default::default() }
    }

    pub fn conf_token(mut self, conf_token: u32) -> Self {
        self.conf_token = conf_token;
        self
    }

    pub fn src_ip(mut self, src_ip: impl Into<Vec<u8>>) -> Self {
        self.src_ip = src_ip.into();
        self
    }

    pub fn method(mut self, code: u8) -> Self {
        self.method = code;
        self
    }

    pub fn header(mut self, name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut fbb = FlatBufferBuilder::with_capacity(256);

        let entries: Vec<_> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let name = fbb.create_byte_string(name);
                let value = fbb.create_byte_string(value);
                TextEntry::create(&mut fbb, name, Some(value))
            })
            .collect();
        let headers = fbb.create_vector(&entries);
        let path = self.path.as_ref().map(|path| fbb.create_byte_string(path));
        let src_ip = fbb.create_vector(&self.src_ip);

        let start = fbb.start_table();
        fbb.push_slot::<u32>(Req::VT_ID, self.id, 0);
        fbb.push_slot::<u32>(Req::VT_CONF_TOKEN, self.conf_token, 0);
        fbb.push_slot_always::<WIPOffset<_>>(Req::VT_SRC_IP, src_ip);
        if let Some(path) = path {
            fbb.push_slot_always::<WIPOffset<_>>(Req::VT_PATH, path);
        }
        fbb.push_slot_always::<WIPOffset<_>>(Req::VT_HEADERS, headers);
        fbb.push_slot::<u8>(Req::VT_METHOD, self.method, 0);
        let end = fbb.end_table(start);
        let root: WIPOffset<Req> = WIPOffset::new(end.value());

        fbb.finish(root, None);
        fbb.finished_data().to_vec()
    }
}

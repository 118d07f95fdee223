//! `Resp` and its `Rewrite` action: the HTTPReqCall reply sent back to the gateway.

use std::fmt;

use flatbuffers::{FlatBufferBuilder, Follow, ForwardsUOffset, InvalidFlatbuffer, Table, VOffsetT, Vector, Verifiable, Verifier, WIPOffset};

use crate::wire::{ACTION_REWRITE, TextEntry};

#[derive(Copy, Clone, PartialEq)]
pub struct Rewrite<'a> {
    tab: Table<'a>,
}

impl<'a> Follow<'a> for Rewrite<'a> {
    type Inner = Rewrite<'a>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        // SAFETY: the caller guarantees `loc` points at a table inside `buf`
        Self { tab: unsafe { Table::new(buf, loc) } }
    }
}

impl<'a> Rewrite<'a> {
    pub const VT_PATH: VOffsetT = 4;
    pub const VT_HEADERS: VOffsetT = 6;

    pub fn path(&self) -> Option<&'a [u8]> {
        // SAFETY: the table was verified as part of its `Resp`
        unsafe { self.tab.get::<ForwardsUOffset<Vector<'a, u8>>>(Self::VT_PATH, None) }.map(|path| path.bytes())
    }

    pub fn headers(&self) -> Option<Vector<'a, ForwardsUOffset<TextEntry<'a>>>> {
        // SAFETY: the table was verified as part of its `Resp`
        unsafe { self.tab.get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<TextEntry<'a>>>>>(Self::VT_HEADERS, None) }
    }
}

impl Verifiable for Rewrite<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'_, u8>>>("path", Self::VT_PATH, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<TextEntry>>>>("headers", Self::VT_HEADERS, false)?
            .finish();
        Ok(())
    }
}

impl fmt::Debug for Rewrite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rewrite")
            .field("path", &self.path().map(String::from_utf8_lossy))
            .field("headers", &self.headers().map(|headers| headers.iter().collect::<Vec<_>>()))
            .finish()
    }
}

#[derive(Copy, Clone, PartialEq)]
pub struct Resp<'a> {
    tab: Table<'a>,
}

impl<'a> Follow<'a> for Resp<'a> {
    type Inner = Resp<'a>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        // SAFETY: the caller guarantees `loc` points at a table inside `buf`
        Self { tab: unsafe { Table::new(buf, loc) } }
    }
}

impl<'a> Resp<'a> {
    pub const VT_ID: VOffsetT = 4;
    pub const VT_ACTION_TYPE: VOffsetT = 6;
    pub const VT_ACTION: VOffsetT = 8;

    /// Verifies `buf` and returns its root `Resp` table.
    pub fn root(buf: &'a [u8]) -> Result<Resp<'a>, InvalidFlatbuffer> {
        flatbuffers::root::<Resp>(buf)
    }

    pub fn id(&self) -> u32 {
        // SAFETY: the table was verified by `Resp::root`
        unsafe { self.tab.get::<u32>(Self::VT_ID, Some(0)) }.unwrap_or_default()
    }

    pub fn action_type(&self) -> u8 {
        // SAFETY: the table was verified by `Resp::root`
        unsafe { self.tab.get::<u8>(Self::VT_ACTION_TYPE, Some(0)) }.unwrap_or_default()
    }

    /// Returns the action as a [`Rewrite`] when it is tagged as one.
    pub fn action_as_rewrite(&self) -> Option<Rewrite<'a>> {
        if self.action_type() != ACTION_REWRITE {
            return None;
        }
        // SAFETY: the union value was verified against its tag by `Resp::root`
        unsafe { self.tab.get::<ForwardsUOffset<Rewrite<'a>>>(Self::VT_ACTION, None) }
    }
}

impl Verifiable for Resp<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u32>("id", Self::VT_ID, false)?
            .visit_union::<u8, _>("action_type", Self::VT_ACTION_TYPE, "action", Self::VT_ACTION, false, |key, v, pos| {
                match key {
                    ACTION_REWRITE => v.verify_union_variant::<ForwardsUOffset<Rewrite>>("Action::Rewrite", pos),
                    _ => Ok(()),
                }
            })?
            .finish();
        Ok(())
    }
}

impl fmt::Debug for Resp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resp")
            .field("id", &self.id())
            .field("action_type", &self.action_type())
            .field("rewrite", &self.action_as_rewrite())
            .finish()
    }
}

/// One header record of a rewrite.
///
/// `value: None` asks the gateway to delete the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderEntry<'s> {
    pub name: &'s str,
    pub value: Option<&'s [u8]>,
}

/// Serializes `Resp { id, action: Rewrite { path, headers } }` and finishes the builder.
///
/// Children are written first: the path bytes, then every header string and
/// record, then the header vector whose offsets are prepended back to front so
/// the records keep their order on the wire. `headers: None` leaves the field
/// out entirely; `Some(&[])` writes an empty vector.
pub fn finish_rewrite_response(fbb: &mut FlatBufferBuilder<'_>, id: u32, path: Option<&[u8]>, headers: Option<&[HeaderEntry<'_>]>) {
    let path = path.map(|path| fbb.create_byte_string(path));

    let headers = headers.map(|headers| {
        let entries: Vec<_> = headers
            .iter()
            .map(|entry| {
                let name = fbb.create_byte_string(entry.name.as_bytes());
                let value = entry.value.map(|value| fbb.create_byte_string(value));
                TextEntry::create(fbb, name, value)
            })
            .collect();

        fbb.start_vector::<WIPOffset<TextEntry>>(entries.len());
        for entry in entries.iter().rev() {
            fbb.push(*entry);
        }
        fbb.end_vector::<WIPOffset<TextEntry>>(entries.len())
    });

    let start = fbb.start_table();
    if let Some(path) = path {
        fbb.push_slot_always::<WIPOffset<_>>(Rewrite::VT_PATH, path);
    }
    if let Some(headers) = headers {
        fbb.push_slot_always::<WIPOffset<_>>(Rewrite::VT_HEADERS, headers);
    }
    let rewrite = fbb.end_table(start);

    let start = fbb.start_table();
    fbb.push_slot::<u32>(Resp::VT_ID, id, 0);
    fbb.push_slot::<u8>(Resp::VT_ACTION_TYPE, ACTION_REWRITE, 0);
    fbb.push_slot_always::<WIPOffset<_>>(Resp::VT_ACTION, rewrite);
    let end = fbb.end_table(start);
    let root: WIPOffset<Resp> = WIPOffset::new(end.value());

    fbb.finish(root, None);
}

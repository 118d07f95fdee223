//! `TextEntry`: the name/value pair used for headers in both directions.
//!
//! In a request it carries one header line. In a rewrite it carries one header
//! operation: an entry with a value sets the header, an entry without a value
//! deletes it.

use std::fmt;

use flatbuffers::{FlatBufferBuilder, Follow, ForwardsUOffset, InvalidFlatbuffer, Table, VOffsetT, Vector, Verifiable, Verifier, WIPOffset};

#[derive(Copy, Clone, PartialEq)]
pub struct TextEntry<'a> {
    tab: Table<'a>,
}

impl<'a> Follow<'a> for TextEntry<'a> {
    type Inner = TextEntry<'a>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        // SAFETY: the caller guarantees `loc` points at a table inside `buf`
        Self { tab: unsafe { Table::new(buf, loc) } }
    }
}

impl<'a> TextEntry<'a> {
    pub const VT_NAME: VOffsetT = 4;
    pub const VT_VALUE: VOffsetT = 6;

    /// Raw name bytes. Schema strings are read as bytes so a non UTF-8 entry
    /// doesn't fail verification of the whole request.
    pub fn name(&self) -> Option<&'a [u8]> {
        // SAFETY: the table was verified before it was handed out
        unsafe { self.tab.get::<ForwardsUOffset<Vector<'a, u8>>>(Self::VT_NAME, None) }.map(|name| name.bytes())
    }

    pub fn value(&self) -> Option<&'a [u8]> {
        // SAFETY: the table was verified before it was handed out
        unsafe { self.tab.get::<ForwardsUOffset<Vector<'a, u8>>>(Self::VT_VALUE, None) }.map(|value| value.bytes())
    }

    /// Writes a finished `TextEntry` table. Both byte strings must already be in the builder.
    pub fn create(
        fbb: &mut FlatBufferBuilder<'a>,
        name: WIPOffset<&'a [u8]>,
        value: Option<WIPOffset<&'a [u8]>>,
    ) -> WIPOffset<TextEntry<'a>> {
        let start = fbb.start_table();
        fbb.push_slot_always::<WIPOffset<_>>(Self::VT_NAME, name);
        if let Some(value) = value {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_VALUE, value);
        }
        let end = fbb.end_table(start);
        WIPOffset::new(end.value())
    }
}

impl Verifiable for TextEntry<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Vector<'_, u8>>>("name", Self::VT_NAME, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, u8>>>("value", Self::VT_VALUE, false)?
            .finish();
        Ok(())
    }
}

impl fmt::Debug for TextEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextEntry")
            .field("name", &self.name().map(String::from_utf8_lossy))
            .field("value", &self.value().map(String::from_utf8_lossy))
            .finish()
    }
}

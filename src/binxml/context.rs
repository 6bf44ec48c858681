use crate::err::{DeserializationError, DeserializationResult};
use crate::utils::{bytes, utf16_to_utf8};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum XmlParseState {
    Normal,
    InAttribute,
}

/// A bounded read window over a chunk.
///
/// The window is described as (chunk, origin, len) rather than as a bare
/// sub-slice so that name offsets, which are always chunk-relative, can be
/// resolved from any nesting depth. `origin + pos` is the chunk-relative
/// cursor position.
///
/// The window also carries the per-fragment parse state: the two-valued XML
/// state, the most recently decoded text value, and the current template
/// handle (a short template ID into the chunk's template cache).
#[derive(Debug, Clone)]
pub(crate) struct ParseContext<'a> {
    chunk: &'a [u8],
    origin: usize,
    len: usize,
    pos: usize,
    pub(crate) state: XmlParseState,
    pub(crate) cached_value: Vec<u8>,
    pub(crate) template: Option<u32>,
}

impl<'a> ParseContext<'a> {
    /// A window spanning the entire chunk.
    pub(crate) fn for_chunk(chunk: &'a [u8]) -> Self {
        ParseContext {
            chunk,
            origin: 0,
            len: chunk.len(),
            pos: 0,
            state: XmlParseState::Normal,
            cached_value: Vec::new(),
            template: None,
        }
    }

    /// A child window starting at the current cursor.
    ///
    /// A `wanted_len` that overruns the parent is corrected, not rejected:
    /// the child is truncated to the remaining span, or empty when the
    /// parent cursor is already past its end.
    pub(crate) fn inherit_with_offset(&self, wanted_len: usize) -> ParseContext<'a> {
        let len = if self.pos >= self.len {
            0
        } else if wanted_len > self.len - self.pos {
            self.len - self.pos
        } else {
            wanted_len
        };

        ParseContext {
            chunk: self.chunk,
            origin: self.origin + self.pos,
            len,
            pos: 0,
            state: XmlParseState::Normal,
            cached_value: Vec::new(),
            template: None,
        }
    }

    /// A copy of this window limited to `extra` more bytes, used for value
    /// payloads that embed their own token stream.
    pub(crate) fn nested(&self, extra: usize) -> ParseContext<'a> {
        let mut child = self.clone();
        child.update_len(self.pos.saturating_add(extra));
        child
    }

    /// Shrink the window. Lengths beyond the current one are ignored.
    pub(crate) fn update_len(&mut self, wanted_len: usize) {
        if wanted_len <= self.len {
            self.len = wanted_len;
        }
    }

    pub(crate) fn chunk(&self) -> &'a [u8] {
        self.chunk
    }

    pub(crate) fn origin(&self) -> usize {
        self.origin
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Chunk-relative cursor position.
    pub(crate) fn chunk_offset(&self) -> u64 {
        (self.origin + self.pos) as u64
    }

    pub(crate) fn have(&self, n: usize) -> bool {
        match self.pos.checked_add(n) {
            Some(end) => end <= self.len,
            None => false,
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.len
    }

    /// Advance without reading. The caller is responsible for bounds; a skip
    /// past the end simply makes every subsequent read fail.
    pub(crate) fn skip(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n);
    }

    pub(crate) fn jump_to_end(&mut self) {
        self.pos = self.len;
    }

    pub(crate) fn truncated(&self, what: &'static str, need: usize) -> DeserializationError {
        DeserializationError::Truncated {
            what,
            offset: self.chunk_offset(),
            need,
            have: self.len.saturating_sub(self.pos),
        }
    }

    pub(crate) fn u8_named(&mut self, what: &'static str) -> DeserializationResult<u8> {
        if !self.have(1) {
            return Err(self.truncated(what, 1));
        }
        let v = bytes::read_u8(self.chunk, self.origin + self.pos)
            .ok_or_else(|| self.truncated(what, 1))?;
        self.pos += 1;
        Ok(v)
    }

    pub(crate) fn u16_named(&mut self, what: &'static str) -> DeserializationResult<u16> {
        if !self.have(2) {
            return Err(self.truncated(what, 2));
        }
        let v = bytes::read_u16_le(self.chunk, self.origin + self.pos)
            .ok_or_else(|| self.truncated(what, 2))?;
        self.pos += 2;
        Ok(v)
    }

    pub(crate) fn u32_named(&mut self, what: &'static str) -> DeserializationResult<u32> {
        if !self.have(4) {
            return Err(self.truncated(what, 4));
        }
        let v = bytes::read_u32_le(self.chunk, self.origin + self.pos)
            .ok_or_else(|| self.truncated(what, 4))?;
        self.pos += 4;
        Ok(v)
    }

    pub(crate) fn u64_named(&mut self, what: &'static str) -> DeserializationResult<u64> {
        if !self.have(8) {
            return Err(self.truncated(what, 8));
        }
        let v = bytes::read_u64_le(self.chunk, self.origin + self.pos)
            .ok_or_else(|| self.truncated(what, 8))?;
        self.pos += 8;
        Ok(v)
    }

    pub(crate) fn take_bytes(
        &mut self,
        n: usize,
        what: &'static str,
    ) -> DeserializationResult<&'a [u8]> {
        if !self.have(n) {
            return Err(self.truncated(what, n));
        }
        let start = self.origin + self.pos;
        let out = self
            .chunk
            .get(start..start + n)
            .ok_or_else(|| self.truncated(what, n))?;
        self.pos += n;
        Ok(out)
    }

    /// Read a `u16` code-unit count followed by that many UTF-16LE units,
    /// transcoding into a buffer bounded by `capacity` (at most
    /// `(capacity - 1) / 2` units are consumed from the stream).
    ///
    /// The cursor always advances past the declared count — and the trailing
    /// NUL when `null_terminated` — so oversized strings are skipped
    /// correctly even when truncated.
    pub(crate) fn len_prefixed_utf16_string(
        &mut self,
        capacity: usize,
        null_terminated: bool,
    ) -> DeserializationResult<Vec<u8>> {
        let char_count = usize::from(self.u16_named("string_char_count")?);

        let mut out = Vec::new();
        let mut read_units = 0;
        while read_units < char_count && read_units * 2 < capacity.saturating_sub(1) {
            let unit = self.u16_named("string_code_unit")?;
            utf16_to_utf8(unit, &mut out, capacity);
            read_units += 1;
        }

        let tail_units = char_count - read_units + usize::from(null_terminated);
        self.skip(tail_units * 2);

        Ok(out)
    }
}

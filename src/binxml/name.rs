use crate::binxml::context::ParseContext;
use crate::err::DeserializationResult;

use log::trace;

/// Names are truncated to 255 bytes of UTF-8; the buffer bound below covers
/// the terminator slot of the original fixed-size layout.
pub(crate) const MAX_NAME_BYTES: usize = 256;

const MAX_NAME_STACK_DEPTH: usize = 20;

/// Read a name referenced by a chunk-relative offset.
///
/// Layout at the offset: `u32` next-name pointer, `u16` hash, then a
/// NUL-terminated length-prefixed UTF-16 string. When the referenced offset
/// is exactly the current cursor position the name is decoded in place;
/// otherwise it is read through a temporary cursor over the chunk and only
/// the 4-byte offset is consumed from the current window.
pub(crate) fn read_name(ctx: &mut ParseContext<'_>) -> DeserializationResult<Vec<u8>> {
    let name_offset = ctx.u32_named("name_offset")?;

    if ctx.chunk_offset() == u64::from(name_offset) {
        return read_name_body(ctx);
    }

    trace!(
        "name at {:#x} referenced from {:#x}",
        name_offset,
        ctx.chunk_offset()
    );

    let mut detached = ParseContext::for_chunk(ctx.chunk());
    detached.skip(name_offset as usize);
    read_name_body(&mut detached)
}

fn read_name_body(ctx: &mut ParseContext<'_>) -> DeserializationResult<Vec<u8>> {
    let _next_name_offset = ctx.u32_named("next_name_offset")?;
    let _name_hash = ctx.u16_named("name_hash")?;
    ctx.len_prefixed_utf16_string(MAX_NAME_BYTES, true)
}

/// The current element/attribute nesting, used to derive key names.
///
/// The stack is bounded rather than assertive: pushes beyond the depth limit
/// are dropped and pops below empty are no-ops.
#[derive(Debug, Default)]
pub(crate) struct NameStack {
    stack: Vec<Vec<u8>>,
}

impl NameStack {
    pub(crate) fn new() -> Self {
        NameStack::default()
    }

    pub(crate) fn reset(&mut self) {
        self.stack.clear();
    }

    pub(crate) fn push(&mut self, name: &[u8]) {
        if self.stack.len() >= MAX_NAME_STACK_DEPTH {
            return;
        }
        let truncated = &name[..name.len().min(MAX_NAME_BYTES - 1)];
        self.stack.push(truncated.to_vec());
    }

    pub(crate) fn pop(&mut self) {
        self.stack.pop();
    }

    pub(crate) fn top(&self) -> Option<&[u8]> {
        self.stack.last().map(Vec::as_slice)
    }

    pub(crate) fn second(&self) -> Option<&[u8]> {
        if self.stack.len() < 2 {
            return None;
        }
        self.stack.get(self.stack.len() - 2).map(Vec::as_slice)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

//! Builders for small synthetic EVTX buffers.
//!
//! Real samples are deliberately not checked in; every test constructs the
//! exact bytes it needs, which also documents the wire layout.

#![allow(dead_code)]

pub const EVTX_FILE_HEADER_SIZE: usize = 4096;
pub const EVTX_CHUNK_SIZE: usize = 65536;
pub const EVTX_CHUNK_HEADER_SIZE: usize = 512;
pub const EVTX_RECORD_HEADER_SIZE: usize = 24;

/// FILETIME of the Unix epoch; renders as 1970-01-01T00:00:00Z.
pub const UNIX_EPOCH_FILETIME: u64 = 116_444_736_000_000_000;

pub fn file_header() -> Vec<u8> {
    file_header_with_version(1, 3)
}

pub fn file_header_with_version(minor: u16, major: u16) -> Vec<u8> {
    let mut buf = b"ElfFile\x00".to_vec();
    buf.extend(0u64.to_le_bytes()); // first chunk number
    buf.extend(0u64.to_le_bytes()); // last chunk number
    buf.extend(1u64.to_le_bytes()); // next record id
    buf.extend(128u32.to_le_bytes()); // header size
    buf.extend(minor.to_le_bytes());
    buf.extend(major.to_le_bytes());
    buf.extend(4096u16.to_le_bytes()); // header block size
    buf.extend(1u16.to_le_bytes()); // chunk count
    buf.resize(120, 0);
    buf.extend(0u32.to_le_bytes()); // flags
    buf.extend(0u32.to_le_bytes()); // checksum
    buf.resize(EVTX_FILE_HEADER_SIZE, 0);
    buf
}

/// A 64 KiB chunk under construction. Records are appended densely after
/// the 512-byte header.
pub struct ChunkBuilder {
    buf: Vec<u8>,
}

impl ChunkBuilder {
    pub fn new(first_record_number: u64, last_record_number: u64) -> Self {
        let mut buf = b"ElfChnk\x00".to_vec();
        buf.extend(first_record_number.to_le_bytes());
        buf.extend(last_record_number.to_le_bytes());
        buf.extend(first_record_number.to_le_bytes()); // id copy
        buf.extend(last_record_number.to_le_bytes()); // id copy
        buf.extend(0x80u32.to_le_bytes()); // header size
        buf.resize(EVTX_CHUNK_HEADER_SIZE, 0);
        ChunkBuilder { buf }
    }

    /// Append a record whose BinXml payload is produced by `build`. The
    /// builder receives the payload's chunk-relative base offset so inline
    /// name references resolve.
    pub fn record(
        &mut self,
        record_number: u64,
        filetime: u64,
        build: impl FnOnce(&mut BinXmlBuilder),
    ) {
        let payload_base = self.buf.len() + EVTX_RECORD_HEADER_SIZE;
        let mut payload = BinXmlBuilder::with_base(payload_base);
        build(&mut payload);
        self.record_raw(record_number, filetime, &payload.buf);
    }

    pub fn record_raw(&mut self, record_number: u64, filetime: u64, payload: &[u8]) {
        let size = (EVTX_RECORD_HEADER_SIZE + payload.len() + 4) as u32;
        self.buf.extend([0x2a, 0x2a, 0x00, 0x00]);
        self.buf.extend(size.to_le_bytes());
        self.buf.extend(record_number.to_le_bytes());
        self.buf.extend(filetime.to_le_bytes());
        self.buf.extend_from_slice(payload);
        self.buf.extend(size.to_le_bytes()); // trailing size copy
    }

    pub fn finish(mut self) -> Vec<u8> {
        assert!(self.buf.len() <= EVTX_CHUNK_SIZE, "chunk overflow");
        self.buf.resize(EVTX_CHUNK_SIZE, 0);
        self.buf
    }
}

/// Builds BinXml token streams. Mirrors the on-disk grammar one token at a
/// time; `base` is the chunk-relative offset the stream will live at.
pub struct BinXmlBuilder {
    pub buf: Vec<u8>,
    base: usize,
}

impl BinXmlBuilder {
    pub fn with_base(base: usize) -> Self {
        BinXmlBuilder {
            buf: Vec::new(),
            base,
        }
    }

    fn abs(&self) -> u32 {
        (self.base + self.buf.len()) as u32
    }

    pub fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn u16(&mut self, value: u16) {
        self.buf.extend(value.to_le_bytes());
    }

    pub fn u32(&mut self, value: u32) {
        self.buf.extend(value.to_le_bytes());
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn utf16(&mut self, s: &str) {
        for unit in s.encode_utf16() {
            self.u16(unit);
        }
    }

    pub fn inline_name(&mut self, name: &str) {
        let body_offset = self.abs() + 4;
        self.u32(body_offset);
        self.u32(0); // next name offset
        self.u16(0); // hash
        self.u16(name.encode_utf16().count() as u16);
        self.utf16(name);
        self.u16(0); // NUL
    }

    pub fn open_element(&mut self, name: &str) {
        self.u8(0x01);
        self.u16(0); // dependency id
        self.u32(0); // element length
        self.inline_name(name);
    }

    pub fn open_element_with_attrs(&mut self, name: &str) {
        self.u8(0x41);
        self.u16(0);
        self.u32(0);
        self.inline_name(name);
        self.u32(0); // attribute list length
    }

    pub fn close_start(&mut self) {
        self.u8(0x02);
    }

    pub fn close_element(&mut self) {
        self.u8(0x04);
    }

    pub fn attribute(&mut self, name: &str) {
        self.u8(0x06);
        self.inline_name(name);
    }

    pub fn value_text(&mut self, value: &str) {
        self.u8(0x05);
        self.u8(0x01); // string type
        self.u16(value.encode_utf16().count() as u16);
        self.utf16(value);
    }

    pub fn substitution(&mut self, index: u16, value_type: u8) {
        self.u8(0x0D);
        self.u16(index);
        self.u8(value_type);
    }

    pub fn fragment_header(&mut self) {
        self.u8(0x0F);
        self.bytes(&[1, 1, 0]);
    }

    pub fn eof(&mut self) {
        self.u8(0x00);
    }

    /// A TemplateInstance carrying its definition inline.
    /// `args` entries are (declared size, descriptor type, value bytes).
    pub fn template_definition(
        &mut self,
        short_id: u32,
        body: impl FnOnce(&mut BinXmlBuilder),
        args: &[(u16, u16, Vec<u8>)],
    ) {
        self.u8(0x0C);
        self.u8(0x01);
        self.u32(short_id);
        self.u32(0); // declared body length, unused on this path
        self.u32(args.len() as u32); // discarded; re-read after the body
        self.bytes(&[0u8; 16]); // long id

        let len_at = self.buf.len();
        self.u32(0); // patched below
        let body_start = self.buf.len();
        body(self);
        let body_len = (self.buf.len() - body_start) as u32;
        self.buf[len_at..len_at + 4].copy_from_slice(&body_len.to_le_bytes());

        self.u32(args.len() as u32);
        self.argument_tail(args);
    }

    /// A TemplateInstance referencing an already-cached definition.
    pub fn template_reference(&mut self, short_id: u32, args: &[(u16, u16, Vec<u8>)]) {
        self.u8(0x0C);
        self.u8(0x01);
        self.u32(short_id);
        self.u32(0);
        self.u32(args.len() as u32);
        self.argument_tail(args);
    }

    fn argument_tail(&mut self, args: &[(u16, u16, Vec<u8>)]) {
        for (size, value_type, _) in args {
            self.u16(*size);
            self.u16(*value_type);
        }
        for (_, _, data) in args {
            self.buf.extend_from_slice(data);
        }
    }
}

/// A full file: header plus the given chunks, in order.
pub fn evtx_file(chunks: Vec<Vec<u8>>) -> Vec<u8> {
    let mut bytes = file_header();
    for chunk in chunks {
        assert_eq!(chunk.len(), EVTX_CHUNK_SIZE);
        bytes.extend(chunk);
    }
    bytes
}

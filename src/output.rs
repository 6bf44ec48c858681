use chrono::{DateTime, Utc};

use std::fmt;
use std::io::{self, Write};

/// The single output sink for decoded records.
///
/// Writes a flat `'<key>':<value>, ` stream per record, preceded by the
/// record prelude and terminated by one newline. Keys and textual values are
/// raw bytes; embedded quotes are not escaped (a known limitation of the
/// format, preserved for downstream compatibility).
pub struct TextEmitter<W: Write> {
    out: W,
}

impl<W: Write> TextEmitter<W> {
    pub fn new(out: W) -> Self {
        TextEmitter { out }
    }

    /// Returns control of the inner writer to the caller.
    pub fn into_inner(self) -> W {
        self.out
    }

    pub(crate) fn record_prelude(
        &mut self,
        record_number: u64,
        timestamp: &DateTime<Utc>,
    ) -> io::Result<()> {
        write!(
            self.out,
            "Record #{} {} ",
            record_number,
            timestamp.format("%Y-%m-%dT%H:%M:%SZ")
        )
    }

    pub(crate) fn end_record(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }

    pub(crate) fn key_prefix(&mut self, key: &[u8]) -> io::Result<()> {
        self.out.write_all(b"'")?;
        self.out.write_all(key)?;
        self.out.write_all(b"':")
    }

    pub(crate) fn pair_end(&mut self) -> io::Result<()> {
        self.out.write_all(b", ")
    }

    /// `'key':'value', ` with the value quoted.
    pub(crate) fn pair_quoted(&mut self, key: &[u8], value: &[u8]) -> io::Result<()> {
        self.key_prefix(key)?;
        self.out.write_all(b"'")?;
        self.out.write_all(value)?;
        self.out.write_all(b"', ")
    }

    /// `'key':value, ` with a preformatted value.
    pub(crate) fn pair_fmt(&mut self, key: &[u8], value: fmt::Arguments<'_>) -> io::Result<()> {
        self.key_prefix(key)?;
        self.out.write_fmt(value)?;
        self.pair_end()
    }

    pub(crate) fn raw(&mut self, fragment: &str) -> io::Result<()> {
        self.out.write_all(fragment.as_bytes())
    }

    pub(crate) fn raw_bytes(&mut self, fragment: &[u8]) -> io::Result<()> {
        self.out.write_all(fragment)
    }

    pub(crate) fn raw_fmt(&mut self, fragment: fmt::Arguments<'_>) -> io::Result<()> {
        self.out.write_fmt(fragment)
    }

    /// The per-file failure marker the CLI prints on the output stream.
    pub fn note_failure(&mut self, path: &str) -> io::Result<()> {
        writeln!(self.out, "Failed on {}", path)
    }
}

use crate::binxml::context::ParseContext;
use crate::binxml::tokens::BinXmlParser;
use crate::err::Result;
use crate::event_descriptions::logon_type_label;
use crate::guid::Guid;
use crate::ntsid::Sid;
use crate::utils::{datetime_from_filetime, utf16_to_utf8};

use log::debug;
use std::io::Write;

impl<W: Write> BinXmlParser<'_, W> {
    /// Decode one template argument of `size` bytes as the slot's recorded
    /// `value_type` and emit it under `key`.
    pub(crate) fn emit_argument(
        &mut self,
        ctx: &mut ParseContext<'_>,
        key: &[u8],
        value_type: u16,
        size: u16,
    ) -> Result<()> {
        match value_type {
            0x01 => self.emit_string(ctx, key, size),
            0x04 => {
                let value = ctx.u8_named("uint8_value")?;
                self.emitter.pair_fmt(key, format_args!("{:02}", value))?;
                Ok(())
            }
            0x06 => self.emit_uint16(ctx, key),
            0x08 => self.emit_uint32(ctx, key),
            0x0A => {
                let value = ctx.u64_named("uint64_value")?;
                self.emitter.pair_fmt(key, format_args!("{:016}", value))?;
                Ok(())
            }
            0x0E => self.emit_binary(ctx, key, size),
            0x0F => {
                let guid = Guid::from_context(ctx)?;
                self.emitter.pair_fmt(key, format_args!("{}", guid))?;
                Ok(())
            }
            0x11 => self.emit_filetime(ctx, key),
            0x13 => {
                let sid = Sid::from_context(ctx, size)?;
                self.emitter.pair_fmt(key, format_args!("{}", sid))?;
                Ok(())
            }
            0x14 => {
                let value = ctx.u32_named("hex32_value")?;
                self.emitter.pair_fmt(key, format_args!("{:08X}", value))?;
                Ok(())
            }
            0x15 => {
                let value = ctx.u64_named("hex64_value")?;
                self.emitter.pair_fmt(key, format_args!("{:016X}", value))?;
                Ok(())
            }
            0x21 => self.emit_nested_binxml(ctx, size),
            0x81 => self.emit_string_array(ctx, key, size),
            other => {
                if other != 0x00 {
                    self.emitter
                        .pair_fmt(key, format_args!("'...//{:04X}[{:04X}]'", other, size))?;
                }
                ctx.skip(usize::from(size));
                Ok(())
            }
        }
    }

    fn emit_string(&mut self, ctx: &mut ParseContext<'_>, key: &[u8], size: u16) -> Result<()> {
        let unit_count = usize::from(size) / 2;
        let capacity = usize::from(size) * 2 + 2;

        let mut value = Vec::new();
        for _ in 0..unit_count {
            let unit = ctx.u16_named("string_value_unit")?;
            utf16_to_utf8(unit, &mut value, capacity);
        }

        self.emitter.pair_quoted(key, &value)?;
        Ok(())
    }

    fn emit_uint16(&mut self, ctx: &mut ParseContext<'_>, key: &[u8]) -> Result<()> {
        let value = ctx.u16_named("uint16_value")?;

        if key == b"EventID" {
            if let Some(text) = self.events.description(value) {
                self.emitter
                    .pair_fmt(key, format_args!("{:04} ({})", value, text))?;
                return Ok(());
            }
        }

        self.emitter.pair_fmt(key, format_args!("{:04}", value))?;
        Ok(())
    }

    fn emit_uint32(&mut self, ctx: &mut ParseContext<'_>, key: &[u8]) -> Result<()> {
        let value = ctx.u32_named("uint32_value")?;

        if key == b"LogonType" {
            if let Some(label) = logon_type_label(value) {
                self.emitter
                    .pair_fmt(key, format_args!("{:08} ({})", value, label))?;
                return Ok(());
            }
        }

        if key == b"Address1" || key == b"Address2" {
            // Dotted quad in storage order (little-endian).
            let octets = value.to_le_bytes();
            self.emitter.pair_fmt(
                key,
                format_args!(
                    "{:08} ({}.{}.{}.{})",
                    value, octets[0], octets[1], octets[2], octets[3]
                ),
            )?;
            return Ok(());
        }

        self.emitter.pair_fmt(key, format_args!("{:08}", value))?;
        Ok(())
    }

    fn emit_binary(&mut self, ctx: &mut ParseContext<'_>, key: &[u8], size: u16) -> Result<()> {
        self.emitter.key_prefix(key)?;
        for _ in 0..size {
            let byte = ctx.u8_named("binary_value")?;
            self.emitter.raw_fmt(format_args!("{:02X}", byte))?;
        }
        self.emitter.pair_end()?;
        Ok(())
    }

    fn emit_filetime(&mut self, ctx: &mut ParseContext<'_>, key: &[u8]) -> Result<()> {
        let filetime = ctx.u64_named("filetime_value")?;

        match datetime_from_filetime(filetime) {
            Some(datetime) => self.emitter.pair_fmt(
                key,
                format_args!("{}", datetime.format("%Y.%m.%d-%H:%M:%S")),
            )?,
            None => self
                .emitter
                .pair_fmt(key, format_args!("{:016X}", filetime))?,
        }

        Ok(())
    }

    /// The payload embeds its own token stream. Errors inside it are
    /// swallowed so a malformed inner fragment cannot poison the outer
    /// record; the outer cursor always advances by `size`.
    fn emit_nested_binxml(&mut self, ctx: &mut ParseContext<'_>, size: u16) -> Result<()> {
        let mut nested = ctx.nested(usize::from(size));
        if let Err(err) = self.parse_fragment(&mut nested) {
            debug!("ignoring malformed nested binxml fragment: {}", err);
        }
        ctx.skip(usize::from(size));
        Ok(())
    }

    /// NUL-separated UTF-16 strings rendered as a bracketed list; carriage
    /// returns and line feeds become spaces.
    fn emit_string_array(
        &mut self,
        ctx: &mut ParseContext<'_>,
        key: &[u8],
        size: u16,
    ) -> Result<()> {
        let mut elements = ctx.nested(usize::from(size));
        let mut in_string = false;

        self.emitter.key_prefix(key)?;
        self.emitter.raw("[")?;

        while let Ok(mut unit) = elements.u16_named("string_array_unit") {
            if unit == u16::from(b'\r') || unit == u16::from(b'\n') {
                unit = u16::from(b' ');
            }

            if unit == 0 {
                if in_string {
                    self.emitter.raw("',")?;
                    in_string = false;
                }
            } else {
                if !in_string {
                    self.emitter.raw("'")?;
                    in_string = true;
                }
                let mut encoded = Vec::new();
                utf16_to_utf8(unit, &mut encoded, 8);
                self.emitter.raw_bytes(&encoded)?;
            }
        }

        if in_string {
            self.emitter.raw("'")?;
        }
        self.emitter.raw("], ")?;

        ctx.skip(usize::from(size));
        Ok(())
    }
}

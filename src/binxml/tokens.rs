use crate::binxml::context::{ParseContext, XmlParseState};
use crate::binxml::name::{read_name, NameStack};
use crate::binxml::template::TemplateCache;
use crate::err::{DeserializationError, Result};
use crate::event_descriptions::EventDescriptions;
use crate::output::TextEmitter;

use log::{trace, warn};
use std::io::Write;

/// Text values share the name buffer bound of the original layout.
pub(crate) const MAX_VALUE_BYTES: usize = 256;

/// The BinXml token state machine.
///
/// One parser is created per chunk; dropping it at the chunk boundary is
/// what clears the template cache and the name stack.
pub(crate) struct BinXmlParser<'p, W: Write> {
    pub(crate) templates: TemplateCache,
    pub(crate) names: NameStack,
    pub(crate) events: &'p EventDescriptions,
    pub(crate) emitter: &'p mut TextEmitter<W>,
}

impl<'p, W: Write> BinXmlParser<'p, W> {
    pub(crate) fn new(events: &'p EventDescriptions, emitter: &'p mut TextEmitter<W>) -> Self {
        BinXmlParser {
            templates: TemplateCache::new(),
            names: NameStack::new(),
            events,
            emitter,
        }
    }

    /// Consume tokens until the window is exhausted. An EOF token ends the
    /// fragment by jumping the cursor to the end of the window.
    pub(crate) fn parse_fragment(&mut self, ctx: &mut ParseContext<'_>) -> Result<()> {
        ctx.state = XmlParseState::Normal;

        while !ctx.at_end() {
            let offset = ctx.chunk_offset();
            let token = ctx.u8_named("binxml_token")?;
            trace!("token `{:#04x}` at offset {:#x}", token, offset);

            match token {
                // EndOfStream
                0x00 => ctx.jump_to_end(),
                // OpenStartElement
                0x01 => self.open_start_element(ctx, false)?,
                0x41 => self.open_start_element(ctx, true)?,
                // CloseStartElement
                0x02 => self.set_state(ctx, XmlParseState::Normal),
                // CloseEmptyElement / CloseElement
                0x03 | 0x04 => {
                    self.set_state(ctx, XmlParseState::Normal);
                    self.names.pop();
                }
                // ValueText
                0x05 | 0x45 => self.value_text(ctx)?,
                // Attribute
                0x06 | 0x46 => self.attribute(ctx)?,
                // CDATA / CharRef / EntityRef / PI: recognized but not emitted
                0x07..=0x0B | 0x47..=0x49 => {}
                // TemplateInstance
                0x0C => self.template_instance(ctx)?,
                // Normal / Optional Substitution
                0x0D | 0x0E => self.substitution(ctx)?,
                // FragmentHeader
                0x0F => ctx.skip(3),
                value => {
                    return Err(DeserializationError::InvalidToken { value, offset }.into());
                }
            }
        }

        Ok(())
    }

    /// An attribute name is a scope spanning only until its value is read or
    /// the next token changes state: every InAttribute -> non-InAttribute
    /// transition pops exactly once.
    fn set_state(&mut self, ctx: &mut ParseContext<'_>, new_state: XmlParseState) {
        if new_state == ctx.state {
            return;
        }
        if ctx.state == XmlParseState::InAttribute {
            self.names.pop();
        }
        ctx.state = new_state;
    }

    /// The key the next value resolves to. `<Data>` elements directly under
    /// `<EventData>` take their key from the preceding `Name` attribute value
    /// (held in the context's cached value).
    fn proper_key_name(&self, ctx: &ParseContext<'_>) -> Option<Vec<u8>> {
        let key = self.names.top()?;

        if key == b"Data"
            && self.names.second() == Some(&b"EventData"[..])
            && !ctx.cached_value.is_empty()
        {
            return Some(ctx.cached_value.clone());
        }

        Some(key.to_vec())
    }

    fn open_start_element(
        &mut self,
        ctx: &mut ParseContext<'_>,
        has_attributes: bool,
    ) -> Result<()> {
        let _dependency_id = ctx.u16_named("open_start_element_dependency_id")?;
        let _element_len = ctx.u32_named("open_start_element_len")?;
        let name = read_name(ctx)?;

        if has_attributes {
            let _attribute_list_len = ctx.u32_named("attribute_list_len")?;
        }

        trace!("open element `{}`", String::from_utf8_lossy(&name));
        self.set_state(ctx, XmlParseState::Normal);
        self.names.push(&name);
        Ok(())
    }

    fn attribute(&mut self, ctx: &mut ParseContext<'_>) -> Result<()> {
        let name = read_name(ctx)?;
        trace!("attribute `{}`", String::from_utf8_lossy(&name));
        self.names.push(&name);
        self.set_state(ctx, XmlParseState::InAttribute);
        Ok(())
    }

    fn value_text(&mut self, ctx: &mut ParseContext<'_>) -> Result<()> {
        let _string_type = ctx.u8_named("value_string_type")?;
        let value = ctx.len_prefixed_utf16_string(MAX_VALUE_BYTES, false)?;

        if let Some(key) = self.proper_key_name(ctx) {
            // The `Name` attribute of a `Data` element only feeds key
            // resolution; it is never a pair of its own.
            let feeds_key_resolution =
                key.as_slice() == b"Name" && self.names.second() == Some(&b"Data"[..]);

            if !feeds_key_resolution {
                if let Some(id) = ctx.template {
                    if let Some(template) = self.templates.get_mut(id) {
                        template.register_fixed_pair(&key, &value);
                    }
                }
            }
        }

        self.set_state(ctx, XmlParseState::Normal);
        ctx.cached_value = value;
        Ok(())
    }

    fn substitution(&mut self, ctx: &mut ParseContext<'_>) -> Result<()> {
        let index = ctx.u16_named("substitution_index")?;
        let mut value_type = ctx.u8_named("substitution_value_type")?;
        if value_type == 0x00 {
            // Two-byte type encoding; undocumented, preserved as observed.
            value_type = ctx.u8_named("substitution_value_type")?;
        }

        if let Some(id) = ctx.template {
            let key = self.proper_key_name(ctx).unwrap_or_default();
            if let Some(template) = self.templates.get_mut(id) {
                template.register_arg_pair(index, &key, u16::from(value_type));
            }
        }

        self.set_state(ctx, XmlParseState::Normal);
        Ok(())
    }

    fn template_instance(&mut self, ctx: &mut ParseContext<'_>) -> Result<()> {
        let offset = ctx.chunk_offset();
        let instance_type = ctx.u8_named("template_instance_type")?;
        if instance_type != 0x01 {
            return Err(DeserializationError::InvalidTemplateInstanceType {
                value: instance_type,
                offset,
            }
            .into());
        }

        let short_id = ctx.u32_named("template_short_id")?;
        let _declared_body_len = ctx.u32_named("template_body_len")?;
        let mut num_arguments = ctx.u32_named("template_num_arguments")?;

        if self.templates.contains(short_id) {
            trace!("template `{:#010x}` cache hit", short_id);
            ctx.template = Some(short_id);
        } else {
            trace!("template `{:#010x}` definition follows", short_id);
            let _long_id = ctx.take_bytes(16, "template_long_id")?;
            let definition_len = ctx.u32_named("template_definition_len")?;

            let mut definition = ctx.inherit_with_offset(definition_len as usize);
            // Register before parsing the body: a definition that contains
            // its own short ID must hit the cache instead of re-entering.
            self.templates.register(short_id);
            definition.template = Some(short_id);

            self.parse_fragment(&mut definition)?;

            ctx.skip(definition_len as usize);
            num_arguments = ctx.u32_named("template_num_arguments")?;
            // A nested instance inside the body may have switched templates;
            // the child's final handle is the one adopted.
            ctx.template = definition.template;
        }

        let current = ctx
            .template
            .ok_or(DeserializationError::TemplateNotFound { id: short_id })?;

        let description = self
            .templates
            .get(current)
            .ok_or(DeserializationError::TemplateNotFound { id: current })?;

        for (key, value) in description.fixed_pairs() {
            if key.as_slice() == b"EventID" {
                if let Some(event_id) = parse_leading_u16(value) {
                    if event_id != 0 {
                        if let Some(text) = self.events.description(event_id) {
                            self.emitter
                                .pair_fmt(key, format_args!("{} ({})", event_id, text))?;
                            continue;
                        }
                    }
                }
            }
            self.emitter.pair_quoted(key, value)?;
        }

        let argument_count = num_arguments as usize;
        if !ctx.have(argument_count.saturating_mul(4)) {
            warn!(
                "template `{:#010x}` declares {} arguments past the end of the window",
                short_id, num_arguments
            );
            return Err(ctx.truncated("template_argument_map", argument_count * 4).into());
        }

        let mut argument_sizes = Vec::with_capacity(argument_count);
        for _ in 0..argument_count {
            let size = ctx.u16_named("argument_size")?;
            // The descriptor repeats the value type; the slot recorded at
            // definition time is authoritative.
            let _descriptor_type = ctx.u16_named("argument_type")?;
            argument_sizes.push(size);
        }

        for (index, size) in argument_sizes.iter().enumerate() {
            let slot = self
                .templates
                .get(current)
                .and_then(|template| template.arg(index as u16))
                .cloned();

            match slot {
                None => ctx.skip(usize::from(*size)),
                Some(slot) => self.emit_argument(ctx, &slot.key, slot.value_type, *size)?,
            }
        }

        Ok(())
    }
}

/// Leading decimal digits of a byte string, truncated to 16 bits as the
/// original's `(uint16_t)strtoul` cast does. `None` when there is no digit.
fn parse_leading_u16(value: &[u8]) -> Option<u16> {
    let mut acc: u32 = 0;
    let mut seen = false;

    for &byte in value {
        if !byte.is_ascii_digit() {
            break;
        }
        seen = true;
        acc = acc.wrapping_mul(10).wrapping_add(u32::from(byte - b'0'));
    }

    if seen {
        Some(acc as u16)
    } else {
        None
    }
}

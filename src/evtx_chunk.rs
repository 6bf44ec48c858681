use crate::binxml::{BinXmlParser, ParseContext};
use crate::err::{DeserializationError, DeserializationResult, EvtxError, Result};
use crate::event_descriptions::EventDescriptions;
use crate::evtx_record::{EvtxRecordHeader, EVTX_RECORD_HEADER_SIZE};
use crate::output::TextEmitter;
use crate::utils::bytes;

use log::{debug, trace, warn};
use std::io::Write;

pub(crate) const EVTX_CHUNK_HEADER_SIZE: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvtxChunkHeader {
    pub first_event_record_number: u64,
    pub last_event_record_number: u64,
    pub first_event_record_id: u64,
    pub last_event_record_id: u64,
    pub header_size: u32,
}

impl EvtxChunkHeader {
    pub fn from_bytes(buf: &[u8]) -> DeserializationResult<EvtxChunkHeader> {
        let magic = bytes::read_array_r::<8>(buf, 0, "chunk header magic")?;
        if &magic != b"ElfChnk\x00" {
            return Err(DeserializationError::InvalidEvtxChunkMagic { magic });
        }

        let first_event_record_number = bytes::read_u64_le_r(buf, 8, "chunk.first_record_number")?;
        let last_event_record_number = bytes::read_u64_le_r(buf, 16, "chunk.last_record_number")?;
        let first_event_record_id = bytes::read_u64_le_r(buf, 24, "chunk.first_record_id")?;
        let last_event_record_id = bytes::read_u64_le_r(buf, 32, "chunk.last_record_id")?;
        let header_size = bytes::read_u32_le_r(buf, 40, "chunk.header_size")?;

        Ok(EvtxChunkHeader {
            first_event_record_number,
            last_event_record_number,
            first_event_record_id,
            last_event_record_id,
            header_size,
        })
    }

    /// Whether a record number lies in the declared live range of the chunk.
    /// Failures outside it are tail garbage, not errors.
    pub fn contains_record(&self, record_number: u64) -> bool {
        record_number >= self.first_event_record_number
            && record_number <= self.last_event_record_number
    }
}

/// One 64 KiB chunk and its parsed header.
pub struct EvtxChunk<'a> {
    pub data: &'a [u8],
    pub header: EvtxChunkHeader,
}

impl<'a> EvtxChunk<'a> {
    pub fn new(data: &'a [u8]) -> DeserializationResult<EvtxChunk<'a>> {
        let header = EvtxChunkHeader::from_bytes(data)?;
        Ok(EvtxChunk { data, header })
    }

    /// Scan the records of this chunk, emitting each into `emitter`.
    ///
    /// The BinXml decoder state (template cache, name stack) is created
    /// fresh here, which is what resets both at every chunk boundary.
    pub fn dump_records<W: Write>(
        &self,
        events: &EventDescriptions,
        emitter: &mut TextEmitter<W>,
    ) -> Result<()> {
        let mut parser = BinXmlParser::new(events, emitter);
        let mut offset = EVTX_CHUNK_HEADER_SIZE;

        loop {
            if offset + EVTX_RECORD_HEADER_SIZE > self.data.len() {
                break;
            }

            let record = match EvtxRecordHeader::from_bytes_at(self.data, offset) {
                Ok(record) => record,
                Err(DeserializationError::InvalidEvtxRecordHeaderMagic { .. }) => {
                    trace!("record magic mismatch at {:#x}, chunk done", offset);
                    break;
                }
                Err(err) => return Err(err.into()),
            };

            debug!(
                "record {} at chunk offset {:#x}",
                record.event_record_id, offset
            );
            parser
                .emitter
                .record_prelude(record.event_record_id, &record.timestamp)?;

            // The payload window runs from past the record header to the end
            // of the chunk; the EOF token ends it, and the declared record
            // size drives the scan position.
            let mut ctx = ParseContext::for_chunk(self.data);
            ctx.skip(offset + EVTX_RECORD_HEADER_SIZE);

            if let Err(err) = parser.parse_fragment(&mut ctx) {
                if self.header.contains_record(record.event_record_id) {
                    return Err(EvtxError::FailedToParseRecord {
                        record_id: record.event_record_id,
                        source: Box::new(err),
                    });
                }
                debug!(
                    "tolerating failure in record {} outside the live range {}..={}: {}",
                    record.event_record_id,
                    self.header.first_event_record_number,
                    self.header.last_event_record_number,
                    err
                );
                break;
            }

            parser.emitter.end_record()?;

            if !record.is_valid_size() {
                warn!(
                    "record {} declares size {}, stopping chunk scan",
                    record.event_record_id, record.data_size
                );
                break;
            }
            offset += record.data_size as usize;
        }

        Ok(())
    }
}

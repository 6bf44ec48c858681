use crate::err::{DeserializationError, DeserializationResult};
use crate::utils::{bytes, datetime_from_filetime};

use chrono::{DateTime, Utc};

pub type RecordId = u64;

pub(crate) const EVTX_RECORD_HEADER_SIZE: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvtxRecordHeader {
    pub data_size: u32,
    pub event_record_id: RecordId,
    pub timestamp: DateTime<Utc>,
}

impl EvtxRecordHeader {
    pub fn from_bytes_at(buf: &[u8], offset: usize) -> DeserializationResult<EvtxRecordHeader> {
        let magic = bytes::read_array_r::<4>(buf, offset, "record header magic")?;
        if &magic != b"\x2a\x2a\x00\x00" {
            return Err(DeserializationError::InvalidEvtxRecordHeaderMagic { magic });
        }

        let data_size = bytes::read_u32_le_r(buf, offset + 4, "record.data_size")?;
        let event_record_id = bytes::read_u64_le_r(buf, offset + 8, "record.event_record_id")?;
        let filetime = bytes::read_u64_le_r(buf, offset + 16, "record.filetime")?;

        let timestamp = datetime_from_filetime(filetime)
            .ok_or(DeserializationError::InvalidFileTime { filetime })?;

        Ok(EvtxRecordHeader {
            data_size,
            event_record_id,
            timestamp,
        })
    }

    /// The declared size covers the 24-byte header, the payload, and the
    /// trailing size copy; anything smaller cannot frame a record.
    pub(crate) fn is_valid_size(&self) -> bool {
        self.data_size as usize >= EVTX_RECORD_HEADER_SIZE + 4
    }
}

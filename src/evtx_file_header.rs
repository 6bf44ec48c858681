use crate::err::{DeserializationError, DeserializationResult};

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};

pub(crate) const EVTX_FILE_HEADER_SIZE: usize = 4096;

#[derive(Debug, PartialEq, Eq)]
pub struct EvtxFileHeader {
    pub first_chunk_number: u64,
    pub last_chunk_number: u64,
    pub next_record_id: u64,
    pub header_size: u32,
    pub minor_version: u16,
    pub major_version: u16,
    pub header_block_size: u16,
    pub chunk_count: u16,
    pub flags: HeaderFlags,
    // Checksum is of the first 120 bytes of the header (not verified here).
    pub checksum: u32,
}

bitflags! {
    #[derive(Debug, PartialEq, Eq)]
    pub struct HeaderFlags: u32 {
        const EMPTY = 0x0;
        const DIRTY = 0x1;
        const FULL = 0x2;
    }
}

fn io_read<T>(
    read: std::io::Result<T>,
    what: &'static str,
) -> DeserializationResult<T> {
    read.map_err(|source| DeserializationError::FailedToRead { what, source })
}

impl EvtxFileHeader {
    pub fn from_stream<T: Read + Seek>(stream: &mut T) -> DeserializationResult<EvtxFileHeader> {
        let mut magic = [0_u8; 8];
        io_read(stream.read_exact(&mut magic), "file header magic")?;

        if &magic != b"ElfFile\x00" {
            return Err(DeserializationError::InvalidEvtxFileHeaderMagic { magic });
        }

        let first_chunk_number = io_read(
            stream.read_u64::<LittleEndian>(),
            "file_header_first_chunk_number",
        )?;
        let last_chunk_number = io_read(
            stream.read_u64::<LittleEndian>(),
            "file_header_last_chunk_number",
        )?;
        let next_record_id = io_read(
            stream.read_u64::<LittleEndian>(),
            "file_header_next_record_id",
        )?;
        let header_size = io_read(stream.read_u32::<LittleEndian>(), "file_header_size")?;
        let minor_version = io_read(
            stream.read_u16::<LittleEndian>(),
            "file_header_minor_version",
        )?;
        let major_version = io_read(
            stream.read_u16::<LittleEndian>(),
            "file_header_major_version",
        )?;
        let header_block_size = io_read(
            stream.read_u16::<LittleEndian>(),
            "file_header_block_size",
        )?;
        let chunk_count = io_read(stream.read_u16::<LittleEndian>(), "file_header_chunk_count")?;

        // Reserved
        io_read(
            stream.seek(SeekFrom::Current(76)),
            "file_header_reserved",
        )?;

        let raw_flags = io_read(stream.read_u32::<LittleEndian>(), "file_header_flags")?;
        let flags = HeaderFlags::from_bits_truncate(raw_flags);
        let checksum = io_read(stream.read_u32::<LittleEndian>(), "file_header_checksum")?;

        // Rest of the 4 KiB block is unused.
        io_read(
            stream.seek(SeekFrom::Start(EVTX_FILE_HEADER_SIZE as u64)),
            "file_header_tail",
        )?;

        Ok(EvtxFileHeader {
            first_chunk_number,
            last_chunk_number,
            next_record_id,
            header_size,
            minor_version,
            major_version,
            header_block_size,
            chunk_count,
            flags,
            checksum,
        })
    }

    /// The only supported on-disk format is 3.1 (the `0x00030001` version
    /// word).
    pub fn version_supported(&self) -> bool {
        self.major_version == 3 && self.minor_version == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn file_header_bytes(minor: u16, major: u16) -> Vec<u8> {
        let mut buf = b"ElfFile\x00".to_vec();
        buf.extend(0u64.to_le_bytes()); // first chunk
        buf.extend(25u64.to_le_bytes()); // last chunk
        buf.extend(2226u64.to_le_bytes()); // next record id
        buf.extend(128u32.to_le_bytes()); // header size
        buf.extend(minor.to_le_bytes());
        buf.extend(major.to_le_bytes());
        buf.extend(4096u16.to_le_bytes()); // block size
        buf.extend(26u16.to_le_bytes()); // chunk count
        buf.resize(120, 0);
        buf.extend(1u32.to_le_bytes()); // flags
        buf.extend(0u32.to_le_bytes()); // checksum
        buf.resize(EVTX_FILE_HEADER_SIZE, 0);
        buf
    }

    #[test]
    fn parses_a_file_header() {
        let buf = file_header_bytes(1, 3);
        let header = EvtxFileHeader::from_stream(&mut Cursor::new(buf)).unwrap();
        assert_eq!(
            header,
            EvtxFileHeader {
                first_chunk_number: 0,
                last_chunk_number: 25,
                next_record_id: 2226,
                header_size: 128,
                minor_version: 1,
                major_version: 3,
                header_block_size: 4096,
                chunk_count: 26,
                flags: HeaderFlags::DIRTY,
                checksum: 0,
            }
        );
        assert!(header.version_supported());
    }

    #[test]
    fn rejects_a_bad_magic() {
        let mut buf = file_header_bytes(1, 3);
        buf[0] = b'X';
        assert!(matches!(
            EvtxFileHeader::from_stream(&mut Cursor::new(buf)),
            Err(DeserializationError::InvalidEvtxFileHeaderMagic { .. })
        ));
    }

    #[test]
    fn reports_unsupported_versions() {
        let buf = file_header_bytes(2, 3);
        let header = EvtxFileHeader::from_stream(&mut Cursor::new(buf)).unwrap();
        assert!(!header.version_supported());
    }
}

use crate::err::{DeserializationError, EvtxError, Result};
use crate::event_descriptions::EventDescriptions;
use crate::evtx_chunk::EvtxChunk;
use crate::evtx_file_header::{EvtxFileHeader, EVTX_FILE_HEADER_SIZE};
use crate::output::TextEmitter;

use log::{debug, info};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

pub(crate) const EVTX_CHUNK_SIZE: usize = 65536;

pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Walks an EVTX file chunk by chunk and streams each record's pairs into a
/// `TextEmitter`.
pub struct EvtxParser<T: ReadSeek> {
    data: T,
    header: EvtxFileHeader,
}

impl EvtxParser<File> {
    /// Attempts to load an EVTX file from a path, yielding an error if the
    /// file does not exist, is not a valid EVTX file, or carries an
    /// unsupported version.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EvtxError::FailedToOpenFile {
            source,
            path: path.to_path_buf(),
        })?;

        Self::from_read_seek(file)
    }
}

impl<T: ReadSeek> EvtxParser<T> {
    pub fn from_read_seek(mut data: T) -> Result<Self> {
        let header = EvtxFileHeader::from_stream(&mut data)?;
        debug!("EVTX file header: {:?}", header);

        if !header.version_supported() {
            return Err(DeserializationError::UnsupportedVersion {
                major: header.major_version,
                minor: header.minor_version,
            }
            .into());
        }

        Ok(EvtxParser { data, header })
    }

    pub fn header(&self) -> &EvtxFileHeader {
        &self.header
    }

    /// Dump every record of every chunk. Scanning stops cleanly at the
    /// first short chunk read or chunk magic mismatch, which marks the end
    /// of the used region.
    pub fn dump_records<W: Write>(
        &mut self,
        emitter: &mut TextEmitter<W>,
        events: &EventDescriptions,
    ) -> Result<()> {
        let mut chunk_data = vec![0_u8; EVTX_CHUNK_SIZE];
        let mut offset = EVTX_FILE_HEADER_SIZE as u64;

        loop {
            self.data.seek(SeekFrom::Start(offset))?;
            if !read_full(&mut self.data, &mut chunk_data)? {
                debug!("short chunk read at {:#x}, stopping", offset);
                break;
            }

            let chunk = match EvtxChunk::new(&chunk_data) {
                Ok(chunk) => chunk,
                Err(DeserializationError::InvalidEvtxChunkMagic { .. }) => {
                    debug!("chunk magic mismatch at {:#x}, past the used region", offset);
                    break;
                }
                Err(err) => return Err(err.into()),
            };

            info!(
                "chunk at {:#x}: records {}..={}",
                offset,
                chunk.header.first_event_record_number,
                chunk.header.last_event_record_number
            );

            chunk.dump_records(events, emitter)?;
            offset += EVTX_CHUNK_SIZE as u64;
        }

        Ok(())
    }
}

/// Fill `buf` completely, or report a clean short read.
fn read_full<T: Read>(reader: &mut T, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(true)
}

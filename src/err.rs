use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvtxError>;
pub type DeserializationResult<T> = std::result::Result<T, DeserializationError>;

/// Errors encountered while reading EVTX structures or BinXml tokens.
/// Offsets are relative to the start of the current chunk.
#[derive(Debug, Error)]
pub enum DeserializationError {
    #[error("An I/O error has occurred while trying to read {what}")]
    FailedToRead {
        what: &'static str,
        source: std::io::Error,
    },

    #[error("Offset {offset}: not enough data to read {what} (need {need}, have {have})")]
    Truncated {
        what: &'static str,
        offset: u64,
        need: usize,
        have: usize,
    },

    #[error("Offset {offset}: tried to read an invalid byte `{value:#x}` as a binxml token")]
    InvalidToken { value: u8, offset: u64 },

    #[error("Invalid EVTX file header magic, expected `ElfFile0`, found `{magic:02X?}`")]
    InvalidEvtxFileHeaderMagic { magic: [u8; 8] },

    #[error("Invalid EVTX chunk header magic, expected `ElfChnk0`, found `{magic:02X?}`")]
    InvalidEvtxChunkMagic { magic: [u8; 8] },

    #[error("Invalid EVTX record header magic, expected `2a2a0000`, found `{magic:02X?}`")]
    InvalidEvtxRecordHeaderMagic { magic: [u8; 4] },

    #[error("Unsupported EVTX version {major}.{minor}, expected 3.1")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("Offset {offset}: template instance type is `{value:#x}`, expected `1`")]
    InvalidTemplateInstanceType { value: u8, offset: u64 },

    #[error("Template `{id:#010x}` was referenced but never registered")]
    TemplateNotFound { id: u32 },

    #[error("Offset {offset}: SID of declared size {size} is too short")]
    SidTooShort { size: u16, offset: u64 },

    #[error("FILETIME value `{filetime:#018x}` cannot be represented as a date")]
    InvalidFileTime { filetime: u64 },
}

#[derive(Debug, Error)]
pub enum EvtxError {
    #[error("An I/O error has occurred")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    #[error("Failed to open file {}", path.display())]
    FailedToOpenFile {
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    #[error("Failed to parse record {record_id}")]
    FailedToParseRecord {
        record_id: u64,
        source: Box<EvtxError>,
    },
}

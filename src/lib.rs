#![deny(unused_must_use)]
#![allow(clippy::upper_case_acronyms)]

pub use err::{EvtxError, Result};
pub use event_descriptions::EventDescriptions;
pub use evtx_chunk::{EvtxChunk, EvtxChunkHeader};
pub use evtx_file_header::{EvtxFileHeader, HeaderFlags};
pub use evtx_parser::{EvtxParser, ReadSeek};
pub use evtx_record::{EvtxRecordHeader, RecordId};
pub use guid::Guid;
pub use ntsid::Sid;
pub use output::TextEmitter;

pub mod err;

mod binxml;
mod event_descriptions;
mod evtx_chunk;
mod evtx_file_header;
mod evtx_parser;
mod evtx_record;
mod guid;
mod ntsid;
mod output;
mod utils;

pub type ChunkOffset = u32;
pub type FileOffset = u64;

// For tests, we only initialize logging once.
#[cfg(test)]
use std::sync::Once;

#[cfg(test)]
static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
#[cfg(test)]
pub(crate) fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .init();
    });
}

use evtxdump::{EventDescriptions, EvtxParser, TextEmitter};

use log::debug;
use std::env;
use std::io::{self, Write};

fn dump_file<W: Write>(
    path: &str,
    emitter: &mut TextEmitter<W>,
    events: &EventDescriptions,
) -> evtxdump::Result<()> {
    let mut parser = EvtxParser::from_path(path)?;
    parser.dump_records(emitter, events)
}

fn main() {
    env_logger::init();

    let events = EventDescriptions::load();
    let stdout = io::stdout();
    let mut emitter = TextEmitter::new(stdout.lock());

    // Failures are reported on the output stream; the exit code stays 0.
    for path in env::args().skip(1) {
        if let Err(err) = dump_file(&path, &mut emitter, &events) {
            debug!("{}: {:?}", path, err);
            let _ = emitter.note_failure(&path);
        }
    }
}

//! Browser console logging.
//!
//! Installs a `tracing` subscriber whose formatted lines go to
//! `console.log`, `console.warn` or `console.error` depending on the event
//! level, so filtering in the dev tools works as usual.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the console subscriber. Safe to call more than once.
pub fn init(max_level: LevelFilter) {
    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(ConsoleWriter::default());

    if tracing_subscriber::registry()
        .with(max_level)
        .with(layer)
        .try_init()
        .is_err()
    {
        web_sys::console::warn_1(&"tracing subscriber already installed".into());
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ConsoleWriter {
    level: Option<Level>,
}

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine::new(self.level)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleLine::new(Some(*meta.level()))
    }
}

/// One formatted event, emitted when dropped.
struct ConsoleLine {
    level: Option<Level>,
    buf: Vec<u8>,
}

impl ConsoleLine {
    fn new(level: Option<Level>) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }

    fn emit(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end().into();
        match self.level {
            Some(Level::ERROR) => web_sys::console::error_1(&line),
            Some(Level::WARN) => web_sys::console::warn_1(&line),
            Some(Level::DEBUG | Level::TRACE) => web_sys::console::debug_1(&line),
            _ => web_sys::console::log_1(&line),
        }
        self.buf.clear();
    }
}

impl io::Write for ConsoleLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        self.emit();
    }
}

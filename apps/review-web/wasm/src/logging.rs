//! `tracing` output to the browser console
//!
//! A `tracing-subscriber` fmt layer whose writer buffers one formatted event
//! and hands it to the matching `console.*` method when dropped.

use std::io;

use review_core::LogLevel;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMethod {
    Error,
    Warn,
    Info,
    Debug,
}

impl ConsoleMethod {
    pub fn for_level(level: &Level) -> Self {
        match *level {
            Level::ERROR => ConsoleMethod::Error,
            Level::WARN => ConsoleMethod::Warn,
            Level::INFO => ConsoleMethod::Info,
            _ => ConsoleMethod::Debug,
        }
    }
}

pub struct ConsoleWriter {
    method: ConsoleMethod,
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buffer);
        let line = text.trim_end();
        if line.is_empty() {
            return;
        }
        let value = JsValue::from_str(line);
        match self.method {
            ConsoleMethod::Error => web_sys::console::error_1(&value),
            ConsoleMethod::Warn => web_sys::console::warn_1(&value),
            ConsoleMethod::Info => web_sys::console::info_1(&value),
            ConsoleMethod::Debug => web_sys::console::debug_1(&value),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            method: ConsoleMethod::Info,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            method: ConsoleMethod::for_level(meta.level()),
            buffer: Vec::new(),
        }
    }
}

/// Install the console subscriber. Later calls are no-ops.
pub fn init_logging(level: LogLevel) {
    let installed = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(level.as_level())
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(?level, "console logging installed");
    }
}

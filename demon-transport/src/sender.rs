//! Destinations for serialized frames.
//!
//! Every sender writes one frame per line.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::TransportError;

/// Sends serialized frames to a destination.
pub trait Sender: Send {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Flushes any internal buffers. A no-op for unbuffered senders.
    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Number of frames sent so far.
    fn frames_sent(&self) -> u64;
}

/// Sends data to standard output.
pub struct StdioSender {
    stdout: io::Stdout,
    frames: u64,
}

impl StdioSender {
    pub fn new() -> Self {
        StdioSender {
            stdout: io::stdout(),
            frames: 0,
        }
    }
}

impl Default for StdioSender {
    fn default() -> Self {
        Self::new()
    }
}

impl Sender for StdioSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut lock = self.stdout.lock();
        lock.write_all(data)?;
        lock.write_all(b"\n")?;
        lock.flush()?;
        self.frames += 1;
        Ok(())
    }

    fn frames_sent(&self) -> u64 {
        self.frames
    }
}

/// Writes frames to a file, truncating it on creation.
pub struct FileSender {
    writer: BufWriter<File>,
    frames: u64,
}

impl FileSender {
    pub fn new(path: &Path) -> Result<Self, TransportError> {
        let file = File::create(path)?;
        info!("Initialized FileSender for path: {}", path.display());
        Ok(Self {
            writer: BufWriter::new(file),
            frames: 0,
        })
    }
}

impl Sender for FileSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.writer.write_all(data)?;
        self.writer.write_all(b"\n")?;
        self.frames += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.writer.flush()?;
        Ok(())
    }

    fn frames_sent(&self) -> u64 {
        self.frames
    }
}

/// Discards everything. Handy for benchmarks and headless runs.
#[derive(Default)]
pub struct NullSender {
    frames: u64,
}

impl Sender for NullSender {
    fn send(&mut self, _data: &[u8]) -> Result<(), TransportError> {
        self.frames += 1;
        Ok(())
    }

    fn frames_sent(&self) -> u64 {
        self.frames
    }
}

//! Output thread: serializes frames and hands them to the configured sender.

use std::io;
use std::path::Path;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use demon_config::{SenderConfig, SerializerType};
use demon_transport::{
    BinarySerializer, FileSender, Frame, JsonSerializer, NullSender, Sender, Serializer,
    StdioSender, TransportError,
};
use log::{debug, info};

pub fn create_serializer(kind: SerializerType) -> Box<dyn Serializer> {
    match kind {
        SerializerType::Json => Box::new(JsonSerializer),
        SerializerType::Binary => Box::new(BinarySerializer),
    }
}

pub fn create_sender(config: &SenderConfig) -> Result<Box<dyn Sender>, TransportError> {
    Ok(match config {
        SenderConfig::Stdio => Box::new(StdioSender::new()),
        SenderConfig::File(options) => Box::new(FileSender::new(Path::new(&options.path))?),
        SenderConfig::Null => Box::new(NullSender::default()),
    })
}

/// Starts the output thread. It runs until every frame sender is dropped,
/// then flushes and returns the number of frames written.
pub fn spawn_output(
    frames: Receiver<Frame>,
    serializer: Box<dyn Serializer>,
    sender: Box<dyn Sender>,
) -> io::Result<JoinHandle<Result<u64, TransportError>>> {
    thread::Builder::new()
        .name("demon-output".to_string())
        .spawn(move || drain(frames, serializer.as_ref(), sender))
}

fn drain(
    frames: Receiver<Frame>,
    serializer: &dyn Serializer,
    mut sender: Box<dyn Sender>,
) -> Result<u64, TransportError> {
    for frame in frames.iter() {
        let data = serializer.serialize(&frame)?;
        sender.send(&data)?;
        debug!("Sent frame {} ({} bytes)", frame.tick, data.len());
    }
    sender.flush()?;
    let sent = sender.frames_sent();
    info!("Output thread finished after {} frames", sent);
    Ok(sent)
}

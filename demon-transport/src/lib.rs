//! Frame snapshots and the plumbing that ships them to a renderer.

use thiserror::Error;

pub mod frame;
pub mod sender;
pub mod serializer;

pub use frame::{Frame, FrameParticle};
pub use sender::{FileSender, NullSender, Sender, StdioSender};
pub use serializer::{BinarySerializer, JsonSerializer, Serializer};

/// Error types that can occur while encoding or sending frames.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary serialization error: {0}")]
    Binary(#[from] bincode::Error),

    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),
}

use crate::frame::Frame;
use crate::TransportError;

/// Encodes a frame into one line of output (no trailing newline).
pub trait Serializer: Send + Sync {
    fn serialize(&self, frame: &Frame) -> Result<Vec<u8>, TransportError>;
}

/// JSON serializer implementation
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, frame: &Frame) -> Result<Vec<u8>, TransportError> {
        Ok(serde_json::to_vec(frame)?)
    }
}

/// bincode-encoded frame, base64-wrapped so each frame stays on one line.
pub struct BinarySerializer;

impl Serializer for BinarySerializer {
    fn serialize(&self, frame: &Frame) -> Result<Vec<u8>, TransportError> {
        let bytes = bincode::serialize(frame)?;
        Ok(base64::encode(bytes).into_bytes())
    }
}

impl BinarySerializer {
    /// Reverses [`BinarySerializer::serialize`].
    pub fn decode(line: &[u8]) -> Result<Frame, TransportError> {
        let bytes = base64::decode(line)?;
        Ok(bincode::deserialize(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameParticle;
    use demon_core::ChamberSummary;

    fn frame() -> Frame {
        Frame {
            tick: 42,
            particles: vec![
                FrameParticle { x: 395.0, y: 306.0, radius: 5.0, hot: true },
                FrameParticle { x: 405.0, y: 300.0, radius: 5.0, hot: false },
            ],
            left: ChamberSummary { count: 1, hot: 1, mean_kinetic_energy: 50.0 },
            right: ChamberSummary { count: 1, hot: 0, mean_kinetic_energy: 32.0 },
        }
    }

    #[test]
    fn json_frame_has_particle_fields() {
        let bytes = JsonSerializer.serialize(&frame()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""tick":42"#));
        assert!(text.contains(r#""hot":true"#));
        assert!(text.contains(r#""radius":5.0"#));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn binary_frame_decodes() {
        let original = frame();
        let line = BinarySerializer.serialize(&original).unwrap();
        assert!(line.iter().all(|b| b.is_ascii() && *b != b'\n'));
        assert_eq!(BinarySerializer::decode(&line).unwrap(), original);
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            BinarySerializer::decode(b"not base64!"),
            Err(TransportError::Decode(_))
        ));
    }
}

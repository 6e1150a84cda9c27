use bytes::{Buf, BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::wire::WireMessage;

/// Newline-delimited JSON codec for [`WireMessage`] frames.
#[derive(Debug, Clone, Copy)]
pub struct NewlineDelimitedCodec {
    max_line_length: usize,
}

impl NewlineDelimitedCodec {
    pub fn new() -> Self {
        Self {
            max_line_length: 1024 * 1024, // 1MB default
        }
    }

    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self { max_line_length }
    }
}

impl Default for NewlineDelimitedCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for NewlineDelimitedCodec {
    type Item = WireMessage;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(pos) = src.iter().position(|&b| b == b'\n') else {
                if src.len() > self.max_line_length {
                    return Err(CodecError::LineTooLong(src.len()));
                }
                return Ok(None);
            };

            if pos > self.max_line_length {
                return Err(CodecError::LineTooLong(pos));
            }

            let line = src.split_to(pos);
            src.advance(1);

            let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let message = serde_json::from_slice(line)
                .map_err(|e| CodecError::JsonError(e.to_string()))?;
            return Ok(Some(message));
        }
    }
}

impl Encoder<WireMessage> for NewlineDelimitedCodec {
    type Error = CodecError;

    fn encode(&mut self, item: WireMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json_bytes =
            serde_json::to_vec(&item).map_err(|e| CodecError::JsonError(e.to_string()))?;

        if json_bytes.len() > self.max_line_length {
            return Err(CodecError::LineTooLong(json_bytes.len()));
        }

        dst.reserve(json_bytes.len() + 1);
        dst.put_slice(&json_bytes);
        dst.put_u8(b'\n');

        Ok(())
    }
}

/// Codec errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Line too long: {0} bytes")]
    LineTooLong(usize),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Outcome;
    use serde_json::json;

    #[test]
    fn test_encode_appends_newline() {
        let mut codec = NewlineDelimitedCodec::new();
        let mut buffer = BytesMut::new();

        let msg = WireMessage::Request {
            id: 1,
            channel: "ns:m1".to_string(),
            payload: json!([1, 2]),
        };
        codec.encode(msg.clone(), &mut buffer).unwrap();
        assert_eq!(buffer[buffer.len() - 1], b'\n');

        let decoded = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(decoded, msg);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_line_waits_for_more() {
        let mut codec = NewlineDelimitedCodec::new();
        let mut buffer = BytesMut::from(&br#"{"type":"response","id":2,"#[..]);
        assert!(codec.decode(&mut buffer).unwrap().is_none());

        buffer.put_slice(b"\"value\":5}\r\n");
        let decoded = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(
            decoded,
            WireMessage::Response {
                id: 2,
                outcome: Outcome::Success { value: json!(5) },
            }
        );
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut codec = NewlineDelimitedCodec::new();
        let mut buffer =
            BytesMut::from(&b"\n  \n{\"type\":\"request\",\"id\":9,\"channel\":\"f\"}\n"[..]);
        let decoded = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(decoded.id(), 9);
    }

    #[test]
    fn test_line_too_long() {
        let mut codec = NewlineDelimitedCodec::with_max_line_length(16);
        let mut buffer = BytesMut::new();

        let msg = WireMessage::Request {
            id: 1,
            channel: "x".repeat(64),
            payload: json!(null),
        };
        assert!(matches!(
            codec.encode(msg, &mut buffer),
            Err(CodecError::LineTooLong(_))
        ));

        let mut buffer = BytesMut::from(&[b'a'; 32][..]);
        assert!(matches!(
            codec.decode(&mut buffer),
            Err(CodecError::LineTooLong(32))
        ));
    }

    #[test]
    fn test_invalid_json() {
        let mut codec = NewlineDelimitedCodec::new();
        let mut buffer = BytesMut::from(&b"not json\n"[..]);
        assert!(matches!(
            codec.decode(&mut buffer),
            Err(CodecError::JsonError(_))
        ));
    }
}

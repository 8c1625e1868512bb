//! Length-prefixed framing for JSON-RPC messages.
//!
//! Each frame is a 4-byte big-endian payload length followed by one UTF-8
//! JSON message:
//! ```text
//! +----------------+------------------+
//! |  4 bytes       |  N bytes         |
//! |  (length BE)   |  (JSON payload)  |
//! +----------------+------------------+
//! ```

use bytes::{Buf, BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::protocol::Message;

/// Largest accepted frame. Push payloads are capped at 4 KB by push services,
/// so anything near this limit is a broken peer.
const MAX_FRAME_SIZE: usize = 1024 * 1024;

const LENGTH_PREFIX_SIZE: usize = 4;

#[derive(Debug, Default)]
pub struct JsonRpcCodec {
    pending_length: Option<usize>,
}

impl JsonRpcCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for JsonRpcCodec {
    type Item = Message;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let length = match self.pending_length {
            Some(length) => length,
            None => {
                if src.len() < LENGTH_PREFIX_SIZE {
                    return Ok(None);
                }
                let length = src.get_u32() as usize;
                if length > MAX_FRAME_SIZE {
                    return Err(CodecError::FrameTooLarge(length));
                }
                self.pending_length = Some(length);
                length
            }
        };

        if src.len() < length {
            src.reserve(length - src.len());
            return Ok(None);
        }

        let payload = src.split_to(length);
        self.pending_length = None;

        let text = std::str::from_utf8(&payload)?;
        Ok(Some(serde_json::from_str(text)?))
    }
}

impl Encoder<Message> for JsonRpcCodec {
    type Error = CodecError;

    // Length is checked against MAX_FRAME_SIZE, which fits in u32
    #[allow(clippy::cast_possible_truncation)]
    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = serde_json::to_vec(&item)?;

        if payload.len() > MAX_FRAME_SIZE {
            return Err(CodecError::FrameTooLarge(payload.len()));
        }

        dst.reserve(LENGTH_PREFIX_SIZE + payload.len());
        dst.put_u32(payload.len() as u32);
        dst.put_slice(&payload);

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Frame too large: {0} bytes (max: {MAX_FRAME_SIZE})")]
    FrameTooLarge(usize),
}

#[cfg(test)]
mod tests {
    #![allow(clippy::cast_possible_truncation)] // Test lengths bounded to u32

    use super::*;
    use crate::protocol::{Request, RequestId, Response, methods};

    fn frame(payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_u32(payload.len() as u32);
        buf.put_slice(payload);
        buf
    }

    #[test]
    fn test_encode_writes_length_prefix() {
        let mut codec = JsonRpcCodec::new();
        let mut buf = BytesMut::new();
        let msg = Message::Request(Request::new(methods::SKIP_WAITING, None, 1.into()));

        codec.encode(msg, &mut buf).unwrap();

        let declared = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(declared, buf.len() - LENGTH_PREFIX_SIZE);
    }

    #[test]
    fn test_decode_waits_for_full_frame() {
        let mut codec = JsonRpcCodec::new();
        let full = frame(br#"{"jsonrpc":"2.0","result":true,"id":9}"#);

        let mut partial = BytesMut::from(&full[..10]);
        assert!(codec.decode(&mut partial).unwrap().is_none());

        partial.extend_from_slice(&full[10..]);
        let decoded = codec.decode(&mut partial).unwrap().unwrap();
        assert!(matches!(decoded, Message::Response(r) if r.id == RequestId::Number(9)));
    }

    #[test]
    fn test_decode_short_prefix() {
        let mut codec = JsonRpcCodec::new();
        let mut buf = BytesMut::from(&[0u8, 0][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 2, "prefix bytes must not be consumed early");
    }

    #[test]
    fn test_decode_back_to_back_frames() {
        let mut codec = JsonRpcCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(
                Message::Response(Response::success(1.into(), serde_json::json!(null))),
                &mut buf,
            )
            .unwrap();
        codec
            .encode(
                Message::Request(Request::new(methods::STATUS, None, 2.into())),
                &mut buf,
            )
            .unwrap();

        assert!(codec.decode(&mut buf).unwrap().unwrap().is_response());
        assert!(codec.decode(&mut buf).unwrap().unwrap().is_request());
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_rejects_oversized_frame() {
        let mut codec = JsonRpcCodec::new();
        let mut buf = BytesMut::new();
        buf.put_u32((MAX_FRAME_SIZE + 1) as u32);

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, CodecError::FrameTooLarge(n) if n == MAX_FRAME_SIZE + 1));
    }

    #[test]
    fn test_decode_rejects_bad_json() {
        let mut codec = JsonRpcCodec::new();
        let mut buf = frame(b"{not json");
        assert!(matches!(
            codec.decode(&mut buf).unwrap_err(),
            CodecError::Json(_)
        ));
    }

    #[test]
    fn test_decode_rejects_bad_utf8() {
        let mut codec = JsonRpcCodec::new();
        let mut buf = frame(&[0xff, 0xfe]);
        assert!(matches!(
            codec.decode(&mut buf).unwrap_err(),
            CodecError::Utf8(_)
        ));
    }

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::FrameTooLarge(2_000_000);
        assert!(err.to_string().contains("2000000"));
    }
}

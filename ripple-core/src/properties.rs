//! PUBLISH properties: the two MQTT 5 properties this codec recognizes.
//!
//! Unlike the rest of the wire format, the properties block is length
//! prefixed by a single byte rather than a variable byte integer, since
//! this wire contract never needs more than 255 bytes of properties.

use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{Decoder, Encoder};
use crate::error::DecodeError;

const PAYLOAD_FORMAT_INDICATOR: u8 = 0x01;
const CONTENT_TYPE: u8 = 0x03;

/// At most two recognized keys: a payload format hint and a content type
/// label. Encoders only ever emit these two; decoders treat any other
/// property identifier as a protocol error (its length is not
/// self-describing, so it cannot be safely skipped).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishProperties {
    pub payload_format_indicator: Option<u8>,
    pub content_type: Option<String>,
}

impl PublishProperties {
    fn body_len(&self) -> usize {
        let mut len = 0;

        if self.payload_format_indicator.is_some() {
            len += 2; // id + value
        }

        if let Some(content_type) = &self.content_type {
            len += 2 + content_type.len(); // id + length byte + bytes
        }

        len
    }
}

impl Encoder for PublishProperties {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(self.body_len() as u8);

        if let Some(pfi) = self.payload_format_indicator {
            buffer.put_u8(PAYLOAD_FORMAT_INDICATOR);
            buffer.put_u8(pfi);
        }

        if let Some(content_type) = &self.content_type {
            buffer.put_u8(CONTENT_TYPE);
            buffer.put_u8(content_type.len() as u8);
            buffer.put(content_type.as_bytes());
        }
    }

    fn encoded_size(&self) -> usize {
        1 + self.body_len()
    }
}

impl Decoder for PublishProperties {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        let properties_length = u8::decode(buffer)? as usize;

        if buffer.remaining() < properties_length {
            return Err(DecodeError::UnexpectedEof.into());
        }

        let mut body = buffer.copy_to_bytes(properties_length);
        let mut properties = PublishProperties::default();

        while body.has_remaining() {
            let id = u8::decode(&mut body)?;

            match id {
                PAYLOAD_FORMAT_INDICATOR => {
                    properties.payload_format_indicator = Some(u8::decode(&mut body)?);
                }
                CONTENT_TYPE => {
                    let len = u8::decode(&mut body)? as usize;
                    if body.remaining() < len {
                        return Err(DecodeError::UnexpectedEof.into());
                    }
                    let bytes = body.copy_to_bytes(len);
                    let text = String::from_utf8(bytes.to_vec())
                        .map_err(|_| DecodeError::InvalidUtf8)?;
                    properties.content_type = Some(text);
                }
                other => return Err(DecodeError::UnknownProperty(other).into()),
            }
        }

        Ok(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn round_trip_both_properties() -> crate::Result<()> {
        let properties = PublishProperties {
            payload_format_indicator: Some(1),
            content_type: Some("text/plain".to_string()),
        };

        let mut encoded = BytesMut::new();
        properties.encode(&mut encoded);
        assert_eq!(encoded.len(), properties.encoded_size());

        let mut frozen = encoded.freeze();
        let decoded = PublishProperties::decode(&mut frozen)?;
        assert_eq!(decoded, properties);

        Ok(())
    }

    #[test]
    fn round_trip_empty() -> crate::Result<()> {
        let properties = PublishProperties::default();
        let mut encoded = BytesMut::new();
        properties.encode(&mut encoded);
        assert_eq!(encoded, Bytes::from(vec![0x00]));

        let mut frozen = encoded.freeze();
        let decoded = PublishProperties::decode(&mut frozen)?;
        assert_eq!(decoded, properties);

        Ok(())
    }

    #[test]
    fn unknown_property_id_is_an_error() {
        let mut encoded = Bytes::from(vec![0x02, 0x05, 0x2a]);

        match PublishProperties::decode(&mut encoded) {
            Err(crate::Error::Decode(DecodeError::UnknownProperty(0x05))) => {}
            other => panic!("expected UnknownProperty(0x05), got {other:?}"),
        }
    }
}

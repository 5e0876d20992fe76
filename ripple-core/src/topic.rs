//! A lightweight topic-only PUBLISH parser.
//!
//! The broker never inspects properties or payload bytes; it re-emits the
//! exact frame it received, so decoding those fields (and failing on an
//! unknown property id) would be pure overhead, or worse, would turn an
//! otherwise-deliverable PUBLISH into a dropped connection. This reads just
//! enough of the fixed header and the topic string to key the subscription
//! lookup.

use bytes::{Buf, Bytes};

use crate::codec::{Decoder, VariableByteInteger};
use crate::error::DecodeError;
use crate::packets::PacketKind;
use crate::packets::PublishPacket;

pub fn peek_publish_topic(frame: &[u8]) -> crate::Result<String> {
    if frame.is_empty() {
        return Err(DecodeError::UnexpectedEof.into());
    }

    let mut buffer = Bytes::copy_from_slice(frame);

    let first = u8::decode(&mut buffer)?;
    if first != PublishPacket::FIRST_BYTE {
        return Err(DecodeError::UnsupportedPacketType(first).into());
    }

    let remaining_len = VariableByteInteger::decode(&mut buffer)?.0 as usize;
    if buffer.remaining() < remaining_len {
        return Err(DecodeError::UnexpectedEof.into());
    }

    let mut body = buffer.copy_to_bytes(remaining_len);
    String::decode(&mut body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encoder;
    use crate::properties::PublishProperties;
    use bytes::BytesMut;

    #[test]
    fn extracts_topic_without_touching_properties() {
        let packet = PublishPacket {
            topic: "test/topic".to_string(),
            properties: PublishProperties {
                payload_format_indicator: Some(1),
                content_type: Some("text/plain".to_string()),
            },
            payload: Bytes::from_static(b"hello"),
        };

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);

        let topic = peek_publish_topic(&encoded).unwrap();
        assert_eq!(topic, "test/topic");
    }

    #[test]
    fn unknown_property_id_does_not_fail_the_topic_peek() {
        let mut frame = BytesMut::new();
        frame.extend_from_slice(&[0x30]);

        let mut body = BytesMut::new();
        "t".to_string().encode(&mut body);
        body.extend_from_slice(&[0x02, 0x05, 0x00]); // properties: unknown id 0x05
        body.extend_from_slice(b"payload");

        crate::codec::VariableByteInteger(body.len() as u32).encode(&mut frame);
        frame.extend_from_slice(&body);

        let topic = peek_publish_topic(&frame).unwrap();
        assert_eq!(topic, "t");
    }
}

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::{Decoder, Encoder, VariableByteInteger};
use crate::error::DecodeError;
use crate::packets::PacketKind;
use crate::properties::PublishProperties;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct PublishPacket {
    pub topic: String,
    pub properties: PublishProperties,
    pub payload: Bytes,
}

impl PacketKind for PublishPacket {
    const FIRST_BYTE: u8 = 0x30;
}

impl Encoder for PublishPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(Self::FIRST_BYTE);

        let remaining_len =
            self.topic.encoded_size() + self.properties.encoded_size() + self.payload.len();

        VariableByteInteger(remaining_len as u32).encode(buffer);

        self.topic.encode(buffer);
        self.properties.encode(buffer);
        buffer.extend_from_slice(&self.payload);
    }
}

impl Decoder for PublishPacket {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        let first = u8::decode(buffer)?;
        if first != Self::FIRST_BYTE {
            return Err(DecodeError::UnsupportedPacketType(first).into());
        }

        let remaining_len = VariableByteInteger::decode(buffer)?.0 as usize;
        if buffer.remaining() < remaining_len {
            return Err(DecodeError::UnexpectedEof.into());
        }
        let mut body = buffer.copy_to_bytes(remaining_len);

        let topic = String::decode(&mut body)?;
        let properties = PublishProperties::decode(&mut body)?;
        let payload = body.copy_to_bytes(body.remaining());

        Ok(Self {
            topic,
            properties,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_with_text_payload() -> crate::Result<()> {
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

        let mut frozen = encoded.freeze();
        let decoded = PublishPacket::decode(&mut frozen)?;
        assert_eq!(decoded, packet);

        Ok(())
    }

    #[test]
    fn round_trip_with_binary_payload_and_no_properties() -> crate::Result<()> {
        let packet = PublishPacket {
            topic: "test/binary".to_string(),
            properties: PublishProperties::default(),
            payload: Bytes::from_static(&[0x01, 0x02, 0x03, 0x04]),
        };

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);

        let mut frozen = encoded.freeze();
        let decoded = PublishPacket::decode(&mut frozen)?;
        assert_eq!(decoded, packet);

        Ok(())
    }

    #[test]
    fn large_payload_uses_a_three_byte_remaining_length() -> crate::Result<()> {
        let packet = PublishPacket {
            topic: "t".repeat(200),
            properties: PublishProperties::default(),
            payload: Bytes::from(vec![0xab; 300_000]),
        };

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);

        // fixed header (1) + 3-byte remaining length
        let remaining_len = packet.topic.encoded_size()
            + packet.properties.encoded_size()
            + packet.payload.len();
        assert!(remaining_len > 16_383 && remaining_len <= 2_097_151);

        let mut frozen = encoded.freeze();
        let decoded = PublishPacket::decode(&mut frozen)?;
        assert_eq!(decoded, packet);

        Ok(())
    }
}

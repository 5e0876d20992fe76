use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{Decoder, Encoder, VariableByteInteger};
use crate::error::DecodeError;
use crate::packets::PacketKind;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct UnsubscribePacket {
    pub packet_id: u16,
    pub topics: Vec<String>,
}

impl PacketKind for UnsubscribePacket {
    const FIRST_BYTE: u8 = 0xA2;
}

impl Encoder for UnsubscribePacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(Self::FIRST_BYTE);

        let remaining_len = self.packet_id.encoded_size() + self.topics.encoded_size();
        VariableByteInteger(remaining_len as u32).encode(buffer);

        self.packet_id.encode(buffer);
        self.topics.encode(buffer);
    }
}

impl Decoder for UnsubscribePacket {
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

        let packet_id = u16::decode(&mut body)?;
        let mut topics = Vec::new();
        while body.has_remaining() {
            topics.push(String::decode(&mut body)?);
        }

        Ok(Self { packet_id, topics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() -> crate::Result<()> {
        let packet = UnsubscribePacket {
            packet_id: 7,
            topics: vec!["a/b".to_string(), "c".to_string()],
        };

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);

        let mut frozen = encoded.freeze();
        let decoded = UnsubscribePacket::decode(&mut frozen)?;
        assert_eq!(decoded, packet);

        Ok(())
    }
}

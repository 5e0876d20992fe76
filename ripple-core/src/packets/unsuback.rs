use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{Decoder, Encoder, VariableByteInteger};
use crate::error::DecodeError;
use crate::packets::PacketKind;

/// UNSUBACK carries a single reason-code byte regardless of how many
/// topics the UNSUBSCRIBE named, unlike SUBACK's one-per-topic list.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct UnsubAckPacket {
    pub packet_id: u16,
    pub reason_code: u8,
}

impl PacketKind for UnsubAckPacket {
    const FIRST_BYTE: u8 = 0xB0;
}

impl UnsubAckPacket {
    pub fn success(packet_id: u16) -> Self {
        Self {
            packet_id,
            reason_code: 0x00,
        }
    }
}

impl Encoder for UnsubAckPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(Self::FIRST_BYTE);
        VariableByteInteger(3).encode(buffer);
        self.packet_id.encode(buffer);
        self.reason_code.encode(buffer);
    }
}

impl Decoder for UnsubAckPacket {
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
        let reason_code = u8::decode(&mut body)?;

        if body.has_remaining() {
            return Err(DecodeError::LengthMismatch.into());
        }

        Ok(Self {
            packet_id,
            reason_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() -> crate::Result<()> {
        let packet = UnsubAckPacket::success(7);

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);
        assert_eq!(encoded.len(), 5);

        let mut frozen = encoded.freeze();
        let decoded = UnsubAckPacket::decode(&mut frozen)?;
        assert_eq!(decoded, packet);

        Ok(())
    }
}

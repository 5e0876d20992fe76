use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{Decoder, Encoder, VariableByteInteger};
use crate::error::DecodeError;
use crate::packets::PacketKind;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct SubAckPacket {
    pub packet_id: u16,
    /// One reason code per topic in the originating SUBSCRIBE, in order.
    pub reason_codes: Vec<u8>,
}

impl PacketKind for SubAckPacket {
    const FIRST_BYTE: u8 = 0x90;
}

impl SubAckPacket {
    /// A success SUBACK (`0x00`) for every topic in the request.
    pub fn success(packet_id: u16, topic_count: usize) -> Self {
        Self {
            packet_id,
            reason_codes: vec![0x00; topic_count],
        }
    }
}

impl Encoder for SubAckPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(Self::FIRST_BYTE);

        let remaining_len = self.packet_id.encoded_size() + self.reason_codes.len();
        VariableByteInteger(remaining_len as u32).encode(buffer);

        self.packet_id.encode(buffer);
        self.reason_codes.encode(buffer);
    }
}

impl Decoder for SubAckPacket {
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
        let mut reason_codes = Vec::new();
        while body.has_remaining() {
            reason_codes.push(u8::decode(&mut body)?);
        }

        Ok(Self {
            packet_id,
            reason_codes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() -> crate::Result<()> {
        let packet = SubAckPacket::success(1, 3);

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);

        let mut frozen = encoded.freeze();
        let decoded = SubAckPacket::decode(&mut frozen)?;
        assert_eq!(decoded, packet);

        Ok(())
    }
}

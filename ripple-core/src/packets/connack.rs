use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{Decoder, Encoder, VariableByteInteger};
use crate::error::DecodeError;
use crate::packets::PacketKind;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ConnAckPacket {
    pub session_present: bool,
    pub reason_code: u8,
}

impl PacketKind for ConnAckPacket {
    const FIRST_BYTE: u8 = 0x20;
}

impl ConnAckPacket {
    pub fn success() -> Self {
        Self {
            session_present: false,
            reason_code: 0,
        }
    }
}

impl Encoder for ConnAckPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(Self::FIRST_BYTE);
        VariableByteInteger(2).encode(buffer);
        self.session_present.encode(buffer);
        self.reason_code.encode(buffer);
    }
}

impl Decoder for ConnAckPacket {
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

        let session_present = bool::decode(&mut body)?;
        let reason_code = u8::decode(&mut body)?;

        if body.has_remaining() {
            return Err(DecodeError::LengthMismatch.into());
        }

        Ok(Self {
            session_present,
            reason_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() -> crate::Result<()> {
        let packet = ConnAckPacket::success();

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);
        assert_eq!(encoded.len(), 4);

        let mut frozen = encoded.freeze();
        let decoded = ConnAckPacket::decode(&mut frozen)?;
        assert_eq!(decoded, packet);

        Ok(())
    }
}

use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{Decoder, Encoder, VariableByteInteger};
use crate::error::DecodeError;
use crate::packets::PacketKind;

#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct DisconnectPacket {}

impl PacketKind for DisconnectPacket {
    const FIRST_BYTE: u8 = 0xE0;
}

impl Encoder for DisconnectPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(Self::FIRST_BYTE);
        VariableByteInteger(0).encode(buffer);
    }
}

impl Decoder for DisconnectPacket {
    fn decode<T: Buf>(buffer: &mut T) -> crate::Result<Self> {
        let first = u8::decode(buffer)?;
        if first != Self::FIRST_BYTE {
            return Err(DecodeError::UnsupportedPacketType(first).into());
        }

        let remaining_len = VariableByteInteger::decode(buffer)?.0;
        if remaining_len != 0 {
            return Err(DecodeError::LengthMismatch.into());
        }

        Ok(Self {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() -> crate::Result<()> {
        let packet = DisconnectPacket::default();

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);

        let mut frozen = encoded.freeze();
        let decoded = DisconnectPacket::decode(&mut frozen)?;
        assert_eq!(decoded, packet);

        Ok(())
    }
}

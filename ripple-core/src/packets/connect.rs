use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{Decoder, Encoder, VariableByteInteger};
use crate::error::DecodeError;
use crate::packets::PacketKind;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ConnectPacket {
    pub client_id: String,
    pub protocol_name: String,
    pub protocol_level: u8,
    pub connect_flags: u8,
    pub keep_alive: u16,
}

impl PacketKind for ConnectPacket {
    const FIRST_BYTE: u8 = 0x10;
}

impl Encoder for ConnectPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(Self::FIRST_BYTE);

        let remaining_len = self.protocol_name.encoded_size()
            + self.protocol_level.encoded_size()
            + self.connect_flags.encoded_size()
            + self.keep_alive.encoded_size()
            + self.client_id.encoded_size();

        VariableByteInteger(remaining_len as u32).encode(buffer);

        self.protocol_name.encode(buffer);
        self.protocol_level.encode(buffer);
        self.connect_flags.encode(buffer);
        self.keep_alive.encode(buffer);
        self.client_id.encode(buffer);
    }
}

impl Decoder for ConnectPacket {
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

        let protocol_name = String::decode(&mut body)?;
        let protocol_level = u8::decode(&mut body)?;
        let connect_flags = u8::decode(&mut body)?;
        let keep_alive = u16::decode(&mut body)?;
        let client_id = String::decode(&mut body)?;

        if body.has_remaining() {
            return Err(DecodeError::LengthMismatch.into());
        }

        Ok(Self {
            client_id,
            protocol_name,
            protocol_level,
            connect_flags,
            keep_alive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() -> crate::Result<()> {
        let packet = ConnectPacket {
            client_id: "abc123".to_string(),
            protocol_name: "MQTT".to_string(),
            protocol_level: 4,
            connect_flags: 0x02,
            keep_alive: 60,
        };

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);

        let mut frozen = encoded.freeze();
        let decoded = ConnectPacket::decode(&mut frozen)?;
        assert_eq!(decoded, packet);

        Ok(())
    }
}

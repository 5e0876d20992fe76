use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{Decoder, Encoder, VariableByteInteger};
use crate::error::DecodeError;
use crate::packets::PacketKind;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct SubscribePacket {
    pub packet_id: u16,
    /// `(topic, qos)` pairs in wire order. The qos byte is parsed but
    /// never acted on, since this codec only supports QoS 0 delivery.
    pub subscriptions: Vec<(String, u8)>,
}

impl PacketKind for SubscribePacket {
    const FIRST_BYTE: u8 = 0x82;
}

impl Encoder for SubscribePacket {
    fn encode(&self, buffer: &mut BytesMut) {
        buffer.put_u8(Self::FIRST_BYTE);

        let remaining_len = self.packet_id.encoded_size()
            + self
                .subscriptions
                .iter()
                .map(|(topic, qos)| topic.encoded_size() + qos.encoded_size())
                .sum::<usize>();

        VariableByteInteger(remaining_len as u32).encode(buffer);

        self.packet_id.encode(buffer);
        for (topic, qos) in &self.subscriptions {
            topic.encode(buffer);
            qos.encode(buffer);
        }
    }
}

impl Decoder for SubscribePacket {
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
        let mut subscriptions = Vec::new();

        while body.has_remaining() {
            let topic = String::decode(&mut body)?;
            let qos = u8::decode(&mut body)?;
            subscriptions.push((topic, qos));
        }

        Ok(Self {
            packet_id,
            subscriptions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_multiple_topics() -> crate::Result<()> {
        let packet = SubscribePacket {
            packet_id: 1,
            subscriptions: vec![
                ("a/b".to_string(), 0),
                ("c/d".to_string(), 1),
                ("e".to_string(), 2),
            ],
        };

        let mut encoded = BytesMut::new();
        packet.encode(&mut encoded);

        let mut frozen = encoded.freeze();
        let decoded = SubscribePacket::decode(&mut frozen)?;
        assert_eq!(decoded, packet);

        Ok(())
    }
}

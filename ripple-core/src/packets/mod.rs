//! The control packet subset and the top-level `ControlPacket` enum that
//! dispatches between them by the fixed header's type nibble.

pub mod connack;
pub mod connect;
pub mod disconnect;
pub mod pingreq;
pub mod pingresp;
pub mod publish;
pub mod suback;
pub mod subscribe;
pub mod unsuback;
pub mod unsubscribe;

use bytes::{Buf, Bytes, BytesMut};

use crate::codec::Encoder;
use crate::error::DecodeError;

pub use connack::ConnAckPacket;
pub use connect::ConnectPacket;
pub use disconnect::DisconnectPacket;
pub use pingreq::PingReqPacket;
pub use pingresp::PingRespPacket;
pub use publish::PublishPacket;
pub use suback::SubAckPacket;
pub use subscribe::SubscribePacket;
pub use unsuback::UnsubAckPacket;
pub use unsubscribe::UnsubscribePacket;

/// A packet type's fixed header first byte, shared by every variant below
/// (this subset fixes the flag nibble per type, so it is a single byte
/// rather than type+flags split apart).
pub trait PacketKind {
    const FIRST_BYTE: u8;
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum ControlPacket {
    Connect(ConnectPacket),
    ConnAck(ConnAckPacket),
    Publish(PublishPacket),
    Subscribe(SubscribePacket),
    SubAck(SubAckPacket),
    Unsubscribe(UnsubscribePacket),
    UnsubAck(UnsubAckPacket),
    PingReq(PingReqPacket),
    PingResp(PingRespPacket),
    Disconnect(DisconnectPacket),
}

impl ControlPacket {
    /// Decode exactly one packet from a whole WebSocket binary frame.
    ///
    /// A frame never splits or coalesces packets, so there is no
    /// "incomplete, try again" outcome here: any leftover or missing
    /// bytes are a decode error.
    pub fn decode(frame: &[u8]) -> crate::Result<ControlPacket> {
        use ControlPacket::*;

        if frame.is_empty() {
            return Err(DecodeError::UnexpectedEof.into());
        }

        let packet_type = frame[0] >> 4;
        let mut buffer = Bytes::copy_from_slice(frame);

        let packet = match packet_type {
            0x1 => Connect(ConnectPacket::decode(&mut buffer)?),
            0x2 => ConnAck(ConnAckPacket::decode(&mut buffer)?),
            0x3 => Publish(PublishPacket::decode(&mut buffer)?),
            0x8 => Subscribe(SubscribePacket::decode(&mut buffer)?),
            0x9 => SubAck(SubAckPacket::decode(&mut buffer)?),
            0xa => Unsubscribe(UnsubscribePacket::decode(&mut buffer)?),
            0xb => UnsubAck(UnsubAckPacket::decode(&mut buffer)?),
            0xc => PingReq(PingReqPacket::decode(&mut buffer)?),
            0xd => PingResp(PingRespPacket::decode(&mut buffer)?),
            0xe => Disconnect(DisconnectPacket::decode(&mut buffer)?),
            other => return Err(DecodeError::UnsupportedPacketType(other << 4).into()),
        };

        if buffer.has_remaining() {
            return Err(DecodeError::LengthMismatch.into());
        }

        Ok(packet)
    }

    pub fn encode_to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::new();
        self.encode(&mut buffer);
        buffer.freeze()
    }
}

impl Encoder for ControlPacket {
    fn encode(&self, buffer: &mut BytesMut) {
        use ControlPacket::*;

        match self {
            Connect(p) => p.encode(buffer),
            ConnAck(p) => p.encode(buffer),
            Publish(p) => p.encode(buffer),
            Subscribe(p) => p.encode(buffer),
            SubAck(p) => p.encode(buffer),
            Unsubscribe(p) => p.encode(buffer),
            UnsubAck(p) => p.encode(buffer),
            PingReq(p) => p.encode(buffer),
            PingResp(p) => p.encode(buffer),
            Disconnect(p) => p.encode(buffer),
        }
    }
}

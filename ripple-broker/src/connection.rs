//! The per-connection receive loop: one of these runs per accepted
//! WebSocket connection, processing one packet at a time and mutating the
//! shared registry under its own discipline.

use std::sync::Arc;

use bytes::Bytes;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use ripple_core::codec::Encoder;
use ripple_core::packets::{
    ConnAckPacket, ControlPacket, PingRespPacket, SubAckPacket, UnsubAckPacket,
};
use ripple_core::topic::peek_publish_topic;
use ripple_transport::{Transport, TransportWriter};

use crate::error::BrokerError;
use crate::registry::{ConnId, Registry};
use crate::shutdown::Shutdown;

type Sender = TransportWriter<TcpStream>;

/// Accept the WebSocket handshake on `tcp` and run its receive loop until
/// the connection closes, DISCONNECTs, errors, or `shutdown` fires.
pub async fn run_connection(tcp: TcpStream, registry: Arc<Registry<Sender>>, mut shutdown: Shutdown) {
    let transport = match Transport::accept(tcp).await {
        Ok(t) => t,
        Err(e) => {
            warn!("websocket handshake failed: {e}");
            return;
        }
    };

    let (mut reader, writer) = transport.split();
    let conn = registry.register_connection(writer.clone());
    let mut client_id: Option<String> = None;

    loop {
        let frame = tokio::select! {
            frame = reader.receive_frame() => frame,
            _ = shutdown.recv() => {
                debug!(conn, "connection closed for shutdown");
                break;
            }
        };

        match frame {
            Ok(Some(bytes)) => {
                match handle_frame(&bytes, conn, &mut client_id, &registry, &writer).await {
                    Ok(true) => continue,
                    Ok(false) => {
                        info!(conn, client_id = client_id.as_deref(), "client disconnected");
                        break;
                    }
                    Err(e) => {
                        warn!(conn, client_id = client_id.as_deref(), "dropping connection: {e}");
                        break;
                    }
                }
            }
            Ok(None) => {
                info!(conn, client_id = client_id.as_deref(), "transport closed");
                break;
            }
            Err(e) => {
                warn!(conn, "transport error: {e}");
                break;
            }
        }
    }

    registry.remove_connection(conn);
    let _ = writer.close().await;
}

/// Decode and dispatch one frame. Returns `Ok(false)` on a clean
/// DISCONNECT, `Ok(true)` to keep looping, or an error that tears the
/// connection down.
async fn handle_frame(
    frame: &Bytes,
    conn: ConnId,
    client_id: &mut Option<String>,
    registry: &Registry<Sender>,
    writer: &Sender,
) -> Result<bool, BrokerError> {
    if frame.is_empty() {
        return Err(ripple_core::DecodeError::UnexpectedEof.into());
    }

    // PUBLISH is special-cased before the full decode: the broker never
    // inspects properties or payload, so it only peeks the topic and
    // re-emits the exact bytes it received.
    if frame[0] >> 4 == 0x3 {
        if client_id.is_none() {
            return Err(BrokerError::ProtocolMisuse("PUBLISH before CONNECT"));
        }

        let topic = peek_publish_topic(frame)?;
        let subscribers = registry.subscribers(&topic);
        for subscriber in subscribers {
            if let Err(e) = subscriber.send_frame(frame.clone()).await {
                warn!("fan-out to a subscriber of `{topic}` failed: {e}");
            }
        }
        return Ok(true);
    }

    let packet = ControlPacket::decode(frame)?;

    match packet {
        ControlPacket::Connect(connect) => {
            if client_id.is_some() {
                return Err(BrokerError::ProtocolMisuse("duplicate CONNECT"));
            }

            registry.bind_client(conn, &connect.client_id);
            *client_id = Some(connect.client_id);

            writer
                .send_frame(ControlPacket::ConnAck(ConnAckPacket::success()).encode_to_bytes())
                .await?;
        }
        ControlPacket::Subscribe(subscribe) => {
            if client_id.is_none() {
                return Err(BrokerError::ProtocolMisuse("SUBSCRIBE before CONNECT"));
            }

            for (topic, _qos) in &subscribe.subscriptions {
                registry.subscribe(conn, topic);
            }

            let ack = SubAckPacket::success(subscribe.packet_id, subscribe.subscriptions.len());
            writer
                .send_frame(ControlPacket::SubAck(ack).encode_to_bytes())
                .await?;
        }
        ControlPacket::Unsubscribe(unsubscribe) => {
            if client_id.is_none() {
                return Err(BrokerError::ProtocolMisuse("UNSUBSCRIBE before CONNECT"));
            }

            for topic in &unsubscribe.topics {
                registry.unsubscribe(conn, topic);
            }

            let ack = UnsubAckPacket::success(unsubscribe.packet_id);
            writer
                .send_frame(ControlPacket::UnsubAck(ack).encode_to_bytes())
                .await?;
        }
        ControlPacket::PingReq(_) => {
            writer
                .send_frame(ControlPacket::PingResp(PingRespPacket::default()).encode_to_bytes())
                .await?;
        }
        ControlPacket::Disconnect(_) => {
            return Ok(false);
        }
        ControlPacket::Publish(_)
        | ControlPacket::ConnAck(_)
        | ControlPacket::SubAck(_)
        | ControlPacket::UnsubAck(_)
        | ControlPacket::PingResp(_) => {
            return Err(BrokerError::ProtocolMisuse(
                "packet type is not valid coming from a client",
            ));
        }
    }

    Ok(true)
}

//! The client engine: one outbound broker connection, a per-topic
//! callback dispatch table, and a background keep-alive loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::time::timeout;
use tokio_tungstenite::MaybeTlsStream;
use tracing::{debug, warn};

use ripple_core::codec::Encoder;
use ripple_core::packets::{
    ConnectPacket, ControlPacket, DisconnectPacket, PingReqPacket, PublishPacket, SubscribePacket,
    UnsubscribePacket,
};
use ripple_core::properties::PublishProperties;
use ripple_transport::{Transport, TransportReader, TransportWriter};

use crate::error::{ClientError, Result};
use crate::options::ConnectOptions;
use crate::payload::Payload;

const PROTOCOL_NAME: &str = "MQTT";
const PROTOCOL_LEVEL: u8 = 4;
const CLEAN_SESSION_FLAG: u8 = 0x02;
/// Keep-alive value advertised on the wire; independent of how often this
/// client actually sends PINGREQ (`ConnectOptions::keep_alive_interval`).
const WIRE_KEEP_ALIVE: u16 = 60;
const DEFAULT_PACKET_ID: u16 = 1;

type Sender = TransportWriter<MaybeTlsStream<TcpStream>>;
type Callback = Arc<dyn Fn(&str, Payload, &PublishProperties) + Send + Sync>;

/// One outbound broker connection. Cheap to clone: the callback table and
/// the send path are both shared behind `Arc`.
#[derive(Clone)]
pub struct ClientEngine {
    client_id: String,
    writer: Sender,
    callbacks: Arc<Mutex<HashMap<String, Callback>>>,
    stop: Arc<Notify>,
}

impl ClientEngine {
    /// Open the WebSocket, send CONNECT, wait for CONNACK, then start the
    /// receive loop and the keep-alive loop.
    pub async fn connect(options: ConnectOptions) -> Result<Self> {
        let url = format!("ws://{}:{}", options.host, options.port);
        debug!(%url, "connecting");

        let transport = timeout(options.connect_timeout, Transport::connect(&url))
            .await
            .map_err(|_| ClientError::Timeout)??;

        let (mut reader, writer) = transport.split();

        let client_id = options
            .client_id
            .clone()
            .unwrap_or_else(generate_client_id);

        let connect = ControlPacket::Connect(ConnectPacket {
            client_id: client_id.clone(),
            protocol_name: PROTOCOL_NAME.to_string(),
            protocol_level: PROTOCOL_LEVEL,
            connect_flags: CLEAN_SESSION_FLAG,
            keep_alive: WIRE_KEEP_ALIVE,
        });
        writer.send_frame(connect.encode_to_bytes()).await?;

        let connack_frame = timeout(options.connect_timeout, reader.receive_frame())
            .await
            .map_err(|_| ClientError::Timeout)??
            .ok_or(ClientError::Closed)?;

        match ControlPacket::decode(&connack_frame)? {
            ControlPacket::ConnAck(ack) if ack.reason_code == 0 => {}
            ControlPacket::ConnAck(ack) => {
                return Err(ClientError::ConnectionRefused(ack.reason_code))
            }
            _ => return Err(ClientError::Protocol("expected CONNACK after CONNECT")),
        }

        let callbacks: Arc<Mutex<HashMap<String, Callback>>> = Arc::new(Mutex::new(HashMap::new()));
        let stop = Arc::new(Notify::new());

        tokio::spawn(receive_loop(reader, Arc::clone(&callbacks)));
        tokio::spawn(keep_alive_loop(
            writer.clone(),
            options.keep_alive_interval,
            Arc::clone(&stop),
        ));

        Ok(Self {
            client_id,
            writer,
            callbacks,
            stop,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Register `callback` for `topic`, replacing any prior registration,
    /// then send SUBSCRIBE. Registration happens before transmission so a
    /// server echo can never race ahead of the callback.
    pub async fn subscribe<F>(&self, topic: impl Into<String>, callback: F) -> Result<()>
    where
        F: Fn(&str, Payload, &PublishProperties) + Send + Sync + 'static,
    {
        self.subscribe_with_packet_id(topic, callback, DEFAULT_PACKET_ID)
            .await
    }

    pub async fn subscribe_with_packet_id<F>(
        &self,
        topic: impl Into<String>,
        callback: F,
        packet_id: u16,
    ) -> Result<()>
    where
        F: Fn(&str, Payload, &PublishProperties) + Send + Sync + 'static,
    {
        let topic = topic.into();
        {
            let mut callbacks = self.callbacks.lock().unwrap();
            callbacks.insert(topic.clone(), Arc::new(callback));
        }

        let subscribe = ControlPacket::Subscribe(SubscribePacket {
            packet_id,
            subscriptions: vec![(topic, 0)],
        });
        self.writer
            .send_frame(subscribe.encode_to_bytes())
            .await
            .map_err(Into::into)
    }

    /// Remove the callback for `topic`, then send UNSUBSCRIBE regardless
    /// of whether it was registered, since the broker is authoritative.
    pub async fn unsubscribe(&self, topic: impl Into<String>) -> Result<()> {
        self.unsubscribe_with_packet_id(topic, DEFAULT_PACKET_ID)
            .await
    }

    pub async fn unsubscribe_with_packet_id(
        &self,
        topic: impl Into<String>,
        packet_id: u16,
    ) -> Result<()> {
        let topic = topic.into();
        self.callbacks.lock().unwrap().remove(&topic);

        let unsubscribe = ControlPacket::Unsubscribe(UnsubscribePacket {
            packet_id,
            topics: vec![topic],
        });
        self.writer
            .send_frame(unsubscribe.encode_to_bytes())
            .await
            .map_err(Into::into)
    }

    /// A UTF-8-string payload sets the Payload Format Indicator to 1 and
    /// is sent as its UTF-8 bytes; a byte payload sets it to 0.
    pub async fn publish(
        &self,
        topic: impl Into<String>,
        payload: impl Into<Payload>,
        content_type: Option<String>,
    ) -> Result<()> {
        let (payload_format_indicator, bytes) = match payload.into() {
            Payload::Text(text) => (1, Bytes::from(text.into_bytes())),
            Payload::Binary(bytes) => (0, bytes),
        };

        let publish = ControlPacket::Publish(PublishPacket {
            topic: topic.into(),
            properties: PublishProperties {
                payload_format_indicator: Some(payload_format_indicator),
                content_type,
            },
            payload: bytes,
        });

        self.writer
            .send_frame(publish.encode_to_bytes())
            .await
            .map_err(Into::into)
    }

    /// Send DISCONNECT, stop the keep-alive loop, then close the
    /// transport. The receive loop exits on its own once the transport
    /// closes.
    pub async fn disconnect(&self) -> Result<()> {
        let disconnect = ControlPacket::Disconnect(DisconnectPacket::default());
        let send_result = self.writer.send_frame(disconnect.encode_to_bytes()).await;

        self.stop.notify_waiters();
        let _ = self.writer.close().await;

        send_result.map_err(Into::into)
    }
}

async fn receive_loop(
    mut reader: TransportReader<MaybeTlsStream<TcpStream>>,
    callbacks: Arc<Mutex<HashMap<String, Callback>>>,
) {
    loop {
        match reader.receive_frame().await {
            Ok(Some(frame)) => dispatch_frame(&frame, &callbacks),
            Ok(None) => {
                debug!("broker closed the connection");
                break;
            }
            Err(e) => {
                warn!("transport error: {e}");
                break;
            }
        }
    }
}

async fn keep_alive_loop(writer: Sender, interval: Duration, stop: Arc<Notify>) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick fires immediately; the interval starts after CONNECT

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let ping = ControlPacket::PingReq(PingReqPacket::default());
                if writer.send_frame(ping.encode_to_bytes()).await.is_err() {
                    break;
                }
            }
            _ = stop.notified() => break,
        }
    }
}

/// Decode one inbound frame and dispatch it. A callback panic is caught
/// and logged: one bad callback must not tear down the receive loop.
fn dispatch_frame(frame: &Bytes, callbacks: &Mutex<HashMap<String, Callback>>) {
    let packet = match ControlPacket::decode(frame) {
        Ok(packet) => packet,
        Err(e) => {
            warn!("failed to decode inbound frame: {e}");
            return;
        }
    };

    match packet {
        ControlPacket::Publish(publish) => {
            let callback = callbacks.lock().unwrap().get(&publish.topic).cloned();
            let Some(callback) = callback else {
                debug!("no subscriber for topic `{}`, dropping", publish.topic);
                return;
            };

            let payload = if publish.properties.payload_format_indicator == Some(1) {
                match String::from_utf8(publish.payload.to_vec()) {
                    Ok(text) => Payload::Text(text),
                    Err(_) => {
                        warn!("payload_format_indicator=1 but payload was not valid UTF-8");
                        Payload::Binary(publish.payload)
                    }
                }
            } else {
                Payload::Binary(publish.payload)
            };

            let topic = publish.topic;
            let properties = publish.properties;
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                callback(&topic, payload, &properties);
            }));
            if outcome.is_err() {
                warn!("subscriber callback for `{topic}` panicked");
            }
        }
        ControlPacket::ConnAck(_) | ControlPacket::PingResp(_) => {}
        other => debug!("ignoring unexpected packet from broker: {other:?}"),
    }
}

fn generate_client_id() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_client_id_is_32_hex_characters() {
        let id = generate_client_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

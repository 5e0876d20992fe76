//! WebSocket transport adapter.
//!
//! Hides `tokio-tungstenite` behind a message-oriented duplex channel that
//! moves whole binary frames: `send_frame`, `receive_frame`, `close`.
//! One MQTT control packet per frame; this layer never looks inside the
//! bytes it carries.

pub mod error;

use std::sync::Arc;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub use error::{Result, TransportError};

/// One accepted or established WebSocket connection, not yet split.
pub struct Transport<S> {
    stream: WebSocketStream<S>,
}

impl Transport<TcpStream> {
    /// Complete the WebSocket handshake on an already-accepted TCP stream.
    pub async fn accept(tcp: TcpStream) -> Result<Self> {
        let stream = tokio_tungstenite::accept_async(tcp).await?;
        Ok(Self { stream })
    }
}

impl Transport<MaybeTlsStream<TcpStream>> {
    /// Dial a `ws://` or `wss://` URL. TLS, if any, is handled by the
    /// underlying connector; this adapter treats it as an opaque stream.
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = tokio_tungstenite::connect_async(url).await?;
        Ok(Self { stream })
    }
}

impl<S> Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Split into an owned read half and a cloneable, internally-locked
    /// write half, so a connection's sender can be handed to fan-out code
    /// while its receive loop keeps the read half to itself.
    pub fn split(self) -> (TransportReader<S>, TransportWriter<S>) {
        let (sink, stream) = self.stream.split();
        (
            TransportReader { stream },
            TransportWriter {
                sink: Arc::new(Mutex::new(sink)),
            },
        )
    }
}

/// The receiving half of a connection. Owned exclusively by whichever task
/// runs that connection's receive loop, never cloned, never shared.
pub struct TransportReader<S> {
    stream: futures_util::stream::SplitStream<WebSocketStream<S>>,
}

impl<S> TransportReader<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Read the next whole binary frame. `Ok(None)` means the peer closed
    /// the connection cleanly; ping/pong/close control frames are consumed
    /// internally and never surfaced here.
    pub async fn receive_frame(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.stream.next().await {
                None => return Ok(None),
                Some(Ok(Message::Binary(bytes))) => return Ok(Some(Bytes::from(bytes))),
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Frame(_))) => continue,
                Some(Ok(Message::Text(_))) => return Err(TransportError::TextFrame),
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }
}

/// The sending half of a connection. Cheaply cloneable: every clone shares
/// one underlying sink behind a `tokio::sync::Mutex`, so concurrent
/// `send_frame` calls from fan-out, ACK replies, and the keep-alive loop
/// never interleave bytes on the wire.
pub struct TransportWriter<S> {
    sink: Arc<Mutex<futures_util::stream::SplitSink<WebSocketStream<S>, Message>>>,
}

impl<S> Clone for TransportWriter<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S> TransportWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub async fn send_frame(&self, frame: Bytes) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Binary(frame.to_vec())).await?;
        Ok(())
    }

    pub async fn close(&self) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.close().await?;
        Ok(())
    }
}

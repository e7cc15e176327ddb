use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use super::{Session, SessionEvent, Transport, TransportError};

/// WebSocket transport backed by tokio-tungstenite.
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteTransport;

pub struct TungsteniteSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Transport for TungsteniteTransport {
    type Session = TungsteniteSession;

    fn supports(&self, endpoint: &str) -> bool {
        if endpoint.starts_with("ws://") {
            return true;
        }
        // wss needs a TLS backend compiled in
        endpoint.starts_with("wss://") && cfg!(feature = "tls")
    }

    async fn connect(&mut self, endpoint: &str) -> Result<TungsteniteSession, TransportError> {
        let (stream, response) = connect_async(endpoint).await?;
        debug!("WebSocket handshake with {} ({})", endpoint, response.status());
        Ok(TungsteniteSession { stream })
    }
}

impl Session for TungsteniteSession {
    async fn next_event(&mut self) -> SessionEvent {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(Message::Text(text)) => return SessionEvent::Message(text),
                Ok(Message::Close(frame)) => {
                    let reason = frame
                        .map(|f| f.reason.into_owned())
                        .filter(|r| !r.is_empty());
                    return SessionEvent::Closed(reason);
                }
                Ok(Message::Binary(data)) => {
                    debug!("Ignoring {} byte binary frame", data.len());
                }
                // ping/pong are answered by tungstenite
                Ok(_) => {}
                Err(e) => return SessionEvent::Closed(Some(e.to_string())),
            }
        }
        SessionEvent::Closed(None)
    }
}

pub mod backoff;
pub mod manager;
pub mod transport;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use url::{Position, Url};

/// Suffix appended to the page path to reach the snapshot stream.
const STREAM_SUFFIX: &str = "ws";

/// The parts of the GUI page's location the stream endpoint is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Scheme including the trailing colon, e.g. `https:`.
    pub protocol: String,
    /// Host name plus port when one is given, e.g. `inverter.local:8080`.
    pub host: String,
    pub pathname: String,
}

impl PageLocation {
    pub fn parse(page_url: &str) -> Result<Self, String> {
        let url = Url::parse(page_url).map_err(|e| e.to_string())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("unsupported scheme '{}'", url.scheme()));
        }
        if url.host_str().is_none() {
            return Err("missing host".into());
        }

        Ok(Self {
            protocol: format!("{}:", url.scheme()),
            host: url[Position::BeforeHost..Position::AfterPort].to_string(),
            pathname: url.path().to_string(),
        })
    }

    /// `wss:` for pages served over https, `ws:` otherwise; same host and
    /// path, with the stream suffix appended.
    pub fn endpoint(&self) -> String {
        let scheme = if self.protocol == "https:" { "wss:" } else { "ws:" };
        format!("{scheme}//{}{}{STREAM_SUFFIX}", self.host, self.pathname)
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("WebSocket error: {source}")]
    WebSocket {
        #[from]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("WebSocket handshake did not complete within {after:?}")]
    Timeout { after: Duration },
}

/// What an open session delivers, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Message(String),
    /// Clean close, abnormal termination and transport errors alike. The
    /// session is finished after this.
    Closed(Option<String>),
}

/// One live streaming connection. Receive-only.
pub trait Session: Send + 'static {
    fn next_event(&mut self) -> impl Future<Output = SessionEvent> + Send;
}

/// Opens streaming sessions. A fresh session is requested for every attempt.
pub trait Transport: Send + 'static {
    type Session: Session;

    /// Whether this transport can reach `endpoint` at all. `false` is
    /// permanent and never retried.
    fn supports(&self, endpoint: &str) -> bool;

    fn connect(
        &mut self,
        endpoint: &str,
    ) -> impl Future<Output = Result<Self::Session, TransportError>> + Send;
}

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::BackoffConfig;
use crate::state::{DeviceState, StateStore};

use super::backoff::Backoff;
use super::{PageLocation, Session, SessionEvent, Transport, TransportError};

const UNSUPPORTED_MESSAGE: &str = "This client does not support WebSockets for this server.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Retrying { delay: Duration },
    /// The transport cannot reach the endpoint. Never left.
    Unsupported,
}

/// Text shown while waiting to reconnect.
pub fn reconnect_message(delay: Duration) -> String {
    format!(
        "Server not reachable. Trying to reconnect in {} second(s).",
        delay.as_secs_f64()
    )
}

/// Keeps one streaming session to the GUI server alive and mirrors every
/// snapshot it delivers into the [`StateStore`].
pub struct ConnectionManager<T: Transport> {
    worker: Option<Worker<T>>,
    task: Option<JoinHandle<()>>,
    state_rx: watch::Receiver<ConnectionState>,
}

struct Worker<T: Transport> {
    transport: T,
    store: Arc<StateStore>,
    page: PageLocation,
    backoff: Backoff,
    connect_timeout: Duration,
    state: watch::Sender<ConnectionState>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(
        page: PageLocation,
        backoff: BackoffConfig,
        connect_timeout: Duration,
        store: Arc<StateStore>,
        transport: T,
    ) -> Self {
        let (state, state_rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            worker: Some(Worker {
                transport,
                store,
                page,
                backoff: Backoff::new(backoff),
                connect_timeout,
                state,
            }),
            task: None,
            state_rx,
        }
    }

    /// Begin connecting. Calling it again has no effect.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) {
        let Some(worker) = self.worker.take() else {
            debug!("Connection manager already started");
            return;
        };

        let endpoint = worker.page.endpoint();
        if !worker.transport.supports(&endpoint) {
            error!("Transport cannot reach {}", endpoint);
            worker.store.set_error(true, UNSUPPORTED_MESSAGE);
            worker.state.send_replace(ConnectionState::Unsupported);
            return;
        }

        self.task = Some(tokio::spawn(worker.run(endpoint)));
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }
}

impl<T: Transport> Drop for ConnectionManager<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<T: Transport> Worker<T> {
    /// Connect, stream, wait, repeat. Each step finishes before the next one
    /// starts, so there is never more than one session or pending retry.
    async fn run(mut self, endpoint: String) {
        loop {
            self.state.send_replace(ConnectionState::Connecting);
            debug!("Connecting to {}", endpoint);

            // a handshake that never finishes counts as a failed attempt
            let after = self.connect_timeout;
            let attempt = tokio::time::timeout(after, self.transport.connect(&endpoint))
                .await
                .unwrap_or(Err(TransportError::Timeout { after }));

            let reason = match attempt {
                Ok(session) => {
                    self.backoff.reset();
                    self.store.set_error(false, "");
                    self.state.send_replace(ConnectionState::Connected);
                    info!("Connected to {}", endpoint);
                    receive(&self.store, session).await
                }
                Err(e) => Some(e.to_string()),
            };

            let delay = self.backoff.next_delay();
            let message = reconnect_message(delay);
            warn!(
                "{} ({})",
                message,
                reason.as_deref().unwrap_or("connection closed")
            );
            self.store.set_error(true, message);
            self.state.send_replace(ConnectionState::Retrying { delay });

            tokio::time::sleep(delay).await;
        }
    }
}

/// Apply snapshots in arrival order until the session closes. Returns the
/// close reason, if any.
async fn receive<S: Session>(store: &StateStore, mut session: S) -> Option<String> {
    loop {
        match session.next_event().await {
            SessionEvent::Message(text) => match DeviceState::from_json(&text) {
                Ok(state) => store.set_state(state),
                Err(e) => warn!("Dropping malformed snapshot: {}", e),
            },
            SessionEvent::Closed(reason) => return reason,
        }
    }
}

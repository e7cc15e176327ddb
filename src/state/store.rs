use tokio::sync::watch;

use super::{ConnectivityStatus, DeviceState};

/// Latest known device snapshot and connectivity flag, observable by the
/// display layer. Only the connection manager writes to it.
#[derive(Debug)]
pub struct StateStore {
    state: watch::Sender<DeviceState>,
    error: watch::Sender<ConnectivityStatus>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(DeviceState::default());
        let (error, _) = watch::channel(ConnectivityStatus::default());
        Self { state, error }
    }

    /// Replace the current snapshot. Observers are notified even if nobody
    /// is subscribed yet; the value is kept for later readers.
    pub fn set_state(&self, next: DeviceState) {
        self.state.send_replace(next);
    }

    pub fn set_error(&self, has_error: bool, message: impl Into<String>) {
        self.error.send_replace(ConnectivityStatus {
            has_error,
            error_message: message.into(),
        });
    }

    pub fn state(&self) -> DeviceState {
        self.state.borrow().clone()
    }

    pub fn error(&self) -> ConnectivityStatus {
        self.error.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<DeviceState> {
        self.state.subscribe()
    }

    pub fn subscribe_error(&self) -> watch::Receiver<ConnectivityStatus> {
        self.error.subscribe()
    }
}

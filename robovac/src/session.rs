use robovac_common::{DeviceId, StateMap, WireKey, WireValue};
use tokio::sync::mpsc::UnboundedReceiver;

pub mod memory;

/// Updates the device pushed on its own, in arrival order. A key may appear
/// more than once; the last occurrence wins.
pub type PushBatch = Vec<(WireKey, WireValue)>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("device unreachable: {0}")]
    Unreachable(String),
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("session closed")]
    Closed,
    #[error("transport error: {0}")]
    Transport(String),
}

/// Lower-level connection to one device.
///
/// Connection policy (encryption, keep-alive, retries, timeouts) lives behind
/// this trait. Acknowledging a write means the transport accepted it, not that
/// the device acted on it.
pub trait Session: Send + Sync + 'static {
    /// Establishes the connection and returns the device's current state.
    fn connect(&self) -> impl Future<Output = Result<StateMap, SessionError>> + Send;

    fn disconnect(&self) -> impl Future<Output = ()> + Send;

    /// Sends all `writes` as a single message.
    fn send_writes(&self, writes: StateMap) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Pushes for `device`, starting now. The stream ends when the session is torn down.
    fn subscribe(&self, device: &DeviceId) -> UnboundedReceiver<PushBatch>;
}

//! A session that never leaves the process.
//!
//! Stands in for a real device: it serves a snapshot on connect, records every
//! write batch, and can reflect accepted writes back as pushes the way the
//! firmware does.

use std::sync::{Mutex, MutexGuard, PoisonError};

use robovac_common::{DeviceId, StateMap};
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    watch,
};

use super::{PushBatch, Session, SessionError};

pub struct MemorySession {
    device_id: DeviceId,
    inner: Mutex<Inner>,
    // true while writes may complete
    gate: watch::Sender<bool>,
}

#[derive(Default)]
struct Inner {
    device: StateMap,
    connected: bool,
    echo: bool,
    fail_connect: Option<SessionError>,
    connects: usize,
    writes: Vec<StateMap>,
    subscribers: Vec<UnboundedSender<PushBatch>>,
}

impl MemorySession {
    pub fn new(device_id: impl Into<DeviceId>) -> Self {
        Self {
            device_id: device_id.into(),
            inner: Mutex::new(Inner::default()),
            gate: watch::Sender::new(true),
        }
    }

    pub fn with_state(self, state: StateMap) -> Self {
        self.inner().device = state;
        self
    }

    /// Reflect every accepted write back to subscribers as a push.
    pub fn with_echo(self) -> Self {
        self.inner().echo = true;
        self
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Replaces the device state served by the next connect.
    pub fn set_state(&self, state: StateMap) {
        self.inner().device = state;
    }

    pub fn state(&self) -> StateMap {
        self.inner().device.clone()
    }

    pub fn fail_next_connect(&self, error: SessionError) {
        self.inner().fail_connect = Some(error);
    }

    /// Holds every write, recorded but unacknowledged, until [`Self::release_writes`].
    pub fn hold_writes(&self) {
        self.gate.send_replace(false);
    }

    pub fn release_writes(&self) {
        self.gate.send_replace(true);
    }

    /// Pushes `batch` to subscribers as if the device had reported it.
    pub fn push(&self, batch: PushBatch) {
        let mut inner = self.inner();

        for (key, value) in &batch {
            inner.device.insert(key.clone(), value.clone());
        }

        inner
            .subscribers
            .retain(|subscriber| subscriber.send(batch.clone()).is_ok());
    }

    pub fn writes(&self) -> Vec<StateMap> {
        self.inner().writes.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.inner().connects
    }

    pub fn is_connected(&self) -> bool {
        self.inner().connected
    }
}

impl Session for MemorySession {
    async fn connect(&self) -> Result<StateMap, SessionError> {
        let mut inner = self.inner();
        inner.connects += 1;

        if let Some(error) = inner.fail_connect.take() {
            tracing::debug!(device = %self.device_id, %error, "Refusing connection");
            inner.subscribers.clear();
            return Err(error);
        }

        inner.connected = true;
        Ok(inner.device.clone())
    }

    async fn disconnect(&self) {
        let mut inner = self.inner();
        inner.connected = false;
        inner.subscribers.clear();
    }

    async fn send_writes(&self, writes: StateMap) -> Result<(), SessionError> {
        {
            let mut inner = self.inner();
            if !inner.connected {
                return Err(SessionError::Closed);
            }

            inner.writes.push(writes.clone());
        }

        let mut gate = self.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map_err(|_| SessionError::Closed)?;

        let echo = {
            let inner = self.inner();
            if !inner.connected {
                return Err(SessionError::Closed);
            }
            inner.echo
        };

        if echo {
            self.push(writes.into_iter().collect());
        }

        Ok(())
    }

    fn subscribe(&self, device: &DeviceId) -> UnboundedReceiver<PushBatch> {
        let (tx, rx) = mpsc::unbounded_channel();

        if *device == self.device_id {
            self.inner().subscribers.push(tx);
        } else {
            tracing::warn!(
                expected = %self.device_id,
                requested = %device,
                "Subscription for unknown device",
            );
        }

        rx
    }
}

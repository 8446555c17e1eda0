use core::sync::atomic::{AtomicU64, Ordering};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use compact_str::CompactString;
use robovac_common::{
    DeviceClass, DeviceId, Property, PropertyDescriptor, PropertyValue, StateMap, WireValue,
    command::{
        MapDataRequest, MethodCall, MethodRequest, Payload as _, RoomsRequest, SpotRequest, Zone,
        ZonesRequest,
    },
    domains::{CleanSpeed, Direction, ErrorCode, WorkMode, WorkStatus},
    robovac::{
        BatteryLevel, CallMethod, FindRobot, Fault, GetMapData, GoHome, ManualControl,
        ManualDirection, Mode, PlayPause, Power, ROBOVAC, Speed, Status,
    },
};
use serde::Serialize;
use tokio::{
    sync::{Mutex, RwLock, mpsc::UnboundedReceiver},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    Error, Result,
    session::{PushBatch, Session},
    state::{DeviceState, StateChange},
};

type Listener = Box<dyn Fn(&StateChange) + Send + Sync>;

/// Controller for one Robovac, reached through `S`.
///
/// Writes are queued and sent one batch at a time. Pushes from the device are
/// merged into a local cache by a background task, so reads never touch the
/// network.
pub struct Robovac<S: Session> {
    device_id: DeviceId,
    class: &'static DeviceClass,
    session: Arc<S>,
    shared: Arc<Shared>,
    write_queue: Mutex<()>,
    link: Mutex<Option<Link>>,
}

struct Shared {
    state: RwLock<DeviceState>,
    listeners: Mutex<Vec<Listener>>,
    // bumped on every connect and teardown
    generation: AtomicU64,
}

struct Link {
    generation: u64,
    cancel: CancellationToken,
    // None while the session is still connecting
    pump: Option<JoinHandle<()>>,
}

impl Link {
    fn is_live(&self) -> bool {
        self.pump.as_ref().is_some_and(|pump| !pump.is_finished())
    }
}

impl<S: Session> Robovac<S> {
    pub fn new(device_id: impl Into<DeviceId>, session: Arc<S>) -> Self {
        Self {
            device_id: device_id.into(),
            class: &ROBOVAC,
            session,
            shared: Arc::new(Shared {
                state: RwLock::new(DeviceState::default()),
                listeners: Mutex::new(Vec::new()),
                generation: AtomicU64::new(0),
            }),
            write_queue: Mutex::new(()),
            link: Mutex::new(None),
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }

    /// Whether a connection is established and its push stream is still open.
    pub async fn is_connected(&self) -> bool {
        self.link.lock().await.as_ref().is_some_and(Link::is_live)
    }

    /// Connects and returns the device's initial state.
    ///
    /// Whatever was cached from an earlier connection is discarded. If already
    /// connected, the current session is torn down first. A [`Self::disconnect`]
    /// while the session is still connecting completes this call with
    /// [`Error::Cancelled`].
    pub async fn connect(&self) -> Result<StateMap> {
        let (generation, cancel, pushes) = {
            let mut link = self.link.lock().await;

            if let Some(previous) = link.take() {
                tracing::info!(device = %self.device_id, "Dropping current session to reconnect");
                self.teardown(previous).await;
            }

            let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let cancel = CancellationToken::new();
            let pushes = self.session.subscribe(&self.device_id);

            *link = Some(Link { generation, cancel: cancel.clone(), pump: None });

            (generation, cancel, pushes)
        };

        let res = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::info!(device = %self.device_id, "Connect cancelled");
                return Err(Error::Cancelled);
            }
            res = self.session.connect() => res,
        };

        let mut link = self.link.lock().await;

        // a disconnect or another connect took over while the handshake ran
        if cancel.is_cancelled() || link.as_ref().is_none_or(|l| l.generation != generation) {
            return Err(Error::Cancelled);
        }

        let snapshot = match res {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(device = %self.device_id, %error, "Failed to connect");
                *link = None;
                return Err(Error::Connection(error));
            }
        };

        self.shared.state.write().await.replace(snapshot.clone());

        let pump = tokio::spawn(pump(
            self.shared.clone(),
            self.class,
            self.device_id.clone(),
            generation,
            pushes,
            cancel.clone(),
        ));
        *link = Some(Link { generation, cancel, pump: Some(pump) });

        tracing::info!(device = %self.device_id, keys = snapshot.len(), "Connected");

        Ok(snapshot)
    }

    /// Tears down the session. Does nothing if not connected.
    pub async fn disconnect(&self) {
        let Some(link) = self.link.lock().await.take() else {
            tracing::debug!(device = %self.device_id, "Already disconnected");
            return;
        };

        self.teardown(link).await;

        tracing::info!(device = %self.device_id, "Disconnected");
    }

    async fn teardown(&self, link: Link) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        link.cancel.cancel();
        if let Some(pump) = link.pump {
            pump.abort();
        }
        self.shared.state.write().await.clear();
        self.session.disconnect().await;
    }

    /// Sends `writes` as one message and waits for the transport to accept it.
    ///
    /// Concurrent calls are queued. A disconnect while waiting completes the
    /// call with [`Error::Cancelled`].
    pub async fn set_properties(&self, writes: StateMap) -> Result<()> {
        if let Some(descriptor) = writes
            .keys()
            .find_map(|key| self.class.by_key(key).filter(|d| d.read_only))
        {
            return Err(Error::WriteRejected { name: descriptor.name, key: descriptor.key });
        }

        let _queue = self.write_queue.lock().await;

        let (generation, cancel) = match &*self.link.lock().await {
            Some(link) if link.is_live() => (link.generation, link.cancel.clone()),
            _ => return Err(Error::NotConnected),
        };

        tracing::debug!(device = %self.device_id, ?writes, "Sending writes");

        tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(Error::Cancelled),
            res = self.session.send_writes(writes) => {
                res.map_err(Error::Session)?;

                if self.shared.generation.load(Ordering::SeqCst) != generation {
                    return Err(Error::Cancelled);
                }

                Ok(())
            }
        }
    }

    async fn write(&self, descriptor: &PropertyDescriptor, value: WireValue) -> Result<()> {
        if descriptor.read_only {
            return Err(Error::WriteRejected { name: descriptor.name, key: descriptor.key });
        }

        self.set_properties(StateMap::from([(descriptor.key.into(), value)]))
            .await
    }

    pub async fn set<P: Property>(&self, value: P::Value) -> Result<()> {
        self.write(&P::DESCRIPTOR, value.encode()).await
    }

    /// Last reported value of `P`.
    pub async fn get<P: Property>(&self) -> Result<P::Value> {
        let key = P::DESCRIPTOR.key;
        let state = self.shared.state.read().await;

        let value = state.get(key).ok_or_else(|| Error::NoValue { key: key.into() })?;

        P::Value::decode(value).map_err(|source| Error::Decode { key, source })
    }

    pub async fn get_raw(&self, key: &str) -> Result<WireValue> {
        self.shared
            .state
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NoValue { key: key.into() })
    }

    pub async fn snapshot(&self) -> StateMap {
        self.shared.state.read().await.snapshot()
    }

    /// Calls `listener` for every change of a state-signal property.
    pub async fn on_state_change(&self, listener: impl Fn(&StateChange) + Send + Sync + 'static) {
        self.shared.listeners.lock().await.push(Box::new(listener));
    }

    pub async fn power(&self) -> Result<bool> {
        self.get::<Power>().await
    }

    pub async fn direction(&self) -> Result<Direction> {
        self.get::<ManualDirection>().await
    }

    pub async fn work_mode(&self) -> Result<WorkMode> {
        self.get::<Mode>().await
    }

    pub async fn work_status(&self) -> Result<WorkStatus> {
        self.get::<Status>().await
    }

    pub async fn clean_speed(&self) -> Result<CleanSpeed> {
        self.get::<Speed>().await
    }

    pub async fn battery_level(&self) -> Result<i64> {
        self.get::<BatteryLevel>().await
    }

    pub async fn error_code(&self) -> Result<ErrorCode> {
        self.get::<Fault>().await
    }

    pub async fn set_power(&self, on: bool) -> Result<()> {
        self.set::<Power>(on).await
    }

    pub async fn play(&self) -> Result<()> {
        self.set::<PlayPause>(true).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.set::<PlayPause>(false).await
    }

    pub async fn start_cleaning(&self) -> Result<()> {
        self.set::<Mode>(WorkMode::Auto).await
    }

    pub async fn go_home(&self) -> Result<()> {
        self.set::<GoHome>(true).await
    }

    pub async fn set_work_mode(&self, work_mode: WorkMode) -> Result<()> {
        self.set::<Mode>(work_mode).await
    }

    pub async fn set_clean_speed(&self, clean_speed: CleanSpeed) -> Result<()> {
        self.set::<Speed>(clean_speed).await
    }

    pub async fn find_robot(&self) -> Result<()> {
        self.set::<FindRobot>(true).await
    }

    pub async fn set_direction(&self, direction: Direction) -> Result<()> {
        self.set::<ManualDirection>(direction).await
    }

    pub async fn manual_control(&self, command: impl Into<CompactString>) -> Result<()> {
        self.set::<ManualControl>(command.into()).await
    }

    /// Writes `{method, data, timestamp}` to the call-method data point.
    pub async fn invoke_method(&self, method: &str, data: impl Serialize) -> Result<()> {
        let call = MethodCall::new(method, data)?;

        tracing::debug!(device = %self.device_id, ?call, "Invoking method");

        self.set::<CallMethod>(call.encode()?.into()).await
    }

    pub async fn invoke<R: MethodRequest>(&self, request: &R) -> Result<()> {
        self.invoke_method(R::METHOD, request).await
    }

    /// Asks the device to upload its map. The map itself arrives out of band.
    pub async fn get_map_data(&self) -> Result<()> {
        let request = MapDataRequest::new(self.device_id.clone());

        self.set::<GetMapData>(request.encode()?.into()).await
    }

    pub async fn clean_rooms(&self, room_ids: &[u32], clean_times: u32) -> Result<()> {
        self.invoke(&RoomsRequest { room_ids: room_ids.to_vec(), clean_times })
            .await
    }

    pub async fn clean_spot(&self, x: i64, y: i64, clean_times: u32) -> Result<()> {
        self.invoke(&SpotRequest::new(x, y, clean_times)).await
    }

    pub async fn clean_zones(&self, zones: &[Zone], clean_times: u32) -> Result<()> {
        self.invoke(&ZonesRequest::new(zones, clean_times)).await
    }
}

impl<S: Session> Drop for Robovac<S> {
    fn drop(&mut self) {
        if let Some(link) = self.link.get_mut().take() {
            link.cancel.cancel();
            if let Some(pump) = link.pump {
                pump.abort();
            }
        }
    }
}

async fn pump(
    shared: Arc<Shared>,
    class: &'static DeviceClass,
    device_id: DeviceId,
    generation: u64,
    mut pushes: UnboundedReceiver<PushBatch>,
    cancel: CancellationToken,
) {
    loop {
        let batch = tokio::select! {
            _ = cancel.cancelled() => break,
            batch = pushes.recv() => match batch {
                Some(batch) => batch,
                None => {
                    tracing::warn!(device = %device_id, "Push stream ended, connection lost");
                    break;
                }
            },
        };

        let changes = {
            let mut state = shared.state.write().await;

            if shared.generation.load(Ordering::SeqCst) != generation {
                tracing::warn!(
                    device = %device_id,
                    len = batch.len(),
                    "Dropping push from a stale session",
                );
                break;
            }

            state.merge(class, batch)
        };

        if changes.is_empty() {
            continue;
        }

        let listeners = shared.listeners.lock().await;
        for change in &changes {
            tracing::debug!(
                property = change.descriptor.name,
                value = %change.value,
                "State changed",
            );

            for listener in listeners.iter() {
                if panic::catch_unwind(AssertUnwindSafe(|| listener(change))).is_err() {
                    tracing::error!(
                        device = %device_id,
                        property = change.descriptor.name,
                        "State change listener panicked",
                    );
                }
            }
        }
    }
}

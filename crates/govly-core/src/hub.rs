// ── Hub ──
//
// The integration context: one per account/API key. Owns the API client,
// the state cache, the event bus, and one poll coordinator per device.
// Replaces any notion of global per-instance state -- everything hangs off
// this object and dies with it.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use govly_api::{ApiClient, CapabilityCommand};

use crate::cache::StateCache;
use crate::config::HubConfig;
use crate::error::CoreError;
use crate::events::HubEvent;
use crate::model::{Capability, CapabilityKind, Device, DeviceKind};
use crate::poll::{self, PollCoordinator, PollState};
use crate::views::{FanView, HumidifierView, LightView, SensorView};

const EVENT_CHANNEL_SIZE: usize = 256;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. [`connect()`](Self::connect) fetches the
/// device listing, pulls every device's initial state, enriches light
/// capabilities with fetched scenes, subscribes event-capable devices to
/// push notifications, and spawns the per-device refresh loops.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

struct HubInner {
    config: HubConfig,
    client: Arc<ApiClient>,
    cache: Arc<StateCache>,
    devices: Vec<Arc<Device>>,
    event_tx: broadcast::Sender<HubEvent>,
    cancel: CancellationToken,
    coordinators: Mutex<HashMap<String, PollCoordinator>>,
}

impl Hub {
    /// Connect to the cloud and build the full device context.
    ///
    /// A 401 anywhere in this path is fatal: the account needs
    /// reconfiguration, so no device setup is retried. Per-device
    /// failures of any other class skip that device's coordinator and
    /// leave the rest of the hub intact.
    pub async fn connect(config: HubConfig) -> Result<Self, CoreError> {
        let client = Arc::new(ApiClient::new(
            &config.base_url,
            &config.api_key,
            config.timeout,
        )?);
        let cache = Arc::new(StateCache::new());
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        let entries = client.list_devices().await?;
        info!(devices = entries.len(), "received cloud device listing");

        let mut devices = Vec::with_capacity(entries.len());
        let mut ready = Vec::new();

        for entry in entries {
            let mut device = Device::from(entry);

            // Initial baseline, fetched before the coordinator exists so no
            // device is ever polled against an empty cache.
            match client.device_state(&device.sku, &device.id).await {
                Ok(payload) => {
                    let capabilities: Vec<Capability> =
                        payload.capabilities.into_iter().map(Capability::from).collect();
                    cache.replace(&device.id, capabilities).await;
                    ready.push(device.id.clone());
                }
                Err(e) if e.is_auth() => {
                    error!(device = %device.id, "initial state fetch rejected: API key invalid");
                    return Err(CoreError::AuthenticationRequired);
                }
                Err(e) => {
                    error!(device = %device.id, error = %e, "initial state fetch failed; device will not be polled");
                }
            }

            // Lights get their scene catalog enriched from the cloud; any
            // failure falls back to the curated built-in catalog.
            if device.kind == DeviceKind::Light {
                match client.list_scenes(&device.sku, &device.id).await {
                    Ok(scenes) => {
                        for raw in scenes.capabilities {
                            let cap = Capability::from(raw);
                            if cap.kind == CapabilityKind::DynamicScene {
                                device.merge_capability(cap);
                            }
                        }
                    }
                    Err(e) => {
                        warn!(device = %device.id, error = %e, "scene fetch failed; using built-in catalog");
                    }
                }
            }

            // Push notifications, once per event-capable device.
            if device.has_capability(&CapabilityKind::Event) {
                if let Err(e) = client.subscribe_events(&device.sku, &device.id).await {
                    warn!(device = %device.id, error = %e, "event subscription failed");
                }
            }

            devices.push(Arc::new(device));
        }

        let hub = Self {
            inner: Arc::new(HubInner {
                config,
                client,
                cache,
                devices,
                event_tx,
                cancel,
                coordinators: Mutex::new(HashMap::new()),
            }),
        };

        // Coordinators only for devices whose baseline fetch succeeded.
        // A zero interval disables polling entirely (one-shot CLI use).
        if !hub.inner.config.poll_interval.is_zero() {
            let mut coordinators = hub.inner.coordinators.lock().await;
            for device in hub.inner.devices.iter().filter(|d| ready.contains(&d.id)) {
                let coordinator = poll::spawn(
                    Arc::clone(&hub.inner.client),
                    Arc::clone(&hub.inner.cache),
                    hub.inner.event_tx.clone(),
                    device.id.clone(),
                    device.sku.clone(),
                    hub.inner.config.poll_interval,
                    hub.inner.cancel.child_token(),
                );
                coordinators.insert(device.id.clone(), coordinator);
            }
            info!(coordinators = coordinators.len(), "poll coordinators started");
        }

        Ok(hub)
    }

    /// Stop scheduling new polls and wait for the loops to wind down.
    ///
    /// In-flight requests are not cancelled; they complete or hit their
    /// own per-request timeout.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut coordinators = self.inner.coordinators.lock().await;
        for (_, coordinator) in coordinators.drain() {
            let _ = coordinator.handle.await;
        }
        debug!("hub shut down");
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn devices(&self) -> &[Arc<Device>] {
        &self.inner.devices
    }

    /// Look up a device by vendor id, or by name as a fallback.
    pub fn device(&self, identifier: &str) -> Option<Arc<Device>> {
        self.inner
            .devices
            .iter()
            .find(|d| d.id == identifier)
            .or_else(|| {
                self.inner
                    .devices
                    .iter()
                    .find(|d| d.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(identifier)))
            })
            .cloned()
    }

    pub fn cache(&self) -> &Arc<StateCache> {
        &self.inner.cache
    }

    /// Subscribe to the hub event bus.
    pub fn events(&self) -> broadcast::Receiver<HubEvent> {
        self.inner.event_tx.subscribe()
    }

    /// The current poll state of one device's coordinator.
    pub async fn poll_state(&self, device: &str) -> Option<PollState> {
        let coordinators = self.inner.coordinators.lock().await;
        coordinators.get(device).map(|c| c.state_rx.borrow().clone())
    }

    /// API requests issued today (diagnostic counter).
    pub fn requests_today(&self) -> u64 {
        self.inner.client.requests_today()
    }

    /// Whether the device currently reports itself online, if known.
    pub async fn online(&self, device: &str) -> Option<bool> {
        self.inner
            .cache
            .get(device, &CapabilityKind::Online, "online")
            .await
            .and_then(|v| v.as_bool())
    }

    // ── Control ──────────────────────────────────────────────────────

    /// Send one logical action as a single control request.
    ///
    /// All commands travel in one round trip under one correlation id. On
    /// success, each echoed capability value is folded into the cache --
    /// until then the cache keeps the previous values, so a failed call
    /// never fabricates device state. Returns `Ok(false)` for command
    /// failures (transport, non-2xx, missing echo); the caller's own
    /// cadence decides whether to retry.
    pub async fn control(
        &self,
        device: &str,
        commands: Vec<CapabilityCommand>,
    ) -> Result<bool, CoreError> {
        let target = self
            .device(device)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: device.to_owned(),
            })?;
        if commands.is_empty() {
            return Err(CoreError::Validation {
                message: "no commands to send".into(),
            });
        }

        match self
            .inner
            .client
            .control(&target.sku, &target.id, commands)
            .await
        {
            Ok(echoes) if !echoes.is_empty() => {
                for echo in echoes {
                    let Some(value) = echo.value else {
                        warn!(device = %target.id, instance = %echo.instance, "echo without value");
                        continue;
                    };
                    self.inner
                        .cache
                        .patch(
                            &target.id,
                            CapabilityKind::from_wire(&echo.kind),
                            &echo.instance,
                            value,
                        )
                        .await;
                }
                Ok(true)
            }
            Ok(_) => {
                warn!(device = %target.id, "control request returned no echo; cache left untouched");
                Ok(false)
            }
            Err(e) => {
                warn!(device = %target.id, error = %e, "control request failed; cache left untouched");
                Ok(false)
            }
        }
    }

    /// On-demand full refresh of one device, outside the scheduled loop.
    pub async fn refresh(&self, device: &str) -> Result<(), CoreError> {
        let target = self
            .device(device)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: device.to_owned(),
            })?;
        let payload = self
            .inner
            .client
            .device_state(&target.sku, &target.id)
            .await?;
        let capabilities: Vec<Capability> =
            payload.capabilities.into_iter().map(Capability::from).collect();
        self.inner.cache.replace(&target.id, capabilities).await;
        let _ = self.inner.event_tx.send(HubEvent::StateUpdated {
            device: target.id.clone(),
        });
        Ok(())
    }

    // ── Event ingestion ──────────────────────────────────────────────

    /// Feed one inbound webhook body into the hub.
    ///
    /// Bodies without an `event.device` are ignored without error. Valid
    /// events fire a device-scoped notification and, when the device is
    /// cached, merge their fields into that device's attribute overlay.
    /// Duplicate deliveries re-set the same values and re-fire the
    /// notification.
    pub async fn ingest_event(&self, body: &Value) {
        let Some(event) = body.get("event").and_then(Value::as_object) else {
            debug!("ignoring webhook body without event payload");
            return;
        };
        let Some(device) = event.get("device").and_then(Value::as_str) else {
            warn!("ignoring event without device identifier");
            return;
        };

        let _ = self.inner.event_tx.send(HubEvent::Device {
            device: device.to_owned(),
            fields: event.clone(),
        });

        if self.inner.cache.contains(device).await {
            self.inner.cache.merge_event(device, event).await;
            debug!(device, "merged event fields into cached state");
        }
    }

    // ── Device views ─────────────────────────────────────────────────

    pub fn light(&self, device: &str) -> Result<LightView, CoreError> {
        LightView::new(self.clone(), device)
    }

    pub fn fan(&self, device: &str) -> Result<FanView, CoreError> {
        FanView::new(self.clone(), device)
    }

    pub fn humidifier(&self, device: &str) -> Result<HumidifierView, CoreError> {
        HumidifierView::new(self.clone(), device)
    }

    pub fn sensors(&self, device: &str) -> Result<SensorView, CoreError> {
        SensorView::new(self.clone(), device)
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("devices", &self.inner.devices.len())
            .finish_non_exhaustive()
    }
}

// Hand-crafted async HTTP client for the Govee cloud OpenAPI.
//
// Base path: /router/api/v1/
// Auth: Govee-API-Key header

use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;
use uuid::Uuid;

use crate::Error;
use crate::types::{
    CapabilityCommand, ControlEcho, ControlPayload, ControlRequest, ControlResponse, DeviceEntry,
    DeviceRef, DeviceStatePayload, GetEnvelope, PostEnvelope, SceneListPayload, StateRequest,
    StateResponse, SubscribeRequest,
};

/// Default production endpoint for the vendor's OpenAPI.
pub const DEFAULT_BASE_URL: &str = "https://openapi.api.govee.com/router/api/v1/";

const API_KEY_HEADER: &str = "Govee-API-Key";

// ── Daily request counter ────────────────────────────────────────────

/// Process-wide daily request counter.
///
/// Purely diagnostic: the vendor enforces its 10 000/day account quota
/// remotely, this just tells the user where they stand. Resets when the
/// calendar day changes.
#[derive(Debug)]
struct RequestCounter {
    inner: Mutex<(NaiveDate, u64)>,
}

impl RequestCounter {
    fn new() -> Self {
        Self {
            inner: Mutex::new((chrono::Utc::now().date_naive(), 0)),
        }
    }

    fn bump(&self) -> u64 {
        let today = chrono::Utc::now().date_naive();
        let Ok(mut guard) = self.inner.lock() else {
            return 0;
        };
        if guard.0 == today {
            guard.1 += 1;
        } else {
            *guard = (today, 1);
        }
        guard.1
    }

    fn today(&self) -> u64 {
        let today = chrono::Utc::now().date_naive();
        self.inner
            .lock()
            .map_or(0, |guard| if guard.0 == today { guard.1 } else { 0 })
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Govee cloud OpenAPI.
///
/// Injects the API key as a sensitive default header, applies a per-request
/// timeout, counts requests per calendar day, and classifies failures into
/// [`Error`] variants so callers can apply setup-vs-steady-state policy.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    counter: RequestCounter,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from an API key and per-request timeout.
    pub fn new(base_url: &str, api_key: &SecretString, timeout: Duration) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(api_key.expose_secret()).map_err(|e| {
            Error::Api {
                status: 0,
                message: format!("invalid API key header value: {e}"),
            }
        })?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            counter: RequestCounter::new(),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            counter: RequestCounter::new(),
        })
    }

    /// Ensure the base URL ends with a slash so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// Requests issued today (resets at the UTC date change).
    pub fn requests_today(&self) -> u64 {
        self.counter.today()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"user/devices"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        self.counter.bump();
        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        self.counter.bump();
        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::classify_error(status, resp).await)
        }
    }

    async fn classify_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        match status {
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                error!("cloud API rate limit hit -- account quota is 10000 requests/day");
                Error::RateLimited
            }
            reqwest::StatusCode::UNAUTHORIZED => {
                error!("cloud API rejected the API key");
                Error::Unauthenticated
            }
            _ => {
                let raw = resp.text().await.unwrap_or_default();
                error!(status = status.as_u16(), body = %raw, "cloud API request failed");
                Error::Api {
                    status: status.as_u16(),
                    message: if raw.is_empty() {
                        status.to_string()
                    } else {
                        raw
                    },
                }
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Device listing ───────────────────────────────────────────────

    /// Fetch all devices bound to the account.
    pub async fn list_devices(&self) -> Result<Vec<DeviceEntry>, Error> {
        let envelope: GetEnvelope<Vec<DeviceEntry>> = self.get("user/devices").await?;
        Ok(envelope.data)
    }

    // ── Device state ─────────────────────────────────────────────────

    /// Fetch the full capability state snapshot for one device.
    pub async fn device_state(&self, sku: &str, device: &str) -> Result<DeviceStatePayload, Error> {
        let request = StateRequest {
            request_id: Uuid::new_v4().to_string(),
            payload: DeviceRef { sku, device },
        };
        let resp: StateResponse = self.post("device/state", &request).await?;
        Ok(resp.payload)
    }

    // ── Device control ───────────────────────────────────────────────

    /// Send one or more capability commands as a single control request.
    ///
    /// The whole command list travels in one round trip under one
    /// correlation id, so a multi-command action is never partially
    /// applied by request loss. Returns the echoed capability values.
    pub async fn control(
        &self,
        sku: &str,
        device: &str,
        commands: Vec<CapabilityCommand>,
    ) -> Result<Vec<ControlEcho>, Error> {
        let request_id = Uuid::new_v4().to_string();
        debug!(device, request_id = %request_id, commands = commands.len(), "sending control request");

        let request = ControlRequest {
            request_id,
            payload: ControlPayload {
                sku,
                device,
                capability: commands.into(),
            },
        };
        let resp: ControlResponse = self.post("device/control", &request).await?;
        match resp.capability {
            Some(echo) => Ok(echo.into_vec()),
            None => {
                warn!(device, "control response carried no capability echo");
                Ok(Vec::new())
            }
        }
    }

    // ── Scenes ───────────────────────────────────────────────────────

    /// Fetch the dynamic-scene capabilities available for a SKU.
    pub async fn list_scenes(&self, sku: &str, device: &str) -> Result<SceneListPayload, Error> {
        let envelope: GetEnvelope<SceneListPayload> = self
            .get(&format!("device/scenes?sku={sku}&device={device}"))
            .await?;
        Ok(envelope.data)
    }

    // ── Event subscription ───────────────────────────────────────────

    /// Subscribe to push events for one device.
    ///
    /// Issued once per device that advertises an `event`-type capability.
    pub async fn subscribe_events(&self, sku: &str, device: &str) -> Result<(), Error> {
        let request = SubscribeRequest {
            request_id: Uuid::new_v4().to_string(),
            payload: DeviceRef { sku, device },
        };
        let _: PostEnvelope<serde_json::Value> = self.post("device/event/subscribe", &request).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

//! Composite commands.
//!
//! Anything that doesn't fit a single data point is serialized as compact JSON,
//! wrapped in standard padded base64 and written to one dedicated key:
//!
//! ```plain
//! 124 <- base64({"method":"selectRoomsClean","data":{...},"timestamp":1712345678901})
//! 121 <- base64({"type":"mapData","id":"<device id>","timestamp":1712345678901})
//! ```

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use compact_str::CompactString;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::DeviceId;

/// First id handed out to zones in a zone clean request. The firmware expects
/// zones to be numbered consecutively from here.
pub const ZONE_ID_BASE: u32 = 128;

pub mod methods {
    pub const SELECT_ROOMS_CLEAN: &str = "selectRoomsClean";
    pub const SELECT_ZONES_CLEAN: &str = "selectZonesClean";
    pub const GOTO: &str = "goto";
}

#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

/// Milliseconds since the Unix epoch. Only used to make payloads unique, the
/// device clock is not synchronized with ours.
pub fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub trait Payload: Serialize + DeserializeOwned {
    fn encode(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(BASE64_STANDARD.encode(json))
    }

    fn decode(encoded: &str) -> Result<Self, PayloadError> {
        let json = BASE64_STANDARD.decode(encoded)?;
        Ok(serde_json::from_slice(&json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: CompactString,
    pub data: serde_json::Value,
    pub timestamp: i64,
}

impl MethodCall {
    pub fn new(
        method: impl Into<CompactString>,
        data: impl Serialize,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            method: method.into(),
            data: serde_json::to_value(data)?,
            timestamp: timestamp_millis(),
        })
    }

    pub fn request<R: MethodRequest>(request: &R) -> Result<Self, serde_json::Error> {
        Self::new(R::METHOD, request)
    }

    /// Decodes `data` back into a typed request, if the method matches.
    pub fn parse<R: MethodRequest + DeserializeOwned>(&self) -> Option<Result<R, serde_json::Error>> {
        (self.method == R::METHOD).then(|| R::deserialize(&self.data))
    }
}

impl Payload for MethodCall {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDataRequest {
    #[serde(rename = "type")]
    pub kind: CompactString,
    pub id: DeviceId,
    pub timestamp: i64,
}

impl MapDataRequest {
    pub fn new(id: DeviceId) -> Self {
        Self {
            kind: CompactString::const_new("mapData"),
            id,
            timestamp: timestamp_millis(),
        }
    }
}

impl Payload for MapDataRequest {}

/// Typed `data` of a [`MethodCall`].
pub trait MethodRequest: Serialize {
    const METHOD: &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsRequest {
    pub room_ids: Vec<u32>,
    pub clean_times: u32,
}

impl MethodRequest for RoomsRequest {
    const METHOD: &'static str = methods::SELECT_ROOMS_CLEAN;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotRequest {
    pub target: CompactString,
    pub clean_times: u32,
    pub x: i64,
    pub y: i64,
}

impl SpotRequest {
    pub fn new(x: i64, y: i64, clean_times: u32) -> Self {
        Self {
            target: CompactString::const_new("spot"),
            clean_times,
            x,
            y,
        }
    }
}

impl MethodRequest for SpotRequest {
    const METHOD: &'static str = methods::GOTO;
}

/// Quadrilateral in map coordinates, corners in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
    pub x3: i64,
    pub y3: i64,
}

impl Zone {
    /// Axis-aligned rectangle, starting at the top left and going clockwise.
    pub fn rect(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            x0: left,
            y0: top,
            x1: right,
            y1: top,
            x2: right,
            y2: bottom,
            x3: left,
            y3: bottom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneEntry {
    pub clean_times: u32,
    #[serde(rename = "type")]
    pub kind: CompactString,
    pub id: u32,
    pub name: CompactString,
    #[serde(flatten)]
    pub zone: Zone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonesRequest {
    pub zones: Vec<ZoneEntry>,
}

impl ZonesRequest {
    pub fn new(zones: &[Zone], clean_times: u32) -> Self {
        let zones = zones
            .iter()
            .zip(ZONE_ID_BASE..)
            .map(|(zone, id)| ZoneEntry {
                clean_times,
                kind: CompactString::const_new("sweep"),
                id,
                name: CompactString::default(),
                zone: *zone,
            })
            .collect();

        Self { zones }
    }
}

impl MethodRequest for ZonesRequest {
    const METHOD: &'static str = methods::SELECT_ZONES_CLEAN;
}

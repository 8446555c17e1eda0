use core::fmt::Display;
use std::collections::BTreeMap;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

pub type WireKey = CompactString;

/// Flat key/value view of a device, as carried by the session.
pub type StateMap = BTreeMap<WireKey, WireValue>;

/// A single data point value as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Boolean(bool),
    Integer(i64),
    String(CompactString),
}

impl WireValue {
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Boolean(_) => "boolean",
            WireValue::Integer(_) => "integer",
            WireValue::String(_) => "string",
        }
    }
}

impl Display for WireValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WireValue::Boolean(b) => write!(f, "{b}"),
            WireValue::Integer(n) => write!(f, "{n}"),
            WireValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        WireValue::Boolean(value)
    }
}

impl From<i64> for WireValue {
    fn from(value: i64) -> Self {
        WireValue::Integer(value)
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        WireValue::String(value.into())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        WireValue::String(value.into())
    }
}

impl From<CompactString> for WireValue {
    fn from(value: CompactString) -> Self {
        WireValue::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_value_format() {
        assert_eq!(serde_json::to_value(WireValue::from(true)).unwrap(), serde_json::json!(true));
        assert_eq!(serde_json::to_value(WireValue::from(87)).unwrap(), serde_json::json!(87));
        assert_eq!(
            serde_json::to_value(WireValue::from("Running")).unwrap(),
            serde_json::json!("Running")
        );
    }

    #[test]
    fn deser_state_map() {
        let state: StateMap = serde_json::from_value(serde_json::json!({
            "1": true,
            "15": "Charging",
            "104": 100,
        }))
        .unwrap();

        assert_eq!(state["1"], WireValue::Boolean(true));
        assert_eq!(state["15"], WireValue::String("Charging".into()));
        assert_eq!(state["104"], WireValue::Integer(100));
    }
}

use core::{fmt::Display, ops::Deref};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Identifier the session layer uses to address one physical device.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(CompactString);

impl DeviceId {
    pub const fn const_new(s: &'static str) -> Self {
        Self(CompactString::const_new(s))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl<T: AsRef<str>> From<T> for DeviceId {
    fn from(value: T) -> Self {
        DeviceId(CompactString::from(value.as_ref()))
    }
}

impl Deref for DeviceId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_serde() {
        assert_eq!(
            serde_json::to_string(&DeviceId::from("eb12345678abcdef")).unwrap(),
            r#""eb12345678abcdef""#
        );

        assert_eq!(
            serde_json::from_str::<DeviceId>(r#""eb12345678abcdef""#).unwrap(),
            DeviceId::from("eb12345678abcdef")
        );
    }
}

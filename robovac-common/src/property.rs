use core::fmt::Debug;

use compact_str::CompactString;

use crate::WireValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Free-form string, passed through untouched
    Raw,
    Boolean,
    Integer,
    /// One of a fixed, case-sensitive set of strings
    Enumerated {
        name: &'static str,
        variants: &'static [&'static str],
    },
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Raw => "string",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Enumerated { name, .. } => *name,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected {expected}, got {} {value}", .value.kind())]
    UnexpectedType {
        expected: &'static str,
        value: WireValue,
    },
    #[error("{value:?} is not a valid {domain}")]
    OutOfDomain {
        domain: &'static str,
        value: CompactString,
    },
}

/// Static binding between a semantic property and its data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub key: &'static str,
    pub value_type: ValueType,
    pub read_only: bool,
    /// Changes are surfaced to state listeners rather than treated as telemetry
    pub state_signal: bool,
}

impl PropertyDescriptor {
    pub const fn new(name: &'static str, key: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            key,
            value_type,
            read_only: false,
            state_signal: false,
        }
    }

    pub const fn read_only(self) -> Self {
        Self { read_only: true, ..self }
    }

    pub const fn state_signal(self) -> Self {
        Self { state_signal: true, ..self }
    }

    pub fn domain(&self) -> Option<&'static [&'static str]> {
        match self.value_type {
            ValueType::Enumerated { variants, .. } => Some(variants),
            _ => None,
        }
    }

    /// Checks that `value` is something this property can hold, without
    /// needing the typed representation.
    pub fn check(&self, value: &WireValue) -> Result<(), DecodeError> {
        match (self.value_type, value) {
            (ValueType::Raw, WireValue::String(_))
            | (ValueType::Boolean, WireValue::Boolean(_))
            | (ValueType::Integer, WireValue::Integer(_)) => Ok(()),
            (ValueType::Enumerated { name, variants }, WireValue::String(s)) => {
                if variants.contains(&s.as_str()) {
                    Ok(())
                } else {
                    Err(DecodeError::OutOfDomain { domain: name, value: s.clone() })
                }
            }
            (value_type, value) => Err(DecodeError::UnexpectedType {
                expected: value_type.name(),
                value: value.clone(),
            }),
        }
    }
}

/// Typed view of a wire value.
pub trait PropertyValue: Debug + Clone + PartialEq + Sized {
    const TYPE: ValueType;

    fn decode(value: &WireValue) -> Result<Self, DecodeError>;
    fn encode(&self) -> WireValue;
}

impl PropertyValue for bool {
    const TYPE: ValueType = ValueType::Boolean;

    fn decode(value: &WireValue) -> Result<Self, DecodeError> {
        match value {
            WireValue::Boolean(b) => Ok(*b),
            other => Err(DecodeError::UnexpectedType {
                expected: "boolean",
                value: other.clone(),
            }),
        }
    }

    fn encode(&self) -> WireValue {
        WireValue::Boolean(*self)
    }
}

impl PropertyValue for i64 {
    const TYPE: ValueType = ValueType::Integer;

    fn decode(value: &WireValue) -> Result<Self, DecodeError> {
        match value {
            WireValue::Integer(n) => Ok(*n),
            other => Err(DecodeError::UnexpectedType {
                expected: "integer",
                value: other.clone(),
            }),
        }
    }

    fn encode(&self) -> WireValue {
        WireValue::Integer(*self)
    }
}

impl PropertyValue for CompactString {
    const TYPE: ValueType = ValueType::Raw;

    fn decode(value: &WireValue) -> Result<Self, DecodeError> {
        match value {
            WireValue::String(s) => Ok(s.clone()),
            other => Err(DecodeError::UnexpectedType {
                expected: "string",
                value: other.clone(),
            }),
        }
    }

    fn encode(&self) -> WireValue {
        WireValue::String(self.clone())
    }
}

pub trait Property {
    type Value: PropertyValue;

    const DESCRIPTOR: PropertyDescriptor;
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: PropertyDescriptor =
        PropertyDescriptor::new("level", "7", ValueType::Integer).read_only();

    const MODE: PropertyDescriptor = PropertyDescriptor::new("mode", "8", ValueType::Enumerated {
        name: "Mode",
        variants: &["low", "High"],
    })
    .state_signal();

    #[test]
    fn descriptor_flags() {
        assert!(LEVEL.read_only);
        assert!(!LEVEL.state_signal);
        assert!(!MODE.read_only);
        assert!(MODE.state_signal);
        assert_eq!(MODE.domain(), Some(&["low", "High"][..]));
        assert_eq!(LEVEL.domain(), None);
    }

    #[test]
    fn check_is_exact() {
        assert_eq!(LEVEL.check(&WireValue::Integer(3)), Ok(()));
        assert_eq!(MODE.check(&WireValue::from("High")), Ok(()));
        assert_eq!(
            MODE.check(&WireValue::from("high")),
            Err(DecodeError::OutOfDomain { domain: "Mode", value: "high".into() })
        );
        assert_eq!(
            LEVEL.check(&WireValue::from("3")),
            Err(DecodeError::UnexpectedType {
                expected: "integer",
                value: WireValue::from("3"),
            })
        );
    }

    #[test]
    fn primitive_decoding() {
        assert_eq!(bool::decode(&WireValue::Boolean(false)), Ok(false));
        assert!(bool::decode(&WireValue::Integer(0)).is_err());
        assert_eq!(i64::decode(&WireValue::Integer(42)), Ok(42));
        assert!(i64::decode(&WireValue::from("42")).is_err());
        assert_eq!(CompactString::decode(&WireValue::from("abc")), Ok("abc".into()));
        assert!(CompactString::decode(&WireValue::Boolean(true)).is_err());
    }
}

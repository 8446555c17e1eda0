/// Declares a closed set of wire strings as an enum.
///
/// Each variant is bound to exactly one wire string. Lookup is exact-match, so
/// the casing of the wire strings is preserved as written.
#[macro_export]
macro_rules! domain {
    (
        $( #[ $meta:meta ] )*
        pub enum $ident:ident {
            $( $( #[ $vmeta:meta ] )* $variant:ident = $wire:literal ),+ $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $( #[ $meta ] )*
        pub enum $ident {
            $( $( #[ $vmeta ] )* $variant ),+
        }

        impl $ident {
            pub const ALL: &'static [Self] = &[ $( Self::$variant ),+ ];
            pub const WIRE: &'static [&'static str] = &[ $( $wire ),+ ];

            pub const fn as_wire(&self) -> &'static str {
                match self {
                    $( Self::$variant => $wire ),+
                }
            }

            pub fn from_wire(s: &str) -> Option<Self> {
                match s {
                    $( $wire => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl ::core::fmt::Display for $ident {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_wire())
            }
        }

        impl ::core::str::FromStr for $ident {
            type Err = $crate::DecodeError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::from_wire(s).ok_or_else(|| $crate::DecodeError::OutOfDomain {
                    domain: stringify!($ident),
                    value: s.into(),
                })
            }
        }

        impl $crate::PropertyValue for $ident {
            const TYPE: $crate::ValueType = $crate::ValueType::Enumerated {
                name: stringify!($ident),
                variants: Self::WIRE,
            };

            fn decode(value: &$crate::WireValue) -> ::core::result::Result<Self, $crate::DecodeError> {
                match value {
                    $crate::WireValue::String(s) => s.parse(),
                    other => Err($crate::DecodeError::UnexpectedType {
                        expected: stringify!($ident),
                        value: other.clone(),
                    }),
                }
            }

            fn encode(&self) -> $crate::WireValue {
                $crate::WireValue::String($crate::_compact_str::CompactString::const_new(
                    self.as_wire(),
                ))
            }
        }

        impl $crate::_serde::Serialize for $ident {
            fn serialize<S: $crate::_serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::core::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_wire())
            }
        }

        impl<'de> $crate::_serde::Deserialize<'de> for $ident {
            fn deserialize<D: $crate::_serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::core::result::Result<Self, D::Error> {
                let s = <$crate::_compact_str::CompactString as $crate::_serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                s.parse().map_err(<D::Error as $crate::_serde::de::Error>::custom)
            }
        }
    };
}

/// Declares zero-sized marker types implementing [`Property`](crate::Property).
///
/// ```ignore
/// property! {
///     pub struct BatteryLevel: i64 = "battery_level" @ "104", read_only, state_signal;
/// }
/// ```
#[macro_export]
macro_rules! property {
    ($(
        $( #[ $meta:meta ] )*
        pub struct $ident:ident: $value:ty = $name:literal @ $key:expr $(, $flag:ident)* ;
    )+) => {$(
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $( #[ $meta ] )*
        pub struct $ident;

        impl $crate::Property for $ident {
            type Value = $value;

            const DESCRIPTOR: $crate::PropertyDescriptor = $crate::PropertyDescriptor::new(
                $name,
                $key,
                <$value as $crate::PropertyValue>::TYPE,
            ) $( .$flag() )*;
        }
    )+};
}

#[cfg(test)]
mod tests {
    use crate::{DecodeError, Property, PropertyValue, ValueType, WireValue};

    crate::domain! {
        pub enum Fan {
            Quiet = "quiet",
            Turbo = "TURBO",
        }
    }

    crate::property! {
        pub struct FanSpeed: Fan = "fan_speed" @ "9";
        pub struct Uptime: i64 = "uptime" @ "10", read_only, state_signal;
    }

    #[test]
    fn domains() {
        assert_eq!(Fan::ALL, &[Fan::Quiet, Fan::Turbo]);
        assert_eq!(Fan::Turbo.as_wire(), "TURBO");
        assert_eq!(Fan::from_wire("TURBO"), Some(Fan::Turbo));
        assert_eq!(Fan::from_wire("turbo"), None);
        assert_eq!(
            "turbo".parse::<Fan>(),
            Err(DecodeError::OutOfDomain { domain: "Fan", value: "turbo".into() })
        );

        assert_eq!(serde_json::to_value(Fan::Quiet).unwrap(), serde_json::json!("quiet"));
        assert_eq!(serde_json::from_value::<Fan>(serde_json::json!("TURBO")).unwrap(), Fan::Turbo);
        assert!(serde_json::from_value::<Fan>(serde_json::json!("Turbo")).is_err());
    }

    #[test]
    fn properties() {
        assert_eq!(FanSpeed::DESCRIPTOR.key, "9");
        assert_eq!(FanSpeed::DESCRIPTOR.name, "fan_speed");
        assert_eq!(FanSpeed::DESCRIPTOR.value_type, ValueType::Enumerated {
            name: "Fan",
            variants: &["quiet", "TURBO"],
        });
        assert!(!FanSpeed::DESCRIPTOR.read_only);

        assert_eq!(Uptime::DESCRIPTOR.value_type, ValueType::Integer);
        assert!(Uptime::DESCRIPTOR.read_only);
        assert!(Uptime::DESCRIPTOR.state_signal);

        assert_eq!(Fan::Turbo.encode(), WireValue::from("TURBO"));
        assert_eq!(Fan::decode(&WireValue::from("quiet")), Ok(Fan::Quiet));
        assert!(Fan::decode(&WireValue::Integer(1)).is_err());
    }
}

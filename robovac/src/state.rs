use robovac_common::{
    DecodeError, DeviceClass, Property, PropertyDescriptor, PropertyValue, StateMap, WireKey,
    WireValue,
};

use crate::session::PushBatch;

/// A state-signal property took a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub descriptor: &'static PropertyDescriptor,
    pub value: WireValue,
    /// `None` if the key had never been reported on this connection
    pub previous: Option<WireValue>,
}

impl StateChange {
    pub fn key(&self) -> &'static str {
        self.descriptor.key
    }

    pub fn is<P: Property>(&self) -> bool {
        self.descriptor.key == P::DESCRIPTOR.key
    }

    /// Decodes the new value, if this change is for `P`.
    pub fn decode<P: Property>(&self) -> Option<Result<P::Value, DecodeError>> {
        self.is::<P>().then(|| P::Value::decode(&self.value))
    }
}

#[derive(Debug, Default)]
pub(crate) struct DeviceState {
    values: StateMap,
}

impl DeviceState {
    pub fn get(&self, key: &str) -> Option<&WireValue> {
        self.values.get(key)
    }

    pub fn snapshot(&self) -> StateMap {
        self.values.clone()
    }

    /// Drops everything known so far in favor of `snapshot`.
    pub fn replace(&mut self, snapshot: StateMap) {
        self.values = snapshot;
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Applies a push and returns one change per state-signal key whose value
    /// differs from before the batch, in order of first appearance.
    pub fn merge(&mut self, class: &DeviceClass, batch: PushBatch) -> Vec<StateChange> {
        let mut touched = Vec::<(WireKey, Option<WireValue>)>::new();

        for (key, value) in batch {
            if !touched.iter().any(|(k, _)| *k == key) {
                touched.push((key.clone(), self.values.get(&key).cloned()));
            }

            self.values.insert(key, value);
        }

        touched
            .into_iter()
            .filter_map(|(key, previous)| {
                let descriptor = class.by_key(&key)?;
                let value = self.values.get(&key)?;

                if let Err(error) = descriptor.check(value) {
                    tracing::warn!(
                        property = descriptor.name,
                        %key,
                        %value,
                        %error,
                        "Device reported a value that does not decode",
                    );
                }

                if !descriptor.state_signal || previous.as_ref() == Some(value) {
                    return None;
                }

                Some(StateChange { descriptor, value: value.clone(), previous })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use robovac_common::{
        domains::WorkStatus,
        robovac::{BatteryLevel, ROBOVAC, Status, keys},
    };

    use super::*;

    fn push(entries: &[(&str, WireValue)]) -> PushBatch {
        entries
            .iter()
            .map(|(k, v)| (WireKey::from(*k), v.clone()))
            .collect()
    }

    #[test]
    fn later_updates_win() {
        let mut state = DeviceState::default();

        state.merge(&ROBOVAC, push(&[
            (keys::BATTERY_LEVEL, 50.into()),
            (keys::BATTERY_LEVEL, 49.into()),
        ]));

        assert_eq!(state.get(keys::BATTERY_LEVEL), Some(&WireValue::Integer(49)));
    }

    #[test]
    fn one_change_per_signal_key() {
        let mut state = DeviceState::default();
        state.replace(push(&[(keys::BATTERY_LEVEL, 50.into())]).into_iter().collect());

        let changes = state.merge(&ROBOVAC, push(&[
            (keys::WORK_STATUS, "Running".into()),
            (keys::BATTERY_LEVEL, 49.into()),
            (keys::POWER, true.into()),
            (keys::WORK_STATUS, "Charging".into()),
        ]));

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].decode::<Status>(), Some(Ok(WorkStatus::Charging)));
        assert_eq!(changes[0].previous, None);
        assert_eq!(changes[1].decode::<BatteryLevel>(), Some(Ok(49)));
        assert_eq!(changes[1].previous, Some(WireValue::Integer(50)));
        assert!(changes[1].decode::<Status>().is_none());
    }

    #[test]
    fn unchanged_values_are_quiet() {
        let mut state = DeviceState::default();
        state.replace(push(&[(keys::WORK_STATUS, "Running".into())]).into_iter().collect());

        let changes = state.merge(&ROBOVAC, push(&[
            (keys::WORK_STATUS, "Charging".into()),
            (keys::WORK_STATUS, "Running".into()),
        ]));

        assert!(changes.is_empty());
    }

    #[test]
    fn undecodable_values_are_still_applied() {
        let mut state = DeviceState::default();

        let changes = state.merge(&ROBOVAC, push(&[
            (keys::ERROR_CODE, "Brand_new_error".into()),
            (keys::BATTERY_LEVEL, 12.into()),
            ("999", "unknown key".into()),
        ]));

        assert_eq!(changes.iter().map(StateChange::key).collect::<Vec<_>>(), [
            keys::ERROR_CODE,
            keys::BATTERY_LEVEL,
        ]);
        assert!(changes[0].decode::<robovac_common::robovac::Fault>().unwrap().is_err());
        assert_eq!(state.get("999"), Some(&WireValue::from("unknown key")));
    }
}

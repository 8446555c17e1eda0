//! Data points of the Eufy Robovac family.
//!
//! Keys are fixed by the firmware and must match bit-for-bit.
//!
//! ```plain
//! 1   power            <-> bool
//! 2   play_pause       <-> bool
//! 3   direction        <-> "left" | "right" | "forward" | "backward"
//! 5   work_mode        <-> "auto" | "Nosweep" | ...
//! 15  work_status      ->  "Running" | "Charging" | ...
//! 101 go_home          <-> bool
//! 102 clean_speed      <-> "Standard" | "Boost_IQ" | ...
//! 103 find_robot       <-> bool
//! 104 battery_level    ->  0..=100
//! 106 error_code       ->  "no_error" | "Wheel_stuck" | ...
//! 121 get_map_data     <-  base64(json)
//! 124 call_method      <-  base64(json)
//! 131 manual_control   <-> string
//! ```

use compact_str::CompactString;

use crate::{
    DeviceClass, Property,
    domains::{CleanSpeed, Direction, ErrorCode, WorkMode, WorkStatus},
    property,
};

pub mod keys {
    pub const POWER: &str = "1";
    pub const PLAY_PAUSE: &str = "2";
    pub const DIRECTION: &str = "3";
    pub const WORK_MODE: &str = "5";
    pub const WORK_STATUS: &str = "15";
    pub const GO_HOME: &str = "101";
    pub const CLEAN_SPEED: &str = "102";
    pub const FIND_ROBOT: &str = "103";
    pub const BATTERY_LEVEL: &str = "104";
    pub const ERROR_CODE: &str = "106";
    pub const GET_MAP_DATA: &str = "121";
    pub const CALL_METHOD: &str = "124";
    pub const MANUAL_CONTROL: &str = "131";
}

property! {
    pub struct Power: bool = "power" @ keys::POWER;
    /// `true` cleans, `false` pauses
    pub struct PlayPause: bool = "play_pause" @ keys::PLAY_PAUSE;
    pub struct ManualDirection: Direction = "direction" @ keys::DIRECTION;
    pub struct Mode: WorkMode = "work_mode" @ keys::WORK_MODE;
    pub struct Status: WorkStatus = "work_status" @ keys::WORK_STATUS, read_only, state_signal;
    pub struct GoHome: bool = "go_home" @ keys::GO_HOME;
    pub struct Speed: CleanSpeed = "clean_speed" @ keys::CLEAN_SPEED;
    pub struct FindRobot: bool = "find_robot" @ keys::FIND_ROBOT;
    /// Percentage
    pub struct BatteryLevel: i64 = "battery_level" @ keys::BATTERY_LEVEL, read_only, state_signal;
    pub struct Fault: ErrorCode = "error_code" @ keys::ERROR_CODE, read_only, state_signal;
    pub struct GetMapData: CompactString = "get_map_data" @ keys::GET_MAP_DATA;
    pub struct CallMethod: CompactString = "call_method" @ keys::CALL_METHOD;
    pub struct ManualControl: CompactString = "manual_control" @ keys::MANUAL_CONTROL;
}

pub static ROBOVAC: DeviceClass = DeviceClass::new("robovac", &[
    Power::DESCRIPTOR,
    PlayPause::DESCRIPTOR,
    ManualDirection::DESCRIPTOR,
    Mode::DESCRIPTOR,
    Status::DESCRIPTOR,
    GoHome::DESCRIPTOR,
    Speed::DESCRIPTOR,
    FindRobot::DESCRIPTOR,
    BatteryLevel::DESCRIPTOR,
    Fault::DESCRIPTOR,
    GetMapData::DESCRIPTOR,
    CallMethod::DESCRIPTOR,
    ManualControl::DESCRIPTOR,
]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueType;

    #[test]
    fn robovac_class_is_valid() {
        assert_eq!(ROBOVAC.validate(), Ok(()));
        assert_eq!(ROBOVAC.descriptors().len(), 13);
    }

    #[test]
    fn wire_keys() {
        let keys = ROBOVAC
            .descriptors()
            .iter()
            .map(|d| (d.name, d.key))
            .collect::<Vec<_>>();

        assert_eq!(keys, [
            ("power", "1"),
            ("play_pause", "2"),
            ("direction", "3"),
            ("work_mode", "5"),
            ("work_status", "15"),
            ("go_home", "101"),
            ("clean_speed", "102"),
            ("find_robot", "103"),
            ("battery_level", "104"),
            ("error_code", "106"),
            ("get_map_data", "121"),
            ("call_method", "124"),
            ("manual_control", "131"),
        ]);
    }

    #[test]
    fn access_modes() {
        let read_only = ROBOVAC
            .descriptors()
            .iter()
            .filter(|d| d.read_only)
            .map(|d| d.name)
            .collect::<Vec<_>>();
        assert_eq!(read_only, ["work_status", "battery_level", "error_code"]);

        let signals = ROBOVAC.state_signals().map(|d| d.name).collect::<Vec<_>>();
        assert_eq!(signals, ["work_status", "battery_level", "error_code"]);
    }

    #[test]
    fn value_types() {
        assert_eq!(Power::DESCRIPTOR.value_type, ValueType::Boolean);
        assert_eq!(BatteryLevel::DESCRIPTOR.value_type, ValueType::Integer);
        assert_eq!(CallMethod::DESCRIPTOR.value_type, ValueType::Raw);
        assert_eq!(Mode::DESCRIPTOR.domain(), Some(WorkMode::WIRE));
        assert_eq!(
            ROBOVAC.by_name("error_code").and_then(|d| d.domain()),
            Some(ErrorCode::WIRE)
        );
    }
}

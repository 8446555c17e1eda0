//! Enumerated values reported and accepted by the Robovac.
//!
//! The firmware is inconsistent about casing, and the strings below are exactly
//! what goes over the wire.

use crate::domain;

domain! {
    pub enum WorkMode {
        Auto = "auto",
        NoSweep = "Nosweep",
        SmallRoom = "SmallRoom",
        Edge = "Edge",
        Spot = "Spot",
        Room = "room",
    }
}

domain! {
    pub enum Direction {
        Left = "left",
        Right = "right",
        Forward = "forward",
        Backward = "backward",
    }
}

domain! {
    pub enum WorkStatus {
        /// Cleaning
        Running = "Running",
        /// In the dock, charging
        Charging = "Charging",
        /// Not in the dock, paused
        StandBy = "standby",
        /// Not in the dock, after being paused for a while
        Sleeping = "Sleeping",
        /// Going home because the battery is depleted
        RechargeNeeded = "Recharge",
        /// In the dock, fully charged
        Completed = "completed",
    }
}

domain! {
    pub enum CleanSpeed {
        NoSuction = "No_suction",
        Standard = "Standard",
        BoostIq = "Boost_IQ",
        Max = "Max",
    }
}

domain! {
    pub enum ErrorCode {
        NoError = "no_error",
        WheelStuck = "Wheel_stuck",
        RBrushStuck = "R_brush_stuck",
        CrashBarStuck = "Crash_bar_stuck",
        SensorDirty = "sensor_dirty",
        NotEnoughPower = "N_enough_pow",
        Stuck5Min = "Stuck_5_min",
        FanStuck = "Fan_stuck",
        SBrushStuck = "S_brush_stuck",
    }
}

impl WorkStatus {
    pub fn is_docked(&self) -> bool {
        matches!(self, WorkStatus::Charging | WorkStatus::Completed)
    }
}

impl ErrorCode {
    pub fn is_error(&self) -> bool {
        *self != ErrorCode::NoError
    }
}

//! Typed control and state synchronization for Eufy Robovac devices.
//!
//! [`Robovac`] sits on top of a [`Session`] and turns semantic intents into
//! data point writes, while keeping a cache of what the device last reported.

use compact_str::CompactString;
use robovac_common::DecodeError;

pub mod controller;
pub mod log;
pub mod session;
mod state;

pub use robovac_common as common;

pub use self::{
    controller::Robovac,
    session::{PushBatch, Session, SessionError},
    state::StateChange,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no value reported for key {key}")]
    NoValue { key: CompactString },
    #[error("failed to decode key {key}: {source}")]
    Decode {
        key: &'static str,
        #[source]
        source: DecodeError,
    },
    #[error("{name} (key {key}) is read-only")]
    WriteRejected {
        name: &'static str,
        key: &'static str,
    },
    #[error("connection error: {0}")]
    Connection(#[source] SessionError),
    #[error("session error: {0}")]
    Session(#[source] SessionError),
    #[error("not connected")]
    NotConnected,
    #[error("cancelled by disconnect")]
    Cancelled,
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

//! Wire-level vocabulary shared by everything that talks to a Robovac: property
//! descriptors, enumerated domains and the composite command payloads.

pub mod command;
pub mod domains;
pub mod macros;
pub mod robovac;

#[doc(hidden)]
pub use compact_str as _compact_str;
#[doc(hidden)]
pub use serde as _serde;

mod property;
mod registry;
mod string;
mod value;
pub use property::*;
pub use registry::*;
pub use string::*;
pub use value::*;

//! Data models for the corrida tracking application.
//!
//! Wire names match the original browser client payloads (camelCase,
//! `corridaNumber`, `preciseLocation`, ...).

mod location;
mod ride;
mod subscription;

pub use location::*;
pub use ride::*;
pub use subscription::*;

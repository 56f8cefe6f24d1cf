//! Control unit implementations shipped with the crate

pub mod replay;

pub use replay::{ReplayControlUnit, ReplayScript};

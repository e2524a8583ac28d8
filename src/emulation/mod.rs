//! Host-backed implementation of the platform primitives, for running the
//! engine away from Windows.

pub mod parser;
mod platform;

pub use platform::MappedPlatform;

//! Configuration loaded from the data directory.

pub mod settings;

pub use settings::{CodecSettings, Settings};

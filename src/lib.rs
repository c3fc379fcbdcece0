pub mod cli;
pub mod codec;
pub mod config;
pub mod errors;
pub mod store;
pub mod vault;

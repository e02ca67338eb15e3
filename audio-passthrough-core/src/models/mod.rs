pub mod attributes;
pub mod config;
pub mod error;
pub mod gain;
pub mod port;
pub mod state;
pub mod stream_types;

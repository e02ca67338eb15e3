pub mod path_selector;
pub mod stream_callback;
pub mod transport;

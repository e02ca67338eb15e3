pub mod capture;
pub mod factory;
pub(crate) mod handles;
pub mod instance;
pub mod render;
pub(crate) mod resources;
pub mod stream;

pub mod capability;
pub mod loaded;
pub mod registry;

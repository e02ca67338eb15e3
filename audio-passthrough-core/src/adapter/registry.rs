use std::collections::HashSet;

use crate::adapter::capability::assemble;
use crate::adapter::loaded::Adapter;
use crate::models::config::AdapterDescriptor;
use crate::models::error::PassthroughError;
use crate::models::port::PORT_ID_MAX;

/// Loaded adapters, keyed by name.
///
/// One registry is owned by the embedding process and passed to every
/// operation that needs an adapter.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Adapter>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an adapter and build the capability of each of its ports.
    pub fn load_adapter(&mut self, desc: &AdapterDescriptor) -> Result<&mut Adapter, PassthroughError> {
        if desc.name.is_empty() {
            return Err(PassthroughError::InvalidParam("adapter name is empty".into()));
        }
        if desc.ports.is_empty() {
            return Err(PassthroughError::InvalidParam(format!(
                "adapter {} has no ports",
                desc.name
            )));
        }
        if self.adapter(&desc.name).is_some() {
            return Err(PassthroughError::Busy(format!(
                "adapter {} already loaded",
                desc.name
            )));
        }
        let mut seen = HashSet::new();
        for port in &desc.ports {
            if port.id > PORT_ID_MAX {
                return Err(PassthroughError::InvalidParam(format!(
                    "port id {} exceeds {}",
                    port.id, PORT_ID_MAX
                )));
            }
            if !seen.insert(port.id) {
                return Err(PassthroughError::InvalidParam(format!(
                    "duplicate port id {}",
                    port.id
                )));
            }
        }

        let adapter = Adapter::new(desc.name.clone(), assemble(&desc.ports));
        log::info!("adapter {} loaded with {} ports", desc.name, desc.ports.len());
        self.adapters.push(adapter);
        let index = self.adapters.len() - 1;
        Ok(&mut self.adapters[index])
    }

    /// Unload an adapter. Its streams must have been destroyed first.
    pub fn unload_adapter(&mut self, name: &str) -> Result<(), PassthroughError> {
        let index = self
            .adapters
            .iter()
            .position(|a| a.name() == name)
            .ok_or_else(|| PassthroughError::NotFound(format!("adapter {}", name)))?;
        if self.adapters[index].has_live_streams() {
            return Err(PassthroughError::Busy(format!(
                "adapter {} still has live streams",
                name
            )));
        }
        self.adapters.remove(index);
        log::info!("adapter {} unloaded", name);
        Ok(())
    }

    pub fn adapter(&self, name: &str) -> Option<&Adapter> {
        self.adapters.iter().find(|a| a.name() == name)
    }

    pub fn adapter_mut(&mut self, name: &str) -> Option<&mut Adapter> {
        self.adapters.iter_mut().find(|a| a.name() == name)
    }

    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.iter().map(Adapter::name).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

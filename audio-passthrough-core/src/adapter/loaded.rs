use std::collections::HashMap;

use crate::models::error::PassthroughError;
use crate::models::port::{Capability, PassthroughMode, Port, ANALOG_OUTPUT_PORT_NAME};
use crate::models::stream_types::StreamKind;
use crate::session::capture::CaptureStream;
use crate::session::instance::StreamInstance;
use crate::session::render::RenderStream;
use crate::session::stream::StreamControl;

/// A loaded adapter: its ports, their capabilities and passthrough modes,
/// and at most one render and one capture stream.
pub struct Adapter {
    name: String,
    ports: Vec<Port>,
    capabilities: HashMap<u32, Capability>,
    modes: HashMap<u32, PassthroughMode>,
    // Written only by the stream factory.
    pub(crate) render: Option<RenderStream>,
    pub(crate) capture: Option<CaptureStream>,
}

impl Adapter {
    pub(crate) fn new(name: String, table: Vec<(Port, Capability)>) -> Self {
        let mut ports = Vec::with_capacity(table.len());
        let mut capabilities = HashMap::with_capacity(table.len());
        let mut modes = HashMap::with_capacity(table.len());
        for (port, capability) in table {
            capabilities.insert(port.id, capability);
            modes.insert(port.id, PassthroughMode::default());
            ports.push(port);
        }
        Self {
            name,
            ports,
            capabilities,
            modes,
            render: None,
            capture: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn port(&self, id: u32) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == id)
    }

    pub fn get_port_capability(&self, port: &Port) -> Result<&Capability, PassthroughError> {
        self.capabilities
            .get(&port.id)
            .ok_or_else(|| PassthroughError::NotFound(format!("port {} on {}", port.id, self.name)))
    }

    /// Select the passthrough mode of the analog output port.
    ///
    /// The mode must match the routing mask of one of the port's sub-ports.
    pub fn set_passthrough_mode(
        &mut self,
        port: &Port,
        mode: PassthroughMode,
    ) -> Result<(), PassthroughError> {
        let own = self
            .port(port.id)
            .ok_or_else(|| PassthroughError::NotFound(format!("port {} on {}", port.id, self.name)))?;
        if own.name != ANALOG_OUTPUT_PORT_NAME || !own.direction.can_render() {
            return Err(PassthroughError::NotSupported(format!(
                "port {} does not select passthrough modes",
                own.name
            )));
        }
        let capability = self.get_port_capability(port)?;
        if !capability.sub_ports.iter().any(|s| s.mask == mode.mask()) {
            log::error!("port {} has no sub-port for {:?}", port.id, mode);
            return Err(PassthroughError::Internal(format!(
                "no sub-port carries {:?}",
                mode
            )));
        }
        self.modes.insert(port.id, mode);
        log::info!("adapter {} port {} passthrough {:?}", self.name, port.id, mode);
        Ok(())
    }

    pub fn get_passthrough_mode(&self, port: &Port) -> Result<PassthroughMode, PassthroughError> {
        self.modes
            .get(&port.id)
            .copied()
            .ok_or_else(|| PassthroughError::NotFound(format!("port {} on {}", port.id, self.name)))
    }

    pub fn has_render(&self) -> bool {
        self.render.is_some()
    }

    pub fn has_capture(&self) -> bool {
        self.capture.is_some()
    }

    pub fn has_live_streams(&self) -> bool {
        self.has_render() || self.has_capture()
    }

    pub fn render(&self) -> Option<&RenderStream> {
        self.render.as_ref()
    }

    pub fn render_mut(&mut self) -> Option<&mut RenderStream> {
        self.render.as_mut()
    }

    pub fn capture(&self) -> Option<&CaptureStream> {
        self.capture.as_ref()
    }

    pub fn capture_mut(&mut self) -> Option<&mut CaptureStream> {
        self.capture.as_mut()
    }

    /// Either stream through the operations both kinds share.
    pub fn stream_mut(&mut self, kind: StreamKind) -> Option<&mut dyn StreamControl> {
        match kind {
            StreamKind::Render => self.render.as_mut().map(|s| s as &mut dyn StreamControl),
            StreamKind::Capture => self.capture.as_mut().map(|s| s as &mut dyn StreamControl),
        }
    }

    pub(crate) fn take_stream(&mut self, kind: StreamKind) -> Option<StreamInstance> {
        match kind {
            StreamKind::Render => self.render.take().map(StreamInstance::Render),
            StreamKind::Capture => self.capture.take().map(StreamInstance::Capture),
        }
    }
}

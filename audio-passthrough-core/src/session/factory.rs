use std::sync::Arc;

use crate::adapter::loaded::Adapter;
use crate::models::attributes::SampleAttributes;
use crate::models::config::PassthroughConfig;
use crate::models::error::PassthroughError;
use crate::models::port::{DeviceDescriptor, SceneDescriptor};
use crate::models::stream_types::{PathKind, StreamKind};
use crate::processing::validator::{validate_attributes, validate_port_pin};
use crate::processing::wire::SceneSelectRequest;
use crate::session::capture::CaptureStream;
use crate::session::handles::BoundHandles;
use crate::session::render::RenderStream;
use crate::session::stream::StreamCore;
use crate::traits::path_selector::PathSelector;
use crate::traits::transport::{DriverCommand, DriverTransport};

/// Creates and destroys the render and capture stream of an adapter.
///
/// Built without a path selector, no initial path is programmed and scene
/// operations on the created streams report `NotSupported`.
pub struct StreamFactory {
    transport: Arc<dyn DriverTransport>,
    path_selector: Option<Arc<dyn PathSelector>>,
    config: PassthroughConfig,
}

impl StreamFactory {
    pub fn new(
        transport: Arc<dyn DriverTransport>,
        config: PassthroughConfig,
    ) -> Result<Self, PassthroughError> {
        config.validate().map_err(PassthroughError::InvalidParam)?;
        Ok(Self {
            transport,
            path_selector: None,
            config,
        })
    }

    pub fn with_path_selector(mut self, selector: Arc<dyn PathSelector>) -> Self {
        self.path_selector = Some(selector);
        self
    }

    pub fn config(&self) -> &PassthroughConfig {
        &self.config
    }

    pub fn create_render<'a>(
        &self,
        adapter: &'a mut Adapter,
        desc: &DeviceDescriptor,
        attrs: &SampleAttributes,
    ) -> Result<&'a mut RenderStream, PassthroughError> {
        let core = self.build(adapter, StreamKind::Render, desc, attrs)?;
        log::info!("render stream {} created on {}", core.id, adapter.name());
        Ok(adapter.render.insert(RenderStream::new(core)))
    }

    pub fn create_capture<'a>(
        &self,
        adapter: &'a mut Adapter,
        desc: &DeviceDescriptor,
        attrs: &SampleAttributes,
    ) -> Result<&'a mut CaptureStream, PassthroughError> {
        let core = self.build(adapter, StreamKind::Capture, desc, attrs)?;
        log::info!("capture stream {} created on {}", core.id, adapter.name());
        Ok(adapter.capture.insert(CaptureStream::new(core)))
    }

    pub fn destroy_render(&self, adapter: &mut Adapter) -> Result<(), PassthroughError> {
        self.destroy(adapter, StreamKind::Render)
    }

    pub fn destroy_capture(&self, adapter: &mut Adapter) -> Result<(), PassthroughError> {
        self.destroy(adapter, StreamKind::Capture)
    }

    fn destroy(&self, adapter: &mut Adapter, kind: StreamKind) -> Result<(), PassthroughError> {
        let instance = adapter.take_stream(kind).ok_or_else(|| {
            PassthroughError::NotFound(format!("no {:?} stream on {}", kind, adapter.name()))
        })?;
        instance.close();
        Ok(())
    }

    /// Validate the request, bind the driver handles and program the
    /// initial path. Anything bound so far is released on failure.
    fn build(
        &self,
        adapter: &Adapter,
        kind: StreamKind,
        desc: &DeviceDescriptor,
        attrs: &SampleAttributes,
    ) -> Result<StreamCore, PassthroughError> {
        let present = match kind {
            StreamKind::Render => adapter.has_render(),
            StreamKind::Capture => adapter.has_capture(),
        };
        if present {
            return Err(PassthroughError::Busy(format!(
                "{:?} stream already exists on {}",
                kind,
                adapter.name()
            )));
        }
        validate_port_pin(desc, kind)?;
        validate_attributes(attrs)?;

        let port = adapter.port(desc.port_id).ok_or_else(|| {
            PassthroughError::NotFound(format!("port {} on {}", desc.port_id, adapter.name()))
        })?;
        let carries = match kind {
            StreamKind::Render => port.direction.can_render(),
            StreamKind::Capture => port.direction.can_capture(),
        };
        if !carries {
            return Err(PassthroughError::NotSupported(format!(
                "port {} cannot carry a {:?} stream",
                port.name, kind
            )));
        }

        let handles = BoundHandles::bind(Arc::clone(&self.transport), kind)?;
        if let Some(selector) = &self.path_selector {
            let scene = SceneDescriptor {
                category: attrs.category,
                pins: desc.pins,
            };
            let path = selector.resolve(kind, &scene)?;
            handles.call(
                PathKind::Control,
                DriverCommand::SceneSelect,
                &SceneSelectRequest {
                    category: scene.category,
                    pins: scene.pins,
                    path,
                },
            )?;
        }

        Ok(StreamCore::new(
            kind,
            desc.clone(),
            attrs.clone(),
            handles,
            self.path_selector.clone(),
            self.config.clone(),
        ))
    }
}

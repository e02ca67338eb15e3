//! # audio-passthrough-core
//!
//! Device-agnostic audio passthrough layer.
//!
//! Turns the adapter/stream API (load an adapter, enumerate its ports,
//! create a render or capture stream, configure, start, transfer frames,
//! query telemetry) into commands sent to an out-of-process driver through
//! the `DriverTransport` trait. Path selection is pluggable through
//! `PathSelector`.
//!
//! ## Architecture
//!
//! ```text
//! audio-passthrough-core (this crate)
//! ├── traits/       ← DriverTransport, PathSelector, StreamCallback
//! ├── models/       ← PassthroughError, StreamState, SampleAttributes, ports, config
//! ├── processing/   ← validator, volume codec, diagnostics ring, wire payloads, extra params
//! ├── adapter/      ← AdapterRegistry, Adapter, capability assembly
//! ├── session/      ← StreamFactory, RenderStream, CaptureStream, StreamControl
//! └── storage/      ← adapter layout loading
//! ```
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use audio_passthrough_core::*;
//!
//! let mut registry = AdapterRegistry::new();
//! let factory = StreamFactory::new(Arc::new(my_transport), PassthroughConfig::default())?;
//! let adapter = registry.load_adapter(&descriptor)?;
//! let render = factory.create_render(adapter, &DeviceDescriptor::new(0, PortPin::Speaker), &attrs)?;
//! render.start()?;
//! render.render_frame(&pcm)?;
//! ```

pub mod adapter;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types at crate root for convenience.
pub use adapter::loaded::Adapter;
pub use adapter::registry::AdapterRegistry;
pub use models::attributes::{AudioCategory, AudioFormat, ChannelMode, SampleAttributes};
pub use models::config::{AdapterDescriptor, PassthroughConfig, PortDescriptor, RetryPolicy};
pub use models::error::{PassthroughError, PathError, TransportError};
pub use models::gain::GainControl;
pub use models::port::{
    Capability, DeviceDescriptor, PassthroughMode, Port, PortDirection, PortPin, SceneDescriptor,
    SubPort,
};
pub use models::state::{StandbyHint, StreamState};
pub use models::stream_types::{
    AudioTimeStamp, CallbackEvent, MmapDescriptor, PathKind, StreamKind,
};
pub use processing::diagnostics::{DiagnosticsEntry, DiagnosticsRing};
pub use session::capture::CaptureStream;
pub use session::factory::StreamFactory;
pub use session::instance::StreamInstance;
pub use session::render::RenderStream;
pub use session::stream::{StreamControl, StreamCore};
pub use storage::layout::load_adapter_layout;
pub use traits::path_selector::{PathSelector, PathSwitch, ScenePath};
pub use traits::stream_callback::StreamCallback;
pub use traits::transport::{DriverCommand, DriverHandle, DriverTransport};

use crate::models::error::TransportError;
use crate::models::stream_types::{PathKind, StreamKind};

/// Opaque handle returned by [`DriverTransport::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverHandle(pub u64);

/// Command identifiers understood by the driver.
///
/// Request and reply payloads for each command are defined in
/// [`crate::processing::wire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverCommand {
    HwParams,
    Start,
    Stop,
    PauseWrite,
    WriteFrame,
    ReadFrame,
    MmapBuffer,
    MmapPosition,
    VolumeRead,
    VolumeWrite,
    GainRead,
    GainWrite,
    GainThresholdRead,
    MuteRead,
    MuteWrite,
    SceneSelect,
    ChannelModeRead,
    ChannelModeWrite,
}

/// Synchronous request/reply boundary to the out-of-process driver.
///
/// Implementations must serialize requests per handle; the core never calls
/// a transport from more than one thread per stream, but several streams may
/// share one transport.
pub trait DriverTransport: Send + Sync {
    /// Open a logical handle for one path of a stream.
    fn bind(&self, kind: StreamKind, path: PathKind) -> Result<DriverHandle, TransportError>;

    /// Release a handle obtained from `bind`.
    fn unbind(&self, handle: DriverHandle) -> Result<(), TransportError>;

    /// Send `command` with an encoded request and return the encoded reply.
    fn dispatch(
        &self,
        handle: DriverHandle,
        command: DriverCommand,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError>;
}

use serde::{Deserialize, Serialize};

/// Direction of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Render,
    Capture,
}

/// Logical driver path a handle is bound to.
///
/// Frame transfer, start/stop and mmap go over the data path; mixer-style
/// controls (volume, gain, mute, scene) go over the control path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Data,
    Control,
}

/// Presentation time of a frame position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioTimeStamp {
    pub tv_sec: i64,
    pub tv_nsec: i64,
}

/// Description of a mapped buffer shared with the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MmapDescriptor {
    /// Mapped length in bytes.
    pub len: usize,
    pub total_buffer_frames: u64,
    pub transfer_frame_size: u32,
    pub is_shareable: bool,
    pub offset: u64,
}

/// Event delivered to a registered stream callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackEvent {
    NonBlockWriteCompleted,
    DrainCompleted,
    FlushCompleted,
    RenderFull,
    ErrorOccurred,
}

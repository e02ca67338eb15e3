//! Request and reply payloads carried by [`DriverTransport::dispatch`].
//!
//! Payloads are JSON encoded; the transport treats them as opaque bytes.
//! Commands without a request body send an empty payload.
//!
//! [`DriverTransport::dispatch`]: crate::traits::transport::DriverTransport::dispatch

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::attributes::{AudioCategory, ChannelMode, SampleAttributes};
use crate::models::error::PassthroughError;
use crate::models::port::PortPin;
use crate::models::state::StandbyHint;
use crate::traits::path_selector::ScenePath;

/// Device ring buffer status reported with a transfer reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferStatus {
    Ready,
    Full,
    Empty,
}

/// `HwParams` and `Start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HwParamsRequest {
    pub attrs: SampleAttributes,
    pub frame_bytes: u64,
    pub route: i32,
}

/// `Stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRequest {
    pub standby: StandbyHint,
}

/// `PauseWrite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseRequest {
    pub pause: bool,
}

/// `WriteFrame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteFrameRequest {
    pub frames: u64,
    pub data: Vec<u8>,
}

/// Reply to `WriteFrame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteFrameReply {
    pub status: BufferStatus,
}

/// `ReadFrame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadFrameRequest {
    pub capacity: u64,
}

/// Reply to `ReadFrame`; `data` is empty unless `status` is `Ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadFrameReply {
    pub status: BufferStatus,
    pub data: Vec<u8>,
}

/// `MmapBuffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MmapBufferRequest {
    pub len: u64,
    pub total_buffer_frames: u64,
    pub transfer_frame_size: u32,
    pub is_shareable: bool,
    pub offset: u64,
}

/// Reply to `MmapPosition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MmapPositionReply {
    pub frames: u64,
}

/// `VolumeWrite` request and `VolumeRead` reply, in device units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumePayload {
    pub volume: f32,
}

/// `GainWrite` request and `GainRead` reply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainPayload {
    pub gain: f32,
}

/// Reply to `GainThresholdRead`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainThresholdReply {
    pub gain_min: f32,
    pub gain_max: f32,
}

/// `MuteWrite` request and `MuteRead` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutePayload {
    pub mute: bool,
}

/// `ChannelModeWrite` request and `ChannelModeRead` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelModePayload {
    pub mode: ChannelMode,
}

/// `SceneSelect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSelectRequest {
    pub category: AudioCategory,
    pub pins: PortPin,
    pub path: ScenePath,
}

pub fn encode<T: Serialize>(payload: &T) -> Result<Vec<u8>, PassthroughError> {
    serde_json::to_vec(payload)
        .map_err(|e| PassthroughError::Internal(format!("failed to encode request: {}", e)))
}

pub fn decode<T: DeserializeOwned>(reply: &[u8]) -> Result<T, PassthroughError> {
    serde_json::from_slice(reply)
        .map_err(|e| PassthroughError::Internal(format!("malformed driver reply: {}", e)))
}

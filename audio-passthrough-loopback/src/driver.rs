//! In-process driver that loops rendered frames back to capture.
//!
//! ```text
//! render stream ── WriteFrame ──► [ bounded FIFO ] ── ReadFrame ──► capture stream
//!                     full ◄──────┘              └──────► empty
//! ```

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use audio_passthrough_core::models::attributes::ChannelMode;
use audio_passthrough_core::models::error::TransportError;
use audio_passthrough_core::models::state::StandbyHint;
use audio_passthrough_core::models::stream_types::{PathKind, StreamKind};
use audio_passthrough_core::processing::wire::{
    BufferStatus, ChannelModePayload, GainPayload, GainThresholdReply, HwParamsRequest,
    MmapBufferRequest, MmapPositionReply, MutePayload, PauseRequest, ReadFrameReply,
    ReadFrameRequest, SceneSelectRequest, StopRequest, VolumePayload, WriteFrameReply,
    WriteFrameRequest,
};
use audio_passthrough_core::traits::path_selector::ScenePath;
use audio_passthrough_core::traits::transport::{DriverCommand, DriverHandle, DriverTransport};

/// Default FIFO capacity in bytes.
pub const DEFAULT_FIFO_BYTES: usize = 64 * 1024;

/// Reply code for injected failures.
pub const INJECTED_FAILURE_CODE: i32 = -5;

/// Reply code for malformed requests or commands sent on the wrong path.
pub const INVALID_REQUEST_CODE: i32 = -22;

const GAIN_MAX: f32 = 15.0;

/// Per-stream-kind device state.
#[derive(Debug, Clone, Default)]
struct Endpoint {
    running: bool,
    paused: bool,
    frame_bytes: u64,
    position: u64,
    mmap_frames: u64,
    volume: f32,
    gain: f32,
    mute: bool,
    channel_mode: ChannelMode,
    path: Option<ScenePath>,
}

#[derive(Default)]
struct DriverState {
    next_handle: u64,
    handles: HashMap<DriverHandle, (StreamKind, PathKind)>,
    fifo: VecDeque<u8>,
    endpoints: HashMap<StreamKind, Endpoint>,
    failures: HashMap<DriverCommand, u32>,
}

/// Loopback implementation of [`DriverTransport`].
///
/// All streams bound to one driver share a single FIFO, so frames rendered
/// by any render stream are read back by any capture stream.
pub struct LoopbackDriver {
    fifo_capacity: usize,
    state: Mutex<DriverState>,
}

impl Default for LoopbackDriver {
    fn default() -> Self {
        Self::new(DEFAULT_FIFO_BYTES)
    }
}

impl LoopbackDriver {
    pub fn new(fifo_capacity: usize) -> Self {
        Self {
            fifo_capacity,
            state: Mutex::new(DriverState::default()),
        }
    }

    /// Make the next dispatch of `command` fail.
    pub fn fail_next(&self, command: DriverCommand) {
        *self.state.lock().failures.entry(command).or_default() += 1;
    }

    pub fn queued_bytes(&self) -> usize {
        self.state.lock().fifo.len()
    }

    pub fn bound_handles(&self) -> usize {
        self.state.lock().handles.len()
    }

    pub fn is_running(&self, kind: StreamKind) -> bool {
        self.state
            .lock()
            .endpoints
            .get(&kind)
            .is_some_and(|e| e.running)
    }

    /// Path last programmed with a scene select for `kind`.
    pub fn selected_path(&self, kind: StreamKind) -> Option<ScenePath> {
        self.state
            .lock()
            .endpoints
            .get(&kind)
            .and_then(|e| e.path.clone())
    }

    fn handle_data(
        &self,
        state: &mut DriverState,
        kind: StreamKind,
        command: DriverCommand,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        match command {
            DriverCommand::HwParams => {
                let params: HwParamsRequest = decode(request)?;
                endpoint(state, kind).frame_bytes = params.frame_bytes;
                Ok(Vec::new())
            }
            DriverCommand::Start => {
                let params: HwParamsRequest = decode(request)?;
                let ep = endpoint(state, kind);
                ep.frame_bytes = params.frame_bytes;
                ep.running = true;
                ep.paused = false;
                Ok(Vec::new())
            }
            DriverCommand::Stop => {
                let stop: StopRequest = decode(request)?;
                let ep = endpoint(state, kind);
                ep.running = false;
                ep.paused = false;
                if stop.standby == StandbyHint::Now && kind == StreamKind::Render {
                    state.fifo.clear();
                }
                Ok(Vec::new())
            }
            DriverCommand::PauseWrite => {
                let pause: PauseRequest = decode(request)?;
                endpoint(state, kind).paused = pause.pause;
                Ok(Vec::new())
            }
            DriverCommand::WriteFrame if kind == StreamKind::Render => {
                let write: WriteFrameRequest = decode(request)?;
                if state.fifo.len() + write.data.len() > self.fifo_capacity {
                    return encode(&WriteFrameReply {
                        status: BufferStatus::Full,
                    });
                }
                state.fifo.extend(write.data.iter().copied());
                endpoint(state, kind).position += write.frames;
                encode(&WriteFrameReply {
                    status: BufferStatus::Ready,
                })
            }
            DriverCommand::ReadFrame if kind == StreamKind::Capture => {
                let read: ReadFrameRequest = decode(request)?;
                let frame_bytes = endpoint(state, kind).frame_bytes.max(1);
                let available = (state.fifo.len() as u64).min(read.capacity);
                let take = available - available % frame_bytes;
                if take == 0 {
                    return encode(&ReadFrameReply {
                        status: BufferStatus::Empty,
                        data: Vec::new(),
                    });
                }
                let data: Vec<u8> = state.fifo.drain(..take as usize).collect();
                endpoint(state, kind).position += take / frame_bytes;
                encode(&ReadFrameReply {
                    status: BufferStatus::Ready,
                    data,
                })
            }
            DriverCommand::MmapBuffer => {
                let mmap: MmapBufferRequest = decode(request)?;
                endpoint(state, kind).mmap_frames = mmap.total_buffer_frames;
                Ok(Vec::new())
            }
            DriverCommand::MmapPosition => encode(&MmapPositionReply {
                frames: endpoint(state, kind).position,
            }),
            _ => Err(TransportError::Rejected {
                code: INVALID_REQUEST_CODE,
            }),
        }
    }

    fn handle_control(
        &self,
        state: &mut DriverState,
        kind: StreamKind,
        command: DriverCommand,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let ep = endpoint(state, kind);
        match command {
            DriverCommand::VolumeWrite => {
                ep.volume = decode::<VolumePayload>(request)?.volume;
                Ok(Vec::new())
            }
            DriverCommand::VolumeRead => encode(&VolumePayload { volume: ep.volume }),
            DriverCommand::GainWrite => {
                ep.gain = decode::<GainPayload>(request)?.gain;
                Ok(Vec::new())
            }
            DriverCommand::GainRead => encode(&GainPayload { gain: ep.gain }),
            DriverCommand::GainThresholdRead => encode(&GainThresholdReply {
                gain_min: 0.0,
                gain_max: GAIN_MAX,
            }),
            DriverCommand::MuteWrite => {
                ep.mute = decode::<MutePayload>(request)?.mute;
                Ok(Vec::new())
            }
            DriverCommand::MuteRead => encode(&MutePayload { mute: ep.mute }),
            DriverCommand::ChannelModeWrite if kind == StreamKind::Render => {
                ep.channel_mode = decode::<ChannelModePayload>(request)?.mode;
                Ok(Vec::new())
            }
            DriverCommand::ChannelModeRead if kind == StreamKind::Render => {
                encode(&ChannelModePayload {
                    mode: ep.channel_mode,
                })
            }
            DriverCommand::SceneSelect => {
                ep.path = Some(decode::<SceneSelectRequest>(request)?.path);
                Ok(Vec::new())
            }
            _ => Err(TransportError::Rejected {
                code: INVALID_REQUEST_CODE,
            }),
        }
    }
}

fn endpoint(state: &mut DriverState, kind: StreamKind) -> &mut Endpoint {
    state.endpoints.entry(kind).or_default()
}

fn decode<T: DeserializeOwned>(request: &[u8]) -> Result<T, TransportError> {
    serde_json::from_slice(request).map_err(|e| {
        log::warn!("malformed loopback request: {}", e);
        TransportError::Rejected {
            code: INVALID_REQUEST_CODE,
        }
    })
}

fn encode<T: Serialize>(reply: &T) -> Result<Vec<u8>, TransportError> {
    serde_json::to_vec(reply).map_err(|e| TransportError::Unavailable(e.to_string()))
}

impl DriverTransport for LoopbackDriver {
    fn bind(&self, kind: StreamKind, path: PathKind) -> Result<DriverHandle, TransportError> {
        let mut state = self.state.lock();
        state.next_handle += 1;
        let handle = DriverHandle(state.next_handle);
        state.handles.insert(handle, (kind, path));
        log::debug!("loopback bound {:?} {:?} as {:?}", kind, path, handle);
        Ok(handle)
    }

    fn unbind(&self, handle: DriverHandle) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        match state.handles.remove(&handle) {
            Some((kind, path)) => {
                log::debug!("loopback unbound {:?} {:?} {:?}", kind, path, handle);
                Ok(())
            }
            None => Err(TransportError::UnknownHandle(handle.0)),
        }
    }

    fn dispatch(
        &self,
        handle: DriverHandle,
        command: DriverCommand,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock();
        let (kind, path) = *state
            .handles
            .get(&handle)
            .ok_or(TransportError::UnknownHandle(handle.0))?;

        if let Some(pending) = state.failures.get_mut(&command) {
            if *pending > 0 {
                *pending -= 1;
                log::warn!("loopback injected failure for {:?}", command);
                return Err(TransportError::Rejected {
                    code: INJECTED_FAILURE_CODE,
                });
            }
        }

        match path {
            PathKind::Data => self.handle_data(&mut state, kind, command, request),
            PathKind::Control => self.handle_control(&mut state, kind, command, request),
        }
    }
}

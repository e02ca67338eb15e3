//! Scripted driver transport and stream builders for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::models::attributes::SampleAttributes;
use crate::models::config::{PassthroughConfig, RetryPolicy};
use crate::models::error::{PathError, TransportError};
use crate::models::port::{DeviceDescriptor, PortPin, SceneDescriptor};
use crate::models::stream_types::{PathKind, StreamKind};
use crate::processing::wire::{
    self, BufferStatus, GainThresholdReply, ReadFrameReply, ReadFrameRequest, WriteFrameReply,
};
use crate::session::capture::CaptureStream;
use crate::session::handles::BoundHandles;
use crate::session::render::RenderStream;
use crate::session::stream::StreamCore;
use crate::traits::path_selector::{PathSelector, PathSwitch, ScenePath};
use crate::traits::transport::{DriverCommand, DriverHandle, DriverTransport};

#[derive(Default)]
struct Script {
    next_handle: u64,
    bound: Vec<(DriverHandle, StreamKind, PathKind)>,
    sent: Vec<(DriverCommand, Vec<u8>)>,
    failures: HashMap<DriverCommand, u32>,
    replies: HashMap<DriverCommand, VecDeque<Vec<u8>>>,
    stored: HashMap<DriverCommand, Vec<u8>>,
    fail_binds: u32,
}

/// Records every dispatch and answers from queued replies, or with a
/// plausible default when nothing is queued.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the next `times` dispatches of `command`.
    pub(crate) fn fail(&self, command: DriverCommand, times: u32) {
        *self.script.lock().failures.entry(command).or_default() += times;
    }

    pub(crate) fn fail_next_bind(&self) {
        self.script.lock().fail_binds += 1;
    }

    /// Queue a one-shot reply for `command`.
    pub(crate) fn reply<T: Serialize>(&self, command: DriverCommand, payload: &T) {
        let bytes = serde_json::to_vec(payload).unwrap();
        self.script
            .lock()
            .replies
            .entry(command)
            .or_default()
            .push_back(bytes);
    }

    pub(crate) fn count(&self, command: DriverCommand) -> usize {
        self.script
            .lock()
            .sent
            .iter()
            .filter(|(c, _)| *c == command)
            .count()
    }

    pub(crate) fn last_request(&self, command: DriverCommand) -> Option<Vec<u8>> {
        self.script
            .lock()
            .sent
            .iter()
            .rev()
            .find(|(c, _)| *c == command)
            .map(|(_, bytes)| bytes.clone())
    }

    pub(crate) fn bound_handles(&self) -> usize {
        self.script.lock().bound.len()
    }

    fn default_reply(script: &Script, command: DriverCommand, request: &[u8]) -> Vec<u8> {
        let stored = |write: DriverCommand| script.stored.get(&write).cloned();
        let encoded = match command {
            DriverCommand::WriteFrame => serde_json::to_vec(&WriteFrameReply {
                status: BufferStatus::Ready,
            }),
            DriverCommand::ReadFrame => {
                let capacity = wire::decode::<ReadFrameRequest>(request)
                    .map(|r| r.capacity)
                    .unwrap_or(0);
                serde_json::to_vec(&ReadFrameReply {
                    status: BufferStatus::Ready,
                    data: vec![0x5a; capacity as usize],
                })
            }
            DriverCommand::GainThresholdRead => serde_json::to_vec(&GainThresholdReply {
                gain_min: 0.0,
                gain_max: 15.0,
            }),
            DriverCommand::VolumeRead => {
                return stored(DriverCommand::VolumeWrite).unwrap_or_else(|| br#"{"volume":0.0}"#.to_vec())
            }
            DriverCommand::GainRead => {
                return stored(DriverCommand::GainWrite).unwrap_or_else(|| br#"{"gain":0.0}"#.to_vec())
            }
            DriverCommand::MuteRead => {
                return stored(DriverCommand::MuteWrite).unwrap_or_else(|| br#"{"mute":false}"#.to_vec())
            }
            DriverCommand::ChannelModeRead => {
                return stored(DriverCommand::ChannelModeWrite)
                    .unwrap_or_else(|| br#"{"mode":"normal"}"#.to_vec())
            }
            DriverCommand::MmapPosition => return br#"{"frames":0}"#.to_vec(),
            _ => return Vec::new(),
        };
        encoded.unwrap()
    }
}

impl DriverTransport for ScriptedTransport {
    fn bind(&self, kind: StreamKind, path: PathKind) -> Result<DriverHandle, TransportError> {
        let mut script = self.script.lock();
        if script.fail_binds > 0 {
            script.fail_binds -= 1;
            return Err(TransportError::Unavailable("scripted bind failure".into()));
        }
        script.next_handle += 1;
        let handle = DriverHandle(script.next_handle);
        script.bound.push((handle, kind, path));
        Ok(handle)
    }

    fn unbind(&self, handle: DriverHandle) -> Result<(), TransportError> {
        let mut script = self.script.lock();
        let before = script.bound.len();
        script.bound.retain(|(h, _, _)| *h != handle);
        if script.bound.len() == before {
            return Err(TransportError::UnknownHandle(handle.0));
        }
        Ok(())
    }

    fn dispatch(
        &self,
        handle: DriverHandle,
        command: DriverCommand,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let mut script = self.script.lock();
        if !script.bound.iter().any(|(h, _, _)| *h == handle) {
            return Err(TransportError::UnknownHandle(handle.0));
        }
        script.sent.push((command, request.to_vec()));

        if let Some(remaining) = script.failures.get_mut(&command) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TransportError::Rejected { code: -5 });
            }
        }

        if let Some(reply) = script.replies.get_mut(&command).and_then(VecDeque::pop_front) {
            return Ok(reply);
        }

        if matches!(
            command,
            DriverCommand::VolumeWrite
                | DriverCommand::GainWrite
                | DriverCommand::MuteWrite
                | DriverCommand::ChannelModeWrite
        ) {
            script.stored.insert(command, request.to_vec());
        }
        Ok(Self::default_reply(&script, command, request))
    }
}

/// Routes every scene except line-out; `failing` makes every lookup fail.
pub(crate) struct FixedSelector {
    pub(crate) failing: bool,
}

impl PathSelector for FixedSelector {
    fn check(&self, _kind: StreamKind, scene: &SceneDescriptor) -> Result<(), PathError> {
        if scene.pins == PortPin::LineOut {
            return Err(PathError::NotSupported);
        }
        if self.failing {
            return Err(PathError::Failed("scripted".into()));
        }
        Ok(())
    }

    fn resolve(&self, kind: StreamKind, scene: &SceneDescriptor) -> Result<ScenePath, PathError> {
        self.check(kind, scene)?;
        Ok(ScenePath {
            switches: vec![PathSwitch {
                name: format!("{:?}", scene.pins),
                value: 1,
            }],
        })
    }
}

/// Configuration with a short retry budget and no sleep.
pub(crate) fn fast_config() -> PassthroughConfig {
    PassthroughConfig {
        frame_buffer_bytes: 4096,
        transfer_retry: RetryPolicy {
            max_attempts: 3,
            delay_ms: 0,
        },
        ..Default::default()
    }
}

pub(crate) fn stream_core(
    transport: &Arc<ScriptedTransport>,
    kind: StreamKind,
    selector: Option<Arc<dyn PathSelector>>,
) -> StreamCore {
    let pin = match kind {
        StreamKind::Render => PortPin::Speaker,
        StreamKind::Capture => PortPin::Mic,
    };
    let handles = BoundHandles::bind(Arc::clone(transport) as Arc<dyn DriverTransport>, kind).unwrap();
    StreamCore::new(
        kind,
        DeviceDescriptor::new(0, pin),
        SampleAttributes::default(),
        handles,
        selector,
        fast_config(),
    )
}

pub(crate) fn render_stream(transport: &Arc<ScriptedTransport>) -> RenderStream {
    RenderStream::new(stream_core(transport, StreamKind::Render, None))
}

pub(crate) fn capture_stream(transport: &Arc<ScriptedTransport>) -> CaptureStream {
    CaptureStream::new(stream_core(transport, StreamKind::Capture, None))
}

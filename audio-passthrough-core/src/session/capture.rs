use crate::models::error::PassthroughError;
use crate::models::stream_types::{CallbackEvent, PathKind};
use crate::processing::diagnostics::READ_FRAME_ERROR_CODE;
use crate::processing::validator::bytes_to_frames;
use crate::processing::wire::{self, BufferStatus, ReadFrameReply, ReadFrameRequest};
use crate::session::stream::{StreamControl, StreamCore};
use crate::traits::transport::DriverCommand;

/// A capture (recording) stream.
pub struct CaptureStream {
    core: StreamCore,
}

impl CaptureStream {
    pub(crate) fn new(core: StreamCore) -> Self {
        Self { core }
    }

    /// Read device frames into `out` and return the number of bytes read.
    ///
    /// An empty device buffer is not an error: nothing is copied, the frame
    /// counter is left alone and `Ok(0)` is returned.
    pub fn capture_frame(&mut self, out: &mut [u8]) -> Result<u64, PassthroughError> {
        let core = &mut self.core;
        if out.is_empty() {
            return Err(PassthroughError::InvalidParam("capture buffer is empty".into()));
        }
        if core.state.is_paused() {
            return Err(PassthroughError::NotSupported("stream is paused".into()));
        }
        let Some(capacity) = core.buffer.as_ref().map(|b| b.capacity().min(out.len())) else {
            return Err(PassthroughError::InvalidParam("stream is not started".into()));
        };
        let request = wire::encode(&ReadFrameRequest {
            capacity: capacity as u64,
        })?;

        let reply = match core
            .handles
            .dispatch_raw(PathKind::Data, DriverCommand::ReadFrame, &request)
        {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("capture stream {} read failed: {}", core.id, e);
                core.diagnostics
                    .record(e.code(), core.frames, format!("read frame failed: {}", e));
                core.notify(CallbackEvent::ErrorOccurred);
                return Err(PassthroughError::Internal(format!("read frame failed: {}", e)));
            }
        };
        let reply: ReadFrameReply = match wire::decode(&reply) {
            Ok(reply) => reply,
            Err(e) => return Err(read_failed(core, e.to_string())),
        };
        let data = match reply.status {
            BufferStatus::Full => {
                return Err(read_failed(core, "unexpected full reply to read".into()));
            }
            BufferStatus::Empty => return Ok(0),
            BufferStatus::Ready if reply.data.is_empty() => return Ok(0),
            BufferStatus::Ready => reply.data,
        };

        if data.len() > capacity {
            return Err(read_failed(
                core,
                format!(
                    "device returned {} bytes for a {} byte request",
                    data.len(),
                    capacity
                ),
            ));
        }
        let frame_count = bytes_to_frames(&core.attrs, data.len() as u64)?;
        let buffer = core
            .buffer
            .as_mut()
            .ok_or_else(|| PassthroughError::Internal("frame buffer released".into()))?;
        let received = buffer.receive(&data)?;
        out[..received.len()].copy_from_slice(received);

        core.advance(frame_count);
        log::debug!(
            "capture stream {} read {} frames, total {}",
            core.id,
            frame_count,
            core.frames
        );
        Ok(data.len() as u64)
    }
}

fn read_failed(core: &mut StreamCore, reason: String) -> PassthroughError {
    log::error!("capture stream {} {}", core.id, reason);
    core.diagnostics
        .record(READ_FRAME_ERROR_CODE, core.frames, reason.clone());
    core.notify(CallbackEvent::ErrorOccurred);
    PassthroughError::Internal(reason)
}

impl StreamControl for CaptureStream {
    fn core(&self) -> &StreamCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StreamCore {
        &mut self.core
    }
}

use std::thread;
use std::time::Duration;

use crate::models::attributes::ChannelMode;
use crate::models::error::PassthroughError;
use crate::models::stream_types::{CallbackEvent, PathKind};
use crate::processing::diagnostics::WRITE_FRAME_ERROR_CODE;
use crate::processing::validator::{bytes_to_frames, frame_bytes};
use crate::processing::wire::{self, BufferStatus, ChannelModePayload, WriteFrameReply, WriteFrameRequest};
use crate::session::stream::{StreamControl, StreamCore};
use crate::traits::transport::DriverCommand;

/// A render (playback) stream.
pub struct RenderStream {
    core: StreamCore,
    channel_mode: ChannelMode,
}

impl RenderStream {
    pub(crate) fn new(core: StreamCore) -> Self {
        Self {
            core,
            channel_mode: ChannelMode::Normal,
        }
    }

    /// Send `frames` to the device and return the number of bytes written.
    ///
    /// While the device reports its buffer as full the write is retried
    /// under the configured retry policy; each full reply raises
    /// [`CallbackEvent::RenderFull`].
    pub fn render_frame(&mut self, frames: &[u8]) -> Result<u64, PassthroughError> {
        let core = &mut self.core;
        if frames.is_empty() {
            return Err(PassthroughError::InvalidParam("no frames to render".into()));
        }
        if core.state.is_paused() {
            return Err(PassthroughError::NotSupported("stream is paused".into()));
        }
        let Some(buffer) = core.buffer.as_mut() else {
            return Err(PassthroughError::InvalidParam("stream is not started".into()));
        };
        let frame_count = bytes_to_frames(&core.attrs, frames.len() as u64)?;
        let staged = buffer.stage(frames)?;
        let request = wire::encode(&WriteFrameRequest {
            frames: frame_count,
            data: staged.to_vec(),
        })?;

        let policy = core.config.transfer_retry;
        let mut attempts = 0;
        loop {
            let reply = match core
                .handles
                .dispatch_raw(PathKind::Data, DriverCommand::WriteFrame, &request)
            {
                Ok(reply) => reply,
                Err(e) => {
                    log::error!("render stream {} write failed: {}", core.id, e);
                    core.diagnostics
                        .record(e.code(), core.frames, format!("write frame failed: {}", e));
                    core.notify(CallbackEvent::ErrorOccurred);
                    return Err(PassthroughError::Internal(format!("write frame failed: {}", e)));
                }
            };
            let reply: WriteFrameReply = match wire::decode(&reply) {
                Ok(reply) => reply,
                Err(e) => {
                    core.diagnostics
                        .record(WRITE_FRAME_ERROR_CODE, core.frames, e.to_string());
                    return Err(e);
                }
            };
            match reply.status {
                BufferStatus::Ready => break,
                BufferStatus::Full => {
                    attempts += 1;
                    core.notify(CallbackEvent::RenderFull);
                    if attempts >= policy.max_attempts {
                        log::error!(
                            "render stream {} device buffer full after {} attempts",
                            core.id,
                            attempts
                        );
                        core.diagnostics.record(
                            WRITE_FRAME_ERROR_CODE,
                            core.frames,
                            "device buffer full",
                        );
                        core.notify(CallbackEvent::ErrorOccurred);
                        return Err(PassthroughError::Internal(format!(
                            "device buffer full after {} attempts",
                            attempts
                        )));
                    }
                    thread::sleep(Duration::from_millis(policy.delay_ms));
                }
                BufferStatus::Empty => {
                    core.diagnostics.record(
                        WRITE_FRAME_ERROR_CODE,
                        core.frames,
                        "unexpected empty reply to write",
                    );
                    return Err(PassthroughError::Internal(
                        "unexpected empty reply to write".into(),
                    ));
                }
            }
        }

        core.advance(frame_count);
        core.notify(CallbackEvent::NonBlockWriteCompleted);
        log::debug!(
            "render stream {} wrote {} frames, total {}",
            core.id,
            frame_count,
            core.frames
        );
        Ok(frames.len() as u64)
    }

    /// Milliseconds of audio held by a full frame buffer.
    pub fn get_latency(&self) -> Result<u32, PassthroughError> {
        let core = &self.core;
        let byte_rate = core.attrs.sample_rate as u64 * frame_bytes(&core.attrs)?;
        if byte_rate == 0 {
            return Err(PassthroughError::Internal("byte rate is zero".into()));
        }
        Ok((core.config.frame_buffer_bytes as u64 * 1000 / byte_rate) as u32)
    }

    pub fn set_channel_mode(&mut self, mode: ChannelMode) -> Result<(), PassthroughError> {
        let previous = std::mem::replace(&mut self.channel_mode, mode);
        if let Err(e) = self.core.handles.call(
            PathKind::Control,
            DriverCommand::ChannelModeWrite,
            &ChannelModePayload { mode },
        ) {
            self.channel_mode = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn get_channel_mode(&mut self) -> Result<ChannelMode, PassthroughError> {
        let reply = self
            .core
            .handles
            .query(PathKind::Control, DriverCommand::ChannelModeRead)?;
        let payload: ChannelModePayload = wire::decode(&reply)?;
        self.channel_mode = payload.mode;
        Ok(payload.mode)
    }

    pub fn set_render_speed(&mut self, _speed: f32) -> Result<(), PassthroughError> {
        Err(PassthroughError::NotSupported("render speed".into()))
    }

    pub fn get_render_speed(&self) -> Result<f32, PassthroughError> {
        Err(PassthroughError::NotSupported("render speed".into()))
    }

    pub fn drain_buffer(&mut self) -> Result<(), PassthroughError> {
        Err(PassthroughError::NotSupported("drain".into()))
    }
}

impl StreamControl for RenderStream {
    fn core(&self) -> &StreamCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StreamCore {
        &mut self.core
    }
}

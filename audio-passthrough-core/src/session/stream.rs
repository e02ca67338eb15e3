use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use uuid::Uuid;

use crate::models::attributes::SampleAttributes;
use crate::models::config::PassthroughConfig;
use crate::models::error::PassthroughError;
use crate::models::gain::GainControl;
use crate::models::port::{DeviceDescriptor, SceneDescriptor};
use crate::models::state::{StandbyHint, StreamState};
use crate::models::stream_types::{
    AudioTimeStamp, CallbackEvent, MmapDescriptor, PathKind, StreamKind,
};
use crate::processing::diagnostics::DiagnosticsRing;
use crate::processing::extra_params::{self, parse_extra_params};
use crate::processing::validator::{self, frame_bytes, validate_attributes};
use crate::processing::volume_codec::{check_gain, decode_volume, encode_volume};
use crate::processing::wire::{
    self, GainPayload, GainThresholdReply, HwParamsRequest, MmapBufferRequest,
    MmapPositionReply, MutePayload, PauseRequest, SceneSelectRequest, StopRequest, VolumePayload,
};
use crate::session::handles::BoundHandles;
use crate::session::resources::{FrameBuffer, MmapRegion};
use crate::traits::path_selector::PathSelector;
use crate::traits::stream_callback::StreamCallback;
use crate::traits::transport::DriverCommand;

/// Frames per period used by `get_frame_size`.
pub const FRAME_SIZE_FRAMES: u64 = 1024;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// State shared by render and capture streams.
///
/// Owned resources are released in declaration order on drop: the mmap
/// region and frame buffer go first, then both driver handles are unbound.
pub struct StreamCore {
    pub(crate) mmap: Option<MmapRegion>,
    pub(crate) buffer: Option<FrameBuffer>,
    pub(crate) id: Uuid,
    pub(crate) kind: StreamKind,
    pub(crate) device: DeviceDescriptor,
    pub(crate) attrs: SampleAttributes,
    pub(crate) state: StreamState,
    pub(crate) frames: u64,
    pub(crate) timestamp: AudioTimeStamp,
    pub(crate) control: GainControl,
    pub(crate) diagnostics: DiagnosticsRing,
    pub(crate) standby: StandbyHint,
    pub(crate) callback: Option<StreamCallback>,
    pub(crate) route: i32,
    pub(crate) scene: SceneDescriptor,
    pub(crate) path_selector: Option<Arc<dyn PathSelector>>,
    pub(crate) config: PassthroughConfig,
    pub(crate) handles: BoundHandles,
}

impl StreamCore {
    pub(crate) fn new(
        kind: StreamKind,
        device: DeviceDescriptor,
        attrs: SampleAttributes,
        handles: BoundHandles,
        path_selector: Option<Arc<dyn PathSelector>>,
        config: PassthroughConfig,
    ) -> Self {
        let scene = SceneDescriptor {
            category: attrs.category,
            pins: device.pins,
        };
        Self {
            mmap: None,
            buffer: None,
            id: Uuid::new_v4(),
            kind,
            device,
            attrs,
            state: StreamState::Idle,
            frames: 0,
            timestamp: AudioTimeStamp::default(),
            control: GainControl::new(config.gain_ceiling, config.volume_min, config.volume_max),
            diagnostics: DiagnosticsRing::new(config.diagnostics_capacity),
            standby: StandbyHint::Later,
            callback: None,
            route: -1,
            scene,
            path_selector,
            config,
            handles,
        }
    }

    pub(crate) fn notify(&self, event: CallbackEvent) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }

    /// Advance the running frame counter and transfer timestamp after a
    /// successful transfer. The timestamp keeps its last value while the
    /// sample rate is zero.
    pub(crate) fn advance(&mut self, frames: u64) {
        self.frames = self.frames.saturating_add(frames);
        if let Ok(timestamp) = frames_to_timestamp(self.frames, self.attrs.sample_rate) {
            self.timestamp = timestamp;
        }
    }

    fn hw_params(&self) -> Result<HwParamsRequest, PassthroughError> {
        Ok(HwParamsRequest {
            attrs: self.attrs.clone(),
            frame_bytes: frame_bytes(&self.attrs)?,
            route: self.route,
        })
    }

    /// Drop resources ahead of destruction.
    pub(crate) fn release(&mut self) {
        self.mmap = None;
        self.buffer = None;
        self.state = StreamState::Destroyed;
    }
}

/// Convert a frame position into a presentation timestamp.
pub fn frames_to_timestamp(frames: u64, sample_rate: u32) -> Result<AudioTimeStamp, PassthroughError> {
    if sample_rate == 0 {
        return Err(PassthroughError::Internal("sample rate is zero".into()));
    }
    let rate = sample_rate as u64;
    Ok(AudioTimeStamp {
        tv_sec: (frames / rate) as i64,
        tv_nsec: ((frames % rate) * NANOS_PER_SEC / rate) as i64,
    })
}

/// Operations common to render and capture streams.
pub trait StreamControl {
    fn core(&self) -> &StreamCore;

    fn core_mut(&mut self) -> &mut StreamCore;

    fn id(&self) -> Uuid {
        self.core().id
    }

    fn kind(&self) -> StreamKind {
        self.core().kind
    }

    fn state(&self) -> StreamState {
        self.core().state
    }

    fn device(&self) -> &DeviceDescriptor {
        &self.core().device
    }

    fn get_sample_attributes(&self) -> SampleAttributes {
        self.core().attrs.clone()
    }

    /// Apply new attributes. The previous attributes are restored when the
    /// device rejects the hardware parameters.
    fn set_sample_attributes(&mut self, attrs: SampleAttributes) -> Result<(), PassthroughError> {
        validate_attributes(&attrs)?;
        let core = self.core_mut();
        let previous = std::mem::replace(&mut core.attrs, attrs);
        let result = core
            .hw_params()
            .and_then(|request| core.handles.call(PathKind::Data, DriverCommand::HwParams, &request));
        if let Err(e) = result {
            core.attrs = previous;
            return Err(e);
        }
        log::debug!("{:?} stream {} attributes updated", core.kind, core.id);
        Ok(())
    }

    fn start(&mut self) -> Result<(), PassthroughError> {
        let core = self.core_mut();
        if core.buffer.is_some() || !core.state.is_idle() {
            return Err(PassthroughError::Busy("stream already started".into()));
        }
        let buffer = FrameBuffer::allocate(core.config.frame_buffer_bytes)?;
        let request = core.hw_params()?;
        core.handles
            .call(PathKind::Data, DriverCommand::Start, &request)?;
        core.buffer = Some(buffer);
        core.state = StreamState::Started;
        log::info!("{:?} stream {} started", core.kind, core.id);
        Ok(())
    }

    /// Stop the stream. The frame buffer is released even when the device
    /// stop command fails.
    fn stop(&mut self) -> Result<(), PassthroughError> {
        let core = self.core_mut();
        if !core.state.is_active() {
            return Err(PassthroughError::NotSupported("stream is not started".into()));
        }
        core.buffer = None;
        core.control.pause = false;
        let result = core.handles.call(
            PathKind::Data,
            DriverCommand::Stop,
            &StopRequest {
                standby: core.standby,
            },
        );
        core.standby = StandbyHint::Later;
        core.state = StreamState::Idle;
        log::info!("{:?} stream {} stopped", core.kind, core.id);
        result.map(|_| ())
    }

    fn pause(&mut self) -> Result<(), PassthroughError> {
        let core = self.core_mut();
        if core.buffer.is_none() {
            return Err(PassthroughError::Internal("stream is not started".into()));
        }
        if core.state.is_paused() || core.control.pause {
            return Err(PassthroughError::NotSupported("stream already paused".into()));
        }
        let previous = core.control.pause;
        core.control.pause = true;
        if let Err(e) = core.handles.call(
            PathKind::Data,
            DriverCommand::PauseWrite,
            &PauseRequest { pause: true },
        ) {
            core.control.pause = previous;
            return Err(e);
        }
        core.state = StreamState::Paused;
        log::info!("{:?} stream {} paused", core.kind, core.id);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), PassthroughError> {
        let core = self.core_mut();
        if !core.state.is_paused() || !core.control.pause {
            return Err(PassthroughError::NotSupported("stream is not paused".into()));
        }
        let previous = core.control.pause;
        core.control.pause = false;
        if let Err(e) = core.handles.call(
            PathKind::Data,
            DriverCommand::PauseWrite,
            &PauseRequest { pause: false },
        ) {
            core.control.pause = previous;
            return Err(e);
        }
        core.state = StreamState::Started;
        log::info!("{:?} stream {} resumed", core.kind, core.id);
        Ok(())
    }

    /// Report a flush to the registered callback.
    fn flush(&mut self) -> Result<(), PassthroughError> {
        let core = self.core();
        if core.callback.is_none() {
            return Err(PassthroughError::NotSupported("no callback registered".into()));
        }
        core.notify(CallbackEvent::FlushCompleted);
        Ok(())
    }

    /// Record the standby hint and stop the stream with it.
    ///
    /// The hint is only recorded for an active stream.
    fn turn_standby(&mut self, hint: StandbyHint) -> Result<(), PassthroughError> {
        if !self.state().is_active() {
            return Err(PassthroughError::NotSupported("stream is not started".into()));
        }
        self.core_mut().standby = hint;
        self.stop()
    }

    fn reg_callback(&mut self, callback: StreamCallback) -> Result<(), PassthroughError> {
        self.core_mut().callback = Some(callback);
        Ok(())
    }

    fn get_position(&self) -> Result<(u64, AudioTimeStamp), PassthroughError> {
        let core = self.core();
        let timestamp = frames_to_timestamp(core.frames, core.attrs.sample_rate)?;
        Ok((core.frames, timestamp))
    }

    /// Timestamp of the position reached by the last successful transfer.
    fn last_transfer_timestamp(&self) -> AudioTimeStamp {
        self.core().timestamp
    }

    /// Bytes in one period of [`FRAME_SIZE_FRAMES`] frames.
    fn get_frame_size(&self) -> Result<u64, PassthroughError> {
        Ok(FRAME_SIZE_FRAMES * frame_bytes(&self.core().attrs)?)
    }

    fn get_frame_count(&self) -> u64 {
        self.core().frames
    }

    fn get_current_channel_id(&self) -> u32 {
        self.core().attrs.channel_count
    }

    /// Map `len` bytes of `file` at `offset` and bind the region on the device.
    ///
    /// The region is unmapped again if the device rejects the binding.
    fn req_mmap_buffer(
        &mut self,
        file: &File,
        len: usize,
        offset: u64,
        transfer_frame_size: u32,
        shareable: bool,
    ) -> Result<MmapDescriptor, PassthroughError> {
        let core = self.core_mut();
        if len == 0 {
            return Err(PassthroughError::InvalidParam("mmap length is zero".into()));
        }
        if core.mmap.is_some() {
            return Err(PassthroughError::Busy("mmap region already mapped".into()));
        }
        let total_buffer_frames = validator::bytes_to_frames(&core.attrs, len as u64)?;
        let region = MmapRegion::map(
            file,
            len,
            offset,
            shareable,
            total_buffer_frames,
            transfer_frame_size,
        )?;
        let descriptor = region.descriptor();
        core.handles.call(
            PathKind::Data,
            DriverCommand::MmapBuffer,
            &MmapBufferRequest {
                len: len as u64,
                total_buffer_frames,
                transfer_frame_size,
                is_shareable: shareable,
                offset,
            },
        )?;
        core.mmap = Some(region);
        log::info!(
            "{:?} stream {} mapped {} bytes ({} frames)",
            core.kind,
            core.id,
            len,
            total_buffer_frames
        );
        Ok(descriptor)
    }

    fn release_mmap_buffer(&mut self) -> Result<(), PassthroughError> {
        let core = self.core_mut();
        match core.mmap.take() {
            Some(_) => Ok(()),
            None => Err(PassthroughError::NotSupported("no mmap region mapped".into())),
        }
    }

    fn mmap_descriptor(&self) -> Option<MmapDescriptor> {
        self.core().mmap.as_ref().map(MmapRegion::descriptor)
    }

    fn mmap_region(&self) -> Option<&[u8]> {
        self.core().mmap.as_ref().map(MmapRegion::as_slice)
    }

    fn mmap_region_mut(&mut self) -> Option<&mut [u8]> {
        self.core_mut().mmap.as_mut().map(MmapRegion::as_mut_slice)
    }

    /// Query the device position and store it as the running frame count.
    fn get_mmap_position(&mut self) -> Result<(u64, AudioTimeStamp), PassthroughError> {
        let core = self.core_mut();
        let reply = core
            .handles
            .query(PathKind::Data, DriverCommand::MmapPosition)?;
        let position: MmapPositionReply = wire::decode(&reply)?;
        let timestamp = frames_to_timestamp(position.frames, core.attrs.sample_rate)?;
        core.frames = position.frames;
        core.timestamp = timestamp;
        Ok((position.frames, timestamp))
    }

    fn check_scene_capability(&self, scene: &SceneDescriptor) -> Result<bool, PassthroughError> {
        let core = self.core();
        let selector = core
            .path_selector
            .as_ref()
            .ok_or_else(|| PassthroughError::NotSupported("no path selection".into()))?;
        selector.check(core.kind, scene)?;
        Ok(true)
    }

    /// Route the stream to `scene`. The previous scene is kept on failure.
    fn select_scene(&mut self, scene: &SceneDescriptor) -> Result<(), PassthroughError> {
        let core = self.core_mut();
        let selector = core
            .path_selector
            .clone()
            .ok_or_else(|| PassthroughError::NotSupported("no path selection".into()))?;
        let previous = std::mem::replace(&mut core.scene, *scene);
        let result = selector
            .resolve(core.kind, scene)
            .map_err(PassthroughError::from)
            .and_then(|path| {
                core.handles.call(
                    PathKind::Control,
                    DriverCommand::SceneSelect,
                    &SceneSelectRequest {
                        category: scene.category,
                        pins: scene.pins,
                        path,
                    },
                )
            });
        if let Err(e) = result {
            core.scene = previous;
            return Err(e);
        }
        log::info!("{:?} stream {} scene {:?}", core.kind, core.id, scene);
        Ok(())
    }

    fn current_scene(&self) -> SceneDescriptor {
        self.core().scene
    }

    fn set_mute(&mut self, mute: bool) -> Result<(), PassthroughError> {
        let core = self.core_mut();
        let previous = core.control.mute;
        core.control.mute = mute;
        if let Err(e) = core.handles.call(
            PathKind::Control,
            DriverCommand::MuteWrite,
            &MutePayload { mute },
        ) {
            core.control.mute = previous;
            return Err(e);
        }
        Ok(())
    }

    fn get_mute(&mut self) -> Result<bool, PassthroughError> {
        let core = self.core_mut();
        let reply = core.handles.query(PathKind::Control, DriverCommand::MuteRead)?;
        let payload: MutePayload = wire::decode(&reply)?;
        core.control.mute = payload.mute;
        Ok(payload.mute)
    }

    fn set_gain(&mut self, gain: f32) -> Result<(), PassthroughError> {
        let core = self.core_mut();
        let gain = check_gain(gain, core.control.gain_min, core.control.gain_max)?;
        let previous = core.control.gain;
        core.control.gain = gain;
        if let Err(e) = core.handles.call(
            PathKind::Control,
            DriverCommand::GainWrite,
            &GainPayload { gain },
        ) {
            core.control.gain = previous;
            return Err(e);
        }
        Ok(())
    }

    fn get_gain(&mut self) -> Result<f32, PassthroughError> {
        let core = self.core_mut();
        let reply = core.handles.query(PathKind::Control, DriverCommand::GainRead)?;
        let payload: GainPayload = wire::decode(&reply)?;
        core.control.gain = payload.gain;
        Ok(payload.gain)
    }

    fn get_gain_threshold(&mut self) -> Result<(f32, f32), PassthroughError> {
        let core = self.core_mut();
        let reply = core
            .handles
            .query(PathKind::Control, DriverCommand::GainThresholdRead)?;
        let threshold: GainThresholdReply = wire::decode(&reply)?;
        core.control.gain_min = threshold.gain_min;
        core.control.gain_max = threshold.gain_max;
        Ok((threshold.gain_min, threshold.gain_max))
    }

    /// Set a normalized volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f32) -> Result<(), PassthroughError> {
        let core = self.core_mut();
        let device = encode_volume(volume, core.control.vol_min, core.control.vol_max)?;
        let previous = core.control.volume;
        core.control.volume = device;
        if let Err(e) = core.handles.call(
            PathKind::Control,
            DriverCommand::VolumeWrite,
            &VolumePayload { volume: device },
        ) {
            core.control.volume = previous;
            return Err(e);
        }
        Ok(())
    }

    fn get_volume(&mut self) -> Result<f32, PassthroughError> {
        let core = self.core_mut();
        let reply = core.handles.query(PathKind::Control, DriverCommand::VolumeRead)?;
        let payload: VolumePayload = wire::decode(&reply)?;
        core.control.volume = payload.volume;
        decode_volume(payload.volume, core.control.vol_min, core.control.vol_max)
    }

    fn gain_control(&self) -> GainControl {
        self.core().control
    }

    /// Apply a `key=value;` list. Nothing changes unless every entry is valid.
    fn set_extra_params(&mut self, list: &str) -> Result<(), PassthroughError> {
        let params = parse_extra_params(list)?;
        let core = self.core_mut();
        let mut attrs = core.attrs.clone();
        if let Some(format) = params.format {
            attrs.format = format;
        }
        if let Some(channels) = params.channels {
            attrs.channel_count = channels;
        }
        if let Some(rate) = params.sample_rate {
            attrs.sample_rate = rate;
        }
        validate_attributes(&attrs)
            .map_err(|e| PassthroughError::Internal(format!("extra params rejected: {}", e)))?;

        core.attrs = attrs;
        if let Some(route) = params.route {
            core.route = route;
        }
        if let Some(frames) = params.frames {
            core.frames = frames;
        }
        Ok(())
    }

    fn get_extra_params(&self) -> String {
        let core = self.core();
        extra_params::render_extra_params(core.route, &core.attrs, core.frames)
    }

    fn diagnostics(&self) -> &DiagnosticsRing {
        &self.core().diagnostics
    }

    /// Write the recent transfer failures to `sink`.
    fn dev_dump(&self, range: i32, sink: &mut dyn Write) -> Result<(), PassthroughError> {
        self.core().diagnostics.render(range, sink)
    }
}

use crate::models::stream_types::StreamKind;
use crate::session::capture::CaptureStream;
use crate::session::render::RenderStream;
use crate::session::stream::StreamControl;

/// A stream of either kind, as taken out of its adapter slot.
pub enum StreamInstance {
    Render(RenderStream),
    Capture(CaptureStream),
}

impl StreamInstance {
    pub fn kind(&self) -> StreamKind {
        match self {
            Self::Render(_) => StreamKind::Render,
            Self::Capture(_) => StreamKind::Capture,
        }
    }

    pub fn as_control(&self) -> &dyn StreamControl {
        match self {
            Self::Render(stream) => stream,
            Self::Capture(stream) => stream,
        }
    }

    pub fn as_control_mut(&mut self) -> &mut dyn StreamControl {
        match self {
            Self::Render(stream) => stream,
            Self::Capture(stream) => stream,
        }
    }

    /// Stop an active stream and release its buffer and mmap region.
    ///
    /// A failing stop is logged; release happens regardless. The driver
    /// handles are unbound when the instance is dropped.
    pub(crate) fn close(mut self) {
        let stream = self.as_control_mut();
        if stream.state().is_active() {
            if let Err(e) = stream.stop() {
                log::warn!("{:?} stream {} stop on destroy failed: {}", stream.kind(), stream.id(), e);
            }
        }
        stream.core_mut().release();
        log::info!("{:?} stream {} destroyed", stream.kind(), stream.id());
    }
}

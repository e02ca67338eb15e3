//! Pure checks applied before a stream is created or reconfigured.

use crate::models::attributes::{AudioCategory, AudioFormat, SampleAttributes};
use crate::models::error::PassthroughError;
use crate::models::port::DeviceDescriptor;
use crate::models::stream_types::StreamKind;

/// Check that the descriptor's pin belongs to the pin set of `kind`.
pub fn validate_port_pin(desc: &DeviceDescriptor, kind: StreamKind) -> Result<(), PassthroughError> {
    let ok = match kind {
        StreamKind::Render => desc.pins.is_render_pin(),
        StreamKind::Capture => desc.pins.is_capture_pin(),
    };
    if ok {
        Ok(())
    } else {
        Err(PassthroughError::NotSupported(format!(
            "pin {:?} cannot carry a {:?} stream",
            desc.pins, kind
        )))
    }
}

/// Bit width of a sample format.
pub fn format_to_bits(format: AudioFormat) -> Result<u32, PassthroughError> {
    format
        .bits()
        .ok_or_else(|| PassthroughError::NotSupported(format!("format {:?} has no bit width", format)))
}

/// Validate attributes and return the bit width of their format.
///
/// Numeric fields are unsigned, so non-negativity holds by construction.
pub fn validate_attributes(attrs: &SampleAttributes) -> Result<u32, PassthroughError> {
    if attrs.channel_count == 0 {
        return Err(PassthroughError::InvalidParam("channel count must be positive".into()));
    }
    if !matches!(attrs.category, AudioCategory::Media | AudioCategory::Communication) {
        return Err(PassthroughError::InvalidParam(format!(
            "category {:?} is not accepted",
            attrs.category
        )));
    }
    format_to_bits(attrs.format)
}

/// Bytes per frame: `channel_count * bits / 8`.
pub fn frame_bytes(attrs: &SampleAttributes) -> Result<u64, PassthroughError> {
    let bits = format_to_bits(attrs.format)?;
    let size = attrs.channel_count as u64 * (bits as u64 >> 3);
    if size == 0 {
        return Err(PassthroughError::Internal("frame size is zero".into()));
    }
    Ok(size)
}

/// Whole frames contained in `bytes`.
pub fn bytes_to_frames(attrs: &SampleAttributes, bytes: u64) -> Result<u64, PassthroughError> {
    Ok(bytes / frame_bytes(attrs)?)
}

//! `key=value;` attribute lists accepted by `set_extra_params`.
//!
//! ```text
//! attr-route=1;attr-format=16;attr-channels=2;attr-frame-count=4096;attr-sampling-rate=48000
//! ```
//! `attr-format` carries the PCM bit width.

use crate::models::attributes::{AudioFormat, SampleAttributes};
use crate::models::error::PassthroughError;

pub const ATTR_ROUTE: &str = "attr-route";
pub const ATTR_FORMAT: &str = "attr-format";
pub const ATTR_CHANNELS: &str = "attr-channels";
pub const ATTR_FRAME_COUNT: &str = "attr-frame-count";
pub const ATTR_SAMPLING_RATE: &str = "attr-sampling-rate";

/// Fields present in a parsed list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraParams {
    pub route: Option<i32>,
    pub format: Option<AudioFormat>,
    pub channels: Option<u32>,
    pub frames: Option<u64>,
    pub sample_rate: Option<u32>,
}

/// Parse a list. Any unknown key or unparsable value rejects the whole list.
pub fn parse_extra_params(list: &str) -> Result<ExtraParams, PassthroughError> {
    let list = list.trim();
    if list.is_empty() {
        return Err(PassthroughError::InvalidParam("empty extra params".into()));
    }

    let mut params = ExtraParams::default();
    for item in list.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| PassthroughError::Internal(format!("malformed extra param: {}", item)))?;
        let value = value.trim();
        match key.trim() {
            ATTR_ROUTE => params.route = Some(parse_value(key, value)?),
            ATTR_FORMAT => {
                let bits: u32 = parse_value(key, value)?;
                let format = AudioFormat::from_bits(bits)
                    .ok_or_else(|| PassthroughError::Internal(format!("unsupported format bits: {}", bits)))?;
                params.format = Some(format);
            }
            ATTR_CHANNELS => params.channels = Some(parse_value(key, value)?),
            ATTR_FRAME_COUNT => params.frames = Some(parse_value(key, value)?),
            ATTR_SAMPLING_RATE => params.sample_rate = Some(parse_value(key, value)?),
            other => {
                return Err(PassthroughError::Internal(format!("unknown extra param: {}", other)));
            }
        }
    }
    Ok(params)
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, PassthroughError> {
    value
        .parse()
        .map_err(|_| PassthroughError::Internal(format!("bad value for {}: {}", key, value)))
}

/// Render the current state as an extra params list.
pub fn render_extra_params(route: i32, attrs: &SampleAttributes, frames: u64) -> String {
    format!(
        "{}={};{}={};{}={};{}={};{}={}",
        ATTR_ROUTE,
        route,
        ATTR_FORMAT,
        attrs.format.bits().unwrap_or(0),
        ATTR_CHANNELS,
        attrs.channel_count,
        ATTR_FRAME_COUNT,
        frames,
        ATTR_SAMPLING_RATE,
        attrs.sample_rate
    )
}

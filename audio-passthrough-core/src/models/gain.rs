/// Per-stream control block for gain, volume, mute and pause.
///
/// Gain and volume are in device units; the normalized volume seen by
/// callers is converted by [`crate::processing::volume_codec`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainControl {
    pub gain: f32,
    pub gain_min: f32,
    pub gain_max: f32,
    pub volume: f32,
    pub vol_min: f32,
    pub vol_max: f32,
    pub mute: bool,
    pub pause: bool,
}

impl GainControl {
    /// Control block for a freshly created stream: gain range `[0, gain_ceiling]`,
    /// volume at the bottom of `[vol_min, vol_max]`, unmuted, not paused.
    pub fn new(gain_ceiling: f32, vol_min: f32, vol_max: f32) -> Self {
        Self {
            gain: 0.0,
            gain_min: 0.0,
            gain_max: gain_ceiling,
            volume: vol_min,
            vol_min,
            vol_max,
            mute: false,
            pause: false,
        }
    }
}

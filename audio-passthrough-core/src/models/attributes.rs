use serde::{Deserialize, Serialize};

/// Sample format of a stream.
///
/// Only the PCM formats map to a bit width; the compressed identifiers exist
/// so that a request for them can be recognised and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioFormat {
    Pcm8Bit,
    Pcm16Bit,
    Pcm24Bit,
    Pcm32Bit,
    AacMain,
    AacLc,
    AacHeV1,
}

impl AudioFormat {
    /// Bit width of one sample, or `None` for non-PCM formats.
    pub fn bits(&self) -> Option<u32> {
        match self {
            Self::Pcm8Bit => Some(8),
            Self::Pcm16Bit => Some(16),
            Self::Pcm24Bit => Some(24),
            Self::Pcm32Bit => Some(32),
            Self::AacMain | Self::AacLc | Self::AacHeV1 => None,
        }
    }

    /// PCM format for a bit width.
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Self::Pcm8Bit),
            16 => Some(Self::Pcm16Bit),
            24 => Some(Self::Pcm24Bit),
            32 => Some(Self::Pcm32Bit),
            _ => None,
        }
    }
}

/// Usage category of a stream. Only `Media` and `Communication` are
/// accepted for passthrough streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCategory {
    Media,
    Communication,
    Ringtone,
    Call,
}

/// Sample attributes negotiated for a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleAttributes {
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub channel_count: u32,
    pub interleaved: bool,
    pub category: AudioCategory,
    /// Frames per period.
    pub period: u32,
    /// Bytes per frame as requested by the caller.
    pub frame_size: u32,
    pub start_threshold: u32,
    pub stop_threshold: u32,
    pub silence_threshold: u32,
    pub is_big_endian: bool,
    pub is_signed_data: bool,
}

impl Default for SampleAttributes {
    fn default() -> Self {
        Self {
            format: AudioFormat::Pcm16Bit,
            sample_rate: 48000,
            channel_count: 2,
            interleaved: true,
            category: AudioCategory::Media,
            period: 4096,
            frame_size: 4,
            start_threshold: 4096,
            stop_threshold: 0x7fff_ffff,
            silence_threshold: 0,
            is_big_endian: false,
            is_signed_data: true,
        }
    }
}

/// Channel routing applied by the device to a render stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelMode {
    #[default]
    Normal,
    BothLeft,
    BothRight,
    Exchange,
    Mix,
    LeftMute,
    RightMute,
    BothMute,
}

use serde::{Deserialize, Serialize};

use super::attributes::{AudioCategory, AudioFormat};

/// Highest port id accepted in an adapter layout.
pub const PORT_ID_MAX: u32 = 255;

/// Name of the analog output port that supports passthrough mode selection.
pub const ANALOG_OUTPUT_PORT_NAME: &str = "AOP";

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    In,
    Out,
    Both,
}

impl PortDirection {
    pub fn can_render(&self) -> bool {
        matches!(self, Self::Out | Self::Both)
    }

    pub fn can_capture(&self) -> bool {
        matches!(self, Self::In | Self::Both)
    }
}

/// Physical pin a port or stream is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortPin {
    None,
    Speaker,
    Headset,
    LineOut,
    Hdmi,
    Mic,
    HeadsetMic,
    LineIn,
}

impl PortPin {
    pub fn is_render_pin(&self) -> bool {
        matches!(self, Self::Speaker | Self::Headset | Self::LineOut | Self::Hdmi)
    }

    pub fn is_capture_pin(&self) -> bool {
        matches!(self, Self::Mic | Self::HeadsetMic | Self::LineIn)
    }
}

/// A port of a loaded adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: u32,
    pub direction: PortDirection,
    pub name: String,
    /// Pin assigned by the capability rules at load time.
    pub pin: PortPin,
}

/// Raw-format routing of a port sub-path.
///
/// The discriminant is the routing mask carried by sub-port descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassthroughMode {
    #[default]
    Lpcm = 1,
    Raw = 2,
    Hdr = 4,
    Auto = 8,
}

impl PassthroughMode {
    pub fn mask(&self) -> u32 {
        *self as u32
    }
}

/// Sub-path of a port and the passthrough routing it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPort {
    pub port_id: u32,
    pub desc: String,
    pub mask: u32,
}

/// What a port can do, assembled when the adapter is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub device_pin: PortPin,
    pub hardware_mode: bool,
    pub formats: Vec<AudioFormat>,
    /// Bit set of [`CHANNEL_MONO`] / [`CHANNEL_STEREO`].
    pub channel_masks: u32,
    pub channel_count: u32,
    /// Bit set of the `SAMPLE_RATE_*` masks.
    pub sample_rate_masks: u32,
    pub sub_ports: Vec<SubPort>,
}

impl Capability {
    pub fn supports_rate(&self, rate_mask: u32) -> bool {
        self.sample_rate_masks & rate_mask == rate_mask
    }

    pub fn supports_format(&self, format: AudioFormat) -> bool {
        self.formats.contains(&format)
    }
}

pub const CHANNEL_MONO: u32 = 1;
pub const CHANNEL_STEREO: u32 = 2;

pub const SAMPLE_RATE_8000: u32 = 1 << 1;
pub const SAMPLE_RATE_16000: u32 = 1 << 3;
pub const SAMPLE_RATE_44100: u32 = 1 << 7;
pub const SAMPLE_RATE_48000: u32 = 1 << 8;

/// Port a stream is requested on, and the pin it should route to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub port_id: u32,
    pub pins: PortPin,
    pub desc: String,
}

impl DeviceDescriptor {
    pub fn new(port_id: u32, pins: PortPin) -> Self {
        Self {
            port_id,
            pins,
            desc: String::new(),
        }
    }
}

/// Usage category plus physical pin, used to pick a device signal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub category: AudioCategory,
    pub pins: PortPin,
}

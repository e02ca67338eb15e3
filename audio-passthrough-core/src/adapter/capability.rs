//! Per-port capability assembly.
//!
//! | port                         | pin         | formats    | rates        | sub-ports      |
//! |------------------------------|-------------|------------|--------------|----------------|
//! | named `HDMI`                 | hdmi        | pcm16/24   | 44.1k, 48k   | lpcm, raw, hdr |
//! | 1st output                   | speaker     | pcm16      | 16k          | lpcm           |
//! | 2nd output                   | headset     | pcm16/24   | 8k, 16k      | lpcm, raw      |
//! | further outputs              | line-out    | pcm16      | 48k          | lpcm           |
//! | 1st input                    | mic         | pcm16      | 8k, 16k      | lpcm           |
//! | further inputs               | line-in     | pcm16      | 16k, 48k     | lpcm           |
//!
//! Ports of direction `both` follow the output rules. Further inputs whose
//! name mentions a headset get the headset-mic pin.

use crate::models::attributes::AudioFormat;
use crate::models::config::PortDescriptor;
use crate::models::port::{
    Capability, PassthroughMode, Port, PortPin, SubPort, CHANNEL_MONO,
    CHANNEL_STEREO, SAMPLE_RATE_16000, SAMPLE_RATE_44100, SAMPLE_RATE_48000, SAMPLE_RATE_8000,
};

const HDMI_PORT_NAME: &str = "HDMI";

/// Assign pins and build a capability for every port, in layout order.
pub fn assemble(ports: &[PortDescriptor]) -> Vec<(Port, Capability)> {
    let mut outputs = 0;
    let mut inputs = 0;
    ports
        .iter()
        .map(|desc| {
            let (pin, capability) = if desc.name.eq_ignore_ascii_case(HDMI_PORT_NAME) {
                hdmi(desc)
            } else if desc.direction.can_render() {
                outputs += 1;
                match outputs {
                    1 => speaker(desc),
                    2 => headset(desc),
                    _ => line_out(desc),
                }
            } else {
                inputs += 1;
                if inputs == 1 {
                    mic(desc)
                } else {
                    line_in(desc)
                }
            };
            let port = Port {
                id: desc.id,
                direction: desc.direction,
                name: desc.name.clone(),
                pin,
            };
            (port, capability)
        })
        .collect()
}

fn sub_ports(desc: &PortDescriptor, modes: &[PassthroughMode]) -> Vec<SubPort> {
    modes
        .iter()
        .map(|mode| SubPort {
            port_id: desc.id,
            desc: desc.name.clone(),
            mask: mode.mask(),
        })
        .collect()
}

fn capability(
    pin: PortPin,
    formats: Vec<AudioFormat>,
    channel_masks: u32,
    sample_rate_masks: u32,
    sub_ports: Vec<SubPort>,
) -> (PortPin, Capability) {
    let capability = Capability {
        device_pin: pin,
        hardware_mode: true,
        formats,
        channel_masks,
        channel_count: 2,
        sample_rate_masks,
        sub_ports,
    };
    (pin, capability)
}

fn hdmi(desc: &PortDescriptor) -> (PortPin, Capability) {
    capability(
        PortPin::Hdmi,
        vec![AudioFormat::Pcm16Bit, AudioFormat::Pcm24Bit],
        CHANNEL_STEREO,
        SAMPLE_RATE_44100 | SAMPLE_RATE_48000,
        sub_ports(
            desc,
            &[PassthroughMode::Lpcm, PassthroughMode::Raw, PassthroughMode::Hdr],
        ),
    )
}

fn speaker(desc: &PortDescriptor) -> (PortPin, Capability) {
    capability(
        PortPin::Speaker,
        vec![AudioFormat::Pcm16Bit],
        CHANNEL_STEREO,
        SAMPLE_RATE_16000,
        sub_ports(desc, &[PassthroughMode::Lpcm]),
    )
}

fn headset(desc: &PortDescriptor) -> (PortPin, Capability) {
    capability(
        PortPin::Headset,
        vec![AudioFormat::Pcm16Bit, AudioFormat::Pcm24Bit],
        CHANNEL_STEREO,
        SAMPLE_RATE_8000 | SAMPLE_RATE_16000,
        sub_ports(desc, &[PassthroughMode::Lpcm, PassthroughMode::Raw]),
    )
}

fn line_out(desc: &PortDescriptor) -> (PortPin, Capability) {
    capability(
        PortPin::LineOut,
        vec![AudioFormat::Pcm16Bit],
        CHANNEL_STEREO,
        SAMPLE_RATE_48000,
        sub_ports(desc, &[PassthroughMode::Lpcm]),
    )
}

fn mic(desc: &PortDescriptor) -> (PortPin, Capability) {
    capability(
        PortPin::Mic,
        vec![AudioFormat::Pcm16Bit],
        CHANNEL_MONO | CHANNEL_STEREO,
        SAMPLE_RATE_8000 | SAMPLE_RATE_16000,
        sub_ports(desc, &[PassthroughMode::Lpcm]),
    )
}

fn line_in(desc: &PortDescriptor) -> (PortPin, Capability) {
    let pin = if desc.name.to_ascii_lowercase().contains("headset") {
        PortPin::HeadsetMic
    } else {
        PortPin::LineIn
    };
    capability(
        pin,
        vec![AudioFormat::Pcm16Bit],
        CHANNEL_MONO | CHANNEL_STEREO,
        SAMPLE_RATE_16000 | SAMPLE_RATE_48000,
        sub_ports(desc, &[PassthroughMode::Lpcm]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::port::PortDirection;

    #[test]
    fn outputs_follow_position_rules() {
        let table = assemble(&[
            PortDescriptor::new(0, PortDirection::Out, "AOP"),
            PortDescriptor::new(1, PortDirection::Out, "HP"),
            PortDescriptor::new(2, PortDirection::Out, "LINE"),
        ]);

        assert_eq!(table[0].0.pin, PortPin::Speaker);
        assert_eq!(table[0].1.sub_ports.len(), 1);
        assert!(table[0].1.supports_rate(SAMPLE_RATE_16000));

        assert_eq!(table[1].0.pin, PortPin::Headset);
        assert!(table[1].1.supports_rate(SAMPLE_RATE_8000 | SAMPLE_RATE_16000));
        assert!(table[1].1.supports_format(AudioFormat::Pcm24Bit));
        assert_eq!(table[1].1.sub_ports.len(), 2);

        assert_eq!(table[2].0.pin, PortPin::LineOut);
    }

    #[test]
    fn hdmi_is_matched_by_name() {
        let table = assemble(&[
            PortDescriptor::new(0, PortDirection::Out, "AOP"),
            PortDescriptor::new(5, PortDirection::Out, "hdmi"),
        ]);
        let (port, cap) = &table[1];
        assert_eq!(port.pin, PortPin::Hdmi);
        assert!(cap.supports_rate(SAMPLE_RATE_44100 | SAMPLE_RATE_48000));
        let masks: Vec<u32> = cap.sub_ports.iter().map(|s| s.mask).collect();
        assert_eq!(masks, vec![1, 2, 4]);
        assert!(cap.sub_ports.iter().all(|s| s.desc == "hdmi" && s.port_id == 5));
    }

    #[test]
    fn inputs_and_both_direction() {
        let table = assemble(&[
            PortDescriptor::new(0, PortDirection::Both, "AOP"),
            PortDescriptor::new(1, PortDirection::In, "AIP"),
            PortDescriptor::new(2, PortDirection::In, "Headset-In"),
            PortDescriptor::new(3, PortDirection::In, "AUX"),
        ]);
        assert_eq!(table[0].0.pin, PortPin::Speaker);
        assert_eq!(table[1].0.pin, PortPin::Mic);
        assert_eq!(table[1].1.channel_masks, CHANNEL_MONO | CHANNEL_STEREO);
        assert_eq!(table[2].0.pin, PortPin::HeadsetMic);
        assert_eq!(table[3].0.pin, PortPin::LineIn);
    }
}

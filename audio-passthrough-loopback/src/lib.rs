//! # audio-passthrough-loopback
//!
//! In-process driver backend for audio-passthrough-core.
//!
//! Provides:
//! - `LoopbackDriver`: a `DriverTransport` whose render writes feed a
//!   bounded FIFO that capture reads drain, with failure injection
//! - `LoopbackPathSelector`: a table-driven `PathSelector`
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use audio_passthrough_core::{PassthroughConfig, StreamFactory};
//! use audio_passthrough_loopback::{LoopbackDriver, LoopbackPathSelector};
//!
//! let factory = StreamFactory::new(Arc::new(LoopbackDriver::default()), PassthroughConfig::default())?
//!     .with_path_selector(Arc::new(LoopbackPathSelector::standard()));
//! ```

pub mod driver;
pub mod selector;

pub use driver::LoopbackDriver;
pub use selector::{LoopbackPathSelector, RouteEntry, RouteTableError};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use audio_passthrough_core::models::config::RetryPolicy;
    use audio_passthrough_core::storage::layout::write_adapter_layout;
    use audio_passthrough_core::*;

    use super::*;

    fn layout() -> AdapterDescriptor {
        AdapterDescriptor::new(
            "primary",
            vec![
                PortDescriptor::new(0, PortDirection::Out, "AOP"),
                PortDescriptor::new(1, PortDirection::Out, "HP"),
                PortDescriptor::new(2, PortDirection::In, "AIP"),
            ],
        )
    }

    fn config() -> PassthroughConfig {
        PassthroughConfig {
            transfer_retry: RetryPolicy {
                max_attempts: 3,
                delay_ms: 0,
            },
            ..Default::default()
        }
    }

    fn factory(driver: &Arc<LoopbackDriver>) -> StreamFactory {
        StreamFactory::new(Arc::clone(driver) as Arc<dyn DriverTransport>, config())
            .unwrap()
            .with_path_selector(Arc::new(LoopbackPathSelector::standard()))
    }

    #[test]
    fn rendered_frames_are_captured_back() {
        let driver = Arc::new(LoopbackDriver::default());
        let factory = factory(&driver);
        let mut registry = AdapterRegistry::new();
        let adapter = registry.load_adapter(&layout()).unwrap();
        let attrs = SampleAttributes::default();

        factory
            .create_render(adapter, &DeviceDescriptor::new(0, PortPin::Speaker), &attrs)
            .unwrap()
            .start()
            .unwrap();
        factory
            .create_capture(adapter, &DeviceDescriptor::new(2, PortPin::Mic), &attrs)
            .unwrap()
            .start()
            .unwrap();
        assert!(driver.selected_path(StreamKind::Render).is_some());
        assert!(driver.selected_path(StreamKind::Capture).is_some());

        let mut out = vec![0u8; 4096];
        let capture = adapter.capture_mut().unwrap();
        assert_eq!(capture.capture_frame(&mut out).unwrap(), 0);
        assert_eq!(capture.get_frame_count(), 0);

        let pcm: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();
        let render = adapter.render_mut().unwrap();
        assert_eq!(render.render_frame(&pcm).unwrap(), 2048);
        assert_eq!(render.get_frame_count(), 512);

        let capture = adapter.capture_mut().unwrap();
        assert_eq!(capture.capture_frame(&mut out).unwrap(), 2048);
        assert_eq!(&out[..2048], pcm.as_slice());
        assert_eq!(capture.get_frame_count(), 512);

        factory.destroy_render(adapter).unwrap();
        factory.destroy_capture(adapter).unwrap();
        registry.unload_adapter("primary").unwrap();
        assert_eq!(driver.bound_handles(), 0);
        assert!(!driver.is_running(StreamKind::Render));
    }

    #[test]
    fn two_output_adapter_lifecycle() {
        let driver = Arc::new(LoopbackDriver::default());
        let factory = factory(&driver);
        let mut registry = AdapterRegistry::new();
        registry
            .load_adapter(&AdapterDescriptor::new(
                "A",
                vec![
                    PortDescriptor::new(0, PortDirection::Out, "AOP"),
                    PortDescriptor::new(1, PortDirection::Out, "HP"),
                ],
            ))
            .unwrap();
        let adapter = registry.adapter_mut("A").unwrap();
        assert_eq!(adapter.port(0).unwrap().pin, PortPin::Speaker);
        assert_eq!(adapter.port(1).unwrap().pin, PortPin::Headset);

        let attrs = SampleAttributes {
            format: AudioFormat::Pcm16Bit,
            channel_count: 2,
            sample_rate: 48000,
            ..Default::default()
        };
        let render = factory
            .create_render(adapter, &DeviceDescriptor::new(0, PortPin::Speaker), &attrs)
            .unwrap();
        render.start().unwrap();
        render.render_frame(&[0u8; 2048]).unwrap();
        assert_eq!(render.get_frame_count(), 2048 / (2 * 2));
        render.stop().unwrap();
        assert!(render.state().is_idle());

        assert!(matches!(
            registry.unload_adapter("A"),
            Err(PassthroughError::Busy(_))
        ));
        factory
            .destroy_render(registry.adapter_mut("A").unwrap())
            .unwrap();
        registry.unload_adapter("A").unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn full_fifo_exhausts_retry_budget() {
        let driver = Arc::new(LoopbackDriver::new(1024));
        let factory = factory(&driver);
        let mut registry = AdapterRegistry::new();
        let adapter = registry.load_adapter(&layout()).unwrap();
        let render = factory
            .create_render(
                adapter,
                &DeviceDescriptor::new(0, PortPin::Speaker),
                &SampleAttributes::default(),
            )
            .unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        render
            .reg_callback(Arc::new(move |event: CallbackEvent| sink.lock().push(event)))
            .unwrap();
        render.start().unwrap();

        render.render_frame(&[1u8; 1024]).unwrap();
        assert!(matches!(
            render.render_frame(&[2u8; 512]),
            Err(PassthroughError::Internal(_))
        ));
        assert_eq!(render.get_frame_count(), 256);
        assert_eq!(
            *events.lock(),
            vec![
                CallbackEvent::NonBlockWriteCompleted,
                CallbackEvent::RenderFull,
                CallbackEvent::RenderFull,
                CallbackEvent::RenderFull,
                CallbackEvent::ErrorOccurred,
            ]
        );

        let mut dump = Vec::new();
        render.dev_dump(4, &mut dump).unwrap();
        let dump = String::from_utf8(dump).unwrap();
        assert!(dump.starts_with("Number of errors: 1"));
        assert!(dump.contains("device buffer full"));
        assert_eq!(driver.queued_bytes(), 1024);
    }

    #[test]
    fn controls_round_trip_and_roll_back() {
        let driver = Arc::new(LoopbackDriver::default());
        let factory = factory(&driver);
        let mut registry = AdapterRegistry::new();
        let adapter = registry.load_adapter(&layout()).unwrap();
        let render = factory
            .create_render(
                adapter,
                &DeviceDescriptor::new(0, PortPin::Speaker),
                &SampleAttributes::default(),
            )
            .unwrap();

        render.set_volume(0.5).unwrap();
        assert!((render.get_volume().unwrap() - 0.5).abs() < 0.1);
        render.set_mute(true).unwrap();
        assert!(render.get_mute().unwrap());
        render.set_channel_mode(ChannelMode::Exchange).unwrap();
        assert_eq!(render.get_channel_mode().unwrap(), ChannelMode::Exchange);
        assert_eq!(render.get_gain_threshold().unwrap(), (0.0, 15.0));

        driver.fail_next(DriverCommand::GainWrite);
        assert!(render.set_gain(4.0).is_err());
        assert_eq!(render.gain_control().gain, 0.0);
        render.set_gain(4.0).unwrap();
        assert_eq!(render.get_gain().unwrap(), 4.0);

        let headset = SceneDescriptor {
            category: AudioCategory::Media,
            pins: PortPin::Headset,
        };
        render.select_scene(&headset).unwrap();
        assert_eq!(
            driver.selected_path(StreamKind::Render).unwrap().switches[0].name,
            "Headset Switch"
        );
        let ringtone = SceneDescriptor {
            category: AudioCategory::Ringtone,
            pins: PortPin::Speaker,
        };
        assert!(matches!(
            render.select_scene(&ringtone),
            Err(PassthroughError::NotSupported(_))
        ));
        assert_eq!(render.current_scene(), headset);
    }

    #[test]
    fn mmap_position_follows_written_frames() {
        let driver = Arc::new(LoopbackDriver::default());
        let factory = factory(&driver);
        let mut registry = AdapterRegistry::new();
        let adapter = registry.load_adapter(&layout()).unwrap();
        let render = factory
            .create_render(
                adapter,
                &DeviceDescriptor::new(0, PortPin::Speaker),
                &SampleAttributes::default(),
            )
            .unwrap();

        let path = std::env::temp_dir().join(format!("loopback_mmap_{}", render.id()));
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        file.set_len(8192).unwrap();

        let desc = render.req_mmap_buffer(&file, 8192, 0, 4, true).unwrap();
        assert_eq!(desc.total_buffer_frames, 2048);

        render.start().unwrap();
        render.render_frame(&[0u8; 400]).unwrap();
        let (frames, ts) = render.get_mmap_position().unwrap();
        assert_eq!(frames, 100);
        assert_eq!(render.last_transfer_timestamp(), ts);

        factory.destroy_render(adapter).unwrap();
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn adapters_load_from_layout_file() {
        let path = std::env::temp_dir().join(format!(
            "loopback_layout_{}.json",
            std::process::id()
        ));
        write_adapter_layout(
            &[
                layout(),
                AdapterDescriptor::new("hdmi", vec![PortDescriptor::new(0, PortDirection::Out, "HDMI")]),
            ],
            &path,
        )
        .unwrap();

        let mut registry = AdapterRegistry::new();
        for desc in load_adapter_layout(&path).unwrap() {
            registry.load_adapter(&desc).unwrap();
        }
        assert_eq!(registry.adapter_names(), vec!["primary", "hdmi"]);

        let hdmi = registry.adapter_mut("hdmi").unwrap();
        let port = hdmi.port(0).unwrap().clone();
        assert_eq!(port.pin, PortPin::Hdmi);
        assert_eq!(hdmi.get_port_capability(&port).unwrap().sub_ports.len(), 3);
        std::fs::remove_file(&path).ok();
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use audio_passthrough_core::models::attributes::AudioCategory;
use audio_passthrough_core::models::error::PathError;
use audio_passthrough_core::models::port::{PortPin, SceneDescriptor};
use audio_passthrough_core::models::stream_types::StreamKind;
use audio_passthrough_core::traits::path_selector::{PathSelector, PathSwitch, ScenePath};

/// Error loading a routing table.
#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("malformed routing table: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("duplicate route for {category:?} on {pins:?}")]
    Duplicate {
        category: AudioCategory,
        pins: PortPin,
    },
}

/// One entry of a JSON routing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub category: AudioCategory,
    pub pins: PortPin,
    pub switches: Vec<PathSwitch>,
}

/// Table-driven [`PathSelector`]. Pairs missing from the table, and pins
/// that do not belong to the stream kind, are not supported.
#[derive(Debug, Clone, Default)]
pub struct LoopbackPathSelector {
    routes: HashMap<(AudioCategory, PortPin), ScenePath>,
}

impl LoopbackPathSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Media and communication routes for every render and capture pin,
    /// each a single switch named after the pin.
    pub fn standard() -> Self {
        let pins = [
            PortPin::Speaker,
            PortPin::Headset,
            PortPin::LineOut,
            PortPin::Hdmi,
            PortPin::Mic,
            PortPin::HeadsetMic,
            PortPin::LineIn,
        ];
        let mut selector = Self::new();
        for category in [AudioCategory::Media, AudioCategory::Communication] {
            for pin in pins {
                selector = selector.with_route(
                    category,
                    pin,
                    ScenePath {
                        switches: vec![PathSwitch {
                            name: format!("{:?} Switch", pin),
                            value: 1,
                        }],
                    },
                );
            }
        }
        selector
    }

    pub fn with_route(mut self, category: AudioCategory, pins: PortPin, path: ScenePath) -> Self {
        self.routes.insert((category, pins), path);
        self
    }

    /// Build a selector from a JSON array of [`RouteEntry`].
    pub fn from_json(json: &str) -> Result<Self, RouteTableError> {
        let entries: Vec<RouteEntry> = serde_json::from_str(json)?;
        let mut routes = HashMap::with_capacity(entries.len());
        for entry in entries {
            let key = (entry.category, entry.pins);
            if routes.contains_key(&key) {
                return Err(RouteTableError::Duplicate {
                    category: entry.category,
                    pins: entry.pins,
                });
            }
            routes.insert(
                key,
                ScenePath {
                    switches: entry.switches,
                },
            );
        }
        Ok(Self { routes })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn lookup(&self, kind: StreamKind, scene: &SceneDescriptor) -> Result<&ScenePath, PathError> {
        let pin_fits = match kind {
            StreamKind::Render => scene.pins.is_render_pin(),
            StreamKind::Capture => scene.pins.is_capture_pin(),
        };
        if !pin_fits {
            return Err(PathError::NotSupported);
        }
        self.routes
            .get(&(scene.category, scene.pins))
            .ok_or(PathError::NotSupported)
    }
}

impl PathSelector for LoopbackPathSelector {
    fn check(&self, kind: StreamKind, scene: &SceneDescriptor) -> Result<(), PathError> {
        self.lookup(kind, scene).map(|_| ())
    }

    fn resolve(&self, kind: StreamKind, scene: &SceneDescriptor) -> Result<ScenePath, PathError> {
        self.lookup(kind, scene).cloned()
    }
}

use serde::{Deserialize, Serialize};

use crate::models::error::PathError;
use crate::models::port::SceneDescriptor;
use crate::models::stream_types::StreamKind;

/// One mixer switch the device must set to realise a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSwitch {
    pub name: String,
    pub value: u32,
}

/// Device signal path resolved for a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenePath {
    pub switches: Vec<PathSwitch>,
}

/// Resolves a category/pin pair into a device signal path.
///
/// Factories built without a selector have no lower path selection: initial
/// path resolution is skipped and scene operations report `NotSupported`.
pub trait PathSelector: Send + Sync {
    /// Whether the scene can be routed for this stream kind.
    fn check(&self, kind: StreamKind, scene: &SceneDescriptor) -> Result<(), PathError>;

    /// Resolve the path to program for the scene.
    fn resolve(&self, kind: StreamKind, scene: &SceneDescriptor) -> Result<ScenePath, PathError>;
}

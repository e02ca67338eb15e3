/// Stream lifecycle state.
///
/// State transitions:
/// ```text
/// idle → started ↔ paused
///   ↑       ↓        ↓
///   └──── stop ──────┘
/// any → destroyed
/// ```
/// `Idle` covers both "never started" and "stopped".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Idle,
    Started,
    Paused,
    Destroyed,
}

impl StreamState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Whether the stream holds a frame buffer in this state.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Started | Self::Paused)
    }
}

/// Standby behaviour requested from the device on the next stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandbyHint {
    Now,
    #[default]
    Later,
}

use serde::{Deserialize, Serialize};

use super::port::PortDirection;

/// Runtime tunables shared by every stream a factory creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassthroughConfig {
    /// Capacity of the per-stream frame buffer allocated on start.
    pub frame_buffer_bytes: usize,

    /// Number of transfer failures kept for `dev_dump`.
    pub diagnostics_capacity: usize,

    /// Bounded retry applied when the device buffer is full on render.
    pub transfer_retry: RetryPolicy,

    /// Default upper gain bound in device units.
    pub gain_ceiling: f32,

    /// Default device volume range.
    pub volume_min: f32,
    pub volume_max: f32,
}

impl PassthroughConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_buffer_bytes == 0 {
            return Err("frame buffer must not be empty".into());
        }
        if self.diagnostics_capacity == 0 {
            return Err("diagnostics capacity must be positive".into());
        }
        if self.transfer_retry.max_attempts == 0 {
            return Err("transfer retry needs at least one attempt".into());
        }
        if self.gain_ceiling.is_nan() || self.gain_ceiling < 0.0 {
            return Err(format!("invalid gain ceiling: {}", self.gain_ceiling));
        }
        if self.volume_min.is_nan() || self.volume_max.is_nan() || self.volume_max <= self.volume_min {
            return Err(format!(
                "invalid volume range: [{}, {}]",
                self.volume_min, self.volume_max
            ));
        }
        Ok(())
    }
}

impl Default for PassthroughConfig {
    fn default() -> Self {
        Self {
            frame_buffer_bytes: 8192 * 2,
            diagnostics_capacity: 64,
            transfer_retry: RetryPolicy::default(),
            gain_ceiling: 15.0,
            volume_min: 0.0,
            volume_max: 100.0,
        }
    }
}

/// Attempt budget and fixed sleep between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            delay_ms: 10,
        }
    }
}

/// One adapter entry of the layout file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterDescriptor {
    pub name: String,
    pub ports: Vec<PortDescriptor>,
}

impl AdapterDescriptor {
    pub fn new(name: impl Into<String>, ports: Vec<PortDescriptor>) -> Self {
        Self {
            name: name.into(),
            ports,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescriptor {
    pub id: u32,
    pub direction: PortDirection,
    pub name: String,
}

impl PortDescriptor {
    pub fn new(id: u32, direction: PortDirection, name: impl Into<String>) -> Self {
        Self {
            id,
            direction,
            name: name.into(),
        }
    }
}

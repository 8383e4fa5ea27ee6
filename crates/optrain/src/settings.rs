//! Trace configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tracing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Vertex count of circular boundary polygons.
    pub circle_segments: usize,
    /// Trace batches on the rayon pool.
    pub parallel: bool,
    /// Batches smaller than this are traced serially.
    pub min_parallel_batch: usize,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            circle_segments: optrain_trace::DEFAULT_CIRCLE_SEGMENTS,
            parallel: true,
            min_parallel_batch: 256,
        }
    }
}

impl TraceSettings {
    /// Parse settings from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: TraceSettings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.circle_segments < 3 {
            return Err(Error::InvalidSettings(
                "circle_segments must be at least 3".into(),
            ));
        }
        Ok(())
    }

    /// Whether a batch of `len` rays should be traced in parallel.
    pub fn use_parallel(&self, len: usize) -> bool {
        self.parallel && len >= self.min_parallel_batch
    }
}

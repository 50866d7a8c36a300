use crate::error::{Result, TreeError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_SAMPLES_SPLIT: u16 = 2;
pub const DEFAULT_MAX_DEPTH: u16 = 4;

/// Stopping rules for tree construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    min_samples_split: u16,
    max_depth: u16,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParams {
    pub fn new() -> Self {
        Self {
            min_samples_split: DEFAULT_MIN_SAMPLES_SPLIT,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    fn check_min_samples_split(min_samples_split: u16) -> Result<()> {
        if min_samples_split < 2 {
            return Err(TreeError::InvalidParameter(
                "The minimum number of samples to split must be greater than 1.".into(),
            ));
        }
        Ok(())
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<()> {
        Self::check_min_samples_split(min_samples_split)?;
        self.min_samples_split = min_samples_split;
        Ok(())
    }

    /// Checks parameters that didn't come through the setters, e.g. deserialized ones.
    pub fn validate(&self) -> Result<()> {
        Self::check_min_samples_split(self.min_samples_split)
    }

    /// Nodes at depth `max_depth` may still split; their children are leaves.
    pub fn set_max_depth(&mut self, max_depth: u16) {
        self.max_depth = max_depth;
    }

    pub fn min_samples_split(&self) -> u16 {
        self.min_samples_split
    }

    pub fn max_depth(&self) -> u16 {
        self.max_depth
    }
}

//! Test generation loop configuration

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Limits and targets of a cover run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Tests requested from the model per iteration
    pub max_tests_per_run: usize,

    /// Model round trips before giving up
    pub max_iterations: u32,

    /// Target line coverage in percent
    pub desired_coverage: f64,

    /// Timeout of one test command run in seconds
    pub max_run_time_sec: u64,

    /// Extra instructions appended to every prompt
    pub additional_instructions: String,
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_tests_per_run == 0 {
            return Err(anyhow!("generation.max_tests_per_run must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(anyhow!("generation.max_iterations must be positive"));
        }
        if !(0.0..=100.0).contains(&self.desired_coverage) {
            return Err(anyhow!(
                "generation.desired_coverage must be a percentage: {}",
                self.desired_coverage
            ));
        }
        if self.max_run_time_sec == 0 {
            return Err(anyhow!("generation.max_run_time_sec must be positive"));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tests_per_run: 4,
            max_iterations: 5,
            desired_coverage: 70.0,
            max_run_time_sec: 30,
            additional_instructions: String::new(),
        }
    }
}

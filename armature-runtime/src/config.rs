use std::path::Path;
use std::time::Duration;

use armature_core::algorithm::ik::{DEFAULT_PASSES, DEFAULT_THRESHOLD};
use armature_core::chain::{REFERENCE_BASE, REFERENCE_LINKS};

/// Read and deserialize a TOML configuration file.
pub fn from_file<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> crate::Result<T> {
    let contents = std::fs::read_to_string(path)?;

    Ok(toml::from_str(&contents)?)
}

/// Arm geometry.
#[derive(Clone, Debug, serde_derive::Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ArmConfig {
    /// Fixed anchor of the first link.
    pub base: [f32; 2],
    /// Link lengths from base to tip.
    pub links: Vec<f32>,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            base: [REFERENCE_BASE.0, REFERENCE_BASE.1],
            links: REFERENCE_LINKS.to_vec(),
        }
    }
}

/// Inverse kinematics solver parameters.
#[derive(Clone, Debug, serde_derive::Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Refinement passes per tick.
    pub passes: u32,
    /// End effector distance at which the solver stops.
    pub threshold: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Initial motion input.
#[derive(Clone, Debug, serde_derive::Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    /// Initial step factor.
    pub step_factor: f32,
    /// Lower bound of the step factor.
    pub step_factor_min: f32,
    /// Upper bound of the step factor.
    pub step_factor_max: f32,
    /// Initial target.
    pub target: [f32; 2],
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            step_factor: 0.03,
            step_factor_min: 0.01,
            step_factor_max: 0.1,
            target: [200.0, 0.0],
        }
    }
}

#[derive(Clone, Debug, serde_derive::Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Tick interval in milliseconds.
    pub interval: u64,
    /// Number of ticks to run. Zero runs until shutdown.
    pub ticks: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            interval: crate::consts::DEFAULT_TICK_INTERVAL.as_millis() as u64,
            ticks: 0,
        }
    }
}

/// Armature configuration.
#[derive(Clone, Debug, Default, serde_derive::Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Arm configuration.
    pub arm: ArmConfig,
    /// Solver configuration.
    pub solver: SolverConfig,
    /// Motion configuration.
    pub motion: MotionConfig,
    /// Runtime configuration.
    pub runtime: RuntimeConfig,
}

impl Config {
    /// Check the values that deserialization cannot.
    ///
    /// Link lengths are checked when the arm is constructed.
    pub fn validate(&self) -> crate::Result {
        let (min, max) = (self.motion.step_factor_min, self.motion.step_factor_max);
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min > max {
            return Err(crate::Error::StepRange { min, max });
        }

        let threshold = self.solver.threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(crate::Error::Threshold(threshold));
        }

        Ok(())
    }

    /// Tick interval, bounded to a sane range.
    pub fn interval(&self) -> Duration {
        let millis = self.runtime.interval.clamp(
            crate::consts::TICK_INTERVAL_MIN.as_millis() as u64,
            crate::consts::TICK_INTERVAL_MAX.as_millis() as u64,
        );

        Duration::from_millis(millis)
    }

    /// Tick limit, if any.
    pub fn tick_limit(&self) -> Option<u64> {
        if self.runtime.ticks > 0 {
            Some(self.runtime.ticks)
        } else {
            None
        }
    }
}

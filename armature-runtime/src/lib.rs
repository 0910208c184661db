// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

/// The `armature` library drives a planar link chain towards a moving target.
///
/// The kinematics live in `armature-core`, re-exported here as `core`. This
/// library wraps them in a `Simulation` that owns the chain, the target and
/// the step factor, and exposes `set_target`, `set_step_factor` and `tick` as
/// its only mutators.
///
/// The `runtime` module provides the fixed rate scheduler that calls `tick`
/// and the shutdown signal shared between tasks. The `input` module parses
/// line commands that replace the target and the step factor between ticks.
/// The `config` module loads the TOML configuration and the `logger` module
/// provides a logger for running under systemd.
pub mod config;
pub mod input;
pub mod logger;
pub mod runtime;
pub mod simulation;

mod error;

#[macro_use]
extern crate log;

pub use armature_core as core;

pub use self::config::{from_file, Config};
pub use self::error::Error;
pub use self::simulation::{Frame, Simulation};

pub type Result<T = ()> = std::result::Result<T, Error>;

/// Armature runtime module containing various constants.
pub mod consts {
    use std::time::Duration;

    /// Armature runtime version.
    ///
    /// # Example
    ///
    /// ```
    /// use armature::consts::VERSION;
    ///
    /// println!("Armature runtime version: {}", VERSION);
    /// ```
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Default tick interval.
    ///
    /// # Example
    ///
    /// ```
    /// use armature::consts::DEFAULT_TICK_INTERVAL;
    ///
    /// assert_eq!(DEFAULT_TICK_INTERVAL.as_millis(), 20);
    /// ```
    ///
    /// # Remarks
    ///
    /// One solve and one forward kinematics pass run per tick. At 20ms the
    /// arm is updated 50 times per second.
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(20);

    /// Shortest accepted tick interval.
    pub const TICK_INTERVAL_MIN: Duration = Duration::from_millis(1);

    /// Longest accepted tick interval.
    pub const TICK_INTERVAL_MAX: Duration = Duration::from_millis(1_000);

    /// Maximum length of a single command line.
    ///
    /// # Remarks
    ///
    /// Longer lines are discarded by the command reader.
    pub const COMMAND_LINE_MAX: usize = 256;
}

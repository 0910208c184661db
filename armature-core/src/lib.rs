// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

//! Kinematics for a planar, fixed-base link chain.
//!
//! The crate contains no I/O and no clock. A caller owns a [`LinkChain`], feeds
//! a target and a step factor to [`InverseKinematics::solve`] once per tick and
//! reads back the [`JointPositions`] for rendering.

pub mod algorithm;
pub mod chain;
pub mod geometry;

pub use nalgebra;

pub use algorithm::fk::{ForwardKinematics, JointPositions};
pub use algorithm::ik::{IkReport, InverseKinematics};
pub use chain::{ChainError, LinkChain};

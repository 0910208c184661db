use std::ops::RangeInclusive;

use armature_core::nalgebra::Point2;
use armature_core::{IkReport, InverseKinematics, JointPositions, LinkChain};

use crate::config::Config;

/// Snapshot of the arm after a tick.
#[derive(Clone, Debug, serde_derive::Serialize)]
pub struct Frame {
    /// Number of ticks completed.
    pub iteration: u64,
    /// Target the solver was steering towards.
    pub target: Point2<f32>,
    /// Joint positions from base to end effector.
    pub positions: JointPositions,
    /// Joint angles in radians.
    pub angles: Vec<f32>,
    /// Solver outcome of the last tick, if any tick ran.
    pub report: Option<IkReport>,
}

impl Frame {
    /// Joint angles in degrees. Values are not wrapped.
    pub fn angles_degrees(&self) -> Vec<f32> {
        self.angles.iter().map(|theta| theta.to_degrees()).collect()
    }

    /// Per joint display labels, such as `J0: 12.3°`.
    pub fn labels(&self) -> Vec<String> {
        self.angles
            .iter()
            .enumerate()
            .map(|(idx, theta)| format!("J{}: {:.1}°", idx, theta.to_degrees()))
            .collect()
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let effector = self.positions.end_effector();

        write!(
            f,
            "Tick {:>6}  {}  Effector [{:.2}, {:.2}]  Target [{:.2}, {:.2}]",
            self.iteration,
            self.labels().join(" "),
            effector.x,
            effector.y,
            self.target.x,
            self.target.y
        )?;

        if let Some(report) = &self.report {
            write!(f, "  {}", report)?;
        }

        Ok(())
    }
}

/// Arm tracking state.
///
/// The target and the step factor may be replaced at any time between ticks.
/// The joint angles only change on `tick`.
pub struct Simulation {
    chain: LinkChain,
    solver: InverseKinematics,
    target: Point2<f32>,
    step_factor: f32,
    step_range: RangeInclusive<f32>,
    iteration: u64,
    last_report: Option<IkReport>,
}

impl Simulation {
    /// Construct a new simulation.
    ///
    /// The step factor is clamped into the step range.
    pub fn new(
        chain: LinkChain,
        solver: InverseKinematics,
        target: Point2<f32>,
        step_factor: f32,
        step_range: RangeInclusive<f32>,
    ) -> Self {
        let step_factor = step_factor
            .max(*step_range.start())
            .min(*step_range.end());

        Self {
            chain,
            solver,
            target,
            step_factor,
            step_range,
            iteration: 0,
            last_report: None,
        }
    }

    /// Construct the simulation from configuration.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        config.validate()?;

        let chain = LinkChain::new(
            Point2::new(config.arm.base[0], config.arm.base[1]),
            config.arm.links.clone(),
        )?;

        let solver = InverseKinematics::new(config.solver.passes, config.solver.threshold);

        Ok(Self::new(
            chain,
            solver,
            Point2::new(config.motion.target[0], config.motion.target[1]),
            config.motion.step_factor,
            config.motion.step_factor_min..=config.motion.step_factor_max,
        ))
    }

    #[inline]
    pub fn chain(&self) -> &LinkChain {
        &self.chain
    }

    #[inline]
    pub fn solver(&self) -> &InverseKinematics {
        &self.solver
    }

    #[inline]
    pub fn target(&self) -> Point2<f32> {
        self.target
    }

    #[inline]
    pub fn step_factor(&self) -> f32 {
        self.step_factor
    }

    #[inline]
    pub fn step_range(&self) -> &RangeInclusive<f32> {
        &self.step_range
    }

    /// Number of ticks completed.
    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Replace the target.
    pub fn set_target(&mut self, target: Point2<f32>) {
        if !(target.x.is_finite() && target.y.is_finite()) {
            warn!("Ignoring non-finite target ({}, {})", target.x, target.y);
            return;
        }

        if !self.chain.is_reachable(&target) {
            debug!(
                "Target ({:.2}, {:.2}) is out of reach",
                target.x, target.y
            );
        }

        self.target = target;
    }

    /// Replace the step factor.
    ///
    /// Values outside the step range are clamped. Returns the step factor in
    /// effect after the call.
    pub fn set_step_factor(&mut self, step_factor: f32) -> f32 {
        if !step_factor.is_finite() {
            warn!("Ignoring non-finite step factor");
            return self.step_factor;
        }

        let clamped = step_factor
            .max(*self.step_range.start())
            .min(*self.step_range.end());
        if clamped != step_factor {
            warn!(
                "Step factor {} out of range, clamped to {}",
                step_factor, clamped
            );
        }

        self.step_factor = clamped;
        self.step_factor
    }

    /// Run one solve and return the resulting frame.
    pub fn tick(&mut self) -> Frame {
        let report = self
            .solver
            .solve(&self.target, &mut self.chain, self.step_factor);

        self.iteration += 1;
        self.last_report = Some(report);

        self.frame()
    }

    /// Current state without advancing the simulation.
    pub fn frame(&self) -> Frame {
        Frame {
            iteration: self.iteration,
            target: self.target,
            positions: self.chain.joint_positions(),
            angles: self.chain.angles().to_vec(),
            report: self.last_report,
        }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("chain", &self.chain)
            .field("target", &self.target)
            .field("step_factor", &self.step_factor)
            .field("iteration", &self.iteration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation() -> Simulation {
        Simulation::from_config(&Config::default()).unwrap()
    }

    #[test]
    fn test_from_config() {
        let simulation = simulation();

        assert_eq!(simulation.chain().len(), 3);
        assert_eq!(simulation.target(), Point2::new(200.0, 0.0));
        assert_eq!(simulation.step_factor(), 0.03);
        assert_eq!(simulation.iteration(), 0);
        assert!(simulation.frame().report.is_none());
    }

    #[test]
    fn test_from_invalid_config() {
        let mut config = Config::default();
        config.arm.links = vec![100.0, -80.0];

        assert!(matches!(
            Simulation::from_config(&config),
            Err(crate::Error::Chain(_))
        ));
    }

    #[test]
    fn test_step_factor_clamped() {
        let mut simulation = simulation();

        assert_eq!(simulation.set_step_factor(0.05), 0.05);
        assert_eq!(simulation.set_step_factor(0.5), 0.1);
        assert_eq!(simulation.set_step_factor(0.0), 0.01);
        assert_eq!(simulation.set_step_factor(f32::NAN), 0.01);
        assert_eq!(simulation.step_factor(), 0.01);
    }

    #[test]
    fn test_non_finite_target_ignored() {
        let mut simulation = simulation();

        simulation.set_target(Point2::new(f32::INFINITY, 0.0));
        assert_eq!(simulation.target(), Point2::new(200.0, 0.0));
    }

    #[test]
    fn test_tick_tracks_target() {
        let mut simulation = simulation();
        simulation.set_target(Point2::new(400.0, 400.0));

        let mut frame = simulation.tick();
        for _ in 0..100 {
            frame = simulation.tick();
        }

        assert_eq!(frame.iteration, 101);
        assert_eq!(frame.positions.len(), 4);
        assert_eq!(frame.angles.len(), 3);
        assert!(frame.report.is_some_and(|report| report.converged));
        assert!(frame.positions.distance_to(&Point2::new(400.0, 400.0)) < 1.0);
    }

    #[test]
    fn test_retarget_between_ticks() {
        let mut simulation = simulation();

        simulation.set_target(Point2::new(400.0, 400.0));
        for _ in 0..100 {
            simulation.tick();
        }

        simulation.set_target(Point2::new(300.0, 100.0));
        let frame = simulation.tick();
        assert!(frame.report.is_some_and(|report| !report.converged));
        assert_eq!(frame.target, Point2::new(300.0, 100.0));

        for _ in 0..200 {
            simulation.tick();
        }
        assert!(simulation.frame().report.is_some_and(|report| report.converged));
    }

    #[test]
    fn test_frame_labels() {
        let simulation = simulation();
        let frame = simulation.frame();

        assert_eq!(frame.labels(), vec!["J0: 0.0°", "J1: 0.0°", "J2: 0.0°"]);
        assert_eq!(frame.angles_degrees(), vec![0.0, 0.0, 0.0]);
        assert_eq!(
            frame.to_string(),
            "Tick      0  J0: 0.0° J1: 0.0° J2: 0.0°  Effector [540.00, 300.00]  Target [200.00, 0.00]"
        );
    }

    #[test]
    fn test_frame_serialize() {
        let frame = simulation().frame();

        let value = serde_json::to_value(&frame).unwrap();

        assert_eq!(value["iteration"], 0);
        assert_eq!(value["positions"].as_array().map(|v| v.len()), Some(4));
        assert_eq!(value["angles"].as_array().map(|v| v.len()), Some(3));
        assert!(value["report"].is_null());
    }
}

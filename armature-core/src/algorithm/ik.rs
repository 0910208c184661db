use nalgebra::Point2;

use crate::chain::LinkChain;
use crate::geometry::heading;

/// Default number of refinement passes per solve.
pub const DEFAULT_PASSES: u32 = 10;
/// Default end effector distance below which the solver stops.
pub const DEFAULT_THRESHOLD: f32 = 1.0;

/// Outcome of a single solve.
///
/// The solver never fails. An unreachable target simply exhausts the pass
/// budget, which shows up here as a large residual.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct IkReport {
    /// Number of refinement passes performed.
    pub passes: u32,
    /// End effector distance to the target after the solve.
    pub residual: f32,
    /// Whether the residual is below the threshold.
    pub converged: bool,
}

impl std::fmt::Display for IkReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} after {} passes; residual {:.2}",
            if self.converged {
                "Converged"
            } else {
                "Converging"
            },
            self.passes,
            self.residual
        )
    }
}

/// Cyclic coordinate descent solver.
///
/// Every pass sweeps the joints from tip to base. Each joint is turned by a
/// fraction of the angle between the end effector and the target as seen from
/// that joint. All joints in a pass use the positions from the start of the
/// pass.
///
/// The angle is the plain difference of the two headings and is not wrapped.
/// When the headings straddle the negative x axis of a joint the correction
/// takes the long way round.
#[derive(Clone, Copy, Debug)]
pub struct InverseKinematics {
    passes: u32,
    threshold: f32,
}

impl Default for InverseKinematics {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl InverseKinematics {
    pub fn new(passes: u32, threshold: f32) -> Self {
        Self { passes, threshold }
    }

    #[inline]
    pub fn passes(&self) -> u32 {
        self.passes
    }

    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Move the end effector of the chain towards the target.
    ///
    /// The joint angles of the chain are updated in place. The step factor
    /// scales each angular correction.
    pub fn solve(
        &self,
        target: &Point2<f32>,
        chain: &mut LinkChain,
        step_factor: f32,
    ) -> IkReport {
        let mut passes = 0;

        for _ in 0..self.passes {
            let joints = chain.joint_positions();
            let effector = joints.end_effector();

            if nalgebra::distance(&effector, target) < self.threshold {
                break;
            }

            let angles = chain.angles_mut();

            for idx in (0..angles.len()).rev() {
                let joint = joints[idx];

                let error = heading(&joint, target) - heading(&joint, &effector);

                angles[idx] += error * step_factor;
            }

            passes += 1;
        }

        let residual = nalgebra::distance(&chain.end_effector(), target);

        IkReport {
            passes,
            residual,
            converged: residual < self.threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn solve_ticks(
        chain: &mut LinkChain,
        target: Point2<f32>,
        step: f32,
        ticks: usize,
    ) -> IkReport {
        let solver = InverseKinematics::default();

        let mut report = solver.solve(&target, chain, step);
        for _ in 1..ticks {
            report = solver.solve(&target, chain, step);
        }
        report
    }

    #[test]
    fn test_fully_extended_target() {
        let mut chain = LinkChain::reference();
        let target = Point2::new(540.0, 300.0);

        let report = solve_ticks(&mut chain, target, 0.03, 100);

        assert_eq!(chain.angles(), &[0.0, 0.0, 0.0]);
        assert_eq!(report.passes, 0);
        assert!(report.converged);
        assert!(report.residual < 1e-3);
    }

    #[test]
    fn test_start_of_pass_positions() {
        let mut chain = LinkChain::new(Point2::new(0.0, 0.0), vec![1.0, 1.0]).unwrap();
        let solver = InverseKinematics::new(1, 1e-3);

        let report = solver.solve(&Point2::new(1.0, 1.0), &mut chain, 1.0);

        let tolerance = 1e-5;
        assert_eq!(report.passes, 1);
        assert!((chain.angles()[1] - FRAC_PI_2).abs() < tolerance);
        assert!((chain.angles()[0] - FRAC_PI_4).abs() < tolerance);
    }

    #[test]
    fn test_step_factor_scales_correction() {
        let mut chain = LinkChain::new(Point2::new(0.0, 0.0), vec![1.0, 1.0]).unwrap();
        let solver = InverseKinematics::new(1, 1e-3);

        solver.solve(&Point2::new(1.0, 1.0), &mut chain, 0.1);

        let tolerance = 1e-5;
        assert!((chain.angles()[1] - FRAC_PI_2 * 0.1).abs() < tolerance);
        assert!((chain.angles()[0] - FRAC_PI_4 * 0.1).abs() < tolerance);
    }

    #[test]
    fn test_correction_is_raw_heading_difference() {
        // Joint at 170 degrees, target at -169 degrees. The headings straddle 180.
        let mut chain = LinkChain::new(Point2::new(0.0, 0.0), vec![1.0]).unwrap();
        let solver = InverseKinematics::new(1, 1e-3);

        let theta = 170.0_f32.to_radians();
        chain.angles_mut()[0] = theta;
        solver.solve(&Point2::new(-1.0, -0.2), &mut chain, 0.03);

        let error = (-0.2_f32).atan2(-1.0) - theta.sin().atan2(theta.cos());
        let expected = theta + error * 0.03;

        let tolerance = 1e-4;
        assert!((chain.angles()[0] - expected).abs() < tolerance);
        assert!((chain.angles()[0].to_degrees() - 159.84).abs() < 0.01);
    }

    #[test]
    fn test_reachable_targets_converge() {
        let targets = [
            Point2::new(400.0, 400.0),
            Point2::new(450.0, 350.0),
            Point2::new(300.0, 450.0),
            Point2::new(380.0, 220.0),
            Point2::new(300.0, 100.0),
        ];

        for target in targets {
            let mut chain = LinkChain::reference();
            assert!(chain.is_reachable(&target));

            let report = solve_ticks(&mut chain, target, 0.03, 200);

            assert!(report.converged, "target {:?} residual {}", target, report.residual);
            assert!(chain.joint_positions().distance_to(&target) < 1.0);
        }
    }

    #[test]
    fn test_distance_non_increasing() {
        let solver = InverseKinematics::default();
        let target = Point2::new(400.0, 400.0);

        let mut chain = LinkChain::reference();
        let mut last = nalgebra::distance(&chain.end_effector(), &target);

        for _ in 0..200 {
            let report = solver.solve(&target, &mut chain, 0.03);
            assert!(report.residual <= last + 1e-3);

            last = report.residual;
            if report.converged {
                break;
            }
        }

        assert!(last < solver.threshold());
    }

    #[test]
    fn test_converged_is_stable() {
        let solver = InverseKinematics::default();
        let target = Point2::new(400.0, 400.0);

        let mut chain = LinkChain::reference();
        solve_ticks(&mut chain, target, 0.03, 200);

        let settled = chain.angles().to_vec();

        for _ in 0..50 {
            let report = solver.solve(&target, &mut chain, 0.03);
            assert_eq!(report.passes, 0);
        }

        for (before, after) in settled.iter().zip(chain.angles()) {
            assert!((before - after).abs() < 1e-6);
        }
    }

    #[test]
    fn test_unreachable_target_is_bounded() {
        let targets = [
            Point2::new(300.0, 1000.0),
            Point2::new(100.0, 600.0),
            Point2::new(200.0, 0.0),
            Point2::new(1000.0, 300.0),
        ];

        for target in targets {
            let mut chain = LinkChain::reference();
            assert!(!chain.is_reachable(&target));

            let solver = InverseKinematics::default();

            let mut report = solver.solve(&target, &mut chain, 0.1);
            assert_eq!(report.passes, solver.passes());

            for _ in 0..1_000 {
                report = solver.solve(&target, &mut chain, 0.1);

                assert!(chain.angles().iter().all(|theta| theta.is_finite()));
                assert!(chain
                    .joint_positions()
                    .iter()
                    .all(|point| point.x.is_finite() && point.y.is_finite()));

                let extension = nalgebra::distance(&chain.base(), &chain.end_effector());
                assert!(extension <= chain.max_reach() + 1e-3);
            }

            assert!(!report.converged);

            let extension = nalgebra::distance(&chain.base(), &chain.end_effector());
            assert!(extension > chain.max_reach() - 1.0);
        }
    }

    #[test]
    fn test_unreachable_target_behind_base() {
        // Seen from the base this target lies on the heading seam, so the arm
        // keeps swinging instead of stretching out. It must stay finite.
        let mut chain = LinkChain::reference();
        let target = Point2::new(-500.0, 300.0);
        let solver = InverseKinematics::default();

        for _ in 0..1_000 {
            let report = solver.solve(&target, &mut chain, 0.1);

            assert!(!report.converged);
            assert!(report.residual.is_finite());
            assert!(chain.angles().iter().all(|theta| theta.is_finite()));

            let extension = nalgebra::distance(&chain.base(), &chain.end_effector());
            assert!(extension <= chain.max_reach() + 1e-3);
        }
    }

    #[test]
    fn test_target_at_base() {
        let mut chain = LinkChain::reference();
        let target = Point2::new(300.0, 300.0);

        let report = solve_ticks(&mut chain, target, 0.03, 500);

        assert!(chain.angles().iter().all(|theta| theta.is_finite()));
        assert!(report.residual.is_finite());
        assert!(report.residual < chain.max_reach());
        assert!(report.converged);
    }

    #[test]
    fn test_report_display() {
        let report = IkReport {
            passes: 10,
            residual: 76.228,
            converged: false,
        };

        assert_eq!(report.to_string(), "Converging after 10 passes; residual 76.23");
    }
}

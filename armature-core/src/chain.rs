use nalgebra::Point2;

use crate::algorithm::fk::{ForwardKinematics, JointPositions};

/// Base position of the reference arm.
pub const REFERENCE_BASE: (f32, f32) = (300.0, 300.0);
/// Link lengths of the reference arm, from base to tip.
pub const REFERENCE_LINKS: [f32; 3] = [100.0, 80.0, 60.0];

#[derive(Debug, Clone, PartialEq)]
pub enum ChainError {
    /// The chain has no links.
    Empty,
    /// A link length is not a finite positive number.
    InvalidLength { index: usize, length: f32 },
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::Empty => write!(f, "link chain has no links"),
            ChainError::InvalidLength { index, length } => {
                write!(f, "link {} has invalid length {}", index, length)
            }
        }
    }
}

impl std::error::Error for ChainError {}

/// Planar chain of rigid links anchored at a fixed base.
///
/// Link lengths are fixed on construction. Joint angles start at zero and
/// are only changed by the inverse kinematics solver.
#[derive(Clone, PartialEq)]
pub struct LinkChain {
    base: Point2<f32>,
    lengths: Vec<f32>,
    angles: Vec<f32>,
}

impl LinkChain {
    /// Construct a new chain with all joints at zero.
    pub fn new(base: Point2<f32>, lengths: Vec<f32>) -> Result<Self, ChainError> {
        if lengths.is_empty() {
            return Err(ChainError::Empty);
        }

        if let Some((index, length)) = lengths
            .iter()
            .enumerate()
            .find(|(_, length)| !length.is_finite() || **length <= 0.0)
        {
            return Err(ChainError::InvalidLength {
                index,
                length: *length,
            });
        }

        let angles = vec![0.0; lengths.len()];

        Ok(Self {
            base,
            lengths,
            angles,
        })
    }

    /// The three link arm with a base at (300, 300).
    pub fn reference() -> Self {
        Self {
            base: Point2::new(REFERENCE_BASE.0, REFERENCE_BASE.1),
            lengths: REFERENCE_LINKS.to_vec(),
            angles: vec![0.0; REFERENCE_LINKS.len()],
        }
    }

    /// Number of links, equal to the number of joints.
    #[inline]
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    #[inline]
    pub fn base(&self) -> Point2<f32> {
        self.base
    }

    #[inline]
    pub fn lengths(&self) -> &[f32] {
        &self.lengths
    }

    /// Joint angles in radians, relative to the preceding link.
    #[inline]
    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    #[inline]
    pub(crate) fn angles_mut(&mut self) -> &mut [f32] {
        &mut self.angles
    }

    /// Joint angles in degrees. Values are not wrapped.
    pub fn angles_degrees(&self) -> Vec<f32> {
        self.angles.iter().map(|theta| theta.to_degrees()).collect()
    }

    /// Distance from the base to the end effector with all links extended.
    pub fn max_reach(&self) -> f32 {
        self.lengths.iter().sum()
    }

    /// Smallest distance from the base the end effector can reach.
    pub fn min_reach(&self) -> f32 {
        let longest = self.lengths.iter().copied().fold(0.0, f32::max);

        (2.0 * longest - self.max_reach()).max(0.0)
    }

    /// Whether a point lies within the reachable annulus around the base.
    pub fn is_reachable(&self, point: &Point2<f32>) -> bool {
        let distance = nalgebra::distance(&self.base, point);

        distance >= self.min_reach() && distance <= self.max_reach()
    }

    /// Forward kinematics at the current joint angles.
    pub fn joint_positions(&self) -> JointPositions {
        ForwardKinematics::new(self.base, &self.lengths).solve(&self.angles)
    }

    #[inline]
    pub fn end_effector(&self) -> Point2<f32> {
        self.joint_positions().end_effector()
    }
}

impl std::fmt::Display for LinkChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let point = self.end_effector();

        write!(f, "[{:.2}, {:.2}]", point.x, point.y)
    }
}

impl std::fmt::Debug for LinkChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let point = self.end_effector();

        let mut s = String::new();

        for (idx, theta) in self.angles.iter().enumerate() {
            s.push_str(&format!(
                "J{}={:.2}rad/{:5.2}° ",
                idx,
                theta,
                theta.to_degrees()
            ));
        }

        write!(f, "{s} Endpoint [{:.2}, {:.2}]", point.x, point.y)
    }
}

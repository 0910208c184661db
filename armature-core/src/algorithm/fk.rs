use nalgebra::{Point2, Vector2};

/// Planar forward kinematics over a borrowed set of link lengths.
///
/// Joint angles are relative: each link is rotated by the sum of its own
/// joint angle and all preceding ones.
pub struct ForwardKinematics<'a> {
    base: Point2<f32>,
    lengths: &'a [f32],
}

impl<'a> ForwardKinematics<'a> {
    pub fn new(base: Point2<f32>, lengths: &'a [f32]) -> Self {
        Self { base, lengths }
    }

    /// Compute the position of every joint, starting with the base.
    ///
    /// The result has one point more than there are links. When the number
    /// of angles and lengths differ, the surplus of either is ignored.
    pub fn solve(&self, angles: &[f32]) -> JointPositions {
        let mut points = Vec::with_capacity(self.lengths.len() + 1);
        points.push(self.base);

        let mut cumulative_angle = 0.0_f32;
        let mut point = self.base;

        for (length, theta) in self.lengths.iter().zip(angles) {
            cumulative_angle += *theta;

            point += Vector2::new(cumulative_angle.cos(), cumulative_angle.sin()) * *length;
            points.push(point);
        }

        JointPositions(points)
    }
}

/// Ordered joint positions from the base to the end effector.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct JointPositions(Vec<Point2<f32>>);

impl JointPositions {
    /// Fixed anchor of the first link.
    #[inline]
    pub fn base(&self) -> Point2<f32> {
        self.0[0]
    }

    /// Free endpoint of the last link.
    #[inline]
    pub fn end_effector(&self) -> Point2<f32> {
        self.0[self.0.len() - 1]
    }

    /// Number of points, which is the number of links plus one.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Point2<f32>] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point2<f32>> {
        self.0.iter()
    }

    /// Link segments as `(start, end)` pairs, in chain order.
    pub fn segments(&self) -> impl Iterator<Item = (&Point2<f32>, &Point2<f32>)> {
        self.0.iter().zip(self.0.iter().skip(1))
    }

    /// Distance from the end effector to a point.
    #[inline]
    pub fn distance_to(&self, point: &Point2<f32>) -> f32 {
        nalgebra::distance(&self.end_effector(), point)
    }
}

impl std::ops::Index<usize> for JointPositions {
    type Output = Point2<f32>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a JointPositions {
    type Item = &'a Point2<f32>;
    type IntoIter = std::slice::Iter<'a, Point2<f32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for JointPositions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, point) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, " ⇒ ")?;
            }
            write!(f, "[{:.2}, {:.2}]", point.x, point.y)?;
        }

        Ok(())
    }
}

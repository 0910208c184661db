use nalgebra::Point2;

/// Heading of the vector from `from` to `to` in the global frame.
///
/// The result lies in `(-PI, PI]`. Coincident points yield `0.0`, as
/// `atan2(0, 0)` does.
#[inline]
pub fn heading(from: &Point2<f32>, to: &Point2<f32>) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

//! Points, time bonus and the upright check.
//!
//! The upright check converts the orientation to XYZ Euler angles
//! (`glam::EulerRot::XYZ`): the first and third angles lie in (-π, π], the
//! middle one in [-π/2, π/2]. An orientation passes when every angle is
//! strictly inside the tolerance. Orientations equal to the identity whose
//! decomposition is not near zero per axis are judged by their decomposition.

use glam::{EulerRot, Quat, Vec3};

/// Points for a pass `since_last_pass` seconds after the previous one.
pub fn pass_points(since_last_pass: f32) -> u32 {
    let t = since_last_pass.max(0.0) as f64;
    100 + (300.0 * 0.9f64.powf(t)).floor() as u32
}

/// Seconds added to the countdown after a pass bringing the score to `score`.
pub fn time_bonus(score: u32) -> f32 {
    if score > 1000 {
        5000.0 / score as f32
    } else {
        5.0
    }
}

pub fn euler_xyz(q: Quat) -> Vec3 {
    let (x, y, z) = q.to_euler(EulerRot::XYZ);
    Vec3::new(x, y, z)
}

/// Every component strictly within `tolerance_rad` of zero.
pub fn within_tolerance(euler: Vec3, tolerance_rad: f32) -> bool {
    euler.abs().cmplt(Vec3::splat(tolerance_rad)).all()
}

pub fn orientation_passes(q: Quat, tolerance_deg: f32) -> bool {
    within_tolerance(euler_xyz(q), tolerance_deg.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_points() {
        assert_eq!(pass_points(0.0), 400);
        assert_eq!(pass_points(1.0), 370);
        assert_eq!(pass_points(10.0), 204);
        assert_eq!(pass_points(1000.0), 100);
    }

    #[test]
    fn test_score_never_decreases() {
        let mut score = 0u32;
        for t in [0.0, 3.5, 0.2, 90.0, 12.0, 0.0] {
            let before = score;
            score += pass_points(t);
            assert!(score >= before + 100);
        }
    }

    #[test]
    fn test_time_bonus() {
        assert_eq!(time_bonus(400), 5.0);
        assert_eq!(time_bonus(1000), 5.0);
        assert_eq!(time_bonus(2000), 2.5);
    }

    #[test]
    fn test_tolerance_boundary() {
        let one = 1f32.to_radians();
        assert!(!within_tolerance(Vec3::splat(one), one));
        assert!(!within_tolerance(Vec3::new(0.0, -one, 0.0), one));
        assert!(within_tolerance(Vec3::splat(0.5f32.to_radians()), one));
        assert!(within_tolerance(Vec3::ZERO, one));
    }

    #[test]
    fn test_orientation_passes() {
        assert!(orientation_passes(Quat::IDENTITY, 1.0));
        assert!(orientation_passes(-Quat::IDENTITY, 1.0));
        assert!(orientation_passes(Quat::from_rotation_x(0.5f32.to_radians()), 1.0));
        assert!(!orientation_passes(Quat::from_rotation_y(2f32.to_radians()), 1.0));
        assert!(!orientation_passes(Quat::from_rotation_z(90f32.to_radians()), 1.0));
    }
}

//! Quarter-turn animation for the falling shape.

use glam::{Quat, Vec3};

/// Degrees per committed turn.
pub const TURN_GOAL_DEG: f32 = 90.0;

/// The six signed world axes a turn can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnAxis {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl TurnAxis {
    pub const ALL: [TurnAxis; 6] = [
        TurnAxis::PosX,
        TurnAxis::NegX,
        TurnAxis::PosY,
        TurnAxis::NegY,
        TurnAxis::PosZ,
        TurnAxis::NegZ,
    ];

    pub fn vector(self) -> Vec3 {
        match self {
            TurnAxis::PosX => Vec3::X,
            TurnAxis::NegX => Vec3::NEG_X,
            TurnAxis::PosY => Vec3::Y,
            TurnAxis::NegY => Vec3::NEG_Y,
            TurnAxis::PosZ => Vec3::Z,
            TurnAxis::NegZ => Vec3::NEG_Z,
        }
    }

    /// The exact quarter turn about this axis.
    pub fn quarter_turn(self) -> Quat {
        Quat::from_axis_angle(self.vector(), TURN_GOAL_DEG.to_radians())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RotationState {
    #[default]
    Idle,
    Rotating {
        axis: TurnAxis,
        /// Degrees applied so far, below the goal.
        current_deg: f32,
        /// Orientation when the turn was committed.
        start: Quat,
    },
}

impl RotationState {
    #[inline]
    pub fn is_rotating(&self) -> bool {
        matches!(self, RotationState::Rotating { .. })
    }

    /// Commit a turn starting from `orientation`. Refused while a turn animates.
    pub fn begin(&mut self, axis: TurnAxis, orientation: Quat) -> bool {
        if self.is_rotating() {
            return false;
        }
        *self = RotationState::Rotating {
            axis,
            current_deg: 0.0,
            start: orientation,
        };
        true
    }

    /// Advance the turn by `dt` seconds at `rate_deg` degrees per second,
    /// pre-multiplying the step onto `orientation`. The final step lands
    /// exactly on the quarter turn from the starting orientation. Returns
    /// `true` on the frame the turn completes.
    pub fn step(&mut self, dt: f32, rate_deg: f32, orientation: &mut Quat) -> bool {
        let RotationState::Rotating {
            axis,
            current_deg,
            start,
        } = *self
        else {
            return false;
        };

        let delta = rate_deg * dt;
        if current_deg + delta >= TURN_GOAL_DEG {
            *orientation = axis.quarter_turn() * start;
            *self = RotationState::Idle;
            return true;
        }

        *orientation = (Quat::from_axis_angle(axis.vector(), delta.to_radians()) * *orientation)
            .normalize();
        *self = RotationState::Rotating {
            axis,
            current_deg: current_deg + delta,
            start,
        };
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(state: &mut RotationState, q: &mut Quat, dts: &[f32], rate: f32) -> usize {
        dts.iter().filter(|&&dt| state.step(dt, rate, q)).count()
    }

    #[test]
    fn test_lands_exactly_on_quarter_turn() {
        let start = Quat::from_rotation_y(std::f32::consts::PI);
        let fragmentations: [&[f32]; 4] = [
            &[0.5],
            &[0.1; 6],
            &[0.013, 0.2, 0.0007, 0.3, 0.01, 0.2],
            &[1.0 / 60.0; 40],
        ];

        for dts in fragmentations {
            let mut q = start;
            let mut state = RotationState::Idle;
            assert!(state.begin(TurnAxis::NegZ, q));
            assert_eq!(drive(&mut state, &mut q, dts, 180.0), 1);
            assert_eq!(state, RotationState::Idle);
            assert_eq!(q, TurnAxis::NegZ.quarter_turn() * start);
        }
    }

    #[test]
    fn test_no_new_turn_while_rotating() {
        let mut q = Quat::IDENTITY;
        let mut state = RotationState::Idle;
        assert!(state.begin(TurnAxis::PosX, q));
        state.step(0.1, 180.0, &mut q);
        assert!(!state.begin(TurnAxis::PosY, q));

        let RotationState::Rotating { axis, current_deg, .. } = state else {
            panic!("turn should still be animating");
        };
        assert_eq!(axis, TurnAxis::PosX);
        assert!((current_deg - 18.0).abs() < 1e-4);
    }

    #[test]
    fn test_partial_step_moves_toward_goal() {
        let mut q = Quat::IDENTITY;
        let mut state = RotationState::Idle;
        state.begin(TurnAxis::PosY, q);
        assert!(!state.step(0.25, 180.0, &mut q));

        let expected = Quat::from_rotation_y(45f32.to_radians());
        assert!(q.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_idle_step_is_noop() {
        let mut q = Quat::from_rotation_x(0.3);
        let mut state = RotationState::Idle;
        assert!(!state.step(1.0, 180.0, &mut q));
        assert_eq!(q, Quat::from_rotation_x(0.3));
    }

    #[test]
    fn test_four_turns_return_home() {
        let mut q = Quat::IDENTITY;
        let mut state = RotationState::Idle;
        for _ in 0..4 {
            state.begin(TurnAxis::PosX, q);
            drive(&mut state, &mut q, &[0.2, 0.2, 0.2], 180.0);
        }
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-5) || q.abs_diff_eq(-Quat::IDENTITY, 1e-5));
    }
}

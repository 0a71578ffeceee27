//! Symmetric drag + acceleration integration

use glam::Vec2;

/// Cartesian motion state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Fraction of velocity lost per second, in [0, 1)
    pub drag: f32,
}

/// Polar motion around a pivot.
///
/// `velocity.x` is angular speed in degrees per second (positive turns the
/// offset clockwise on a y-down screen), `velocity.y` is radial speed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpiralState {
    pub pivot: Vec2,
    pub offset: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub drag: f32,
}

impl SpiralState {
    pub fn position(&self) -> Vec2 {
        self.pivot + self.offset
    }
}

/// Velocity multiplier for half a step of drag: `sqrt((1 - drag)^dt)`
#[inline]
pub fn drag_factor(drag: f32, dt: f32) -> f32 {
    (1.0 - drag).powf(dt).sqrt()
}

/// Advance Cartesian motion by `dt`.
///
/// Order: half drag, half acceleration, full position step, half acceleration,
/// half drag. Trajectories are only reproducible if this order is kept.
pub fn integrate_simulated(state: Kinematics, dt: f32) -> Kinematics {
    let damp = drag_factor(state.drag, dt);
    let mut velocity = state.velocity * damp;
    velocity += state.acceleration * 0.5 * dt;
    let position = state.position + velocity * dt;
    velocity += state.acceleration * 0.5 * dt;
    velocity *= damp;

    Kinematics {
        position,
        velocity,
        ..state
    }
}

/// Advance polar motion by `dt`.
///
/// Drag and acceleration act on the abstract velocity exactly as in
/// [`integrate_simulated`]; the position step rotates the offset by
/// `-velocity.x * dt` degrees and grows its length by `velocity.y * dt`.
/// A zero-length offset has no direction and is left in place.
pub fn integrate_spiral(state: SpiralState, dt: f32) -> SpiralState {
    let damp = drag_factor(state.drag, dt);
    let mut velocity = state.velocity * damp;
    velocity += state.acceleration * 0.5 * dt;

    let mut offset = state.offset;
    let distance = offset.length();
    if distance > 0.0 {
        let turned = Vec2::from_angle((-velocity.x * dt).to_radians()).rotate(offset);
        offset = turned.normalize() * (distance + velocity.y * dt);
    }

    velocity += state.acceleration * 0.5 * dt;
    velocity *= damp;

    SpiralState {
        offset,
        velocity,
        ..state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2, tol: f32) -> bool {
        (a - b).length() <= tol
    }

    #[test]
    fn free_motion_is_linear() {
        let p0 = Vec2::new(10.0, -4.0);
        let v0 = Vec2::new(3.0, 7.5);
        let dt = 1.0 / 60.0;
        let n = 240;

        let mut state = Kinematics {
            position: p0,
            velocity: v0,
            ..Default::default()
        };
        for _ in 0..n {
            state = integrate_simulated(state, dt);
        }

        let expected = p0 + v0 * (n as f32) * dt;
        assert!(close(state.position, expected, 1e-3));
        assert_eq!(state.velocity, v0);
    }

    #[test]
    fn constant_acceleration_matches_closed_form() {
        let a = Vec2::new(0.0, 9.8);
        let dt = 0.1;
        let mut state = Kinematics {
            acceleration: a,
            ..Default::default()
        };
        for _ in 0..10 {
            state = integrate_simulated(state, dt);
        }
        // Half-step split is exact for constant acceleration: p = a t^2 / 2
        assert!(close(state.position, a * 0.5, 1e-4));
        assert!(close(state.velocity, a, 1e-4));
    }

    #[test]
    fn drag_decays_velocity_geometrically() {
        let mut state = Kinematics {
            velocity: Vec2::new(100.0, 0.0),
            drag: 0.5,
            ..Default::default()
        };
        state = integrate_simulated(state, 1.0);
        // Two half steps of sqrt(0.5) compose to 0.5
        assert!((state.velocity.x - 50.0).abs() < 1e-3);
        // Position used the velocity after the first half step
        assert!((state.position.x - 100.0 * 0.5f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn drag_factor_identity_at_zero() {
        assert_eq!(drag_factor(0.0, 0.016), 1.0);
        assert_eq!(drag_factor(0.3, 0.0), 1.0);
    }

    #[test]
    fn spiral_rotates_and_grows() {
        let state = SpiralState {
            pivot: Vec2::new(480.0, 270.0),
            offset: Vec2::new(10.0, 0.0),
            velocity: Vec2::new(90.0, 5.0),
            ..Default::default()
        };
        let next = integrate_spiral(state, 1.0);
        // -90 degrees turns +x toward -y (up on screen)
        assert!(close(next.offset, Vec2::new(0.0, -15.0), 1e-3));
        assert!(close(next.position(), Vec2::new(480.0, 255.0), 1e-3));
        assert_eq!(next.pivot, state.pivot);
    }

    #[test]
    fn spiral_zero_offset_stays_put() {
        let state = SpiralState {
            velocity: Vec2::new(45.0, 20.0),
            ..Default::default()
        };
        let next = integrate_spiral(state, 0.5);
        assert_eq!(next.offset, Vec2::ZERO);
    }

    #[test]
    fn spiral_still_state_is_fixed_point() {
        let state = SpiralState {
            pivot: Vec2::new(1.0, 2.0),
            offset: Vec2::new(3.0, 4.0),
            ..Default::default()
        };
        let next = integrate_spiral(state, 0.25);
        assert!(close(next.offset, state.offset, 1e-5));
    }
}
